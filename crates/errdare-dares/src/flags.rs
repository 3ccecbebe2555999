//! Strictness flags for running the dares.
//!
//! The flags map onto an explicit [`Config`]; nothing here is global.  Test
//! runs read them from the environment, the `errdare` binary from its
//! command line.
//!
//! | Variable              | Flag          |
//! |-----------------------|---------------|
//! | `ERRDARE_DARE`        | `enable_dare` |
//! | `ERRDARE_PANIC_ORDER` | `panic_order` |
//! | `ERRDARE_PANIC_CLOSE` | `panic_close` |
//! | `ERRDARE_PEDANTIC`    | `pedantic`    |

use errdare_sim::Config;
use std::env;

/// Dare strictness flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DareFlags {
    /// Report failing dares as failures instead of skips.
    pub enable_dare: bool,
    /// Require the first abort to be the one passed to cleanup.
    pub panic_order: bool,
    /// Require every resource to be released when an abort escapes.
    pub panic_close: bool,
    /// Strictest interpretation; overrides the other policy flags.
    pub pedantic: bool,
}

impl DareFlags {
    /// Read the flags from `ERRDARE_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let flag = |name: &str| lookup(name).is_some_and(|v| parse_flag(&v));
        Self {
            enable_dare: flag("ERRDARE_DARE"),
            panic_order: flag("ERRDARE_PANIC_ORDER"),
            panic_close: flag("ERRDARE_PANIC_CLOSE"),
            pedantic: flag("ERRDARE_PEDANTIC"),
        }
    }

    /// Policy for reference solutions.
    pub fn config(&self) -> Config {
        if self.pedantic {
            return Config::PEDANTIC;
        }
        Config {
            ignore_abort_order: !self.panic_order,
            require_release_on_abort: self.panic_close,
            soft_fail: false,
        }
    }

    /// Policy for the dares themselves: failures are skips unless enabled.
    pub fn dare_config(&self) -> Config {
        self.config().with_soft_fail(!self.enable_dare)
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> DareFlags {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        DareFlags::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_are_relaxed_and_soft() {
        let flags = DareFlags::default();
        assert_eq!(flags.config(), Config::RELAXED);
        assert!(flags.dare_config().soft_fail);
        assert!(flags.dare_config().ignore_abort_order);
    }

    #[test]
    fn pedantic_overrides_policy_flags() {
        let flags = DareFlags {
            pedantic: true,
            panic_order: false,
            ..DareFlags::default()
        };
        assert_eq!(flags.config(), Config::PEDANTIC);
        // The preset itself is never modified.
        assert!(flags.dare_config().soft_fail);
        assert!(!Config::PEDANTIC.soft_fail);
    }

    #[test]
    fn enabled_dares_fail_hard() {
        let flags = DareFlags {
            enable_dare: true,
            panic_order: true,
            panic_close: true,
            pedantic: false,
        };
        let cfg = flags.dare_config();
        assert!(!cfg.soft_fail);
        assert!(!cfg.ignore_abort_order);
        assert!(cfg.require_release_on_abort);
    }

    #[test]
    fn environment_values() {
        let flags = lookup(&[
            ("ERRDARE_DARE", "1"),
            ("ERRDARE_PANIC_ORDER", "TRUE"),
            ("ERRDARE_PANIC_CLOSE", "0"),
            ("ERRDARE_PEDANTIC", "nope"),
        ]);
        assert!(flags.enable_dare);
        assert!(flags.panic_order);
        assert!(!flags.panic_close);
        assert!(!flags.pedantic);
        assert_eq!(lookup(&[]), DareFlags::default());
    }
}
