//! Policy configuration consumed by the protocol checker and harness.

/// Strictness policies for one simulation run.
///
/// The fields are independent; the associated constants are the common
/// presets.  The default is strict abort ordering with hard failures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Config {
    /// Tolerate a mismatch between two abort-class errors, and normalise
    /// foreign panics into a generic abort instead of re-raising them.
    pub ignore_abort_order: bool,
    /// After an abort escapes a scenario, every acquired resource must
    /// already have been released.
    pub require_release_on_abort: bool,
    /// Log violations and skip the rest of the execution instead of
    /// recording them as failures.
    pub soft_fail: bool,
}

impl Config {
    /// Require cleanup of every resource when an abort escapes.
    pub const PEDANTIC: Config = Config {
        ignore_abort_order: false,
        require_release_on_abort: true,
        soft_fail: false,
    };

    /// Do not insist on which of several concurrent aborts wins.
    pub const RELAXED: Config = Config {
        ignore_abort_order: true,
        require_release_on_abort: false,
        soft_fail: false,
    };

    /// Report violations as skips.
    pub const SOFT_FAIL: Config = Config {
        ignore_abort_order: false,
        require_release_on_abort: false,
        soft_fail: true,
    };

    /// Copy of this config with soft failure switched on or off.
    pub const fn with_soft_fail(self, soft_fail: bool) -> Self {
        Config { soft_fail, ..self }
    }
}
