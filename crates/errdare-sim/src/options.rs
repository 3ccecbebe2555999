//! Per-call options for acquire and release operations.

use crate::mode::Mode;

/// Options selecting the legal outcomes of one call and its release contract.
///
/// [`Mode::NoFault`] is always legal; faults and aborts are legal unless
/// suppressed.
///
/// ```
/// use errdare_sim::{Mode, Options};
///
/// let opts = Options::new().no_abort().no_release();
/// assert_eq!(opts.modes(), vec![Mode::NoFault, Mode::Fault]);
/// assert!(!opts.requires_release());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Options {
    no_fault: bool,
    no_abort: bool,
    no_release: bool,
    ignore_fault: bool,
}

impl Options {
    /// All outcomes legal, release required, faults recorded.
    pub const fn new() -> Self {
        Self {
            no_fault: false,
            no_abort: false,
            no_release: false,
            ignore_fault: false,
        }
    }

    /// The call never returns a fault.
    pub const fn no_fault(mut self) -> Self {
        self.no_fault = true;
        self
    }

    /// The call never aborts.
    pub const fn no_abort(mut self) -> Self {
        self.no_abort = true;
        self
    }

    /// A successful call owns nothing that must be released.
    pub const fn no_release(mut self) -> Self {
        self.no_release = true;
        self
    }

    /// A fault from this call does not have to be surfaced by the scenario.
    pub const fn ignore_fault(mut self) -> Self {
        self.ignore_fault = true;
        self
    }

    /// Whether a successful call must later be released.
    pub fn requires_release(&self) -> bool {
        !self.no_release
    }

    /// Whether faults from this call are left out of the ledger.
    pub fn ignores_fault(&self) -> bool {
        self.ignore_fault
    }

    /// Legal modes in enumeration order.
    pub fn modes(&self) -> Vec<Mode> {
        let mut modes = Vec::with_capacity(3);
        modes.push(Mode::NoFault);
        if !self.no_fault {
            modes.push(Mode::Fault);
        }
        if !self.no_abort {
            modes.push(Mode::Abort);
        }
        modes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_allows_everything() {
        let opts = Options::default();
        assert_eq!(opts, Options::new());
        assert_eq!(opts.modes(), Mode::ALL.to_vec());
        assert!(opts.requires_release());
        assert!(!opts.ignores_fault());
    }

    #[test]
    fn suppressing_both_leaves_success() {
        let opts = Options::new().no_fault().no_abort();
        assert_eq!(opts.modes(), vec![Mode::NoFault]);
    }

    #[test]
    fn no_fault_keeps_abort() {
        assert_eq!(
            Options::new().no_fault().modes(),
            vec![Mode::NoFault, Mode::Abort]
        );
    }
}
