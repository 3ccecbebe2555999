//! Outcome modes and the synthetic errors they produce.
//!
//! Every simulated operation runs in exactly one [`Mode`] per execution.
//! A [`SimError`] tags the operation key with the mode that fired, so the
//! same error value can be compared against the ledger, returned by the
//! scenario, or carried as an unwind payload.

use std::fmt;
use thiserror::Error;

/// The simulated result of one operation in one execution.
///
/// The order of the variants is the order in which the enumerator visits
/// them: success first, then the ordinary error, then the abort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Mode {
    /// The operation succeeds.
    NoFault,
    /// The operation returns a synthetic error.
    Fault,
    /// The operation raises a synthetic abort (an unwind).
    Abort,
}

impl Mode {
    /// All modes in enumeration order.
    pub const ALL: [Mode; 3] = [Mode::NoFault, Mode::Fault, Mode::Abort];

    /// Whether this mode unwinds instead of returning.
    pub fn is_abort(self) -> bool {
        self == Mode::Abort
    }

    /// Stable display name.
    pub fn name(self) -> &'static str {
        match self {
            Mode::NoFault => "NoFault",
            Mode::Fault => "Fault",
            Mode::Abort => "Abort",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A synthetic error tagged with the key of the operation that produced it.
///
/// Faults are returned as `Err(SimError)`; aborts travel as the payload of
/// an unwind (see [`crate::unwind`]).
///
/// ```
/// use errdare_sim::{Mode, SimError};
///
/// let err = SimError::fault("reader");
/// assert_eq!(err.to_string(), "reader: Fault");
/// assert_eq!(err.mode(), Mode::Fault);
/// assert!(!err.is_abort());
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq, Hash)]
#[error("{key}: {mode}")]
pub struct SimError {
    key: String,
    mode: Mode,
}

impl SimError {
    /// Create an error for `key` in the given mode.
    pub fn new(key: impl Into<String>, mode: Mode) -> Self {
        Self {
            key: key.into(),
            mode,
        }
    }

    /// Shorthand for a [`Mode::Fault`] error.
    pub fn fault(key: impl Into<String>) -> Self {
        Self::new(key, Mode::Fault)
    }

    /// Shorthand for a [`Mode::Abort`] error.
    pub fn abort(key: impl Into<String>) -> Self {
        Self::new(key, Mode::Abort)
    }

    /// Key of the operation that produced this error.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Mode that produced this error.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Whether this error is abort-class.
    pub fn is_abort(&self) -> bool {
        self.mode.is_abort()
    }
}

/// Display adapter for an optional outcome, printing `<none>` for success.
pub(crate) struct DisplayOutcome<'a>(pub Option<&'a SimError>);

impl fmt::Display for DisplayOutcome<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(err) => write!(f, "{err}"),
            None => f.write_str("<none>"),
        }
    }
}
