//! Protocol violations: failures of the scenario under test, as opposed to
//! the synthetic faults and aborts the engine injects on purpose.

use crate::mode::{DisplayOutcome, SimError};
use thiserror::Error;

/// A fatal protocol violation detected by the checker or the harness.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    #[error("statement {key:?} was already executed")]
    DuplicateKey { key: String },

    #[error("non-deterministic simulation at {key:?}")]
    NonDeterministic { key: String },

    #[error("{key:?} released out of order (expected {expected:?})")]
    OutOfOrder { key: String, expected: String },

    #[error("{key:?} was already released or should not be released")]
    AlreadyReleased { key: String },

    #[error("unmatched release {key:?}")]
    UnmatchedRelease { key: String },

    #[error(
        "release of {key:?} with wrong error: got {}; want {}",
        DisplayOutcome(.got.as_ref()),
        DisplayOutcome(.want.as_ref())
    )]
    WrongReleaseError {
        key: String,
        got: Option<SimError>,
        want: Option<SimError>,
    },

    #[error("simulation aborted unexpectedly")]
    UnexpectedAbort,

    #[error("{key:?} was not released after abort")]
    NotReleasedAfterAbort { key: String },

    #[error(
        "simulation did not return the correct error: got {}; want {}",
        DisplayOutcome(.got.as_ref()),
        DisplayOutcome(.want.as_ref())
    )]
    WrongReturn {
        got: Option<SimError>,
        want: Option<SimError>,
    },

    /// Raised by a scenario collaborator through [`crate::Simulation::fatal`].
    #[error("{message}")]
    Scenario { message: String },
}

impl Violation {
    /// The operation key this violation is about, if it concerns one.
    pub fn key(&self) -> Option<&str> {
        match self {
            Violation::DuplicateKey { key }
            | Violation::NonDeterministic { key }
            | Violation::OutOfOrder { key, .. }
            | Violation::AlreadyReleased { key }
            | Violation::UnmatchedRelease { key }
            | Violation::WrongReleaseError { key, .. }
            | Violation::NotReleasedAfterAbort { key } => Some(key),
            Violation::WrongReturn { want, .. } => want.as_ref().map(SimError::key),
            Violation::UnexpectedAbort | Violation::Scenario { .. } => None,
        }
    }
}

/// A violation together with the execution in which it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViolationRecord {
    /// Zero-based execution index.
    pub execution: usize,
    /// What went wrong.
    pub violation: Violation,
    /// Whether soft-fail policy downgraded this violation to a skip.
    pub skipped: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_quote_keys() {
        let v = Violation::OutOfOrder {
            key: "o1".into(),
            expected: "o2".into(),
        };
        assert_eq!(v.to_string(), r#""o1" released out of order (expected "o2")"#);
        assert_eq!(v.key(), Some("o1"));
    }

    #[test]
    fn wrong_return_prints_none_for_success() {
        let v = Violation::WrongReturn {
            got: None,
            want: Some(SimError::fault("reader")),
        };
        assert_eq!(
            v.to_string(),
            "simulation did not return the correct error: got <none>; want reader: Fault"
        );
        assert_eq!(v.key(), Some("reader"));
    }

    #[test]
    fn unexpected_abort_has_no_key() {
        assert_eq!(Violation::UnexpectedAbort.key(), None);
    }
}
