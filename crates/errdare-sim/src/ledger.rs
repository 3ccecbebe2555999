//! Outcome ledger: the error a scenario is required to surface.
//!
//! | Recorded so far | New outcome | Ledger afterwards |
//! |-----------------|-------------|-------------------|
//! | nothing         | any         | new outcome       |
//! | Fault           | Fault       | unchanged         |
//! | Fault           | Abort       | new outcome       |
//! | Abort           | any         | unchanged         |

use crate::mode::{Mode, SimError};

/// Running record of the most severe outcome in the current execution.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    must: Option<SimError>,
}

impl Ledger {
    /// An empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything; called at the start of every execution.
    pub fn reset(&mut self) {
        self.must = None;
    }

    /// Record an outcome of `key` and return the error it produced.
    ///
    /// The returned error is always the new one, even when the ledger keeps
    /// an earlier, more severe outcome.
    pub fn record(&mut self, mode: Mode, key: &str) -> SimError {
        let err = SimError::new(key, mode);
        let replace = match &self.must {
            None => true,
            Some(current) => mode.is_abort() && !current.is_abort(),
        };
        if replace {
            self.must = Some(err.clone());
        }
        err
    }

    /// The error the scenario must currently return.
    pub fn current(&self) -> Option<&SimError> {
        self.must.as_ref()
    }

    /// Whether an abort-class outcome is live.
    pub fn is_abort(&self) -> bool {
        self.must.as_ref().is_some_and(SimError::is_abort)
    }

    /// Whether `err` is exactly the required outcome.
    pub fn matches(&self, err: Option<&SimError>) -> bool {
        self.must.as_ref() == err
    }
}
