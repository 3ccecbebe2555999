//! The tricky catch dare.
//!
//! Create a writer, wrap it, and write something through the wrapper.  If
//! anything fails while wrapping or writing, the original writer must be
//! closed with that error.  The wrapper's close error must be observed as
//! well, and the close may abort.

use crate::value::{fallible, operation, require, Close, CloseWithError, Value};
use errdare_sim::{run, Config, Options, Outcome, RunReport, SimError, Simulation};

/// Operations available to a tricky catch solution.
#[derive(Debug)]
pub struct TrickyCatch {
    sim: Simulation,
}

/// Run the tricky catch dare against `solution`.
pub fn run_tricky_catch<F>(config: Config, mut solution: F) -> RunReport
where
    F: FnMut(&TrickyCatch) -> Outcome,
{
    run(config, |sim| solution(&TrickyCatch { sim: sim.clone() }))
}

impl TrickyCatch {
    /// A writer that must be closed with the error that ended its use.
    pub fn new_writer(&self) -> Result<impl CloseWithError, SimError> {
        fallible(&self.sim, "writer", Options::new())
    }

    /// Wrap the writer returned by [`new_writer`](Self::new_writer).
    pub fn new_wrapper(&self, w: &dyn Value) -> Result<impl Close, SimError> {
        require(&self.sim, w, "writer");
        fallible(&self.sim, "wrapper", Options::new())
    }

    /// Write through the wrapper.
    pub fn write_something(&self, w: &dyn Value) -> Outcome {
        require(&self.sim, w, "wrapper");
        operation(&self.sim, "writeSomething", Options::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{answers, naive};

    #[test]
    fn answer_passes_relaxed() {
        let report = run_tricky_catch(Config::RELAXED, answers::tricky_catch);
        assert!(report.passed(), "{}", report.transcript());
        assert!(report.keys["writeSomething"].aborts > 0);
    }

    #[test]
    fn answer_needs_relaxed_abort_order() {
        // An abort while closing the wrapper races the abort that caused it.
        let report = run_tricky_catch(Config::default(), answers::tricky_catch);
        assert!(!report.passed());
        assert!(report
            .failures()
            .all(|v| v.violation.to_string().contains("wrong error")));
    }

    #[test]
    fn naive_misses_wrapper_close_error() {
        let report = run_tricky_catch(Config::RELAXED, naive::tricky_catch);
        assert!(report.transcript().contains(
            "release of \"writer\" with wrong error: got <none>; want wrapper.close: Fault"
        ));
    }

    #[test]
    fn wrapper_requires_the_writer() {
        let report = run_tricky_catch(Config::default(), |t| {
            let w = t.new_writer()?;
            let ww = t.new_wrapper(&w)?;
            t.write_something(&w)?;
            ww.close()?;
            w.close_with_error(None)
        });
        assert_eq!(
            report.violations[0].violation.to_string(),
            "got \"writer\"; want \"wrapper\""
        );
    }
}
