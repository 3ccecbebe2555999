//! The cloud storage dare.
//!
//! Open a client, a reader and a writer, then copy the reader into the
//! writer.  Any error while copying must be passed to the writer's
//! [`close_with_error`](crate::CloseWithError::close_with_error); the
//! reader must be closed and its close error surfaced; the client's close
//! error may be discarded.
//!
//! A simplistic but incorrect solution is [`crate::naive::cloud_storage`].

use crate::value::{fallible, infallible, operation, require, Close, CloseWithError, Value};
use errdare_sim::{run, Config, Options, Outcome, RunReport, SimError, Simulation};

/// Operations available to a cloud storage solution.
#[derive(Debug)]
pub struct CloudStorage {
    sim: Simulation,
}

/// Run the cloud storage dare against `solution`.
pub fn run_cloud_storage<F>(config: Config, mut solution: F) -> RunReport
where
    F: FnMut(&CloudStorage) -> Outcome,
{
    run(config, |sim| solution(&CloudStorage { sim: sim.clone() }))
}

impl CloudStorage {
    /// A client that must be closed.  Its close error may be ignored.
    pub fn new_client(&self) -> Result<impl Close, SimError> {
        let client = fallible(&self.sim, "client", Options::new())?;
        Ok(client.with_release(Options::new().ignore_fault()))
    }

    /// A reader that must be closed.
    pub fn new_reader(&self) -> Result<impl Close, SimError> {
        fallible(&self.sim, "reader", Options::new())
    }

    /// A writer for `client`.  It must be closed with the copy error, if any.
    pub fn new_writer(&self, client: &dyn Value) -> impl CloseWithError {
        require(&self.sim, client, "client");
        infallible(&self.sim, "writer", Options::new()).with_release(Options::new().no_fault())
    }

    /// Copy `r` into `w`, returning the number of bytes copied.
    pub fn copy(&self, w: &dyn Value, r: &dyn Value) -> Result<usize, SimError> {
        require(&self.sim, r, "reader");
        require(&self.sim, w, "writer");
        operation(&self.sim, "copy", Options::new())?;
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{answers, naive};

    #[test]
    fn answer_passes_relaxed() {
        let report = run_cloud_storage(Config::RELAXED, answers::cloud_storage);
        assert!(report.passed(), "{}", report.transcript());
        assert!(report.executions > 10);
        for key in ["client", "reader", "writer", "copy", "reader.close", "writer.close"] {
            assert!(report.keys.contains_key(key), "{key} never reached");
        }
    }

    #[test]
    fn naive_drops_reader_close_error() {
        let report = run_cloud_storage(Config::RELAXED, naive::cloud_storage);
        assert!(!report.passed());
        assert!(report
            .transcript()
            .contains("got <none>; want reader.close: Fault"));
    }

    #[test]
    fn naive_is_skipped_under_soft_fail() {
        let report = run_cloud_storage(Config::SOFT_FAIL, naive::cloud_storage);
        assert!(report.passed());
        assert!(report.skipped().count() > 0);
    }

    #[test]
    fn writer_requires_the_client() {
        let report = run_cloud_storage(Config::default(), |t| {
            let reader = t.new_reader()?;
            let _writer = t.new_writer(&reader);
            Ok(())
        });
        assert_eq!(
            report.violations[0].violation.to_string(),
            "got \"reader\"; want \"client\""
        );
    }
}
