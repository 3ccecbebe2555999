//! The pipe conversion dare.
//!
//! Wrap the given reader in a scanner and copy each scanned item into a
//! freshly created pipe from a producer thread.  The main thread hands the
//! pipe's reading end to [`PipeConvert::wait`] and returns its result.  The
//! pipe's writing end must be closed with the error that stopped the
//! producer, including an abort.
//!
//! The producer runs on its own thread, but never concurrently with the main
//! thread's use of the engine: `wait` joins it before reading the pipe.

use crate::value::{infallible, operation, require, step, Close, CloseWithError, Key, Value};
use errdare_sim::unwind::{self, Unwind};
use errdare_sim::{run, Config, Options, Outcome, RunReport, SimError, Simulation};
use log::debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// How long `wait` polls the pipe before closing the reader itself.
const PIPE_WAIT: Duration = Duration::from_millis(10);

struct PipeInner {
    sim: Simulation,
    did_scan: AtomicBool,
    tx: SyncSender<Option<SimError>>,
    rx: Mutex<Receiver<Option<SimError>>>,
    producers: Mutex<Vec<JoinHandle<Result<(), Unwind>>>>,
}

/// Operations available to a pipe conversion solution.
///
/// Cheap to clone so the producer thread can own a handle.
#[derive(Clone)]
pub struct PipeConvert {
    inner: Arc<PipeInner>,
}

/// Run the pipe conversion dare against `solution`.
///
/// The solution receives the source reader; it does not need to be closed.
pub fn run_pipe_convert<F>(config: Config, mut solution: F) -> RunReport
where
    F: FnMut(&PipeConvert, crate::Token) -> Outcome,
{
    run(config, |sim| {
        let t = PipeConvert::new(sim);
        let reader = infallible(sim, "reader", Options::new().no_release());
        let res = unwind::catch(|| solution(&t, reader));
        t.join_producers();
        match res {
            Ok(outcome) => outcome,
            Err(u) => u.resume(),
        }
    })
}

impl PipeConvert {
    fn new(sim: &Simulation) -> Self {
        let (tx, rx) = mpsc::sync_channel(1);
        Self {
            inner: Arc::new(PipeInner {
                sim: sim.clone(),
                did_scan: AtomicBool::new(false),
                tx,
                rx: Mutex::new(rx),
                producers: Mutex::new(Vec::new()),
            }),
        }
    }

    fn sim(&self) -> &Simulation {
        &self.inner.sim
    }

    /// A pipe.  The writer must be closed with the error that ended
    /// production; the reader must be passed to [`wait`](Self::wait).
    pub fn pipe(&self) -> (impl Close, PipeWriter) {
        let reader = infallible(self.sim(), "pipeReader", Options::new());
        let writer = infallible(self.sim(), "pipeWriter", Options::new());
        (
            reader,
            PipeWriter {
                key: writer.key().to_string(),
                pipe: self.clone(),
            },
        )
    }

    /// Run `producer` on its own thread.
    pub fn spawn<F>(&self, producer: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let handle = thread::spawn(move || unwind::catch(producer));
        self.inner
            .producers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(handle);
    }

    /// Wait for production to finish and return its result.
    ///
    /// `r` must be the reader returned by [`pipe`](Self::pipe).  When the
    /// producer never closed the pipe, the reader is closed instead.
    pub fn wait(&self, r: &dyn Close) -> Outcome {
        require(self.sim(), r, "pipeReader");
        self.join_producers();
        let received = self
            .inner
            .rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .recv_timeout(PIPE_WAIT);
        match received {
            Ok(Some(err)) => Err(err),
            Ok(None) => Ok(()),
            Err(_) => r.close(),
        }
    }

    /// A scanner over the source reader.
    pub fn new_scanner(&self, r: &dyn Value) -> Key {
        require(self.sim(), r, "reader");
        step(self.sim(), "scanner", Options::new());
        Key("scanner")
    }

    /// Advance the scanner; false once the input is exhausted.
    pub fn scan(&self, scanner: &dyn Value) -> bool {
        require(self.sim(), scanner, "scanner");
        if self.inner.did_scan.load(Ordering::SeqCst) {
            return false;
        }
        step(self.sim(), "scan", Options::new());
        self.inner.did_scan.store(true, Ordering::SeqCst);
        true
    }

    /// Write the current scan result to the pipe.
    pub fn write_scanned(&self, w: &dyn Value, scanner: &dyn Value) -> Outcome {
        require(self.sim(), w, "pipeWriter");
        require(self.sim(), scanner, "scanner");
        operation(self.sim(), "writeScanned", Options::new())
    }

    /// The error that ended scanning, if any.
    pub fn scan_err(&self, scanner: &dyn Value) -> Outcome {
        require(self.sim(), scanner, "scanner");
        operation(self.sim(), "scanErr", Options::new())
    }

    /// Join every producer thread, carrying its unwind over to this thread.
    fn join_producers(&self) {
        let handles: Vec<_> = self
            .inner
            .producers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        for handle in handles {
            let u = match handle.join() {
                Ok(Ok(())) => continue,
                Ok(Err(u)) => u,
                Err(_) => self.sim().fatal("producer thread panicked outside its catch"),
            };
            if let Some(err) = u.abort() {
                self.sim()
                    .fatal(format!("producer task terminated by abort: {err}"));
            }
            debug!("producer unwound: {u:?}");
            u.resume();
        }
    }

    fn send(&self, err: Option<SimError>) {
        // The pipe holds one result; later ones are dropped.
        let _ = self.inner.tx.try_send(err);
    }
}

impl std::fmt::Debug for PipeConvert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipeConvert")
            .field("did_scan", &self.inner.did_scan.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

/// Writing end of the pipe.  Closing it delivers the result to
/// [`PipeConvert::wait`].
#[derive(Debug, Clone)]
pub struct PipeWriter {
    key: String,
    pipe: PipeConvert,
}

impl Value for PipeWriter {
    fn key(&self) -> &str {
        &self.key
    }
}

impl Close for PipeWriter {
    fn close(&self) -> Outcome {
        let res = self
            .pipe
            .sim()
            .release(&self.key, Options::new().no_fault().no_abort());
        self.pipe.send(res.err());
        Ok(())
    }
}

impl CloseWithError for PipeWriter {
    fn close_with_error(&self, err: Option<&SimError>) -> Outcome {
        let _ = self.pipe.sim().release_with_error(
            &self.key,
            err,
            Options::new().no_fault().no_abort(),
        );
        self.pipe.send(err.cloned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{answers, naive};

    #[test]
    fn answer_passes_relaxed() {
        let report = run_pipe_convert(Config::RELAXED, answers::pipe_convert);
        assert!(report.passed(), "{}", report.transcript());
        assert!(report.keys["writeScanned"].aborts > 0);
        assert!(report.keys.contains_key("pipeWriter.close"));
    }

    #[test]
    fn naive_loses_producer_abort() {
        let report = run_pipe_convert(Config::RELAXED, naive::pipe_convert);
        assert!(report
            .transcript()
            .contains("producer task terminated by abort: scanner: Abort"));
    }

    #[test]
    fn scan_yields_once() {
        let report = run_pipe_convert(Config::default(), |t, reader| {
            let scanner = t.new_scanner(&reader);
            assert!(t.scan(&scanner));
            assert!(!t.scan(&scanner));
            Ok(())
        });
        assert!(report.passed(), "{}", report.transcript());
    }

    #[test]
    fn unclosed_pipe_falls_back_to_reader_close() {
        let report = run_pipe_convert(Config::default(), |t, _reader| {
            let (pipe_reader, pipe_writer) = t.pipe();
            t.spawn(move || drop(pipe_writer));
            t.wait(&pipe_reader)
        });
        // pipeWriter is still open when the reader is closed.
        assert_eq!(
            report.violations[0].violation.to_string(),
            "\"pipeReader\" released out of order (expected \"pipeWriter\")"
        );
    }
}
