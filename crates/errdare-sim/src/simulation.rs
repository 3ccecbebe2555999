//! The acquire/release protocol checker.
//!
//! A [`Simulation`] is the handle a scenario uses to perform simulated
//! operations.  Every call consults the [`History`] to find out which mode
//! the current execution runs the operation in, checks the release
//! discipline, and keeps the [`Ledger`] of the error the scenario must
//! eventually return.
//!
//! Protocol violations are recorded in the report and stop the rest of the
//! execution by unwinding with a private payload.  Once an execution is
//! halted every further engine call in it unwinds again, so a scenario that
//! swallows the unwind cannot keep going.

use crate::config::Config;
use crate::history::{Frame, History};
use crate::ledger::Ledger;
use crate::mode::{Mode, SimError};
use crate::options::Options;
use crate::report::{KeyRecord, RunReport};
use crate::unwind::{self, Unwind};
use crate::violation::{Violation, ViolationRecord};
use log::{debug, error, warn};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Result of a simulated operation or of a whole scenario.
pub type Outcome = Result<(), SimError>;

/// What an engine call does once the state lock is released.
///
/// Unwinding while holding the lock would poison it, so the decision is
/// made under the lock and carried out after.
enum Step {
    Continue(Outcome),
    Abort(SimError),
    Halt,
}

impl Step {
    fn resolve(self) -> Outcome {
        match self {
            Step::Continue(outcome) => outcome,
            Step::Abort(err) => unwind::raise_abort(err),
            Step::Halt => unwind::halt(),
        }
    }
}

struct SimState {
    config: Config,
    history: History,
    ledger: Ledger,
    /// Index of the running execution.
    execution: usize,
    /// Executions started so far.
    executions: usize,
    halted: bool,
    violations: Vec<ViolationRecord>,
    keys: BTreeMap<String, KeyRecord>,
}

impl SimState {
    fn new(config: Config) -> Self {
        Self {
            config,
            history: History::new(),
            ledger: Ledger::new(),
            execution: 0,
            executions: 0,
            halted: false,
            violations: Vec::new(),
            keys: BTreeMap::new(),
        }
    }

    fn report(&mut self, violation: Violation) {
        let skipped = self.config.soft_fail;
        if skipped {
            warn!("execution {}: {} (skipped)", self.execution, violation);
        } else {
            error!("execution {}: {}", self.execution, violation);
        }
        self.violations.push(ViolationRecord {
            execution: self.execution,
            violation,
            skipped,
        });
        self.halted = true;
    }

    fn acquire(&mut self, key: &str, opts: Options) -> Step {
        if self.halted {
            return Step::Halt;
        }
        let pos = match self.history.record(Frame::new(key, opts)) {
            Ok(pos) => pos,
            Err(violation) => {
                self.report(violation);
                return Step::Halt;
            }
        };
        let frame = self.history.frame(pos);
        let mode = frame.mode();
        let ignore_fault = frame.ignores_fault();
        self.keys.entry(key.to_string()).or_default().record(mode);
        debug!("execution {}: {} -> {}", self.execution, key, mode);

        match mode {
            Mode::NoFault => Step::Continue(Ok(())),
            Mode::Fault => {
                self.history.mark_released(pos);
                let err = if ignore_fault {
                    SimError::fault(key)
                } else {
                    self.ledger.record(Mode::Fault, key)
                };
                Step::Continue(Err(err))
            }
            Mode::Abort => {
                self.history.mark_released(pos);
                Step::Abort(self.ledger.record(Mode::Abort, key))
            }
        }
    }

    fn release(&mut self, key: &str, err: Option<&SimError>, opts: Options) -> Step {
        if self.halted {
            return Step::Halt;
        }
        if let Err(violation) = self.history.release(key) {
            self.report(violation);
            return Step::Halt;
        }
        if !self.ledger.matches(err) {
            // Only a pair of aborts may differ, and only under relaxed policy.
            let tolerated = self.config.ignore_abort_order
                && err.is_some_and(SimError::is_abort)
                && self.ledger.is_abort();
            if !tolerated {
                self.report(Violation::WrongReleaseError {
                    key: key.to_string(),
                    got: err.cloned(),
                    want: self.ledger.current().cloned(),
                });
                return Step::Halt;
            }
        }
        self.acquire(&format!("{key}.close"), opts.no_release())
    }

    /// Check the result of one execution.  Returns an unwind the caller must
    /// resume when the scenario raised a foreign panic under strict policy.
    fn finish(&mut self, result: Result<Outcome, Unwind>) -> Option<Unwind> {
        if self.halted {
            return None;
        }
        let (returned, aborted) = match result {
            Ok(outcome) => (outcome.err(), false),
            Err(u) if u.is_halt() => return None,
            Err(u) => match u.abort().cloned() {
                Some(err) => (Some(err), true),
                None if self.config.ignore_abort_order => {
                    warn!(
                        "execution {}: foreign panic treated as abort: {:?}",
                        self.execution, u
                    );
                    (Some(SimError::abort("user")), true)
                }
                None => return Some(u),
            },
        };

        if aborted {
            if !self.ledger.is_abort() {
                self.report(Violation::UnexpectedAbort);
                return None;
            }
            if self.config.require_release_on_abort {
                if let Some(frame) = self.history.last_unreleased() {
                    let key = frame.key().to_string();
                    self.report(Violation::NotReleasedAfterAbort { key });
                    return None;
                }
            }
        }

        if !self.ledger.matches(returned.as_ref()) && !self.ledger.is_abort() {
            self.report(Violation::WrongReturn {
                got: returned,
                want: self.ledger.current().cloned(),
            });
        }
        None
    }
}

/// Handle to the simulation state shared by a scenario and its helpers.
///
/// Cloning the handle is cheap; clones refer to the same execution.  Calls
/// from several threads are memory safe, but the scenario itself must order
/// them (for example by joining a helper thread before touching the engine
/// again).
#[derive(Clone)]
pub struct Simulation {
    state: Arc<Mutex<SimState>>,
}

impl Simulation {
    pub(crate) fn new(config: Config) -> Self {
        Self {
            state: Arc::new(Mutex::new(SimState::new(config))),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Policy this simulation checks against.
    pub fn config(&self) -> Config {
        self.lock().config
    }

    /// Zero-based index of the running execution.
    pub fn execution(&self) -> usize {
        self.lock().execution
    }

    /// The error the scenario must currently return, if any.
    pub fn required_error(&self) -> Option<SimError> {
        self.lock().ledger.current().cloned()
    }

    /// Perform the operation `key`.
    ///
    /// Returns `Ok(())` or a synthetic fault, or raises a synthetic abort,
    /// depending on which leaf of the execution tree is being explored.  A
    /// successful call must be matched by a [`release`](Self::release)
    /// unless `opts` says otherwise.
    pub fn acquire(&self, key: &str, opts: Options) -> Outcome {
        let step = self.lock().acquire(key, opts);
        step.resolve()
    }

    /// Release `key` with the error currently required of the scenario.
    pub fn release(&self, key: &str, opts: Options) -> Outcome {
        let step = {
            let mut state = self.lock();
            let want = state.ledger.current().cloned();
            state.release(key, want.as_ref(), opts)
        };
        step.resolve()
    }

    /// Release `key`, reporting `err` as the reason.
    ///
    /// The release must match the most recent unreleased acquire and `err`
    /// must equal the required error.  The release is then simulated as an
    /// operation of its own, `"<key>.close"`, which may fault or abort.
    pub fn release_with_error(&self, key: &str, err: Option<&SimError>, opts: Options) -> Outcome {
        let step = self.lock().release(key, err, opts);
        step.resolve()
    }

    /// Report a scenario-level violation and stop the execution.
    pub fn fatal(&self, message: impl Into<String>) -> ! {
        {
            let mut state = self.lock();
            if !state.halted {
                state.report(Violation::Scenario {
                    message: message.into(),
                });
            }
        }
        unwind::halt()
    }

    /// Whether the running execution was stopped by a violation.
    pub fn is_halted(&self) -> bool {
        self.lock().halted
    }

    pub(crate) fn begin_execution(&self) {
        let mut state = self.lock();
        state.execution = state.executions;
        state.executions += 1;
        state.history.rewind();
        state.ledger.reset();
        state.halted = false;
        debug!("execution {}: start", state.execution);
    }

    /// Check the scenario's result; foreign panics under strict policy
    /// continue unwinding from here.
    pub(crate) fn finish_execution(&self, result: Result<Outcome, Unwind>) {
        let resume = self.lock().finish(result);
        if let Some(u) = resume {
            u.resume();
        }
    }

    pub(crate) fn advance(&self) -> bool {
        self.lock().history.advance()
    }

    pub(crate) fn report(&self) -> RunReport {
        let state = self.lock();
        RunReport {
            config: state.config,
            executions: state.executions,
            violations: state.violations.clone(),
            keys: state.keys.clone(),
        }
    }
}

impl fmt::Debug for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("Simulation")
            .field("config", &state.config)
            .field("execution", &state.execution)
            .field("halted", &state.halted)
            .field("frames", &state.history.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed() -> Options {
        Options::new().no_fault().no_abort()
    }

    fn started(config: Config) -> Simulation {
        let sim = Simulation::new(config);
        sim.begin_execution();
        sim
    }

    #[test]
    fn success_path_leaves_frame_open() {
        let sim = started(Config::default());
        assert_eq!(sim.acquire("reader", Options::new()), Ok(()));
        assert_eq!(
            sim.lock().history.last_unreleased().map(Frame::key),
            Some("reader")
        );
        assert_eq!(sim.release("reader", fixed()), Ok(()));
        assert!(sim.lock().history.last_unreleased().is_none());
    }

    #[test]
    fn fault_is_recorded_unless_ignored() {
        let sim = started(Config::default());
        sim.acquire("a", Options::new()).unwrap();
        assert!(sim.advance());
        sim.begin_execution();
        assert_eq!(sim.acquire("a", Options::new()), Err(SimError::fault("a")));
        assert_eq!(sim.required_error(), Some(SimError::fault("a")));

        let sim = started(Config::default());
        sim.acquire("a", Options::new().ignore_fault()).unwrap();
        sim.advance();
        sim.begin_execution();
        assert!(sim.acquire("a", Options::new().ignore_fault()).is_err());
        assert_eq!(sim.required_error(), None);
    }

    #[test]
    fn abort_unwinds_with_tagged_error() {
        let sim = started(Config::default());
        sim.acquire("w", Options::new().no_fault()).unwrap();
        sim.advance();
        sim.begin_execution();
        let u = unwind::catch(|| sim.acquire("w", Options::new().no_fault())).unwrap_err();
        assert_eq!(u.abort(), Some(&SimError::abort("w")));
        assert_eq!(sim.required_error(), Some(SimError::abort("w")));
    }

    #[test]
    fn violation_halts_further_calls() {
        let sim = started(Config::default());
        let u = unwind::catch(|| sim.release("ghost", fixed())).unwrap_err();
        assert!(u.is_halt());
        assert!(sim.is_halted());
        let u = unwind::catch(|| sim.acquire("after", fixed())).unwrap_err();
        assert!(u.is_halt());
        assert_eq!(sim.report().violations.len(), 1);
    }

    #[test]
    fn fatal_records_scenario_message() {
        let sim = started(Config::SOFT_FAIL);
        let u = unwind::catch::<()>(|| sim.fatal("bad token")).unwrap_err();
        assert!(u.is_halt());
        let report = sim.report();
        assert_eq!(report.violations[0].violation.to_string(), "bad token");
        assert!(report.violations[0].skipped);
    }

    #[test]
    fn lock_survives_violation_unwind() {
        let sim = started(Config::default());
        let _ = unwind::catch(|| sim.release("ghost", fixed()));
        assert!(!sim.state.is_poisoned());
        assert_eq!(sim.execution(), 0);
    }
}
