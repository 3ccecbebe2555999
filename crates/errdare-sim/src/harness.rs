//! The enumeration loop.
//!
//! [`run`] invokes a scenario once per reachable leaf of its execution tree.
//! Each execution starts from the recorded prefix, takes the success path
//! for every operation it has not reached before, and is then checked
//! against the ledger.  The history then advances the mode of the last
//! frame, backtracking over exhausted frames, until nothing is left.

use crate::config::Config;
use crate::report::RunReport;
use crate::simulation::{Outcome, Simulation};
use crate::unwind;
use log::info;

/// Run `scenario` for every combination of outcomes it can reach.
///
/// Violations are collected in the returned report; enumeration continues
/// after them.  A panic that does not carry a synthetic abort is a bug in
/// the scenario and is re-raised from here unless the config ignores abort
/// order.
///
/// ```
/// use errdare_sim::{run, Config, Options};
///
/// let report = run(Config::default(), |sim| {
///     sim.acquire("reader", Options::new().no_abort().no_release())
/// });
/// assert_eq!(report.executions, 2);
/// assert!(report.passed());
/// ```
pub fn run<F>(config: Config, mut scenario: F) -> RunReport
where
    F: FnMut(&Simulation) -> Outcome,
{
    let sim = Simulation::new(config);
    loop {
        sim.begin_execution();
        let result = unwind::catch(|| scenario(&sim));
        sim.finish_execution(result);
        if !sim.advance() {
            break;
        }
    }

    let report = sim.report();
    info!(
        "simulation finished: {} executions, {} failures, {} skipped",
        report.executions,
        report.failures().count(),
        report.skipped().count()
    );
    report
}
