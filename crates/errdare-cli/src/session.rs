//! A session: a selection of dares run with one solution and one set of
//! strictness flags.

use errdare_dares::{Dare, DareFlags, Solution};
use errdare_sim::{Config, RunReport};
use log::info;

/// What to run.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Dares to run, in order.
    pub dares: Vec<Dare>,
    /// Solution to run against each dare.
    pub solution: Solution,
    /// Strictness flags.
    pub flags: DareFlags,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            dares: Dare::ALL.to_vec(),
            solution: Solution::Answer,
            flags: DareFlags::default(),
        }
    }
}

impl SessionConfig {
    /// Policy for the selected solution.
    ///
    /// Reference answers are held to the configured policy; naive solutions
    /// are the dares themselves and are only failed when dares are enabled.
    pub fn config(&self) -> Config {
        match self.solution {
            Solution::Answer => self.flags.config(),
            Solution::Naive => self.flags.dare_config(),
        }
    }
}

/// The report of one dare.
#[derive(Debug, Clone)]
pub struct DareRun {
    pub dare: Dare,
    pub solution: Solution,
    pub report: RunReport,
}

impl DareRun {
    /// Display name, e.g. `cloud-storage/answer`.
    pub fn name(&self) -> String {
        format!("{}/{}", self.dare, self.solution)
    }
}

/// Run every selected dare.
pub fn run_session(session: &SessionConfig) -> Vec<DareRun> {
    let config = session.config();
    session
        .dares
        .iter()
        .map(|&dare| {
            info!("running {} with the {} solution", dare, session.solution);
            let report = dare.run(session.solution, config);
            DareRun {
                dare,
                solution: session.solution,
                report,
            }
        })
        .collect()
}

/// Whether any run in the session failed.
pub fn has_failures(runs: &[DareRun]) -> bool {
    runs.iter().any(|run| !run.report.passed())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answers_pass() {
        let runs = run_session(&SessionConfig::default());
        assert_eq!(runs.len(), 3);
        assert!(!has_failures(&runs));
        assert_eq!(runs[0].name(), "cloud-storage/answer");
    }

    #[test]
    fn test_naive_is_skipped_unless_enabled() {
        let mut session = SessionConfig {
            dares: vec![Dare::TrickyCatch],
            solution: Solution::Naive,
            flags: DareFlags::default(),
        };
        assert!(session.config().soft_fail);
        assert!(!has_failures(&run_session(&session)));

        session.flags.enable_dare = true;
        assert!(has_failures(&run_session(&session)));
    }

    #[test]
    fn test_answer_config_ignores_enable_dare() {
        let session = SessionConfig {
            flags: DareFlags {
                enable_dare: true,
                ..DareFlags::default()
            },
            ..SessionConfig::default()
        };
        assert_eq!(session.config(), Config::RELAXED);
    }
}
