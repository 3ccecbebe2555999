//! The set of dares and the solutions shipped for each.

use crate::cloud_storage::run_cloud_storage;
use crate::pipe_convert::run_pipe_convert;
use crate::tricky_catch::run_tricky_catch;
use crate::{answers, naive};
use errdare_sim::{Config, RunReport};
use std::fmt;

/// One dare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dare {
    CloudStorage,
    PipeConvert,
    TrickyCatch,
}

/// Which shipped solution to run against a dare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Solution {
    /// The reference solution; passes under relaxed policy.
    Answer,
    /// The simplistic solution from the dare description; fails.
    Naive,
}

impl Dare {
    pub const ALL: [Dare; 3] = [Dare::CloudStorage, Dare::PipeConvert, Dare::TrickyCatch];

    pub fn name(self) -> &'static str {
        match self {
            Dare::CloudStorage => "cloud-storage",
            Dare::PipeConvert => "pipe-convert",
            Dare::TrickyCatch => "tricky-catch",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Dare::CloudStorage => {
                "copy a reader into a writer; pass copy errors to the writer's close"
            }
            Dare::PipeConvert => "scan a reader into a pipe from a producer thread",
            Dare::TrickyCatch => "write through a wrapper; close the writer with any error",
        }
    }

    /// Run `solution` against this dare under `config`.
    pub fn run(self, solution: Solution, config: Config) -> RunReport {
        match (self, solution) {
            (Dare::CloudStorage, Solution::Answer) => {
                run_cloud_storage(config, answers::cloud_storage)
            }
            (Dare::CloudStorage, Solution::Naive) => run_cloud_storage(config, naive::cloud_storage),
            (Dare::PipeConvert, Solution::Answer) => run_pipe_convert(config, answers::pipe_convert),
            (Dare::PipeConvert, Solution::Naive) => run_pipe_convert(config, naive::pipe_convert),
            (Dare::TrickyCatch, Solution::Answer) => run_tricky_catch(config, answers::tricky_catch),
            (Dare::TrickyCatch, Solution::Naive) => run_tricky_catch(config, naive::tricky_catch),
        }
    }
}

impl fmt::Display for Dare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Solution {
    pub fn name(self) -> &'static str {
        match self {
            Solution::Answer => "answer",
            Solution::Naive => "naive",
        }
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::DareFlags;

    #[test]
    fn answers_pass_with_default_flags() {
        let config = DareFlags::default().config();
        for dare in Dare::ALL {
            let report = dare.run(Solution::Answer, config);
            assert!(report.passed(), "{dare}:\n{}", report.transcript());
        }
    }

    #[test]
    fn naive_solutions_fail_hard() {
        for dare in Dare::ALL {
            let report = dare.run(Solution::Naive, Config::RELAXED);
            assert!(!report.passed(), "{dare} unexpectedly passed");
        }
    }

    // The dares as a test suite: skipped unless ERRDARE_DARE is set.
    #[test]
    fn naive_solutions_under_env_flags() {
        let flags = DareFlags::from_env();
        for dare in Dare::ALL {
            let report = dare.run(Solution::Naive, flags.dare_config());
            assert_eq!(report.passed(), !flags.enable_dare, "{dare}");
        }
    }

    #[test]
    fn names_are_unique() {
        let mut names: Vec<_> = Dare::ALL.iter().map(|d| d.name()).collect();
        names.dedup();
        assert_eq!(names.len(), 3);
        assert_eq!(Solution::Naive.to_string(), "naive");
    }
}
