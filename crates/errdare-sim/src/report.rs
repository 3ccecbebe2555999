//! Run reports: executions, violations and per-key outcome counters.
//!
//! A [`RunReport`] is produced by [`crate::run`] once the enumerator is
//! exhausted.  [`RunReport::assert_passed`] is the adapter for `#[test]`
//! functions; [`format_report`] renders the same information for humans.

use crate::config::Config;
use crate::mode::Mode;
use crate::violation::ViolationRecord;
use std::collections::BTreeMap;

/// Outcome counters for a single operation key across all executions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyRecord {
    /// Number of executions that reached this key.
    pub reached: u64,
    /// Times the key succeeded.
    pub no_fault: u64,
    /// Times the key returned a fault.
    pub faults: u64,
    /// Times the key aborted.
    pub aborts: u64,
}

impl KeyRecord {
    pub(crate) fn record(&mut self, mode: Mode) {
        self.reached += 1;
        match mode {
            Mode::NoFault => self.no_fault += 1,
            Mode::Fault => self.faults += 1,
            Mode::Abort => self.aborts += 1,
        }
    }

    /// Number of times the key ran in `mode`.
    pub fn count(&self, mode: Mode) -> u64 {
        match mode {
            Mode::NoFault => self.no_fault,
            Mode::Fault => self.faults,
            Mode::Abort => self.aborts,
        }
    }
}

/// Everything observed during one call to [`crate::run`].
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Policy the run was checked under.
    pub config: Config,
    /// Number of times the scenario was invoked.
    pub executions: usize,
    /// Violations in the order they were detected.
    pub violations: Vec<ViolationRecord>,
    /// Outcome counters keyed by operation key.
    pub keys: BTreeMap<String, KeyRecord>,
}

impl RunReport {
    /// Violations that fail the run.
    pub fn failures(&self) -> impl Iterator<Item = &ViolationRecord> {
        self.violations.iter().filter(|v| !v.skipped)
    }

    /// Violations downgraded to skips by soft-fail policy.
    pub fn skipped(&self) -> impl Iterator<Item = &ViolationRecord> {
        self.violations.iter().filter(|v| v.skipped)
    }

    /// Whether no violation failed the run.
    pub fn passed(&self) -> bool {
        self.failures().next().is_none()
    }

    /// Violations rendered as `"<execution>:<message>"` lines.
    pub fn transcript(&self) -> String {
        self.violations
            .iter()
            .map(|v| format!("{}:{}\n", v.execution, v.violation))
            .collect()
    }

    /// Panic with the formatted report if any violation failed the run.
    pub fn assert_passed(&self, name: &str) {
        if !self.passed() {
            panic!("{}", format_report(name, self));
        }
    }
}

/// Format a run report for human consumption.
pub fn format_report(name: &str, report: &RunReport) -> String {
    let mut output = String::new();
    let failures = report.failures().count();
    let skipped = report.skipped().count();

    output.push_str("═══════════════════════════════════════════════════════════════════════\n");
    output.push_str(&format!("  Simulation Report: {}\n", name));
    output.push_str("═══════════════════════════════════════════════════════════════════════\n\n");

    let cfg = &report.config;
    output.push_str(&format!("Executions:             {}\n", report.executions));
    output.push_str(&format!("Operation keys:         {}\n", report.keys.len()));
    output.push_str(&format!("Failures:               {}\n", failures));
    output.push_str(&format!("Skipped:                {}\n", skipped));
    output.push_str(&format!(
        "Policy:                 ignore_abort_order={} require_release_on_abort={} soft_fail={}\n",
        cfg.ignore_abort_order, cfg.require_release_on_abort, cfg.soft_fail
    ));
    output.push('\n');

    if !report.keys.is_empty() {
        output.push_str("─── Operations ────────────────────────────────────────────────────────\n");
        output.push_str(&format!(
            "{:<24} {:>8} {:>8} {:>8} {:>8}\n",
            "key", "reached", "ok", "fault", "abort"
        ));
        for (key, rec) in &report.keys {
            output.push_str(&format!(
                "{:<24} {:>8} {:>8} {:>8} {:>8}\n",
                key, rec.reached, rec.no_fault, rec.faults, rec.aborts
            ));
        }
        output.push('\n');
    }

    if report.violations.is_empty() {
        output.push_str("─── No Violations ─────────────────────────────────────────────────────\n");
        output.push_str("Every execution released its resources and returned the right error.\n\n");
    } else {
        output.push_str("─── Violations ────────────────────────────────────────────────────────\n");
        for v in &report.violations {
            let tag = if v.skipped { "SKIP" } else { "FAIL" };
            output.push_str(&format!(
                "[{}] execution {}: {}\n",
                tag, v.execution, v.violation
            ));
        }
        output.push('\n');
    }

    output.push_str("═══════════════════════════════════════════════════════════════════════\n");
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::violation::Violation;

    fn sample() -> RunReport {
        let mut keys = BTreeMap::new();
        let mut reader = KeyRecord::default();
        reader.record(Mode::NoFault);
        reader.record(Mode::Fault);
        keys.insert("reader".to_string(), reader);
        RunReport {
            config: Config::default(),
            executions: 2,
            violations: vec![
                ViolationRecord {
                    execution: 1,
                    violation: Violation::UnmatchedRelease { key: "o2".into() },
                    skipped: false,
                },
                ViolationRecord {
                    execution: 1,
                    violation: Violation::UnexpectedAbort,
                    skipped: true,
                },
            ],
            keys,
        }
    }

    #[test]
    fn key_record_counts_modes() {
        let report = sample();
        let reader = &report.keys["reader"];
        assert_eq!(reader.reached, 2);
        assert_eq!(reader.count(Mode::Fault), 1);
        assert_eq!(reader.count(Mode::Abort), 0);
    }

    #[test]
    fn skipped_violations_do_not_fail() {
        let mut report = sample();
        assert!(!report.passed());
        report.violations.remove(0);
        assert!(report.passed());
        assert_eq!(report.skipped().count(), 1);
    }

    #[test]
    fn transcript_lines() {
        assert_eq!(
            sample().transcript(),
            "1:unmatched release \"o2\"\n1:simulation aborted unexpectedly\n"
        );
    }

    #[test]
    fn format_report_lists_everything() {
        let text = format_report("sample", &sample());
        assert!(text.contains("Simulation Report: sample"));
        assert!(text.contains("Executions:             2"));
        assert!(text.contains("[FAIL] execution 1: unmatched release \"o2\""));
        assert!(text.contains("[SKIP] execution 1: simulation aborted unexpectedly"));
        assert!(text.contains("reader"));
    }

    #[test]
    #[should_panic(expected = "Simulation Report: failing")]
    fn assert_passed_panics_on_failure() {
        sample().assert_passed("failing");
    }
}
