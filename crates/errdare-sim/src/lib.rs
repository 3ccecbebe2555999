//! Exhaustive fault and abort simulation for resource-lifecycle code.
//!
//! A scenario performs simulated operations through a [`Simulation`]
//! handle.  [`run`] calls the scenario once for every combination of
//! outcomes its operations can produce (success, synthetic fault, synthetic
//! abort) and checks each execution for correct error propagation and
//! correct release discipline.
//!
//! # Architecture
//!
//! ```text
//! Scenario                 Checker                      Enumerator
//! ────────                 ───────                      ──────────
//! sim.acquire(key)  ──→ history.record() ──→ mode ──→ ledger.record()
//! sim.release(key)  ──→ history.release() ──→ ledger.matches()
//! return Outcome    ──→ finish_execution() ──→ history.advance()
//! ```
//!
//! # Modules
//!
//! 1. **[`mode`]**, **[`options`]**, **[`config`]**: outcome modes, per-call
//!    options and run policy
//! 2. **[`history`]**, **[`ledger`]**: the replayed execution path and the
//!    error a scenario owes
//! 3. **[`simulation`]**, **[`harness`]**: the protocol checker and the
//!    enumeration loop
//! 4. **[`report`]**, **[`violation`]**: what the run observed

pub mod config;
pub mod harness;
pub mod history;
pub mod ledger;
pub mod mode;
pub mod options;
pub mod report;
pub mod simulation;
pub mod unwind;
pub mod violation;

pub use config::Config;
pub use harness::run;
pub use mode::{Mode, SimError};
pub use options::Options;
pub use report::{format_report, KeyRecord, RunReport};
pub use simulation::{Outcome, Simulation};
pub use unwind::Unwind;
pub use violation::{Violation, ViolationRecord};
