//! Session driver for the errdare dares.
//!
//! Backs the `errdare` binary: a session runs a selection of dares with
//! one solution under one set of strictness flags, and its results can be
//! exported to JSON.
//!
//! ```no_run
//! use errdare_cli::export::{save_export, SessionExport};
//! use errdare_cli::session::{run_session, SessionConfig};
//! use errdare_sim::format_report;
//!
//! let runs = run_session(&SessionConfig::default());
//! for run in &runs {
//!     println!("{}", format_report(&run.name(), &run.report));
//! }
//! save_export("session.json", &SessionExport::from_runs(&runs)).unwrap();
//! ```
//!
//! # Module Structure
//!
//! - [`session`]: Dare selection and execution
//! - [`export`]: JSON export of run reports

pub mod export;
pub mod session;
