//! Cleanup dares for the errdare simulation engine.
//!
//! A dare is a small scenario whose resources have a tricky cleanup
//! contract.  A solution is a function that uses the dare's operations; the
//! engine runs it for every combination of faults and aborts those
//! operations can produce and reports each place the solution leaked a
//! resource or returned the wrong error.
//!
//! # Quick start
//!
//! ```
//! use errdare_dares::{run_tricky_catch, Close, CloseWithError};
//! use errdare_sim::{unwind, Config, Outcome};
//!
//! let report = run_tricky_catch(Config::RELAXED, |t| {
//!     let w = t.new_writer()?;
//!     let res = unwind::catch(|| -> Outcome {
//!         let ww = t.new_wrapper(&w)?;
//!         match unwind::catch(|| t.write_something(&ww)) {
//!             Ok(written) => {
//!                 let closed = ww.close();
//!                 written.and(closed)
//!             }
//!             Err(u) => {
//!                 let _ = ww.close();
//!                 u.resume()
//!             }
//!         }
//!     });
//!     match res {
//!         Ok(out) => {
//!             let closed = w.close_with_error(out.as_ref().err());
//!             out.and(closed)
//!         }
//!         Err(u) => {
//!             let _ = w.close_with_error(u.abort());
//!             u.resume()
//!         }
//!     }
//! });
//! assert!(report.passed());
//! ```

pub mod answers;
pub mod catalog;
pub mod cloud_storage;
pub mod flags;
pub mod naive;
pub mod pipe_convert;
pub mod tricky_catch;
pub mod value;

pub use catalog::{Dare, Solution};
pub use cloud_storage::{run_cloud_storage, CloudStorage};
pub use flags::DareFlags;
pub use pipe_convert::{run_pipe_convert, PipeConvert, PipeWriter};
pub use tricky_catch::{run_tricky_catch, TrickyCatch};
pub use value::{require, Abort, Close, CloseWithError, Key, Token, Value};
