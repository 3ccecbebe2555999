//! Abort propagation through native unwinding.
//!
//! A synthetic abort is raised with [`std::panic::resume_unwind`] carrying
//! its [`SimError`], so it unwinds every frame between the failing operation
//! and the nearest [`catch`] without invoking the panic hook.  Scenarios
//! intercept aborts with [`catch`], run their cleanup, and continue the
//! unwind with [`Unwind::resume`].
//!
//! The engine uses the same mechanism to stop an execution after a protocol
//! violation.  That payload is private: [`Unwind::abort`] returns `None` for
//! it and the harness recognises it with [`Unwind::is_halt`].
//!
//! ```
//! use errdare_sim::unwind::{self, Unwind};
//! use errdare_sim::SimError;
//!
//! let caught = unwind::catch::<()>(|| unwind::raise_abort(SimError::abort("copy")));
//! let u: Unwind = caught.unwrap_err();
//! assert_eq!(u.abort(), Some(&SimError::abort("copy")));
//! assert!(!u.is_halt());
//! ```

use crate::mode::SimError;
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

/// Marker payload for an execution stopped by a protocol violation.
struct Halt;

/// A caught unwind, kept opaque so it can be resumed unchanged.
pub struct Unwind(Box<dyn Any + Send>);

impl Unwind {
    /// The synthetic abort carried by this unwind, if it is one.
    pub fn abort(&self) -> Option<&SimError> {
        self.0.downcast_ref::<SimError>()
    }

    /// Whether the engine halted the execution after a violation.
    pub fn is_halt(&self) -> bool {
        self.0.is::<Halt>()
    }

    /// Message of an ordinary panic, when it carried one.
    pub fn message(&self) -> Option<&str> {
        if let Some(s) = self.0.downcast_ref::<&'static str>() {
            Some(s)
        } else {
            self.0.downcast_ref::<String>().map(String::as_str)
        }
    }

    /// Continue unwinding with the original payload.
    pub fn resume(self) -> ! {
        panic::resume_unwind(self.0)
    }
}

impl fmt::Debug for Unwind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(err) = self.abort() {
            write!(f, "Unwind(abort {err})")
        } else if self.is_halt() {
            f.write_str("Unwind(halt)")
        } else if let Some(msg) = self.message() {
            write!(f, "Unwind(panic {msg:?})")
        } else {
            f.write_str("Unwind(..)")
        }
    }
}

/// Run `f`, capturing any unwind that escapes it.
///
/// Scenario code is treated as unwind safe: every execution starts from
/// freshly constructed state.
pub fn catch<R>(f: impl FnOnce() -> R) -> Result<R, Unwind> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(Unwind)
}

/// Raise `err` as a synthetic abort.
pub fn raise_abort(err: SimError) -> ! {
    panic::resume_unwind(Box::new(err))
}

pub(crate) fn halt() -> ! {
    panic::resume_unwind(Box::new(Halt))
}
