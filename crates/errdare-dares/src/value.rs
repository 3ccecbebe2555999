//! Simulated values handed to dare solutions.
//!
//! Every value returned by a dare operation carries the key it was acquired
//! under.  The traits describe what a solution may do with a value:
//!
//! | Trait              | Capability                                   |
//! |--------------------|----------------------------------------------|
//! | [`Value`]          | Identify the value (checked by operations)   |
//! | [`Close`]          | Release with the error currently outstanding |
//! | [`CloseWithError`] | Release, stating the error being handled     |
//! | [`Abort`]          | Give the value up without reporting an error |
//!
//! One concrete type, [`Token`], implements all of them; dare operations
//! return it behind the narrowest trait that fits its role.

use errdare_sim::{Options, Outcome, SimError, Simulation};

// ═══════════════════════════════════════════════════════════════════════
//  Capabilities
// ═══════════════════════════════════════════════════════════════════════

/// Any value returned by a dare operation.
pub trait Value {
    fn key(&self) -> &str;
}

/// A value that must be closed.
pub trait Close: Value {
    fn close(&self) -> Outcome;
}

/// A value that must be closed with the error that ended its use, if any.
pub trait CloseWithError: Close {
    fn close_with_error(&self, err: Option<&SimError>) -> Outcome;
}

/// A value that can be abandoned.
pub trait Abort: Close {
    /// Release the value, discarding the close result.
    fn abort(&self, _err: Option<&SimError>) {
        let _ = self.close();
    }
}

/// A value that needs no cleanup, identified by its key alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Key(pub &'static str);

impl Value for Key {
    fn key(&self) -> &str {
        self.0
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Token
// ═══════════════════════════════════════════════════════════════════════

/// A simulated resource: a key plus the options its release runs under.
#[derive(Debug, Clone)]
pub struct Token {
    sim: Simulation,
    key: String,
    release: Options,
}

impl Token {
    pub(crate) fn new(sim: &Simulation, key: &str, release: Options) -> Self {
        Self {
            sim: sim.clone(),
            key: key.to_string(),
            release,
        }
    }

    pub(crate) fn with_release(mut self, release: Options) -> Self {
        self.release = release;
        self
    }

    /// Options the release of this token is simulated with.
    pub fn release_options(&self) -> Options {
        self.release
    }
}

impl Value for Token {
    fn key(&self) -> &str {
        &self.key
    }
}

impl Close for Token {
    fn close(&self) -> Outcome {
        self.sim.release(&self.key, self.release)
    }
}

impl CloseWithError for Token {
    fn close_with_error(&self, err: Option<&SimError>) -> Outcome {
        self.sim.release_with_error(&self.key, err, self.release)
    }
}

impl Abort for Token {}

// ═══════════════════════════════════════════════════════════════════════
//  Operation helpers
// ═══════════════════════════════════════════════════════════════════════

/// Stop the execution if `value` is not the value an operation expects.
pub fn require(sim: &Simulation, value: &dyn Value, key: &str) {
    if value.key() != key {
        sim.fatal(format!("got {:?}; want {:?}", value.key(), key));
    }
}

/// Acquire a resource that may fail to open.
pub(crate) fn fallible(sim: &Simulation, key: &str, opts: Options) -> Result<Token, SimError> {
    sim.acquire(key, opts)?;
    Ok(Token::new(sim, key, Options::new()))
}

/// Acquire a resource whose creation cannot fault, only abort.
pub(crate) fn infallible(sim: &Simulation, key: &str, opts: Options) -> Token {
    // Faults are suppressed: the call either succeeds or unwinds.
    let _ = sim.acquire(key, opts.no_fault());
    Token::new(sim, key, Options::new())
}

/// An operation that may fail but owns nothing afterwards.
pub(crate) fn operation(sim: &Simulation, key: &str, opts: Options) -> Outcome {
    sim.acquire(key, opts.no_release())
}

/// A step that cannot fault and owns nothing afterwards.
pub(crate) fn step(sim: &Simulation, key: &str, opts: Options) {
    let _ = sim.acquire(key, opts.no_fault().no_release());
}
