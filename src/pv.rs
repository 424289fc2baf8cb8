//! The PV client contract consumed by [`Device`](crate::Device)
//!
//! Anything that can hand out a handle for a fully-qualified PV name, and read and
//! write through that handle, can back a Device. Connection management, the wire
//! protocol and error semantics all stay with the implementor.

use std::time::Duration;

use crate::utils::{get_default_put_timeout, get_default_put_wait};

/// A binding to one PV, as handed out by a [`PvFactory`]
pub trait PvHandle {
    /// What a read returns
    type Value;
    /// What a write returns, e.g. a completion status
    type PutResult;
    type Error;

    /// Read the current value, optionally as a string representation
    fn get(&self, as_string: bool) -> Result<Self::Value, Self::Error>;

    /// Write a value. If `wait` is set, block until the write completes or `timeout`
    /// expires, as far as the implementation supports it.
    fn put(
        &self,
        value: Self::Value,
        wait: bool,
        timeout: Duration,
    ) -> Result<Self::PutResult, Self::Error>;
}

/// Creates handles from fully-qualified PV names
pub trait PvFactory {
    type Handle: PvHandle;

    /// Create a new handle for `pv_name`.
    ///
    /// This may start a connection attempt; whether it blocks on one is up to the
    /// implementation.
    fn create_pv(&mut self, pv_name: &str) -> Result<Self::Handle, PvError<Self>>;
}

/// The error type surfaced by the handles of a factory
pub type PvError<F> = <<F as PvFactory>::Handle as PvHandle>::Error;

/// A value type of the handles of a factory
pub type PvValueOf<F> = <<F as PvFactory>::Handle as PvHandle>::Value;

/// The write result of the handles of a factory
pub type PutResultOf<F> = <<F as PvFactory>::Handle as PvHandle>::PutResult;

impl<H, T> PvFactory for T
where
    H: PvHandle,
    T: FnMut(&str) -> Result<H, H::Error>,
{
    type Handle = H;

    fn create_pv(&mut self, pv_name: &str) -> Result<H, H::Error> {
        self(pv_name)
    }
}

/// Options forwarded with every write
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PutOptions {
    /// Wait for the write to complete before returning
    pub wait: bool,
    /// Upper bound on how long to wait
    pub timeout: Duration,
}

impl PutOptions {
    pub fn new(wait: bool, timeout: Duration) -> Self {
        PutOptions { wait, timeout }
    }
    pub fn wait(mut self, wait: bool) -> Self {
        self.wait = wait;
        self
    }
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for PutOptions {
    /// No wait, 10 second timeout, unless overridden in the environment
    fn default() -> Self {
        PutOptions {
            wait: get_default_put_wait(),
            timeout: get_default_put_timeout(),
        }
    }
}
