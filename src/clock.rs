//! Injected time source.
//!
//! Every scheduling derivation takes "now" as an argument; nothing in the
//! core reads the wall clock directly. The app hands a [`SystemClock`] to
//! the service layer, tests pin the moment with [`FixedClock`].

use chrono::{DateTime, Utc};

/// Supplier of the current instant.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at a chosen instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
