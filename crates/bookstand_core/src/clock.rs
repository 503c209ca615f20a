//! Wall-clock abstraction for timestamp-named artifacts.
//!
//! Snapshot and export filenames embed a timestamp; routing those reads
//! through a trait keeps retention and naming tests deterministic.

use chrono::{DateTime, Utc};

/// Timestamp source for snapshot and export naming.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

/// Clock backed by the system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
