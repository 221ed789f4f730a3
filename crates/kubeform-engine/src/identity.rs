//! Synthetic resource identifiers
//!
//! An identifier is the wall-clock time of stamping in nanoseconds since the
//! Unix epoch. Two stamps taken within the same clock tick may collide; the
//! surrounding tool only uses the value to notice that a resource changed.

use chrono::Utc;
use std::sync::atomic::{AtomicI64, Ordering};

/// Current wall-clock time in nanoseconds since the Unix epoch
///
/// Saturates at `i64::MAX` for instants past the year 2262.
pub fn stamp() -> i64 {
    Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX)
}

/// Source of identifiers for the resource adapter
pub trait Clock: Send + Sync {
    fn now_nanos(&self) -> i64;
}

/// The real wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_nanos(&self) -> i64 {
        stamp()
    }
}

/// A deterministic clock that advances by a fixed step on every reading
#[derive(Debug)]
pub struct SteppingClock {
    next: AtomicI64,
    step: i64,
}

impl SteppingClock {
    pub fn new(start: i64, step: i64) -> Self {
        Self {
            next: AtomicI64::new(start),
            step,
        }
    }
}

impl Clock for SteppingClock {
    fn now_nanos(&self) -> i64 {
        self.next.fetch_add(self.step, Ordering::SeqCst)
    }
}
