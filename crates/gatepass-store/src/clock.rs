//! System clock adapter for the lifecycle's `Clock` port.

use chrono::{DateTime, Utc};

use gatepass_core::traits::Clock;

/// Reads the host's wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
