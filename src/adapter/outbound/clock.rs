//! System wall clock.

use chrono::{DateTime, Utc};

use crate::port::outbound::clock::Clock;

/// [`Clock`] backed by [`Utc::now`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
