//! Transient user notifications ("toasts").
//!
//! A toast is visible from the moment it is raised until a fixed deadline
//! 2.8 seconds later. Raising a new toast replaces the message and restarts
//! the deadline, so only the most recent call decides when it disappears.
//!
//! Expiry is evaluated against a [`Clock`] instead of a pending timer
//! callback. Nothing is ever scheduled, which means dropping the owner of a
//! toast can never race a late clear.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// How long a toast stays visible, in milliseconds.
pub const TOAST_DURATION_MS: i64 = 2_800;

/// How long a toast stays visible.
#[must_use]
pub fn toast_duration() -> TimeDelta {
    TimeDelta::milliseconds(TOAST_DURATION_MS)
}

/// Source of the current time.
pub trait Clock: Send + Sync + fmt::Debug {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Create a clock frozen at `start`.
    #[must_use]
    pub const fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: TimeDelta) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }

    /// Move the clock forward by whole milliseconds.
    pub fn advance_ms(&self, ms: i64) {
        self.advance(TimeDelta::milliseconds(ms));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A raised notification and the instant it was raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub message: String,
    pub shown_at: DateTime<Utc>,
}

impl Toast {
    /// Raise `message` at `now`.
    #[must_use]
    pub fn raise(message: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            message: message.into(),
            shown_at: now,
        }
    }

    /// The instant this toast stops being visible.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.shown_at + toast_duration()
    }

    /// Whether the toast is still showing at `now`.
    #[must_use]
    pub fn is_visible(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at()
    }

    /// Time left before the toast clears, zero once expired.
    #[must_use]
    pub fn remaining(&self, now: DateTime<Utc>) -> TimeDelta {
        (self.expires_at() - now).max(TimeDelta::zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0)
            .single()
            .unwrap_or_default()
    }

    #[test]
    fn test_visible_until_deadline() {
        let toast = Toast::raise("saved", start());
        assert!(toast.is_visible(start()));
        assert!(toast.is_visible(start() + TimeDelta::milliseconds(2_799)));
        assert!(!toast.is_visible(start() + TimeDelta::milliseconds(2_800)));
    }

    #[test]
    fn test_remaining_never_negative() {
        let toast = Toast::raise("saved", start());
        assert_eq!(
            toast.remaining(start() + TimeDelta::seconds(10)),
            TimeDelta::zero()
        );
        assert_eq!(
            toast.remaining(start() + TimeDelta::milliseconds(800)),
            TimeDelta::milliseconds(2_000)
        );
    }

    #[test]
    fn test_manual_clock_advances() {
        let clock = ManualClock::new(start());
        clock.advance_ms(1_500);
        assert_eq!(clock.now(), start() + TimeDelta::milliseconds(1_500));
    }
}
