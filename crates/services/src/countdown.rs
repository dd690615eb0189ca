use chrono::{DateTime, Utc};

use exam_core::time::remaining_seconds;

//
// ─── COUNTDOWN ─────────────────────────────────────────────────────────────────
//

/// Outcome of a single countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Still counting; carries the new remaining-seconds value.
    Running(u32),
    /// The countdown just reached zero. Reported exactly once per attempt.
    Expired,
    /// Nothing to do: already expired and reported, or halted.
    Idle,
}

/// One-second countdown reconciling the absolute deadline with the
/// per-attempt duration window.
///
/// Expiry is edge-triggered: the transition to zero yields [`Tick::Expired`]
/// on exactly one tick, and every tick after that yields [`Tick::Idle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    remaining: u32,
    expiry_reported: bool,
    halted: bool,
}

impl Countdown {
    /// Seed the countdown from the exam's deadline, its per-attempt duration
    /// and the attempt anchor time.
    #[must_use]
    pub fn seed(
        deadline: DateTime<Utc>,
        duration_minutes: u32,
        started_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        Self::from_remaining(remaining_seconds(
            deadline,
            duration_minutes,
            Some(started_at),
            now,
        ))
    }

    /// Countdown with an explicit remaining-seconds value.
    ///
    /// A countdown seeded at zero reports `Expired` on its first tick.
    #[must_use]
    pub fn from_remaining(remaining: u32) -> Self {
        Self {
            remaining,
            expiry_reported: false,
            halted: false,
        }
    }

    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining == 0 && self.expiry_reported
    }

    #[must_use]
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Freeze the countdown. Used when the session ends (submission
    /// succeeded or the component is torn down); no later tick can report
    /// expiry.
    pub fn halt(&mut self) {
        self.halted = true;
    }

    /// Advance by one second.
    pub fn tick(&mut self) -> Tick {
        if self.halted {
            return Tick::Idle;
        }

        if self.remaining > 0 {
            self.remaining -= 1;
            if self.remaining == 0 {
                self.expiry_reported = true;
                return Tick::Expired;
            }
            return Tick::Running(self.remaining);
        }

        if !self.expiry_reported {
            self.expiry_reported = true;
            return Tick::Expired;
        }

        Tick::Idle
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use exam_core::time::fixed_now;

    #[test]
    fn seed_uses_duration_window_on_fresh_start() {
        let now = fixed_now();
        let countdown = Countdown::seed(now + Duration::minutes(120), 60, now, now);
        assert_eq!(countdown.remaining(), 3600);
    }

    #[test]
    fn seed_uses_deadline_when_it_binds_first() {
        let now = fixed_now();
        let countdown = Countdown::seed(now + Duration::minutes(5), 60, now, now);
        assert_eq!(countdown.remaining(), 300);
    }

    #[test]
    fn tick_counts_down_by_one() {
        let mut countdown = Countdown::from_remaining(3);
        assert_eq!(countdown.tick(), Tick::Running(2));
        assert_eq!(countdown.tick(), Tick::Running(1));
        assert_eq!(countdown.remaining(), 1);
    }

    #[test]
    fn expiry_fires_exactly_once() {
        let mut countdown = Countdown::from_remaining(2);
        assert_eq!(countdown.tick(), Tick::Running(1));
        assert_eq!(countdown.tick(), Tick::Expired);
        assert_eq!(countdown.tick(), Tick::Idle);
        assert_eq!(countdown.tick(), Tick::Idle);
        assert!(countdown.is_expired());
    }

    #[test]
    fn countdown_seeded_at_zero_expires_on_first_tick() {
        let mut countdown = Countdown::from_remaining(0);
        assert_eq!(countdown.tick(), Tick::Expired);
        assert_eq!(countdown.tick(), Tick::Idle);
    }

    #[test]
    fn halted_countdown_never_reports_expiry() {
        let mut countdown = Countdown::from_remaining(1);
        countdown.halt();
        assert_eq!(countdown.tick(), Tick::Idle);
        assert_eq!(countdown.remaining(), 1);
        assert!(!countdown.is_expired());
    }
}
