use chrono::{DateTime, Duration, Utc};

/// A simple clock abstraction for deterministic time in services and tests.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    Default,
    Fixed(DateTime<Utc>),
}

impl Clock {
    /// Returns a clock that uses the current system time.
    #[must_use]
    pub fn default_clock() -> Self {
        Self::Default
    }

    /// Returns a clock fixed at the given timestamp.
    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    /// Returns the current time according to the clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::Default => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }

    /// If this is a fixed clock, advance it by the given duration.
    ///
    /// Has no effect on `Clock::Default`.
    pub fn advance(&mut self, delta: Duration) {
        if let Clock::Fixed(t) = self {
            *t += delta;
        }
    }

    /// Returns true if this clock represents real time.
    #[must_use]
    pub fn is_default(&self) -> bool {
        matches!(self, Clock::Default)
    }

    /// Returns true if this clock is fixed.
    #[must_use]
    pub fn is_fixed(&self) -> bool {
        matches!(self, Clock::Fixed(_))
    }
}

//
// ─── EXAM TIME ARITHMETIC ──────────────────────────────────────────────────────
//

/// Seconds left in an attempt, reconciling the absolute deadline with the
/// per-attempt duration window.
///
/// The effective end is `min(started_at + duration, deadline)`; whichever
/// binds first ends the attempt. Without a `started_at` anchor (which should
/// not normally occur) the deadline alone decides. Never negative.
#[must_use]
pub fn remaining_seconds(
    deadline: DateTime<Utc>,
    duration_minutes: u32,
    started_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> u32 {
    let effective_end = match started_at {
        Some(started) => {
            let window_end = started + Duration::minutes(i64::from(duration_minutes));
            window_end.min(deadline)
        }
        None => deadline,
    };

    let remaining = (effective_end - now).num_seconds();
    u32::try_from(remaining.max(0)).unwrap_or(u32::MAX)
}

/// Whole minutes spent on an attempt, clamped to the allowed duration.
#[must_use]
pub fn time_spent_minutes(
    started_at: DateTime<Utc>,
    now: DateTime<Utc>,
    duration_minutes: u32,
) -> u32 {
    let elapsed = (now - started_at).num_minutes().max(0);
    u32::try_from(elapsed)
        .unwrap_or(u32::MAX)
        .min(duration_minutes)
}

/// Formats remaining seconds as `HH:MM:SS`, or `MM:SS` under an hour.
#[must_use]
pub fn format_remaining(seconds: u32) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes:02}:{secs:02}")
    }
}

//
// ─── TEST CLOCK HELPERS ────────────────────────────────────────────────────────
//

/// Deterministic timestamp for tests and examples (2023-11-14T22:13:20Z).
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// Returns a deterministic `DateTime<Utc>` for tests and doc examples.
///
/// # Panics
///
/// Panics if the fixed timestamp cannot be represented.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid")
}

/// Returns a `Clock` fixed at the deterministic test timestamp.
#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_start_uses_full_duration_window() {
        let now = fixed_now();
        let deadline = now + Duration::minutes(120);
        assert_eq!(remaining_seconds(deadline, 60, Some(now), now), 3600);
    }

    #[test]
    fn resumed_attempt_subtracts_elapsed_time() {
        let started = fixed_now();
        let now = started + Duration::minutes(10);
        let deadline = started + Duration::minutes(120);
        assert_eq!(remaining_seconds(deadline, 60, Some(started), now), 3000);
    }

    #[test]
    fn near_deadline_binds_before_duration() {
        let now = fixed_now();
        let deadline = now + Duration::minutes(5);
        assert_eq!(remaining_seconds(deadline, 60, Some(now), now), 300);
    }

    #[test]
    fn remaining_clamps_to_zero_after_window() {
        let started = fixed_now();
        let now = started + Duration::minutes(90);
        let deadline = started + Duration::minutes(120);
        assert_eq!(remaining_seconds(deadline, 60, Some(started), now), 0);
    }

    #[test]
    fn missing_start_falls_back_to_deadline() {
        let now = fixed_now();
        let deadline = now + Duration::minutes(30);
        assert_eq!(remaining_seconds(deadline, 60, None, now), 1800);
    }

    #[test]
    fn time_spent_floors_and_clamps() {
        let started = fixed_now();

        let now = started + Duration::seconds(150);
        assert_eq!(time_spent_minutes(started, now, 60), 2);

        let late = started + Duration::minutes(300);
        assert_eq!(time_spent_minutes(started, late, 60), 60);

        // A skewed clock before the anchor never goes negative.
        let before = started - Duration::minutes(5);
        assert_eq!(time_spent_minutes(started, before, 60), 0);
    }

    #[test]
    fn format_remaining_switches_layout_at_one_hour() {
        assert_eq!(format_remaining(3661), "01:01:01");
        assert_eq!(format_remaining(300), "05:00");
        assert_eq!(format_remaining(0), "00:00");
    }

    #[test]
    fn fixed_clock_advances_deterministically() {
        let mut clock = fixed_clock();
        let before = clock.now();
        clock.advance(Duration::seconds(1));
        assert_eq!(clock.now(), before + Duration::seconds(1));
    }
}
