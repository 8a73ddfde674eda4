// prose-presence/prose-presence
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::time::Duration;

/// Exponential backoff: attempt `n` (1-based) waits `base * 2^(n-1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffSchedule {
    pub base_delay: Duration,
    pub max_attempts: u32,
}

impl BackoffSchedule {
    pub fn new(base_delay: Duration, max_attempts: u32) -> Self {
        Self {
            base_delay,
            max_attempts,
        }
    }

    /// The delay to wait before retry `attempt`, or `None` once the schedule is exhausted.
    pub fn delay(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || attempt > self.max_attempts {
            return None;
        }
        Some(self.base_delay.saturating_mul(1 << (attempt - 1).min(16)))
    }
}

impl Default for BackoffSchedule {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), 3)
    }
}

/// Bookkeeping for one in-flight write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryState {
    pub attempt: u32,
    pub next_delay: Option<Duration>,
    pub max_attempts: u32,
    /// Identifies the `set_status` call that owns this state.
    pub generation: u64,
}

impl RetryState {
    pub fn new(schedule: &BackoffSchedule, generation: u64) -> Self {
        Self {
            attempt: 0,
            next_delay: schedule.delay(1),
            max_attempts: schedule.max_attempts,
            generation,
        }
    }

    /// Records a failed attempt and returns how long to wait before the next one. Returns
    /// `None` when no retries are left.
    pub fn advance(&mut self, schedule: &BackoffSchedule) -> Option<Duration> {
        if self.is_exhausted() {
            return None;
        }
        self.attempt += 1;
        let delay = schedule.delay(self.attempt);
        self.next_delay = schedule.delay(self.attempt + 1);
        delay
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempt >= self.max_attempts
    }

    /// Number of store calls made once the current attempt has failed.
    pub fn calls_made(&self) -> u32 {
        self.attempt + 1
    }
}
