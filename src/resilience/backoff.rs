//! Exponential backoff with jitter.

use std::time::Duration;

use rand::Rng;

/// Reconnect schedule: `base * 2^(attempt-1)`, capped at `max`, plus up to
/// 10% jitter.
#[derive(Debug, Clone)]
pub struct Backoff {
    base_ms: u64,
    max_ms: u64,
    attempt: u32,
}

impl Backoff {
    pub fn new(base_ms: u64, max_ms: u64) -> Self {
        Self {
            base_ms,
            max_ms,
            attempt: 0,
        }
    }

    /// Delay before the next attempt. Advances the schedule.
    pub fn next_delay(&mut self) -> Duration {
        self.attempt = self.attempt.saturating_add(1);
        let capped = capped_delay_ms(self.attempt, self.base_ms, self.max_ms);

        let jitter_range = capped / 10;
        let jitter = if jitter_range > 0 {
            rand::thread_rng().gen_range(0..jitter_range)
        } else {
            0
        };

        Duration::from_millis(capped + jitter)
    }

    /// Attempts made since the last reset.
    pub fn attempts(&self) -> u32 {
        self.attempt
    }

    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}

fn capped_delay_ms(attempt: u32, base_ms: u64, max_ms: u64) -> u64 {
    if attempt == 0 {
        return 0;
    }
    let factor = 2u64.saturating_pow(attempt - 1);
    base_ms.saturating_mul(factor).min(max_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_double_until_capped() {
        let mut backoff = Backoff::new(100, 1000);

        let d1 = backoff.next_delay().as_millis();
        assert!((100..110).contains(&d1), "{d1}");

        let d2 = backoff.next_delay().as_millis();
        assert!((200..220).contains(&d2), "{d2}");

        for _ in 0..10 {
            backoff.next_delay();
        }
        let capped = backoff.next_delay().as_millis();
        assert!((1000..1100).contains(&capped), "{capped}");
    }

    #[test]
    fn reset_restarts_schedule() {
        let mut backoff = Backoff::new(50, 5000);
        backoff.next_delay();
        backoff.next_delay();
        assert_eq!(backoff.attempts(), 2);

        backoff.reset();
        assert_eq!(backoff.attempts(), 0);
        assert!(backoff.next_delay().as_millis() < 60);
    }

    #[test]
    fn huge_attempt_counts_saturate() {
        assert_eq!(capped_delay_ms(200, u64::MAX / 2, 7000), 7000);
    }
}
