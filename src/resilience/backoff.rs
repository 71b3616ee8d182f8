//! Exponential backoff with jitter.

use std::time::Duration;
use rand::Rng;

/// Calculate exponential backoff delay with jitter.
///
/// `attempt` is the number of failed attempts so far; attempt 0 has no delay.
pub fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    let capped_delay = capped_delay_ms(attempt, base_ms, max_ms);

    // Apply jitter (0 to 10% of the delay)
    let jitter_range = capped_delay / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(capped_delay + jitter)
}

/// Same schedule as [`calculate_backoff`] without jitter.
pub fn calculate_backoff_exact(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    Duration::from_millis(capped_delay_ms(attempt, base_ms, max_ms))
}

fn capped_delay_ms(attempt: u32, base_ms: u64, max_ms: u64) -> u64 {
    if attempt == 0 {
        return 0;
    }

    let exponential_base = 2u64.saturating_pow(attempt - 1);
    base_ms.saturating_mul(exponential_base).min(max_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_calculation() {
        let b1 = calculate_backoff(1, 100, 2000);
        assert!(b1.as_millis() >= 100);

        let b2 = calculate_backoff(2, 100, 2000);
        assert!(b2.as_millis() >= 200);

        let max = calculate_backoff(10, 100, 1000);
        assert!(max.as_millis() >= 1000);
        assert!(max.as_millis() < 1100);
    }

    #[test]
    fn test_exact_schedule() {
        let delays: Vec<u128> = (0..7)
            .map(|n| calculate_backoff_exact(n, 250, 2000).as_millis())
            .collect();
        assert_eq!(delays, vec![0, 250, 500, 1000, 2000, 2000, 2000]);
    }

    #[test]
    fn test_huge_attempt_does_not_overflow() {
        assert_eq!(calculate_backoff_exact(200, 250, 2000), Duration::from_millis(2000));
    }
}
