//! Unit tests for the bounded retry policy.

use std::time::Duration;

use candle_downloader::downloader::config::{
    RetryPolicy, INITIAL_BACKOFF_MS, MAX_BACKOFF_MS, MAX_RETRIES,
};

#[test]
fn test_default_policy_matches_constants() {
    let policy = RetryPolicy::default();
    assert_eq!(policy.max_attempts, MAX_RETRIES);
    assert_eq!(policy.initial_backoff_ms, INITIAL_BACKOFF_MS);
    assert_eq!(policy.max_backoff_ms, MAX_BACKOFF_MS);
}

#[test]
fn test_backoff_doubles_until_capped() {
    let policy = RetryPolicy {
        max_attempts: 10,
        initial_backoff_ms: 100,
        max_backoff_ms: 1000,
    };
    assert_eq!(policy.backoff(0), Duration::from_millis(100));
    assert_eq!(policy.backoff(1), Duration::from_millis(200));
    assert_eq!(policy.backoff(2), Duration::from_millis(400));
    assert_eq!(policy.backoff(3), Duration::from_millis(800));
    assert_eq!(policy.backoff(4), Duration::from_millis(1000));
    assert_eq!(policy.backoff(20), Duration::from_millis(1000));
}

#[test]
fn test_extreme_retry_count_saturates() {
    let policy = RetryPolicy::default();
    assert_eq!(
        policy.backoff(u32::MAX),
        Duration::from_millis(MAX_BACKOFF_MS)
    );
}
