//! Bounded retry with exponential backoff.
//!
//! Callers classify each failure as [`Failure::Transient`] or
//! [`Failure::Fatal`]. Transient failures are retried after
//! `base_delay * 2^attempt` until `max_attempts` calls have been made; fatal
//! failures and the last transient failure are returned as-is.

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::time::Duration;
use tracing::warn;

/// Classification of a failed attempt.
#[derive(Debug)]
pub enum Failure<E> {
    /// Worth another attempt (e.g. HTTP 5xx).
    Transient(E),
    /// Give up immediately.
    Fatal(E),
}

impl<E> Failure<E> {
    pub fn into_inner(self) -> E {
        match self {
            Failure::Transient(e) | Failure::Fatal(e) => e,
        }
    }
}

/// Attempt cap and backoff base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    #[serde(with = "secs")]
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Wait before the retry that follows failed attempt `attempt` (0-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt))
    }

    /// Run `op`, sleeping on the current thread between attempts.
    pub fn run<T, E, F>(&self, op: F) -> Result<T, E>
    where
        E: Display,
        F: FnMut(u32) -> Result<T, Failure<E>>,
    {
        self.run_with_sleep(op, std::thread::sleep)
    }

    /// Same as [`run`](Self::run) with an injectable sleep.
    pub fn run_with_sleep<T, E, F, S>(&self, mut op: F, mut sleep: S) -> Result<T, E>
    where
        E: Display,
        F: FnMut(u32) -> Result<T, Failure<E>>,
        S: FnMut(Duration),
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            match op(attempt) {
                Ok(value) => return Ok(value),
                Err(Failure::Fatal(e)) => return Err(e),
                Err(Failure::Transient(e)) => {
                    if attempt + 1 >= attempts {
                        return Err(e);
                    }
                    let wait = self.delay_for(attempt);
                    warn!(
                        attempt = attempt + 1,
                        max_attempts = attempts,
                        wait_secs = wait.as_secs_f64(),
                        "{e}: retrying"
                    );
                    sleep(wait);
                    attempt += 1;
                }
            }
        }
    }
}

mod secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        if !secs.is_finite() || secs < 0.0 {
            return Err(serde::de::Error::custom("delay must be a non-negative number of seconds"));
        }
        Ok(Duration::from_secs_f64(secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn policy() -> RetryPolicy {
        RetryPolicy::new(5, Duration::from_secs(8))
    }

    #[test]
    fn delays_double_from_base() {
        let p = policy();
        assert_eq!(p.delay_for(0), Duration::from_secs(8));
        assert_eq!(p.delay_for(1), Duration::from_secs(16));
        assert_eq!(p.delay_for(3), Duration::from_secs(64));
    }

    #[test]
    fn success_after_transient_failures() {
        let sleeps = RefCell::new(Vec::new());
        let result: Result<&str, String> = policy().run_with_sleep(
            |attempt| {
                if attempt < 2 {
                    Err(Failure::Transient(format!("HTTP 503 on {attempt}")))
                } else {
                    Ok("done")
                }
            },
            |d| sleeps.borrow_mut().push(d),
        );
        assert_eq!(result.unwrap(), "done");
        assert_eq!(
            *sleeps.borrow(),
            vec![Duration::from_secs(8), Duration::from_secs(16)]
        );
    }

    #[test]
    fn fatal_failure_is_not_retried() {
        let mut calls = 0;
        let result: Result<(), String> = policy().run_with_sleep(
            |_| {
                calls += 1;
                Err(Failure::Fatal("HTTP 404".to_string()))
            },
            |_| panic!("must not sleep"),
        );
        assert_eq!(result.unwrap_err(), "HTTP 404");
        assert_eq!(calls, 1);
    }

    #[test]
    fn exhaustion_returns_last_error() {
        let mut calls = 0;
        let mut slept = 0;
        let result: Result<(), String> = policy().run_with_sleep(
            |attempt| {
                calls += 1;
                Err(Failure::Transient(format!("HTTP 502 #{attempt}")))
            },
            |_| slept += 1,
        );
        assert_eq!(result.unwrap_err(), "HTTP 502 #4");
        assert_eq!(calls, 5);
        assert_eq!(slept, 4);
    }

    #[test]
    fn zero_attempts_still_calls_once() {
        let p = RetryPolicy::new(0, Duration::ZERO);
        let mut calls = 0;
        let _: Result<(), String> = p.run_with_sleep(
            |_| {
                calls += 1;
                Err(Failure::Transient("boom".into()))
            },
            |_| {},
        );
        assert_eq!(calls, 1);
    }

    #[test]
    fn policy_deserializes_seconds() {
        let p: RetryPolicy = serde_json::from_str(r#"{"max_attempts":3,"base_delay":0.5}"#).unwrap();
        assert_eq!(p.max_attempts, 3);
        assert_eq!(p.base_delay, Duration::from_millis(500));
    }
}
