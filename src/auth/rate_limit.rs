//! Rate limiting primitives for the account endpoints.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

const SIGNUP_WINDOW: Duration = Duration::from_secs(60 * 60);
const SIGNUP_MAX: u32 = 3;
const OTP_WINDOW: Duration = Duration::from_secs(5 * 60);
const OTP_MAX: u32 = 5;
const LOGIN_WINDOW: Duration = Duration::from_secs(60);
const LOGIN_MAX: u32 = 10;

/// Map size at which expired windows are evicted. The key is derived from
/// client-supplied headers, so the map must not grow without bound.
const PRUNE_THRESHOLD: usize = 1024;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RateLimitAction {
    Signup,
    Login,
    /// Verify and resend share one budget.
    Otp,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    Limited,
}

pub trait RateLimiter: Send + Sync {
    fn check_ip(&self, ip: Option<&str>, action: RateLimitAction) -> RateLimitDecision;
}

#[derive(Clone, Debug)]
pub struct NoopRateLimiter;

impl RateLimiter for NoopRateLimiter {
    fn check_ip(&self, _ip: Option<&str>, _action: RateLimitAction) -> RateLimitDecision {
        RateLimitDecision::Allowed
    }
}

/// Fixed windows per client IP: signup 3/hour, OTP 5/5min, login 10/min.
#[derive(Default)]
pub struct FixedWindowRateLimiter {
    windows: Mutex<HashMap<(String, RateLimitAction), (Instant, u32)>>,
}

impl FixedWindowRateLimiter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    const fn limits(action: RateLimitAction) -> (Duration, u32) {
        match action {
            RateLimitAction::Signup => (SIGNUP_WINDOW, SIGNUP_MAX),
            RateLimitAction::Otp => (OTP_WINDOW, OTP_MAX),
            RateLimitAction::Login => (LOGIN_WINDOW, LOGIN_MAX),
        }
    }

    /// Shift every tracked window into the past, as if `by` had elapsed.
    #[cfg(test)]
    fn backdate(&self, by: Duration) {
        let mut windows = self.windows.lock().unwrap();
        for (start, _) in windows.values_mut() {
            if let Some(earlier) = start.checked_sub(by) {
                *start = earlier;
            }
        }
    }
}

impl RateLimiter for FixedWindowRateLimiter {
    fn check_ip(&self, ip: Option<&str>, action: RateLimitAction) -> RateLimitDecision {
        // Without a client address there is nothing to key on.
        let Some(ip) = ip else {
            return RateLimitDecision::Allowed;
        };

        let (window, max) = Self::limits(action);
        let Ok(mut windows) = self.windows.lock() else {
            return RateLimitDecision::Allowed;
        };

        if windows.len() >= PRUNE_THRESHOLD {
            windows.retain(|(_, action), (start, _)| start.elapsed() < Self::limits(*action).0);
        }

        let entry = windows
            .entry((ip.to_string(), action))
            .or_insert_with(|| (Instant::now(), 0));
        if entry.0.elapsed() >= window {
            *entry = (Instant::now(), 0);
        }

        entry.1 += 1;
        if entry.1 > max {
            RateLimitDecision::Limited
        } else {
            RateLimitDecision::Allowed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_rate_limiter_allows() {
        let limiter = NoopRateLimiter;
        assert_eq!(
            limiter.check_ip(None, RateLimitAction::Signup),
            RateLimitDecision::Allowed
        );
        assert_eq!(
            limiter.check_ip(Some("1.2.3.4"), RateLimitAction::Login),
            RateLimitDecision::Allowed
        );
    }

    #[test]
    fn fixed_window_limits_after_budget() {
        let limiter = FixedWindowRateLimiter::new();
        for _ in 0..SIGNUP_MAX {
            assert_eq!(
                limiter.check_ip(Some("1.2.3.4"), RateLimitAction::Signup),
                RateLimitDecision::Allowed
            );
        }
        assert_eq!(
            limiter.check_ip(Some("1.2.3.4"), RateLimitAction::Signup),
            RateLimitDecision::Limited
        );
    }

    #[test]
    fn fixed_window_keys_by_ip_and_action() {
        let limiter = FixedWindowRateLimiter::new();
        for _ in 0..SIGNUP_MAX {
            limiter.check_ip(Some("1.2.3.4"), RateLimitAction::Signup);
        }

        // A different address or action still has budget.
        assert_eq!(
            limiter.check_ip(Some("5.6.7.8"), RateLimitAction::Signup),
            RateLimitDecision::Allowed
        );
        assert_eq!(
            limiter.check_ip(Some("1.2.3.4"), RateLimitAction::Login),
            RateLimitDecision::Allowed
        );
    }

    #[test]
    fn stale_windows_are_evicted_once_the_map_fills() {
        let limiter = FixedWindowRateLimiter::new();

        // Distinct addresses, as an attacker forging x-forwarded-for would mint.
        for n in 0..PRUNE_THRESHOLD {
            limiter.check_ip(
                Some(&format!("10.{}.{}.{}", n / 65536, (n / 256) % 256, n % 256)),
                RateLimitAction::Login,
            );
        }
        assert_eq!(limiter.windows.lock().unwrap().len(), PRUNE_THRESHOLD);

        limiter.backdate(LOGIN_WINDOW);
        limiter.check_ip(Some("198.51.100.1"), RateLimitAction::Login);

        assert_eq!(limiter.windows.lock().unwrap().len(), 1);
    }

    #[test]
    fn eviction_keeps_live_windows_and_their_counts() {
        let limiter = FixedWindowRateLimiter::new();
        for _ in 0..=SIGNUP_MAX {
            limiter.check_ip(Some("1.2.3.4"), RateLimitAction::Signup);
        }

        for n in 0..PRUNE_THRESHOLD {
            limiter.check_ip(
                Some(&format!("10.{}.{}.{}", n / 65536, (n / 256) % 256, n % 256)),
                RateLimitAction::Login,
            );
        }

        // One login window elapses: the login keys expire, the hour-long
        // signup window does not.
        limiter.backdate(LOGIN_WINDOW);
        limiter.check_ip(Some("198.51.100.1"), RateLimitAction::Login);

        assert!(limiter.windows.lock().unwrap().len() <= 2);
        assert_eq!(
            limiter.check_ip(Some("1.2.3.4"), RateLimitAction::Signup),
            RateLimitDecision::Limited
        );
    }

    #[test]
    fn missing_ip_is_not_limited() {
        let limiter = FixedWindowRateLimiter::new();
        for _ in 0..100 {
            assert_eq!(
                limiter.check_ip(None, RateLimitAction::Login),
                RateLimitDecision::Allowed
            );
        }
    }
}
