//! Application state shared across request handlers.

use std::net::IpAddr;
use std::num::NonZeroU32;
use std::sync::Arc;

use cccd_codec::{Analyzer, Generator, Limits};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};

/// Shared application state.
///
/// This is passed to all request handlers via Axum's state extractor.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    limits: Limits,
    generator: Generator,
    rate_limiter: DefaultKeyedRateLimiter<IpAddr>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Each client address gets its own budget of `rate_limit_per_minute` `/api` requests.
    pub fn new(limits: Limits, rate_limit_per_minute: NonZeroU32) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                generator: Generator::new(limits.clone()),
                limits,
                rate_limiter: RateLimiter::keyed(Quota::per_minute(rate_limit_per_minute)),
            }),
        }
    }

    pub fn limits(&self) -> &Limits {
        &self.inner.limits
    }

    /// A fresh analyzer dated today.
    pub fn analyzer(&self) -> Analyzer {
        Analyzer::new(self.inner.limits.clone())
    }

    pub fn generator(&self) -> &Generator {
        &self.inner.generator
    }

    /// Takes one token from `client`'s bucket. Returns false when exhausted.
    pub fn try_acquire(&self, client: IpAddr) -> bool {
        self.inner.rate_limiter.check_key(&client).is_ok()
    }

    /// Drops buckets that have refilled completely.
    pub fn prune_rate_limits(&self) {
        self.inner.rate_limiter.retain_recent();
        self.inner.rate_limiter.shrink_to_fit();
    }

    pub fn tracked_clients(&self) -> usize {
        self.inner.rate_limiter.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_clients_have_separate_budgets() {
        let state = AppState::new(Limits::default(), NonZeroU32::new(1).unwrap());
        let first = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
        let second = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2));

        assert!(state.try_acquire(first));
        assert!(!state.try_acquire(first));
        assert!(state.try_acquire(second));
        assert_eq!(state.tracked_clients(), 2);
    }
}
