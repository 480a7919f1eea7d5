use std::time::{SystemTime, UNIX_EPOCH};

/// Monotone-ish epoch-seconds source (spec C1).
///
/// Abstracted behind a trait, the way the teacher hides NTP-drift handling
/// behind `nimiq_utils::time::OffsetTime`, so that workers and the
/// processor can be driven by a fake clock in tests without sleeping real
/// wall-clock seconds.
pub trait Clock: Send + Sync {
    /// Current time as seconds since the Unix epoch.
    fn now(&self) -> i64;
}

/// A `Clock` backed by the system's wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock is before the Unix epoch")
            .as_secs() as i64
    }
}

#[cfg(any(test, feature = "test-util"))]
pub mod test_support {
    use super::Clock;
    use std::sync::atomic::{AtomicI64, Ordering};

    /// A clock that returns a fixed, externally advanceable value.
    ///
    /// Used across the workspace's test suites to make expiry and drift
    /// checks deterministic.
    #[derive(Debug)]
    pub struct FakeClock(AtomicI64);

    impl FakeClock {
        pub fn new(now: i64) -> Self {
            FakeClock(AtomicI64::new(now))
        }

        pub fn set(&self, now: i64) {
            self.0.store(now, Ordering::SeqCst);
        }

        pub fn advance(&self, delta: i64) {
            self.0.fetch_add(delta, Ordering::SeqCst);
        }
    }

    impl Clock for FakeClock {
        fn now(&self) -> i64 {
            self.0.load(Ordering::SeqCst)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::FakeClock;
    use super::Clock;

    #[test]
    fn fake_clock_advances() {
        let clock = FakeClock::new(1000);
        assert_eq!(clock.now(), 1000);
        clock.advance(5);
        assert_eq!(clock.now(), 1005);
    }
}
