//! Time source used for every sync timestamp.

use std::time::Instant;

use chrono::{DateTime, Utc};

/// Time source.
///
/// `now` is monotonic and drives timeouts. `wall_now` keeps counting while the
/// host is suspended and is what the staleness guard compares against.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;

    fn wall_now(&self) -> DateTime<Utc>;
}

/// Operating system backed [`Clock`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn wall_now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub use mock::MockClock;

#[cfg(any(test, feature = "test-utils"))]
mod mock {
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    use chrono::{DateTime, Utc};

    use super::Clock;

    #[derive(Debug, Default)]
    struct Offsets {
        monotonic: Duration,
        wall: Duration,
    }

    /// Clock that only moves when told to.
    #[derive(Debug)]
    pub struct MockClock {
        origin: Instant,
        wall_origin: DateTime<Utc>,
        offsets: Mutex<Offsets>,
    }

    impl MockClock {
        pub fn new() -> Self {
            Self {
                origin: Instant::now(),
                wall_origin: Utc::now(),
                offsets: Mutex::new(Offsets::default()),
            }
        }

        /// Move both readings forward.
        pub fn advance(&self, by: Duration) {
            let mut offsets = self.offsets.lock().unwrap_or_else(|e| e.into_inner());
            offsets.monotonic += by;
            offsets.wall += by;
        }

        /// Move only the wall reading forward, as a suspended host sees it.
        pub fn suspend(&self, by: Duration) {
            let mut offsets = self.offsets.lock().unwrap_or_else(|e| e.into_inner());
            offsets.wall += by;
        }
    }

    impl Default for MockClock {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Clock for MockClock {
        fn now(&self) -> Instant {
            let offsets = self.offsets.lock().unwrap_or_else(|e| e.into_inner());
            self.origin + offsets.monotonic
        }

        fn wall_now(&self) -> DateTime<Utc> {
            let offsets = self.offsets.lock().unwrap_or_else(|e| e.into_inner());
            self.wall_origin
                + chrono::Duration::from_std(offsets.wall).unwrap_or_else(|_| chrono::Duration::zero())
        }
    }
}
