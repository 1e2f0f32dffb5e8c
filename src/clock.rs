// FanWatch: Monotonic Clock
//
// The sampler only needs "now" and "block for this long". On ESP-IDF the
// std implementations map onto esp_timer and usleep (FreeRTOS delay for
// whole ticks, busy-wait for the remainder), so one implementation serves
// both firmware and host.

use std::thread;
use std::time::{Duration, Instant};

pub trait Clock {
    /// Time elapsed since an arbitrary fixed origin.
    fn now(&self) -> Duration;

    /// Block the calling thread.
    fn sleep(&mut self, duration: Duration);
}

pub struct StdClock {
    origin: Instant,
}

impl StdClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for StdClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&mut self, duration: Duration) {
        thread::sleep(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn std_clock_is_monotonic_across_sleep() {
        let mut clock = StdClock::new();
        let before = clock.now();
        clock.sleep(Duration::from_millis(2));
        assert!(clock.now() >= before + Duration::from_millis(2));
    }
}
