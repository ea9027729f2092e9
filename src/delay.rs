//! Injectable delay strategy so retrieval loops can be tested without
//! real sleeping.

use rand::Rng;
use std::time::Duration;

pub trait DelayStrategy: Send + Sync {
    /// Sleep for a fixed duration.
    fn wait(&self, duration: Duration);

    /// Sleep for a duration drawn uniformly from [min, max].
    fn wait_between(&self, min: Duration, max: Duration);
}

/// Real thread sleeps with uniform jitter, used against the shared NCBI
/// endpoints to avoid synchronized bursts.
pub struct JitterSleep;

impl DelayStrategy for JitterSleep {
    fn wait(&self, duration: Duration) {
        std::thread::sleep(duration);
    }

    fn wait_between(&self, min: Duration, max: Duration) {
        let millis = rand::thread_rng().gen_range(min.as_millis()..=max.as_millis());
        std::thread::sleep(Duration::from_millis(millis as u64));
    }
}

/// No-op strategy for deterministic tests.
pub struct NoDelay;

impl DelayStrategy for NoDelay {
    fn wait(&self, _duration: Duration) {}

    fn wait_between(&self, _min: Duration, _max: Duration) {}
}
