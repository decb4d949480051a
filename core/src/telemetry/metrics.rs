use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Request counters for long-running hosts. The counting and allocation
/// functions never touch this; the serving layer records around them.
pub struct MetricsRecorder {
    inner: Mutex<MetricsSnapshot>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub images_analyzed: usize,
    pub vehicles_counted: u64,
    pub plans_allocated: usize,
    pub errors: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    pub fn record_analysis(&self, vehicles: u64) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.images_analyzed += 1;
            metrics.vehicles_counted += vehicles;
        }
    }

    pub fn record_allocation(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.plans_allocated += 1;
        }
    }

    pub fn record_error(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.errors += 1;
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        self.inner
            .lock()
            .map(|metrics| *metrics)
            .unwrap_or_default()
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let recorder = MetricsRecorder::new();
        recorder.record_analysis(7);
        recorder.record_analysis(3);
        recorder.record_allocation();
        recorder.record_error();
        assert_eq!(
            recorder.snapshot(),
            MetricsSnapshot {
                images_analyzed: 2,
                vehicles_counted: 10,
                plans_allocated: 1,
                errors: 1,
            }
        );
    }
}
