use crate::telemetry::log::{FusionEvent, TraceHook};
use std::sync::Mutex;

pub struct MetricsRecorder {
    inner: Mutex<Metrics>,
}

/// Counter values at one point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct Metrics {
    pub frames: usize,
    pub emitted: usize,
    pub dropped: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Metrics::default()),
        }
    }

    pub fn snapshot(&self) -> Metrics {
        if let Ok(metrics) = self.inner.lock() {
            *metrics
        } else {
            Metrics::default()
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl TraceHook for MetricsRecorder {
    fn record(&self, event: &FusionEvent) {
        if let Ok(mut metrics) = self.inner.lock() {
            match event {
                FusionEvent::FrameFinished { .. } => metrics.frames += 1,
                FusionEvent::Emitted { .. } => metrics.emitted += 1,
                FusionEvent::Dropped { .. } => metrics.dropped += 1,
                _ => {}
            }
        }
    }
}
