pub mod log;
pub mod metrics;

pub use self::log::{FusionEvent, LogManager, TraceHook};
pub use metrics::{Metrics, MetricsRecorder};
