use log::{debug, trace};

/// Per-object milestones reported while a frame is fused.
///
/// `object` is the index of the object in the input frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FusionEvent {
    FrameStarted { objects: usize, radars: usize },
    Associated { object: usize, radars: usize },
    Split { object: usize, parts: usize },
    Emitted { object: usize, probability: f64 },
    Dropped { object: usize, probability: f64 },
    FrameFinished { emitted: usize },
}

/// Observer installed by the caller to receive [`FusionEvent`]s.
pub trait TraceHook: Send + Sync {
    fn record(&self, event: &FusionEvent);
}

/// Routes fusion events through the `log` facade under one target.
pub struct LogManager {
    target: &'static str,
}

impl LogManager {
    pub fn new() -> Self {
        Self {
            target: "radarfusion",
        }
    }

    pub fn with_target(target: &'static str) -> Self {
        Self { target }
    }

    pub fn target(&self) -> &'static str {
        self.target
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TraceHook for LogManager {
    fn record(&self, event: &FusionEvent) {
        match event {
            FusionEvent::FrameStarted { objects, radars } => {
                debug!(target: self.target, "frame: {} objects, {} radars", objects, radars)
            }
            FusionEvent::Associated { object, radars } => {
                trace!(target: self.target, "object {} matched {} radars", object, radars)
            }
            FusionEvent::Split { object, parts } => {
                debug!(target: self.target, "object {} split into {}", object, parts)
            }
            FusionEvent::Emitted {
                object,
                probability,
            } => trace!(
                target: self.target,
                "object {} emitted with probability {:.3}",
                object,
                probability
            ),
            FusionEvent::Dropped {
                object,
                probability,
            } => debug!(
                target: self.target,
                "object {} dropped, probability {:.3} and no radar support",
                object,
                probability
            ),
            FusionEvent::FrameFinished { emitted } => {
                debug!(target: self.target, "frame done: {} objects emitted", emitted)
            }
        }
    }
}
