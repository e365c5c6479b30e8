use crate::msgs::{DetectedObject, RadarInput};

/// Partitions one object into sub-objects when its radars disagree on velocity.
///
/// Implementations must return sub-objects with a usable shape and pose.
/// Returning an empty list is treated as "no split".
pub trait ObjectSplitter: Send + Sync {
    fn split(&self, object: &DetectedObject, radars: &[&RadarInput]) -> Vec<DetectedObject>;
}

/// Never splits: always yields the input object unchanged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassThroughSplitter {
    /// Reserved for a velocity-based splitting policy; not consulted yet.
    pub split_threshold_velocity: f64,
}

impl PassThroughSplitter {
    pub fn new(split_threshold_velocity: f64) -> Self {
        Self {
            split_threshold_velocity,
        }
    }
}

impl ObjectSplitter for PassThroughSplitter {
    fn split(&self, object: &DetectedObject, _radars: &[&RadarInput]) -> Vec<DetectedObject> {
        vec![object.clone()]
    }
}
