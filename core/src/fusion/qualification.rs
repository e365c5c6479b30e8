use crate::msgs::{DetectedObject, RadarInput};

/// Decides which objects reach the output.
///
/// An object is kept when its leading classification probability exceeds
/// the threshold or when at least one radar return backs it. Kept objects
/// are never reported below the threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualificationFilter {
    threshold_probability: f64,
}

impl QualificationFilter {
    pub fn new(threshold_probability: f64) -> Self {
        Self {
            threshold_probability,
        }
    }

    pub fn is_qualified(&self, object: &DetectedObject, radars: &[&RadarInput]) -> bool {
        object.probability() > self.threshold_probability || !radars.is_empty()
    }

    /// The object with its probability floored, or `None` when it is dropped.
    pub fn qualify(
        &self,
        mut object: DetectedObject,
        radars: &[&RadarInput],
    ) -> Option<DetectedObject> {
        if !self.is_qualified(&object, radars) {
            return None;
        }
        object.raise_probability(self.threshold_probability);
        Some(object)
    }
}
