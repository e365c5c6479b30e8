use crate::msgs::geometry::{Header, PoseWithCovariance, TwistWithCovariance, Vector3};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectLabel {
    #[default]
    Unknown,
    Car,
    Truck,
    Bus,
    Trailer,
    Motorcycle,
    Bicycle,
    Pedestrian,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectClassification {
    pub label: ObjectLabel,
    pub probability: f64,
}

/// Object extent; only `dimensions.x` (length) and `dimensions.y` (width)
/// take part in association.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Shape {
    pub dimensions: Vector3,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectedObjectKinematics {
    pub pose_with_covariance: PoseWithCovariance,
    pub has_position_covariance: bool,
    pub twist_with_covariance: TwistWithCovariance,
    pub has_twist: bool,
    pub has_twist_covariance: bool,
}

/// A single 3D object hypothesis from the vision detector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectedObject {
    pub existence_probability: f64,
    pub classification: Vec<ObjectClassification>,
    pub kinematics: DetectedObjectKinematics,
    pub shape: Shape,
}

impl DetectedObject {
    /// Probability of the leading classification, `0.0` when unclassified.
    pub fn probability(&self) -> f64 {
        self.classification
            .first()
            .map(|c| c.probability)
            .unwrap_or(0.0)
    }

    /// Lifts the leading classification probability to at least `floor`.
    pub fn raise_probability(&mut self, floor: f64) {
        if let Some(leading) = self.classification.first_mut() {
            leading.probability = leading.probability.max(floor);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectedObjects {
    pub header: Header,
    pub objects: Vec<DetectedObject>,
}
