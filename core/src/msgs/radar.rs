use crate::msgs::geometry::{Point, PoseWithCovariance, Twist, TwistWithCovariance};
use serde::{Deserialize, Serialize};

/// One radar return, already expressed in the objects' frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadarInput {
    pub pose_with_covariance: PoseWithCovariance,
    pub twist_with_covariance: TwistWithCovariance,
    /// Return strength or confidence, used to rank and weight twists.
    pub target_value: f64,
}

impl RadarInput {
    pub fn position(&self) -> &Point {
        &self.pose_with_covariance.pose.position
    }

    pub fn twist(&self) -> &Twist {
        &self.twist_with_covariance.twist
    }
}
