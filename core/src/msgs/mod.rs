//! Message shapes exchanged between the fusion core and its collaborators.

pub mod geometry;
pub mod object;
pub mod radar;

pub use geometry::{
    Covariance, Header, Point, Pose, PoseWithCovariance, Quaternion, Twist, TwistWithCovariance,
    Vector3,
};
pub use object::{
    DetectedObject, DetectedObjectKinematics, DetectedObjects, ObjectClassification, ObjectLabel,
    Shape,
};
pub use radar::RadarInput;
