use crate::math::geometry::Footprint;
use crate::msgs::{DetectedObject, RadarInput};

/// Links radar returns to the footprint of a detected object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectAssociator {
    bounding_box_margin: f64,
}

impl ObjectAssociator {
    pub fn new(bounding_box_margin: f64) -> Self {
        Self {
            bounding_box_margin,
        }
    }

    /// The object's x/y extent grown by the margin, placed at the object pose.
    pub fn footprint(&self, object: &DetectedObject) -> Footprint {
        Footprint::from_dimensions(&object.shape.dimensions, self.bounding_box_margin)
            .transformed(&object.kinematics.pose_with_covariance.pose)
    }

    /// Radars strictly inside the footprint, in input order.
    pub fn associate<'a, I>(&self, object: &DetectedObject, radars: I) -> Vec<&'a RadarInput>
    where
        I: IntoIterator<Item = &'a RadarInput>,
    {
        let footprint = self.footprint(object);
        radars
            .into_iter()
            .filter(|radar| footprint.contains(radar.position()))
            .collect()
    }
}
