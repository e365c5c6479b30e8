//! Rectangular object footprints used for radar association.

use crate::math::matrix::MatrixHelper;
use crate::msgs::{Point, Pose, Vector3};
use ndarray::{array, Array2};

/// Convex footprint stored as counter-clockwise corners, one homogeneous
/// `(x, y, 1)` row per corner.
#[derive(Debug, Clone, PartialEq)]
pub struct Footprint {
    corners: Array2<f64>,
}

impl Footprint {
    /// Rectangle centred on the local origin, each side pushed out by `margin`.
    ///
    /// Half extents that would turn negative are clamped to zero, which
    /// leaves an empty footprint.
    pub fn from_dimensions(dimensions: &Vector3, margin: f64) -> Self {
        let half_x = (dimensions.x * 0.5 + margin).max(0.0);
        let half_y = (dimensions.y * 0.5 + margin).max(0.0);
        Self {
            corners: array![
                [half_x, half_y, 1.0],
                [-half_x, half_y, 1.0],
                [-half_x, -half_y, 1.0],
                [half_x, -half_y, 1.0],
            ],
        }
    }

    /// Moves the footprint into the frame the pose is expressed in.
    /// Only yaw and the horizontal position are applied.
    pub fn transformed(&self, pose: &Pose) -> Self {
        let transform = MatrixHelper::rigid_transform_2d(
            pose.orientation.yaw(),
            pose.position.x,
            pose.position.y,
        );
        Self {
            corners: MatrixHelper::multiply(self.corners.view(), transform.t()),
        }
    }

    pub fn corners(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.corners.rows().into_iter().map(|row| (row[0], row[1]))
    }

    /// Strict interior test: points on an edge or corner are outside.
    pub fn contains(&self, point: &Point) -> bool {
        let count = self.corners.nrows();
        (0..count).all(|i| {
            let (ax, ay) = (self.corners[[i, 0]], self.corners[[i, 1]]);
            let next = (i + 1) % count;
            let (bx, by) = (self.corners[[next, 0]], self.corners[[next, 1]]);
            (bx - ax) * (point.y - ay) - (by - ay) * (point.x - ax) > 0.0
        })
    }
}
