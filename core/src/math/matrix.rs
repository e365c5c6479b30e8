use ndarray::{array, Array2, ArrayView2};

pub struct MatrixHelper;

impl MatrixHelper {
    /// Multiply two 2D arrays.
    pub fn multiply(lhs: ArrayView2<f64>, rhs: ArrayView2<f64>) -> Array2<f64> {
        lhs.dot(&rhs)
    }

    /// Homogeneous 3x3 transform rotating by `yaw` then translating by `(tx, ty)`.
    pub fn rigid_transform_2d(yaw: f64, tx: f64, ty: f64) -> Array2<f64> {
        let (sin, cos) = yaw.sin_cos();
        array![[cos, -sin, tx], [sin, cos, ty], [0.0, 0.0, 1.0]]
    }
}
