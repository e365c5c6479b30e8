pub mod geometry;
pub mod matrix;
pub mod twist;

pub use geometry::Footprint;
pub use matrix::MatrixHelper;
