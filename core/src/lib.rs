//! Radar-to-detected-object fusion core.
//!
//! Each frame, radar returns are associated with the footprints of
//! vision-detected objects, their twists are blended into one velocity
//! estimate per object, and objects lacking both a confident classification
//! and radar support are dropped. The core is a pure function of the frame
//! and the current [`Param`]; transport, pacing and data retention belong to
//! the caller.

pub mod fusion;
pub mod math;
pub mod msgs;
pub mod prelude;
pub mod telemetry;

pub use fusion::RadarFusionToDetectedObject;
pub use prelude::{Input, Output, Param, ParamError};
