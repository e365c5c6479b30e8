pub mod converter;
pub mod fusion_node;

pub use converter::{RadarTracks, RadarTracksConverter};
pub use fusion_node::FusionNode;
