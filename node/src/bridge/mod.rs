//! HTTP transport and timer loop around the fusion node.

pub mod routes;
pub mod state;

pub use routes::routes;
pub use state::{run_timer, BridgeState};
