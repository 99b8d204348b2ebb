//! stratux-core: Pure ingestion + correlation library for Stratux hub streams.
//!
//! No async and no I/O beyond reading a config file. Parsing, decoding,
//! and state only. Feed it text frames per channel (situation, traffic, status,
//! weather) and it hands back typed events. Transport belongs to the caller
//! (see `stratux-feed`).

pub mod config;
pub mod decode;
pub mod geo;
pub mod message;
pub mod status;
pub mod stream;
pub mod tracker;
pub mod types;

// Re-export commonly used types at crate root
pub use message::{parse_message, Message};
pub use stream::{FrameStats, StreamContext, StreamCoordinator};
pub use tracker::{TrafficFilter, TrafficTracker};
pub use types::*;
