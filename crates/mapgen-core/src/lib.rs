//! mapgen-core: room and corridor layout generation
//!
//! This crate places non-overlapping rectangular rooms, links them with a
//! minimum spanning tree and routes corridors between them. It performs no
//! rendering and no I/O besides optional config-file loading; consumers
//! receive an immutable [`Layout`] and draw it however they like.

pub mod config;
pub mod error;
pub mod layout;

mod consts;
mod rng;

pub use config::{
    AttemptBudgets, CrossingPolicy, DistanceMetric, LayoutConfig, RoutingStrategy, UnroutablePolicy,
};
pub use consts::*;
pub use error::{ConfigError, GenerationError};
pub use layout::{
    Connector, ConnectorGeometry, ConnectorId, Door, DoorSpan, Generator, GridCell, Layout, Phase,
    Point, Rect, Room, RoomId, Wall, generate,
};
pub use rng::LayoutRng;
