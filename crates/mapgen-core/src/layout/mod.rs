//! Layout system
//!
//! Contains the geometry, the spatial index, room placement, connectivity,
//! corridor routing and the generation pipeline tying them together.

mod connectivity;
mod corridor;
mod direct;
mod generation;
mod grid;
mod placement;
mod rect;
mod result;
mod room;
mod spatial;

pub use connectivity::{
    ConnectivityTracker, Edge, EdgeKind, build_edges, extra_edges, spanning_tree,
};
pub use corridor::{
    Connector, ConnectorGeometry, ConnectorId, ConnectorRouter, GridCell, Proposal, RouteContext,
    RouteStrategy, doorway,
};
pub use direct::DirectRouter;
pub use generation::{Generator, Phase, generate};
pub use grid::GridRouter;
pub use placement::{PlacementRequest, place_rooms};
pub use rect::{EPSILON, Point, Rect, span_overlap};
pub use result::Layout;
pub use room::{Door, DoorSpan, Room, RoomId, Wall};
pub use spatial::{Checkpoint, Occupant, Reservation, SpatialIndex};
