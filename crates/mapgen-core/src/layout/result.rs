//! The finished layout handed to renderers

use serde::Serialize;

use super::connectivity::ConnectivityTracker;
use super::corridor::Connector;
use super::rect::Rect;
use super::room::{Room, RoomId};

/// An immutable, fully connected room layout
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    bounds: Rect,
    rooms: Vec<Room>,
    connectors: Vec<Connector>,
    seed: u64,
    attempts: u32,
}

impl Layout {
    pub(crate) fn new(
        bounds: Rect,
        rooms: Vec<Room>,
        connectors: Vec<Connector>,
        seed: u64,
        attempts: u32,
    ) -> Self {
        Self {
            bounds,
            rooms,
            connectors,
            seed,
            attempts,
        }
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Rooms in id order
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// Connectors in commit order
    pub fn connectors(&self) -> &[Connector] {
        &self.connectors
    }

    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.get(id.index())
    }

    /// Connectors committed by the best-effort fallback
    pub fn forced_connectors(&self) -> impl Iterator<Item = &Connector> {
        self.connectors.iter().filter(|c| c.forced())
    }

    /// Check if every room can reach every other through connectors
    pub fn is_connected(&self) -> bool {
        let mut tracker = ConnectivityTracker::new(self.rooms.len());
        for connector in &self.connectors {
            let (a, b) = connector.rooms();
            tracker.merge(a.index(), b.index());
        }
        tracker.all_connected()
    }

    /// Seed the layout was generated from
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Pipeline attempts used, counting the successful one
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Pretty JSON for external consumers
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
