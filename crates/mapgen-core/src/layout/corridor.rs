//! Connector routing
//!
//! [`ConnectorRouter`] drives one edge at a time through a [`RouteStrategy`]:
//! the strategy proposes geometry, the router pushes the doors, validates the
//! rectangles against the spatial index and either commits the connector or
//! backs the attempt out again.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::config::{CrossingPolicy, LayoutConfig, UnroutablePolicy};
use crate::error::GenerationError;
use crate::rng::LayoutRng;

use super::connectivity::Edge;
use super::rect::Rect;
use super::room::{Door, Room, RoomId, Wall};
use super::spatial::{Occupant, SpatialIndex};

/// Sequential connector identifier (commit order, starting at 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectorId(pub u32);

/// A unit cell of the routing grid, covering [x, x+1] x [y, y+1]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCell {
    pub x: i32,
    pub y: i32,
}

impl GridCell {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x as f64, self.y as f64, 1.0, 1.0)
    }

    /// Manhattan distance in cells
    pub fn distance(&self, other: &GridCell) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

/// The shape a connector takes on the map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectorGeometry {
    /// One straight rectangle or the two legs of an L
    Segments(Vec<Rect>),
    /// Ordered cells from the first room's door to the second's
    Path(Vec<GridCell>),
    /// The rooms share the wall at the door
    Doorway,
}

impl ConnectorGeometry {
    /// Area occupied on the map
    pub fn rects(&self) -> Vec<Rect> {
        match self {
            ConnectorGeometry::Segments(rects) => rects.clone(),
            ConnectorGeometry::Path(cells) => cells.iter().map(GridCell::rect).collect(),
            ConnectorGeometry::Doorway => Vec::new(),
        }
    }
}

/// A committed link between two rooms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connector {
    id: ConnectorId,
    rooms: (RoomId, RoomId),
    doors: (Door, Door),
    geometry: ConnectorGeometry,
    forced: bool,
}

impl Connector {
    pub fn id(&self) -> ConnectorId {
        self.id
    }

    /// The two rooms joined, in edge order
    pub fn rooms(&self) -> (RoomId, RoomId) {
        self.rooms
    }

    /// Doors on the first and second room
    pub fn doors(&self) -> (Door, Door) {
        self.doors
    }

    pub fn geometry(&self) -> &ConnectorGeometry {
        &self.geometry
    }

    /// Whether the connector was committed without passing validation
    pub fn forced(&self) -> bool {
        self.forced
    }

    pub fn rects(&self) -> Vec<Rect> {
        self.geometry.rects()
    }
}

/// Candidate geometry for one edge
#[derive(Debug, Clone, PartialEq)]
pub struct Proposal {
    /// Doors on the edge's first and second room
    pub doors: (Door, Door),
    pub geometry: ConnectorGeometry,
}

/// Read-only view handed to strategies while they propose
pub struct RouteContext<'a> {
    pub rooms: &'a [Room],
    pub index: &'a SpatialIndex,
    pub bounds: Rect,
    pub thickness: f64,
    pub crossing: CrossingPolicy,
}

/// A way of building corridor geometry between two rooms
pub trait RouteStrategy {
    /// Geometry for attempt number `attempt`, or `None` when this attempt
    /// has nothing feasible to offer
    fn propose(
        &mut self,
        ctx: &RouteContext<'_>,
        a: RoomId,
        b: RoomId,
        attempt: u32,
        rng: &mut LayoutRng,
    ) -> Option<Proposal>;

    /// Geometry ignoring the usual restrictions, used when forcing an edge
    fn propose_forced(
        &mut self,
        _ctx: &RouteContext<'_>,
        _a: RoomId,
        _b: RoomId,
        _rng: &mut LayoutRng,
    ) -> Option<Proposal> {
        None
    }

    /// Called once a connector has been committed
    fn on_commit(&mut self, _connector: &Connector) {}
}

/// Doorway between two rooms sharing `wall_a` of `a` (the opposite wall of `b`)
///
/// Returns `None` unless the walls coincide and both door spans intersect.
pub fn doorway(
    a: &Room,
    b: &Room,
    wall_a: Wall,
    thickness: f64,
    rng: &mut LayoutRng,
) -> Option<Proposal> {
    let wall_b = wall_a.opposite();
    if wall_a.coordinate(a.rect()) != wall_b.coordinate(b.rect()) {
        return None;
    }
    let span = a
        .door_span(wall_a, thickness)
        .intersect(&b.door_span(wall_b, thickness))?;
    let along = span.sample(rng);
    let point = wall_a.point_at(a.rect(), along);
    Some(Proposal {
        doors: (Door::new(wall_a, point), Door::new(wall_b, point)),
        geometry: ConnectorGeometry::Doorway,
    })
}

/// Shared validate / commit / backtrack loop
#[derive(Debug, Clone)]
pub struct ConnectorRouter {
    bounds: Rect,
    thickness: f64,
    crossing: CrossingPolicy,
    unroutable: UnroutablePolicy,
    per_edge: u32,
    next_id: u32,
}

impl ConnectorRouter {
    pub fn new(config: &LayoutConfig) -> Self {
        Self {
            bounds: config.bounds(),
            thickness: config.corridor_thickness,
            crossing: config.crossing,
            unroutable: config.unroutable,
            per_edge: config.budgets.per_edge,
            next_id: 0,
        }
    }

    /// Route every edge in order
    pub fn route_all(
        &mut self,
        strategy: &mut dyn RouteStrategy,
        rooms: &mut [Room],
        index: &mut SpatialIndex,
        edges: &[Edge],
        rng: &mut LayoutRng,
    ) -> Result<Vec<Connector>, GenerationError> {
        let mut connectors = Vec::with_capacity(edges.len());
        for edge in edges {
            if let Some(connector) = self.route_edge(strategy, rooms, index, edge, rng)? {
                connectors.push(connector);
            }
        }
        Ok(connectors)
    }

    /// Route one edge
    ///
    /// `Ok(None)` means an optional edge was dropped.
    pub fn route_edge(
        &mut self,
        strategy: &mut dyn RouteStrategy,
        rooms: &mut [Room],
        index: &mut SpatialIndex,
        edge: &Edge,
        rng: &mut LayoutRng,
    ) -> Result<Option<Connector>, GenerationError> {
        let mut best: Option<(usize, Proposal)> = None;

        for attempt in 0..self.per_edge {
            let proposal = {
                let ctx = self.context(rooms, index);
                strategy.propose(&ctx, edge.a, edge.b, attempt, rng)
            };
            let Some(proposal) = proposal else {
                continue;
            };

            let conflicts = self.try_reserve(&proposal, rooms, index, edge);
            if conflicts == 0 {
                let connector = self.finish(proposal, edge, false);
                strategy.on_commit(&connector);
                return Ok(Some(connector));
            }
            debug!(
                "attempt {} for edge {}-{} rejected with {} conflicts",
                attempt, edge.a, edge.b, conflicts
            );
            if best.as_ref().is_none_or(|(fewest, _)| conflicts < *fewest) {
                best = Some((conflicts, proposal));
            }
        }

        if !edge.is_tree() {
            debug!("dropping extra edge {}-{}", edge.a, edge.b);
            return Ok(None);
        }

        let unroutable = GenerationError::UnroutableEdge {
            a: edge.a,
            b: edge.b,
            attempts: self.per_edge,
        };
        if self.unroutable == UnroutablePolicy::Restart {
            return Err(unroutable);
        }

        let fallback = match best {
            Some((_, proposal)) => Some(proposal),
            None => {
                let ctx = self.context(rooms, index);
                strategy.propose_forced(&ctx, edge.a, edge.b, rng)
            }
        };
        let Some(proposal) = fallback else {
            return Err(unroutable);
        };

        warn!("forcing connector between rooms {} and {}", edge.a, edge.b);
        self.push_doors(&proposal, rooms, edge);
        let id = Occupant::Connector(ConnectorId(self.next_id));
        for rect in proposal.geometry.rects() {
            index.reserve(rect, id);
        }
        let connector = self.finish(proposal, edge, true);
        strategy.on_commit(&connector);
        Ok(Some(connector))
    }

    fn context<'a>(&self, rooms: &'a [Room], index: &'a SpatialIndex) -> RouteContext<'a> {
        RouteContext {
            rooms,
            index,
            bounds: self.bounds,
            thickness: self.thickness,
            crossing: self.crossing,
        }
    }

    fn push_doors(&self, proposal: &Proposal, rooms: &mut [Room], edge: &Edge) {
        rooms[edge.a.index()].push_door(proposal.doors.0);
        rooms[edge.b.index()].push_door(proposal.doors.1);
    }

    fn pop_doors(&self, rooms: &mut [Room], edge: &Edge) {
        rooms[edge.b.index()].pop_door();
        rooms[edge.a.index()].pop_door();
    }

    /// Speculatively push doors and reserve rects; backs everything out and
    /// returns the conflict count when the proposal is invalid
    fn try_reserve(
        &self,
        proposal: &Proposal,
        rooms: &mut [Room],
        index: &mut SpatialIndex,
        edge: &Edge,
    ) -> usize {
        self.push_doors(proposal, rooms, edge);
        let checkpoint = index.checkpoint();
        let id = Occupant::Connector(ConnectorId(self.next_id));

        let mut conflicts = 0;
        if !rooms[edge.a.index()].door_is_within_margin(&proposal.doors.0, self.thickness) {
            conflicts += 1;
        }
        if !rooms[edge.b.index()].door_is_within_margin(&proposal.doors.1, self.thickness) {
            conflicts += 1;
        }
        for rect in proposal.geometry.rects() {
            if !self.bounds.contains_rect(&rect) {
                conflicts += 1;
            }
            conflicts += index
                .overlapping(&rect)
                .into_iter()
                .filter(|o| *o != id && (o.is_room() || !self.crossing.allows()))
                .count();
            index.reserve(rect, id);
        }

        if conflicts > 0 {
            index.rollback(checkpoint);
            self.pop_doors(rooms, edge);
        }
        conflicts
    }

    fn finish(&mut self, proposal: Proposal, edge: &Edge, forced: bool) -> Connector {
        let connector = Connector {
            id: ConnectorId(self.next_id),
            rooms: (edge.a, edge.b),
            doors: proposal.doors,
            geometry: proposal.geometry,
            forced,
        };
        self.next_id += 1;
        connector
    }
}
