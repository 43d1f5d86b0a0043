//! Rooms, walls and doors
//!
//! A room never moves once placed. Doors are appended while corridors are
//! routed and popped again when a routing attempt is rejected, so
//! [`Room::doors`] always lists the doors of committed connectors in commit
//! order.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::rng::LayoutRng;

use super::rect::{Point, Rect};

/// Sequential room identifier (placement order, starting at 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoomId(pub u32);

impl RoomId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One of the four sides of a room (y grows downward, so `Top` is min y)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Wall {
    Left,
    Right,
    Top,
    Bottom,
}

impl Wall {
    /// The wall on the other side of the room
    pub fn opposite(self) -> Wall {
        match self {
            Wall::Left => Wall::Right,
            Wall::Right => Wall::Left,
            Wall::Top => Wall::Bottom,
            Wall::Bottom => Wall::Top,
        }
    }

    /// Whether a corridor leaves this wall horizontally
    pub fn faces_horizontally(self) -> bool {
        matches!(self, Wall::Left | Wall::Right)
    }

    /// Sign of the outward normal along its axis
    pub fn outward(self) -> f64 {
        match self {
            Wall::Left | Wall::Top => -1.0,
            Wall::Right | Wall::Bottom => 1.0,
        }
    }

    /// Wall seen after mirroring across the x = y diagonal
    pub fn transposed(self) -> Wall {
        match self {
            Wall::Left => Wall::Top,
            Wall::Top => Wall::Left,
            Wall::Right => Wall::Bottom,
            Wall::Bottom => Wall::Right,
        }
    }

    /// Coordinate of the wall line on its normal axis
    pub fn coordinate(self, rect: &Rect) -> f64 {
        match self {
            Wall::Left => rect.left(),
            Wall::Right => rect.right(),
            Wall::Top => rect.top(),
            Wall::Bottom => rect.bottom(),
        }
    }

    /// (start, end) of the wall along the axis it runs on
    pub fn extent(self, rect: &Rect) -> (f64, f64) {
        if self.faces_horizontally() {
            (rect.top(), rect.bottom())
        } else {
            (rect.left(), rect.right())
        }
    }

    /// Point on this wall at the given along-wall coordinate
    pub fn point_at(self, rect: &Rect, along: f64) -> Point {
        let line = self.coordinate(rect);
        if self.faces_horizontally() {
            Point::new(line, along)
        } else {
            Point::new(along, line)
        }
    }
}

/// Where on a wall a door anchor may go
///
/// Anchors keep half a corridor thickness away from both corners. When the
/// wall is too short for that the only legal anchor is the midpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DoorSpan {
    Range(f64, f64),
    Midpoint(f64),
}

impl DoorSpan {
    /// Legal anchors on `wall` of `rect` for corridors of `thickness`
    pub fn for_wall(rect: &Rect, wall: Wall, thickness: f64) -> Self {
        let (start, end) = wall.extent(rect);
        let half = thickness / 2.0;
        let (lo, hi) = (start + half, end - half);
        if lo > hi {
            DoorSpan::Midpoint((start + end) / 2.0)
        } else {
            DoorSpan::Range(lo, hi)
        }
    }

    pub fn contains(&self, v: f64) -> bool {
        match *self {
            DoorSpan::Range(lo, hi) => v >= lo && v <= hi,
            DoorSpan::Midpoint(m) => v == m,
        }
    }

    /// Restrict to [lo, hi]; `None` when nothing legal remains
    pub fn clamp(&self, lo: f64, hi: f64) -> Option<DoorSpan> {
        match *self {
            DoorSpan::Range(a, b) => {
                let (a, b) = (a.max(lo), b.min(hi));
                (a <= b).then_some(DoorSpan::Range(a, b))
            }
            DoorSpan::Midpoint(m) => (m >= lo && m <= hi).then_some(DoorSpan::Midpoint(m)),
        }
    }

    /// Anchors legal for both spans
    pub fn intersect(&self, other: &DoorSpan) -> Option<DoorSpan> {
        match *other {
            DoorSpan::Range(lo, hi) => self.clamp(lo, hi),
            DoorSpan::Midpoint(m) => self.contains(m).then_some(DoorSpan::Midpoint(m)),
        }
    }

    /// Draw an anchor uniformly from the span
    pub fn sample(&self, rng: &mut LayoutRng) -> f64 {
        match *self {
            DoorSpan::Range(lo, hi) => rng.uniform(lo, hi),
            DoorSpan::Midpoint(m) => m,
        }
    }
}

/// A corridor attachment point on a room boundary
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Door {
    pub wall: Wall,
    pub anchor: Point,
}

impl Door {
    pub fn new(wall: Wall, anchor: Point) -> Self {
        Self { wall, anchor }
    }

    /// The anchor's coordinate along its wall
    pub fn along(&self) -> f64 {
        if self.wall.faces_horizontally() {
            self.anchor.y
        } else {
            self.anchor.x
        }
    }

    /// Coordinate of the anchor on its wall's normal axis
    fn wall_line(&self) -> f64 {
        if self.wall.faces_horizontally() {
            self.anchor.x
        } else {
            self.anchor.y
        }
    }
}

/// A placed rectangular room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    id: RoomId,
    rect: Rect,
    doors: Vec<Door>,
}

impl Room {
    /// Create a room without doors
    pub fn new(id: RoomId, rect: Rect) -> Self {
        Self {
            id,
            rect,
            doors: Vec::new(),
        }
    }

    pub fn id(&self) -> RoomId {
        self.id
    }

    pub fn rect(&self) -> &Rect {
        &self.rect
    }

    pub fn center(&self) -> Point {
        self.rect.center()
    }

    /// Doors in commit order
    pub fn doors(&self) -> &[Door] {
        &self.doors
    }

    pub(crate) fn push_door(&mut self, door: Door) {
        self.doors.push(door);
    }

    pub(crate) fn pop_door(&mut self) -> Option<Door> {
        self.doors.pop()
    }

    /// Legal door anchors on one of this room's walls
    pub fn door_span(&self, wall: Wall, thickness: f64) -> DoorSpan {
        DoorSpan::for_wall(&self.rect, wall, thickness)
    }

    /// Check if a door respects the corner margin for `thickness`
    pub fn door_is_within_margin(&self, door: &Door, thickness: f64) -> bool {
        door.wall.coordinate(&self.rect) == door.wall_line()
            && self.rect.contains_point(door.anchor)
            && self.door_span(door.wall, thickness).contains(door.along())
    }

    pub fn overlaps(&self, other: &Room) -> bool {
        self.rect.overlaps(&other.rect)
    }
}
