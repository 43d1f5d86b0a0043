//! Direct corridor synthesis
//!
//! Corridors are built straight from door anchors: one rectangle between two
//! facing walls, or two legs meeting at a right angle when the source wall
//! runs perpendicular to the target wall. L-shapes are computed for a source
//! wall on the left or right only; the other orientation is handled by
//! transposing the rooms, building the L and transposing the result back.

use crate::rng::LayoutRng;

use super::corridor::{ConnectorGeometry, Proposal, RouteContext, RouteStrategy, doorway};
use super::rect::{EPSILON, Point, Rect};
use super::room::{Door, DoorSpan, Room, RoomId, Wall};

/// Which pair of walls an attempt tries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WallPair {
    /// Source wall faces the target's opposite wall
    Facing(Wall),
    /// Perpendicular source and target walls joined by an L
    Elbow(Wall, Wall),
}

/// Straight and L-shaped segment router
#[derive(Debug, Clone, Default)]
pub struct DirectRouter;

impl DirectRouter {
    pub fn new() -> Self {
        Self
    }

    /// Candidate wall pairs for the room pair, preferred first
    fn wall_pairs(a: &Room, b: &Room) -> [WallPair; 4] {
        let (ca, cb) = (a.center(), b.center());
        let (dx, dy) = (cb.x - ca.x, cb.y - ca.y);
        let h = if dx >= 0.0 { Wall::Right } else { Wall::Left };
        let v = if dy >= 0.0 { Wall::Bottom } else { Wall::Top };

        // The target's wall facing back towards the source
        let horizontal = WallPair::Facing(h);
        let vertical = WallPair::Facing(v);
        let h_then_v = WallPair::Elbow(h, v.opposite());
        let v_then_h = WallPair::Elbow(v, h.opposite());

        if dx.abs() >= dy.abs() {
            [horizontal, h_then_v, v_then_h, vertical]
        } else {
            [vertical, v_then_h, h_then_v, horizontal]
        }
    }
}

impl RouteStrategy for DirectRouter {
    fn propose(
        &mut self,
        ctx: &RouteContext<'_>,
        a: RoomId,
        b: RoomId,
        attempt: u32,
        rng: &mut LayoutRng,
    ) -> Option<Proposal> {
        let (room_a, room_b) = (&ctx.rooms[a.index()], &ctx.rooms[b.index()]);
        let pairs = Self::wall_pairs(room_a, room_b);
        match pairs[attempt as usize % pairs.len()] {
            WallPair::Facing(wall) => facing(room_a, room_b, wall, ctx.thickness, rng),
            WallPair::Elbow(wall_a, wall_b) => {
                elbow(room_a.rect(), room_b.rect(), wall_a, wall_b, ctx.thickness, rng)
            }
        }
    }

    /// Wall-midpoint L on the preferred elbow pair, ignoring corner clearance
    fn propose_forced(
        &mut self,
        ctx: &RouteContext<'_>,
        a: RoomId,
        b: RoomId,
        _rng: &mut LayoutRng,
    ) -> Option<Proposal> {
        let (room_a, room_b) = (&ctx.rooms[a.index()], &ctx.rooms[b.index()]);
        let (wall_a, wall_b) = Self::wall_pairs(room_a, room_b)
            .into_iter()
            .find_map(|pair| match pair {
                WallPair::Elbow(wall_a, wall_b) => Some((wall_a, wall_b)),
                WallPair::Facing(_) => None,
            })?;
        forced_elbow(room_a.rect(), room_b.rect(), wall_a, wall_b, ctx.thickness)
    }
}

/// Straight segment from `wall` of `a` to the opposite wall of `b`
fn facing(a: &Room, b: &Room, wall: Wall, thickness: f64, rng: &mut LayoutRng) -> Option<Proposal> {
    let target = wall.opposite();
    let (from, to) = (wall.coordinate(a.rect()), target.coordinate(b.rect()));
    let gap = (to - from) * wall.outward();
    if gap < 0.0 {
        return None;
    }
    if gap == 0.0 {
        return doorway(a, b, wall, thickness, rng);
    }

    let span = a
        .door_span(wall, thickness)
        .intersect(&b.door_span(target, thickness))?;
    let along = span.sample(rng);
    let half = thickness / 2.0;
    let segment = if wall.faces_horizontally() {
        Rect::from_corners(Point::new(from, along - half), Point::new(to, along + half))
    } else {
        Rect::from_corners(Point::new(along - half, from), Point::new(along + half, to))
    };

    Some(Proposal {
        doors: (
            Door::new(wall, wall.point_at(a.rect(), along)),
            Door::new(target, target.point_at(b.rect(), along)),
        ),
        geometry: ConnectorGeometry::Segments(vec![segment]),
    })
}

/// L-shaped corridor leaving `wall_a` of `a` and entering `wall_b` of `b`
fn elbow(
    a: &Rect,
    b: &Rect,
    wall_a: Wall,
    wall_b: Wall,
    thickness: f64,
    rng: &mut LayoutRng,
) -> Option<Proposal> {
    oriented(a, b, wall_a, wall_b, |a, b, wall_a, wall_b| {
        let half = thickness / 2.0;
        // Corner x must clear wall_a, corner y must clear wall_b
        let x_span = outside(
            DoorSpan::for_wall(b, wall_b, thickness),
            wall_a.coordinate(a),
            wall_a.outward(),
            half,
        )?;
        let y_span = outside(
            DoorSpan::for_wall(a, wall_a, thickness),
            wall_b.coordinate(b),
            wall_b.outward(),
            half,
        )?;
        let y = y_span.sample(rng);
        let x = x_span.sample(rng);
        Some(elbow_horizontal(a, b, wall_a, wall_b, Point::new(x, y), half))
    })
}

/// L between the midpoints of `wall_a` and `wall_b`
///
/// The corner may sit behind either wall, so legs can cut through a room.
fn forced_elbow(
    a: &Rect,
    b: &Rect,
    wall_a: Wall,
    wall_b: Wall,
    thickness: f64,
) -> Option<Proposal> {
    oriented(a, b, wall_a, wall_b, |a, b, wall_a, wall_b| {
        let corner = Point::new(midpoint(b, wall_b), midpoint(a, wall_a));
        Some(elbow_horizontal(a, b, wall_a, wall_b, corner, thickness / 2.0))
    })
}

fn midpoint(rect: &Rect, wall: Wall) -> f64 {
    let (start, end) = wall.extent(rect);
    (start + end) / 2.0
}

/// Run `build` with `wall_a` facing left or right, transposing when needed
fn oriented<F>(a: &Rect, b: &Rect, wall_a: Wall, wall_b: Wall, build: F) -> Option<Proposal>
where
    F: FnOnce(&Rect, &Rect, Wall, Wall) -> Option<Proposal>,
{
    if wall_a.faces_horizontally() {
        return build(a, b, wall_a, wall_b);
    }
    let flipped = build(
        &a.transposed(),
        &b.transposed(),
        wall_a.transposed(),
        wall_b.transposed(),
    )?;
    Some(transpose_proposal(flipped))
}

/// L whose first leg runs along x from a left or right wall of `a`
///
/// The corner square is centered on `corner` and belongs to the first leg.
/// The second leg runs along y into `wall_b`. Legs of zero length are left
/// out.
fn elbow_horizontal(
    a: &Rect,
    b: &Rect,
    wall_a: Wall,
    wall_b: Wall,
    corner: Point,
    half: f64,
) -> Proposal {
    debug_assert!(wall_a.faces_horizontally() && !wall_b.faces_horizontally());
    let (line_a, sign_a) = (wall_a.coordinate(a), wall_a.outward());
    let (line_b, sign_b) = (wall_b.coordinate(b), wall_b.outward());
    let Point { x, y } = corner;

    let segments = [
        (Point::new(line_a, y - half), Point::new(x + sign_a * half, y + half)),
        (Point::new(x - half, y - sign_b * half), Point::new(x + half, line_b)),
    ]
    .into_iter()
    .filter(|(p, q)| (p.x - q.x).abs() > EPSILON && (p.y - q.y).abs() > EPSILON)
    .map(|(p, q)| Rect::from_corners(p, q))
    .collect();

    Proposal {
        doors: (
            Door::new(wall_a, wall_a.point_at(a, y)),
            Door::new(wall_b, wall_b.point_at(b, x)),
        ),
        geometry: ConnectorGeometry::Segments(segments),
    }
}

/// Part of `span` at least `half` beyond `line` on the `sign` side
fn outside(span: DoorSpan, line: f64, sign: f64, half: f64) -> Option<DoorSpan> {
    if sign > 0.0 {
        span.clamp(line + half, f64::INFINITY)
    } else {
        span.clamp(f64::NEG_INFINITY, line - half)
    }
}

fn transpose_proposal(proposal: Proposal) -> Proposal {
    let flip = |door: Door| Door::new(door.wall.transposed(), door.anchor.transposed());
    let geometry = match proposal.geometry {
        ConnectorGeometry::Segments(rects) => {
            ConnectorGeometry::Segments(rects.iter().map(Rect::transposed).collect())
        }
        other => other,
    };
    Proposal {
        doors: (flip(proposal.doors.0), flip(proposal.doors.1)),
        geometry,
    }
}
