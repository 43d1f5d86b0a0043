//! Room placement
//!
//! Rooms are sampled at random integer positions inside the map and kept
//! when the spatial index reports no overlap. A share of the rooms can be
//! placed flush against an existing room instead, which produces tighter
//! clusters and shared-wall doorways.

use log::debug;

use crate::error::GenerationError;
use crate::rng::LayoutRng;

use super::rect::Rect;
use super::room::{Room, RoomId, Wall};
use super::spatial::{Occupant, SpatialIndex};

/// Inputs of one placement run
#[derive(Debug, Clone)]
pub struct PlacementRequest<'a> {
    pub bounds: Rect,
    pub room_count: usize,
    pub sizes: &'a [(u32, u32)],
    /// Gap kept between randomly placed rooms
    pub padding: u32,
    /// Share of rooms placed against an existing room
    pub touching_fraction: f64,
    /// Total samples allowed for the whole run
    pub max_attempts: u32,
}

/// Place `room_count` rooms, reserving each one in `index`
///
/// Returns `PlacementExhausted` when the attempt budget runs out first.
pub fn place_rooms(
    request: &PlacementRequest<'_>,
    index: &mut SpatialIndex,
    rng: &mut LayoutRng,
) -> Result<Vec<Room>, GenerationError> {
    let mut rooms: Vec<Room> = Vec::with_capacity(request.room_count);
    let mut touching_left =
        (request.room_count as f64 * request.touching_fraction).floor() as usize;
    let mut attempts = 0;
    if request.sizes.is_empty() && request.room_count > 0 {
        return Err(GenerationError::PlacementExhausted {
            placed: 0,
            requested: request.room_count,
            attempts,
        });
    }

    while rooms.len() < request.room_count {
        if attempts >= request.max_attempts {
            debug!(
                "placement exhausted: {} of {} rooms after {} attempts",
                rooms.len(),
                request.room_count,
                attempts
            );
            return Err(GenerationError::PlacementExhausted {
                placed: rooms.len(),
                requested: request.room_count,
                attempts,
            });
        }
        attempts += 1;

        let Some(&(w, h)) = rng.choose(request.sizes) else {
            continue;
        };
        let (w, h) = (w as f64, h as f64);

        let touching = touching_left > 0 && !rooms.is_empty();
        let candidate = if touching {
            let base = *rooms[rng.rn2(rooms.len() as u32) as usize].rect();
            touching_candidate(&base, w, h, rng)
        } else {
            random_candidate(&request.bounds, w, h, rng)
        };
        let Some(candidate) = candidate else {
            continue;
        };
        if !request.bounds.contains_rect(&candidate) {
            continue;
        }

        let padded = if touching || request.padding == 0 {
            candidate
        } else {
            candidate.expand_by(request.padding as f64)
        };
        if index.query_overlap(&padded) {
            continue;
        }

        let id = RoomId(rooms.len() as u32);
        index.reserve(candidate, Occupant::Room(id));
        rooms.push(Room::new(id, candidate));
        if touching {
            touching_left -= 1;
        }
    }

    debug!("placed {} rooms in {} attempts", rooms.len(), attempts);
    Ok(rooms)
}

/// Uniform integer top-left corner such that the room fits the bounds
fn random_candidate(bounds: &Rect, w: f64, h: f64, rng: &mut LayoutRng) -> Option<Rect> {
    if w > bounds.width || h > bounds.height {
        return None;
    }
    let max_x = (bounds.right() - w) as i64;
    let max_y = (bounds.bottom() - h) as i64;
    let x = rng.range_inclusive(bounds.left() as i64, max_x) as f64;
    let y = rng.range_inclusive(bounds.top() as i64, max_y) as f64;
    Some(Rect::new(x, y, w, h))
}

/// Room flush against a random side of `base`, sharing at least one unit of wall
fn touching_candidate(base: &Rect, w: f64, h: f64, rng: &mut LayoutRng) -> Option<Rect> {
    let side = *rng.choose(&[Wall::Left, Wall::Right, Wall::Top, Wall::Bottom])?;
    let rect = if side.faces_horizontally() {
        let (lo, hi) = ((base.top() - h + 1.0) as i64, (base.bottom() - 1.0) as i64);
        let y = rng.range_inclusive(lo, hi) as f64;
        let x = if side == Wall::Left { base.left() - w } else { base.right() };
        Rect::new(x, y, w, h)
    } else {
        let (lo, hi) = ((base.left() - w + 1.0) as i64, (base.right() - 1.0) as i64);
        let x = rng.range_inclusive(lo, hi) as f64;
        let y = if side == Wall::Top { base.top() - h } else { base.bottom() };
        Rect::new(x, y, w, h)
    };
    Some(rect)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(sizes: &[(u32, u32)], count: usize) -> PlacementRequest<'_> {
        PlacementRequest {
            bounds: Rect::new(0.0, 0.0, 100.0, 100.0),
            room_count: count,
            sizes,
            padding: 0,
            touching_fraction: 0.0,
            max_attempts: 1000,
        }
    }

    fn assert_valid(rooms: &[Room], bounds: &Rect) {
        for (i, a) in rooms.iter().enumerate() {
            assert_eq!(a.id(), RoomId(i as u32));
            assert!(bounds.contains_rect(a.rect()), "room {:?} out of bounds", a.rect());
            for b in &rooms[i + 1..] {
                assert!(!a.overlaps(b), "rooms {} and {} overlap", a.id(), b.id());
            }
        }
    }

    #[test]
    fn test_place_rooms() {
        let sizes = [(10, 10), (5, 5)];
        let req = request(&sizes, 10);
        let mut index = SpatialIndex::new(8.0);
        let mut rng = LayoutRng::new(42);

        let rooms = place_rooms(&req, &mut index, &mut rng).unwrap();
        assert_eq!(rooms.len(), 10);
        assert_eq!(index.len(), 10);
        assert_valid(&rooms, &req.bounds);
        for room in &rooms {
            let (x, y) = (room.rect().x, room.rect().y);
            assert_eq!(x.fract(), 0.0);
            assert_eq!(y.fract(), 0.0);
        }
    }

    #[test]
    fn test_padding_keeps_gap() {
        let sizes = [(5, 5)];
        let req = PlacementRequest {
            padding: 2,
            ..request(&sizes, 8)
        };
        let mut index = SpatialIndex::new(8.0);
        let mut rng = LayoutRng::new(9);

        let rooms = place_rooms(&req, &mut index, &mut rng).unwrap();
        for (i, a) in rooms.iter().enumerate() {
            for b in &rooms[i + 1..] {
                assert!(!a.rect().expand_by(2.0).overlaps(b.rect()));
            }
        }
    }

    #[test]
    fn test_touching_rooms_share_a_wall() {
        let sizes = [(6, 6)];
        let req = PlacementRequest {
            touching_fraction: 0.5,
            ..request(&sizes, 6)
        };
        let mut index = SpatialIndex::new(8.0);
        let mut rng = LayoutRng::new(5);

        let rooms = place_rooms(&req, &mut index, &mut rng).unwrap();
        assert_valid(&rooms, &req.bounds);
        let touching_pairs = rooms
            .iter()
            .enumerate()
            .flat_map(|(i, a)| rooms[i + 1..].iter().map(move |b| (a, b)))
            .filter(|(a, b)| a.rect().touches(b.rect()))
            .count();
        assert!(touching_pairs >= 1, "expected at least one touching pair");
    }

    #[test]
    fn test_exhausted_budget() {
        let sizes = [(30, 30)];
        let req = PlacementRequest {
            bounds: Rect::new(0.0, 0.0, 50.0, 50.0),
            max_attempts: 200,
            ..request(&sizes, 5)
        };
        let mut index = SpatialIndex::new(8.0);
        let mut rng = LayoutRng::new(1);

        match place_rooms(&req, &mut index, &mut rng) {
            Err(GenerationError::PlacementExhausted {
                placed,
                requested,
                attempts,
            }) => {
                assert!(placed < 5);
                assert_eq!(requested, 5);
                assert_eq!(attempts, 200);
            }
            other => panic!("expected PlacementExhausted, got {:?}", other),
        }
    }

    #[test]
    fn test_oversized_rooms_never_fit() {
        let sizes = [(200, 10)];
        let req = PlacementRequest {
            max_attempts: 50,
            ..request(&sizes, 1)
        };
        let mut index = SpatialIndex::new(8.0);
        let mut rng = LayoutRng::new(1);
        assert!(place_rooms(&req, &mut index, &mut rng).is_err());
        assert!(index.is_empty());
    }

    #[test]
    fn test_no_sizes_is_exhausted() {
        let req = request(&[], 3);
        let mut index = SpatialIndex::new(8.0);
        let mut rng = LayoutRng::new(1);
        assert!(matches!(
            place_rooms(&req, &mut index, &mut rng),
            Err(GenerationError::PlacementExhausted { placed: 0, requested: 3, .. })
        ));
        assert!(index.is_empty());

        let req = request(&[], 0);
        assert!(place_rooms(&req, &mut index, &mut rng).is_ok_and(|rooms| rooms.is_empty()));
    }

    #[test]
    fn test_deterministic() {
        let sizes = [(10, 10), (5, 5), (8, 4)];
        let req = request(&sizes, 12);
        let run = |seed| {
            let mut index = SpatialIndex::new(8.0);
            let mut rng = LayoutRng::new(seed);
            place_rooms(&req, &mut index, &mut rng).unwrap()
        };
        assert_eq!(run(77), run(77));
    }
}
