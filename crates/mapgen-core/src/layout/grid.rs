//! Grid corridor search
//!
//! The map is cut into unit cells. Room cells are blocked and a ring of
//! buffer cells keeps corridors away from room walls; the only buffer cells a
//! path may use are its own two door cells. Paths are found with a
//! multi-source A* from every door candidate on the source wall to every
//! candidate on the target wall.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use hashbrown::HashMap;
use log::debug;
use strum::IntoEnumIterator;

use crate::config::CrossingPolicy;
use crate::consts::GRID_ROOM_BUFFER;
use crate::rng::LayoutRng;

use super::corridor::{
    Connector, ConnectorGeometry, GridCell, Proposal, RouteContext, RouteStrategy, doorway,
};
use super::rect::{Point, Rect};
use super::room::{Door, DoorSpan, Room, RoomId, Wall};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellState {
    Free,
    Room,
    Buffer,
    Corridor,
}

/// A cell a path may start or end on, with the door it implies
#[derive(Debug, Clone, Copy, PartialEq)]
struct DoorCell {
    cell: GridCell,
    door: Door,
}

/// Unit-grid A* router
#[derive(Debug, Clone)]
pub struct GridRouter {
    origin: (i32, i32),
    width: i32,
    height: i32,
    cells: Vec<CellState>,
    crossing: CrossingPolicy,
}

impl GridRouter {
    /// Rasterize the bounds and the placed rooms
    pub fn new(bounds: &Rect, rooms: &[Room], crossing: CrossingPolicy) -> Self {
        let origin = (bounds.left().floor() as i32, bounds.top().floor() as i32);
        let width = (bounds.right().ceil() as i32 - origin.0).max(0);
        let height = (bounds.bottom().ceil() as i32 - origin.1).max(0);
        let mut router = Self {
            origin,
            width,
            height,
            cells: vec![CellState::Free; (width * height) as usize],
            crossing,
        };

        for room in rooms {
            let (x0, y0, x1, y1) = cell_span(room.rect());
            for y in y0 - GRID_ROOM_BUFFER..y1 + GRID_ROOM_BUFFER {
                for x in x0 - GRID_ROOM_BUFFER..x1 + GRID_ROOM_BUFFER {
                    router.set(GridCell::new(x, y), CellState::Buffer);
                }
            }
        }
        for room in rooms {
            let (x0, y0, x1, y1) = cell_span(room.rect());
            for y in y0..y1 {
                for x in x0..x1 {
                    router.set(GridCell::new(x, y), CellState::Room);
                }
            }
        }
        router
    }

    fn index(&self, cell: GridCell) -> Option<usize> {
        let (x, y) = (cell.x - self.origin.0, cell.y - self.origin.1);
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        Some((y * self.width + x) as usize)
    }

    fn cell_at(&self, idx: usize) -> GridCell {
        let idx = idx as i32;
        GridCell::new(self.origin.0 + idx % self.width, self.origin.1 + idx / self.width)
    }

    fn state(&self, cell: GridCell) -> Option<CellState> {
        self.index(cell).map(|i| self.cells[i])
    }

    fn set(&mut self, cell: GridCell, state: CellState) {
        if let Some(i) = self.index(cell) {
            self.cells[i] = state;
        }
    }

    /// Whether a path may step onto a cell (goals are checked by the caller)
    fn passable(&self, state: CellState, forced: bool) -> bool {
        match state {
            CellState::Free => true,
            CellState::Corridor => forced || self.crossing.allows(),
            CellState::Buffer => forced,
            CellState::Room => false,
        }
    }

    /// Ring cells directly outside `wall` that can hold a door
    fn door_cells(&self, room: &Room, wall: Wall, thickness: f64, forced: bool) -> Vec<DoorCell> {
        let rect = room.rect();
        let (x0, y0, x1, y1) = cell_span(rect);
        let line = wall.coordinate(rect);
        // Cell just outside the wall for an along-wall cell index
        let outside = |i: i32| match wall {
            Wall::Left => GridCell::new(x0 - 1, i),
            Wall::Right => GridCell::new(x1, i),
            Wall::Top => GridCell::new(i, y0 - 1),
            Wall::Bottom => GridCell::new(i, y1),
        };
        let anchor = |along: f64| {
            if wall.faces_horizontally() {
                Point::new(line, along)
            } else {
                Point::new(along, line)
            }
        };
        let usable = |cell: GridCell| match self.state(cell) {
            Some(CellState::Buffer) => true,
            Some(CellState::Corridor) => forced || self.crossing.allows(),
            _ => false,
        };

        let (lo, hi) = if wall.faces_horizontally() { (y0, y1) } else { (x0, x1) };
        match room.door_span(wall, thickness) {
            DoorSpan::Range(start, end) => (lo..hi)
                .filter(|&i| {
                    let center = i as f64 + 0.5;
                    center >= start && center <= end
                })
                .map(|i| DoorCell {
                    cell: outside(i),
                    door: Door::new(wall, anchor(i as f64 + 0.5)),
                })
                .filter(|c| usable(c.cell))
                .collect(),
            DoorSpan::Midpoint(m) => {
                let i = (m.floor() as i32).clamp(lo, (hi - 1).max(lo));
                let candidate = DoorCell {
                    cell: outside(i),
                    door: Door::new(wall, anchor(m)),
                };
                if usable(candidate.cell) { vec![candidate] } else { Vec::new() }
            }
        }
    }

    /// Every (source wall, target wall) pair, preferred pairs first
    fn wall_pairs(a: &Room, b: &Room) -> Vec<(Wall, Wall)> {
        let (ca, cb) = (a.center(), b.center());
        let (dx, dy) = (cb.x - ca.x, cb.y - ca.y);
        let h = if dx >= 0.0 { Wall::Right } else { Wall::Left };
        let v = if dy >= 0.0 { Wall::Bottom } else { Wall::Top };

        let preferred = if dx.abs() >= dy.abs() {
            [(h, h.opposite()), (h, v.opposite()), (v, h.opposite()), (v, v.opposite())]
        } else {
            [(v, v.opposite()), (v, h.opposite()), (h, v.opposite()), (h, h.opposite())]
        };
        let mut pairs = preferred.to_vec();
        for from in Wall::iter() {
            for to in Wall::iter() {
                if !pairs.contains(&(from, to)) {
                    pairs.push((from, to));
                }
            }
        }
        pairs
    }

    /// Search one wall pair
    fn route_pair(
        &self,
        a: &Room,
        b: &Room,
        walls: (Wall, Wall),
        thickness: f64,
        forced: bool,
    ) -> Option<Proposal> {
        let sources = self.door_cells(a, walls.0, thickness, forced);
        let goals = self.door_cells(b, walls.1, thickness, forced);
        let (from, to) = self.search(&sources, &goals, forced)?;
        let mut path = Vec::new();
        let mut at = Some(to.1);
        while let Some(idx) = at {
            path.push(self.cell_at(idx));
            at = from[idx];
        }
        path.reverse();

        let start = sources.iter().find(|c| Some(c.cell) == path.first().copied())?;
        Some(Proposal {
            doors: (start.door, to.0.door),
            geometry: ConnectorGeometry::Path(path),
        })
    }

    /// Multi-source A*; returns the predecessor table and the reached goal
    #[allow(clippy::type_complexity)]
    fn search(
        &self,
        sources: &[DoorCell],
        goals: &[DoorCell],
        forced: bool,
    ) -> Option<(Vec<Option<usize>>, (DoorCell, usize))> {
        if sources.is_empty() || goals.is_empty() {
            return None;
        }
        let goal_at: HashMap<usize, DoorCell> = goals
            .iter()
            .filter_map(|g| self.index(g.cell).map(|i| (i, *g)))
            .collect();
        let (gx0, gy0, gx1, gy1) = goals.iter().fold(
            (i32::MAX, i32::MAX, i32::MIN, i32::MIN),
            |(x0, y0, x1, y1), g| {
                (x0.min(g.cell.x), y0.min(g.cell.y), x1.max(g.cell.x), y1.max(g.cell.y))
            },
        );
        let heuristic = |cell: GridCell| -> u32 {
            let dx = (gx0 - cell.x).max(0) + (cell.x - gx1).max(0);
            let dy = (gy0 - cell.y).max(0) + (cell.y - gy1).max(0);
            (dx + dy) as u32
        };

        let mut best = vec![u32::MAX; self.cells.len()];
        let mut from: Vec<Option<usize>> = vec![None; self.cells.len()];
        let mut heap = BinaryHeap::new();
        let mut tie = 0u32;
        for source in sources {
            if let Some(idx) = self.index(source.cell) {
                if best[idx] != 0 {
                    best[idx] = 0;
                    heap.push(Reverse((heuristic(source.cell), 0u32, tie, idx)));
                    tie += 1;
                }
            }
        }

        let dirs: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];
        while let Some(Reverse((_, cost, _, idx))) = heap.pop() {
            if cost != best[idx] {
                continue;
            }
            if let Some(goal) = goal_at.get(&idx) {
                return Some((from, (*goal, idx)));
            }
            let cell = self.cell_at(idx);
            for (dx, dy) in dirs {
                let next = GridCell::new(cell.x + dx, cell.y + dy);
                let Some(next_idx) = self.index(next) else {
                    continue;
                };
                if !goal_at.contains_key(&next_idx)
                    && !self.passable(self.cells[next_idx], forced)
                {
                    continue;
                }
                let next_cost = cost + 1;
                if next_cost >= best[next_idx] {
                    continue;
                }
                best[next_idx] = next_cost;
                from[next_idx] = Some(idx);
                heap.push(Reverse((next_cost + heuristic(next), next_cost, tie, next_idx)));
                tie += 1;
            }
        }
        None
    }
}

impl RouteStrategy for GridRouter {
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
        let walls = pairs[attempt as usize % pairs.len()];
        if walls.1 == walls.0.opposite() {
            if let Some(shared) = doorway(room_a, room_b, walls.0, ctx.thickness, rng) {
                return Some(shared);
            }
        }
        self.route_pair(room_a, room_b, walls, ctx.thickness, false)
    }

    fn propose_forced(
        &mut self,
        ctx: &RouteContext<'_>,
        a: RoomId,
        b: RoomId,
        _rng: &mut LayoutRng,
    ) -> Option<Proposal> {
        let (room_a, room_b) = (&ctx.rooms[a.index()], &ctx.rooms[b.index()]);
        let proposal = Self::wall_pairs(room_a, room_b)
            .into_iter()
            .find_map(|walls| self.route_pair(room_a, room_b, walls, ctx.thickness, true));
        if proposal.is_none() {
            debug!("no forced grid path between rooms {} and {}", a, b);
        }
        proposal
    }

    fn on_commit(&mut self, connector: &Connector) {
        if let ConnectorGeometry::Path(cells) = connector.geometry() {
            for cell in cells {
                self.set(*cell, CellState::Corridor);
            }
        }
    }
}

/// Cells covered by a rect as (x0, y0, x1, y1), end exclusive
fn cell_span(rect: &Rect) -> (i32, i32, i32, i32) {
    (
        rect.left().floor() as i32,
        rect.top().floor() as i32,
        rect.right().ceil() as i32,
        rect.bottom().ceil() as i32,
    )
}
