//! Grid-bucketed spatial index of reserved rectangles
//!
//! Every reserved rectangle is stored once and referenced from each bucket
//! its interior touches, so an overlap query only looks at the buckets the
//! query rectangle covers. Answers are exact: candidates from the buckets are
//! always confirmed with [`Rect::overlaps`].
//!
//! Reservations are append-only, which gives cheap LIFO snapshots: a
//! [`Checkpoint`] records the entry count and [`SpatialIndex::rollback`]
//! pops everything reserved after it.

use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};

use super::corridor::ConnectorId;
use super::rect::Rect;
use super::room::RoomId;

/// What a reserved rectangle belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Occupant {
    Room(RoomId),
    Connector(ConnectorId),
}

impl Occupant {
    pub fn is_room(self) -> bool {
        matches!(self, Occupant::Room(_))
    }

    pub fn is_connector(self) -> bool {
        matches!(self, Occupant::Connector(_))
    }
}

/// A reserved rectangle and its owner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reservation {
    pub rect: Rect,
    pub occupant: Occupant,
}

/// Opaque marker returned by [`SpatialIndex::checkpoint`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(usize);

type CellKey = (i32, i32);

/// Spatial hash over fixed-size square buckets
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    cell_size: f64,
    entries: Vec<Reservation>,
    cells: HashMap<CellKey, Vec<usize>>,
}

impl SpatialIndex {
    /// Create an empty index with the given bucket size
    pub fn new(cell_size: f64) -> Self {
        debug_assert!(cell_size > 0.0);
        Self {
            cell_size,
            entries: Vec::new(),
            cells: HashMap::new(),
        }
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Number of reserved rectangles
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All reservations in insertion order
    pub fn reservations(&self) -> &[Reservation] {
        &self.entries
    }

    /// Bucket keys covering the rect, boundary buckets included
    fn cell_keys(&self, rect: &Rect) -> impl Iterator<Item = CellKey> + use<> {
        let (x0, y0, x1, y1) = rect.bounds();
        let min_x = (x0 / self.cell_size).floor() as i32;
        let max_x = (x1 / self.cell_size).floor() as i32;
        let min_y = (y0 / self.cell_size).floor() as i32;
        let max_y = (y1 / self.cell_size).floor() as i32;
        (min_x..=max_x).flat_map(move |cx| (min_y..=max_y).map(move |cy| (cx, cy)))
    }

    /// Insert a rectangle into every bucket it intersects
    pub fn reserve(&mut self, rect: Rect, occupant: Occupant) {
        let idx = self.entries.len();
        self.entries.push(Reservation { rect, occupant });
        for key in self.cell_keys(&rect) {
            self.cells.entry(key).or_default().push(idx);
        }
    }

    /// Check if `rect` overlaps any reserved rectangle
    pub fn query_overlap(&self, rect: &Rect) -> bool {
        self.query_overlap_where(rect, |_| true)
    }

    /// Check if `rect` overlaps any reservation whose occupant passes `filter`
    pub fn query_overlap_where<F>(&self, rect: &Rect, filter: F) -> bool
    where
        F: Fn(Occupant) -> bool,
    {
        self.cell_keys(rect).any(|key| {
            self.cells.get(&key).is_some_and(|ids| {
                ids.iter().any(|&i| {
                    let entry = &self.entries[i];
                    filter(entry.occupant) && entry.rect.overlaps(rect)
                })
            })
        })
    }

    /// Distinct occupants overlapping `rect`, in reservation order
    pub fn overlapping(&self, rect: &Rect) -> Vec<Occupant> {
        let mut ids: Vec<usize> = self
            .cell_keys(rect)
            .filter_map(|key| self.cells.get(&key))
            .flatten()
            .copied()
            .filter(|&i| self.entries[i].rect.overlaps(rect))
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        ids.sort_unstable();

        let mut seen = HashSet::new();
        ids.into_iter()
            .map(|i| self.entries[i].occupant)
            .filter(|occupant| seen.insert(*occupant))
            .collect()
    }

    /// Snapshot the current reservations
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.entries.len())
    }

    /// Drop every reservation made after `checkpoint`
    pub fn rollback(&mut self, checkpoint: Checkpoint) {
        while self.entries.len() > checkpoint.0 {
            let idx = self.entries.len() - 1;
            let rect = self.entries[idx].rect;
            for key in self.cell_keys(&rect) {
                if let Some(ids) = self.cells.get_mut(&key) {
                    // Buckets are appended in index order, so ours is last
                    if ids.last() == Some(&idx) {
                        ids.pop();
                    }
                    if ids.is_empty() {
                        self.cells.remove(&key);
                    }
                }
            }
            self.entries.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(id: u32) -> Occupant {
        Occupant::Room(RoomId(id))
    }

    #[test]
    fn test_reserve_and_query() {
        let mut index = SpatialIndex::new(10.0);
        index.reserve(Rect::new(0.0, 0.0, 5.0, 5.0), room(0));
        index.reserve(Rect::new(50.0, 50.0, 5.0, 5.0), room(1));

        assert!(index.query_overlap(&Rect::new(2.0, 2.0, 10.0, 10.0)));
        assert!(index.query_overlap(&Rect::new(54.0, 54.0, 1.0, 1.0)));
        assert!(!index.query_overlap(&Rect::new(20.0, 20.0, 10.0, 10.0)));
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_touching_is_not_overlap() {
        let mut index = SpatialIndex::new(10.0);
        index.reserve(Rect::new(0.0, 0.0, 10.0, 10.0), room(0));

        // Shares the bucket boundary and the rect edge
        assert!(!index.query_overlap(&Rect::new(10.0, 0.0, 10.0, 10.0)));
        assert!(!index.query_overlap(&Rect::new(0.0, 10.0, 10.0, 3.0)));
        assert!(index.query_overlap(&Rect::new(9.5, 0.0, 10.0, 10.0)));
    }

    #[test]
    fn test_large_rect_spans_buckets() {
        let mut index = SpatialIndex::new(4.0);
        index.reserve(Rect::new(0.0, 0.0, 40.0, 1.0), Occupant::Connector(ConnectorId(0)));
        assert!(index.query_overlap(&Rect::new(37.0, 0.0, 1.0, 1.0)));
        assert!(!index.query_overlap(&Rect::new(37.0, 1.0, 1.0, 1.0)));
    }

    #[test]
    fn test_negative_coordinates() {
        let mut index = SpatialIndex::new(8.0);
        index.reserve(Rect::new(-12.0, -3.0, 4.0, 4.0), room(0));
        assert!(index.query_overlap(&Rect::new(-10.0, -2.0, 1.0, 1.0)));
        assert!(!index.query_overlap(&Rect::new(-8.0, -3.0, 4.0, 4.0)));
    }

    #[test]
    fn test_filtered_query() {
        let mut index = SpatialIndex::new(10.0);
        index.reserve(Rect::new(0.0, 0.0, 10.0, 1.0), Occupant::Connector(ConnectorId(3)));
        let query = Rect::new(5.0, 0.0, 1.0, 5.0);

        assert!(index.query_overlap(&query));
        assert!(!index.query_overlap_where(&query, Occupant::is_room));
        assert!(index.query_overlap_where(&query, Occupant::is_connector));
    }

    #[test]
    fn test_overlapping_is_ordered_and_distinct() {
        let mut index = SpatialIndex::new(2.0);
        index.reserve(Rect::new(0.0, 0.0, 10.0, 10.0), room(4));
        index.reserve(Rect::new(5.0, 0.0, 1.0, 20.0), Occupant::Connector(ConnectorId(1)));
        index.reserve(Rect::new(5.0, 12.0, 5.0, 1.0), Occupant::Connector(ConnectorId(1)));

        let hits = index.overlapping(&Rect::new(0.0, 0.0, 20.0, 20.0));
        assert_eq!(hits, vec![room(4), Occupant::Connector(ConnectorId(1))]);
        assert!(index.overlapping(&Rect::new(30.0, 30.0, 1.0, 1.0)).is_empty());
    }

    #[test]
    fn test_checkpoint_rollback() {
        let mut index = SpatialIndex::new(5.0);
        index.reserve(Rect::new(0.0, 0.0, 5.0, 5.0), room(0));
        let checkpoint = index.checkpoint();

        index.reserve(Rect::new(20.0, 0.0, 5.0, 5.0), room(1));
        index.reserve(Rect::new(1.0, 1.0, 30.0, 1.0), Occupant::Connector(ConnectorId(0)));
        assert!(index.query_overlap(&Rect::new(21.0, 1.0, 1.0, 1.0)));

        index.rollback(checkpoint);
        assert_eq!(index.len(), 1);
        assert!(!index.query_overlap(&Rect::new(21.0, 1.0, 1.0, 1.0)));
        assert!(!index.query_overlap(&Rect::new(10.0, 1.0, 1.0, 1.0)));
        assert!(index.query_overlap(&Rect::new(1.0, 1.0, 1.0, 1.0)));

        // Rolling back to the current state is a no-op
        index.rollback(index.checkpoint());
        assert_eq!(index.len(), 1);
    }
}
