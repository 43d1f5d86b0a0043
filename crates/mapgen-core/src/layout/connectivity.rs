//! Room connectivity: minimum spanning tree plus optional loop edges
//!
//! The tree is built with Kruskal's algorithm over the complete graph of room
//! centers. Extra edges link a tree endpoint to its nearest room that is not
//! already adjacent, which adds loops and T-junctions without duplicating any
//! room pair.

use hashbrown::HashSet;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::DistanceMetric;
use crate::rng::LayoutRng;

use super::rect::Point;
use super::room::{Room, RoomId};

/// Whether an edge is required for connectivity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    Tree,
    Extra,
}

/// A pair of rooms that should be joined by a connector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub a: RoomId,
    pub b: RoomId,
    pub weight: f64,
    pub kind: EdgeKind,
}

impl Edge {
    pub fn is_tree(&self) -> bool {
        self.kind == EdgeKind::Tree
    }

    /// The pair with the lower id first
    pub fn key(&self) -> (RoomId, RoomId) {
        if self.a <= self.b {
            (self.a, self.b)
        } else {
            (self.b, self.a)
        }
    }
}

impl DistanceMetric {
    /// Distance between two points under this metric
    pub fn distance(self, p: Point, q: Point) -> f64 {
        let (dx, dy) = (p.x - q.x, p.y - q.y);
        match self {
            DistanceMetric::Euclidean => (dx * dx + dy * dy).sqrt(),
            DistanceMetric::Manhattan => dx.abs() + dy.abs(),
        }
    }
}

/// Tracks which rooms are connected (union-find with path compression)
#[derive(Debug, Clone)]
pub struct ConnectivityTracker {
    parent: Vec<usize>,
    rank: Vec<u8>,
    components: usize,
}

impl ConnectivityTracker {
    /// Create a new tracker where every room is its own component
    pub fn new(num_rooms: usize) -> Self {
        Self {
            parent: (0..num_rooms).collect(),
            rank: vec![0; num_rooms],
            components: num_rooms,
        }
    }

    fn find(&mut self, mut i: usize) -> usize {
        let mut root = i;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        while self.parent[i] != root {
            let next = self.parent[i];
            self.parent[i] = root;
            i = next;
        }
        root
    }

    /// Check if two rooms are in the same component
    pub fn are_connected(&mut self, a: usize, b: usize) -> bool {
        if a >= self.parent.len() || b >= self.parent.len() {
            return false;
        }
        self.find(a) == self.find(b)
    }

    /// Join the components of `a` and `b`; returns false if already joined
    pub fn merge(&mut self, a: usize, b: usize) -> bool {
        if a >= self.parent.len() || b >= self.parent.len() {
            return false;
        }
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return false;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
        self.components -= 1;
        true
    }

    pub fn components(&self) -> usize {
        self.components
    }

    /// Check if all rooms are connected
    pub fn all_connected(&self) -> bool {
        self.components <= 1
    }
}

/// Minimum spanning tree over the room centers
///
/// Ties are broken by pair order (i < j, in id order) since the sort is stable.
pub fn spanning_tree(rooms: &[Room], metric: DistanceMetric) -> Vec<Edge> {
    let mut candidates = Vec::with_capacity(rooms.len() * rooms.len().saturating_sub(1) / 2);
    for (i, a) in rooms.iter().enumerate() {
        for b in &rooms[i + 1..] {
            candidates.push(Edge {
                a: a.id(),
                b: b.id(),
                weight: metric.distance(a.center(), b.center()),
                kind: EdgeKind::Tree,
            });
        }
    }
    candidates.sort_by(|x, y| x.weight.total_cmp(&y.weight));

    let mut tracker = ConnectivityTracker::new(rooms.len());
    let mut tree = Vec::with_capacity(rooms.len().saturating_sub(1));
    for edge in candidates {
        if tracker.merge(edge.a.index(), edge.b.index()) {
            tree.push(edge);
            if tree.len() + 1 == rooms.len() {
                break;
            }
        }
    }
    tree
}

/// Pick up to `count` extra edges on top of `tree`
pub fn extra_edges(
    rooms: &[Room],
    tree: &[Edge],
    count: usize,
    metric: DistanceMetric,
    rng: &mut LayoutRng,
) -> Vec<Edge> {
    let mut taken: HashSet<(RoomId, RoomId)> = tree.iter().map(Edge::key).collect();
    let mut order: Vec<usize> = (0..tree.len()).collect();
    rng.shuffle(&mut order);

    let mut extras = Vec::with_capacity(count);
    for i in order {
        if extras.len() >= count {
            break;
        }
        let edge = &tree[i];
        let from = if rng.one_in(2) { edge.a } else { edge.b };
        let origin = rooms[from.index()].center();

        let nearest = rooms
            .iter()
            .filter(|r| r.id() != from && !taken.contains(&ordered(from, r.id())))
            .map(|r| (r.id(), metric.distance(origin, r.center())))
            .min_by(|x, y| x.1.total_cmp(&y.1));
        let Some((to, weight)) = nearest else {
            continue;
        };

        taken.insert(ordered(from, to));
        extras.push(Edge {
            a: from,
            b: to,
            weight,
            kind: EdgeKind::Extra,
        });
    }
    debug!("selected {} of {} extra edges", extras.len(), count);
    extras
}

/// Tree edges followed by the extra edges the fraction asks for
pub fn build_edges(
    rooms: &[Room],
    metric: DistanceMetric,
    extra_fraction: f64,
    rng: &mut LayoutRng,
) -> Vec<Edge> {
    let mut edges = spanning_tree(rooms, metric);
    let count = (edges.len() as f64 * extra_fraction).round() as usize;
    if count > 0 {
        let extras = extra_edges(rooms, &edges, count, metric, rng);
        edges.extend(extras);
    }
    edges
}

fn ordered(a: RoomId, b: RoomId) -> (RoomId, RoomId) {
    if a <= b { (a, b) } else { (b, a) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Rect;

    fn rooms_at(points: &[(f64, f64)]) -> Vec<Room> {
        points
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| Room::new(RoomId(i as u32), Rect::new(x, y, 2.0, 2.0)))
            .collect()
    }

    #[test]
    fn test_connectivity_tracker() {
        let mut tracker = ConnectivityTracker::new(5);

        assert!(!tracker.are_connected(0, 1));
        assert!(tracker.merge(0, 1));
        assert!(tracker.are_connected(0, 1));
        assert!(!tracker.are_connected(0, 2));

        // Connect 1 and 2 (should also connect 0 and 2)
        tracker.merge(1, 2);
        assert!(tracker.are_connected(0, 2));
        assert!(!tracker.merge(0, 2));
        assert_eq!(tracker.components(), 3);
        assert!(!tracker.all_connected());

        tracker.merge(2, 3);
        tracker.merge(3, 4);
        assert!(tracker.all_connected());
        assert!(!tracker.are_connected(0, 9));
    }

    #[test]
    fn test_empty_tracker_is_connected() {
        assert!(ConnectivityTracker::new(0).all_connected());
        assert!(ConnectivityTracker::new(1).all_connected());
    }

    #[test]
    fn test_spanning_tree_on_a_line() {
        let rooms = rooms_at(&[(0.0, 0.0), (30.0, 0.0), (10.0, 0.0), (20.0, 0.0)]);
        let tree = spanning_tree(&rooms, DistanceMetric::Euclidean);

        assert_eq!(tree.len(), 3);
        let mut keys: Vec<_> = tree.iter().map(Edge::key).collect();
        keys.sort();
        assert_eq!(
            keys,
            vec![
                (RoomId(0), RoomId(2)),
                (RoomId(1), RoomId(3)),
                (RoomId(2), RoomId(3)),
            ]
        );
        assert!(tree.iter().all(|e| e.is_tree() && e.weight == 10.0));
    }

    #[test]
    fn test_spanning_tree_is_minimal() {
        let rooms = rooms_at(&[(0.0, 0.0), (10.0, 0.0), (0.0, 10.0), (10.0, 10.0), (50.0, 50.0)]);
        let tree = spanning_tree(&rooms, DistanceMetric::Manhattan);
        let total: f64 = tree.iter().map(|e| e.weight).sum();
        // Three sides of the square plus the hop to the far room
        assert_eq!(total, 30.0 + 80.0);

        let mut tracker = ConnectivityTracker::new(rooms.len());
        for e in &tree {
            tracker.merge(e.a.index(), e.b.index());
        }
        assert!(tracker.all_connected());
    }

    #[test]
    fn test_spanning_tree_small_inputs() {
        assert!(spanning_tree(&[], DistanceMetric::Euclidean).is_empty());
        assert!(spanning_tree(&rooms_at(&[(0.0, 0.0)]), DistanceMetric::Euclidean).is_empty());
    }

    #[test]
    fn test_extra_edges_never_duplicate_pairs() {
        let rooms = rooms_at(&[
            (0.0, 0.0),
            (10.0, 0.0),
            (20.0, 0.0),
            (0.0, 10.0),
            (10.0, 10.0),
            (20.0, 10.0),
        ]);
        let mut rng = LayoutRng::new(11);
        let edges = build_edges(&rooms, DistanceMetric::Euclidean, 1.0, &mut rng);

        let tree = edges.iter().filter(|e| e.is_tree()).count();
        assert_eq!(tree, 5);
        assert!(edges.len() > tree);
        assert!(edges.len() <= tree * 2);

        let keys: HashSet<_> = edges.iter().map(Edge::key).collect();
        assert_eq!(keys.len(), edges.len());
        assert!(edges.iter().all(|e| e.a != e.b));
    }

    #[test]
    fn test_no_extra_edges_by_default() {
        let rooms = rooms_at(&[(0.0, 0.0), (10.0, 0.0), (20.0, 0.0)]);
        let mut rng = LayoutRng::new(1);
        let edges = build_edges(&rooms, DistanceMetric::Euclidean, 0.0, &mut rng);
        assert_eq!(edges.len(), 2);
    }

    #[test]
    fn test_extra_edges_on_complete_graph() {
        // Two rooms: the only pair is already in the tree
        let rooms = rooms_at(&[(0.0, 0.0), (10.0, 0.0)]);
        let mut rng = LayoutRng::new(1);
        let edges = build_edges(&rooms, DistanceMetric::Euclidean, 1.0, &mut rng);
        assert_eq!(edges.len(), 1);
    }
}
