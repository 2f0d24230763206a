use std::collections::{BTreeMap, HashSet, VecDeque};

use graphd_core::GraphdError;
use serde::Serialize;

use crate::distances::DistanceCache;

/// An undirected weighted edge between two vertex ids.
///
/// A value type: equality and hashing cover (u, v, weight), so two edges
/// with the same endpoints but different weights are distinct and may
/// coexist in a store. Endpoints are normalized (`u <= v`) at construction
/// so the unordered pair hashes consistently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Edge {
    pub u: usize,
    pub v: usize,
    pub weight: i64,
}

impl Edge {
    pub fn new(u: usize, v: usize, weight: i64) -> Self {
        if u <= v {
            Self { u, v, weight }
        } else {
            Self { u: v, v: u, weight }
        }
    }

    /// Edge with the default weight of 1.
    pub fn unweighted(u: usize, v: usize) -> Self {
        Self::new(u, v, 1)
    }

    /// The endpoint opposite `id`.
    pub fn other(&self, id: usize) -> usize {
        if id == self.u {
            self.v
        } else {
            self.u
        }
    }

    pub fn touches(&self, id: usize) -> bool {
        self.u == id || self.v == id
    }

    pub fn joins(&self, a: usize, b: usize) -> bool {
        (self.u == a && self.v == b) || (self.u == b && self.v == a)
    }
}

/// A vertex: an integer id plus its incident edges in insertion order.
///
/// Edges reference vertex ids; the canonical copy of every edge lives in
/// the store's edge set, and the incident list is a per-vertex index into
/// it for deterministic traversal.
#[derive(Debug, Clone, Serialize)]
pub struct Vertex {
    pub id: usize,
    incident: Vec<Edge>,
}

impl Vertex {
    pub fn new(id: usize) -> Self {
        Self { id, incident: Vec::new() }
    }

    pub fn degree(&self) -> usize {
        self.incident.len()
    }

    pub fn incident(&self) -> &[Edge] {
        &self.incident
    }

    fn attach(&mut self, e: Edge) {
        self.incident.push(e);
    }

    fn detach(&mut self, e: &Edge) {
        self.incident.retain(|cur| cur != e);
    }
}

/// Counts reported in logs and summaries.
#[derive(Debug, Clone, Serialize)]
pub struct GraphSummary {
    pub vertex_count: usize,
    pub edge_count: usize,
    pub total_weight: i64,
}

/// A mutable weighted undirected graph.
///
/// Vertices are keyed by id in a `BTreeMap` for deterministic iteration;
/// edges are stored once in a set. Every mutation invalidates the cached
/// all-pairs distance matrices (see [`crate::distances`]).
#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    vertices: BTreeMap<usize, Vertex>,
    edges: HashSet<Edge>,
    pub(crate) distances: Option<DistanceCache>,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A graph with vertices 0..n and no edges.
    pub fn with_vertices(n: usize) -> Self {
        let mut store = Self::new();
        for id in 0..n {
            store.add_vertex(id);
        }
        store
    }

    /// A new store with this store's vertex ids and no edges — the seed
    /// for a derived graph (an MST). Independent of the source afterward.
    pub fn vertex_skeleton(&self) -> Self {
        let mut skeleton = Self::new();
        for &id in self.vertices.keys() {
            skeleton.add_vertex(id);
        }
        skeleton
    }

    // ── Mutations ──────────────────────────────────────────────

    /// Add a vertex; adding an existing id is a no-op.
    pub fn add_vertex(&mut self, id: usize) {
        self.vertices.entry(id).or_insert_with(|| Vertex::new(id));
        self.distances = None;
    }

    /// Remove a vertex and purge every edge touching it.
    /// Removing an absent vertex is a no-op.
    pub fn remove_vertex_with_edges(&mut self, id: usize) {
        if self.vertices.remove(&id).is_none() {
            return;
        }
        let doomed: Vec<Edge> = self.edges.iter().filter(|e| e.touches(id)).copied().collect();
        for e in doomed {
            self.edges.remove(&e);
            if let Some(other) = self.vertices.get_mut(&e.other(id)) {
                other.detach(&e);
            }
        }
        self.distances = None;
    }

    /// Add an edge, creating missing endpoint vertices. Adding an edge
    /// already present (same endpoints and weight) is a no-op.
    pub fn add_edge(&mut self, e: Edge) {
        if !self.edges.insert(e) {
            return;
        }
        self.vertices.entry(e.u).or_insert_with(|| Vertex::new(e.u)).attach(e);
        if e.v != e.u {
            self.vertices.entry(e.v).or_insert_with(|| Vertex::new(e.v)).attach(e);
        }
        self.distances = None;
    }

    /// Remove every edge joining `a` and `b`, whatever its weight.
    /// A no-op when none exists.
    pub fn remove_edge(&mut self, a: usize, b: usize) {
        let doomed: Vec<Edge> = self.edges.iter().filter(|e| e.joins(a, b)).copied().collect();
        if doomed.is_empty() {
            return;
        }
        for e in doomed {
            self.edges.remove(&e);
            if let Some(vx) = self.vertices.get_mut(&e.u) {
                vx.detach(&e);
            }
            if let Some(vx) = self.vertices.get_mut(&e.v) {
                vx.detach(&e);
            }
        }
        self.distances = None;
    }

    // ── Queries ────────────────────────────────────────────────

    pub fn has_vertex(&self, id: usize) -> bool {
        self.vertices.contains_key(&id)
    }

    pub fn has_edge(&self, a: usize, b: usize) -> bool {
        self.edges.iter().any(|e| e.joins(a, b))
    }

    pub fn degree(&self, id: usize) -> Result<usize, GraphdError> {
        self.vertices
            .get(&id)
            .map(Vertex::degree)
            .ok_or(GraphdError::OutOfRange(id))
    }

    pub fn max_degree(&self) -> usize {
        self.vertices.values().map(Vertex::degree).max().unwrap_or(0)
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn total_weight(&self) -> i64 {
        self.edges.iter().map(|e| e.weight).sum()
    }

    /// Incident edges of a vertex in insertion order; empty for unknown ids.
    pub fn incident_edges(&self, id: usize) -> &[Edge] {
        self.vertices.get(&id).map(Vertex::incident).unwrap_or(&[])
    }

    /// Vertices in ascending id order.
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.values()
    }

    pub fn vertex_ids(&self) -> impl Iterator<Item = usize> + '_ {
        self.vertices.keys().copied()
    }

    pub fn first_vertex_id(&self) -> Option<usize> {
        self.vertices.keys().next().copied()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    /// Matrix dimension: one past the highest vertex id. Equal to
    /// `num_vertices()` while ids stay contiguous from 0.
    pub(crate) fn matrix_dim(&self) -> usize {
        self.vertices.keys().next_back().map(|&m| m + 1).unwrap_or(0)
    }

    /// V×V matrix of direct-edge weights: `INF` where no edge, 0 on the
    /// diagonal. Parallel edges collapse to the cheapest.
    pub fn adjacency_matrix(&self) -> Vec<Vec<i64>> {
        let n = self.matrix_dim();
        let mut adj = vec![vec![crate::distances::INF; n]; n];
        for e in &self.edges {
            if e.weight < adj[e.u][e.v] {
                adj[e.u][e.v] = e.weight;
                adj[e.v][e.u] = e.weight;
            }
        }
        for (i, row) in adj.iter_mut().enumerate() {
            row[i] = 0;
        }
        adj
    }

    /// Breadth-first connectivity check from an arbitrary start vertex,
    /// with an explicit queue. Empty graphs count as connected.
    pub fn is_connected(&self) -> bool {
        let Some(start) = self.first_vertex_id() else {
            return true;
        };
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        visited.insert(start);
        queue.push_back(start);
        while let Some(current) = queue.pop_front() {
            for e in self.incident_edges(current) {
                let next = e.other(current);
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        visited.len() == self.num_vertices()
    }

    /// Every vertex has degree V−1.
    pub fn is_complete(&self) -> bool {
        let want = self.num_vertices().saturating_sub(1);
        self.vertices.values().all(|v| v.degree() == want)
    }

    pub fn summary(&self) -> GraphSummary {
        GraphSummary {
            vertex_count: self.num_vertices(),
            edge_count: self.num_edges(),
            total_weight: self.total_weight(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distances::INF;

    /// 0-1-2 path plus an expensive 0-3 shortcut closing the square.
    fn build_square() -> GraphStore {
        let mut g = GraphStore::with_vertices(4);
        g.add_edge(Edge::new(0, 1, 1));
        g.add_edge(Edge::new(1, 2, 2));
        g.add_edge(Edge::new(2, 3, 1));
        g.add_edge(Edge::new(0, 3, 10));
        g
    }

    #[test]
    fn edge_endpoints_normalize() {
        assert_eq!(Edge::new(3, 1, 5), Edge::new(1, 3, 5));
        assert_eq!(Edge::new(3, 1, 5).u, 1);
        assert_eq!(Edge::unweighted(2, 0).weight, 1);
    }

    #[test]
    fn edges_with_different_weights_are_distinct() {
        let mut g = GraphStore::with_vertices(2);
        g.add_edge(Edge::new(0, 1, 1));
        g.add_edge(Edge::new(0, 1, 7));
        assert_eq!(g.num_edges(), 2);
        // removeedge takes out every parallel edge between the pair
        g.remove_edge(0, 1);
        assert_eq!(g.num_edges(), 0);
        assert!(!g.has_edge(0, 1));
    }

    #[test]
    fn add_and_remove_edge_roundtrip() {
        let mut g = build_square();
        assert_eq!(g.num_edges(), 4);
        assert!(g.has_edge(3, 0));
        assert_eq!(g.degree(0).unwrap(), 2);

        g.remove_edge(0, 3);
        assert!(!g.has_edge(0, 3));
        assert_eq!(g.degree(0).unwrap(), 1);
        assert_eq!(g.degree(3).unwrap(), 1);

        // absent removal is a no-op
        g.remove_edge(0, 3);
        assert_eq!(g.num_edges(), 3);
    }

    #[test]
    fn remove_vertex_purges_incident_edges() {
        let mut g = build_square();
        g.remove_vertex_with_edges(0);
        assert_eq!(g.num_vertices(), 3);
        assert!(g.edges().all(|e| !e.touches(0)));
        assert_eq!(g.degree(1).unwrap(), 1);
        assert_eq!(g.degree(3).unwrap(), 1);
    }

    #[test]
    fn degree_out_of_range() {
        let g = build_square();
        assert!(matches!(g.degree(4), Err(GraphdError::OutOfRange(4))));
    }

    #[test]
    fn total_weight_and_max_degree() {
        let g = build_square();
        assert_eq!(g.total_weight(), 14);
        assert_eq!(g.max_degree(), 2);
    }

    #[test]
    fn summary_tracks_mutations() {
        let mut g = build_square();
        let summary = g.summary();
        assert_eq!(summary.vertex_count, 4);
        assert_eq!(summary.edge_count, 4);
        assert_eq!(summary.total_weight, 14);

        g.remove_edge(0, 3);
        let summary = g.summary();
        assert_eq!(summary.edge_count, 3);
        assert_eq!(summary.total_weight, 4);
    }

    #[test]
    fn adjacency_matrix_layout() {
        let g = build_square();
        let adj = g.adjacency_matrix();
        assert_eq!(adj.len(), 4);
        for i in 0..4 {
            assert_eq!(adj[i][i], 0);
        }
        assert_eq!(adj[0][1], 1);
        assert_eq!(adj[1][0], 1);
        assert_eq!(adj[0][3], 10);
        assert_eq!(adj[0][2], INF);
    }

    #[test]
    fn connectivity() {
        let mut g = build_square();
        assert!(g.is_connected());
        g.remove_edge(0, 1);
        g.remove_edge(0, 3);
        assert!(!g.is_connected());

        let disconnected = GraphStore::with_vertices(2);
        assert!(!disconnected.is_connected());
        assert!(GraphStore::new().is_connected());
    }

    #[test]
    fn completeness() {
        let mut g = GraphStore::with_vertices(3);
        g.add_edge(Edge::unweighted(0, 1));
        g.add_edge(Edge::unweighted(1, 2));
        assert!(!g.is_complete());
        g.add_edge(Edge::unweighted(0, 2));
        assert!(g.is_complete());
        assert!(GraphStore::new().is_complete());
    }

    #[test]
    fn vertex_skeleton_shares_ids_only() {
        let g = build_square();
        let skeleton = g.vertex_skeleton();
        assert_eq!(
            skeleton.vertex_ids().collect::<Vec<_>>(),
            g.vertex_ids().collect::<Vec<_>>()
        );
        assert_eq!(skeleton.num_edges(), 0);
    }

    #[test]
    fn incident_edges_keep_insertion_order() {
        let g = build_square();
        let incident = g.incident_edges(0);
        assert_eq!(incident, &[Edge::new(0, 1, 1), Edge::new(0, 3, 10)]);
    }
}
