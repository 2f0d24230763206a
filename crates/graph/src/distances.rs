//! All-pairs shortest paths over the graph, cached on the store.
//!
//! Floyd–Warshall rather than per-pair Dijkstra: the service repeatedly
//! needs every pair for stats and path reconstruction, and edge weights are
//! arbitrary integers with no non-negativity guarantee, which would make
//! Dijkstra unsafe. O(V³) time, O(V²) space; the relaxation round for each
//! intermediate vertex is parallelized per row with rayon.

use std::borrow::Cow;

use rayon::prelude::*;
use tracing::debug;

use crate::store::GraphStore;

/// "No path" distance sentinel.
pub const INF: i64 = i64::MAX;

/// "No predecessor" sentinel in the parent matrix.
pub const NO_PATH: usize = usize::MAX;

/// Cached distance and predecessor matrices, both V×V.
///
/// Invariants on a populated cache: `dist[i][i] == 0`, and `dist` is
/// symmetric because the graph is undirected.
#[derive(Debug, Clone)]
pub struct DistanceCache {
    dist: Vec<Vec<i64>>,
    parent: Vec<Vec<usize>>,
}

impl DistanceCache {
    /// Run Floyd–Warshall over the store's adjacency matrix. This is the
    /// single compute path; every "compute if absent" call site goes
    /// through [`GraphStore::ensure_distances`] or [`GraphStore::distances`].
    pub fn compute(store: &GraphStore) -> Self {
        let n = store.matrix_dim();
        debug!(dim = n, "computing all-pairs shortest paths");
        let mut dist = store.adjacency_matrix();
        let mut parent = vec![vec![NO_PATH; n]; n];
        for i in 0..n {
            for j in 0..n {
                if i != j && dist[i][j] != INF {
                    parent[i][j] = i;
                }
            }
            parent[i][i] = i;
        }

        for k in 0..n {
            // Row k is read-only during round k: dist[i][k] and dist[k][j]
            // cannot improve through k itself.
            let dist_k = dist[k].clone();
            let parent_k = parent[k].clone();
            dist.par_iter_mut()
                .zip(parent.par_iter_mut())
                .for_each(|(dist_i, parent_i)| {
                    let dik = dist_i[k];
                    if dik == INF {
                        return;
                    }
                    for j in 0..n {
                        if dist_k[j] == INF {
                            continue;
                        }
                        let through = dik + dist_k[j];
                        if through < dist_i[j] {
                            dist_i[j] = through;
                            parent_i[j] = parent_k[j];
                        }
                    }
                });
        }

        Self { dist, parent }
    }

    pub fn distance(&self, i: usize, j: usize) -> i64 {
        self.dist[i][j]
    }

    pub fn dist_matrix(&self) -> &[Vec<i64>] {
        &self.dist
    }

    /// Reconstruct the vertex sequence from `start` to `end` by walking the
    /// predecessor matrix backward, or `None` when no path exists.
    ///
    /// A negative cycle (any negative edge, since the graph is undirected)
    /// makes the predecessor pointers loop. A simple path visits at most V
    /// vertices, so the walk is bounded there and a longer chain reports no
    /// path instead of spinning.
    pub fn path(&self, start: usize, end: usize) -> Option<Vec<usize>> {
        if self.parent[start][end] == NO_PATH {
            return None;
        }
        let mut path = vec![end];
        let mut current = end;
        while current != start {
            if path.len() > self.dist.len() {
                return None;
            }
            current = self.parent[start][current];
            path.push(current);
        }
        path.reverse();
        Some(path)
    }
}

impl GraphStore {
    /// Compute and memoize the distance cache. Mutations clear it.
    pub fn ensure_distances(&mut self) -> &DistanceCache {
        if self.distances.is_none() {
            self.distances = Some(DistanceCache::compute(self));
        }
        self.distances.as_ref().expect("just populated")
    }

    /// The cached matrices, or a freshly computed set when absent. Usable
    /// under a shared lock; callers wanting memoization use
    /// [`GraphStore::ensure_distances`].
    pub fn distances(&self) -> Cow<'_, DistanceCache> {
        match &self.distances {
            Some(cache) => Cow::Borrowed(cache),
            None => Cow::Owned(DistanceCache::compute(self)),
        }
    }

    pub fn has_distance_cache(&self) -> bool {
        self.distances.is_some()
    }

    // ── Reply text ─────────────────────────────────────────────

    /// One shortest-path reply line.
    pub fn shortest_path_text(&self, start: usize, end: usize) -> String {
        if !self.has_vertex(start) || !self.has_vertex(end) {
            return "Invalid vertices\n".to_string();
        }
        let cache = self.distances();
        shortest_path_line(&cache, start, end)
    }

    /// The maximum finite off-diagonal distance and its endpoints.
    pub fn longest_path_text(&self) -> String {
        longest_path_line(&self.distances(), self)
    }

    /// Mean finite distance over unordered vertex pairs, diagonal excluded.
    /// Unreachable pairs are skipped, not summed; 0.0 when no pair is
    /// reachable.
    pub fn avg_distance(&self) -> f64 {
        avg_distance_over(&self.distances(), self)
    }

    /// Every pairwise shortest-path line, i < j.
    pub fn all_shortest_paths_text(&self) -> String {
        all_shortest_paths_over(&self.distances(), self)
    }

    /// The stats block: counts, total weight, longest path, average
    /// distance, and all pairwise shortest paths.
    pub fn stats_text(&self) -> String {
        let cache = self.distances();
        let mut stats = format!(
            "Graph with {} vertices and {} edges\n",
            self.num_vertices(),
            self.num_edges()
        );
        stats.push_str(&format!("Total weight of edges: {}\n", self.total_weight()));
        stats.push_str(&longest_path_line(&cache, self));
        stats.push('\n');
        stats.push_str(&format!(
            "The average distance between vertices is: {}\n",
            avg_distance_over(&cache, self)
        ));
        stats.push_str("The shortest paths are: \n");
        stats.push_str(&all_shortest_paths_over(&cache, self));
        stats.push('\n');
        stats
    }
}

fn shortest_path_line(cache: &DistanceCache, start: usize, end: usize) -> String {
    match cache.path(start, end) {
        None => format!("No path exists between {start} and {end}\n"),
        Some(path) => {
            let rendered = path
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" -> ");
            format!(
                "Shortest path from {start} to {end} is: {rendered} with a distance of {}\n",
                cache.distance(start, end)
            )
        }
    }
}

fn longest_path_line(cache: &DistanceCache, store: &GraphStore) -> String {
    let mut max_dist = 0;
    let mut from = 0;
    let mut to = 0;
    for i in store.vertex_ids() {
        for j in store.vertex_ids() {
            let d = cache.distance(i, j);
            if i != j && d != INF && d > max_dist {
                max_dist = d;
                from = i;
                to = j;
            }
        }
    }
    format!("Longest path is from {from} to {to} with a distance of {max_dist}")
}

fn avg_distance_over(cache: &DistanceCache, store: &GraphStore) -> f64 {
    let mut total = 0i64;
    let mut count = 0usize;
    let ids: Vec<usize> = store.vertex_ids().collect();
    for (idx, &i) in ids.iter().enumerate() {
        for &j in &ids[idx + 1..] {
            let d = cache.distance(i, j);
            if d != INF {
                total += d;
                count += 1;
            }
        }
    }
    if count == 0 {
        0.0
    } else {
        total as f64 / count as f64
    }
}

fn all_shortest_paths_over(cache: &DistanceCache, store: &GraphStore) -> String {
    let mut paths = String::from("Shortest paths between all vertices in the graph are: \n");
    let ids: Vec<usize> = store.vertex_ids().collect();
    for (idx, &i) in ids.iter().enumerate() {
        for &j in &ids[idx + 1..] {
            paths.push_str(&shortest_path_line(cache, i, j));
        }
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Edge;

    /// The square from the scenario battery: 0-1 (1), 1-2 (2), 2-3 (1),
    /// plus an expensive 0-3 (10) shortcut.
    fn build_square() -> GraphStore {
        let mut g = GraphStore::with_vertices(4);
        g.add_edge(Edge::new(0, 1, 1));
        g.add_edge(Edge::new(1, 2, 2));
        g.add_edge(Edge::new(2, 3, 1));
        g.add_edge(Edge::new(0, 3, 10));
        g
    }

    #[test]
    fn shortest_path_avoids_heavy_shortcut() {
        let g = build_square();
        assert_eq!(
            g.shortest_path_text(0, 3),
            "Shortest path from 0 to 3 is: 0 -> 1 -> 2 -> 3 with a distance of 4\n"
        );
    }

    #[test]
    fn distance_matrix_is_symmetric_with_zero_diagonal() {
        let g = build_square();
        let cache = g.distances();
        for i in 0..4 {
            assert_eq!(cache.distance(i, i), 0);
            for j in 0..4 {
                assert_eq!(cache.distance(i, j), cache.distance(j, i));
            }
        }
    }

    #[test]
    fn reconstructed_path_resums_to_distance() {
        let g = build_square();
        let cache = g.distances();
        for i in 0..4 {
            for j in 0..4 {
                let Some(path) = cache.path(i, j) else {
                    continue;
                };
                let mut total = 0;
                for pair in path.windows(2) {
                    total += g
                        .edges()
                        .filter(|e| e.joins(pair[0], pair[1]))
                        .map(|e| e.weight)
                        .min()
                        .expect("path step follows an existing edge");
                }
                assert_eq!(total, cache.distance(i, j), "path {i} -> {j}");
            }
        }
    }

    #[test]
    fn trivial_path_to_self() {
        let g = build_square();
        assert_eq!(
            g.shortest_path_text(2, 2),
            "Shortest path from 2 to 2 is: 2 with a distance of 0\n"
        );
    }

    #[test]
    fn disconnected_pair_has_no_path() {
        let g = GraphStore::with_vertices(2);
        let cache = g.distances();
        assert_eq!(cache.distance(0, 1), INF);
        assert_eq!(
            g.shortest_path_text(0, 1),
            "No path exists between 0 and 1\n"
        );
        assert!(!g.is_connected());
    }

    #[test]
    fn out_of_range_endpoints_render_invalid() {
        let g = build_square();
        assert_eq!(g.shortest_path_text(0, 9), "Invalid vertices\n");
        assert_eq!(g.shortest_path_text(9, 0), "Invalid vertices\n");
    }

    #[test]
    fn longest_path_and_average() {
        let g = build_square();
        assert_eq!(
            g.longest_path_text(),
            "Longest path is from 0 to 3 with a distance of 4"
        );
        // pairwise distances: 1, 3, 4, 2, 3, 1
        let expected = 14.0 / 6.0;
        assert!((g.avg_distance() - expected).abs() < 1e-9);
    }

    #[test]
    fn average_skips_unreachable_pairs() {
        let mut g = GraphStore::with_vertices(3);
        g.add_edge(Edge::new(0, 1, 5));
        // vertex 2 is isolated: only the 0-1 pair counts
        assert!((g.avg_distance() - 5.0).abs() < 1e-9);

        let isolated = GraphStore::with_vertices(2);
        assert_eq!(isolated.avg_distance(), 0.0);
    }

    #[test]
    fn stats_block_layout() {
        let g = build_square();
        let stats = g.stats_text();
        assert!(stats.starts_with("Graph with 4 vertices and 4 edges\n"));
        assert!(stats.contains("Total weight of edges: 14\n"));
        assert!(stats.contains("Longest path is from 0 to 3 with a distance of 4\n"));
        assert!(stats.contains("The average distance between vertices is: "));
        assert!(stats.contains("The shortest paths are: \n"));
        assert!(stats.contains("Shortest paths between all vertices in the graph are: \n"));
        assert!(stats.contains("Shortest path from 0 to 3 is: 0 -> 1 -> 2 -> 3 with a distance of 4\n"));
    }

    #[test]
    fn negative_cycle_path_walk_terminates() {
        // One undirected negative edge is a negative cycle: the parent
        // pointers loop and reconstruction must bail out, not spin.
        let mut g = GraphStore::with_vertices(4);
        g.add_edge(Edge::new(0, 1, 1));
        g.add_edge(Edge::new(1, 2, 2));
        g.add_edge(Edge::new(2, 3, 1));
        g.add_edge(Edge::new(0, 3, -1));

        let cache = g.distances();
        for i in 0..4 {
            for j in 0..4 {
                let _ = cache.path(i, j);
                let text = g.shortest_path_text(i, j);
                assert!(
                    text.starts_with("Shortest path from")
                        || text.starts_with("No path exists"),
                    "pair {i} -> {j} rendered {text:?}"
                );
            }
        }
        let _ = g.stats_text();
    }

    #[test]
    fn cache_memoizes_and_mutation_invalidates() {
        let mut g = build_square();
        assert!(!g.has_distance_cache());
        g.ensure_distances();
        assert!(g.has_distance_cache());

        g.add_edge(Edge::new(0, 2, 1));
        assert!(!g.has_distance_cache());
        assert_eq!(g.distances().distance(0, 2), 1);
    }
}
