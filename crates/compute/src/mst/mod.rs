//! Minimum-spanning-tree strategies.
//!
//! A fixed registry of four named, stateless algorithms. Every strategy
//! consumes a graph (never mutated) and returns a brand-new store with the
//! same vertex ids, a minimum-weight spanning edge subset, and the
//! shortest-path cache pre-populated, so stats on the result are cheap.
//!
//! On a disconnected input every strategy yields a partial forest covering
//! what it can reach; callers wanting a guarantee check `is_connected()`
//! first.

pub mod boruvka;
pub mod kruskal;
pub mod prim;
pub mod tarjan;
pub mod union_find;

pub use boruvka::Boruvka;
pub use kruskal::Kruskal;
pub use prim::Prim;
pub use tarjan::Tarjan;
pub use union_find::UnionFind;

use graphd_graph::GraphStore;

/// Error type for the strategy registry.
#[derive(Debug, thiserror::Error)]
pub enum ComputeError {
    #[error("Unknown MST strategy: {0}")]
    UnknownStrategy(String),
}

/// A named MST algorithm. Stateless; safe to share across tasks.
pub trait MstStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Build the MST of `graph` as an independent store with its distance
    /// cache populated.
    fn run(&self, graph: &GraphStore) -> GraphStore;
}

/// The registry's strategy names, as accepted on the wire.
pub const STRATEGY_NAMES: [&str; 4] = ["prim", "kruskal", "tarjan", "boruvka"];

/// Look a strategy up by name.
///
/// "tarjan" is historically mislabeled: it is a second Kruskal
/// formulation, kept under the name clients already use.
pub fn strategy_for(name: &str) -> Result<Box<dyn MstStrategy>, ComputeError> {
    match name {
        "prim" => Ok(Box::new(Prim)),
        "kruskal" => Ok(Box::new(Kruskal)),
        "tarjan" => Ok(Box::new(Tarjan)),
        "boruvka" => Ok(Box::new(Boruvka)),
        other => Err(ComputeError::UnknownStrategy(other.to_string())),
    }
}

/// One past the highest vertex id; sizes the per-id arrays the
/// strategies index with raw ids.
pub(crate) fn id_bound(graph: &GraphStore) -> usize {
    graph.vertex_ids().max().map(|m| m + 1).unwrap_or(0)
}
