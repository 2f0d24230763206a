//! The single active graph, shared between the mutation path and the
//! analytic executors.
//!
//! Mutations (create graph, add/remove edge) take the write lock for their
//! whole duration; analytics take the read lock, so several analytic
//! computations may run concurrently but none overlaps a mutation. A
//! `newgraph` command swaps the `Option` wholesale under the write lock
//! rather than mutating in place. There is no writer-starvation mitigation;
//! sustained analytic load can delay mutations.

use std::sync::{Arc, RwLock};

use crate::store::GraphStore;

/// Shared handle to the active graph. `None` until the first `newgraph`.
pub type SharedGraph = Arc<RwLock<Option<GraphStore>>>;

/// Create an empty shared graph handle.
pub fn new_shared_graph() -> SharedGraph {
    Arc::new(RwLock::new(None))
}
