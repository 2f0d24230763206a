pub mod distances;
pub mod shared;
pub mod store;

pub use distances::{DistanceCache, INF, NO_PATH};
pub use shared::{new_shared_graph, SharedGraph};
pub use store::{Edge, GraphStore, GraphSummary, Vertex};
