//! The parsed command model shared by the transport, service, and executors.

/// Identifier of a connected client. Doubles as the delivery destination
/// for asynchronous analytic results.
pub type ClientId = u64;

/// A parsed inbound command.
///
/// Vertex ids here are already 0-based internal ids; the wire protocol's
/// 1-based numbering is the parser's concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `newgraph n m` — replace the active graph with a fresh one of `n`
    /// vertices; the transport then sources `m` edge triples.
    NewGraph {
        vertex_count: usize,
        edge_count: usize,
    },
    /// `newedge u v w`
    NewEdge { u: usize, v: usize, weight: i64 },
    /// `removeedge u v`
    RemoveEdge { u: usize, v: usize },
    /// `mst <strategy>`
    ComputeMst { strategy: String },
    /// `stats`
    Stats,
    /// `path u v`
    ShortestPath { from: usize, to: usize },
    /// Anything that did not parse as a known command.
    Unrecognized { raw: String },
}

impl Command {
    /// Mutations run synchronously under the graph's exclusive lock.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Command::NewGraph { .. } | Command::NewEdge { .. } | Command::RemoveEdge { .. }
        )
    }

    /// Analytics run asynchronously on the configured task executor.
    pub fn is_analytic(&self) -> bool {
        matches!(
            self,
            Command::ComputeMst { .. } | Command::Stats | Command::ShortestPath { .. }
        )
    }
}

/// Write side of the transport boundary: where reply text goes once a task
/// completes. The server wires this to per-client socket writers; tests
/// substitute an in-memory collector.
pub trait DeliverySink: Send + Sync {
    fn deliver(&self, destination: ClientId, text: &str);
}
