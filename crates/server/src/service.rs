//! The dispatch seam between the transport and the engine.
//!
//! Mutations run synchronously under the graph's exclusive lock and their
//! replies broadcast to every connected client. Analytics are handed to
//! the configured task executor; their reply reaches only the requesting
//! client, through the delivery sink the executor was built with.

use std::sync::Arc;

use tracing::info;

use graphd_compute::{AnalyticOp, AnalyticTask, TaskExecutor};
use graphd_core::{ClientId, Command, GraphdError};
use graphd_graph::{Edge, GraphStore, SharedGraph};

/// How the transport should route an immediate reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Send to every connected client.
    Broadcast(String),
    /// Send only to the requesting client.
    Direct(String),
    /// Nothing now; the executor delivers through the sink later.
    Queued,
}

pub struct GraphService {
    graph: SharedGraph,
    executor: Arc<dyn TaskExecutor>,
}

impl GraphService {
    pub fn new(graph: SharedGraph, executor: Arc<dyn TaskExecutor>) -> Self {
        Self { graph, executor }
    }

    pub fn graph(&self) -> &SharedGraph {
        &self.graph
    }

    /// Route one parsed command.
    pub fn handle(&self, client: ClientId, command: Command) -> Reply {
        if command.is_analytic() {
            return self.submit_analytic(client, command);
        }
        match command {
            Command::NewGraph {
                vertex_count,
                edge_count,
            } => self.new_graph(client, vertex_count, edge_count),
            Command::NewEdge { u, v, weight } => self.new_edge(client, u, v, weight),
            Command::RemoveEdge { u, v } => self.remove_edge(client, u, v),
            Command::Unrecognized { raw } => {
                if raw.is_empty() {
                    Reply::Broadcast(format!("User {client} sent an empty message\n"))
                } else {
                    Reply::Broadcast(format!("Client {client} sent a message: {raw}\n"))
                }
            }
            // is_analytic() routed the rest above.
            _ => Reply::Queued,
        }
    }

    /// Add one `u v w` triple sourced right after `newgraph`. Silent on
    /// success; the transport reports failures to the sourcing client.
    pub fn add_sourced_edge(&self, u: usize, v: usize, weight: i64) -> Result<(), GraphdError> {
        let mut guard = self
            .graph
            .write()
            .map_err(|e| GraphdError::LockPoisoned(e.to_string()))?;
        let store = guard.as_mut().ok_or(GraphdError::NoActiveGraph)?;
        validate_vertices(store, u, v)?;
        store.add_edge(Edge::new(u, v, weight));
        Ok(())
    }

    fn new_graph(&self, client: ClientId, vertex_count: usize, edge_count: usize) -> Reply {
        let mut guard = match self.graph.write() {
            Ok(guard) => guard,
            Err(_) => return poisoned(),
        };
        // Whatever graph existed is dropped wholesale.
        *guard = Some(GraphStore::with_vertices(vertex_count));
        info!(vertices = vertex_count, edges = edge_count, "new graph created");
        Reply::Broadcast(format!(
            "Client {client} successfully created a new Graph with {vertex_count} vertices and {edge_count} edges\n"
        ))
    }

    fn new_edge(&self, client: ClientId, u: usize, v: usize, weight: i64) -> Reply {
        let mut guard = match self.graph.write() {
            Ok(guard) => guard,
            Err(_) => return poisoned(),
        };
        let Some(store) = guard.as_mut() else {
            return no_graph(client);
        };
        if let Err(err) = validate_vertices(store, u, v) {
            return Reply::Direct(format!("{err}\n"));
        }
        store.add_edge(Edge::new(u, v, weight));
        let summary = store.summary();
        info!(
            edges = summary.edge_count,
            total_weight = summary.total_weight,
            "edge added"
        );
        Reply::Broadcast(format!(
            "Client {client} added an edge from {} to {} with weight {weight}\n",
            u + 1,
            v + 1
        ))
    }

    fn remove_edge(&self, client: ClientId, u: usize, v: usize) -> Reply {
        let mut guard = match self.graph.write() {
            Ok(guard) => guard,
            Err(_) => return poisoned(),
        };
        let Some(store) = guard.as_mut() else {
            return no_graph(client);
        };
        if let Err(err) = validate_vertices(store, u, v) {
            return Reply::Direct(format!("{err}\n"));
        }
        store.remove_edge(u, v);
        let summary = store.summary();
        info!(
            edges = summary.edge_count,
            total_weight = summary.total_weight,
            "edge removed"
        );
        Reply::Broadcast(format!(
            "Client {client} removed an edge from {} to {}\n",
            u + 1,
            v + 1
        ))
    }

    fn submit_analytic(&self, client: ClientId, command: Command) -> Reply {
        let op = match command {
            Command::ComputeMst { strategy } => AnalyticOp::Mst { strategy },
            Command::Stats => AnalyticOp::Stats,
            Command::ShortestPath { from, to } => AnalyticOp::ShortestPath { from, to },
            _ => return Reply::Queued,
        };
        self.executor.submit(AnalyticTask {
            graph: self.graph.clone(),
            op,
            destination: client,
        });
        Reply::Queued
    }
}

fn validate_vertices(store: &GraphStore, u: usize, v: usize) -> Result<(), GraphdError> {
    for id in [u, v] {
        if !store.has_vertex(id) {
            return Err(GraphdError::OutOfRange(id));
        }
    }
    Ok(())
}

fn no_graph(client: ClientId) -> Reply {
    Reply::Broadcast(format!(
        "Client {client} tried to perform the operation but there is no graph\n"
    ))
}

fn poisoned() -> Reply {
    Reply::Direct("Internal error: graph lock poisoned\n".to_string())
}
