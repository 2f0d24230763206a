//! Analytic task descriptions and the shared compute/render split.
//!
//! Every executor runs the same two phases: `compute_op` does the heavy
//! work under a read lock, `render` turns the result into reply text. The
//! staged executors run the phases in different threads, the worker pool
//! runs both back to back; [`run_analytic`] is the single-call form.

use graphd_core::{ClientId, GraphdError};
use graphd_graph::{GraphStore, SharedGraph};

use crate::mst::strategy_for;

/// What an analytic task computes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalyticOp {
    Mst { strategy: String },
    Stats,
    ShortestPath { from: usize, to: usize },
}

/// A unit of asynchronous work: an operation against the shared graph,
/// with the client the reply goes to.
pub struct AnalyticTask {
    pub graph: SharedGraph,
    pub op: AnalyticOp,
    pub destination: ClientId,
}

/// Intermediate result carried between stages.
pub(crate) enum Computed {
    /// An MST built by [`AnalyticOp::Mst`]; stats are rendered later.
    Mst(Box<GraphStore>),
    /// Already-final reply text.
    Text(String),
}

/// Run the operation against the current graph. Failures become reply
/// text rather than errors: the client always gets a line back.
pub(crate) fn compute_op(graph: &SharedGraph, op: &AnalyticOp) -> Computed {
    let guard = match graph.read() {
        Ok(guard) => guard,
        Err(_) => return Computed::Text("Internal error: graph lock poisoned\n".to_string()),
    };
    let Some(store) = guard.as_ref() else {
        return Computed::Text(format!("{}\n", GraphdError::NoActiveGraph));
    };

    match op {
        AnalyticOp::Mst { strategy } => match strategy_for(strategy) {
            Ok(strat) => Computed::Mst(Box::new(strat.run(store))),
            Err(err) => Computed::Text(format!("{err}\n")),
        },
        AnalyticOp::Stats => Computed::Text(store.stats_text()),
        AnalyticOp::ShortestPath { from, to } => {
            Computed::Text(store.shortest_path_text(*from, *to))
        }
    }
}

/// Final reply text for a computed result.
pub(crate) fn render(task: &AnalyticTask, computed: Computed) -> String {
    match computed {
        Computed::Text(text) => text,
        Computed::Mst(mst) => {
            let strategy = match &task.op {
                AnalyticOp::Mst { strategy } => strategy.as_str(),
                _ => "unknown",
            };
            format!(
                "Client {} requested to find MST of the Graph\nMST Strategy: {strategy}\nMSTs' stats: \n{}",
                task.destination,
                mst.stats_text()
            )
        }
    }
}

/// Compute and render in one call.
pub fn run_analytic(task: &AnalyticTask) -> String {
    render(task, compute_op(&task.graph, &task.op))
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphd_graph::{new_shared_graph, Edge};

    fn shared_square() -> SharedGraph {
        let mut g = GraphStore::with_vertices(4);
        g.add_edge(Edge::new(0, 1, 1));
        g.add_edge(Edge::new(1, 2, 2));
        g.add_edge(Edge::new(2, 3, 1));
        g.add_edge(Edge::new(0, 3, 10));
        let shared = new_shared_graph();
        *shared.write().unwrap() = Some(g);
        shared
    }

    #[test]
    fn missing_graph_renders_error_text() {
        let task = AnalyticTask {
            graph: new_shared_graph(),
            op: AnalyticOp::Stats,
            destination: 1,
        };
        assert_eq!(
            run_analytic(&task),
            "No active graph; create one with newgraph first\n"
        );
    }

    #[test]
    fn unknown_strategy_renders_error_text() {
        let task = AnalyticTask {
            graph: shared_square(),
            op: AnalyticOp::Mst {
                strategy: "dijkstra".to_string(),
            },
            destination: 1,
        };
        assert_eq!(run_analytic(&task), "Unknown MST strategy: dijkstra\n");
    }

    #[test]
    fn mst_reply_header_and_stats() {
        let task = AnalyticTask {
            graph: shared_square(),
            op: AnalyticOp::Mst {
                strategy: "kruskal".to_string(),
            },
            destination: 1,
        };
        let reply = run_analytic(&task);
        assert!(reply.starts_with(
            "Client 1 requested to find MST of the Graph\nMST Strategy: kruskal\nMSTs' stats: \n"
        ));
        assert!(reply.contains("Graph with 4 vertices and 3 edges\n"));
        assert!(reply.contains("Total weight of edges: 4\n"));
    }

    #[test]
    fn shortest_path_op_delegates_to_the_store() {
        let task = AnalyticTask {
            graph: shared_square(),
            op: AnalyticOp::ShortestPath { from: 0, to: 3 },
            destination: 1,
        };
        assert_eq!(
            run_analytic(&task),
            "Shortest path from 0 to 3 is: 0 -> 1 -> 2 -> 3 with a distance of 4\n"
        );
    }
}
