//! Task executors for asynchronous analytics.
//!
//! Three interchangeable designs behind one trait: a worker pool running
//! whole tasks, a staged pipeline with a coordinator, and an active-object
//! chain with a thread per stage. All three deliver replies through a
//! [`DeliverySink`] and drain their queues on `stop`.

pub mod chain;
pub mod staged;
pub mod task;
pub mod worker_pool;

pub use chain::{ChainTask, StageChain, StageFn};
pub use staged::StagedPipeline;
pub use task::{run_analytic, AnalyticOp, AnalyticTask};
pub use worker_pool::WorkerPool;

use std::sync::Arc;

use graphd_core::{DeliverySink, ExecutorKind};

/// The executor seam: start workers, accept tasks, stop and drain.
///
/// `submit` never blocks on the analytic work itself; `stop` blocks until
/// every accepted task has been delivered and all threads joined.
pub trait TaskExecutor: Send + Sync {
    fn start(&self);
    fn submit(&self, task: AnalyticTask);
    fn stop(&self);
}

/// Build the configured executor, already wired to `sink` but not started.
pub fn build_executor(
    kind: ExecutorKind,
    workers: usize,
    sink: Arc<dyn DeliverySink>,
) -> Arc<dyn TaskExecutor> {
    match kind {
        ExecutorKind::WorkerPool => Arc::new(WorkerPool::new(workers, sink)),
        ExecutorKind::Pipeline => Arc::new(StagedPipeline::new(workers, sink)),
        ExecutorKind::Chain => Arc::new(StageChain::analytics(sink)),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::{Arc, Mutex, RwLock};

    use graphd_core::{ClientId, DeliverySink};
    use graphd_graph::{Edge, GraphStore, SharedGraph};

    /// Records deliveries for assertions.
    #[derive(Default)]
    pub struct CollectingSink {
        delivered: Mutex<Vec<(ClientId, String)>>,
    }

    impl CollectingSink {
        pub fn take(&self) -> Vec<(ClientId, String)> {
            std::mem::take(&mut self.delivered.lock().unwrap())
        }
    }

    impl DeliverySink for CollectingSink {
        fn deliver(&self, destination: ClientId, text: &str) {
            self.delivered
                .lock()
                .unwrap()
                .push((destination, text.to_string()));
        }
    }

    /// The usual square fixture behind the shared-graph lock.
    pub fn shared_square() -> SharedGraph {
        let mut g = GraphStore::with_vertices(4);
        g.add_edge(Edge::new(0, 1, 1));
        g.add_edge(Edge::new(1, 2, 2));
        g.add_edge(Edge::new(2, 3, 1));
        g.add_edge(Edge::new(0, 3, 10));
        Arc::new(RwLock::new(Some(g)))
    }
}
