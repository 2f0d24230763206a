//! Staged pipeline executor: a coordinator thread walks each task through
//! fixed stages, handing the per-stage work to a backing worker pool.
//!
//! The coordinator owns ordering; the pool owns parallelism. A task that
//! finishes a stage re-enters the coordinator queue at the next stage, so
//! stages of different tasks interleave freely across the pool.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;

use tracing::{debug, warn};

use graphd_core::{ClientId, DeliverySink};

use super::task::{compute_op, render, AnalyticOp, AnalyticTask, Computed};
use super::worker_pool::WorkerPool;
use super::TaskExecutor;

use crate::mst::strategy_for;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    InitGraph,
    RunMst,
    ComputeMetrics,
}

struct StagedTask {
    task: AnalyticTask,
    stage: Stage,
    computed: Option<Computed>,
}

enum StageOutcome {
    Continue(Stage),
    Done(ClientId, String),
}

/// Run one stage of `staged` in place.
fn run_stage(staged: &mut StagedTask) -> StageOutcome {
    match staged.stage {
        Stage::InitGraph => {
            // Reject bad strategy names before any heavy work.
            if let AnalyticOp::Mst { strategy } = &staged.task.op {
                if let Err(err) = strategy_for(strategy) {
                    return StageOutcome::Done(staged.task.destination, format!("{err}\n"));
                }
            }
            StageOutcome::Continue(Stage::RunMst)
        }
        Stage::RunMst => {
            if matches!(staged.task.op, AnalyticOp::Mst { .. }) {
                staged.computed = Some(compute_op(&staged.task.graph, &staged.task.op));
            }
            StageOutcome::Continue(Stage::ComputeMetrics)
        }
        Stage::ComputeMetrics => {
            let computed = match staged.computed.take() {
                Some(computed) => computed,
                None => compute_op(&staged.task.graph, &staged.task.op),
            };
            let text = render(&staged.task, computed);
            StageOutcome::Done(staged.task.destination, text)
        }
    }
}

struct CoordState {
    queue: VecDeque<StagedTask>,
    stopping: bool,
    in_flight: usize,
}

struct PipeShared {
    state: Mutex<CoordState>,
    changed: Condvar,
}

/// Pipeline-style executor.
pub struct StagedPipeline {
    shared: Arc<PipeShared>,
    pool: Arc<WorkerPool>,
    coordinator: Mutex<Option<JoinHandle<()>>>,
    sink: Arc<dyn DeliverySink>,
}

impl StagedPipeline {
    pub fn new(workers: usize, sink: Arc<dyn DeliverySink>) -> Self {
        Self {
            shared: Arc::new(PipeShared {
                state: Mutex::new(CoordState {
                    queue: VecDeque::new(),
                    stopping: false,
                    in_flight: 0,
                }),
                changed: Condvar::new(),
            }),
            pool: Arc::new(WorkerPool::new(workers, Arc::clone(&sink))),
            coordinator: Mutex::new(None),
            sink,
        }
    }

    fn spawn_coordinator(&self) -> JoinHandle<()> {
        let shared = Arc::clone(&self.shared);
        let pool = Arc::clone(&self.pool);
        let sink = Arc::clone(&self.sink);
        std::thread::spawn(move || {
            debug!("pipeline coordinator started");
            loop {
                let staged = {
                    let mut state = shared.state.lock().unwrap();
                    loop {
                        if let Some(staged) = state.queue.pop_front() {
                            state.in_flight += 1;
                            break Some(staged);
                        }
                        // Exit only once nothing is queued or running.
                        if state.stopping && state.in_flight == 0 {
                            break None;
                        }
                        state = shared.changed.wait(state).unwrap();
                    }
                };
                let Some(mut staged) = staged else { break };

                let job_shared = Arc::clone(&shared);
                let job_sink = Arc::clone(&sink);
                pool.execute(Box::new(move || {
                    let outcome = run_stage(&mut staged);
                    let mut state = job_shared.state.lock().unwrap();
                    state.in_flight -= 1;
                    match outcome {
                        StageOutcome::Continue(next) => {
                            staged.stage = next;
                            state.queue.push_back(staged);
                        }
                        StageOutcome::Done(destination, text) => {
                            drop(state);
                            job_sink.deliver(destination, &text);
                            state = job_shared.state.lock().unwrap();
                        }
                    }
                    drop(state);
                    job_shared.changed.notify_all();
                }));
            }
            debug!("pipeline coordinator exiting");
        })
    }
}

impl TaskExecutor for StagedPipeline {
    fn start(&self) {
        let mut coordinator = self.coordinator.lock().unwrap();
        if coordinator.is_some() {
            return;
        }
        self.pool.start();
        *coordinator = Some(self.spawn_coordinator());
        debug!("staged pipeline started");
    }

    fn submit(&self, task: AnalyticTask) {
        let mut state = self.shared.state.lock().unwrap();
        if state.stopping {
            warn!("pipeline is stopping; task dropped");
            return;
        }
        state.queue.push_back(StagedTask {
            task,
            stage: Stage::InitGraph,
            computed: None,
        });
        drop(state);
        self.shared.changed.notify_all();
    }

    fn stop(&self) {
        {
            let mut state = self.shared.state.lock().unwrap();
            if state.stopping {
                return;
            }
            state.stopping = true;
        }
        self.shared.changed.notify_all();
        if let Some(handle) = self.coordinator.lock().unwrap().take() {
            let _ = handle.join();
        }
        self.pool.stop();
        debug!("staged pipeline stopped");
    }
}

impl Drop for StagedPipeline {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{shared_square, CollectingSink};
    use super::*;

    #[test]
    fn tasks_traverse_all_stages_to_delivery() {
        let sink = Arc::new(CollectingSink::default());
        let pipeline = StagedPipeline::new(3, sink.clone());
        pipeline.start();

        let graph = shared_square();
        for id in 0..12u64 {
            pipeline.submit(AnalyticTask {
                graph: graph.clone(),
                op: AnalyticOp::Mst {
                    strategy: "prim".to_string(),
                },
                destination: id,
            });
        }
        pipeline.stop();

        let delivered = sink.take();
        assert_eq!(delivered.len(), 12);
        assert!(delivered.iter().all(|(id, text)| text.starts_with(&format!(
            "Client {id} requested to find MST of the Graph\nMST Strategy: prim\n"
        ))));
    }

    #[test]
    fn bad_strategy_short_circuits_at_the_first_stage() {
        let sink = Arc::new(CollectingSink::default());
        let pipeline = StagedPipeline::new(1, sink.clone());
        pipeline.start();

        pipeline.submit(AnalyticTask {
            graph: shared_square(),
            op: AnalyticOp::Mst {
                strategy: "bogus".to_string(),
            },
            destination: 3,
        });
        pipeline.stop();

        let delivered = sink.take();
        assert_eq!(delivered, vec![(3, "Unknown MST strategy: bogus\n".to_string())]);
    }

    #[test]
    fn non_mst_ops_compute_in_the_metrics_stage() {
        let sink = Arc::new(CollectingSink::default());
        let pipeline = StagedPipeline::new(2, sink.clone());
        pipeline.start();

        pipeline.submit(AnalyticTask {
            graph: shared_square(),
            op: AnalyticOp::ShortestPath { from: 1, to: 3 },
            destination: 9,
        });
        pipeline.stop();

        let delivered = sink.take();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].0, 9);
        assert_eq!(
            delivered[0].1,
            "Shortest path from 1 to 3 is: 1 -> 2 -> 3 with a distance of 3\n"
        );
    }
}
