//! Fixed-size worker pool over a shared job queue.
//!
//! Workers block on a condvar until a job arrives or shutdown starts.
//! The stop flag lives inside the queue mutex so a worker can never miss
//! the wakeup between checking the flag and going to sleep.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;

use tracing::{debug, warn};

use graphd_core::DeliverySink;

use super::task::{run_analytic, AnalyticTask};
use super::TaskExecutor;

pub(crate) type Job = Box<dyn FnOnce() + Send + 'static>;

struct QueueState {
    jobs: VecDeque<Job>,
    stopping: bool,
}

struct PoolShared {
    queue: Mutex<QueueState>,
    available: Condvar,
}

/// The leader/followers style executor: every worker pulls whole tasks
/// from one queue and runs them end to end.
pub struct WorkerPool {
    workers: usize,
    shared: Arc<PoolShared>,
    handles: Mutex<Vec<JoinHandle<()>>>,
    sink: Arc<dyn DeliverySink>,
}

impl WorkerPool {
    pub fn new(workers: usize, sink: Arc<dyn DeliverySink>) -> Self {
        Self {
            workers: workers.max(1),
            shared: Arc::new(PoolShared {
                queue: Mutex::new(QueueState {
                    jobs: VecDeque::new(),
                    stopping: false,
                }),
                available: Condvar::new(),
            }),
            handles: Mutex::new(Vec::new()),
            sink,
        }
    }

    /// Enqueue an arbitrary job. Jobs submitted after `stop` are dropped.
    pub(crate) fn execute(&self, job: Job) {
        let mut state = self.shared.queue.lock().unwrap();
        if state.stopping {
            warn!("worker pool is stopping; job dropped");
            return;
        }
        state.jobs.push_back(job);
        self.shared.available.notify_one();
    }

    fn spawn_worker(&self, index: usize) -> JoinHandle<()> {
        let shared = Arc::clone(&self.shared);
        std::thread::spawn(move || {
            debug!(worker = index, "worker started");
            loop {
                let job = {
                    let mut state = shared.queue.lock().unwrap();
                    loop {
                        if let Some(job) = state.jobs.pop_front() {
                            break Some(job);
                        }
                        if state.stopping {
                            break None;
                        }
                        state = shared.available.wait(state).unwrap();
                    }
                };
                match job {
                    Some(job) => job(),
                    // Stopping and the queue is drained.
                    None => break,
                }
            }
            debug!(worker = index, "worker exiting");
        })
    }
}

impl TaskExecutor for WorkerPool {
    fn start(&self) {
        let mut handles = self.handles.lock().unwrap();
        if !handles.is_empty() {
            return;
        }
        for index in 0..self.workers {
            handles.push(self.spawn_worker(index));
        }
        debug!(workers = self.workers, "worker pool started");
    }

    fn submit(&self, task: AnalyticTask) {
        let sink = Arc::clone(&self.sink);
        self.execute(Box::new(move || {
            let text = run_analytic(&task);
            sink.deliver(task.destination, &text);
        }));
    }

    fn stop(&self) {
        {
            let mut state = self.shared.queue.lock().unwrap();
            if state.stopping {
                return;
            }
            state.stopping = true;
        }
        self.shared.available.notify_all();
        let handles = std::mem::take(&mut *self.handles.lock().unwrap());
        for handle in handles {
            let _ = handle.join();
        }
        debug!("worker pool stopped");
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{shared_square, CollectingSink};
    use super::super::task::AnalyticOp;
    use super::*;

    #[test]
    fn stop_drains_queued_tasks() {
        let sink = Arc::new(CollectingSink::default());
        let pool = WorkerPool::new(2, sink.clone());
        pool.start();

        let graph = shared_square();
        for id in 0..20u64 {
            pool.submit(AnalyticTask {
                graph: graph.clone(),
                op: AnalyticOp::ShortestPath { from: 0, to: 3 },
                destination: id,
            });
        }
        pool.stop();

        let delivered = sink.take();
        assert_eq!(delivered.len(), 20);
        let mut ids: Vec<u64> = delivered.iter().map(|(id, _)| *id).collect();
        ids.sort_unstable();
        assert_eq!(ids, (0..20).collect::<Vec<_>>());
        assert!(delivered.iter().all(|(_, text)| text.ends_with("distance of 4\n")));
    }

    #[test]
    fn submit_after_stop_is_dropped() {
        let sink = Arc::new(CollectingSink::default());
        let pool = WorkerPool::new(1, sink.clone());
        pool.start();
        pool.stop();

        pool.submit(AnalyticTask {
            graph: shared_square(),
            op: AnalyticOp::Stats,
            destination: 7,
        });
        assert!(sink.take().is_empty());
    }

    #[test]
    fn single_worker_preserves_submission_order() {
        let sink = Arc::new(CollectingSink::default());
        let pool = WorkerPool::new(1, sink.clone());
        pool.start();

        let graph = shared_square();
        for id in 0..5u64 {
            pool.submit(AnalyticTask {
                graph: graph.clone(),
                op: AnalyticOp::ShortestPath { from: 0, to: 1 },
                destination: id,
            });
        }
        pool.stop();

        let ids: Vec<u64> = sink.take().iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
    }
}
