//! Active-object chain executor: one dedicated thread per stage, each with
//! its own queue, passing the task down the chain. The final stage is
//! implicit and delivers the accumulated text to the client.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;

use tracing::{debug, warn};

use graphd_core::DeliverySink;

use super::task::{compute_op, render, AnalyticTask, Computed};
use super::TaskExecutor;

/// A task travelling down the chain, accumulating its reply text.
pub struct ChainTask {
    pub task: AnalyticTask,
    pub(crate) computed: Option<Computed>,
    pub text: String,
}

impl ChainTask {
    fn new(task: AnalyticTask) -> Self {
        Self {
            task,
            computed: None,
            text: String::new(),
        }
    }
}

/// One stage's transformation of a passing task.
pub type StageFn = Box<dyn Fn(&mut ChainTask) + Send + Sync>;

struct StageState {
    queue: VecDeque<ChainTask>,
    stopping: bool,
}

struct StageShared {
    state: Mutex<StageState>,
    arrived: Condvar,
}

impl StageShared {
    fn new() -> Self {
        Self {
            state: Mutex::new(StageState {
                queue: VecDeque::new(),
                stopping: false,
            }),
            arrived: Condvar::new(),
        }
    }

    fn push(&self, task: ChainTask) {
        let mut state = self.state.lock().unwrap();
        if state.stopping {
            warn!("chain stage is stopping; task dropped");
            return;
        }
        state.queue.push_back(task);
        drop(state);
        self.arrived.notify_one();
    }

    /// Next task, or `None` once stopping and drained.
    fn pop(&self) -> Option<ChainTask> {
        let mut state = self.state.lock().unwrap();
        loop {
            if let Some(task) = state.queue.pop_front() {
                return Some(task);
            }
            if state.stopping {
                return None;
            }
            state = self.arrived.wait(state).unwrap();
        }
    }

    fn begin_stop(&self) {
        self.state.lock().unwrap().stopping = true;
        self.arrived.notify_all();
    }
}

/// Chain-of-stages executor. [`StageChain::analytics`] builds the standard
/// compute-then-render chain; [`StageChain::with_stages`] accepts custom
/// stage functions.
pub struct StageChain {
    stages: Arc<Vec<Arc<StageShared>>>,
    funcs: Arc<Vec<StageFn>>,
    handles: Mutex<Vec<JoinHandle<()>>>,
    sink: Arc<dyn DeliverySink>,
}

impl StageChain {
    pub fn with_stages(funcs: Vec<StageFn>, sink: Arc<dyn DeliverySink>) -> Self {
        // One extra stage at the tail delivers to the client.
        let stages = (0..funcs.len() + 1)
            .map(|_| Arc::new(StageShared::new()))
            .collect();
        Self {
            stages: Arc::new(stages),
            funcs: Arc::new(funcs),
            handles: Mutex::new(Vec::new()),
            sink,
        }
    }

    /// The standard analytic chain: compute, then render.
    pub fn analytics(sink: Arc<dyn DeliverySink>) -> Self {
        let funcs: Vec<StageFn> = vec![
            Box::new(|chained: &mut ChainTask| {
                chained.computed = Some(compute_op(&chained.task.graph, &chained.task.op));
            }),
            Box::new(|chained: &mut ChainTask| {
                if let Some(computed) = chained.computed.take() {
                    let text = render(&chained.task, computed);
                    chained.text.push_str(&text);
                }
            }),
        ];
        Self::with_stages(funcs, sink)
    }

    fn spawn_stage(&self, index: usize) -> JoinHandle<()> {
        let stages = Arc::clone(&self.stages);
        let funcs = Arc::clone(&self.funcs);
        let sink = Arc::clone(&self.sink);
        std::thread::spawn(move || {
            debug!(stage = index, "chain stage started");
            while let Some(mut chained) = stages[index].pop() {
                match funcs.get(index) {
                    Some(func) => {
                        func(&mut chained);
                        stages[index + 1].push(chained);
                    }
                    None => sink.deliver(chained.task.destination, &chained.text),
                }
            }
            debug!(stage = index, "chain stage exiting");
        })
    }
}

impl TaskExecutor for StageChain {
    fn start(&self) {
        let mut handles = self.handles.lock().unwrap();
        if !handles.is_empty() {
            return;
        }
        for index in 0..self.stages.len() {
            handles.push(self.spawn_stage(index));
        }
        debug!(stages = self.stages.len(), "stage chain started");
    }

    fn submit(&self, task: AnalyticTask) {
        self.stages[0].push(ChainTask::new(task));
    }

    fn stop(&self) {
        let handles = std::mem::take(&mut *self.handles.lock().unwrap());
        if handles.is_empty() {
            return;
        }
        // Front to back: each stage drains fully before the next sees its
        // stop flag, so no in-flight task is lost.
        for (stage, handle) in self.stages.iter().zip(handles) {
            stage.begin_stop();
            let _ = handle.join();
        }
        debug!("stage chain stopped");
    }
}

impl Drop for StageChain {
    fn drop(&mut self) {
        self.stop();
    }
}
