pub mod executor;
pub mod mst;

pub use executor::{
    build_executor, AnalyticOp, AnalyticTask, StageChain, StagedPipeline, TaskExecutor, WorkerPool,
};
pub use mst::{strategy_for, ComputeError, MstStrategy, STRATEGY_NAMES};
