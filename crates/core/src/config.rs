use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_u16(key: &str, default: u16) -> u16 {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

/// Which task-executor design runs analytic work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutorKind {
    /// Fixed pool of workers sharing one FIFO queue.
    WorkerPool,
    /// Coordinator + backing pool; tasks advance through stage tags.
    Pipeline,
    /// Active-object chain: one dedicated thread and queue per stage.
    Chain,
}

impl ExecutorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutorKind::WorkerPool => "worker-pool",
            ExecutorKind::Pipeline => "pipeline",
            ExecutorKind::Chain => "chain",
        }
    }
}

impl FromStr for ExecutorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "worker-pool" | "workerpool" | "pool" => Ok(ExecutorKind::WorkerPool),
            "pipeline" | "staged" => Ok(ExecutorKind::Pipeline),
            "chain" | "active-object" => Ok(ExecutorKind::Chain),
            other => Err(format!(
                "unknown executor kind '{other}' (expected worker-pool, pipeline, or chain)"
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub executor: ExecutorConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig::from_env(),
            executor: ExecutorConfig::from_env(),
        }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded:");
        tracing::info!("  server:   {}:{}", self.server.host, self.server.port);
        tracing::info!(
            "  executor: kind={}, workers={}",
            self.executor.kind.as_str(),
            self.executor.resolved_worker_threads()
        );
    }
}

// ── Server ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    fn from_env() -> Self {
        Self {
            host: env_or("GRAPHD_HOST", "0.0.0.0"),
            port: env_u16("GRAPHD_PORT", 9036),
        }
    }
}

// ── Executor ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Which of the three executor designs to run.
    pub kind: ExecutorKind,
    /// Number of worker threads. 0 = available parallelism.
    pub worker_threads: usize,
}

impl ExecutorConfig {
    fn from_env() -> Self {
        let kind = env_or("GRAPHD_EXECUTOR", "worker-pool")
            .parse()
            .unwrap_or_else(|e| {
                tracing::warn!("{e}; falling back to worker-pool");
                ExecutorKind::WorkerPool
            });
        Self {
            kind,
            worker_threads: env_usize("GRAPHD_WORKER_THREADS", 0),
        }
    }

    /// Resolve worker thread count (0 means use available parallelism).
    pub fn resolved_worker_threads(&self) -> usize {
        if self.worker_threads == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        } else {
            self.worker_threads
        }
    }
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            kind: ExecutorKind::WorkerPool,
            worker_threads: 0,
        }
    }
}
