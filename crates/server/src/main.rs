//! graphd — TCP front end for the shared-graph service.
//!
//! One task per connection reads protocol lines; a per-connection writer
//! task owns the socket's write half and drains an unbounded channel. The
//! client registry maps client ids to those channels and doubles as the
//! executors' delivery sink, so analytic replies reach exactly the
//! requesting client while mutation replies broadcast to everyone.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{info, warn};

use graphd_compute::{build_executor, TaskExecutor};
use graphd_core::{config, ClientId, Command, Config, DeliverySink, ExecutorKind};
use graphd_graph::new_shared_graph;
use graphd_server::{parse_command, parse_edge_line, GraphService, Reply};

const WELCOME: &str = "Welcome to the server!\n\
This server can perform the following actions:\n\
1. Create a new graph: newgraph n m where \"n\" is the number of vertices and \"m\" is the number of edges.\n\
2. Add an edge to the graph: newedge n m w where \"n\" and \"m\" are the vertices and \"w\" is the weight of the edge.\n\
3. Remove an edge from the graph: removeedge n m where \"n\" and \"m\" are the vertices.\n\
4. Find the Minimum Spanning Tree of the graph: mst strat - where strat is one of 'prim', 'kruskal', 'tarjan' or 'boruvka'.\n\
5. Print the graph's stats: stats\n\
6. Find the shortest path between two vertices: path n m\n";

const EDGE_PROMPT: &str =
    "To create an edge u->v with weight w please enter the edge number in the format: u v w \n";

// ── CLI ─────────────────────────────────────────────────────────────

/// Concurrent graph-processing server.
#[derive(Parser, Debug)]
#[command(name = "graphd", version, about)]
struct Cli {
    /// Listen host.
    #[arg(long, env = "GRAPHD_HOST")]
    host: Option<String>,

    /// Listen port.
    #[arg(long, env = "GRAPHD_PORT")]
    port: Option<u16>,

    /// Task executor design: worker-pool, pipeline, or chain.
    #[arg(long, env = "GRAPHD_EXECUTOR")]
    executor: Option<ExecutorKind>,

    /// Worker threads for the executor (0 = available parallelism).
    #[arg(long, env = "GRAPHD_WORKER_THREADS")]
    workers: Option<usize>,
}

// ── Client registry ─────────────────────────────────────────────────

#[derive(Default)]
struct ClientRegistry {
    writers: Mutex<HashMap<ClientId, UnboundedSender<String>>>,
}

impl ClientRegistry {
    fn register(&self, id: ClientId, tx: UnboundedSender<String>) {
        self.writers.lock().unwrap_or_else(|e| e.into_inner()).insert(id, tx);
    }

    fn unregister(&self, id: ClientId) {
        self.writers.lock().unwrap_or_else(|e| e.into_inner()).remove(&id);
    }

    fn broadcast(&self, text: &str) {
        let writers = self.writers.lock().unwrap_or_else(|e| e.into_inner());
        for tx in writers.values() {
            let _ = tx.send(text.to_string());
        }
    }
}

impl DeliverySink for ClientRegistry {
    fn deliver(&self, destination: ClientId, text: &str) {
        let writers = self.writers.lock().unwrap_or_else(|e| e.into_inner());
        match writers.get(&destination) {
            Some(tx) => {
                let _ = tx.send(text.to_string());
            }
            // Client went away while its task was queued.
            None => warn!(client = destination, "reply dropped; client disconnected"),
        }
    }
}

// ── Connection handling ─────────────────────────────────────────────

async fn handle_client(
    stream: TcpStream,
    id: ClientId,
    service: Arc<GraphService>,
    registry: Arc<ClientRegistry>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    registry.register(id, tx.clone());

    let write_task = tokio::spawn(async move {
        while let Some(text) = rx.recv().await {
            if writer.write_all(text.as_bytes()).await.is_err() {
                break;
            }
        }
    });

    let _ = tx.send(WELCOME.to_string());

    let mut lines = BufReader::new(reader).lines();
    // Edge triples still owed after a newgraph on this connection.
    let mut pending_edges: usize = 0;

    while let Some(line) = lines.next_line().await? {
        if pending_edges > 0 {
            match parse_edge_line(&line) {
                Some((u, v, weight)) => {
                    let result = tokio::task::block_in_place(|| {
                        service.add_sourced_edge(u, v, weight)
                    });
                    if let Err(err) = result {
                        let _ = tx.send(format!("{err}\n"));
                    }
                }
                None => {
                    let _ = tx.send(EDGE_PROMPT.to_string());
                }
            }
            pending_edges -= 1;
            continue;
        }

        let command = parse_command(&line);
        let sourcing = match &command {
            Command::NewGraph { edge_count, .. } => Some(*edge_count),
            _ => None,
        };

        // Mutations block on the exclusive lock; keep the runtime's other
        // connections responsive while they do.
        let reply = tokio::task::block_in_place(|| service.handle(id, command));
        match reply {
            Reply::Broadcast(text) => registry.broadcast(&text),
            Reply::Direct(text) => {
                let _ = tx.send(text);
            }
            Reply::Queued => {}
        }

        if let Some(edge_count) = sourcing {
            pending_edges = edge_count;
            if edge_count > 0 {
                let _ = tx.send(EDGE_PROMPT.to_string());
            }
        }
    }

    registry.unregister(id);
    drop(tx);
    write_task.await?;
    Ok(())
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    config::load_dotenv();
    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(kind) = cli.executor {
        config.executor.kind = kind;
    }
    if let Some(workers) = cli.workers {
        config.executor.worker_threads = workers;
    }
    config.log_summary();

    let registry = Arc::new(ClientRegistry::default());
    let executor: Arc<dyn TaskExecutor> = build_executor(
        config.executor.kind,
        config.executor.resolved_worker_threads(),
        registry.clone(),
    );
    executor.start();
    let service = Arc::new(GraphService::new(new_shared_graph(), executor.clone()));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, "graphd listening");

    let mut next_client: ClientId = 1;
    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer) = accepted?;
                let id = next_client;
                next_client += 1;
                info!(client = id, %peer, "client connected");

                let service = Arc::clone(&service);
                let registry = Arc::clone(&registry);
                tokio::spawn(async move {
                    if let Err(err) = handle_client(stream, id, service, Arc::clone(&registry)).await {
                        warn!(client = id, error = %err, "connection error");
                    }
                    registry.unregister(id);
                    info!(client = id, "client disconnected");
                });
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown signal received");
                break;
            }
        }
    }

    // Drain queued analytics before exiting.
    tokio::task::block_in_place(|| executor.stop());
    info!("graphd stopped");
    Ok(())
}
