use thiserror::Error;

#[derive(Error, Debug)]
pub enum GraphdError {
    #[error("Vertex {0} is out of range")]
    OutOfRange(usize),

    #[error("Unknown MST strategy: {0}")]
    UnknownStrategy(String),

    #[error("No active graph; create one with newgraph first")]
    NoActiveGraph,

    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}
