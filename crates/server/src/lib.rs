//! TCP front end for the graph service: line protocol parsing, the
//! mutation/analytic dispatch seam, and client reply routing.

pub mod parser;
pub mod service;

pub use parser::{parse_command, parse_edge_line};
pub use service::{GraphService, Reply};
