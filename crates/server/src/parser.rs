//! Line protocol parser.
//!
//! One command per line, whitespace separated, command word case
//! insensitive. Vertices are 1-based on the wire and shifted to the
//! 0-based internal ids here; everything downstream of the parser works
//! in internal ids only.

use graphd_core::Command;

/// Shift a 1-based wire vertex to its internal id.
fn wire_vertex(token: &str) -> Option<usize> {
    let id: usize = token.parse().ok()?;
    id.checked_sub(1)
}

fn weight(token: &str) -> Option<i64> {
    token.parse().ok()
}

/// Parse one protocol line. Anything malformed comes back as
/// [`Command::Unrecognized`] so the caller can echo a uniform error.
pub fn parse_command(line: &str) -> Command {
    let trimmed = line.trim();
    let mut tokens = trimmed.split_whitespace();
    let unrecognized = || Command::Unrecognized {
        raw: trimmed.to_string(),
    };

    let Some(word) = tokens.next() else {
        return unrecognized();
    };

    let parsed = match word.to_ascii_lowercase().as_str() {
        "newgraph" => {
            let n = tokens.next().and_then(|t| t.parse::<usize>().ok());
            let m = tokens.next().and_then(|t| t.parse::<usize>().ok());
            match (n, m) {
                (Some(vertex_count), Some(edge_count)) => Some(Command::NewGraph {
                    vertex_count,
                    edge_count,
                }),
                _ => None,
            }
        }
        "newedge" => {
            let u = tokens.next().and_then(wire_vertex);
            let v = tokens.next().and_then(wire_vertex);
            let w = tokens.next().and_then(weight);
            match (u, v, w) {
                (Some(u), Some(v), Some(weight)) => Some(Command::NewEdge { u, v, weight }),
                _ => None,
            }
        }
        "removeedge" => {
            let u = tokens.next().and_then(wire_vertex);
            let v = tokens.next().and_then(wire_vertex);
            match (u, v) {
                (Some(u), Some(v)) => Some(Command::RemoveEdge { u, v }),
                _ => None,
            }
        }
        "mst" => tokens.next().map(|strategy| Command::ComputeMst {
            strategy: strategy.to_ascii_lowercase(),
        }),
        "stats" => Some(Command::Stats),
        "path" => {
            let from = tokens.next().and_then(wire_vertex);
            let to = tokens.next().and_then(wire_vertex);
            match (from, to) {
                (Some(from), Some(to)) => Some(Command::ShortestPath { from, to }),
                _ => None,
            }
        }
        _ => None,
    };

    // Trailing junk after a well-formed command invalidates it.
    match parsed {
        Some(command) if tokens.next().is_none() => command,
        _ => unrecognized(),
    }
}

/// Parse one `u v w` edge triple, as sourced after `newgraph`. Wire
/// vertices, so 1-based.
pub fn parse_edge_line(line: &str) -> Option<(usize, usize, i64)> {
    let mut tokens = line.split_whitespace();
    let u = tokens.next().and_then(wire_vertex)?;
    let v = tokens.next().and_then(wire_vertex)?;
    let w = tokens.next().and_then(weight)?;
    if tokens.next().is_some() {
        return None;
    }
    Some((u, v, w))
}
