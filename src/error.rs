//! Crate-wide error taxonomy.

use std::fmt;
use std::io;

use crate::graph::NodeId;

/// Errors surfaced by the registry, scorers, and graph provider.
///
/// Collaborator failures are never masked as a default score: a score
/// of 0 or negative infinity is always a computed result, while these
/// variants mean the computation did not happen.
#[derive(Debug)]
pub enum RouteError {
    /// Malformed numeric input to a score calculator or graph query.
    InvalidArgument(String),
    /// No path exists between the two nodes in the source graph.
    NoPath { start: NodeId, end: NodeId },
    /// A supplied node sequence is not a valid walk in the graph.
    InvalidWalk,
    /// The graph provider failed to produce a graph.
    GraphUnavailable(GraphUnavailableReason),
    /// Network type with no registered filter.
    UnknownNetworkType(String),
}

/// Underlying cause of a failed graph acquisition.
#[derive(Debug)]
pub enum GraphUnavailableReason {
    Http(reqwest::Error),
    Io(io::Error),
    Malformed(String),
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteError::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            RouteError::NoPath { start, end } => {
                write!(f, "no path between nodes {start} and {end}")
            }
            RouteError::InvalidWalk => write!(f, "node sequence is not a walk in the graph"),
            RouteError::GraphUnavailable(reason) => match reason {
                GraphUnavailableReason::Http(err) => write!(f, "graph unavailable: {err}"),
                GraphUnavailableReason::Io(err) => write!(f, "graph unavailable: {err}"),
                GraphUnavailableReason::Malformed(msg) => {
                    write!(f, "graph unavailable: malformed response: {msg}")
                }
            },
            RouteError::UnknownNetworkType(kind) => write!(f, "unknown network type: {kind}"),
        }
    }
}

impl std::error::Error for RouteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RouteError::GraphUnavailable(GraphUnavailableReason::Http(err)) => Some(err),
            RouteError::GraphUnavailable(GraphUnavailableReason::Io(err)) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for RouteError {
    fn from(err: reqwest::Error) -> Self {
        RouteError::GraphUnavailable(GraphUnavailableReason::Http(err))
    }
}

impl From<io::Error> for RouteError {
    fn from(err: io::Error) -> Self {
        RouteError::GraphUnavailable(GraphUnavailableReason::Io(err))
    }
}
