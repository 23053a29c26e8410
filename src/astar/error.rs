// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

/// Error conditions which may occur during [AStar::run](crate::AStar::run)
/// or [find_route](crate::find_route).
///
/// Absence of a route is not an error - it's reported as `Ok(None)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AStarError {
    /// The start or goal node doesn't exist in the graph.
    InvalidReference(usize),

    /// No point of the graph lies on a routable road,
    /// so query positions can't be mapped onto the graph.
    NoRoutablePoints,
}

impl std::fmt::Display for AStarError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidReference(node) => write!(f, "invalid node: {}", node),
            Self::NoRoutablePoints => write!(f, "graph has no routable points"),
        }
    }
}

impl std::error::Error for AStarError {}
