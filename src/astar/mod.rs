// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

mod error;
mod path;
mod search;

pub use error::AStarError;
pub use path::Path;
pub use search::{AStar, SearchNode, SearchState};

use crate::Point;

/// The only capability the [AStar] engine needs from a graph:
/// positions of nodes and the ability to list neighbors of a node.
///
/// Nodes are identified by dense indices in `0..len()`.
pub trait Topology {
    /// Returns the number of nodes.
    fn len(&self) -> usize;

    /// Returns the planar position of a node, or None if it doesn't exist.
    fn position(&self, node: usize) -> Option<Point>;

    /// Lists nodes directly reachable from `node`, omitting nodes
    /// for which `is_visited` returns true.
    fn neighbors<F: Fn(usize) -> bool>(&self, node: usize, is_visited: F) -> Vec<usize>;

    /// Conversion factor from planar units to meters, applied to [Path::distance].
    fn metric_scale(&self) -> f64 {
        1.0
    }
}
