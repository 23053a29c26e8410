// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use super::{SearchNode, Topology};
use crate::Point;

/// A route found by [AStar](crate::AStar).
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    /// Indices of the traversed nodes, from start to goal (inclusive).
    pub nodes: Vec<usize>,

    /// Positions of the traversed nodes, in the same order as `nodes`.
    pub points: Vec<Point>,

    /// Total length of the route, in meters (planar length times the metric scale).
    pub distance: f64,
}

impl Path {
    /// Returns true if the path consists of the start node only.
    pub fn is_trivial(&self) -> bool {
        self.nodes.len() <= 1
    }
}

/// Walks the parent chain from `goal` back to the start node.
pub(super) fn reconstruct_path<T: Topology>(g: &T, nodes: &[SearchNode], goal: usize) -> Path {
    let mut path = vec![goal];
    let mut length = 0.0;
    let mut last = goal;

    while let Some(parent) = nodes.get(last).and_then(|n| n.parent) {
        debug_assert!(path.len() <= nodes.len(), "cycle in the parent chain");
        length += hop_length(g, last, parent);
        path.push(parent);
        last = parent;
    }

    path.reverse();
    let points = path.iter().filter_map(|&idx| g.position(idx)).collect();

    Path {
        nodes: path,
        points,
        distance: length * g.metric_scale(),
    }
}

fn hop_length<T: Topology>(g: &T, from: usize, to: usize) -> f64 {
    match (g.position(from), g.position(to)) {
        (Some(a), Some(b)) => a.distance(b),
        _ => 0.0,
    }
}
