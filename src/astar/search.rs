// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::BinaryHeap;

use super::{path::reconstruct_path, AStarError, Path, Topology};
use crate::Point;

/// Per-run search bookkeeping of a single graph node.
///
/// Kept apart from the static graph, in an array indexed identically to the graph nodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchNode {
    /// Cost from the start node. Only meaningful once `visited` is set.
    pub g: f64,

    /// Straight-line distance to the goal, computed when the node is first discovered.
    pub h: f64,

    /// Set once the node has been placed on the open set. Visited nodes are never revised.
    pub visited: bool,

    /// Predecessor on the best known path; None for the start node and undiscovered nodes.
    pub parent: Option<usize>,

    /// Unvisited neighbors found when the node was expanded.
    pub neighbors: Vec<usize>,
}

impl SearchNode {
    #[inline]
    pub fn f(&self) -> f64 {
        self.g + self.h
    }
}

/// Lifecycle of an [AStar] search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    /// No search has been started since the last reset.
    Idle,

    /// The open set is non-empty and the goal hasn't been reached yet.
    Searching,

    /// The goal node was taken from the open set.
    Found,

    /// The open set was emptied without reaching the goal - no route exists.
    Exhausted,
}

#[derive(Debug, Clone, Copy)]
struct OpenItem {
    at: usize,
    score: f64,
    seq: u64,
}

impl PartialEq for OpenItem {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}

impl Eq for OpenItem {}

impl PartialOrd for OpenItem {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenItem {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // NOTE: We revert the order of comparison,
        // as lower scores (and earlier insertions on ties) are considered better ("higher"),
        // and Rust's BinaryHeap is a max-heap.
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// [A* search](https://en.wikipedia.org/wiki/A*_search_algorithm) over any [Topology],
/// with the straight-line distance to the goal as the heuristic.
///
/// Contrary to textbook A*, a node is marked as visited when it's first placed on the open set,
/// and its cost is never revised afterwards, even if a cheaper way to it is discovered later.
/// The returned route is thus not guaranteed to be the shortest one.
///
/// The engine owns all search state; starting a new search resets it.
/// Runs are deterministic: ties on the f-value are broken in favor of the node
/// discovered first.
#[derive(Debug)]
pub struct AStar<'g, T: Topology> {
    graph: &'g T,
    nodes: Vec<SearchNode>,
    open: BinaryHeap<OpenItem>,
    seq: u64,
    goal: Option<(usize, Point)>,
    state: SearchState,
    expanded: usize,
}

impl<'g, T: Topology> AStar<'g, T> {
    /// Creates an idle search engine over the provided graph.
    pub fn new(graph: &'g T) -> Self {
        Self {
            graph,
            nodes: vec![SearchNode::default(); graph.len()],
            open: BinaryHeap::default(),
            seq: 0,
            goal: None,
            state: SearchState::Idle,
            expanded: 0,
        }
    }

    pub fn state(&self) -> SearchState {
        self.state
    }

    /// Returns the search bookkeeping of a node.
    pub fn node(&self, idx: usize) -> Option<&SearchNode> {
        self.nodes.get(idx)
    }

    /// Returns the number of nodes expanded since the last reset.
    pub fn expanded(&self) -> usize {
        self.expanded
    }

    /// Clears all search state and returns to [SearchState::Idle].
    pub fn reset(&mut self) {
        self.nodes.clear();
        self.nodes.resize(self.graph.len(), SearchNode::default());
        self.open.clear();
        self.seq = 0;
        self.goal = None;
        self.state = SearchState::Idle;
        self.expanded = 0;
    }

    /// Resets the engine and seeds the open set with `start`.
    pub fn start(&mut self, start: usize, goal: usize) -> Result<(), AStarError> {
        self.reset();

        let goal_at = self
            .graph
            .position(goal)
            .filter(|_| goal < self.nodes.len())
            .ok_or(AStarError::InvalidReference(goal))?;
        let start_at = self
            .graph
            .position(start)
            .ok_or(AStarError::InvalidReference(start))?;
        self.goal = Some((goal, goal_at));

        let h = start_at.distance(goal_at);
        let node = self
            .nodes
            .get_mut(start)
            .ok_or(AStarError::InvalidReference(start))?;
        node.g = 0.0;
        node.h = h;
        node.visited = true;
        self.push(start, h);

        log::debug!("searching from {} to {}", start, goal);
        self.state = SearchState::Searching;
        Ok(())
    }

    /// Removes and returns the open set member with the lowest f-value.
    pub fn select_next(&mut self) -> Option<usize> {
        self.open.pop().map(|item| item.at)
    }

    /// Finds and stores the unvisited neighbors of a node.
    pub fn find_neighbors(&mut self, idx: usize) -> &[usize] {
        let neighbors = {
            let nodes = &self.nodes;
            self.graph.neighbors(idx, |n| nodes.get(n).is_some_and(|n| n.visited))
        };

        match self.nodes.get_mut(idx) {
            Some(node) => {
                node.neighbors = neighbors;
                &node.neighbors
            }
            None => &[],
        }
    }

    /// Discovers all unvisited neighbors of `current`: records their costs and parent,
    /// marks them as visited and places them on the open set.
    pub fn expand(&mut self, current: usize) {
        let Some(current_at) = self.graph.position(current) else {
            return;
        };
        let Some(current_g) = self.nodes.get(current).map(|n| n.g) else {
            return;
        };

        self.expanded += 1;
        let neighbors = self.find_neighbors(current).to_vec();

        for neighbor in neighbors {
            let Some(neighbor_at) = self.graph.position(neighbor) else {
                continue;
            };
            let h = self.h_value(neighbor_at);
            let node = match self.nodes.get_mut(neighbor) {
                Some(node) if !node.visited => node,
                _ => continue,
            };
            node.parent = Some(current);
            node.g = current_g + current_at.distance(neighbor_at);
            node.h = h;
            node.visited = true;

            let score = node.f();
            self.push(neighbor, score);
        }
    }

    /// Advances a started search by taking one node from the open set, and either
    /// concluding that it's the goal or expanding it.
    ///
    /// Does nothing unless the search is in [SearchState::Searching].
    pub fn step(&mut self) -> SearchState {
        if self.state != SearchState::Searching {
            return self.state;
        }

        self.state = match (self.select_next(), self.goal) {
            (Some(current), Some((goal, _))) if current == goal => SearchState::Found,
            (Some(current), _) => {
                self.expand(current);
                SearchState::Searching
            }
            (None, _) => SearchState::Exhausted,
        };
        self.state
    }

    /// Reconstructs the route to the goal. Returns None unless the search is in
    /// [SearchState::Found].
    pub fn path(&self) -> Option<Path> {
        match (self.state, self.goal) {
            (SearchState::Found, Some((goal, _))) => {
                Some(reconstruct_path(self.graph, &self.nodes, goal))
            }
            _ => None,
        }
    }

    /// Runs a complete search from `start` to `goal`.
    ///
    /// Returns `Ok(None)` if there is no route between the two nodes.
    pub fn run(&mut self, start: usize, goal: usize) -> Result<Option<Path>, AStarError> {
        self.start(start, goal)?;
        while self.step() == SearchState::Searching {}

        match self.state {
            SearchState::Found => {
                log::debug!("route found after expanding {} nodes", self.expanded);
            }
            _ => {
                log::debug!(
                    "no route from {} to {}, expanded {} nodes",
                    start,
                    goal,
                    self.expanded
                );
            }
        }
        Ok(self.path())
    }

    fn h_value(&self, at: Point) -> f64 {
        self.goal
            .map(|(_, goal_at)| at.distance(goal_at))
            .unwrap_or_default()
    }

    fn push(&mut self, at: usize, score: f64) {
        self.open.push(OpenItem {
            at,
            score,
            seq: self.seq,
        });
        self.seq += 1;
    }
}
