// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Shortest routes over [OpenStreetMap](https://www.openstreetmap.org/) road geometry.
//!
//! OSM data is loaded into a [Model] of projected points, ways and classified roads.
//! A [RouteGraph] resolves which roads pass through every point, and neighbors
//! are looked up along those roads while [AStar] runs. Footways are never used for routing.
//!
//! # Example
//!
//! ```no_run
//! let options = roadstar::osm::Options {
//!     file_format: roadstar::osm::FileFormat::Unknown,
//!     bbox: [0.0; 4],
//! };
//! let model = roadstar::osm::load_from_file(&options, "path/to/map.osm")
//!     .expect("failed to load map.osm");
//! let g = roadstar::RouteGraph::new(model);
//!
//! let start = roadstar::Point::new(0.1, 0.1);
//! let end = roadstar::Point::new(0.9, 0.8);
//! match roadstar::find_route(&g, start, end).expect("map has no roads") {
//!     Some(path) => println!("{:.1} m: {:?}", path.distance, path.nodes),
//!     None => println!("no route"),
//! }
//! ```

mod astar;
mod distance;
mod graph;
mod kd;
mod model;
pub mod osm;
mod planner;

pub use astar::{AStar, AStarError, Path, SearchNode, SearchState, Topology};
pub use distance::euclidean_distance;
pub use graph::RouteGraph;
pub use kd::KDTree;
pub use model::{Model, Road, RoadType, Way};
pub use planner::find_route;

/// A position on the projected plane.
///
/// Points are identified by their index in [Model::points].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Straight-line distance to another point.
    #[inline]
    pub fn distance(self, other: Point) -> f64 {
        euclidean_distance(self.x, self.y, other.x, other.y)
    }
}
