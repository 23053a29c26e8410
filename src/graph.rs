// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::{KDTree, Model, Point, Road, Topology};

/// Routable view over a [Model].
///
/// For every point the graph remembers which non-footway [Roads](Road) pass through it.
/// No point-to-point edges are stored: neighbors are resolved when queried,
/// by scanning the ways of incident roads (see [RouteGraph::find_neighbors]).
#[derive(Debug, Clone)]
pub struct RouteGraph {
    model: Model,

    /// Indices into [Model::roads], per point.
    node_to_roads: Vec<Vec<usize>>,
}

impl RouteGraph {
    /// Builds the point-to-road lookup for the provided [Model].
    ///
    /// Footway roads are left out. Roads referencing a non-existent way, and way nodes
    /// referencing a non-existent point, are skipped with a warning.
    pub fn new(model: Model) -> Self {
        let mut node_to_roads: Vec<Vec<usize>> = vec![Vec::default(); model.points().len()];

        for (road_idx, road) in model.roads().iter().enumerate() {
            if !road.type_.is_routable() {
                continue;
            }

            let Some(way) = model.ways().get(road.way) else {
                log::warn!("road {} references non-existent way {}", road_idx, road.way);
                continue;
            };

            for &node_idx in &way.nodes {
                match node_to_roads.get_mut(node_idx) {
                    Some(roads) => {
                        if roads.last() != Some(&road_idx) {
                            roads.push(road_idx);
                        }
                    }
                    None => log::warn!(
                        "way {} (road {}) references non-existent point {}",
                        road.way,
                        road_idx,
                        node_idx
                    ),
                }
            }
        }

        Self {
            model,
            node_to_roads,
        }
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Returns the number of points in the graph.
    pub fn len(&self) -> usize {
        self.model.points().len()
    }

    pub fn is_empty(&self) -> bool {
        self.model.points().is_empty()
    }

    /// Retrieves the position of the point with the provided index.
    pub fn get_point(&self, idx: usize) -> Option<Point> {
        self.model.points().get(idx).copied()
    }

    /// Returns all non-footway [Roads](Road) passing through a point.
    pub fn roads_at(&self, idx: usize) -> impl Iterator<Item = &Road> + '_ {
        self.node_to_roads
            .get(idx)
            .map(|roads| roads.as_slice())
            .unwrap_or_default()
            .iter()
            .map(|&road_idx| &self.model.roads()[road_idx])
    }

    /// Returns true if at least one non-footway road passes through the point.
    pub fn is_routable(&self, idx: usize) -> bool {
        self.node_to_roads
            .get(idx)
            .is_some_and(|roads| !roads.is_empty())
    }

    /// Returns an iterator over indices and positions of all points
    /// lying on at least one non-footway road.
    pub fn routable_points(&self) -> impl Iterator<Item = (usize, Point)> + '_ {
        self.model
            .points()
            .iter()
            .enumerate()
            .filter(|&(idx, _)| self.is_routable(idx))
            .map(|(idx, &pt)| (idx, pt))
    }

    /// Finds the points directly reachable from `idx`.
    ///
    /// Every incident road contributes at most one neighbor: the point on its way closest to
    /// `idx`, excluding points at zero distance and points for which `is_visited` returns true.
    /// The returned indices are distinct.
    pub fn find_neighbors<F: Fn(usize) -> bool>(&self, idx: usize, is_visited: F) -> Vec<usize> {
        let Some(from) = self.get_point(idx) else {
            return Vec::default();
        };

        let mut neighbors = Vec::default();
        for road in self.roads_at(idx) {
            let way = &self.model.ways()[road.way];
            if let Some(n) = self.closest_on_way(from, &way.nodes, &is_visited) {
                if !neighbors.contains(&n) {
                    neighbors.push(n);
                }
            }
        }
        neighbors
    }

    fn closest_on_way<F: Fn(usize) -> bool>(
        &self,
        from: Point,
        nodes: &[usize],
        is_visited: &F,
    ) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;

        for &candidate in nodes {
            let Some(pt) = self.get_point(candidate) else {
                continue;
            };

            let dist = from.distance(pt);
            if dist == 0.0 || is_visited(candidate) {
                continue;
            }

            if best.is_none_or(|(_, best_dist)| dist < best_dist) {
                best = Some((candidate, dist));
            }
        }

        best.map(|(idx, _)| idx)
    }

    /// Finds the point closest to the given position among the points lying on
    /// non-footway roads. Ties are resolved in favor of the lowest index.
    ///
    /// This function requires computing the distance to every routable point,
    /// see [RouteGraph::kd_tree] for repeated lookups on large graphs.
    ///
    /// Returns None if the graph has no routable points.
    pub fn find_closest_point(&self, x: f64, y: f64) -> Option<usize> {
        let target = Point::new(x, y);
        let mut best: Option<(usize, f64)> = None;

        for (idx, pt) in self.routable_points() {
            let dist = target.distance(pt);
            if best.is_none_or(|(_, best_dist)| dist < best_dist) {
                best = Some((idx, dist));
            }
        }

        best.map(|(idx, _)| idx)
    }

    /// Builds a [KDTree] over all routable points.
    /// Returns None if the graph has no routable points.
    pub fn kd_tree(&self) -> Option<KDTree> {
        let mut points: Vec<(usize, Point)> = self.routable_points().collect();
        KDTree::build(&mut points)
    }
}

impl Topology for RouteGraph {
    fn len(&self) -> usize {
        RouteGraph::len(self)
    }

    fn position(&self, node: usize) -> Option<Point> {
        self.get_point(node)
    }

    fn neighbors<F: Fn(usize) -> bool>(&self, node: usize, is_visited: F) -> Vec<usize> {
        self.find_neighbors(node, is_visited)
    }

    fn metric_scale(&self) -> f64 {
        self.model.metric_scale()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RoadType, Way};

    fn residential(way: usize) -> Road {
        Road {
            way,
            type_: RoadType::Residential,
        }
    }

    fn footway(way: usize) -> Road {
        Road {
            way,
            type_: RoadType::Footway,
        }
    }

    //  3 ─ ─ ─ 2
    //  ┆       │
    //  0 ───── 1 ───── 4
    //
    // 0-1-4 is residential, 1-2 is residential, 2-3-0 is a footway.
    fn simple_graph() -> RouteGraph {
        RouteGraph::new(Model::new(
            vec![
                Point::new(0.0, 0.0),
                Point::new(1.0, 0.0),
                Point::new(1.0, 1.0),
                Point::new(0.0, 1.0),
                Point::new(2.0, 0.0),
            ],
            vec![
                Way {
                    nodes: vec![0, 1, 4],
                },
                Way { nodes: vec![1, 2] },
                Way {
                    nodes: vec![2, 3, 0],
                },
            ],
            vec![residential(0), residential(1), footway(2)],
            1.0,
        ))
    }

    #[test]
    fn maps_points_to_roads() {
        let g = simple_graph();

        let at = |idx| g.roads_at(idx).map(|r| r.way).collect::<Vec<_>>();
        assert_eq!(at(0), vec![0]);
        assert_eq!(at(1), vec![0, 1]);
        assert_eq!(at(2), vec![1]);
        assert_eq!(at(3), Vec::<usize>::new());
        assert_eq!(at(4), vec![0]);
        assert_eq!(at(99), Vec::<usize>::new());
    }

    #[test]
    fn footway_points_are_not_routable() {
        let g = simple_graph();
        assert!(g.is_routable(0));
        assert!(!g.is_routable(3));
        assert_eq!(
            g.routable_points().map(|(idx, _)| idx).collect::<Vec<_>>(),
            vec![0, 1, 2, 4]
        );
    }

    #[test]
    fn skips_malformed_roads_and_empty_ways() {
        let g = RouteGraph::new(Model::new(
            vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)],
            vec![Way::default(), Way { nodes: vec![0, 1, 7] }],
            vec![residential(0), residential(5), residential(1)],
            1.0,
        ));

        assert_eq!(g.roads_at(0).count(), 1);
        assert_eq!(g.roads_at(1).count(), 1);
        assert_eq!(g.find_neighbors(0, |_| false), vec![1]);
    }

    #[test]
    fn neighbors_pick_closest_point_per_road() {
        let g = simple_graph();

        // On way 0, point 1 is closer to 0 than point 4.
        // Footway 2-3-0 doesn't contribute.
        assert_eq!(g.find_neighbors(0, |_| false), vec![1]);

        // Way 0 gives 0 (tied with 4, first wins), way 1 gives 2.
        assert_eq!(g.find_neighbors(1, |_| false), vec![0, 2]);
    }

    #[test]
    fn neighbors_skip_visited_points() {
        let g = simple_graph();
        assert_eq!(g.find_neighbors(1, |idx| idx == 0), vec![4, 2]);
        assert_eq!(g.find_neighbors(1, |idx| idx != 1), Vec::<usize>::new());
    }

    #[test]
    fn neighbors_never_include_self() {
        let g = simple_graph();
        for idx in 0..g.len() {
            assert!(!g.find_neighbors(idx, |_| false).contains(&idx));
        }
    }

    #[test]
    fn neighbors_ignore_coincident_points() {
        let g = RouteGraph::new(Model::new(
            vec![
                Point::new(0.0, 0.0),
                Point::new(0.0, 0.0),
                Point::new(3.0, 0.0),
            ],
            vec![Way {
                nodes: vec![0, 1, 2],
            }],
            vec![residential(0)],
            1.0,
        ));
        assert_eq!(g.find_neighbors(0, |_| false), vec![2]);
    }

    #[test]
    fn neighbors_are_distinct_when_roads_share_a_way() {
        let g = RouteGraph::new(Model::new(
            vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)],
            vec![Way { nodes: vec![0, 1] }],
            vec![
                residential(0),
                Road {
                    way: 0,
                    type_: RoadType::Primary,
                },
            ],
            1.0,
        ));
        assert_eq!(g.roads_at(0).count(), 2);
        assert_eq!(g.find_neighbors(0, |_| false), vec![1]);
    }

    #[test]
    fn closest_point_exact_match() {
        let g = simple_graph();
        let idx = g.find_closest_point(1.0, 1.0).unwrap();
        assert_eq!(idx, 2);
        assert_eq!(g.get_point(idx).unwrap().distance(Point::new(1.0, 1.0)), 0.0);
    }

    #[test]
    fn closest_point_ignores_footways() {
        let g = simple_graph();
        // Point 3 lies only on the footway
        assert_eq!(g.find_closest_point(0.0, 0.9), Some(0));
    }

    #[test]
    fn closest_point_on_empty_graph() {
        let g = RouteGraph::new(Model::default());
        assert_eq!(g.find_closest_point(0.5, 0.5), None);

        let only_footways = RouteGraph::new(Model::new(
            vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)],
            vec![Way { nodes: vec![0, 1] }],
            vec![footway(0)],
            1.0,
        ));
        assert_eq!(only_footways.find_closest_point(0.5, 0.5), None);
        assert!(only_footways.kd_tree().is_none());
    }

    #[test]
    fn kd_tree_agrees_with_linear_scan() {
        let g = simple_graph();
        let tree = g.kd_tree().unwrap();
        for &(x, y) in &[(0.1, 0.1), (0.9, 0.2), (1.2, 0.8), (1.7, -0.3), (0.0, 0.9)] {
            assert_eq!(
                tree.find_nearest_point(x, y),
                g.find_closest_point(x, y).unwrap()
            );
        }
    }
}
