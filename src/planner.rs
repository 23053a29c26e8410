// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::{AStar, AStarError, Path, Point, RouteGraph};

/// Finds a route between two arbitrary positions.
///
/// Both positions are first mapped onto the closest point lying on a routable road
/// (see [RouteGraph::find_closest_point]), then [AStar] is run between those points.
///
/// Returns `Ok(None)` if no route exists between the two points.
pub fn find_route(g: &RouteGraph, start: Point, end: Point) -> Result<Option<Path>, AStarError> {
    let start_idx = g
        .find_closest_point(start.x, start.y)
        .ok_or(AStarError::NoRoutablePoints)?;
    let end_idx = g
        .find_closest_point(end.x, end.y)
        .ok_or(AStarError::NoRoutablePoints)?;

    AStar::new(g).run(start_idx, end_idx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Model, Road, RoadType, Way};

    //  0 ── 1 ── 2      3 ── 4
    fn two_streets() -> RouteGraph {
        RouteGraph::new(Model::new(
            vec![
                Point::new(0.0, 0.0),
                Point::new(1.0, 0.0),
                Point::new(2.0, 0.0),
                Point::new(5.0, 0.0),
                Point::new(6.0, 0.0),
            ],
            vec![
                Way {
                    nodes: vec![0, 1, 2],
                },
                Way { nodes: vec![3, 4] },
            ],
            vec![
                Road {
                    way: 0,
                    type_: RoadType::Tertiary,
                },
                Road {
                    way: 1,
                    type_: RoadType::Tertiary,
                },
            ],
            1.0,
        ))
    }

    #[test]
    fn endpoints_snap_to_graph() {
        let g = two_streets();
        let path = find_route(&g, Point::new(-0.2, 0.3), Point::new(2.1, -0.1))
            .unwrap()
            .unwrap();
        assert_eq!(path.nodes, vec![0, 1, 2]);
        assert_eq!(path.points.first(), g.get_point(0).as_ref());
        assert_eq!(path.points.last(), g.get_point(2).as_ref());
    }

    #[test]
    fn no_route_between_streets() {
        let g = two_streets();
        assert_eq!(
            find_route(&g, Point::new(0.0, 0.0), Point::new(6.0, 0.0)),
            Ok(None)
        );
    }

    #[test]
    fn empty_graph() {
        let g = RouteGraph::new(Model::default());
        assert_eq!(
            find_route(&g, Point::new(0.0, 0.0), Point::new(1.0, 0.0)),
            Err(AStarError::NoRoutablePoints)
        );
    }
}
