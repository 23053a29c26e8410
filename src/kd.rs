// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::Point;

/// KDTree implements the [k-d tree data structure](https://en.wikipedia.org/wiki/K-d_tree),
/// which can be used to speed up nearest-point search for large maps.
/// [crate::RouteGraph::find_closest_point] scans every routable point on each call; a k-d tree
/// answers the same question in logarithmic time, trading memory usage for CPU time.
///
/// Like the linear scan, ties between equally distant points resolve in favor of the lowest index.
#[derive(Debug, Clone)]
pub struct KDTree {
    pivot: usize,
    at: Point,
    left: Option<Box<KDTree>>,
    right: Option<Box<KDTree>>,
}

impl KDTree {
    /// Finds the index of the stored point closest to the given position.
    pub fn find_nearest_point(&self, x: f64, y: f64) -> usize {
        self.find_nearest_point_impl(Point::new(x, y), false).0
    }

    fn find_nearest_point_impl(&self, target: Point, y_divides: bool) -> (usize, f64) {
        // Start by assuming that pivot is the closest
        let mut best = self.pivot;
        let mut best_dist = target.distance(self.at);

        // Select which branch to recurse into first
        let first_left = if y_divides {
            target.y < self.at.y
        } else {
            target.x < self.at.x
        };
        let (first, second) = if first_left {
            (&self.left, &self.right)
        } else {
            (&self.right, &self.left)
        };

        // Recurse into the first branch
        if let Some(ref branch) = first {
            let (alt, alt_dist) = branch.find_nearest_point_impl(target, !y_divides);
            if is_better(alt, alt_dist, best, best_dist) {
                best = alt;
                best_dist = alt_dist;
            }
        }

        // (Optionally) recurse into the second branch
        if let Some(ref branch) = second {
            // A closer (or equally close) point is possible in the second branch if and only if
            // the splitting axis is not further than the current best candidate.
            let axis_dist = if y_divides {
                (target.y - self.at.y).abs()
            } else {
                (target.x - self.at.x).abs()
            };

            if axis_dist <= best_dist {
                let (alt, alt_dist) = branch.find_nearest_point_impl(target, !y_divides);
                if is_better(alt, alt_dist, best, best_dist) {
                    best = alt;
                    best_dist = alt_dist;
                }
            }
        }

        (best, best_dist)
    }

    /// Builds a k-d tree from indexed positions.
    /// Returns None if `points` is empty.
    pub fn build(points: &mut [(usize, Point)]) -> Option<Self> {
        Self::build_impl(points, false)
    }

    fn build_impl(points: &mut [(usize, Point)], y_divides: bool) -> Option<Self> {
        match points.len() {
            0 => None,
            1 => Some(Self {
                pivot: points[0].0,
                at: points[0].1,
                left: None,
                right: None,
            }),
            _ => {
                if y_divides {
                    points.sort_by(|a, b| a.1.y.total_cmp(&b.1.y));
                } else {
                    points.sort_by(|a, b| a.1.x.total_cmp(&b.1.x));
                }
                let median = points.len() / 2;
                let (pivot, at) = points[median];
                let (left, right_and_pivot) = points.split_at_mut(median);
                let right = &mut right_and_pivot[1..];
                Some(Self {
                    pivot,
                    at,
                    left: Self::build_impl(left, !y_divides).map(Box::new),
                    right: Self::build_impl(right, !y_divides).map(Box::new),
                })
            }
        }
    }
}

#[inline]
fn is_better(idx: usize, dist: f64, best: usize, best_dist: f64) -> bool {
    dist < best_dist || (dist == best_dist && idx < best)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kd_tree() {
        let tree = KDTree::build(&mut [
            (1, Point::new(0.01, 0.01)),
            (2, Point::new(0.05, 0.01)),
            (3, Point::new(0.09, 0.03)),
            (4, Point::new(0.03, 0.04)),
            (5, Point::new(0.07, 0.04)),
            (6, Point::new(0.03, 0.07)),
            (7, Point::new(0.01, 0.07)),
            (8, Point::new(0.05, 0.08)),
            (9, Point::new(0.09, 0.08)),
        ])
        .expect("k-d tree from non-empty slice must not be empty");

        assert_eq!(tree.find_nearest_point(0.02, 0.02), 1);
        assert_eq!(tree.find_nearest_point(0.03, 0.05), 4);
        assert_eq!(tree.find_nearest_point(0.08, 0.05), 5);
        assert_eq!(tree.find_nearest_point(0.06, 0.09), 8);
        assert_eq!(tree.find_nearest_point(0.09, 0.08), 9);
    }

    #[test]
    fn kd_tree_ties_prefer_lowest_index() {
        let tree = KDTree::build(&mut [
            (7, Point::new(1.0, 0.0)),
            (3, Point::new(0.0, 1.0)),
            (9, Point::new(2.0, 2.0)),
            (5, Point::new(-1.0, 0.0)),
            (2, Point::new(0.0, -1.0)),
            (8, Point::new(-2.0, 2.0)),
        ])
        .unwrap();
        assert_eq!(tree.find_nearest_point(0.0, 0.0), 2);

        // Coincident points
        let tree = KDTree::build(&mut [
            (4, Point::new(0.5, 0.5)),
            (6, Point::new(0.0, 0.0)),
            (1, Point::new(0.5, 0.5)),
            (0, Point::new(3.0, 3.0)),
        ])
        .unwrap();
        assert_eq!(tree.find_nearest_point(0.6, 0.6), 1);
    }

    #[test]
    fn kd_tree_empty() {
        assert!(KDTree::build(&mut []).is_none());
    }
}
