// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::hash_map::{Entry, HashMap};

use crate::osm::{Bounds, Projection};
use crate::{Model, Road, RoadType, Way};

use super::{model, Options};

/// Helper object used for storing state related to converting [OSM features](super::model::Feature)
/// into a [Model].
pub(super) struct ModelBuilder<'a> {
    options: &'a Options,
    bounds: Option<Bounds>,
    node_ids: HashMap<i64, usize>,
    positions: Vec<(f64, f64)>,
    ways: Vec<Way>,
    roads: Vec<Road>,
    ignore_bbox: bool,
}

impl<'a> ModelBuilder<'a> {
    /// Create a new, empty model builder.
    pub(super) fn new(options: &'a Options) -> Self {
        let all_zero = options.bbox.iter().all(|&x| x == 0.0);
        let any_invalid = options.bbox.iter().any(|x| !x.is_finite());
        if any_invalid && !all_zero {
            log::warn!("ignoring invalid bounding box {:?}", options.bbox);
        }

        Self {
            options,
            bounds: None,
            node_ids: HashMap::default(),
            positions: Vec::default(),
            ways: Vec::default(),
            roads: Vec::default(),
            ignore_bbox: all_zero || any_invalid,
        }
    }

    /// Add all features from the provided iterator, and build the [Model].
    pub(super) fn add_features<I, E>(mut self, features: I) -> Result<Model, E>
    where
        I: IntoIterator<Item = Result<model::Feature, E>>,
    {
        for f in features {
            self.add_feature(f?);
        }
        Ok(self.build())
    }

    fn add_feature(&mut self, f: model::Feature) {
        match f {
            model::Feature::Bounds(b) => self.add_bounds(b),
            model::Feature::Node(n) => self.add_node(n),
            model::Feature::Way(w) => self.add_way(w),
        }
    }

    fn add_bounds(&mut self, b: Bounds) {
        if self.bounds.is_some() {
            log::debug!("ignoring repeated <bounds>");
        } else {
            self.bounds = Some(b);
        }
    }

    fn add_node(&mut self, n: model::Node) {
        if !self.is_in_bbox(n.lat, n.lon) {
            return;
        }

        match self.node_ids.entry(n.id) {
            Entry::Occupied(_) => log::warn!("duplicate node {}, keeping the first one", n.id),
            Entry::Vacant(e) => {
                e.insert(self.positions.len());
                self.positions.push((n.lat, n.lon));
            }
        }
    }

    fn is_in_bbox(&self, lat: f64, lon: f64) -> bool {
        if self.ignore_bbox {
            return true;
        }
        let [min_lon, min_lat, max_lon, max_lat] = self.options.bbox;
        lat >= min_lat && lat <= max_lat && lon >= min_lon && lon <= max_lon
    }

    fn add_way(&mut self, w: model::Way) {
        let type_ = match w.tags.get("highway") {
            Some(v) => RoadType::from_highway(v),
            None => return,
        };
        if type_ == RoadType::Invalid {
            return;
        }

        let nodes = self.get_way_nodes(&w);
        if nodes.is_empty() {
            log::debug!("way {} has no known nodes", w.id);
        }

        self.roads.push(Road {
            way: self.ways.len(),
            type_,
        });
        self.ways.push(Way { nodes });
    }

    fn get_way_nodes(&self, w: &model::Way) -> Vec<usize> {
        // Remove references to unknown nodes
        w.nodes
            .iter()
            .filter_map(|node_id| {
                let idx = self.node_ids.get(node_id).copied();
                if idx.is_none() {
                    log::debug!("way {} references unknown node {}", w.id, node_id);
                }
                idx
            })
            .collect()
    }

    fn build(self) -> Model {
        let bounds = self
            .bounds
            .or_else(|| Bounds::enclosing(self.positions.iter().copied()));

        let Some(bounds) = bounds else {
            log::warn!("no nodes loaded");
            return Model::default();
        };

        let projection = Projection::new(bounds);
        let points = self
            .positions
            .iter()
            .map(|&(lat, lon)| projection.forward(lat, lon))
            .collect();

        log::info!(
            "loaded {} points, {} roads",
            self.positions.len(),
            self.roads.len()
        );
        Model::new(points, self.ways, self.roads, 1.0).with_projection(projection)
    }
}

#[cfg(test)]
mod tests {
    use super::model::{Feature, Node, Way as OsmWay};
    use super::*;
    use crate::osm::FileFormat;
    use std::convert::Infallible;

    fn options(bbox: [f64; 4]) -> Options {
        Options {
            file_format: FileFormat::Xml,
            bbox,
        }
    }

    fn node(id: i64, lat: f64, lon: f64) -> Result<Feature, Infallible> {
        Ok(Feature::Node(Node { id, lat, lon }))
    }

    fn way(id: i64, nodes: &[i64], highway: &str) -> Result<Feature, Infallible> {
        Ok(Feature::Way(OsmWay {
            id,
            nodes: nodes.to_vec(),
            tags: HashMap::from_iter([("highway".to_string(), highway.to_string())]),
        }))
    }

    #[test]
    fn resolves_node_references() {
        let opts = options([0.0; 4]);
        let m = ModelBuilder::new(&opts)
            .add_features([
                node(10, 1.0, 1.0),
                node(20, 1.0, 2.0),
                node(30, 2.0, 2.0),
                way(1, &[10, 20, 99, 30], "residential"),
                way(2, &[30, 10], "steps"),
                way(3, &[10, 30], "proposed"),
            ])
            .unwrap();

        assert_eq!(m.points().len(), 3);
        assert_eq!(
            m.ways(),
            &[
                Way {
                    nodes: vec![0, 1, 2]
                },
                Way { nodes: vec![2, 0] }
            ]
        );
        assert_eq!(
            m.roads(),
            &[
                Road {
                    way: 0,
                    type_: RoadType::Residential
                },
                Road {
                    way: 1,
                    type_: RoadType::Footway
                },
            ]
        );
    }

    #[test]
    fn first_duplicate_node_wins() {
        let opts = options([0.0; 4]);
        let m = ModelBuilder::new(&opts)
            .add_features([node(1, 1.0, 1.0), node(1, 5.0, 5.0), node(2, 2.0, 2.0)])
            .unwrap();

        assert_eq!(m.points().len(), 2);
        let (lat, lon) = m.projection().unwrap().inverse(m.points()[0]);
        assert!((lat - 1.0).abs() < 1e-9);
        assert!((lon - 1.0).abs() < 1e-9);
    }

    #[test]
    fn bbox_filters_nodes() {
        let opts = options([0.5, 0.5, 1.5, 1.5]);
        let m = ModelBuilder::new(&opts)
            .add_features([
                node(1, 1.0, 1.0),
                node(2, 3.0, 3.0),
                way(5, &[1, 2], "primary"),
            ])
            .unwrap();

        assert_eq!(m.points().len(), 1);
        assert_eq!(m.ways(), &[Way { nodes: vec![0] }]);
    }

    #[test]
    fn bounds_default_to_node_extent() {
        let opts = options([0.0; 4]);
        let m = ModelBuilder::new(&opts)
            .add_features([node(1, 10.0, 20.0), node(2, 10.5, 21.0)])
            .unwrap();

        let p = m.points();
        assert!(p[0].x.abs() < 1e-12 && p[0].y.abs() < 1e-12);
        assert!((p[1].y - 1.0).abs() < 1e-12);
        assert!(m.metric_scale() > 0.0);
    }

    #[test]
    fn empty_input() {
        let opts = options([0.0; 4]);
        let m = ModelBuilder::new(&opts)
            .add_features(Vec::<Result<Feature, Infallible>>::new())
            .unwrap();
        assert!(m.points().is_empty());
        assert!(m.projection().is_none());
    }
}
