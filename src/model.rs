// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::osm::Projection;
use crate::Point;

/// An ordered polyline over indices into [Model::points].
///
/// Two ways sharing a point index is the only topology signal in a [Model].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Way {
    pub nodes: Vec<usize>,
}

/// Classification of a road, as derived from the OSM `highway` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoadType {
    Invalid,
    Unclassified,
    Service,
    Residential,
    Tertiary,
    Secondary,
    Primary,
    Trunk,
    Motorway,
    Footway,
}

impl RoadType {
    /// Maps a value of the [highway](https://wiki.openstreetmap.org/wiki/Key:highway)
    /// tag to a [RoadType]. Unrecognized values map to [RoadType::Invalid].
    pub fn from_highway(value: &str) -> Self {
        match value {
            "motorway" => Self::Motorway,
            "trunk" => Self::Trunk,
            "primary" => Self::Primary,
            "secondary" => Self::Secondary,
            "tertiary" => Self::Tertiary,
            "residential" | "living_street" => Self::Residential,
            "service" => Self::Service,
            "unclassified" => Self::Unclassified,
            "footway" | "bridleway" | "steps" | "path" | "pedestrian" => Self::Footway,
            _ => Self::Invalid,
        }
    }

    /// Returns `false` for road types which can't be used by vehicles.
    #[inline]
    pub fn is_routable(self) -> bool {
        self != Self::Footway
    }
}

impl std::fmt::Display for RoadType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Invalid => "invalid",
            Self::Unclassified => "unclassified",
            Self::Service => "service",
            Self::Residential => "residential",
            Self::Tertiary => "tertiary",
            Self::Secondary => "secondary",
            Self::Primary => "primary",
            Self::Trunk => "trunk",
            Self::Motorway => "motorway",
            Self::Footway => "footway",
        };
        f.write_str(s)
    }
}

/// A classified reference to a single [Way].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Road {
    /// Index into [Model::ways].
    pub way: usize,
    pub type_: RoadType,
}

/// Static map geometry: points, the ways connecting them and road classifications
/// of those ways.
///
/// A Model is immutable once built. Routing state lives elsewhere, see
/// [RouteGraph](crate::RouteGraph) and [AStar](crate::AStar).
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    points: Vec<Point>,
    ways: Vec<Way>,
    roads: Vec<Road>,
    metric_scale: f64,
    projection: Option<Projection>,
}

impl Default for Model {
    fn default() -> Self {
        Self::new(Vec::default(), Vec::default(), Vec::default(), 1.0)
    }
}

impl Model {
    /// Creates a Model from already-projected geometry.
    ///
    /// `metric_scale` converts planar point units into meters.
    pub fn new(points: Vec<Point>, ways: Vec<Way>, roads: Vec<Road>, metric_scale: f64) -> Self {
        Self {
            points,
            ways,
            roads,
            metric_scale,
            projection: None,
        }
    }

    /// Attaches the [Projection] which was used to generate the points.
    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.metric_scale = projection.metric_scale();
        self.projection = Some(projection);
        self
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn ways(&self) -> &[Way] {
        &self.ways
    }

    pub fn roads(&self) -> &[Road] {
        &self.roads
    }

    /// Conversion factor from planar point units to meters.
    pub fn metric_scale(&self) -> f64 {
        self.metric_scale
    }

    /// The geographic projection of the points, if the Model was loaded from OSM data.
    pub fn projection(&self) -> Option<&Projection> {
        self.projection.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_highway_values() {
        assert_eq!(RoadType::from_highway("motorway"), RoadType::Motorway);
        assert_eq!(RoadType::from_highway("living_street"), RoadType::Residential);
        assert_eq!(RoadType::from_highway("steps"), RoadType::Footway);
        assert_eq!(RoadType::from_highway("pedestrian"), RoadType::Footway);
        assert_eq!(RoadType::from_highway("motorway_link"), RoadType::Invalid);
        assert_eq!(RoadType::from_highway(""), RoadType::Invalid);
    }

    #[test]
    fn only_footways_are_not_routable() {
        assert!(!RoadType::Footway.is_routable());
        assert!(RoadType::Residential.is_routable());
        assert!(RoadType::Service.is_routable());
    }
}
