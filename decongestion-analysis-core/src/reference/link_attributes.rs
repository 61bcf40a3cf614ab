use geo::Centroid;
use geo_types::{LineString, Point};
use uom::si::f64::{Length, Velocity};

/// static, scenario-independent attributes of one network link.
#[derive(Clone, Debug, PartialEq)]
pub struct LinkAttributes {
    pub link_id: String,
    pub from_node: String,
    pub to_node: String,
    pub length: Length,
    /// free-flow speed
    pub freespeed: Velocity,
    /// vehicles per hour
    pub capacity: f64,
    pub lanes: f64,
    pub modes: Vec<String>,
    pub geometry: LineString<f64>,
}

impl LinkAttributes {
    pub fn centroid(&self) -> Option<Point<f64>> {
        self.geometry.centroid()
    }

    /// link length summed over all lanes
    pub fn lane_length(&self) -> Length {
        self.length * self.lanes
    }

    pub fn allows_mode(&self, mode: &str) -> bool {
        self.modes.iter().any(|m| m == mode)
    }
}
