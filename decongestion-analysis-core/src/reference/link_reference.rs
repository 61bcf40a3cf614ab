use std::{io::BufRead, path::Path};

use geo_types::{LineString, Point};
use indexmap::IndexMap;
use serde::Deserialize;
use uom::si::{
    f64::{Length, Velocity},
    length::meter,
    velocity::meter_per_second,
};
use wkt::TryFromWkt;

use super::{network_xml, LinkAttributes};
use crate::{util::fs, AnalysisError};

/// the shared per-link attribute table every scenario is joined against.
/// links keep the order of the source file. the table is immutable once
/// loaded and is shared read-only between scenario builders.
#[derive(Clone, Debug, Default)]
pub struct LinkReference {
    links: IndexMap<String, LinkAttributes>,
}

/// row of a CSV link table. lengths in meters, speeds in meters per second,
/// geometry as a WKT LineString.
#[derive(Deserialize, Debug)]
struct LinkRow {
    link_id: String,
    from_node: String,
    to_node: String,
    length: f64,
    freespeed: f64,
    capacity: f64,
    lanes: f64,
    #[serde(default)]
    modes: String,
    geometry: String,
}

impl LinkReference {
    pub fn new(links: Vec<LinkAttributes>) -> Result<LinkReference, String> {
        let mut result = IndexMap::with_capacity(links.len());
        for link in links.into_iter() {
            let id = link.link_id.clone();
            if result.insert(id.clone(), link).is_some() {
                return Err(format!("duplicate link id '{id}'"));
            }
        }
        Ok(LinkReference { links: result })
    }

    /// loads a CSV link table when the file name contains `.csv`, otherwise
    /// a MATSim network file. either may be gzip-compressed.
    pub fn from_path(path: &Path) -> Result<LinkReference, AnalysisError> {
        let is_csv = path
            .file_name()
            .map(|name| name.to_string_lossy().to_lowercase().contains(".csv"))
            .unwrap_or(false);
        if is_csv {
            LinkReference::from_csv(path)
        } else {
            LinkReference::from_network_xml(path)
        }
    }

    pub fn from_network_xml(path: &Path) -> Result<LinkReference, AnalysisError> {
        log::info!("reading network links from {}", path.to_string_lossy());
        let reader = fs::open_buffered(path)?;
        LinkReference::read_network_xml(reader).map_err(|message| AnalysisError::ReferenceLoad {
            path: path.to_path_buf(),
            message,
        })
    }

    pub fn read_network_xml<R: BufRead>(reader: R) -> Result<LinkReference, String> {
        let links = network_xml::read_links(reader)?;
        LinkReference::new(links)
    }

    pub fn from_csv(path: &Path) -> Result<LinkReference, AnalysisError> {
        log::info!("reading link table from {}", path.to_string_lossy());
        let reader = fs::open_buffered(path)?;
        LinkReference::read_csv(reader).map_err(|message| AnalysisError::ReferenceLoad {
            path: path.to_path_buf(),
            message,
        })
    }

    pub fn read_csv<R: BufRead>(reader: R) -> Result<LinkReference, String> {
        let mut csv_reader = fs::csv_reader(reader, b',');
        let mut links = vec![];
        for (idx, row) in csv_reader.deserialize::<LinkRow>().enumerate() {
            let row = row.map_err(|e| format!("failure reading link row {idx}: {e}"))?;
            let geometry = LineString::<f64>::try_from_wkt_str(&row.geometry).map_err(|e| {
                format!(
                    "geometry of link '{}' is not a WKT LineString: {e}",
                    row.link_id
                )
            })?;
            links.push(LinkAttributes {
                length: Length::new::<meter>(row.length),
                freespeed: Velocity::new::<meter_per_second>(row.freespeed),
                capacity: row.capacity,
                lanes: row.lanes,
                modes: row
                    .modes
                    .split(',')
                    .map(str::trim)
                    .filter(|m| !m.is_empty())
                    .map(String::from)
                    .collect(),
                geometry,
                link_id: row.link_id,
                from_node: row.from_node,
                to_node: row.to_node,
            });
        }
        LinkReference::new(links)
    }

    pub fn get(&self, link_id: &str) -> Option<&LinkAttributes> {
        self.links.get(link_id)
    }

    pub fn contains(&self, link_id: &str) -> bool {
        self.links.contains_key(link_id)
    }

    pub fn centroid(&self, link_id: &str) -> Option<Point<f64>> {
        self.links.get(link_id).and_then(LinkAttributes::centroid)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LinkAttributes> {
        self.links.values()
    }
}
