use std::{
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
};

use geo_types::Geometry;
use geojson::{Feature, FeatureCollection, JsonObject};

use crate::app::AppError;

pub fn feature(geometry: &Geometry<f64>, properties: JsonObject) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(geojson::Geometry::new(geojson::Value::from(geometry))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

/// writes the features as one GeoJSON FeatureCollection. coordinates are
/// written as found in the network, without reprojection.
pub fn write_feature_collection(
    features: Vec<Feature>,
    filename: &str,
    output_directory: &Path,
    overwrite: bool,
) -> Result<Option<PathBuf>, AppError> {
    let filepath = output_directory.join(filename);
    if filepath.exists() && !overwrite {
        log::warn!("not overwriting existing file {}", filepath.to_string_lossy());
        return Ok(None);
    }
    log::info!(
        "writing {} features to {}",
        features.len(),
        filepath.to_string_lossy()
    );
    let collection = FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    };
    let file = File::create(&filepath).map_err(|e| AppError::WriteError {
        path: filepath.clone(),
        message: e.to_string(),
    })?;
    serde_json::to_writer(BufWriter::new(file), &collection).map_err(|e| AppError::WriteError {
        path: filepath.clone(),
        message: e.to_string(),
    })?;
    Ok(Some(filepath))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::Point;
    use serde_json::json;

    #[test]
    fn test_point_feature() {
        let mut properties = JsonObject::new();
        properties.insert(String::from("linkId"), json!("100"));
        let f = feature(&Geometry::Point(Point::new(1.0, 2.0)), properties);
        let value = serde_json::to_value(&f).unwrap();
        assert_eq!(value["geometry"]["type"], "Point");
        assert_eq!(value["geometry"]["coordinates"], json!([1.0, 2.0]));
        assert_eq!(value["properties"]["linkId"], "100");
    }
}
