use std::{io::Read, path::Path};

use serde::Deserialize;

use crate::{report::RecordIssues, table::MetricTable, util::fs, AnalysisError};

pub const LINK_KEY_COLUMN: &str = "link_id";
pub const VOLUME_COLUMN: &str = "simulated_traffic_volume";

/// one row of the daily per-link traffic statistics. columns missing from
/// the file, or empty cells, are absent values.
#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
pub struct LinkTrafficRecord {
    pub link_id: String,
    #[serde(default)]
    pub lane_km: Option<f64>,
    #[serde(default)]
    pub avg_speed: Option<f64>,
    #[serde(default)]
    pub congestion_index: Option<f64>,
    #[serde(default)]
    pub speed_performance_index: Option<f64>,
    #[serde(default)]
    pub simulated_traffic_volume: Option<f64>,
    #[serde(default)]
    pub vol_freight: Option<f64>,
    #[serde(default)]
    pub vol_car: Option<f64>,
}

pub fn load_link_traffic(
    path: &Path,
    issues: &mut RecordIssues,
) -> Result<Vec<LinkTrafficRecord>, AnalysisError> {
    let reader = fs::open_buffered(path)?;
    read_link_traffic(reader, &path.to_string_lossy(), issues)
}

pub fn read_link_traffic<R: Read>(
    reader: R,
    source_name: &str,
    issues: &mut RecordIssues,
) -> Result<Vec<LinkTrafficRecord>, AnalysisError> {
    let mut csv_reader = fs::csv_reader(reader, b',');
    let lookup = fs::header_lookup(&mut csv_reader, source_name)?;
    fs::require_column(&lookup, LINK_KEY_COLUMN, source_name)?;

    let mut records = vec![];
    for row in csv_reader.deserialize::<LinkTrafficRecord>() {
        match row {
            Ok(record) => records.push(record),
            Err(e) => issues.malformed(&AnalysisError::MalformedRecord {
                source_name: source_name.to_string(),
                position: e.position().map(|p| p.line()).unwrap_or_default(),
                message: e.to_string(),
            }),
        }
    }
    Ok(records)
}

/// simulated daily volume per link, keyed by `link_id`
pub fn volume_table(
    scenario: &str,
    records: &[LinkTrafficRecord],
) -> Result<MetricTable, AnalysisError> {
    let mut table = MetricTable::new(scenario, LINK_KEY_COLUMN, [VOLUME_COLUMN]);
    for record in records.iter() {
        table.insert(&record.link_id, vec![record.simulated_traffic_volume])?;
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_reads_known_columns() {
        let csv = "link_id,lane_km,road_capacity_utilization,avg_speed,congestion_index,speed_performance_index,simulated_traffic_volume,vol_freight,vol_car
1,1.0,0.5,5.0,0.8,0.5,720,20,700
2,0.5,0.1,,0.9,1.0,100,,100
3,x,0.1,1,1,1,1,1,1
";
        let mut issues = RecordIssues::default();
        let records = read_link_traffic(Cursor::new(csv), "traffic.csv", &mut issues).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(issues.skipped_malformed, 1);
        assert_eq!(records[0].simulated_traffic_volume, Some(720.0));
        assert_eq!(records[1].avg_speed, None);
        assert_eq!(records[1].vol_freight, None);

        let table = volume_table("basecase", &records).unwrap();
        assert_eq!(table.value("2", VOLUME_COLUMN), Some(100.0));
    }

    #[test]
    fn test_missing_link_column() {
        let mut issues = RecordIssues::default();
        let result = read_link_traffic(Cursor::new("id,avg_speed\n1,2\n"), "traffic.csv", &mut issues);
        assert!(matches!(result, Err(AnalysisError::MissingColumn { .. })));
    }
}
