use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// the per-scenario simulation outputs read by the analysis
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum InputFile {
    Events,
    ModeStats,
    TripStats,
    TrafficStats,
    Emissions,
}

impl InputFile {
    /// path template used when no configuration overrides it. `{root}`,
    /// `{run_id}` and `{name}` are replaced per scenario.
    pub fn default_template(&self) -> &'static str {
        match self {
            InputFile::Events => "{root}/{run_id}.output_events.xml.gz",
            InputFile::ModeStats => "{root}/{run_id}.modestats.txt",
            InputFile::TripStats => "{root}/analysis/population/trip_stats.csv",
            InputFile::TrafficStats => "{root}/analysis/traffic/traffic_stats_by_link_daily.csv",
            InputFile::Emissions => "{root}/analysis/emissions/{run_id}.emissionsPerLink.csv",
        }
    }
}

impl Display for InputFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            InputFile::Events => "events",
            InputFile::ModeStats => "mode stats",
            InputFile::TripStats => "trip stats",
            InputFile::TrafficStats => "traffic stats",
            InputFile::Emissions => "emissions",
        };
        write!(f, "{s}")
    }
}

/// optional path templates overriding [`InputFile::default_template`]
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct FileTemplates {
    pub events: Option<String>,
    pub modestats: Option<String>,
    pub trip_stats: Option<String>,
    pub traffic_stats: Option<String>,
    pub emissions: Option<String>,
}

impl FileTemplates {
    pub fn get(&self, file: InputFile) -> Option<&str> {
        let template = match file {
            InputFile::Events => &self.events,
            InputFile::ModeStats => &self.modestats,
            InputFile::TripStats => &self.trip_stats,
            InputFile::TrafficStats => &self.traffic_stats,
            InputFile::Emissions => &self.emissions,
        };
        template.as_deref()
    }
}
