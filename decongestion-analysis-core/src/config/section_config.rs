use serde::{Deserialize, Serialize};

use crate::metric::TripStatistic;

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct EventSourceConfig {
    /// fail a scenario on the first malformed event instead of skipping it
    #[serde(default)]
    pub strict: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TripStatsConfig {
    /// mode columns melted into the comparison
    #[serde(default = "default_modes")]
    pub modes: Vec<String>,
    #[serde(default = "default_statistics")]
    pub statistics: Vec<TripStatistic>,
}

fn default_modes() -> Vec<String> {
    vec![String::from("car"), String::from("ride")]
}

fn default_statistics() -> Vec<TripStatistic> {
    TripStatistic::ALL.to_vec()
}

impl Default for TripStatsConfig {
    fn default() -> Self {
        TripStatsConfig {
            modes: default_modes(),
            statistics: default_statistics(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct EmissionsConfig {
    /// when set, scenario totals only sum the first `link_limit` links
    #[serde(default)]
    pub link_limit: Option<usize>,
    /// pollutants that also get a totals table of their own
    #[serde(default = "default_highlight")]
    pub highlight: Vec<String>,
}

fn default_highlight() -> Vec<String> {
    vec![String::from("NOx [g]")]
}

impl Default for EmissionsConfig {
    fn default() -> Self {
        EmissionsConfig {
            link_limit: None,
            highlight: default_highlight(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OutputConfig {
    /// replace existing result files
    #[serde(default = "default_overwrite")]
    pub overwrite: bool,
}

fn default_overwrite() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            overwrite: default_overwrite(),
        }
    }
}
