mod aggregator;
mod snapshot;
mod time_bin;
mod time_bin_config;

pub use aggregator::TimeBinAggregator;
pub use snapshot::{TimeBinSnapshot, TimeBinValue};
pub use time_bin::TimeBin;
pub use time_bin_config::{OutOfDomainPolicy, TimeBinConfig};
