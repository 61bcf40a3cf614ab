//! builders that turn one scenario's raw simulation outputs into
//! [`crate::table::MetricTable`]s.
mod delay;
mod emissions;
mod modal_split;
mod tolls;
mod traffic;
mod trip_stats;

pub use delay::{delay_table, link_total_delay, DELAY_COLUMNS, TOTAL_DELAY_COLUMN};
pub use emissions::{
    load_link_emissions, read_link_emissions, total_emissions, EMISSIONS_KEY_COLUMN,
    POLLUTANT_KEY_COLUMN, TOTAL_EMISSIONS_COLUMN,
};
pub use modal_split::{load_modal_split, read_modal_split, ModalSplit, SHARE_COLUMN};
pub use tolls::{aggregate_events, tolls_table, TOLL_COLUMN};
pub use traffic::{
    load_link_traffic, read_link_traffic, volume_table, LinkTrafficRecord, LINK_KEY_COLUMN,
    VOLUME_COLUMN,
};
pub use trip_stats::{
    load_trip_stats, read_trip_stats, TripStatistic, MODE_KEY_COLUMN, TRIP_STAT_COLUMN,
};
