pub mod telemetry;
pub mod time_series_service;

pub use time_series_service::{BulkCreateError, TimeSeriesError, TimeSeriesService};
