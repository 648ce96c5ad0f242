//! chart-data-sync: keeps a plotly figure in step with streaming tables.
//!
//! A [`ChartDataModel`] owns the figure, subscribes to its backing tables
//! while listeners are registered, writes decoded column values into the
//! figure at their destination paths and broadcasts once per applied event.

pub mod api;
pub mod core;
pub mod error;
pub mod source;
pub mod telemetry;

pub use api::{
    ChartDataEvent, ChartDataListener, ChartDataModel, ChartSyncConfig, ChartTheme, FnListener,
};
pub use error::{ChartError, ChartResult, ErrorKind};
