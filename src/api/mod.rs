//! Public model facade: configuration, listeners and the live chart model.

mod config;
mod json_contract;
mod listener;
mod listener_registry;
mod model;
mod model_shared;
mod subscription_lifecycle;
mod update_dispatch;

pub use config::{ChartSyncConfig, ChartTheme};
pub use json_contract::{FIGURE_SNAPSHOT_JSON_SCHEMA_V1, FigureSnapshotJsonContractV1};
pub use listener::{ChartDataEvent, ChartDataListener, FnListener};
pub use model::{ChartDataModel, WeakChartDataModel};
