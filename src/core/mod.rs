pub mod colorway;
pub mod destination;
pub mod figure;
pub mod primitives;
pub mod replacement;
pub mod routing;
pub mod types;

pub use colorway::{assign_colorway, subplot_color_slots};
pub use destination::{DEFAULT_PATH_MARKER, DestinationPath};
pub use figure::{
    ColorField, DEFAULT_TRACE_TYPE, Domain, Figure, LayoutDescription, MarginSide,
    TraceDescription, TraceKind,
};
pub use replacement::ColumnReplacements;
pub use routing::{ColumnRouter, route_path};
pub use types::Viewport;
