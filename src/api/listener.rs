use crate::core::Figure;
use crate::error::ChartError;

/// Notification broadcast by a model to its listeners.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartDataEvent {
    /// One table event was applied. Fired once per event, after every
    /// column of that event has been routed.
    Updated {
        table: String,
        columns: Vec<String>,
        errors: Vec<ChartError>,
    },
    /// Opening the subscription of a table failed.
    SourceFailed { table: String, error: ChartError },
    Disconnected { table: String, reason: String },
    Reconnected { table: String },
}

impl ChartDataEvent {
    #[must_use]
    pub fn table(&self) -> &str {
        match self {
            Self::Updated { table, .. }
            | Self::SourceFailed { table, .. }
            | Self::Disconnected { table, .. }
            | Self::Reconnected { table } => table,
        }
    }

    /// Errors carried by the event.
    #[must_use]
    pub fn errors(&self) -> &[ChartError] {
        match self {
            Self::Updated { errors, .. } => errors,
            Self::SourceFailed { error, .. } => std::slice::from_ref(error),
            Self::Disconnected { .. } | Self::Reconnected { .. } => &[],
        }
    }

    /// Whether the listener should surface a degraded state.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        !self.errors().is_empty() || matches!(self, Self::Disconnected { .. })
    }
}

/// Receiver of model broadcasts, typically the renderer.
///
/// Listeners observe the figure read-only; they must not deliver table
/// events synchronously from `on_event`.
pub trait ChartDataListener {
    fn id(&self) -> &str;
    fn on_event(&mut self, event: &ChartDataEvent, figure: &Figure);
}

/// Listener backed by a closure.
pub struct FnListener<F> {
    id: String,
    callback: F,
}

impl<F> FnListener<F>
where
    F: FnMut(&ChartDataEvent, &Figure),
{
    #[must_use]
    pub fn new(id: impl Into<String>, callback: F) -> Self {
        Self {
            id: id.into(),
            callback,
        }
    }
}

impl<F> ChartDataListener for FnListener<F>
where
    F: FnMut(&ChartDataEvent, &Figure),
{
    fn id(&self) -> &str {
        &self.id
    }

    fn on_event(&mut self, event: &ChartDataEvent, figure: &Figure) {
        (self.callback)(event, figure);
    }
}
