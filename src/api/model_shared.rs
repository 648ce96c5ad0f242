use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use indexmap::IndexMap;
use tracing::{Span, debug};

use crate::core::{ColumnRouter, Figure, Viewport, assign_colorway};
use crate::error::{ChartError, ChartResult};
use crate::source::{
    ColumnReplacementMap, SubscriptionManager, TableEvent, TableHandle, TableKey,
};

use super::ChartSyncConfig;
use super::listener_registry::ListenerRegistry;

/// State shared between the public facade and the table callbacks.
///
/// Callbacks only hold a `Weak` to this value, so dropping the last
/// [`super::ChartDataModel`] drops every [`SubscriptionManager`], which
/// closes the table subscriptions.
pub(super) struct ModelShared {
    pub(super) span: Span,
    pub(super) replacements: ColumnReplacementMap,
    pub(super) router: ColumnRouter,
    pub(super) figure: RefCell<Figure>,
    pub(super) sessions: RefCell<IndexMap<TableKey, SubscriptionManager>>,
    pub(super) listeners: RefCell<ListenerRegistry>,
    pub(super) dimensions: Cell<Option<Viewport>>,
    /// Table events waiting for the outermost dispatch to finish.
    pub(super) pending: RefCell<VecDeque<PendingTableEvent>>,
    pub(super) dispatching: Cell<bool>,
}

pub(super) struct PendingTableEvent {
    pub(super) key: TableKey,
    pub(super) generation: u64,
    pub(super) event: TableEvent,
}

impl ModelShared {
    pub(super) fn build(
        tables: &[TableHandle],
        replacements: ColumnReplacementMap,
        mut figure: Figure,
        config: &ChartSyncConfig,
        span: Span,
    ) -> ChartResult<Self> {
        config.validate()?;

        let sessions = span.in_scope(|| -> ChartResult<_> {
            let mut sessions = IndexMap::with_capacity(replacements.len());
            for (table, _) in replacements.iter() {
                if !tables.contains(table) {
                    return Err(ChartError::UnknownTable {
                        table: table.name().to_owned(),
                    });
                }
                sessions.insert(table.key(), SubscriptionManager::new(table.clone()));
            }

            let original_colorway = figure.layout().template_colorway().unwrap_or_default();
            let template_colorway = if config.is_default_template {
                config.theme.colorway.clone()
            } else {
                figure
                    .layout()
                    .template_colorway()
                    .unwrap_or_else(|| config.theme.colorway.clone())
            };
            figure.layout_mut().set_template_colorway(&template_colorway);
            let recolored =
                assign_colorway(figure.data_mut(), &template_colorway, &original_colorway);

            debug!(
                traces = figure.data().len(),
                tables = sessions.len(),
                recolored,
                "chart data model created"
            );
            Ok(sessions)
        })?;

        Ok(Self {
            span,
            router: ColumnRouter::new(config.path_marker.clone()),
            replacements,
            figure: RefCell::new(figure),
            sessions: RefCell::new(sessions),
            listeners: RefCell::new(ListenerRegistry::default()),
            dimensions: Cell::new(None),
            pending: RefCell::new(VecDeque::new()),
            dispatching: Cell::new(false),
        })
    }
}
