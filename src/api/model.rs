use std::cell::Ref;
use std::rc::{Rc, Weak};

use tracing::{Span, debug_span};

use crate::core::{Figure, LayoutDescription, MarginSide, TraceDescription, Viewport};
use crate::error::ChartResult;
use crate::source::{ColumnReplacementMap, TableHandle};

use super::ChartSyncConfig;
use super::model_shared::ModelShared;

/// Live chart model consumed by renderers.
///
/// Owns the figure, keeps one subscription per backing table while at least
/// one listener is registered, and broadcasts once per applied table event.
/// Cloning yields another handle to the same model.
#[derive(Clone)]
pub struct ChartDataModel {
    pub(super) shared: Rc<ModelShared>,
}

/// Non-owning handle, for listeners that need to reach back into the model.
#[derive(Clone)]
pub struct WeakChartDataModel {
    shared: Weak<ModelShared>,
}

impl WeakChartDataModel {
    #[must_use]
    pub fn upgrade(&self) -> Option<ChartDataModel> {
        self.shared
            .upgrade()
            .map(|shared| ChartDataModel { shared })
    }
}

impl ChartDataModel {
    /// Builds the model and applies the theme colorway to the figure.
    ///
    /// Fails when `replacements` references a table missing from `tables`.
    pub fn new(
        tables: Vec<TableHandle>,
        replacements: ColumnReplacementMap,
        figure: Figure,
        config: ChartSyncConfig,
    ) -> ChartResult<Self> {
        Self::with_span(tables, replacements, figure, config, debug_span!("chart_data_model"))
    }

    /// Same as [`Self::new`], logging inside `span` instead of a fresh one.
    pub fn with_span(
        tables: Vec<TableHandle>,
        replacements: ColumnReplacementMap,
        figure: Figure,
        config: ChartSyncConfig,
        span: Span,
    ) -> ChartResult<Self> {
        let shared = ModelShared::build(&tables, replacements, figure, &config, span)?;
        Ok(Self {
            shared: Rc::new(shared),
        })
    }

    #[must_use]
    pub fn downgrade(&self) -> WeakChartDataModel {
        WeakChartDataModel {
            shared: Rc::downgrade(&self.shared),
        }
    }

    #[must_use]
    pub fn span(&self) -> &Span {
        &self.shared.span
    }

    /// Current traces. Do not hold the borrow while table events are delivered.
    #[must_use]
    pub fn data(&self) -> Ref<'_, [TraceDescription]> {
        Ref::map(self.shared.figure.borrow(), Figure::data)
    }

    #[must_use]
    pub fn layout(&self) -> Ref<'_, LayoutDescription> {
        Ref::map(self.shared.figure.borrow(), Figure::layout)
    }

    #[must_use]
    pub fn figure(&self) -> Ref<'_, Figure> {
        self.shared.figure.borrow()
    }

    #[must_use]
    pub fn title(&self) -> Option<String> {
        self.layout().title().map(str::to_owned)
    }

    pub fn set_dimensions(&self, viewport: Viewport) {
        self.shared.dimensions.set(Some(viewport));
    }

    #[must_use]
    pub fn dimensions(&self) -> Option<Viewport> {
        self.shared.dimensions.get()
    }

    /// Width left for the plot area once horizontal margins are removed.
    #[must_use]
    pub fn plot_width(&self) -> f64 {
        self.plot_extent(|viewport| viewport.width, MarginSide::Left, MarginSide::Right)
    }

    /// Height left for the plot area once vertical margins are removed.
    #[must_use]
    pub fn plot_height(&self) -> f64 {
        self.plot_extent(|viewport| viewport.height, MarginSide::Top, MarginSide::Bottom)
    }

    fn plot_extent(
        &self,
        size: impl Fn(Viewport) -> u32,
        start: MarginSide,
        end: MarginSide,
    ) -> f64 {
        let Some(viewport) = self.shared.dimensions.get() else {
            return 0.0;
        };
        let size = size(viewport);
        if size == 0 {
            return 0.0;
        }
        let layout = self.layout();
        (f64::from(size) - layout.margin(start) - layout.margin(end)).max(0.0)
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.shared.listeners.borrow().len()
    }

    #[must_use]
    pub fn has_listener(&self, listener_id: &str) -> bool {
        self.shared.listeners.borrow().contains(listener_id)
    }

    /// Number of backing tables with an open subscription.
    #[must_use]
    pub fn open_subscription_count(&self) -> usize {
        self.shared
            .sessions
            .borrow()
            .values()
            .filter(|session| session.is_subscribed())
            .count()
    }

    #[must_use]
    pub fn is_subscribed(&self) -> bool {
        self.open_subscription_count() > 0
    }
}
