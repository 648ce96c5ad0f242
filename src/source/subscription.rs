use tracing::{debug, trace, warn};

use crate::error::{ChartError, ChartResult, ErrorKind};
use crate::source::{
    ChangeAccumulator, DecodedUpdate, ListenerId, TableDelta, TableEvent, TableHandle,
    TableSubscription,
};

/// Subscription state of one backing table.
///
/// `Unsubscribed -> Subscribed -> Unsubscribed`, with a fresh accumulator on
/// every entry into `Subscribed`.
enum SubscriptionState {
    Unsubscribed,
    Subscribed(ActiveSubscription),
}

struct ActiveSubscription {
    subscription: Box<dyn TableSubscription>,
    listener: ListenerId,
    accumulator: ChangeAccumulator,
}

/// Owns the subscription and change accumulator of one backing table.
pub struct SubscriptionManager {
    table: TableHandle,
    state: SubscriptionState,
    generation: u64,
}

impl SubscriptionManager {
    #[must_use]
    pub fn new(table: TableHandle) -> Self {
        Self {
            table,
            state: SubscriptionState::Unsubscribed,
            generation: 0,
        }
    }

    #[must_use]
    pub fn table(&self) -> &TableHandle {
        &self.table
    }

    #[must_use]
    pub fn is_subscribed(&self) -> bool {
        matches!(self.state, SubscriptionState::Subscribed(_))
    }

    /// Generation of the current (or last) subscription. Bumped on every open.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Starts delivery restricted to `columns_of_interest`.
    ///
    /// Columns missing from the table schema are skipped with a warning.
    /// `on_event` receives the generation of this subscription with every
    /// event so late events from a closed subscription can be told apart.
    /// Returns `Ok(false)` when already subscribed.
    pub fn open<'a, F>(
        &mut self,
        columns_of_interest: impl IntoIterator<Item = &'a str>,
        mut on_event: F,
    ) -> ChartResult<bool>
    where
        F: FnMut(u64, &TableEvent) + 'static,
    {
        if self.is_subscribed() {
            trace!(table = self.table.name(), "table already subscribed");
            return Ok(false);
        }

        let mut columns = Vec::new();
        for name in columns_of_interest {
            match self.table.find_column(name) {
                Some(column) => columns.push(column.clone()),
                None => warn!(
                    table = self.table.name(),
                    column = name,
                    "column is not in the table schema; its destinations will not update"
                ),
            }
        }

        let mut subscription = self.table.subscribe(&columns).map_err(|err| {
            if err.kind() == ErrorKind::Source {
                err
            } else {
                ChartError::source(self.table.name(), err.to_string())
            }
        })?;

        self.generation += 1;
        let generation = self.generation;
        let listener = subscription
            .add_listener(Box::new(move |event: &TableEvent| on_event(generation, event)));
        debug!(
            table = self.table.name(),
            columns = columns.len(),
            generation,
            "opened table subscription"
        );
        self.state = SubscriptionState::Subscribed(ActiveSubscription {
            subscription,
            listener,
            accumulator: ChangeAccumulator::new(columns),
        });
        Ok(true)
    }

    /// Decodes `delta` for the subscription identified by `generation`.
    ///
    /// Returns `None` when the table is not subscribed or the event belongs
    /// to an earlier subscription.
    pub fn on_update(&mut self, generation: u64, delta: &TableDelta) -> Option<DecodedUpdate> {
        let SubscriptionState::Subscribed(active) = &mut self.state else {
            trace!(table = self.table.name(), "dropping update for closed table");
            return None;
        };
        if generation != self.generation {
            trace!(
                table = self.table.name(),
                generation,
                current = self.generation,
                "dropping update from a stale subscription"
            );
            return None;
        }
        Some(active.accumulator.apply(delta))
    }

    /// Whether `generation` is the live subscription.
    #[must_use]
    pub fn is_current(&self, generation: u64) -> bool {
        self.is_subscribed() && generation == self.generation
    }

    /// Removes the listener, closes the subscription and drops the accumulator.
    ///
    /// No-op when not subscribed. Returns whether anything was closed.
    pub fn close(&mut self) -> bool {
        match std::mem::replace(&mut self.state, SubscriptionState::Unsubscribed) {
            SubscriptionState::Subscribed(mut active) => {
                active.subscription.remove_listener(active.listener);
                active.subscription.close();
                debug!(
                    table = self.table.name(),
                    generation = self.generation,
                    "closed table subscription"
                );
                true
            }
            SubscriptionState::Unsubscribed => false,
        }
    }
}

impl Drop for SubscriptionManager {
    fn drop(&mut self) {
        self.close();
    }
}
