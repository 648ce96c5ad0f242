use tracing::{debug, trace, warn};

use crate::source::{TableDelta, TableEvent, TableKey};

use super::ChartDataEvent;
use super::model_shared::{ModelShared, PendingTableEvent};

impl ModelShared {
    /// Entry point of every table callback.
    ///
    /// Events delivered while the model is already opening tables or handling
    /// another event are queued and handled, in arrival order, once that
    /// outer work has released its borrows.
    pub(super) fn handle_table_event(&self, key: TableKey, generation: u64, event: &TableEvent) {
        self.deferring_table_events(|| {
            self.pending.borrow_mut().push_back(PendingTableEvent {
                key,
                generation,
                event: event.clone(),
            });
        });
    }

    /// Runs `section` with table event handling deferred until it returns.
    ///
    /// Only the outermost section drains the queue.
    pub(super) fn deferring_table_events<R>(&self, section: impl FnOnce() -> R) -> R {
        if self.dispatching.replace(true) {
            trace!(
                queued = self.pending.borrow().len(),
                "nested dispatch; events wait for the outer one"
            );
            return section();
        }
        let result = section();
        loop {
            let next = self.pending.borrow_mut().pop_front();
            let Some(pending) = next else {
                break;
            };
            self.dispatch_table_event(pending.key, pending.generation, &pending.event);
        }
        self.dispatching.set(false);
        result
    }

    fn dispatch_table_event(&self, key: TableKey, generation: u64, event: &TableEvent) {
        let _entered = self.span.enter();
        if self.listeners.borrow().is_empty() {
            trace!("no listeners; dropping table event");
            return;
        }

        match event {
            TableEvent::Updated(delta) => self.apply_update(key, generation, delta),
            TableEvent::Disconnected { reason } => {
                if let Some(table) = self.current_table_name(key, generation) {
                    warn!(table = %table, reason = %reason, "table disconnected");
                    self.broadcast(&ChartDataEvent::Disconnected {
                        table,
                        reason: reason.clone(),
                    });
                }
            }
            TableEvent::Reconnected => {
                if let Some(table) = self.current_table_name(key, generation) {
                    debug!(table = %table, "table reconnected");
                    self.broadcast(&ChartDataEvent::Reconnected { table });
                }
            }
        }
    }

    fn current_table_name(&self, key: TableKey, generation: u64) -> Option<String> {
        let sessions = self.sessions.try_borrow().ok()?;
        let session = sessions.get(&key)?;
        session
            .is_current(generation)
            .then(|| session.table().name().to_owned())
    }

    fn apply_update(&self, key: TableKey, generation: u64, delta: &TableDelta) {
        let Ok(mut figure) = self.figure.try_borrow_mut() else {
            warn!("figure is borrowed by the host during a table event; update skipped");
            return;
        };
        let (table, update) = {
            let Ok(mut sessions) = self.sessions.try_borrow_mut() else {
                warn!("table sessions are busy; update skipped");
                return;
            };
            let Some(session) = sessions.get_mut(&key) else {
                trace!("update for an unknown table");
                return;
            };
            let Some(update) = session.on_update(generation, delta) else {
                return;
            };
            (session.table().name().to_owned(), update)
        };

        let mut errors = update.errors;
        let mut columns = Vec::with_capacity(update.values.len());
        let replacements = self.replacements.get_by_key(key);
        for (column, value) in update.values {
            if let Some(destinations) =
                replacements.and_then(|replacements| replacements.destinations(&column))
            {
                errors.extend(self.router.route_all(destinations, value, &mut figure));
            }
            columns.push(column);
        }
        drop(figure);

        for error in &errors {
            warn!(table = %table, error = %error, "table update applied with errors");
        }
        trace!(table = %table, columns = columns.len(), "applied table update");
        self.broadcast(&ChartDataEvent::Updated {
            table,
            columns,
            errors,
        });
    }

    /// Notifies every listener registered when the broadcast starts, in
    /// registration order. Listeners removed by an earlier listener of the
    /// same broadcast are skipped.
    pub(super) fn broadcast(&self, event: &ChartDataEvent) {
        let listeners = self.listeners.borrow().snapshot();
        let Ok(figure) = self.figure.try_borrow() else {
            warn!("figure is mutably borrowed; broadcast skipped");
            return;
        };

        for (listener_id, listener) in listeners {
            if !self.listeners.borrow().contains(&listener_id) {
                continue;
            }
            let Ok(mut listener) = listener.try_borrow_mut() else {
                warn!(listener = %listener_id, "listener is already handling an event; skipped");
                continue;
            };
            listener.on_event(event, &figure);
        }
    }
}
