use std::rc::Rc;

use tracing::{debug, warn};

use crate::error::ChartResult;
use crate::source::TableEvent;

use super::model_shared::ModelShared;
use super::{ChartDataEvent, ChartDataListener, ChartDataModel};

impl ChartDataModel {
    /// Registers `listener`; the first listener opens every backing table.
    ///
    /// Returns `Ok(false)` when a listener with the same id is already
    /// registered. Tables that fail to open are reported to the listeners as
    /// [`ChartDataEvent::SourceFailed`] instead of failing this call.
    pub fn subscribe(&self, listener: Box<dyn ChartDataListener>) -> ChartResult<bool> {
        let _entered = self.shared.span.enter();
        let listener_id = listener.id().to_owned();
        let is_first = {
            let mut listeners = self.shared.listeners.borrow_mut();
            if !listeners.register(listener)? {
                debug!(listener = %listener_id, "listener already subscribed");
                return Ok(false);
            }
            listeners.len() == 1
        };

        debug!(listener = %listener_id, "listener subscribed");
        if is_first {
            self.shared.open_tables();
        }
        Ok(true)
    }

    /// Removes a listener; removing the last one closes every backing table.
    pub fn unsubscribe(&self, listener_id: &str) -> bool {
        let _entered = self.shared.span.enter();
        let is_last = {
            let mut listeners = self.shared.listeners.borrow_mut();
            if !listeners.unregister(listener_id) {
                return false;
            }
            listeners.is_empty()
        };

        debug!(listener = listener_id, "listener unsubscribed");
        if is_last {
            self.shared.close_tables();
        }
        true
    }
}

impl ModelShared {
    /// Opens every table session. Events a table delivers while its
    /// listener is being attached are handled after all tables are open.
    pub(super) fn open_tables(self: &Rc<Self>) {
        self.deferring_table_events(|| {
            let mut failures = Vec::new();
            {
                let Ok(mut sessions) = self.sessions.try_borrow_mut() else {
                    warn!("table sessions are busy; subscriptions were not opened");
                    return;
                };
                for (&key, session) in sessions.iter_mut() {
                    let columns = self
                        .replacements
                        .get_by_key(key)
                        .into_iter()
                        .flat_map(|replacements| replacements.columns());
                    let model = Rc::downgrade(self);
                    let opened = session.open(columns, move |generation, event: &TableEvent| {
                        if let Some(model) = model.upgrade() {
                            model.handle_table_event(key, generation, event);
                        }
                    });
                    if let Err(error) = opened {
                        warn!(
                            table = session.table().name(),
                            error = %error,
                            "failed to open table subscription"
                        );
                        failures.push(ChartDataEvent::SourceFailed {
                            table: session.table().name().to_owned(),
                            error,
                        });
                    }
                }
            }

            for event in &failures {
                self.broadcast(event);
            }
        });
    }

    pub(super) fn close_tables(&self) {
        let Ok(mut sessions) = self.sessions.try_borrow_mut() else {
            warn!("table sessions are busy; subscriptions were not closed");
            return;
        };
        let closed = sessions
            .values_mut()
            .map(|session| session.close())
            .filter(|&closed| closed)
            .count();
        debug!(closed, "closed table subscriptions");
    }
}
