//! In-process backing table.
//!
//! Stands in for the host data layer in tests, benches and hosts that push
//! data from their own code. Events are delivered synchronously from
//! [`MemoryTable::emit`].

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use tracing::{trace, warn};

use crate::error::{ChartError, ChartResult};
use crate::source::{
    BackingTable, ColumnDescriptor, ListenerId, TableEvent, TableEventCallback, TableSubscription,
};

type SharedCallback = Rc<RefCell<TableEventCallback>>;

#[derive(Default)]
struct MemoryTableState {
    subscriptions: BTreeMap<u64, SubscriptionSlot>,
    next_subscription_id: u64,
    next_listener_id: ListenerId,
    failure: Option<String>,
    subscribe_calls: usize,
}

struct SubscriptionSlot {
    columns: Vec<String>,
    listeners: BTreeMap<ListenerId, SharedCallback>,
}

pub struct MemoryTable {
    name: String,
    columns: Vec<ColumnDescriptor>,
    state: Rc<RefCell<MemoryTableState>>,
}

impl MemoryTable {
    #[must_use]
    pub fn new(name: impl Into<String>, columns: Vec<ColumnDescriptor>) -> Self {
        Self {
            name: name.into(),
            columns,
            state: Rc::new(RefCell::new(MemoryTableState::default())),
        }
    }

    /// Makes subsequent `subscribe` calls fail with `reason`; `None` heals.
    pub fn set_subscribe_failure(&self, reason: Option<&str>) {
        self.state.borrow_mut().failure = reason.map(str::to_owned);
    }

    /// Delivers `event` to every listener of every open subscription.
    ///
    /// Update deltas are narrowed to each subscription's columns. Returns the
    /// number of listeners invoked.
    pub fn emit(&self, event: &TableEvent) -> usize {
        let deliveries = {
            let state = self.state.borrow();
            state
                .subscriptions
                .values()
                .flat_map(|slot| {
                    let event = match event {
                        TableEvent::Updated(delta) => TableEvent::Updated(
                            delta.filtered(|column| slot.columns.iter().any(|name| name == column)),
                        ),
                        other => other.clone(),
                    };
                    slot.listeners
                        .values()
                        .map(move |listener| (Rc::clone(listener), event.clone()))
                })
                .collect::<Vec<_>>()
        };

        trace!(table = %self.name, listeners = deliveries.len(), "emit table event");
        let mut delivered = 0;
        for (listener, event) in deliveries {
            let Ok(mut callback) = listener.try_borrow_mut() else {
                warn!(table = %self.name, "listener re-entered from its own callback; skipped");
                continue;
            };
            (&mut *callback)(&event);
            delivered += 1;
        }
        delivered
    }

    #[must_use]
    pub fn open_subscription_count(&self) -> usize {
        self.state.borrow().subscriptions.len()
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.state
            .borrow()
            .subscriptions
            .values()
            .map(|slot| slot.listeners.len())
            .sum()
    }

    #[must_use]
    pub fn subscribe_calls(&self) -> usize {
        self.state.borrow().subscribe_calls
    }
}

impl BackingTable for MemoryTable {
    fn name(&self) -> &str {
        &self.name
    }

    fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    fn subscribe(&self, columns: &[ColumnDescriptor]) -> ChartResult<Box<dyn TableSubscription>> {
        let mut state = self.state.borrow_mut();
        state.subscribe_calls += 1;
        if let Some(reason) = &state.failure {
            return Err(ChartError::source(&self.name, reason.clone()));
        }

        let id = state.next_subscription_id;
        state.next_subscription_id += 1;
        state.subscriptions.insert(
            id,
            SubscriptionSlot {
                columns: columns.iter().map(|column| column.name.clone()).collect(),
                listeners: BTreeMap::new(),
            },
        );
        Ok(Box::new(MemorySubscription {
            id,
            state: Rc::downgrade(&self.state),
        }))
    }
}

struct MemorySubscription {
    id: u64,
    state: Weak<RefCell<MemoryTableState>>,
}

impl TableSubscription for MemorySubscription {
    fn add_listener(&mut self, listener: TableEventCallback) -> ListenerId {
        let Some(state) = self.state.upgrade() else {
            return 0;
        };
        let mut state = state.borrow_mut();
        let id = state.next_listener_id;
        state.next_listener_id += 1;
        if let Some(slot) = state.subscriptions.get_mut(&self.id) {
            slot.listeners.insert(id, Rc::new(RefCell::new(listener)));
        }
        id
    }

    fn remove_listener(&mut self, listener: ListenerId) -> bool {
        let Some(state) = self.state.upgrade() else {
            return false;
        };
        let mut state = state.borrow_mut();
        state
            .subscriptions
            .get_mut(&self.id)
            .is_some_and(|slot| slot.listeners.remove(&listener).is_some())
    }

    fn close(&mut self) {
        if let Some(state) = self.state.upgrade() {
            state.borrow_mut().subscriptions.remove(&self.id);
        }
    }
}
