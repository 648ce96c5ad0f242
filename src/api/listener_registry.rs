use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::error::{ChartError, ChartResult};

use super::ChartDataListener;

pub(super) type SharedListener = Rc<RefCell<Box<dyn ChartDataListener>>>;

/// Registered listeners in registration order, unique by id.
#[derive(Default)]
pub(super) struct ListenerRegistry {
    entries: IndexMap<String, SharedListener>,
}

impl ListenerRegistry {
    /// Returns `Ok(false)` when a listener with the same id is already registered.
    pub(super) fn register(&mut self, listener: Box<dyn ChartDataListener>) -> ChartResult<bool> {
        let listener_id = listener.id().to_owned();
        if listener_id.is_empty() {
            return Err(ChartError::InvalidData(
                "listener id must not be empty".to_owned(),
            ));
        }
        if self.entries.contains_key(&listener_id) {
            return Ok(false);
        }
        self.entries
            .insert(listener_id, Rc::new(RefCell::new(listener)));
        Ok(true)
    }

    pub(super) fn unregister(&mut self, listener_id: &str) -> bool {
        self.entries.shift_remove(listener_id).is_some()
    }

    #[must_use]
    pub(super) fn contains(&self, listener_id: &str) -> bool {
        self.entries.contains_key(listener_id)
    }

    #[must_use]
    pub(super) fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub(super) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copies the current entries so a broadcast can run without holding the
    /// registry borrowed.
    #[must_use]
    pub(super) fn snapshot(&self) -> Vec<(String, SharedListener)> {
        self.entries
            .iter()
            .map(|(id, listener)| (id.clone(), Rc::clone(listener)))
            .collect()
    }
}
