use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::rc::Rc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::ColumnReplacements;
use crate::error::ChartResult;
use crate::source::TableEvent;

/// Identifier of one listener registration on a subscription.
pub type ListenerId = u64;

/// Callback receiving the events of one subscription.
pub type TableEventCallback = Box<dyn FnMut(&TableEvent)>;

/// Declared type of a table column, used to decode raw cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    Bool,
    Int,
    Double,
    Decimal,
    Text,
    DateTime,
    /// Accepts any cell variant.
    Any,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub column_type: ColumnType,
}

impl ColumnDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

/// Live subscription returned by [`BackingTable::subscribe`].
pub trait TableSubscription {
    fn add_listener(&mut self, listener: TableEventCallback) -> ListenerId;
    fn remove_listener(&mut self, listener: ListenerId) -> bool;
    /// Stops delivery. Must tolerate repeated calls.
    fn close(&mut self);
}

/// Streaming table provided by the host data layer.
pub trait BackingTable {
    fn name(&self) -> &str;
    fn columns(&self) -> &[ColumnDescriptor];

    fn find_column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns().iter().find(|column| column.name == name)
    }

    /// Starts delivery of change events restricted to `columns`.
    fn subscribe(&self, columns: &[ColumnDescriptor]) -> ChartResult<Box<dyn TableSubscription>>;
}

/// Identity of a table reference, stable for the table's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableKey(usize);

/// Shared reference to a backing table, compared by reference identity.
#[derive(Clone)]
pub struct TableHandle(Rc<dyn BackingTable>);

impl TableHandle {
    #[must_use]
    pub fn new(table: Rc<dyn BackingTable>) -> Self {
        Self(table)
    }

    #[must_use]
    pub fn key(&self) -> TableKey {
        TableKey(Rc::as_ptr(&self.0).cast::<()>() as usize)
    }
}

impl Deref for TableHandle {
    type Target = dyn BackingTable;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

impl PartialEq for TableHandle {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for TableHandle {}

impl Hash for TableHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Debug for TableHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableHandle")
            .field("name", &self.name())
            .field("key", &self.key())
            .finish()
    }
}

/// Which columns of which tables feed which figure locations.
#[derive(Debug, Clone, Default)]
pub struct ColumnReplacementMap {
    tables: IndexMap<TableKey, (TableHandle, ColumnReplacements)>,
}

impl ColumnReplacementMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_table(mut self, table: TableHandle, replacements: ColumnReplacements) -> Self {
        self.insert(table, replacements);
        self
    }

    /// Sets the replacements of `table`, returning the previous ones.
    pub fn insert(
        &mut self,
        table: TableHandle,
        replacements: ColumnReplacements,
    ) -> Option<ColumnReplacements> {
        self.tables
            .insert(table.key(), (table, replacements))
            .map(|(_, previous)| previous)
    }

    #[must_use]
    pub fn get(&self, table: &TableHandle) -> Option<&ColumnReplacements> {
        self.get_by_key(table.key())
    }

    #[must_use]
    pub fn get_by_key(&self, key: TableKey) -> Option<&ColumnReplacements> {
        self.tables.get(&key).map(|(_, replacements)| replacements)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TableHandle, &ColumnReplacements)> {
        self.tables
            .values()
            .map(|(table, replacements)| (table, replacements))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
