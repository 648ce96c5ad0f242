//! Backing tables and the per-table subscription state kept by a model.

pub mod accumulator;
pub mod decode;
pub mod event;
pub mod memory;
pub mod subscription;
pub mod table;

pub use accumulator::{ChangeAccumulator, DecodedUpdate};
pub use event::{ColumnDelta, RawCell, RowPatch, TableDelta, TableEvent};
pub use memory::MemoryTable;
pub use subscription::SubscriptionManager;
pub use table::{
    BackingTable, ColumnDescriptor, ColumnReplacementMap, ColumnType, ListenerId,
    TableEventCallback, TableHandle, TableKey, TableSubscription,
};
