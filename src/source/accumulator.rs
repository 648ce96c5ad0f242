use indexmap::IndexMap;
use serde_json::Value;
use tracing::{trace, warn};

use crate::error::{ChartError, ChartResult};
use crate::source::decode::{decode_cell, decode_cells, decode_scalar};
use crate::source::{ColumnDelta, ColumnDescriptor, RowPatch, TableDelta};

/// Decoded result of one update event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedUpdate {
    /// Current value of every tracked column the event touched.
    pub values: Vec<(String, Value)>,
    /// One entry per column that failed to decode and was skipped.
    pub errors: Vec<ChartError>,
}

/// Per-table incremental state built from update events.
///
/// Only the columns of interest are tracked. Each column keeps its latest
/// decoded value so events carrying only the changed cells can be merged.
#[derive(Debug, Clone, Default)]
pub struct ChangeAccumulator {
    columns: IndexMap<String, TrackedColumn>,
}

#[derive(Debug, Clone)]
struct TrackedColumn {
    descriptor: ColumnDescriptor,
    value: Option<Value>,
}

impl ChangeAccumulator {
    #[must_use]
    pub fn new(columns: impl IntoIterator<Item = ColumnDescriptor>) -> Self {
        Self {
            columns: columns
                .into_iter()
                .map(|descriptor| {
                    (
                        descriptor.name.clone(),
                        TrackedColumn {
                            descriptor,
                            value: None,
                        },
                    )
                })
                .collect(),
        }
    }

    pub fn tracked_columns(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    #[must_use]
    pub fn is_tracking(&self, column: &str) -> bool {
        self.columns.contains_key(column)
    }

    /// Latest decoded value of `column`, if any event has set it.
    #[must_use]
    pub fn value(&self, column: &str) -> Option<&Value> {
        self.columns.get(column)?.value.as_ref()
    }

    /// Merges `delta` and returns the values of the columns it changed.
    ///
    /// A column that fails to decode keeps its previous value and is reported
    /// in [`DecodedUpdate::errors`]; the other columns are still applied.
    pub fn apply(&mut self, delta: &TableDelta) -> DecodedUpdate {
        let mut update = DecodedUpdate::default();
        for (name, change) in delta.columns() {
            let Some(column) = self.columns.get_mut(name) else {
                trace!(column = name, "ignoring untracked column");
                continue;
            };
            match column.apply(change) {
                Ok(value) => update.values.push((name.to_owned(), value.clone())),
                Err(err) => {
                    warn!(column = name, error = %err, "skipping column that failed to decode");
                    update.errors.push(err);
                }
            }
        }
        update
    }
}

impl TrackedColumn {
    fn apply(&mut self, change: &ColumnDelta) -> ChartResult<&Value> {
        match change {
            ColumnDelta::Set(cell) => {
                let value = decode_cell(&self.descriptor, cell)?;
                Ok(&*self.value.insert(value))
            }
            ColumnDelta::Rows(patch) => self.apply_rows(patch),
        }
    }

    fn apply_rows(&mut self, patch: &RowPatch) -> ChartResult<&Value> {
        let name = self.descriptor.name.as_str();
        let current_len = match &self.value {
            None | Some(Value::Null) => 0,
            Some(Value::Array(rows)) => rows.len(),
            Some(_) => {
                return Err(ChartError::decode(
                    name,
                    "row patch received for a scalar column value",
                ));
            }
        };
        let len = patch.truncate.map_or(current_len, |len| len.min(current_len));

        // Decode everything first so a bad cell leaves the column untouched.
        let modified = patch
            .modified
            .iter()
            .map(|(row, cell)| {
                if *row >= len {
                    return Err(ChartError::decode(
                        name,
                        format!("modified row {row} is out of range for {len} rows"),
                    ));
                }
                Ok((*row, decode_scalar(&self.descriptor, cell)?))
            })
            .collect::<ChartResult<Vec<_>>>()?;
        let appended = decode_cells(&self.descriptor, &patch.appended)?;

        let value = self.value.get_or_insert(Value::Array(Vec::new()));
        if !value.is_array() {
            *value = Value::Array(Vec::new());
        }
        if let Value::Array(rows) = value {
            rows.truncate(len);
            for (row, cell) in modified {
                rows[row] = cell;
            }
            rows.extend(appended);
        }
        Ok(&*value)
    }
}
