use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use rust_decimal::Decimal;

/// Cell value as delivered by the host data layer, before decoding.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    Decimal(Decimal),
    Text(String),
    DateTime(DateTime<Utc>),
    /// Whole column snapshot, one cell per row.
    Column(Vec<RawCell>),
}

impl RawCell {
    pub fn column<I, C>(cells: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<RawCell>,
    {
        Self::Column(cells.into_iter().map(Into::into).collect())
    }

    #[must_use]
    pub fn variant_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Double(_) => "double",
            Self::Decimal(_) => "decimal",
            Self::Text(_) => "text",
            Self::DateTime(_) => "datetime",
            Self::Column(_) => "column",
        }
    }
}

impl From<bool> for RawCell {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for RawCell {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for RawCell {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<Decimal> for RawCell {
    fn from(value: Decimal) -> Self {
        Self::Decimal(value)
    }
}

impl From<&str> for RawCell {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for RawCell {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<DateTime<Utc>> for RawCell {
    fn from(value: DateTime<Utc>) -> Self {
        Self::DateTime(value)
    }
}

/// Row-level edits against the rows accumulated so far for one column.
///
/// Applied in order: truncate, modify, append. Modified row indices refer to
/// the column after truncation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowPatch {
    pub truncate: Option<usize>,
    pub modified: Vec<(usize, RawCell)>,
    pub appended: Vec<RawCell>,
}

impl RowPatch {
    #[must_use]
    pub fn with_truncate(mut self, len: usize) -> Self {
        self.truncate = Some(len);
        self
    }

    #[must_use]
    pub fn with_modified(mut self, row: usize, cell: impl Into<RawCell>) -> Self {
        self.modified.push((row, cell.into()));
        self
    }

    #[must_use]
    pub fn with_appended(mut self, cell: impl Into<RawCell>) -> Self {
        self.appended.push(cell.into());
        self
    }
}

/// Change to a single column carried by an update event.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnDelta {
    /// Replaces the accumulated value (scalar or full column snapshot).
    Set(RawCell),
    /// Edits individual rows of the accumulated column.
    Rows(RowPatch),
}

/// Incremental update for one table. Only changed columns are present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableDelta {
    columns: IndexMap<String, ColumnDelta>,
}

impl TableDelta {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn set(mut self, column: impl Into<String>, cell: impl Into<RawCell>) -> Self {
        self.columns
            .insert(column.into(), ColumnDelta::Set(cell.into()));
        self
    }

    #[must_use]
    pub fn rows(mut self, column: impl Into<String>, patch: RowPatch) -> Self {
        self.columns.insert(column.into(), ColumnDelta::Rows(patch));
        self
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &ColumnDelta)> {
        self.columns
            .iter()
            .map(|(name, delta)| (name.as_str(), delta))
    }

    #[must_use]
    pub fn get(&self, column: &str) -> Option<&ColumnDelta> {
        self.columns.get(column)
    }

    /// Keeps only the columns accepted by `keep`.
    #[must_use]
    pub fn filtered(&self, mut keep: impl FnMut(&str) -> bool) -> Self {
        Self {
            columns: self
                .columns
                .iter()
                .filter(|(name, _)| keep(name.as_str()))
                .map(|(name, delta)| (name.clone(), delta.clone()))
                .collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Event delivered by a table subscription.
#[derive(Debug, Clone, PartialEq)]
pub enum TableEvent {
    Updated(TableDelta),
    Disconnected { reason: String },
    Reconnected,
}
