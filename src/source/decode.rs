use serde_json::{Number, Value};

use crate::core::primitives::{datetime_to_plotly_string, decimal_to_f64};
use crate::error::{ChartError, ChartResult};
use crate::source::{ColumnDescriptor, ColumnType, RawCell};

/// Decodes a cell (scalar or whole column) of `column` into a JSON value.
pub fn decode_cell(column: &ColumnDescriptor, cell: &RawCell) -> ChartResult<Value> {
    match cell {
        RawCell::Column(cells) => decode_cells(column, cells).map(Value::Array),
        scalar => decode_scalar(column, scalar),
    }
}

/// Decodes row cells of `column`. Nested columns are rejected.
pub fn decode_cells(column: &ColumnDescriptor, cells: &[RawCell]) -> ChartResult<Vec<Value>> {
    cells
        .iter()
        .map(|cell| decode_scalar(column, cell))
        .collect()
}

const NUMERIC_COLUMNS: &[ColumnType] = &[ColumnType::Int, ColumnType::Double, ColumnType::Decimal];

pub fn decode_scalar(column: &ColumnDescriptor, cell: &RawCell) -> ChartResult<Value> {
    let column_type = column.column_type;
    match cell {
        RawCell::Null => Ok(Value::Null),
        RawCell::Bool(value) if accepts(column_type, &[ColumnType::Bool]) => {
            Ok(Value::Bool(*value))
        }
        RawCell::Int(value) if accepts(column_type, NUMERIC_COLUMNS) => Ok(Value::from(*value)),
        RawCell::Double(value) if accepts(column_type, &[ColumnType::Double]) => {
            // plotly treats null as a gap, which is what NaN means in a column.
            Ok(Number::from_f64(*value).map_or(Value::Null, Value::Number))
        }
        RawCell::Decimal(value) if accepts(column_type, &[ColumnType::Decimal]) => {
            let value = decimal_to_f64(*value, &column.name).map_err(|_| {
                ChartError::decode(&column.name, "decimal cannot be represented as f64")
            })?;
            Ok(Number::from_f64(value).map_or(Value::Null, Value::Number))
        }
        RawCell::Text(value) if accepts(column_type, &[ColumnType::Text]) => {
            Ok(Value::String(value.clone()))
        }
        RawCell::DateTime(value) if accepts(column_type, &[ColumnType::DateTime]) => {
            Ok(Value::String(datetime_to_plotly_string(*value)))
        }
        RawCell::Column(_) => Err(ChartError::decode(
            &column.name,
            "nested column cells are not supported",
        )),
        other => Err(ChartError::decode(
            &column.name,
            format!(
                "expected a {column_type:?} cell, got {}",
                other.variant_name()
            ),
        )),
    }
}

fn accepts(column_type: ColumnType, expected: &[ColumnType]) -> bool {
    column_type == ColumnType::Any || expected.contains(&column_type)
}
