use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::error::{ChartError, ChartResult};

/// Date-time text layout plotly parses natively on date axes.
pub const PLOTLY_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

pub fn decimal_to_f64(value: Decimal, field_name: &str) -> ChartResult<f64> {
    value.to_f64().ok_or_else(|| {
        ChartError::InvalidData(format!("{field_name} cannot be represented as f64"))
    })
}

#[must_use]
pub fn datetime_to_plotly_string(time: DateTime<Utc>) -> String {
    time.format(PLOTLY_DATETIME_FORMAT).to_string()
}
