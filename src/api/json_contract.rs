use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::Figure;
use crate::error::{ChartError, ChartResult};

use super::ChartDataModel;

pub const FIGURE_SNAPSHOT_JSON_SCHEMA_V1: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigureSnapshotJsonContractV1 {
    pub schema_version: u32,
    pub figure: Figure,
}

impl Figure {
    pub fn to_json_contract_v1_pretty(&self) -> ChartResult<String> {
        let payload = FigureSnapshotJsonContractV1 {
            schema_version: FIGURE_SNAPSHOT_JSON_SCHEMA_V1,
            figure: self.clone(),
        };
        serde_json::to_string_pretty(&payload).map_err(|e| {
            ChartError::InvalidData(format!("failed to serialize figure contract v1: {e}"))
        })
    }

    /// Accepts either a bare figure or a versioned contract payload.
    pub fn from_json_compat_str(input: &str) -> ChartResult<Self> {
        let value: Value = serde_json::from_str(input)
            .map_err(|e| ChartError::InvalidData(format!("failed to parse figure json: {e}")))?;
        if value.get("schema_version").is_none() {
            return Self::from_value(value);
        }

        let payload: FigureSnapshotJsonContractV1 = serde_json::from_value(value).map_err(|e| {
            ChartError::InvalidData(format!("failed to parse figure json payload: {e}"))
        })?;
        if payload.schema_version != FIGURE_SNAPSHOT_JSON_SCHEMA_V1 {
            return Err(ChartError::InvalidData(format!(
                "unsupported figure schema version: {}",
                payload.schema_version
            )));
        }
        Ok(payload.figure)
    }
}

impl ChartDataModel {
    pub fn snapshot_json_contract_v1_pretty(&self) -> ChartResult<String> {
        self.figure().to_json_contract_v1_pretty()
    }
}
