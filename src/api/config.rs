use serde::{Deserialize, Serialize};

use crate::core::DEFAULT_PATH_MARKER;
use crate::error::{ChartError, ChartResult};

/// Host theme the model applies to traces still using plotly defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartTheme {
    #[serde(default = "default_colorway")]
    pub colorway: Vec<String>,
}

impl Default for ChartTheme {
    fn default() -> Self {
        Self {
            colorway: default_colorway(),
        }
    }
}

impl ChartTheme {
    #[must_use]
    pub fn with_colorway<I, C>(colorway: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<String>,
    {
        Self {
            colorway: colorway.into_iter().map(Into::into).collect(),
        }
    }
}

/// Model bootstrap configuration.
///
/// This type is serializable so hosts can persist the setup next to the
/// figure without inventing their own format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSyncConfig {
    #[serde(default)]
    pub theme: ChartTheme,
    /// When `false`, the figure's own template colorway wins over the theme.
    #[serde(default = "default_is_default_template")]
    pub is_default_template: bool,
    /// Leading segment of every destination path.
    #[serde(default = "default_path_marker")]
    pub path_marker: String,
}

impl Default for ChartSyncConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ChartSyncConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            theme: ChartTheme::default(),
            is_default_template: default_is_default_template(),
            path_marker: default_path_marker(),
        }
    }

    #[must_use]
    pub fn with_theme(mut self, theme: ChartTheme) -> Self {
        self.theme = theme;
        self
    }

    #[must_use]
    pub fn with_default_template(mut self, is_default_template: bool) -> Self {
        self.is_default_template = is_default_template;
        self
    }

    #[must_use]
    pub fn with_path_marker(mut self, marker: impl Into<String>) -> Self {
        self.path_marker = marker.into();
        self
    }

    pub fn validate(&self) -> ChartResult<()> {
        if self.path_marker.contains('/') {
            return Err(ChartError::InvalidData(format!(
                "path marker `{}` must not contain `/`",
                self.path_marker
            )));
        }
        Ok(())
    }

    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        let config: Self = serde_json::from_str(input)
            .map_err(|e| ChartError::InvalidData(format!("failed to parse config json: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> ChartResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ChartError::InvalidData(format!("failed to serialize config json: {e}")))
    }
}

fn default_colorway() -> Vec<String> {
    [
        "#76d9e4", "#fcd65b", "#aa9af4", "#f37e3f", "#81cd4d", "#f95d84", "#ff9d57", "#53a4f5",
        "#d7e866", "#c96cdb",
    ]
    .into_iter()
    .map(str::to_owned)
    .collect()
}

fn default_is_default_template() -> bool {
    true
}

fn default_path_marker() -> String {
    DEFAULT_PATH_MARKER.to_owned()
}

#[cfg(test)]
mod tests {
    use super::{ChartSyncConfig, ChartTheme};

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config = ChartSyncConfig::from_json_str("{}").expect("parse");
        assert_eq!(config, ChartSyncConfig::new());
        assert_eq!(config.path_marker, "plotly");
        assert!(config.is_default_template);
        assert_eq!(config.theme.colorway.len(), 10);
    }

    #[test]
    fn json_round_trip_keeps_custom_theme() {
        let config = ChartSyncConfig::new()
            .with_theme(ChartTheme::with_colorway(["#111", "#222"]))
            .with_default_template(false);
        let json = config.to_json_pretty().expect("serialize");
        assert_eq!(ChartSyncConfig::from_json_str(&json).expect("parse"), config);
    }

    #[test]
    fn marker_with_slash_is_rejected() {
        let err = ChartSyncConfig::from_json_str(r#"{ "path_marker": "a/b" }"#)
            .expect_err("must fail");
        assert!(err.to_string().contains("must not contain"));
    }
}
