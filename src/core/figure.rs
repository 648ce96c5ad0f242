use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::trace;

use crate::error::{ChartError, ChartResult};

/// Plotly trace type assumed when a trace omits `type`.
pub const DEFAULT_TRACE_TYPE: &str = "scatter";

/// Trace kind tag parsed from the plotly `type` attribute.
///
/// Kind-specific behavior (domain comparison, color-bearing fields) is decided
/// from this tag, never from which attributes happen to be present.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TraceKind {
    /// Any plotly type not listed below (`scatter`, `bar`, `scattergl`, ...).
    Standard(String),
    Box,
    Violin,
    Ohlc,
    Candlestick,
    Pie,
}

impl TraceKind {
    #[must_use]
    pub fn from_type_name(name: Option<&str>) -> Self {
        match name.unwrap_or(DEFAULT_TRACE_TYPE) {
            "box" => Self::Box,
            "violin" => Self::Violin,
            "ohlc" => Self::Ohlc,
            "candlestick" => Self::Candlestick,
            "pie" => Self::Pie,
            other => Self::Standard(other.to_owned()),
        }
    }

    #[must_use]
    pub fn type_name(&self) -> &str {
        match self {
            Self::Standard(name) => name,
            Self::Box => "box",
            Self::Violin => "violin",
            Self::Ohlc => "ohlc",
            Self::Candlestick => "candlestick",
            Self::Pie => "pie",
        }
    }

    /// Whether two adjacent traces of this kind are split into separate
    /// subplots when their domains differ.
    #[must_use]
    pub fn compares_domain(&self) -> bool {
        matches!(self, Self::Standard(_) | Self::Box)
    }

    /// Color-bearing style fields the colorway may rewrite for this kind.
    #[must_use]
    pub fn color_fields(&self) -> &'static [ColorField] {
        match self {
            Self::Standard(_) | Self::Box | Self::Violin => &[ColorField::Marker, ColorField::Line],
            Self::Pie => &[ColorField::Marker],
            Self::Ohlc | Self::Candlestick => &[ColorField::Line],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorField {
    Marker,
    Line,
}

impl ColorField {
    #[must_use]
    pub const fn container_key(self) -> &'static str {
        match self {
            Self::Marker => "marker",
            Self::Line => "line",
        }
    }
}

/// Subplot extent of a trace, compared by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Domain {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<[OrderedFloat<f64>; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<[OrderedFloat<f64>; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
}

impl Domain {
    #[must_use]
    pub fn new(x: [f64; 2], y: [f64; 2]) -> Self {
        Self {
            x: Some([OrderedFloat(x[0]), OrderedFloat(x[1])]),
            y: Some([OrderedFloat(y[0]), OrderedFloat(y[1])]),
            row: None,
            column: None,
        }
    }
}

/// One trace of the figure.
///
/// The kind is fixed at construction. All other plotly attributes stay in a
/// JSON object so destination paths can reach any of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct TraceDescription {
    kind: TraceKind,
    attributes: Map<String, Value>,
}

impl TraceDescription {
    #[must_use]
    pub fn new(kind: TraceKind, mut attributes: Map<String, Value>) -> Self {
        attributes.insert("type".to_owned(), Value::from(kind.type_name()));
        Self { kind, attributes }
    }

    pub fn from_value(value: Value) -> ChartResult<Self> {
        match value {
            Value::Object(attributes) => Self::try_from(attributes),
            other => Err(ChartError::InvalidData(format!(
                "trace must be a JSON object, got {}",
                json_type_name(&other)
            ))),
        }
    }

    #[must_use]
    pub fn kind(&self) -> &TraceKind {
        &self.kind
    }

    #[must_use]
    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Parsed `domain` attribute. A malformed domain reads as absent.
    #[must_use]
    pub fn domain(&self) -> Option<Domain> {
        let raw = self.attributes.get("domain")?;
        match Domain::deserialize(raw) {
            Ok(domain) => Some(domain),
            Err(err) => {
                trace!(error = %err, "ignoring malformed trace domain");
                None
            }
        }
    }

    /// Plain string color of `field`, if the field exists and holds a string.
    #[must_use]
    pub fn color(&self, field: ColorField) -> Option<&str> {
        self.attributes
            .get(field.container_key())?
            .as_object()?
            .get("color")?
            .as_str()
    }

    pub(crate) fn set_color(&mut self, field: ColorField, color: &str) {
        if let Some(Value::Object(container)) = self.attributes.get_mut(field.container_key()) {
            container.insert("color".to_owned(), Value::from(color));
        }
    }

    pub(crate) fn attributes_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.attributes
    }
}

impl TryFrom<Map<String, Value>> for TraceDescription {
    type Error = ChartError;

    fn try_from(attributes: Map<String, Value>) -> ChartResult<Self> {
        let type_name = match attributes.get("type") {
            None | Some(Value::Null) => None,
            Some(Value::String(name)) => Some(name.as_str()),
            Some(other) => {
                return Err(ChartError::InvalidData(format!(
                    "trace `type` must be a string, got {}",
                    json_type_name(other)
                )));
            }
        };
        Ok(Self {
            kind: TraceKind::from_type_name(type_name),
            attributes,
        })
    }
}

impl From<TraceDescription> for Map<String, Value> {
    fn from(trace: TraceDescription) -> Self {
        trace.attributes
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarginSide {
    Left,
    Right,
    Top,
    Bottom,
}

impl MarginSide {
    const fn key(self) -> &'static str {
        match self {
            Self::Left => "l",
            Self::Right => "r",
            Self::Top => "t",
            Self::Bottom => "b",
        }
    }
}

/// Global figure layout kept as a JSON object with typed accessors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayoutDescription {
    attributes: Map<String, Value>,
}

impl LayoutDescription {
    #[must_use]
    pub fn new(attributes: Map<String, Value>) -> Self {
        Self { attributes }
    }

    #[must_use]
    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    /// `template.layout.colorway`, when the template declares one.
    ///
    /// Non-string entries are skipped.
    #[must_use]
    pub fn template_colorway(&self) -> Option<Vec<String>> {
        let colorway = self
            .attributes
            .get("template")?
            .get("layout")?
            .get("colorway")?
            .as_array()?;
        Some(
            colorway
                .iter()
                .filter_map(|color| color.as_str().map(str::to_owned))
                .collect(),
        )
    }

    /// Replaces the whole template with one that only carries `colorway`.
    pub(crate) fn set_template_colorway(&mut self, colorway: &[String]) {
        let colorway = colorway.iter().cloned().map(Value::from).collect::<Vec<_>>();
        let mut template_layout = Map::new();
        template_layout.insert("colorway".to_owned(), Value::Array(colorway));
        let mut template = Map::new();
        template.insert("layout".to_owned(), Value::Object(template_layout));
        self.attributes
            .insert("template".to_owned(), Value::Object(template));
    }

    /// Margin in pixels, `0.0` when unset.
    #[must_use]
    pub fn margin(&self, side: MarginSide) -> f64 {
        self.attributes
            .get("margin")
            .and_then(|margin| margin.get(side.key()))
            .and_then(Value::as_f64)
            .unwrap_or(0.0)
    }

    /// Title text, accepting both `"title": "..."` and `"title": {"text": "..."}`.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        match self.attributes.get("title")? {
            Value::String(text) => Some(text),
            Value::Object(title) => title.get("text")?.as_str(),
            _ => None,
        }
    }

    pub(crate) fn attributes_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.attributes
    }
}

/// Traces plus layout: the root that destination paths address.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    #[serde(default)]
    data: Vec<TraceDescription>,
    #[serde(default)]
    layout: LayoutDescription,
}

impl Figure {
    #[must_use]
    pub fn new(data: Vec<TraceDescription>, layout: LayoutDescription) -> Self {
        Self { data, layout }
    }

    pub fn from_value(value: Value) -> ChartResult<Self> {
        serde_json::from_value(value)
            .map_err(|e| ChartError::InvalidData(format!("failed to parse figure: {e}")))
    }

    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        serde_json::from_str(input)
            .map_err(|e| ChartError::InvalidData(format!("failed to parse figure json: {e}")))
    }

    #[must_use]
    pub fn data(&self) -> &[TraceDescription] {
        &self.data
    }

    #[must_use]
    pub fn layout(&self) -> &LayoutDescription {
        &self.layout
    }

    pub(crate) fn data_mut(&mut self) -> &mut [TraceDescription] {
        &mut self.data
    }

    pub(crate) fn layout_mut(&mut self) -> &mut LayoutDescription {
        &mut self.layout
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
