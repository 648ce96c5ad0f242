use indexmap::IndexSet;
use serde_json::{Map, Value};
use tracing::trace;

use crate::core::destination::{DEFAULT_PATH_MARKER, DestinationPath};
use crate::core::figure::{Figure, json_type_name};
use crate::error::{ChartError, ChartResult};

/// Applies decoded column values to destination paths inside a [`Figure`].
///
/// Every failure leaves the figure untouched: the path is fully resolved
/// before the final assignment happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRouter {
    marker: String,
}

impl Default for ColumnRouter {
    fn default() -> Self {
        Self::new(DEFAULT_PATH_MARKER)
    }
}

impl ColumnRouter {
    #[must_use]
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    #[must_use]
    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Writes `value` at `destination`.
    pub fn route(&self, destination: &str, value: Value, figure: &mut Figure) -> ChartResult<()> {
        let path = DestinationPath::parse(destination, &self.marker)?;
        route_path(&path, value, figure)
    }

    /// Writes `value` at every destination, returning the failures.
    ///
    /// A failing destination does not prevent the remaining ones from being
    /// applied.
    pub fn route_all(
        &self,
        destinations: &IndexSet<String>,
        value: Value,
        figure: &mut Figure,
    ) -> Vec<ChartError> {
        let mut errors = Vec::new();
        let mut remaining = destinations.len();
        let mut value = Some(value);
        for destination in destinations {
            remaining -= 1;
            let next = if remaining == 0 {
                value.take().unwrap_or(Value::Null)
            } else {
                value.clone().unwrap_or(Value::Null)
            };
            if let Err(err) = self.route(destination, next, figure) {
                errors.push(err);
            }
        }
        errors
    }
}

/// Writes `value` at an already parsed path.
pub fn route_path(path: &DestinationPath, value: Value, figure: &mut Figure) -> ChartResult<()> {
    let Some((root, rest)) = path.segments().split_first() else {
        return Err(ChartError::destination(path.raw(), "path is empty"));
    };

    match root.as_str() {
        "data" => {
            let Some((index, attribute_path)) = rest.split_first() else {
                return Err(ChartError::destination(
                    path.raw(),
                    "cannot replace the whole trace list",
                ));
            };
            let traces = figure.data_mut();
            let index = parse_index(index, traces.len(), path)?;
            if attribute_path.is_empty() {
                return Err(ChartError::destination(
                    path.raw(),
                    "cannot replace a whole trace",
                ));
            }
            if attribute_path[0] == "type" {
                return Err(ChartError::destination(path.raw(), "trace type is immutable"));
            }
            assign(traces[index].attributes_mut(), attribute_path, value, path)
        }
        "layout" => {
            if rest.is_empty() {
                return Err(ChartError::destination(
                    path.raw(),
                    "cannot replace the whole layout",
                ));
            }
            assign(figure.layout_mut().attributes_mut(), rest, value, path)
        }
        other => Err(ChartError::destination(
            path.raw(),
            format!("unknown root segment `{other}`, expected `data` or `layout`"),
        )),
    }
}

fn assign(
    object: &mut Map<String, Value>,
    segments: &[String],
    value: Value,
    path: &DestinationPath,
) -> ChartResult<()> {
    let Some((leaf, parents)) = segments.split_last() else {
        return Err(ChartError::destination(path.raw(), "path is empty"));
    };

    let Some((first, rest)) = parents.split_first() else {
        trace!(destination = path.raw(), "route value");
        object.insert(leaf.clone(), value);
        return Ok(());
    };

    let mut cursor = object.get_mut(first.as_str()).ok_or_else(|| {
        ChartError::destination(path.raw(), format!("segment `{first}` does not exist"))
    })?;
    for segment in rest {
        cursor = step_mut(cursor, segment, path)?;
    }

    match cursor {
        Value::Object(map) => {
            map.insert(leaf.clone(), value);
        }
        Value::Array(items) => {
            let index = parse_index(leaf, items.len(), path)?;
            items[index] = value;
        }
        other => {
            return Err(ChartError::destination(
                path.raw(),
                format!("cannot assign `{leaf}` inside a {}", json_type_name(other)),
            ));
        }
    }
    trace!(destination = path.raw(), "route value");
    Ok(())
}

fn step_mut<'a>(
    value: &'a mut Value,
    segment: &str,
    path: &DestinationPath,
) -> ChartResult<&'a mut Value> {
    match value {
        Value::Object(map) => map.get_mut(segment).ok_or_else(|| {
            ChartError::destination(path.raw(), format!("segment `{segment}` does not exist"))
        }),
        Value::Array(items) => {
            let index = parse_index(segment, items.len(), path)?;
            Ok(&mut items[index])
        }
        other => Err(ChartError::destination(
            path.raw(),
            format!(
                "segment `{segment}` does not resolve: parent is a {}",
                json_type_name(other)
            ),
        )),
    }
}

fn parse_index(segment: &str, len: usize, path: &DestinationPath) -> ChartResult<usize> {
    let index = segment.parse::<usize>().map_err(|_| {
        ChartError::destination(path.raw(), format!("`{segment}` is not an array index"))
    })?;
    if index >= len {
        return Err(ChartError::destination(
            path.raw(),
            format!("index {index} is out of range for length {len}"),
        ));
    }
    Ok(index)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::ColumnRouter;
    use crate::core::Figure;
    use crate::error::{ChartError, ErrorKind};

    fn figure() -> Figure {
        Figure::from_value(json!({
            "data": [
                { "type": "scatter", "x": [1, 2], "marker": { "color": "#1f77b4" } },
                { "type": "bar", "y": [3, 4] }
            ],
            "layout": { "xaxis": { "range": [0, 1] } }
        }))
        .expect("figure")
    }

    #[test]
    fn routes_into_existing_trace_field() {
        let mut figure = figure();
        ColumnRouter::default()
            .route("/plotly/data/0/marker/color", json!("#abc"), &mut figure)
            .expect("route");
        assert_eq!(
            figure.data()[0].get("marker"),
            Some(&json!({ "color": "#abc" }))
        );
    }

    #[test]
    fn leaf_key_may_be_created() {
        let mut figure = figure();
        ColumnRouter::default()
            .route("/plotly/data/1/x", json!([5, 6]), &mut figure)
            .expect("route");
        assert_eq!(figure.data()[1].get("x"), Some(&json!([5, 6])));
    }

    #[test]
    fn array_elements_are_addressable() {
        let mut figure = figure();
        ColumnRouter::default()
            .route("/plotly/layout/xaxis/range/1", json!(10), &mut figure)
            .expect("route");
        assert_eq!(
            figure.layout().attributes().get("xaxis"),
            Some(&json!({ "range": [0, 10] }))
        );
    }

    #[test]
    fn missing_intermediate_is_a_configuration_error() {
        let mut figure = figure();
        let before = figure.clone();
        let err = ColumnRouter::default()
            .route("/plotly/data/1/marker/color", json!("#abc"), &mut figure)
            .expect_err("must fail");
        assert!(matches!(err, ChartError::InvalidDestination { .. }));
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(figure, before);
    }

    #[test]
    fn scalar_parent_is_not_traversable() {
        let mut figure = figure();
        let err = ColumnRouter::default()
            .route("/plotly/data/0/marker/color/0", json!("#abc"), &mut figure)
            .expect_err("must fail");
        assert!(err.to_string().contains("cannot assign `0` inside a string"));
    }

    #[test]
    fn trace_type_and_whole_nodes_are_protected() {
        let router = ColumnRouter::default();
        let mut figure = figure();
        assert!(router.route("/plotly/data/0/type", json!("pie"), &mut figure).is_err());
        assert!(router.route("/plotly/data/0", json!({}), &mut figure).is_err());
        assert!(router.route("/plotly/data", json!([]), &mut figure).is_err());
        assert!(router.route("/plotly/layout", json!({}), &mut figure).is_err());
        assert!(router.route("/plotly/frames/0", json!({}), &mut figure).is_err());
    }

    #[test]
    fn route_all_applies_every_destination_despite_failures() {
        let mut figure = figure();
        let destinations = ["/plotly/data/0/y", "/plotly/data/7/y", "/plotly/data/1/y"]
            .into_iter()
            .map(str::to_owned)
            .collect();
        let errors = ColumnRouter::default().route_all(&destinations, json!([9]), &mut figure);
        assert_eq!(errors.len(), 1);
        assert_eq!(figure.data()[0].get("y"), Some(&json!([9])));
        assert_eq!(figure.data()[1].get("y"), Some(&json!([9])));
    }
}
