//! Theme colorway assignment.
//!
//! Traces carry no explicit subplot id, so subplots are inferred from
//! adjacency: traces of one subplot are contiguous, a change of trace kind
//! starts a new subplot, and so does a change of domain between two kinds
//! that are laid out by domain. Each subplot cycles the colorway from its
//! first color, the same way plotly assigns its own defaults.

use serde_json::Value;
use tracing::trace;

use crate::core::figure::TraceDescription;

/// Color slot of every trace: its offset from the start of its subplot.
#[must_use]
pub fn subplot_color_slots(traces: &[TraceDescription]) -> Vec<usize> {
    let mut subplot_start = 0;
    (0..traces.len())
        .map(|index| {
            if index > 0 && starts_new_subplot(&traces[index - 1], &traces[index]) {
                subplot_start = index;
            }
            index - subplot_start
        })
        .collect()
}

/// Kinds and domains are compared as written, so a trace without `type`
/// differs from an explicit `"scatter"` even though both draw as scatter.
fn starts_new_subplot(previous: &TraceDescription, current: &TraceDescription) -> bool {
    if previous.get("type") != current.get("type") {
        return true;
    }
    current.kind().compares_domain()
        && !same_json(previous.get("domain"), current.get("domain"))
}

/// Structural equality with numbers compared by value (`0` equals `0.0`).
fn same_json(previous: Option<&Value>, current: Option<&Value>) -> bool {
    match (previous, current) {
        (None, None) => true,
        (Some(previous), Some(current)) => json_equal(previous, current),
        _ => false,
    }
}

fn json_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(left), Value::Number(right)) => left.as_f64() == right.as_f64(),
        (Value::Array(left), Value::Array(right)) => {
            left.len() == right.len()
                && left.iter().zip(right).all(|(left, right)| json_equal(left, right))
        }
        (Value::Object(left), Value::Object(right)) => {
            left.len() == right.len()
                && left.iter().all(|(key, value)| {
                    right.get(key).is_some_and(|other| json_equal(value, other))
                })
        }
        _ => left == right,
    }
}

/// Rewrites default trace colors with `theme_colorway`.
///
/// A color field is rewritten only when it still holds the default plotly
/// would have picked from `original_colorway` for the trace's slot, compared
/// case-insensitively. Colors set by the user or computed by the plot kind are
/// kept. Returns the number of rewritten fields.
pub fn assign_colorway(
    traces: &mut [TraceDescription],
    theme_colorway: &[String],
    original_colorway: &[String],
) -> usize {
    if theme_colorway.is_empty() {
        return 0;
    }

    let slots = subplot_color_slots(traces);
    let mut recolored = 0;
    for (trace, slot) in traces.iter_mut().zip(slots) {
        let theme_color = &theme_colorway[slot % theme_colorway.len()];
        let default_color = cycled(original_colorway, slot)
            .unwrap_or_default()
            .to_uppercase();

        let fields = trace.kind().color_fields();
        for &field in fields {
            let is_default = trace
                .color(field)
                .is_some_and(|color| color.to_uppercase() == default_color);
            if is_default {
                trace.set_color(field, theme_color);
                recolored += 1;
            }
        }
    }

    trace!(traces = traces.len(), recolored, "assigned theme colorway");
    recolored
}

fn cycled(colorway: &[String], slot: usize) -> Option<&str> {
    if colorway.is_empty() {
        return None;
    }
    Some(&colorway[slot % colorway.len()])
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{cycled, same_json};

    #[test]
    fn empty_colorway_has_no_default() {
        assert_eq!(cycled(&[], 3), None);
    }

    #[test]
    fn colorway_wraps_around() {
        let colorway = vec!["a".to_owned(), "b".to_owned()];
        assert_eq!(cycled(&colorway, 0), Some("a"));
        assert_eq!(cycled(&colorway, 3), Some("b"));
    }

    #[test]
    fn json_numbers_compare_by_value() {
        let integral = json!({ "x": [0, 1] });
        let floating = json!({ "x": [0.0, 1.0] });
        assert!(same_json(Some(&integral), Some(&floating)));
        assert!(same_json(None, None));
        assert!(!same_json(Some(&integral), None));
        assert!(!same_json(
            Some(&integral),
            Some(&json!({ "x": [0, 1], "row": 0 }))
        ));
    }
}
