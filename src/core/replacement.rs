use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// Column name → destination paths for one table.
///
/// Destinations keep insertion order and never repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnReplacements {
    columns: IndexMap<String, IndexSet<String>>,
}

impl ColumnReplacements {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one destination for `column`.
    #[must_use]
    pub fn with_destination(
        mut self,
        column: impl Into<String>,
        destination: impl Into<String>,
    ) -> Self {
        self.insert(column, [destination]);
        self
    }

    pub fn insert<I, D>(&mut self, column: impl Into<String>, destinations: I)
    where
        I: IntoIterator<Item = D>,
        D: Into<String>,
    {
        self.columns
            .entry(column.into())
            .or_default()
            .extend(destinations.into_iter().map(Into::into));
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    #[must_use]
    pub fn destinations(&self, column: &str) -> Option<&IndexSet<String>> {
        self.columns.get(column)
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

#[cfg(test)]
mod tests {
    use super::ColumnReplacements;

    #[test]
    fn destinations_are_deduplicated_in_order() {
        let mut replacements = ColumnReplacements::new()
            .with_destination("price", "/plotly/data/0/y")
            .with_destination("price", "/plotly/data/1/y");
        replacements.insert("price", ["/plotly/data/0/y"]);

        let destinations = replacements.destinations("price").expect("column");
        assert_eq!(
            destinations.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["/plotly/data/0/y", "/plotly/data/1/y"]
        );
        assert_eq!(replacements.len(), 1);
    }

    #[test]
    fn deserializes_from_generator_json() {
        let replacements: ColumnReplacements = serde_json::from_str(
            r#"{ "Timestamp": ["/plotly/data/0/x"], "Price": ["/plotly/data/0/y"] }"#,
        )
        .expect("parse");
        assert_eq!(replacements.columns().collect::<Vec<_>>(), vec!["Timestamp", "Price"]);
    }
}
