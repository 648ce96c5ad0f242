use smallvec::SmallVec;

use crate::error::{ChartError, ChartResult};

/// Leading segment every destination path carries before the figure keys.
pub const DEFAULT_PATH_MARKER: &str = "plotly";

/// Parsed destination path: the figure keys that follow the marker segment.
///
/// `"/plotly/data/0/marker/color"` parses to `["data", "0", "marker", "color"]`.
/// Segments use JSON pointer escaping (`~1` for `/`, `~0` for `~`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationPath {
    raw: String,
    segments: SmallVec<[String; 6]>,
}

impl DestinationPath {
    /// Parses `raw`, requiring `marker` as the first non-empty segment.
    ///
    /// An empty `marker` disables the marker check.
    pub fn parse(raw: &str, marker: &str) -> ChartResult<Self> {
        let mut parts = raw.split('/').filter(|part| !part.is_empty());

        if !marker.is_empty() {
            match parts.next() {
                Some(first) if first == marker => {}
                Some(first) => {
                    return Err(ChartError::destination(
                        raw,
                        format!("expected leading `{marker}` segment, found `{first}`"),
                    ));
                }
                None => return Err(ChartError::destination(raw, "path is empty")),
            }
        }

        let segments = parts.map(unescape_segment).collect::<SmallVec<[String; 6]>>();
        if segments.is_empty() {
            return Err(ChartError::destination(
                raw,
                "path has no segments after the marker",
            ));
        }

        Ok(Self {
            raw: raw.to_owned(),
            segments,
        })
    }

    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

fn unescape_segment(segment: &str) -> String {
    if segment.contains('~') {
        segment.replace("~1", "/").replace("~0", "~")
    } else {
        segment.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_PATH_MARKER, DestinationPath};

    #[test]
    fn marker_and_empty_segments_are_discarded() {
        let path = DestinationPath::parse("/plotly/data/0/marker/color/", DEFAULT_PATH_MARKER)
            .expect("parse");
        assert_eq!(path.segments(), ["data", "0", "marker", "color"]);
        assert_eq!(path.raw(), "/plotly/data/0/marker/color/");
    }

    #[test]
    fn missing_marker_is_rejected() {
        let err = DestinationPath::parse("/data/0/x", DEFAULT_PATH_MARKER).expect_err("must fail");
        assert!(err.to_string().contains("expected leading `plotly` segment"));
    }

    #[test]
    fn marker_only_path_is_rejected() {
        assert!(DestinationPath::parse("/plotly/", DEFAULT_PATH_MARKER).is_err());
        assert!(DestinationPath::parse("", DEFAULT_PATH_MARKER).is_err());
    }

    #[test]
    fn json_pointer_escapes_are_decoded() {
        let path = DestinationPath::parse("/plotly/layout/meta/a~1b~0c", DEFAULT_PATH_MARKER)
            .expect("parse");
        assert_eq!(path.segments(), ["layout", "meta", "a/b~c"]);
    }

    #[test]
    fn empty_marker_keeps_every_segment() {
        let path = DestinationPath::parse("/layout/title", "").expect("parse");
        assert_eq!(path.segments(), ["layout", "title"]);
    }
}
