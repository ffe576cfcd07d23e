//! Position remapper: strips markers and computes each marker's span in
//! the cleaned text.
//!
//! The walk threads an explicit accumulator (output buffer + input cursor)
//! through the marker list instead of mutating collector state captured by
//! closures. Because markers are processed in ascending original-offset
//! order and replacements are disjoint, relative position can never invert:
//! highlight order equals marker order.

use crate::error::MarkError;
use crate::marker::Marker;
use facet::Facet;

/// Half-open byte span in the cleaned (post-strip) text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Facet)]
pub struct Highlight {
    pub start: usize,
    pub end: usize,
}

impl Highlight {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Running output state for the remap walk.
struct CleanBuffer {
    out: String,
    /// Input cursor: everything before this offset has been emitted.
    cursor: usize,
}

/// Strip markers from `original`, producing the clean text and one
/// highlight per non-annotation marker, in marker order.
///
/// Replacement text is the declaration's or anchor's `name`, or the
/// reference's `expected_text`. Annotations vanish and claim no highlight
/// slot. Marker spans must be ascending and disjoint; this is checked
/// explicitly rather than assumed from scan order.
pub fn remap(original: &str, markers: &[Marker]) -> Result<(String, Vec<Highlight>), MarkError> {
    let mut buf = CleanBuffer {
        out: String::with_capacity(original.len()),
        cursor: 0,
    };
    let mut highlights = Vec::with_capacity(markers.len());

    for marker in markers {
        let span = marker.span();
        if span.start < buf.cursor {
            return Err(MarkError::OutOfOrderMarkers {
                prev_end: buf.cursor,
                start: span.start,
            });
        }

        buf.out.push_str(&original[buf.cursor..span.start]);
        if !marker.is_annotation() {
            let replacement = marker.replacement();
            let start = buf.out.len();
            buf.out.push_str(replacement);
            highlights.push(Highlight::new(start, start + replacement.len()));
        }
        buf.cursor = span.end;
    }

    buf.out.push_str(&original[buf.cursor..]);
    Ok((buf.out, highlights))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marker::{SourceSpan, scan};

    fn remap_text(text: &str) -> (String, Vec<Highlight>) {
        let scanned = scan(text).expect("scan failed");
        remap(text, &scanned.markers).expect("remap failed")
    }

    #[test]
    fn no_markers_means_identity() {
        let (clean, highlights) = remap_text("fn main() { let x = 1; }");
        assert_eq!(clean, "fn main() { let x = 1; }");
        assert!(highlights.is_empty());
    }

    #[test]
    fn replaces_markers_and_tracks_offsets() {
        let (clean, highlights) = remap_text("val [[@1|foo]] = [[->1|foo|bar]]");

        assert_eq!(clean, "val foo = bar");
        assert_eq!(highlights.len(), 2);
        assert_eq!(&clean[highlights[0].start..highlights[0].end], "foo");
        assert_eq!(&clean[highlights[1].start..highlights[1].end], "bar");
    }

    #[test]
    fn clean_text_contains_no_bracket_delimiters() {
        let (clean, _) = remap_text("[[{disabled}]] a [[@1|x]] b [[&c|y]] c [[->1|&c|x]]");
        assert!(!clean.contains("[["));
        assert!(!clean.contains("]]"));
    }

    #[test]
    fn highlights_are_ordered_and_disjoint() {
        let (_, highlights) = remap_text("[[@1|aa]][[&2|bbb]][[->1|&2|cccc]]");

        assert!(
            highlights
                .windows(2)
                .all(|pair| pair[0].end <= pair[1].start)
        );
    }

    #[test]
    fn annotations_are_stripped_without_a_highlight_slot() {
        let (clean, highlights) = remap_text("[[{disabled}]] [[@1|x]]");

        assert_eq!(clean, " x");
        assert_eq!(highlights, vec![Highlight::new(1, 2)]);
    }

    #[test]
    fn out_of_order_markers_are_an_integrity_error() {
        // Hand-built spans that a well-formed scan can never produce.
        let markers = vec![
            Marker::Declaration {
                span: SourceSpan::new(5, 15),
                id: "1".into(),
                name: "a".into(),
            },
            Marker::Declaration {
                span: SourceSpan::new(0, 10),
                id: "2".into(),
                name: "b".into(),
            },
        ];

        let err = remap("0123456789abcdefghij", &markers).unwrap_err();
        assert_eq!(
            err,
            MarkError::OutOfOrderMarkers {
                prev_end: 15,
                start: 0,
            }
        );
    }

    #[test]
    fn overlapping_markers_are_an_integrity_error() {
        let markers = vec![
            Marker::Declaration {
                span: SourceSpan::new(0, 10),
                id: "1".into(),
                name: "a".into(),
            },
            Marker::Declaration {
                span: SourceSpan::new(8, 12),
                id: "2".into(),
                name: "b".into(),
            },
        ];

        let err = remap("0123456789abcdefghij", &markers).unwrap_err();
        assert!(matches!(err, MarkError::OutOfOrderMarkers { .. }));
    }
}
