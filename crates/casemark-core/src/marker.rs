//! Marker scanner: finds and classifies `[[ ... ]]` markers in raw text.
//!
//! Recognized bracket syntaxes, matched as complete non-nested spans:
//!
//! - `[[@<id>|<name>]]` - declaration
//! - `[[-><id>(|&<contextId>)*|<inputText>(|<expectedText>)?]]` - reference
//! - `[[&<id>|<name>]]` - context anchor
//! - `[[{<key>}]]` - annotation (only `disabled` has defined meaning)
//!
//! The scanner is a pure function of its input. It treats the annotated
//! source as opaque text: nothing outside the bracket delimiters is
//! interpreted.

use crate::error::MarkError;
use facet::Facet;
use std::collections::BTreeSet;

/// Half-open byte span in the original source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Facet)]
pub struct SourceSpan {
    /// Byte offset of the `[[` opener.
    pub start: usize,
    /// Byte offset just past the `]]` closer.
    pub end: usize,
}

impl SourceSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A single marker found in annotated source text.
///
/// One case per bracket syntax; the variants share nothing beyond their
/// span, so this is a closed sum rather than a base-struct hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
#[repr(u8)]
pub enum Marker {
    /// `[[@id|name]]` - a declaration the clean text keeps as `name`.
    Declaration {
        span: SourceSpan,
        id: String,
        name: String,
    },
    /// `[[->id|&ctx...|input|expected?]]` - a use site resolving to a
    /// declaration, optionally routed through named context anchors.
    Reference {
        span: SourceSpan,
        target_id: String,
        context_ids: Vec<String>,
        input_text: String,
        expected_text: String,
    },
    /// `[[&id|name]]` - a context anchor the clean text keeps as `name`.
    ContextAnchor {
        span: SourceSpan,
        id: String,
        name: String,
    },
    /// `[[{key}]]` - a suite-level flag; vanishes from the clean text and
    /// claims no highlight slot.
    Annotation { span: SourceSpan, key: String },
}

impl Marker {
    /// The marker's span in the original text.
    pub fn span(&self) -> SourceSpan {
        match self {
            Marker::Declaration { span, .. }
            | Marker::Reference { span, .. }
            | Marker::ContextAnchor { span, .. }
            | Marker::Annotation { span, .. } => *span,
        }
    }

    /// Text that replaces the marker in the cleaned output.
    pub fn replacement(&self) -> &str {
        match self {
            Marker::Declaration { name, .. } | Marker::ContextAnchor { name, .. } => name,
            Marker::Reference { expected_text, .. } => expected_text,
            Marker::Annotation { .. } => "",
        }
    }

    pub fn is_annotation(&self) -> bool {
        matches!(self, Marker::Annotation { .. })
    }
}

/// Scanner output: every marker in ascending span order, plus the set of
/// annotation keys found anywhere in the text.
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    pub markers: Vec<Marker>,
    pub annotations: BTreeSet<String>,
}

/// Scan raw text for markers.
///
/// Markers come back in ascending order of their start offset; spans are
/// pairwise disjoint by construction (the scan never backtracks past a
/// closer). Unrecognized annotation keys are collected, not rejected.
pub fn scan(text: &str) -> Result<ScanResult, MarkError> {
    let mut result = ScanResult::default();
    let mut pos = 0;

    while let Some(open_rel) = text[pos..].find("[[") {
        let open = pos + open_rel;
        let body_start = open + 2;
        let Some(close_rel) = text[body_start..].find("]]") else {
            return Err(MarkError::UnterminatedMarker { offset: open });
        };
        let close = body_start + close_rel;
        let content = &text[body_start..close];
        let span = SourceSpan::new(open, close + 2);

        if let Some(key) = content.strip_prefix('{').and_then(|c| c.strip_suffix('}')) {
            result.annotations.insert(key.to_string());
            result.markers.push(Marker::Annotation {
                span,
                key: key.to_string(),
            });
        } else if let Some(body) = content.strip_prefix("->") {
            result.markers.push(parse_reference(body, span)?);
        } else if let Some(body) = content.strip_prefix('@') {
            result.markers.push(parse_named(body, span, false)?);
        } else if let Some(body) = content.strip_prefix('&') {
            result.markers.push(parse_named(body, span, true)?);
        } else {
            return Err(MarkError::UnknownOperator {
                content: content.to_string(),
                offset: open,
            });
        }

        pos = close + 2;
    }

    Ok(result)
}

/// Parse `id|name` into a declaration or context anchor.
fn parse_named(body: &str, span: SourceSpan, anchor: bool) -> Result<Marker, MarkError> {
    let (id, name) = match body.split_once('|') {
        Some((id, name)) if !name.is_empty() => (id.to_string(), name.to_string()),
        Some((id, _)) => {
            return Err(MarkError::MissingName {
                id: id.to_string(),
                offset: span.start,
                anchor,
            });
        }
        None => {
            return Err(MarkError::MissingName {
                id: body.to_string(),
                offset: span.start,
                anchor,
            });
        }
    };

    Ok(if anchor {
        Marker::ContextAnchor { span, id, name }
    } else {
        Marker::Declaration { span, id, name }
    })
}

/// Parse `id(|&ctx)*|input(|expected)?` into a reference.
///
/// Context fields are matched greedily: after the target id, every field
/// starting with `&` is a context id, and the first field that does not is
/// the input text. The input text therefore cannot start with `&`.
fn parse_reference(body: &str, span: SourceSpan) -> Result<Marker, MarkError> {
    let fields: Vec<&str> = body.split('|').collect();
    let target_id = fields[0].to_string();

    let mut idx = 1;
    let mut context_ids = Vec::new();
    while idx < fields.len() {
        let Some(ctx) = fields[idx].strip_prefix('&') else {
            break;
        };
        context_ids.push(ctx.to_string());
        idx += 1;
    }

    let input_text = match fields.get(idx) {
        Some(field) if !field.is_empty() => field.to_string(),
        _ => {
            return Err(MarkError::MissingInputText {
                target_id,
                offset: span.start,
            });
        }
    };

    if fields.len() > idx + 2 {
        return Err(MarkError::MalformedReference {
            content: format!("->{body}"),
            offset: span.start,
        });
    }

    let expected_text = fields
        .get(idx + 1)
        .map(|field| field.to_string())
        .unwrap_or_else(|| input_text.clone());

    Ok(Marker::Reference {
        span,
        target_id,
        context_ids,
        input_text,
        expected_text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_declaration() {
        let result = scan("val [[@1|foo]] = 1").unwrap();

        assert_eq!(result.markers.len(), 1);
        let Marker::Declaration { span, id, name } = &result.markers[0] else {
            panic!("expected declaration, got {:?}", result.markers[0]);
        };
        assert_eq!(id, "1");
        assert_eq!(name, "foo");
        assert_eq!(*span, SourceSpan::new(4, 14));
    }

    #[test]
    fn scan_context_anchor() {
        let result = scan("[[&outer|Widget]]").unwrap();

        let Marker::ContextAnchor { id, name, .. } = &result.markers[0] else {
            panic!("expected context anchor");
        };
        assert_eq!(id, "outer");
        assert_eq!(name, "Widget");
    }

    #[test]
    fn scan_reference_with_contexts() {
        let result = scan("[[->decl|&ctx1|&ctx2|input|expected]]").unwrap();

        let Marker::Reference {
            target_id,
            context_ids,
            input_text,
            expected_text,
            ..
        } = &result.markers[0]
        else {
            panic!("expected reference");
        };
        assert_eq!(target_id, "decl");
        assert_eq!(context_ids, &["ctx1", "ctx2"]);
        assert_eq!(input_text, "input");
        assert_eq!(expected_text, "expected");
    }

    #[test]
    fn expected_text_defaults_to_input_text() {
        let result = scan("[[->1|foo]]").unwrap();

        let Marker::Reference {
            input_text,
            expected_text,
            ..
        } = &result.markers[0]
        else {
            panic!("expected reference");
        };
        assert_eq!(input_text, "foo");
        assert_eq!(expected_text, "foo");
    }

    #[test]
    fn annotations_are_collected_as_keys() {
        let result = scan("[[{disabled}]] code [[{wip}]]").unwrap();

        assert_eq!(result.markers.len(), 2);
        assert!(result.markers.iter().all(Marker::is_annotation));
        assert!(result.annotations.contains("disabled"));
        assert!(result.annotations.contains("wip"));
    }

    #[test]
    fn unknown_operator_is_fatal() {
        let err = scan("text [[%1|foo]]").unwrap_err();

        assert_eq!(
            err,
            MarkError::UnknownOperator {
                content: "%1|foo".into(),
                offset: 5,
            }
        );
    }

    #[test]
    fn declaration_without_name_is_fatal() {
        let err = scan("[[@1]]").unwrap_err();
        assert!(matches!(err, MarkError::MissingName { ref id, anchor: false, .. } if id == "1"));

        let err = scan("[[@1|]]").unwrap_err();
        assert!(matches!(err, MarkError::MissingName { ref id, .. } if id == "1"));
    }

    #[test]
    fn anchor_without_name_is_fatal() {
        let err = scan("[[&ctx]]").unwrap_err();
        assert!(matches!(err, MarkError::MissingName { anchor: true, .. }));
    }

    #[test]
    fn reference_without_input_text_is_fatal() {
        let err = scan("[[->1]]").unwrap_err();
        assert!(
            matches!(err, MarkError::MissingInputText { ref target_id, .. } if target_id == "1")
        );

        let err = scan("[[->1|&ctx]]").unwrap_err();
        assert!(matches!(err, MarkError::MissingInputText { .. }));
    }

    #[test]
    fn reference_with_trailing_fields_is_fatal() {
        let err = scan("[[->1|foo|bar|baz]]").unwrap_err();
        assert!(matches!(err, MarkError::MalformedReference { .. }));
    }

    #[test]
    fn unterminated_marker_is_fatal() {
        let err = scan("text [[@1|foo").unwrap_err();
        assert_eq!(err, MarkError::UnterminatedMarker { offset: 5 });
    }

    #[test]
    fn plain_brackets_are_not_markers() {
        let result = scan("array[0] and [not a marker] and a | pipe").unwrap();
        assert!(result.markers.is_empty());
        assert!(result.annotations.is_empty());
    }

    #[test]
    fn markers_come_back_in_ascending_span_order() {
        let result = scan("[[@1|a]] mid [[&c|b]] end [[->1|&c|a]]").unwrap();

        assert_eq!(result.markers.len(), 3);
        let spans: Vec<_> = result.markers.iter().map(Marker::span).collect();
        assert!(spans.windows(2).all(|w| w[0].end <= w[1].start));
    }

    #[test]
    fn declaration_name_may_contain_pipes() {
        // The name is everything after the first field separator.
        let result = scan("[[@1|a|b]]").unwrap();

        let Marker::Declaration { name, .. } = &result.markers[0] else {
            panic!("expected declaration");
        };
        assert_eq!(name, "a|b");
    }
}
