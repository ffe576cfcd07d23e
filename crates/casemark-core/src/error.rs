//! Error taxonomy for the marker pipeline.
//!
//! Every failure is fatal to the single text being processed: the pipeline
//! surfaces the first error and constructs no partial suite. A driver
//! processing many texts decides per text whether to skip or halt.

use std::fmt;

/// Which pipeline stage an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkErrorKind {
    /// Malformed marker syntax (unknown operator, missing required field).
    Parse,
    /// Marker ranges or identifiers violate structural invariants.
    Integrity,
    /// A reference names an identifier with no matching marker.
    Reference,
}

impl MarkErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarkErrorKind::Parse => "parse",
            MarkErrorKind::Integrity => "integrity",
            MarkErrorKind::Reference => "reference",
        }
    }
}

impl fmt::Display for MarkErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fatal error from any stage of the marker pipeline.
///
/// Offsets are byte offsets of the marker's `[[` opener in the original
/// text. Unresolved variants carry the sorted identifiers that do exist in
/// the relevant namespace, so a driver can suggest near-misses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkError {
    /// Bracket content matching no recognized marker operator.
    UnknownOperator { content: String, offset: usize },
    /// A declaration or context anchor with no replacement name.
    MissingName {
        id: String,
        offset: usize,
        /// True when the offending marker is a context anchor.
        anchor: bool,
    },
    /// A reference with no input text.
    MissingInputText { target_id: String, offset: usize },
    /// A `[[` opener with no closing `]]`.
    UnterminatedMarker { offset: usize },
    /// A reference with trailing fields beyond its expected text.
    MalformedReference { content: String, offset: usize },
    /// A marker starting before the previous marker's end.
    OutOfOrderMarkers { prev_end: usize, start: usize },
    /// Two declarations sharing one identifier.
    DuplicateDeclaration { id: String },
    /// Two context anchors sharing one identifier.
    DuplicateContext { id: String },
    /// A reference targeting a declaration identifier that does not exist.
    UnresolvedDeclaration { id: String, known: Vec<String> },
    /// A reference naming a context anchor identifier that does not exist.
    UnresolvedContext { id: String, known: Vec<String> },
}

impl MarkError {
    /// The pipeline stage this error belongs to.
    pub fn kind(&self) -> MarkErrorKind {
        match self {
            MarkError::UnknownOperator { .. }
            | MarkError::MissingName { .. }
            | MarkError::MissingInputText { .. }
            | MarkError::UnterminatedMarker { .. }
            | MarkError::MalformedReference { .. } => MarkErrorKind::Parse,
            MarkError::OutOfOrderMarkers { .. }
            | MarkError::DuplicateDeclaration { .. }
            | MarkError::DuplicateContext { .. } => MarkErrorKind::Integrity,
            MarkError::UnresolvedDeclaration { .. } | MarkError::UnresolvedContext { .. } => {
                MarkErrorKind::Reference
            }
        }
    }

    /// The identifier the error is about, when there is one.
    pub fn identifier(&self) -> Option<&str> {
        match self {
            MarkError::MissingName { id, .. }
            | MarkError::DuplicateDeclaration { id }
            | MarkError::DuplicateContext { id }
            | MarkError::UnresolvedDeclaration { id, .. }
            | MarkError::UnresolvedContext { id, .. } => Some(id),
            MarkError::MissingInputText { target_id, .. } => Some(target_id),
            _ => None,
        }
    }
}

impl fmt::Display for MarkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkError::UnknownOperator { content, offset } => {
                write!(f, "unknown marker operator `[[{content}]]` at offset {offset}")
            }
            MarkError::MissingName { id, offset, anchor } => {
                let what = if *anchor { "context anchor" } else { "declaration" };
                write!(f, "{what} `{id}` at offset {offset} has no name")
            }
            MarkError::MissingInputText { target_id, offset } => {
                write!(f, "reference to `{target_id}` at offset {offset} has no input text")
            }
            MarkError::UnterminatedMarker { offset } => {
                write!(f, "marker opened at offset {offset} is never closed")
            }
            MarkError::MalformedReference { content, offset } => {
                write!(f, "reference `[[{content}]]` at offset {offset} has trailing fields")
            }
            MarkError::OutOfOrderMarkers { prev_end, start } => {
                write!(f, "marker at offset {start} overlaps or precedes marker ending at {prev_end}")
            }
            MarkError::DuplicateDeclaration { id } => {
                write!(f, "duplicate declaration identifier `{id}`")
            }
            MarkError::DuplicateContext { id } => {
                write!(f, "duplicate context anchor identifier `{id}`")
            }
            MarkError::UnresolvedDeclaration { id, .. } => {
                write!(f, "reference targets declaration `{id}` but no such declaration exists")
            }
            MarkError::UnresolvedContext { id, .. } => {
                write!(f, "reference names context anchor `{id}` but no such anchor exists")
            }
        }
    }
}

impl std::error::Error for MarkError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_covers_every_stage() {
        let parse = MarkError::UnknownOperator {
            content: "%x".into(),
            offset: 0,
        };
        let integrity = MarkError::DuplicateDeclaration { id: "1".into() };
        let reference = MarkError::UnresolvedContext {
            id: "ctx".into(),
            known: vec![],
        };

        assert_eq!(parse.kind(), MarkErrorKind::Parse);
        assert_eq!(integrity.kind(), MarkErrorKind::Integrity);
        assert_eq!(reference.kind(), MarkErrorKind::Reference);
    }

    #[test]
    fn identifier_names_the_offender() {
        let err = MarkError::UnresolvedDeclaration {
            id: "9".into(),
            known: vec!["1".into()],
        };
        assert_eq!(err.identifier(), Some("9"));
        assert!(err.to_string().contains("`9`"));
    }
}
