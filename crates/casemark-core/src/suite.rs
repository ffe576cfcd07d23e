//! Test suite assembly: the final pipeline stage.
//!
//! `generate_suite` runs Scan -> Remap -> Resolve -> Build over one source
//! text. The whole pipeline is stateless and non-resumable; the first
//! error at any stage aborts suite construction for that text and no
//! partial suite is ever returned.

use crate::error::MarkError;
use crate::marker::scan;
use crate::remap::{Highlight, remap};
use crate::resolve::resolve;
use facet::Facet;
use std::path::PathBuf;

/// Annotation key that disables every case in a suite.
pub const DISABLED_KEY: &str = "disabled";

/// Naming tuple supplied by the upstream file-discovery layer, plus the
/// raw annotated text.
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct SuiteSource {
    /// Suite name, typically derived from the file stem.
    pub name: String,
    /// Optional namespace qualifier, typically the directory chain.
    #[facet(default)]
    pub qualifier: Option<String>,
    /// Directory the source file lives in.
    pub directory: PathBuf,
    /// The raw annotated text.
    pub text: String,
}

/// Options controlling suite assembly.
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct SuiteOptions {
    /// One analysis case is emitted per label, in order.
    pub analysis_variants: Vec<String>,
}

impl Default for SuiteOptions {
    fn default() -> Self {
        Self {
            analysis_variants: vec!["analysis".to_string()],
        }
    }
}

/// One semantic check derived from an annotated source text.
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
#[repr(u8)]
pub enum TestCase {
    /// The clean text must parse.
    Parse { name: String, text: String },
    /// The clean text must pass the named analysis variant.
    Analysis {
        name: String,
        variant: String,
        text: String,
    },
    /// A reference must resolve to its declaration, routed through its
    /// context anchors. Indices point into the suite's highlight sequence.
    ReferenceResolution {
        name: String,
        text: String,
        input_text: String,
        reference_index: usize,
        declaration_index: usize,
        context_indexes: Vec<usize>,
    },
}

impl TestCase {
    pub fn name(&self) -> &str {
        match self {
            TestCase::Parse { name, .. }
            | TestCase::Analysis { name, .. }
            | TestCase::ReferenceResolution { name, .. } => name,
        }
    }

    /// The clean text the check runs against.
    pub fn text(&self) -> &str {
        match self {
            TestCase::Parse { text, .. }
            | TestCase::Analysis { text, .. }
            | TestCase::ReferenceResolution { text, .. } => text,
        }
    }
}

/// Immutable test suite derived from one annotated source text.
///
/// The clean text and highlight sequence ride on the suite so a downstream
/// renderer can interpret the highlight indices carried by the cases.
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct TestSuite {
    pub name: String,
    pub qualifier: Option<String>,
    pub directory: PathBuf,
    /// Suite-wide flag set by a `{disabled}` annotation anywhere in the
    /// source; there is no per-case disabling.
    pub disabled: bool,
    pub clean_text: String,
    pub highlights: Vec<Highlight>,
    pub cases: Vec<TestCase>,
}

/// Run the full pipeline over one source text.
pub fn generate_suite(
    source: &SuiteSource,
    options: &SuiteOptions,
) -> Result<TestSuite, MarkError> {
    let scanned = scan(&source.text)?;
    let (clean_text, highlights) = remap(&source.text, &scanned.markers)?;
    let resolved = resolve(&scanned.markers)?;
    let disabled = scanned.annotations.contains(DISABLED_KEY);

    let mut cases = Vec::with_capacity(1 + options.analysis_variants.len() + resolved.len());
    cases.push(TestCase::Parse {
        name: case_name(&source.name, "parse", 1),
        text: clean_text.clone(),
    });
    for (seq, variant) in options.analysis_variants.iter().enumerate() {
        cases.push(TestCase::Analysis {
            name: case_name(&source.name, variant, seq + 1),
            variant: variant.clone(),
            text: clean_text.clone(),
        });
    }
    for (seq, reference) in resolved.iter().enumerate() {
        cases.push(TestCase::ReferenceResolution {
            name: case_name(&source.name, "resolve", seq + 1),
            text: clean_text.clone(),
            input_text: reference.input_text.clone(),
            reference_index: reference.reference_index,
            declaration_index: reference.declaration_index,
            context_indexes: reference.context_indexes.clone(),
        });
    }

    Ok(TestSuite {
        name: source.name.clone(),
        qualifier: source.qualifier.clone(),
        directory: source.directory.clone(),
        disabled,
        clean_text,
        highlights,
        cases,
    })
}

fn case_name(suite: &str, kind: &str, sequence: usize) -> String {
    format!("{suite}: {kind} {sequence}")
}
