//! casemark-core - Core library for deriving test fixtures from
//! marker-annotated source files
//!
//! This crate provides the building blocks for:
//! - Scanning annotated text for `[[ ... ]]` markers (declarations,
//!   references, context anchors, annotations)
//! - Stripping markers while computing exact offsets of the surviving
//!   content in the cleaned text
//! - Resolving each reference to its target declaration and context
//!   anchors by identifier
//! - Assembling an ordered, position-accurate test suite per source text
//!
//! # Features
//!
//! - `walk` - Enable [`WalkSources`] for gitignore-aware directory walking
//!   (brings in `ignore` and `globset`)
//! - `parallel` - Enable parallel suite generation (brings in `rayon`)
//!
//! # Marker Syntax
//!
//! Markers are bracketed annotations embedded in otherwise opaque source
//! text:
//!
//! ```text
//! [[@id|name]]                          declaration
//! [[->id|&ctx|input|expected]]          reference (contexts and expected
//!                                       text optional)
//! [[&id|name]]                          context anchor
//! [[{disabled}]]                        annotation
//! ```
//!
//! # Deriving a Suite from One Text
//!
//! ```
//! use casemark_core::{SuiteOptions, SuiteSource, generate_suite};
//!
//! let source = SuiteSource {
//!     name: "Fields".to_string(),
//!     qualifier: None,
//!     directory: Default::default(),
//!     text: "val [[@1|foo]] = 1; println([[->1|foo]])".to_string(),
//! };
//!
//! let suite = generate_suite(&source, &SuiteOptions::default()).unwrap();
//! assert_eq!(suite.clean_text, "val foo = 1; println(foo)");
//! assert_eq!(suite.highlights.len(), 2);
//! // One parse case, one analysis case, one resolution case.
//! assert_eq!(suite.cases.len(), 3);
//! ```
//!
//! # Batch Generation
//!
//! Use [`MemorySources`] when you don't want to hit the filesystem:
//!
//! ```
//! use casemark_core::{MemorySources, SuiteOptions, generate_suites};
//!
//! let generated = generate_suites(
//!     MemorySources::new()
//!         .add("Fields", "class A { [[@1|foo]] int x; [[->1|foo]] }")
//!         .add("Broken", "[[->9|bar]]"),
//!     &SuiteOptions::default(),
//! )
//! .unwrap();
//!
//! assert_eq!(generated.suites.len(), 1);
//! assert_eq!(generated.failures.len(), 1);
//! ```
//!
//! Texts are independent, so batch generation runs one pipeline per text
//! (in parallel under the `parallel` feature) and a malformed text only
//! fails its own suite.

mod error;
mod marker;
mod remap;
mod resolve;
mod sources;
mod suite;

pub use error::{MarkError, MarkErrorKind};
pub use marker::{Marker, ScanResult, SourceSpan, scan};
pub use remap::{Highlight, remap};
pub use resolve::{ResolvedReference, resolve};
pub use sources::{
    GatheredSources, GeneratedSuites, MemorySources, PathSources, Sources, SuiteFailure,
    generate_suites,
};
pub use suite::{DISABLED_KEY, SuiteOptions, SuiteSource, TestCase, TestSuite, generate_suite};

#[cfg(feature = "walk")]
pub use sources::WalkSources;
