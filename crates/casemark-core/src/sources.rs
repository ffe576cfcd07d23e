//! Source providers and batch suite generation.
//!
//! The pipeline itself reads one materialized text at a time; everything
//! filesystem-shaped lives here. Providers yield [`SuiteSource`] naming
//! tuples, and [`generate_suites`] runs the pipeline over each of them -
//! in parallel under the `parallel` feature, which is safe because each
//! text's pipeline run touches only its own input.

use crate::error::MarkError;
use crate::suite::{SuiteOptions, SuiteSource, TestSuite, generate_suite};
use eyre::Result;
#[cfg(feature = "walk")]
use eyre::WrapErr;
use std::path::{Path, PathBuf};

/// Gathered naming tuples plus non-fatal gathering warnings (unreadable
/// files, non-UTF-8 content).
#[derive(Debug, Default)]
pub struct GatheredSources {
    pub sources: Vec<SuiteSource>,
    pub warnings: Vec<String>,
}

/// A text that failed the pipeline.
#[derive(Debug, Clone)]
pub struct SuiteFailure {
    pub name: String,
    pub directory: PathBuf,
    pub error: MarkError,
}

/// Batch output: suites in source order, plus per-text failures.
///
/// A failing text never aborts the batch; whether to skip or halt on
/// failures is driver policy.
#[derive(Debug, Default)]
pub struct GeneratedSuites {
    pub suites: Vec<TestSuite>,
    pub failures: Vec<SuiteFailure>,
    pub warnings: Vec<String>,
}

impl GeneratedSuites {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Trait for providing annotated source texts to the pipeline.
pub trait Sources {
    /// Gather naming tuples and raw texts.
    fn gather(self) -> Result<GatheredSources>;
}

/// In-memory sources (useful for testing, embedding).
#[derive(Default)]
pub struct MemorySources(Vec<SuiteSource>);

impl MemorySources {
    /// Create empty memory sources.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Add a named text with no qualifier or directory.
    pub fn add(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.0.push(SuiteSource {
            name: name.into(),
            qualifier: None,
            directory: PathBuf::new(),
            text: text.into(),
        });
        self
    }

    /// Add a fully specified naming tuple.
    pub fn add_source(mut self, source: SuiteSource) -> Self {
        self.0.push(source);
        self
    }
}

impl Sources for MemorySources {
    fn gather(self) -> Result<GatheredSources> {
        Ok(GatheredSources {
            sources: self.0,
            warnings: Vec::new(),
        })
    }
}

/// Sources from an explicit list of file paths.
pub struct PathSources(Vec<PathBuf>);

impl PathSources {
    /// Create from an iterator of paths.
    pub fn new(paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self(paths.into_iter().map(Into::into).collect())
    }
}

impl Sources for PathSources {
    fn gather(self) -> Result<GatheredSources> {
        let mut gathered = GatheredSources::default();
        for path in self.0 {
            match std::fs::read_to_string(&path) {
                Ok(text) => gathered
                    .sources
                    .push(suite_source_for_path(None, &path, text)),
                Err(err) => gathered
                    .warnings
                    .push(format!("skipping {}: {}", path.display(), err)),
            }
        }
        Ok(gathered)
    }
}

/// Gitignore-aware directory walker.
#[cfg(feature = "walk")]
pub struct WalkSources {
    root: PathBuf,
    include: Vec<String>,
    exclude: Vec<String>,
}

#[cfg(feature = "walk")]
impl WalkSources {
    /// Create a walker for the given root directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            include: Vec::new(),
            exclude: Vec::new(),
        }
    }

    /// Add include patterns (e.g., `["**/*.kt"]`). An empty include list
    /// matches every file.
    pub fn include(mut self, patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.include.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Add exclude patterns (e.g., `["target/**"]`).
    pub fn exclude(mut self, patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.exclude.extend(patterns.into_iter().map(Into::into));
        self
    }
}

#[cfg(feature = "walk")]
impl Sources for WalkSources {
    fn gather(self) -> Result<GatheredSources> {
        use ignore::WalkBuilder;

        let include = build_globset(&self.include)?;
        let exclude = build_globset(&self.exclude)?;

        let mut paths = Vec::new();
        for entry in WalkBuilder::new(&self.root)
            .follow_links(true)
            .hidden(false)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .build()
        {
            let Ok(entry) = entry else { continue };
            if !entry.file_type().is_some_and(|kind| kind.is_file()) {
                continue;
            }
            let path = entry.into_path();
            let relative = path.strip_prefix(&self.root).unwrap_or(&path);
            if !self.include.is_empty() && !include.is_match(relative) {
                continue;
            }
            if exclude.is_match(relative) {
                continue;
            }
            paths.push(path);
        }

        // Walk order is filesystem-dependent; suites should not be.
        paths.sort();

        let mut gathered = GatheredSources::default();
        for path in paths {
            match std::fs::read_to_string(&path) {
                Ok(text) => gathered
                    .sources
                    .push(suite_source_for_path(Some(&self.root), &path, text)),
                Err(err) => gathered
                    .warnings
                    .push(format!("skipping {}: {}", path.display(), err)),
            }
        }
        Ok(gathered)
    }
}

#[cfg(feature = "walk")]
fn build_globset(patterns: &[String]) -> Result<globset::GlobSet> {
    let mut builder = globset::GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(
            globset::Glob::new(pattern)
                .wrap_err_with(|| format!("Invalid glob pattern `{pattern}`"))?,
        );
    }
    builder.build().wrap_err("Failed to build glob set")
}

/// Derive a naming tuple from a file path: name from the file stem,
/// qualifier from the directory chain relative to `root` (dot-joined).
fn suite_source_for_path(root: Option<&Path>, path: &Path, text: String) -> SuiteSource {
    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unnamed".to_string());

    let relative = root
        .and_then(|root| path.strip_prefix(root).ok())
        .unwrap_or(path);
    let qualifier = relative
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map(|parent| {
            parent
                .components()
                .map(|component| component.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join(".")
        });

    let directory = path.parent().map(Path::to_path_buf).unwrap_or_default();

    SuiteSource {
        name,
        qualifier,
        directory,
        text,
    }
}

/// Generate one suite per gathered source.
///
/// Suites come back in gathering order regardless of how the work was
/// scheduled; per-text failures are collected, never propagated.
pub fn generate_suites(sources: impl Sources, options: &SuiteOptions) -> Result<GeneratedSuites> {
    let gathered = sources.gather()?;

    #[cfg(feature = "parallel")]
    let outcomes: Vec<Result<TestSuite, SuiteFailure>> = {
        use rayon::prelude::*;
        gathered
            .sources
            .par_iter()
            .map(|source| run_pipeline(source, options))
            .collect()
    };

    #[cfg(not(feature = "parallel"))]
    let outcomes: Vec<Result<TestSuite, SuiteFailure>> = gathered
        .sources
        .iter()
        .map(|source| run_pipeline(source, options))
        .collect();

    let mut generated = GeneratedSuites {
        warnings: gathered.warnings,
        ..Default::default()
    };
    for outcome in outcomes {
        match outcome {
            Ok(suite) => generated.suites.push(suite),
            Err(failure) => generated.failures.push(failure),
        }
    }
    Ok(generated)
}

fn run_pipeline(source: &SuiteSource, options: &SuiteOptions) -> Result<TestSuite, SuiteFailure> {
    generate_suite(source, options).map_err(|error| SuiteFailure {
        name: source.name.clone(),
        directory: source.directory.clone(),
        error,
    })
}
