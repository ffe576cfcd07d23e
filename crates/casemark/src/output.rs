//! Output formatting for generated suites.

use casemark_core::{GeneratedSuites, MarkError, TestCase, TestSuite};
use facet::Facet;
use owo_colors::OwoColorize;

/// Output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Render a generation run in the specified format.
pub fn render(generated: &GeneratedSuites, format: OutputFormat, verbose: bool) -> String {
    match format {
        OutputFormat::Text => render_text(generated, verbose),
        OutputFormat::Json => render_json(generated),
    }
}

fn render_text(generated: &GeneratedSuites, verbose: bool) -> String {
    let mut output = String::new();
    output.push('\n');

    for suite in &generated.suites {
        let title = match &suite.qualifier {
            Some(qualifier) => format!("{qualifier}.{}", suite.name),
            None => suite.name.clone(),
        };
        output.push_str(&format!("{} {}", "##".bold(), title.cyan().bold()));
        if suite.disabled {
            output.push_str(&format!(" {}", "(disabled)".yellow()));
        }
        output.push('\n');

        let parse = count_cases(suite, |case| matches!(case, TestCase::Parse { .. }));
        let analysis = count_cases(suite, |case| matches!(case, TestCase::Analysis { .. }));
        let resolution = count_cases(suite, |case| {
            matches!(case, TestCase::ReferenceResolution { .. })
        });
        output.push_str(&format!(
            "  {} cases ({} parse, {} analysis, {} resolution), {} highlights\n",
            suite.cases.len(),
            parse,
            analysis,
            resolution,
            suite.highlights.len()
        ));

        if verbose {
            for case in &suite.cases {
                match case {
                    TestCase::ReferenceResolution {
                        name,
                        reference_index,
                        declaration_index,
                        context_indexes,
                        ..
                    } => {
                        output.push_str(&format!(
                            "  {} {} (ref {} -> decl {}, contexts {:?})\n",
                            "-".dimmed(),
                            name,
                            reference_index,
                            declaration_index,
                            context_indexes
                        ));
                    }
                    other => {
                        output.push_str(&format!("  {} {}\n", "-".dimmed(), other.name()));
                    }
                }
            }
        }
        output.push('\n');
    }

    if generated.failures.is_empty() {
        output.push_str(&format!(
            "{} {} suites generated\n",
            "OK".green().bold(),
            generated.suites.len()
        ));
    } else {
        output.push_str(&format!(
            "{} Failed ({}):\n",
            "!".red().bold(),
            generated.failures.len()
        ));
        for failure in &generated.failures {
            let file = failure.directory.join(&failure.name);
            output.push_str(&format!(
                "  {} {} - {} error: {}\n",
                "-".red(),
                file.display(),
                failure.error.kind().dimmed(),
                failure.error
            ));
            if let Some(hint) = failure_hint(&failure.error) {
                output.push_str(&format!("    {}\n", hint.dimmed()));
            }
        }
    }

    output
}

/// "did you mean" hint for unresolved identifiers.
fn failure_hint(error: &MarkError) -> Option<String> {
    match error {
        MarkError::UnresolvedDeclaration { id, known }
        | MarkError::UnresolvedContext { id, known } => {
            nearest_id(id, known).map(|candidate| format!("did you mean `{candidate}`?"))
        }
        _ => None,
    }
}

/// Closest known identifier, if any is close enough to be a plausible typo.
pub fn nearest_id<'a>(target: &str, known: &'a [String]) -> Option<&'a str> {
    known
        .iter()
        .map(|candidate| (strsim::jaro_winkler(target, candidate), candidate))
        .filter(|(score, _)| *score > 0.8)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, candidate)| candidate.as_str())
}

// Flat JSON shapes; core types carry paths and enums that have no stable
// wire form.

#[derive(Debug, Facet)]
struct JsonReport {
    suites: Vec<JsonSuite>,
    failures: Vec<JsonFailure>,
}

#[derive(Debug, Facet)]
struct JsonSuite {
    name: String,
    qualifier: Option<String>,
    directory: String,
    disabled: bool,
    clean_text: String,
    highlights: Vec<JsonHighlight>,
    cases: Vec<JsonCase>,
}

#[derive(Debug, Facet)]
struct JsonHighlight {
    start: usize,
    end: usize,
}

#[derive(Debug, Facet)]
struct JsonCase {
    kind: String,
    name: String,
    input_text: Option<String>,
    reference_index: Option<usize>,
    declaration_index: Option<usize>,
    context_indexes: Option<Vec<usize>>,
}

#[derive(Debug, Facet)]
struct JsonFailure {
    name: String,
    directory: String,
    stage: String,
    message: String,
}

/// Serialize one suite to pretty-printed JSON.
pub fn suite_to_json(suite: &TestSuite) -> String {
    facet_json::to_string_pretty(&json_suite(suite)).expect("JSON serialization failed")
}

fn render_json(generated: &GeneratedSuites) -> String {
    let report = JsonReport {
        suites: generated.suites.iter().map(json_suite).collect(),
        failures: generated
            .failures
            .iter()
            .map(|failure| JsonFailure {
                name: failure.name.clone(),
                directory: failure.directory.display().to_string(),
                stage: failure.error.kind().as_str().to_string(),
                message: failure.error.to_string(),
            })
            .collect(),
    };

    facet_json::to_string_pretty(&report).expect("JSON serialization failed")
}

fn json_suite(suite: &TestSuite) -> JsonSuite {
    JsonSuite {
        name: suite.name.clone(),
        qualifier: suite.qualifier.clone(),
        directory: suite.directory.display().to_string(),
        disabled: suite.disabled,
        clean_text: suite.clean_text.clone(),
        highlights: suite
            .highlights
            .iter()
            .map(|highlight| JsonHighlight {
                start: highlight.start,
                end: highlight.end,
            })
            .collect(),
        cases: suite.cases.iter().map(json_case).collect(),
    }
}

fn json_case(case: &TestCase) -> JsonCase {
    match case {
        TestCase::Parse { name, .. } => JsonCase {
            kind: "parse".to_string(),
            name: name.clone(),
            input_text: None,
            reference_index: None,
            declaration_index: None,
            context_indexes: None,
        },
        TestCase::Analysis { name, variant, .. } => JsonCase {
            kind: format!("analysis:{variant}"),
            name: name.clone(),
            input_text: None,
            reference_index: None,
            declaration_index: None,
            context_indexes: None,
        },
        TestCase::ReferenceResolution {
            name,
            input_text,
            reference_index,
            declaration_index,
            context_indexes,
            ..
        } => JsonCase {
            kind: "resolution".to_string(),
            name: name.clone(),
            input_text: Some(input_text.clone()),
            reference_index: Some(*reference_index),
            declaration_index: Some(*declaration_index),
            context_indexes: Some(context_indexes.clone()),
        },
    }
}

fn count_cases(suite: &TestSuite, predicate: impl Fn(&TestCase) -> bool) -> usize {
    suite.cases.iter().filter(|case| predicate(case)).count()
}
