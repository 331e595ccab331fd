//! Output formatting for the `classify` report
//!
//! JSON and YAML are meant for scripts; the human format lines the files up
//! with the pattern that decided their category.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::classifier::{Category, FileClassification};

/// Output format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// YAML format
    Yaml,
    /// Human-readable formatted text
    Human,
}

/// Where the classified files came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileSource {
    Arguments,
    Git,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassifyReport {
    pub source: FileSource,
    pub rebuild: bool,
    pub files: Vec<FileClassification>,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format(&self, report: &ClassifyReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(report)
                .context("Failed to serialize classification to JSON"),
            OutputFormat::Yaml => serde_yaml::to_string(report)
                .context("Failed to serialize classification to YAML"),
            OutputFormat::Human => Ok(self.format_human(report)),
        }
    }

    fn format_human(&self, report: &ClassifyReport) -> String {
        let mut output = String::new();

        if report.files.is_empty() {
            output.push_str("No changed files\n");
        } else {
            let width = report
                .files
                .iter()
                .map(|file| file.path.chars().count())
                .max()
                .unwrap_or(0);

            for file in &report.files {
                output.push_str(&format!(
                    "  {:<9} {:<width$}  {}\n",
                    category_label(file.category),
                    file.path,
                    pattern_note(file),
                    width = width
                ));
            }
        }

        output.push('\n');
        if report.rebuild {
            output.push_str("Decision: rebuild required\n");
        } else {
            output.push_str("Decision: no rebuild needed\n");
        }
        output
    }
}

fn category_label(category: Category) -> &'static str {
    match category {
        Category::Rebuild => "rebuild",
        Category::Skip => "skip",
        Category::Unmatched => "unmatched",
    }
}

fn pattern_note(file: &FileClassification) -> String {
    match (&file.rebuild_pattern, &file.skip_pattern) {
        (Some(rebuild), _) => format!("({})", rebuild),
        (None, Some(skip)) => format!("({})", skip),
        (None, None) => String::new(),
    }
}
