//! Builtin capability implementations.
//!
//! Each builtin is a thin text-to-text adapter configured once, at
//! construction, from its descriptor parameter map.

use std::path::PathBuf;

use async_trait::async_trait;
use loom_config::ParamMap;
use serde_json::Value;

use crate::tool::{Tool, ToolError, ToolResult};

/// Extractive summarizer that keeps leading sentences within a word budget.
#[derive(Debug)]
pub struct Summarizer {
    max_length: usize,
}

impl Summarizer {
    const DEFAULT_MAX_LENGTH: usize = 150;

    /// Creates a summarizer from descriptor parameters.
    ///
    /// Recognised parameters: `max_length` (word budget, positive integer).
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::InvalidParams`] when `max_length` is present but
    /// not a positive integer.
    pub fn from_params(params: &ParamMap) -> ToolResult<Self> {
        let max_length = match params.get("max_length") {
            None => Self::DEFAULT_MAX_LENGTH,
            Some(Value::Number(number)) if number.as_u64().is_some_and(|n| n > 0) => {
                usize::try_from(number.as_u64().unwrap_or(0)).unwrap_or(usize::MAX)
            }
            Some(other) => {
                return Err(ToolError::InvalidParams {
                    name: "summarizer".into(),
                    reason: format!("max_length must be a positive integer, got {other}"),
                });
            }
        };
        Ok(Self { max_length })
    }

    /// Returns the configured word budget.
    #[must_use]
    pub const fn max_length(&self) -> usize {
        self.max_length
    }
}

#[async_trait]
impl Tool for Summarizer {
    async fn run(&self, input: &str) -> ToolResult<String> {
        let mut words = 0usize;
        let mut summary = String::new();

        for sentence in split_sentences(input) {
            let sentence_words = sentence.split_whitespace().count();
            if words + sentence_words > self.max_length && words > 0 {
                break;
            }
            if !summary.is_empty() {
                summary.push(' ');
            }
            summary.push_str(sentence.trim());
            words += sentence_words;
            if words >= self.max_length {
                break;
            }
        }

        // A single oversized sentence is cut at the word budget.
        if words > self.max_length {
            summary = summary
                .split_whitespace()
                .take(self.max_length)
                .collect::<Vec<_>>()
                .join(" ");
            summary.push('…');
        }

        Ok(summary)
    }
}

/// Converts plain text into lightweight markdown.
///
/// Existing markdown constructs (headings, list items) pass through; a short
/// standalone lead line is promoted to a section heading.
#[derive(Debug, Default)]
pub struct TextToMarkdown;

#[async_trait]
impl Tool for TextToMarkdown {
    async fn run(&self, input: &str) -> ToolResult<String> {
        let paragraphs: Vec<String> = input
            .split("\n\n")
            .map(|paragraph| {
                let trimmed = paragraph.trim();
                if trimmed.starts_with('#')
                    || trimmed.starts_with("- ")
                    || trimmed.starts_with("* ")
                {
                    trimmed.to_owned()
                } else if is_heading_candidate(trimmed) {
                    format!("## {trimmed}")
                } else {
                    trimmed.to_owned()
                }
            })
            .filter(|paragraph| !paragraph.is_empty())
            .collect();

        Ok(paragraphs.join("\n\n"))
    }
}

/// Loads the file named by the input text and returns its contents.
#[derive(Debug, Default)]
pub struct FileLoader {
    base_dir: Option<PathBuf>,
}

impl FileLoader {
    /// Creates a file loader from descriptor parameters.
    ///
    /// Recognised parameters: `base_dir` (directory resolved against relative
    /// input paths).
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::InvalidParams`] when `base_dir` is not a string.
    pub fn from_params(params: &ParamMap) -> ToolResult<Self> {
        let base_dir = match params.get("base_dir") {
            None => None,
            Some(Value::String(dir)) => Some(PathBuf::from(dir)),
            Some(other) => {
                return Err(ToolError::InvalidParams {
                    name: "file_loader".into(),
                    reason: format!("base_dir must be a string, got {other}"),
                });
            }
        };
        Ok(Self { base_dir })
    }
}

#[async_trait]
impl Tool for FileLoader {
    async fn run(&self, input: &str) -> ToolResult<String> {
        let path = input.trim();
        if path.is_empty() {
            return Err(ToolError::execution("file loader requires a path"));
        }

        let resolved = match &self.base_dir {
            Some(base) => base.join(path),
            None => PathBuf::from(path),
        };

        tokio::fs::read_to_string(&resolved).await.map_err(|err| {
            ToolError::execution(format!("failed to read `{}`: {err}", resolved.display()))
        })
    }
}

fn split_sentences(text: &str) -> impl Iterator<Item = &str> {
    text.split_inclusive(['.', '!', '?'])
        .map(str::trim)
        .filter(|sentence| !sentence.is_empty())
}

fn is_heading_candidate(paragraph: &str) -> bool {
    !paragraph.contains('\n')
        && paragraph.split_whitespace().count() <= 8
        && !paragraph.ends_with(['.', '!', '?', ':'])
        && !paragraph.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: serde_json::Value) -> ParamMap {
        value.as_object().cloned().unwrap_or_default()
    }

    #[tokio::test]
    async fn summarizer_respects_word_budget() {
        let summarizer =
            Summarizer::from_params(&params(json!({ "max_length": 10 }))).unwrap();
        let input = "One two three four five. Six seven eight nine ten. \
                     Eleven twelve thirteen fourteen fifteen.";

        let summary = summarizer.run(input).await.unwrap();
        assert!(summary.split_whitespace().count() <= 10);
        assert!(summary.contains("One two three"));
        assert!(!summary.contains("Eleven"));
    }

    #[tokio::test]
    async fn summarizer_defaults_to_150_words() {
        let summarizer = Summarizer::from_params(&ParamMap::new()).unwrap();
        assert_eq!(summarizer.max_length(), 150);
    }

    #[test]
    fn summarizer_rejects_bad_max_length() {
        let err = Summarizer::from_params(&params(json!({ "max_length": "ten" })))
            .expect_err("string budget should error");
        assert!(matches!(err, ToolError::InvalidParams { .. }));
    }

    #[tokio::test]
    async fn markdown_promotes_short_lead_lines() {
        let output = TextToMarkdown
            .run("Quarterly Findings\n\nRevenue grew in every region this quarter.")
            .await
            .unwrap();
        assert!(output.starts_with("## Quarterly Findings"));
        assert!(output.contains("Revenue grew"));
    }

    #[tokio::test]
    async fn markdown_preserves_existing_structure() {
        let input = "# Title\n\n- first\n- second";
        let output = TextToMarkdown.run(input).await.unwrap();
        assert_eq!(output, input);
    }

    #[tokio::test]
    async fn file_loader_reads_relative_to_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("note.txt"), "contents").unwrap();

        let loader = FileLoader::from_params(&params(
            json!({ "base_dir": dir.path().to_string_lossy() }),
        ))
        .unwrap();

        let output = loader.run("note.txt").await.unwrap();
        assert_eq!(output, "contents");
    }

    #[tokio::test]
    async fn file_loader_surfaces_missing_files() {
        let loader = FileLoader::from_params(&ParamMap::new()).unwrap();
        let err = loader
            .run("/definitely/not/here.txt")
            .await
            .expect_err("missing file should error");
        assert!(matches!(err, ToolError::Execution { .. }));
    }
}
