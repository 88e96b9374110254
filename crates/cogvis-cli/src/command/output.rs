//! Rendering of command results.

use std::path::Path;

use cogvis_core::contract::{AnalysisResult, ModelResult, Ocr, OperationStatus, TextOperationResult};
use serde::Serialize;
use serde_json::{Value, json};

/// Line printed when a text operation ends in `Failed`.
pub const RECOGNITION_FAILED: &str = "Error: Recognition Failed";

/// Result of a command, rendered as pretty JSON or plain text.
#[derive(Debug)]
pub struct Output {
    json: Value,
    text: Option<String>,
}

impl Output {
    /// Output without a dedicated text rendering.
    pub fn json<T: Serialize>(value: &T) -> anyhow::Result<Self> {
        Ok(Self {
            json: serde_json::to_value(value)?,
            text: None,
        })
    }

    fn with_text(mut self, text: String) -> Self {
        self.text = Some(text);
        self
    }

    /// Captions with their confidence, then tags.
    pub fn analysis(result: AnalysisResult) -> anyhow::Result<Self> {
        let mut lines = Vec::new();

        if let Some(description) = &result.description {
            for caption in &description.captions {
                lines.push(format!("{} ({:.2})", caption.text, caption.confidence));
            }
        }

        let tags = result
            .tags
            .iter()
            .map(|tag| tag.name.as_str())
            .chain(
                result
                    .description
                    .iter()
                    .flat_map(|description| description.tags.iter().map(String::as_str)),
            )
            .collect::<Vec<_>>();
        if !tags.is_empty() {
            lines.push(format!("Tags: {}", tags.join(", ")));
        }

        for category in &result.categories {
            lines.push(format!("Category: {} ({:.2})", category.name, category.score));
        }

        Ok(Self::json(&result)?.with_text(lines.join("\n")))
    }

    /// One model per line with its categories.
    pub fn models(result: ModelResult) -> anyhow::Result<Self> {
        let text = result
            .models
            .iter()
            .map(|model| format!("{}: {}", model.name, model.categories.join(", ")))
            .collect::<Vec<_>>()
            .join("\n");

        Ok(Self::json(&result)?.with_text(text))
    }

    /// Recognized words, one line per row.
    pub fn ocr(result: Ocr) -> anyhow::Result<Self> {
        let text = result.text();
        Ok(Self::json(&result)?.with_text(text))
    }

    /// Recognized lines, or [`RECOGNITION_FAILED`] for a failed operation.
    pub fn recognition(result: TextOperationResult) -> anyhow::Result<Self> {
        let text = match (&result.status, &result.recognition_result) {
            (OperationStatus::Succeeded, Some(content)) => content.text(),
            (OperationStatus::Succeeded, None) => String::new(),
            _ => RECOGNITION_FAILED.to_owned(),
        };

        Ok(Self::json(&result)?.with_text(text))
    }

    /// Summary of a file written to disk.
    pub fn written(path: &Path, bytes: usize) -> anyhow::Result<Self> {
        let output = Self {
            json: json!({ "output": path.display().to_string(), "bytes": bytes }),
            text: None,
        };
        Ok(output.with_text(format!("Wrote {bytes} bytes to {}", path.display())))
    }

    /// Renders the output; `text` selects the plain text rendering when one exists.
    pub fn render(&self, text: bool) -> anyhow::Result<String> {
        match (&self.text, text) {
            (Some(rendered), true) => Ok(rendered.clone()),
            _ => Ok(serde_json::to_string_pretty(&self.json)?),
        }
    }

    /// Prints the output to stdout.
    pub fn print(&self, text: bool) -> anyhow::Result<()> {
        println!("{}", self.render(text)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use cogvis_core::contract::{Caption, Description, RecognitionResult, Tag, TextLine, TextWord};

    use super::*;

    #[test]
    fn test_recognition_failed_line() {
        let output = Output::recognition(TextOperationResult::failed()).unwrap();
        assert_eq!(output.render(true).unwrap(), RECOGNITION_FAILED);

        let json: Value = serde_json::from_str(&output.render(false).unwrap()).unwrap();
        assert_eq!(json["status"], "Failed");
    }

    #[test]
    fn test_recognition_lines() {
        let content = RecognitionResult::new(vec![
            TextLine::new(
                "Hello world",
                vec![],
                vec![TextWord::new("Hello", vec![]), TextWord::new("world", vec![])],
            ),
            TextLine::new("again", vec![], vec![TextWord::new("again", vec![])]),
        ]);

        let output = Output::recognition(TextOperationResult::succeeded(content)).unwrap();
        assert_eq!(output.render(true).unwrap(), "Hello world\nagain");
    }

    #[test]
    fn test_analysis_text() {
        let result = AnalysisResult {
            tags: vec![Tag {
                name: "grass".to_owned(),
                confidence: 0.9,
                hint: None,
            }],
            description: Some(Description {
                tags: vec!["dog".to_owned()],
                captions: vec![Caption {
                    text: "a dog on grass".to_owned(),
                    confidence: 0.876,
                }],
            }),
            ..AnalysisResult::default()
        };

        let output = Output::analysis(result).unwrap();
        assert_eq!(
            output.render(true).unwrap(),
            "a dog on grass (0.88)\nTags: grass, dog"
        );
    }

    #[test]
    fn test_json_without_text_rendering() {
        let output = Output::json(&json!({"result": {}})).unwrap();
        assert_eq!(
            output.render(true).unwrap(),
            output.render(false).unwrap()
        );
    }

    #[test]
    fn test_written() {
        let output = Output::written(Path::new("thumb.jpg"), 42).unwrap();
        assert_eq!(output.render(true).unwrap(), "Wrote 42 bytes to thumb.jpg");
    }
}
