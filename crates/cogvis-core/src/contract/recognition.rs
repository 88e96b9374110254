//! Asynchronous text recognition contracts.
//!
//! Handwritten and printed text recognition runs as a long-lived operation on
//! the service: submission returns a [`TextOperation`] handle, and the handle
//! is queried until the returned [`TextOperationResult`] reaches a terminal
//! [`OperationStatus`].

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};

use super::null_as_default;
use crate::{Error, Result};

/// Recognition mode requested at submission time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[derive(Serialize, Deserialize, AsRefStr, Display, EnumString, IntoStaticStr)]
pub enum TextRecognitionMode {
    /// Cursive or hand printed text.
    Handwritten,
    /// Machine printed text.
    #[default]
    Printed,
}

/// Status of a submitted text recognition operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize, AsRefStr, Display, EnumString, IntoStaticStr)]
pub enum OperationStatus {
    /// Accepted by the service but not picked up yet.
    NotStarted,
    /// Currently being processed.
    Running,
    /// Finished with recognized content.
    Succeeded,
    /// Finished without content.
    Failed,
}

impl OperationStatus {
    /// Returns `true` for `Succeeded` and `Failed`.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

/// Handle of a submitted text recognition operation.
///
/// The location is the opaque URL returned by the service in the
/// `Operation-Location` header; it is the only key needed to query the
/// operation afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TextOperation {
    location: String,
}

impl TextOperation {
    /// Creates a handle from the location returned at submission.
    ///
    /// # Errors
    ///
    /// Returns an invalid input error if the location is empty or blank.
    pub fn new(location: impl Into<String>) -> Result<Self> {
        let location = location.into();
        if location.trim().is_empty() {
            return Err(Error::invalid_input().with_message("Operation location must not be empty"));
        }

        Ok(Self { location })
    }

    /// Returns the operation location.
    pub fn location(&self) -> &str {
        &self.location
    }
}

impl TryFrom<String> for TextOperation {
    type Error = Error;

    fn try_from(location: String) -> Result<Self> {
        Self::new(location)
    }
}

impl From<TextOperation> for String {
    fn from(operation: TextOperation) -> Self {
        operation.location
    }
}

impl std::fmt::Display for TextOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.location)
    }
}

/// Polled state of a [`TextOperation`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextOperationResult {
    /// Current status of the operation.
    pub status: OperationStatus,
    /// Recognized content, only present once the operation succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recognition_result: Option<RecognitionResult>,
}

impl TextOperationResult {
    /// Creates a non-terminal result with the given status.
    pub fn pending(status: OperationStatus) -> Self {
        Self {
            status,
            recognition_result: None,
        }
    }

    /// Creates a successful result carrying the recognized content.
    pub fn succeeded(recognition_result: RecognitionResult) -> Self {
        Self {
            status: OperationStatus::Succeeded,
            recognition_result: Some(recognition_result),
        }
    }

    /// Creates a failed result.
    pub fn failed() -> Self {
        Self::pending(OperationStatus::Failed)
    }

    /// Returns `true` once no further queries are needed.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Returns `true` if the operation succeeded.
    #[must_use]
    pub fn is_succeeded(&self) -> bool {
        self.status == OperationStatus::Succeeded
    }

    /// Normalizes the content to the status.
    ///
    /// Content is dropped for every status other than `Succeeded`, and a
    /// success that arrived without a body gets an empty line sequence.
    pub fn normalized(mut self) -> Self {
        if self.is_succeeded() {
            self.recognition_result.get_or_insert_with(RecognitionResult::default);
        } else {
            self.recognition_result = None;
        }
        self
    }
}

/// Recognized content of a successful operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognitionResult {
    /// Recognized lines in reading order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub lines: Vec<TextLine>,
}

impl RecognitionResult {
    /// Creates content from recognized lines.
    pub fn new(lines: Vec<TextLine>) -> Self {
        Self { lines }
    }

    /// Renders the words of every line separated by spaces, one line per row.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(TextLine::words_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A recognized line of text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextLine {
    /// Full text of the line.
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    /// Bounding polygon as flattened `x, y` pairs, e.g. `[153, 579, 1310, 550, ...]`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub bounding_box: Vec<i32>,
    /// Words of the line.
    #[serde(default, deserialize_with = "null_as_default")]
    pub words: Vec<TextWord>,
}

impl TextLine {
    /// Creates a line from its text, polygon and words.
    pub fn new(text: impl Into<String>, bounding_box: Vec<i32>, words: Vec<TextWord>) -> Self {
        Self {
            text: text.into(),
            bounding_box,
            words,
        }
    }

    /// Returns the bounding polygon as coordinate pairs.
    pub fn polygon(&self) -> Vec<(i32, i32)> {
        pairs(&self.bounding_box)
    }

    fn words_text(&self) -> String {
        self.words
            .iter()
            .map(|word| word.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A recognized word.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextWord {
    /// Text of the word.
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    /// Bounding polygon as flattened `x, y` pairs.
    #[serde(default, deserialize_with = "null_as_default")]
    pub bounding_box: Vec<i32>,
}

impl TextWord {
    /// Creates a word from its text and polygon.
    pub fn new(text: impl Into<String>, bounding_box: Vec<i32>) -> Self {
        Self {
            text: text.into(),
            bounding_box,
        }
    }

    /// Returns the bounding polygon as coordinate pairs.
    pub fn polygon(&self) -> Vec<(i32, i32)> {
        pairs(&self.bounding_box)
    }
}

// A trailing odd coordinate is ignored.
fn pairs(flat: &[i32]) -> Vec<(i32, i32)> {
    flat.chunks_exact(2).map(|pair| (pair[0], pair[1])).collect()
}
