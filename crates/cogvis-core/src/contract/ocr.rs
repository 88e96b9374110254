//! Synchronous printed text recognition (`/ocr`) contracts.

use serde::{Deserialize, Serialize};

use super::null_as_default;

/// Result of `/ocr`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ocr {
    /// BCP-47 language code detected or requested.
    #[serde(default)]
    pub language: String,
    /// Angle in degrees the text was rotated by, when orientation detection ran.
    #[serde(default)]
    pub text_angle: Option<f64>,
    /// Detected orientation: `Up`, `Down`, `Left`, `Right` or `NotDetected`.
    #[serde(default)]
    pub orientation: String,
    /// Text regions in reading order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub regions: Vec<OcrRegion>,
}

impl Ocr {
    /// Renders all recognized words, space separated, one line per row and
    /// a blank row between regions.
    pub fn text(&self) -> String {
        self.regions
            .iter()
            .map(OcrRegion::text)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// A block of text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrRegion {
    /// Bounding box as `"x,y,width,height"`.
    #[serde(default)]
    pub bounding_box: String,
    /// Lines of the region.
    #[serde(default, deserialize_with = "null_as_default")]
    pub lines: Vec<OcrLine>,
}

impl OcrRegion {
    /// Returns the parsed bounding box.
    pub fn rectangle(&self) -> Option<OcrRectangle> {
        OcrRectangle::parse(&self.bounding_box)
    }

    fn text(&self) -> String {
        self.lines
            .iter()
            .map(OcrLine::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A line of text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrLine {
    /// Bounding box as `"x,y,width,height"`.
    #[serde(default)]
    pub bounding_box: String,
    /// Words of the line.
    #[serde(default, deserialize_with = "null_as_default")]
    pub words: Vec<OcrWord>,
}

impl OcrLine {
    /// Returns the parsed bounding box.
    pub fn rectangle(&self) -> Option<OcrRectangle> {
        OcrRectangle::parse(&self.bounding_box)
    }

    /// Returns the words of the line separated by spaces.
    pub fn text(&self) -> String {
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
pub struct OcrWord {
    /// Bounding box as `"x,y,width,height"`.
    #[serde(default)]
    pub bounding_box: String,
    /// Text of the word.
    #[serde(default)]
    pub text: String,
}

impl OcrWord {
    /// Returns the parsed bounding box.
    pub fn rectangle(&self) -> Option<OcrRectangle> {
        OcrRectangle::parse(&self.bounding_box)
    }
}

/// Parsed `"x,y,width,height"` bounding box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OcrRectangle {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl OcrRectangle {
    /// Parses the service's comma separated rectangle form.
    pub fn parse(value: &str) -> Option<Self> {
        let mut parts = value.split(',').map(str::trim);

        let rectangle = Self {
            x: parts.next()?.parse().ok()?,
            y: parts.next()?.parse().ok()?,
            width: parts.next()?.parse().ok()?,
            height: parts.next()?.parse().ok()?,
        };

        parts.next().is_none().then_some(rectangle)
    }
}
