//! Image analysis contracts.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use super::null_as_default;

/// Visual features that can be requested from `/analyze`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize, AsRefStr, Display, EnumString)]
pub enum VisualFeature {
    /// Category taxonomy classification.
    Categories,
    /// Content tags.
    Tags,
    /// Human readable captions.
    Description,
    /// Face detection with age and gender.
    Faces,
    /// Clip art and line drawing detection.
    ImageType,
    /// Dominant and accent colors.
    Color,
    /// Adult and racy content detection.
    Adult,
}

/// Domain specific details that can be requested from `/analyze`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize, AsRefStr, Display, EnumString)]
pub enum Detail {
    /// Celebrity recognition.
    Celebrities,
    /// Landmark recognition.
    Landmarks,
}

/// Result of `/analyze` and `/describe`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Request identifier assigned by the service.
    #[serde(default)]
    pub request_id: Option<String>,
    /// Dimensions and format of the analyzed image.
    #[serde(default)]
    pub metadata: Option<ImageMetadata>,
    /// Clip art and line drawing classification.
    #[serde(default)]
    pub image_type: Option<ImageType>,
    /// Color analysis.
    #[serde(default)]
    pub color: Option<Color>,
    /// Adult content classification.
    #[serde(default)]
    pub adult: Option<Adult>,
    /// Category taxonomy matches.
    #[serde(default, deserialize_with = "null_as_default")]
    pub categories: Vec<Category>,
    /// Detected faces.
    #[serde(default, deserialize_with = "null_as_default")]
    pub faces: Vec<Face>,
    /// Content tags.
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<Tag>,
    /// Captions and description tags.
    #[serde(default)]
    pub description: Option<Description>,
}

impl AnalysisResult {
    /// Returns the caption with the highest confidence, if any.
    pub fn best_caption(&self) -> Option<&Caption> {
        self.description
            .as_ref()?
            .captions
            .iter()
            .max_by(|a, b| a.confidence.total_cmp(&b.confidence))
    }
}

/// Result of `/models/{model}/analyze`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisInDomainResult {
    /// Request identifier assigned by the service.
    #[serde(default)]
    pub request_id: Option<String>,
    /// Dimensions and format of the analyzed image.
    #[serde(default)]
    pub metadata: Option<ImageMetadata>,
    /// Model specific result, e.g. `{"celebrities": [...]}`.
    #[serde(default)]
    pub result: serde_json::Value,
}

/// Dimensions and format of an image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMetadata {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Image format, e.g. `Jpeg`.
    #[serde(default)]
    pub format: String,
}

/// Clip art and line drawing classification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageType {
    /// 0 (non clip art) to 3 (good clip art).
    pub clip_art_type: u8,
    /// 0 (non line drawing) or 1 (line drawing).
    pub line_drawing_type: u8,
}

/// Color analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Color {
    /// Dominant foreground color name.
    #[serde(default)]
    pub dominant_color_foreground: String,
    /// Dominant background color name.
    #[serde(default)]
    pub dominant_color_background: String,
    /// All dominant color names.
    #[serde(default, deserialize_with = "null_as_default")]
    pub dominant_colors: Vec<String>,
    /// Accent color as a hex triplet without `#`.
    #[serde(default)]
    pub accent_color: String,
    /// Whether the image is black and white.
    #[serde(default, rename = "isBWImg")]
    pub is_bw_img: bool,
}

/// Adult content classification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Adult {
    /// Whether the image is classified as adult content.
    pub is_adult_content: bool,
    /// Whether the image is classified as racy.
    pub is_racy_content: bool,
    /// Adult score between 0 and 1.
    pub adult_score: f64,
    /// Racy score between 0 and 1.
    pub racy_score: f64,
}

/// A category taxonomy match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Category name, e.g. `people_portrait`.
    pub name: String,
    /// Confidence between 0 and 1.
    pub score: f64,
    /// Domain specific detail (celebrities, landmarks).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<serde_json::Value>,
}

/// A detected face.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Face {
    /// Estimated age.
    pub age: u32,
    /// Estimated gender.
    #[serde(default)]
    pub gender: String,
    /// Face location.
    pub face_rectangle: FaceRectangle,
}

/// Axis aligned rectangle of a detected face.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceRectangle {
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
}

/// A content tag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    /// Tag name.
    pub name: String,
    /// Confidence between 0 and 1.
    pub confidence: f64,
    /// Optional disambiguation hint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

/// Captions and description tags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Description {
    /// Description tags.
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    /// Candidate captions.
    #[serde(default, deserialize_with = "null_as_default")]
    pub captions: Vec<Caption>,
}

/// A candidate caption.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Caption {
    /// Caption text.
    pub text: String,
    /// Confidence between 0 and 1.
    pub confidence: f64,
}
