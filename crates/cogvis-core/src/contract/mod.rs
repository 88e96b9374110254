//! Wire contracts of the vision REST API.
//!
//! Every type here mirrors a JSON payload exchanged with the service. Field
//! names are camelCase on the wire; optional sections deserialize to `None`
//! and list-valued fields tolerate both a missing key and an explicit `null`.

mod analysis;
mod image;
mod model;
mod ocr;
mod recognition;

pub use analysis::{
    Adult, AnalysisInDomainResult, AnalysisResult, Caption, Category, Color, Description, Detail,
    Face, FaceRectangle, ImageMetadata, ImageType, Tag, VisualFeature,
};
pub use image::{ImageSource, MAX_THUMBNAIL_EDGE, ThumbnailRequest};
pub use model::{Model, ModelDescription, ModelResult};
pub use ocr::{Ocr, OcrLine, OcrRectangle, OcrRegion, OcrWord};
pub use recognition::{
    OperationStatus, RecognitionResult, TextLine, TextOperation, TextOperationResult,
    TextRecognitionMode, TextWord,
};

use serde::{Deserialize, Deserializer};

/// Deserializes a value that may be `null`, falling back to its default.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Joins enum values into the comma separated form used by query parameters.
pub fn join_params<T: AsRef<str>>(values: &[T]) -> Option<String> {
    if values.is_empty() {
        return None;
    }

    let joined = values
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(",");
    Some(joined)
}
