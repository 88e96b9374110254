//! Domain model contracts.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use super::null_as_default;

/// Domain specific models known to the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize, AsRefStr, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Model {
    /// Celebrity recognition.
    Celebrities,
    /// Landmark recognition.
    Landmarks,
}

/// Result of `GET /models`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelResult {
    /// Available models.
    #[serde(default, deserialize_with = "null_as_default")]
    pub models: Vec<ModelDescription>,
}

impl ModelResult {
    /// Returns the model with the given name.
    pub fn find(&self, name: &str) -> Option<&ModelDescription> {
        self.models.iter().find(|model| model.name == name)
    }
}

/// A model and the categories it applies to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescription {
    /// Model name as used in `/models/{name}/analyze`.
    pub name: String,
    /// Categories the model applies to.
    #[serde(default, deserialize_with = "null_as_default")]
    pub categories: Vec<String>,
}
