//! Subcommands.
//!
//! Each subcommand maps onto one vision operation; `recognize` submits a text
//! operation and polls it until it finishes.

mod output;
mod recognize;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Subcommand};
use cogvis_core::contract::{
    Detail, ImageSource, Model, TextRecognitionMode, ThumbnailRequest, VisualFeature,
};
use cogvis_core::{AUTO_DETECT_LANGUAGE, PollPolicy, VisionService};

use self::output::Output;
use crate::TRACING_TARGET_COMMAND;

/// Image given on the command line.
#[derive(Debug, Clone, Args)]
#[group(required = true, multiple = false)]
pub struct ImageArgs {
    /// Publicly reachable image URL
    #[arg(long)]
    pub url: Option<String>,

    /// Local image file
    #[arg(long)]
    pub file: Option<PathBuf>,
}

impl ImageArgs {
    /// Loads the image source.
    pub async fn load(&self) -> anyhow::Result<ImageSource> {
        match (&self.url, &self.file) {
            (Some(url), _) => ImageSource::from_url(url).context("invalid --url"),
            (None, Some(path)) => ImageSource::from_file(path)
                .await
                .with_context(|| format!("failed to load {}", path.display())),
            (None, None) => anyhow::bail!("either --url or --file is required"),
        }
    }
}

/// Vision operations.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Extracts visual features from an image.
    Analyze {
        #[command(flatten)]
        image: ImageArgs,

        /// Comma separated visual features
        #[arg(
            long,
            value_delimiter = ',',
            default_value = "Categories,Tags,Description,Faces,ImageType,Color,Adult"
        )]
        features: Vec<VisualFeature>,

        /// Comma separated domain specific details
        #[arg(long, value_delimiter = ',')]
        details: Vec<Detail>,
    },

    /// Runs a domain specific model on an image.
    AnalyzeDomain {
        #[command(flatten)]
        image: ImageArgs,

        /// Model name, see the `models` command
        #[arg(long, default_value_t = Model::Celebrities.to_string())]
        model: String,
    },

    /// Generates captions for an image.
    Describe {
        #[command(flatten)]
        image: ImageArgs,

        /// Maximum number of candidate captions
        #[arg(long, default_value_t = 1)]
        max_candidates: u32,
    },

    /// Lists the domain specific models.
    Models,

    /// Recognizes printed text synchronously.
    Ocr {
        #[command(flatten)]
        image: ImageArgs,

        /// BCP-47 language code, `unk` to detect it
        #[arg(long, default_value = AUTO_DETECT_LANGUAGE)]
        language: String,

        /// Detects the text orientation
        #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
        detect_orientation: bool,
    },

    /// Recognizes handwritten or printed text, polling until the operation finishes.
    Recognize {
        #[command(flatten)]
        image: ImageArgs,

        /// Recognition mode
        #[arg(long, default_value_t = TextRecognitionMode::Handwritten)]
        mode: TextRecognitionMode,
    },

    /// Generates a thumbnail.
    Thumbnail {
        #[command(flatten)]
        image: ImageArgs,

        /// Thumbnail width in pixels
        #[arg(long)]
        width: u32,

        /// Thumbnail height in pixels
        #[arg(long)]
        height: u32,

        /// Crops around the region of interest
        #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
        smart_cropping: bool,

        /// File the thumbnail is written to
        #[arg(long, short)]
        output: PathBuf,
    },
}

impl Command {
    /// Returns the subcommand name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Analyze { .. } => "analyze",
            Self::AnalyzeDomain { .. } => "analyze-domain",
            Self::Describe { .. } => "describe",
            Self::Models => "models",
            Self::Ocr { .. } => "ocr",
            Self::Recognize { .. } => "recognize",
            Self::Thumbnail { .. } => "thumbnail",
        }
    }

    /// Runs the command and prints its result.
    pub async fn run(
        &self,
        service: &VisionService,
        policy: &PollPolicy,
        text: bool,
    ) -> anyhow::Result<()> {
        tracing::debug!(target: TRACING_TARGET_COMMAND, command = self.name(), "Running command");

        let output = match self {
            Self::Analyze {
                image,
                features,
                details,
            } => {
                let image = image.load().await?;
                let result = service.analyze_image(&image, features, details).await?;
                Output::analysis(result)?
            }
            Self::AnalyzeDomain { image, model } => {
                let image = image.load().await?;
                let result = service.analyze_image_in_domain(&image, model).await?;
                Output::json(&result)?
            }
            Self::Describe {
                image,
                max_candidates,
            } => {
                let image = image.load().await?;
                let result = service.describe(&image, *max_candidates).await?;
                Output::analysis(result)?
            }
            Self::Models => Output::models(service.list_models().await?)?,
            Self::Ocr {
                image,
                language,
                detect_orientation,
            } => {
                let image = image.load().await?;
                let result = service
                    .recognize_printed_text(&image, language, *detect_orientation)
                    .await?;
                Output::ocr(result)?
            }
            Self::Recognize { image, mode } => {
                let image = image.load().await?;
                let result = recognize::run(service, image, *mode, *policy).await?;
                Output::recognition(result)?
            }
            Self::Thumbnail {
                image,
                width,
                height,
                smart_cropping,
                output,
            } => {
                let image = image.load().await?;
                let request =
                    ThumbnailRequest::new(*width, *height).with_smart_cropping(*smart_cropping);
                let bytes = service.generate_thumbnail(&image, &request).await?;

                tokio::fs::write(output, &bytes)
                    .await
                    .with_context(|| format!("failed to write {}", output.display()))?;

                Output::written(output, bytes.len())?
            }
        };

        output.print(text)
    }
}
