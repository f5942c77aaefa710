//! Variant generation.
//!
//! [`CompressionEngine::expand`] never fails: when the input is not an image,
//! cannot be decoded, or any single rendition fails, the result collapses to
//! the original bytes alone and the reason is reported through
//! [`CompressionOutcome::Skipped`].

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use filesdk_core::{Quality, QualitySet};
use futures::future::join_all;
use image::ImageFormat;

use crate::image::{ImageResize, SourceImage};
use crate::ProcessingError;

/// One engine output: the bytes to store for a quality.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedVariant {
    pub quality: Quality,
    pub bytes: Bytes,
}

/// Why an expansion fell back to the original only.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// Not recognised as an image format this build can re-encode.
    NotAnImage,
    /// Recognised as an image but decoding failed (truncated, corrupt).
    Undecodable(String),
    /// At least one requested rendition could not be produced.
    VariantFailed(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::NotAnImage => write!(f, "not an image"),
            SkipReason::Undecodable(e) => write!(f, "undecodable image: {}", e),
            SkipReason::VariantFailed(e) => write!(f, "variant failed: {}", e),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CompressionOutcome {
    /// Every requested quality was produced.
    Compressed,
    Skipped(SkipReason),
}

impl CompressionOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, CompressionOutcome::Skipped(_))
    }
}

#[derive(Debug, Clone)]
pub struct Expansion {
    /// Original first, then the derived qualities in request order.
    pub variants: Vec<EncodedVariant>,
    pub outcome: CompressionOutcome,
    /// MIME type of the detected image format, if any.
    pub mime_type: Option<String>,
}

impl Expansion {
    fn original_only(data: Bytes, reason: SkipReason, mime_type: Option<String>) -> Self {
        Expansion {
            variants: vec![EncodedVariant {
                quality: Quality::ORIGINAL,
                bytes: data,
            }],
            outcome: CompressionOutcome::Skipped(reason),
            mime_type,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CompressionEngine;

impl CompressionEngine {
    pub fn new() -> Self {
        CompressionEngine
    }

    /// Produce one variant per quality in `qualities`.
    ///
    /// Decoding and every rendition run on the blocking pool; renditions run
    /// concurrently and are all joined before returning.
    pub async fn expand(&self, data: Bytes, qualities: &QualitySet) -> Expansion {
        let format = match SourceImage::guess_format(&data) {
            Some(format) => format,
            None => {
                tracing::debug!(size_bytes = data.len(), "Upload is not an image, storing original only");
                return Expansion::original_only(data, SkipReason::NotAnImage, None);
            }
        };
        let mime_type = Some(format.to_mime_type().to_string());

        let derived: Vec<Quality> = qualities.derived().collect();
        if derived.is_empty() {
            return Expansion {
                variants: vec![EncodedVariant {
                    quality: Quality::ORIGINAL,
                    bytes: data,
                }],
                outcome: CompressionOutcome::Compressed,
                mime_type,
            };
        }

        let start = Instant::now();

        let source = match Self::decode(data.clone(), format).await {
            Ok(source) => Arc::new(source),
            Err(e) => {
                tracing::warn!(format = ?format, error = %e, "Image could not be decoded, storing original only");
                return Expansion::original_only(data, SkipReason::Undecodable(e.to_string()), mime_type);
            }
        };

        let tasks = derived.iter().map(|&quality| {
            let source = Arc::clone(&source);
            async move {
                tokio::task::spawn_blocking(move || ImageResize::render(&source, quality))
                    .await
                    .map_err(|e| ProcessingError::Task(e.to_string()))
                    .and_then(|rendered| rendered)
                    .map(|bytes| EncodedVariant {
                        quality,
                        bytes: Bytes::from(bytes),
                    })
            }
        });

        let mut variants = Vec::with_capacity(derived.len() + 1);
        variants.push(EncodedVariant {
            quality: Quality::ORIGINAL,
            bytes: data.clone(),
        });

        for result in join_all(tasks).await {
            match result {
                Ok(variant) => variants.push(variant),
                Err(e) => {
                    tracing::warn!(format = ?format, error = %e, "Variant generation failed, storing original only");
                    return Expansion::original_only(data, SkipReason::VariantFailed(e.to_string()), mime_type);
                }
            }
        }

        tracing::debug!(
            format = ?format,
            variants = variants.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Image variants generated"
        );

        Expansion {
            variants,
            outcome: CompressionOutcome::Compressed,
            mime_type,
        }
    }

    async fn decode(data: Bytes, format: ImageFormat) -> Result<SourceImage, ProcessingError> {
        tokio::task::spawn_blocking(move || SourceImage::decode(&data, format))
            .await
            .map_err(|e| ProcessingError::Task(e.to_string()))?
    }
}
