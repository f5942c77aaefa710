//! filesdk Processing Library
//!
//! Turns one uploaded buffer into the set of variants requested for it:
//! the untouched original plus one resized/recompressed rendition per extra
//! quality. Anything that is not a decodable image is passed through as the
//! original only.

pub mod compression;
pub mod image;
pub mod mime;

pub use compression::{CompressionEngine, CompressionOutcome, EncodedVariant, Expansion, SkipReason};
pub use mime::{resolve_mime_type, DEFAULT_MIME_TYPE};

use thiserror::Error;

/// Failures while rendering a single variant.
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode {format} variant: {message}")]
    Encode { format: String, message: String },

    #[error("Variant too large: {width}x{height} exceeds {max_pixels} pixels")]
    TooLarge { width: u32, height: u32, max_pixels: u64 },

    #[error("Variant task failed: {0}")]
    Task(String),
}
