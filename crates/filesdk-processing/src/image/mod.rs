//! Image decoding, resizing and re-encoding for variant generation.

pub mod resize;

pub use resize::{ImageResize, SourceImage};
