use std::io::Cursor;

use filesdk_core::Quality;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader};

use crate::ProcessingError;

/// Largest rendition `render` will allocate, in pixels.
pub const MAX_VARIANT_PIXELS: u64 = 50_000_000;

/// A decoded upload together with the format it was stored in.
pub struct SourceImage {
    pub image: DynamicImage,
    pub format: ImageFormat,
}

impl SourceImage {
    /// Sniff the container format from the leading bytes.
    ///
    /// `None` means the buffer is not an image this build can handle.
    pub fn guess_format(data: &[u8]) -> Option<ImageFormat> {
        ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .ok()?
            .format()
            .filter(|f| f.reading_enabled() && f.writing_enabled())
    }

    pub fn decode(data: &[u8], format: ImageFormat) -> Result<Self, ProcessingError> {
        let image = ImageReader::with_format(Cursor::new(data), format)
            .decode()
            .map_err(|e| ProcessingError::Decode(e.to_string()))?;
        Ok(SourceImage { image, format })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

pub struct ImageResize;

impl ImageResize {
    /// Pick a resampling filter from the scale ratio: cheap filters for large
    /// downscales, Lanczos when staying close to the source size.
    pub fn select_filter(
        orig_width: u32,
        orig_height: u32,
        new_width: u32,
        new_height: u32,
    ) -> image::imageops::FilterType {
        let width_ratio = orig_width as f32 / new_width.max(1) as f32;
        let height_ratio = orig_height as f32 / new_height.max(1) as f32;
        let max_ratio = width_ratio.max(height_ratio);

        if max_ratio > 2.0 {
            image::imageops::FilterType::Triangle
        } else if max_ratio > 1.5 {
            image::imageops::FilterType::CatmullRom
        } else {
            image::imageops::FilterType::Lanczos3
        }
    }

    /// Resize `source` for `quality` and encode it in the source format.
    ///
    /// JPEG output uses the quality's encode quality when it has one; other
    /// codecs are lossless (or have no quality knob) and ignore it.
    pub fn render(source: &SourceImage, quality: Quality) -> Result<Vec<u8>, ProcessingError> {
        let (orig_width, orig_height) = source.dimensions();
        let (width, height) = quality.target_dimensions(orig_width, orig_height);
        if u64::from(width) * u64::from(height) > MAX_VARIANT_PIXELS {
            return Err(ProcessingError::TooLarge {
                width,
                height,
                max_pixels: MAX_VARIANT_PIXELS,
            });
        }
        let filter = Self::select_filter(orig_width, orig_height, width, height);
        let resized = source.image.resize_exact(width, height, filter);

        let encode_error = |e: image::ImageError| ProcessingError::Encode {
            format: format!("{:?}", source.format),
            message: e.to_string(),
        };

        let mut buffer = Vec::new();
        match source.format {
            ImageFormat::Jpeg => {
                let rgb = DynamicImage::ImageRgb8(resized.to_rgb8());
                let encoder = match quality.encode_quality() {
                    Some(q) => JpegEncoder::new_with_quality(&mut buffer, q),
                    None => JpegEncoder::new(&mut buffer),
                };
                rgb.write_with_encoder(encoder).map_err(encode_error)?;
            }
            ImageFormat::WebP => {
                // The WebP encoder only accepts 8-bit RGB(A).
                let rgba = DynamicImage::ImageRgba8(resized.to_rgba8());
                rgba.write_to(&mut Cursor::new(&mut buffer), ImageFormat::WebP)
                    .map_err(encode_error)?;
            }
            format => {
                resized
                    .write_to(&mut Cursor::new(&mut buffer), format)
                    .map_err(encode_error)?;
            }
        }

        Ok(buffer)
    }
}
