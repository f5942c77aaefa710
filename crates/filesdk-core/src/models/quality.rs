//! Quality specifiers
//!
//! A quality is a positive number with two meanings:
//!
//! - `> 1`: absolute target width in pixels, height follows the aspect ratio
//! - `(0, 1]`: scale factor for both dimensions, also used as the encode
//!   quality (`factor × 100`)
//!
//! `1` is the untouched original and is always part of a [`QualitySet`].

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};

use crate::error::SdkError;

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Quality(f64);

impl Quality {
    pub const ORIGINAL: Quality = Quality(1.0);

    pub fn new(value: f64) -> Result<Self, SdkError> {
        if !value.is_finite() || value <= 0.0 {
            return Err(SdkError::InvalidArgument(format!(
                "quality must be a positive number, got {}",
                value
            )));
        }
        Ok(Quality(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn is_original(self) -> bool {
        self.0 == 1.0
    }

    /// `true` when the quality names an absolute pixel width.
    pub fn is_absolute_width(self) -> bool {
        self.0 > 1.0
    }

    /// Output dimensions for a source image of `width` x `height`.
    pub fn target_dimensions(self, width: u32, height: u32) -> (u32, u32) {
        if self.is_absolute_width() {
            let target_width = self.0.round().max(1.0) as u32;
            let aspect_ratio = height as f64 / width.max(1) as f64;
            let target_height = (target_width as f64 * aspect_ratio).round().max(1.0) as u32;
            (target_width, target_height)
        } else {
            let w = (width as f64 * self.0).round().max(1.0) as u32;
            let h = (height as f64 * self.0).round().max(1.0) as u32;
            (w, h)
        }
    }

    /// Encoder quality (1-100) for scale qualities; `None` keeps the codec default.
    pub fn encode_quality(self) -> Option<u8> {
        if self.is_absolute_width() {
            None
        } else {
            Some((self.0 * 100.0).round().clamp(1.0, 100.0) as u8)
        }
    }

    /// File name suffix: empty for the original, `@{width}` or `@{percent}pc`.
    pub fn suffix(self) -> String {
        if self.is_original() {
            String::new()
        } else if self.is_absolute_width() {
            format!("@{}", self.0)
        } else {
            format!("@{}pc", shift_point(&self.0.to_string(), 2))
        }
    }

    /// Parse a suffix produced by [`Quality::suffix`].
    pub fn from_suffix(suffix: &str) -> Option<Quality> {
        if suffix.is_empty() {
            return Some(Quality::ORIGINAL);
        }
        let body = suffix.strip_prefix('@')?;
        let (digits, percent) = match body.strip_suffix("pc") {
            Some(digits) => (digits, true),
            None => (body, false),
        };
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit() || c == '.') {
            return None;
        }
        let value = if percent {
            shift_point(digits, -2).parse::<f64>().ok()?
        } else {
            digits.parse::<f64>().ok()?
        };
        let quality = Quality::new(value).ok()?;
        // Reject spellings `suffix` would never produce ("@050pc", "@200.0").
        (quality.suffix() == suffix).then_some(quality)
    }
}

impl TryFrom<f64> for Quality {
    type Error = SdkError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Quality::new(value)
    }
}

impl From<Quality> for f64 {
    fn from(q: Quality) -> Self {
        q.0
    }
}

impl Display for Quality {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

/// Move the decimal point of a plain decimal string by `places` (positive:
/// right). Working on the shortest `f64` spelling keeps the conversion
/// exact, so `0.5000001` becomes `50.00001` and back without rounding.
fn shift_point(decimal: &str, places: i32) -> String {
    let (int_part, frac_part) = decimal.split_once('.').unwrap_or((decimal, ""));
    let mut digits = format!("{}{}", int_part, frac_part);
    let mut point = int_part.len() as i32 + places;

    if point < 1 {
        digits.insert_str(0, &"0".repeat((1 - point) as usize));
        point = 1;
    }
    if point as usize > digits.len() {
        digits.push_str(&"0".repeat(point as usize - digits.len()));
    }

    let (int_part, frac_part) = digits.split_at(point as usize);
    let int_part = match int_part.trim_start_matches('0') {
        "" => "0",
        trimmed => trimmed,
    };
    let frac_part = frac_part.trim_end_matches('0');
    if frac_part.is_empty() {
        int_part.to_string()
    } else {
        format!("{}.{}", int_part, frac_part)
    }
}

/// Distinct qualities of one upload, original first.
///
/// Duplicates collapse by exact numeric equality only.
#[derive(Debug, Clone, PartialEq)]
pub struct QualitySet(Vec<Quality>);

impl QualitySet {
    pub fn from_values(values: &[f64]) -> Result<Self, SdkError> {
        let mut qualities = vec![Quality::ORIGINAL];
        for value in values {
            let quality = Quality::new(*value)?;
            if qualities.contains(&quality) {
                continue;
            }
            if let Some(clash) = qualities.iter().find(|q| q.suffix() == quality.suffix()) {
                return Err(SdkError::InvalidArgument(format!(
                    "qualities {} and {} map to the same object name",
                    clash, quality
                )));
            }
            qualities.push(quality);
        }
        Ok(QualitySet(qualities))
    }

    pub fn original_only() -> Self {
        QualitySet(vec![Quality::ORIGINAL])
    }

    pub fn iter(&self) -> impl Iterator<Item = Quality> + '_ {
        self.0.iter().copied()
    }

    /// Every quality except the original.
    pub fn derived(&self) -> impl Iterator<Item = Quality> + '_ {
        self.iter().filter(|q| !q.is_original())
    }

    /// Numerically smallest quality.
    pub fn thumbnail(&self) -> Quality {
        self.iter()
            .fold(Quality::ORIGINAL, |min, q| if q < min { q } else { min })
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, quality: Quality) -> bool {
        self.0.contains(&quality)
    }
}

impl Default for QualitySet {
    fn default() -> Self {
        QualitySet::original_only()
    }
}
