//! Configuration for conversions.
//!
//! Every knob lives in [`ConversionConfig`], built via
//! [`ConversionConfigBuilder`]. Per-request inputs (files, page range,
//! password) are *not* configuration; they travel in
//! [`crate::validate::ConversionParams`].

use crate::error::ConversionError;
use crate::progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

/// Configuration shared by all conversions.
///
/// # Example
/// ```rust
/// use pdfdesk::{ConversionConfig, PageSize};
///
/// let config = ConversionConfig::builder()
///     .dpi(150)
///     .jpeg_quality(90)
///     .page_size(PageSize::Letter)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Rendering DPI for PDF to JPG. Range: 72–600. Default: 200.
    pub dpi: u32,

    /// Cap on either dimension of a rendered page, in pixels. Default: 4000.
    ///
    /// Keeps a 200 DPI render of a poster-sized page from allocating
    /// gigabytes of pixels.
    pub max_rendered_pixels: u32,

    /// JPEG quality (1–100) for rendered pages and images embedded in PDFs. Default: 75.
    pub jpeg_quality: u8,

    /// Page size used when laying out DOCX text. Default: A4.
    pub page_size: PageSize,

    /// Margin on every side of a DOCX-to-PDF page, in points. Default: 40.
    pub margin_pt: f32,

    /// Font size for DOCX-to-PDF text, in points. Default: 12.
    pub font_size: f32,

    /// Explicit pdfium library path. If None, `PDFIUM_LIB_PATH`, the system
    /// library and the working directory are tried in that order.
    pub pdfium_library_path: Option<PathBuf>,

    /// Optional progress callback. If None, events are discarded.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            dpi: 200,
            max_rendered_pixels: 4000,
            jpeg_quality: 75,
            page_size: PageSize::default(),
            margin_pt: 40.0,
            font_size: 12.0,
            pdfium_library_path: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("dpi", &self.dpi)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("jpeg_quality", &self.jpeg_quality)
            .field("page_size", &self.page_size)
            .field("margin_pt", &self.margin_pt)
            .field("font_size", &self.font_size)
            .field("pdfium_library_path", &self.pdfium_library_path)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// The configured callback, or a no-op.
    pub(crate) fn progress(&self) -> ProgressCallback {
        match self.progress_callback {
            Some(ref cb) => Arc::clone(cb),
            None => Arc::new(NoopProgressCallback) as Arc<dyn ConversionProgressCallback>,
        }
    }
}

/// Builder for [`ConversionConfig`].
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl fmt::Debug for ConversionConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfigBuilder")
            .field("config", &self.config)
            .finish()
    }
}

impl ConversionConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(72, 600);
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.config.jpeg_quality = quality.clamp(1, 100);
        self
    }

    pub fn page_size(mut self, size: PageSize) -> Self {
        self.config.page_size = size;
        self
    }

    pub fn margin_pt(mut self, margin: f32) -> Self {
        self.config.margin_pt = margin;
        self
    }

    pub fn font_size(mut self, size: f32) -> Self {
        self.config.font_size = size;
        self
    }

    pub fn pdfium_library_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_library_path = Some(path.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, ConversionError> {
        let c = &self.config;
        if c.dpi < 72 || c.dpi > 600 {
            return Err(ConversionError::InvalidConfig(format!(
                "DPI must be 72–600, got {}",
                c.dpi
            )));
        }
        if !(4.0..=72.0).contains(&c.font_size) {
            return Err(ConversionError::InvalidConfig(format!(
                "Font size must be 4–72 pt, got {}",
                c.font_size
            )));
        }
        let (width, height) = c.page_size.dimensions();
        let line_height = c.font_size * LINE_SPACING;
        if c.margin_pt < 0.0
            || 2.0 * c.margin_pt + c.font_size >= width
            || 2.0 * c.margin_pt + line_height >= height
        {
            return Err(ConversionError::InvalidConfig(format!(
                "Margin {} pt leaves no room for text on a {} page",
                c.margin_pt, c.page_size
            )));
        }
        Ok(self.config)
    }
}

/// Leading as a multiple of the font size.
pub(crate) const LINE_SPACING: f32 = 1.2;

// ── Enums ────────────────────────────────────────────────────────────────

/// Output page size for laid-out text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    /// 210 × 297 mm (default).
    #[default]
    A4,
    /// 8.5 × 11 in.
    Letter,
}

impl PageSize {
    /// Width and height in PDF points (1/72 in).
    pub fn dimensions(self) -> (f32, f32) {
        match self {
            PageSize::A4 => (595.2756, 841.8898),
            PageSize::Letter => (612.0, 792.0),
        }
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageSize::A4 => f.write_str("A4"),
            PageSize::Letter => f.write_str("Letter"),
        }
    }
}

impl FromStr for PageSize {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "a4" => Ok(PageSize::A4),
            "letter" => Ok(PageSize::Letter),
            other => Err(ConversionError::InvalidConfig(format!(
                "Unknown page size '{other}' (expected a4 or letter)"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_build() {
        let c = ConversionConfig::builder().build().expect("defaults are valid");
        assert_eq!(c.dpi, 200);
        assert_eq!(c.jpeg_quality, 75);
        assert_eq!(c.page_size, PageSize::A4);
    }

    #[test]
    fn setters_clamp() {
        let c = ConversionConfig::builder()
            .dpi(10)
            .jpeg_quality(0)
            .max_rendered_pixels(1)
            .build()
            .unwrap();
        assert_eq!(c.dpi, 72);
        assert_eq!(c.jpeg_quality, 1);
        assert_eq!(c.max_rendered_pixels, 100);
    }

    #[test]
    fn oversized_margin_rejected() {
        let err = ConversionConfig::builder().margin_pt(400.0).build().unwrap_err();
        assert!(matches!(err, ConversionError::InvalidConfig(_)));
    }

    #[test]
    fn font_size_out_of_range_rejected() {
        assert!(ConversionConfig::builder().font_size(0.5).build().is_err());
    }

    #[test]
    fn page_size_parses() {
        assert_eq!("A4".parse::<PageSize>().unwrap(), PageSize::A4);
        assert_eq!("letter".parse::<PageSize>().unwrap(), PageSize::Letter);
        assert!("legal".parse::<PageSize>().is_err());
    }

    #[test]
    fn debug_hides_callback() {
        let c = ConversionConfig::builder()
            .progress_callback(Arc::new(NoopProgressCallback))
            .build()
            .unwrap();
        let dbg = format!("{c:?}");
        assert!(dbg.contains("<dyn ConversionProgressCallback>"));
    }
}
