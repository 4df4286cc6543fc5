//! The rendering engine behind a [`crate::Handle`].
//!
//! [`RenderingEngine`] is everything the handle needs from an SVG implementation:
//! incremental loading, a few document attributes, geometry queries and rendering.
//! The handle never looks inside an engine's document; it only passes it back to the
//! engine that created it.
//!
//! [`ResvgEngine`] implements it on top of `usvg` for parsing, `resvg`/`tiny-skia` for
//! raster output and `svg2pdf` for PDF output.

use std::fmt;

use crate::args::RenderRequest;
use crate::dpi::Dpi;
use crate::error::{LoadingError, RenderingError, WriteError};

mod autocrop;
mod backend;
mod document;
mod pixels;
mod render;
mod xml;

pub use self::backend::ResvgEngine;
pub use self::document::SvgDocument;

/// The operations a [`crate::Handle`] delegates.
///
/// Queries on a document that is still being loaded must not fail; they report what an
/// empty document would.
pub trait RenderingEngine {
    type Document;

    /// Creates a document.  With initial data, the document is also closed.
    fn open(&self, initial: Option<&[u8]>) -> Result<Self::Document, LoadingError>;

    fn write(&self, doc: &mut Self::Document, buf: &[u8]) -> Result<(), WriteError>;

    fn close(&self, doc: &mut Self::Document) -> Result<(), LoadingError>;

    fn base_uri(&self, doc: &Self::Document) -> Option<String>;

    fn set_base_uri(&self, doc: &mut Self::Document, uri: Option<&str>);

    fn dpi(&self, doc: &Self::Document) -> Dpi;

    fn set_dpi(&self, doc: &mut Self::Document, dpi: Dpi);

    fn width(&self, doc: &Self::Document) -> u32;

    fn height(&self, doc: &Self::Document) -> u32;

    /// Geometry of the whole document, or of the element named by `id` (`"#foo"`).
    fn dimensions(
        &self,
        doc: &Self::Document,
        id: Option<&str>,
    ) -> Result<Rectangle, RenderingError>;

    fn has_element(&self, doc: &Self::Document, id: Option<&str>) -> bool;

    /// The smallest rectangle that contains everything that is drawn.
    fn autocrop(&self, doc: &Self::Document) -> Result<Rectangle, RenderingError>;

    fn render(
        &self,
        doc: &Self::Document,
        request: &RenderRequest,
    ) -> Result<RenderedImage, RenderingError>;
}

/// Options that affect how documents are loaded.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct LoadOptions {
    /// Accept documents of any size.
    ///
    /// Without this, writing more than [`crate::limits::MAX_DOCUMENT_BYTES`] bytes
    /// faults the handle.
    pub unlimited_size: bool,
}

/// A rectangle in pixels.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rectangle {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rectangle {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Rectangle {
        Rectangle {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_size(width: f64, height: f64) -> Rectangle {
        Rectangle::new(0.0, 0.0, width, height)
    }

    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Rounds every field to `digits` decimal places.
    pub fn round_to(&self, digits: i32) -> Rectangle {
        let factor = 10f64.powi(digits);
        let round = |v: f64| {
            let r = (v * factor).round() / factor;
            // no negative zeros
            if r == 0.0 {
                0.0
            } else {
                r
            }
        };

        Rectangle::new(
            round(self.x),
            round(self.y),
            round(self.width),
            round(self.height),
        )
    }
}

/// Memory layout of raw pixel data.
///
/// These are the layouts of Cairo image surfaces: every pixel is packed in native
/// endianness, and rows start at multiples of four bytes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PixelFormat {
    /// 32 bits, `a << 24 | r << 16 | g << 8 | b`, premultiplied alpha.
    Argb32,
    /// 32 bits, like `Argb32` with the top byte unused.
    Rgb24,
    /// 8 bits of alpha.
    A8,
    /// 1 bit of alpha, packed in 32-bit words.
    A1,
    /// 16 bits, 5 red, 6 green, 5 blue.
    Rgb16_565,
    /// 32 bits, 10 bits per channel.
    Rgb30,
}

/// What [`crate::Rsvg::render`] produces.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OutputFormat {
    Raw(PixelFormat),
    Png,
    Pdf,
    Svg,
}

impl PixelFormat {
    pub fn name(&self) -> &'static str {
        match *self {
            PixelFormat::Argb32 => "argb32",
            PixelFormat::Rgb24 => "rgb24",
            PixelFormat::A8 => "a8",
            PixelFormat::A1 => "a1",
            PixelFormat::Rgb16_565 => "rgb16_565",
            PixelFormat::Rgb30 => "rgb30",
        }
    }

    fn from_name(name: &str) -> Option<PixelFormat> {
        let format = match name {
            "argb32" => PixelFormat::Argb32,
            "rgb24" => PixelFormat::Rgb24,
            "a8" => PixelFormat::A8,
            "a1" => PixelFormat::A1,
            "rgb16_565" => PixelFormat::Rgb16_565,
            "rgb30" => PixelFormat::Rgb30,
            _ => return None,
        };

        Some(format)
    }

    /// Bytes per row for `width` pixels, aligned to four bytes.
    pub fn stride(&self, width: u32) -> usize {
        let bits = match *self {
            PixelFormat::Argb32 | PixelFormat::Rgb24 | PixelFormat::Rgb30 => 32,
            PixelFormat::Rgb16_565 => 16,
            PixelFormat::A8 => 8,
            PixelFormat::A1 => 1,
        };

        let row_bits = width as usize * bits;
        (row_bits + 31) / 32 * 4
    }
}

impl OutputFormat {
    /// Parses a format name.  Names are case-sensitive.
    ///
    /// A missing name means raw pixels in [`PixelFormat::Argb32`].
    pub fn parse(name: Option<&str>) -> Result<OutputFormat, RenderingError> {
        let name = match name {
            None => return Ok(OutputFormat::Raw(PixelFormat::Argb32)),
            Some(name) => name,
        };

        match name {
            "raw" => Ok(OutputFormat::Raw(PixelFormat::Argb32)),
            "png" => Ok(OutputFormat::Png),
            "pdf" => Ok(OutputFormat::Pdf),
            "svg" => Ok(OutputFormat::Svg),
            "jpeg" | "jpg" => Err(RenderingError::UnsupportedFormat("JPEG")),
            "vips" => Err(RenderingError::UnsupportedFormat("VIPS")),
            _ => PixelFormat::from_name(name)
                .map(OutputFormat::Raw)
                .ok_or(RenderingError::InvalidFormat),
        }
    }

    pub fn name(&self) -> &'static str {
        match *self {
            OutputFormat::Raw(_) => "raw",
            OutputFormat::Png => "png",
            OutputFormat::Pdf => "pdf",
            OutputFormat::Svg => "svg",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            OutputFormat::Raw(pixels) => write!(f, "raw ({})", pixels.name()),
            _ => write!(f, "{}", self.name()),
        }
    }
}

/// The result of rendering a document or one of its elements.
#[derive(Clone, PartialEq)]
pub struct RenderedImage {
    pub data: Vec<u8>,
    pub format: OutputFormat,
    pub width: u32,
    pub height: u32,

    /// Bytes per row, for raw pixel data only.
    pub stride: Option<usize>,
}

impl RenderedImage {
    pub fn pixel_format(&self) -> Option<PixelFormat> {
        match self.format {
            OutputFormat::Raw(pixels) => Some(pixels),
            _ => None,
        }
    }
}

impl fmt::Debug for RenderedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderedImage")
            .field("data", &format_args!("[{} bytes]", self.data.len()))
            .field("format", &self.format)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("stride", &self.stride)
            .finish()
    }
}
