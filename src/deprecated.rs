//! Retired parts of the API.
//!
//! Every function here is one of the current operations with some arguments filled
//! in.  The first call with each message sends an [`Event::Deprecation`] to the
//! listeners of the [`Rsvg`] it was called on; later calls, on any [`Rsvg`] of the
//! process, are silent.

use std::collections::HashSet;
use std::sync::Mutex;

use once_cell::sync::Lazy;

use crate::args::RenderOptions;
use crate::dpi::Dpi;
use crate::engine::{RenderedImage, RenderingEngine};
use crate::error::Error;
use crate::events::Event;
use crate::rsvg_log;
use crate::stream::Rsvg;

pub const DPI_X: &str = "Rsvg#dpiX: DPI does not affect rendering.";
pub const DPI_Y: &str = "Rsvg#dpiY: DPI does not affect rendering.";
pub const GET_DPI: &str = "Rsvg#getDPI(): DPI does not affect rendering.";
pub const SET_DPI: &str = "Rsvg#setDPI(): DPI does not affect rendering.";
pub const RENDER_POSITIONAL: &str =
    "Rsvg#render(): Call render({ format, width, height, ... }) instead.";
pub const RENDER_RAW: &str = "Rsvg#renderRaw(): Call render({ format: \"raw\" }) instead.";
pub const RENDER_PNG: &str = "Rsvg#renderPNG(): Call render({ format: \"png\" }) instead.";
pub const RENDER_PDF: &str = "Rsvg#renderPDF(): Call render({ format: \"pdf\" }) instead.";
pub const RENDER_SVG: &str = "Rsvg#renderSVG(): Call render({ format: \"svg\" }) instead.";

// Messages that were already sent, for the whole life of the process.
static WARNED: Lazy<Mutex<HashSet<&'static str>>> = Lazy::new(|| Mutex::new(HashSet::new()));

/// Records `message`; returns whether this is the first time it is seen.
pub fn warn_once(message: &'static str) -> bool {
    // The set stays consistent even if a holder of the lock panicked.
    let mut warned = WARNED.lock().unwrap_or_else(|e| e.into_inner());
    warned.insert(message)
}

impl<E: RenderingEngine> Rsvg<E> {
    pub(crate) fn deprecation(&self, message: &'static str) {
        if warn_once(message) {
            rsvg_log!(self.session, "deprecated: {}", message);
            self.emitter.emit(Event::Deprecation(message));
        }
    }

    /// Horizontal resolution.
    #[deprecated(note = "DPI does not affect rendering")]
    pub fn dpi_x(&self) -> Result<f64, Error> {
        self.deprecation(DPI_X);
        Ok(self.handle.dpi()?.x())
    }

    #[deprecated(note = "DPI does not affect rendering")]
    pub fn set_dpi_x(&mut self, x: f64) -> Result<(), Error> {
        self.deprecation(DPI_X);
        let dpi = self.handle.dpi()?;
        self.handle.set_dpi(dpi.with_x(x))
    }

    /// Vertical resolution.
    #[deprecated(note = "DPI does not affect rendering")]
    pub fn dpi_y(&self) -> Result<f64, Error> {
        self.deprecation(DPI_Y);
        Ok(self.handle.dpi()?.y())
    }

    #[deprecated(note = "DPI does not affect rendering")]
    pub fn set_dpi_y(&mut self, y: f64) -> Result<(), Error> {
        self.deprecation(DPI_Y);
        let dpi = self.handle.dpi()?;
        self.handle.set_dpi(dpi.with_y(y))
    }

    #[deprecated(note = "DPI does not affect rendering")]
    pub fn dpi(&self) -> Result<Dpi, Error> {
        self.deprecation(GET_DPI);
        self.handle.dpi()
    }

    /// Sets both resolutions.  A missing `y` is the same as `x`, and a missing or
    /// non-positive value means the default.
    #[deprecated(note = "DPI does not affect rendering")]
    pub fn set_dpi(&mut self, x: Option<f64>, y: Option<f64>) -> Result<(), Error> {
        self.deprecation(SET_DPI);

        let x = x.filter(|v| !v.is_nan()).unwrap_or(0.0);
        let y = y.map(|v| if v.is_nan() { 0.0 } else { v }).unwrap_or(x);

        self.handle.set_dpi(Dpi::new(x, y))
    }

    /// Renders with positional arguments.  Unlike [`Rsvg::render`], the format may be
    /// in any case.
    #[deprecated(note = "use render() with RenderOptions")]
    pub fn render_legacy(
        &self,
        width: Option<i32>,
        height: Option<i32>,
        format: Option<&str>,
        id: Option<&str>,
    ) -> Result<RenderedImage, Error> {
        self.deprecation(RENDER_POSITIONAL);

        let options = RenderOptions {
            format: format.map(str::to_lowercase),
            width,
            height,
            id: id.map(String::from),
        };

        self.render(&options)
    }

    fn render_as(
        &self,
        message: &'static str,
        format: &str,
        width: i32,
        height: i32,
        id: Option<&str>,
    ) -> Result<RenderedImage, Error> {
        self.deprecation(message);

        let options = RenderOptions {
            format: Some(format.to_string()),
            width: Some(width),
            height: Some(height),
            id: id.map(String::from),
        };

        self.render(&options)
    }

    /// Renders to Cairo's ARGB32 pixel layout.
    #[deprecated(note = "use render() with format \"raw\"")]
    pub fn render_raw(&self, width: i32, height: i32, id: Option<&str>) -> Result<RenderedImage, Error> {
        self.render_as(RENDER_RAW, "raw", width, height, id)
    }

    #[deprecated(note = "use render() with format \"png\"")]
    pub fn render_png(&self, width: i32, height: i32, id: Option<&str>) -> Result<RenderedImage, Error> {
        self.render_as(RENDER_PNG, "png", width, height, id)
    }

    #[deprecated(note = "use render() with format \"pdf\"")]
    pub fn render_pdf(&self, width: i32, height: i32, id: Option<&str>) -> Result<RenderedImage, Error> {
        self.render_as(RENDER_PDF, "pdf", width, height, id)
    }

    #[deprecated(note = "use render() with format \"svg\"")]
    pub fn render_svg(&self, width: i32, height: i32, id: Option<&str>) -> Result<RenderedImage, Error> {
        self.render_as(RENDER_SVG, "svg", width, height, id)
    }
}
