//! Document attributes, geometry queries and rendering of an [`Rsvg`].
//!
//! Nothing is cached here; every call asks the handle, and through it the engine.

use crate::args::{normalize, Arg, CallShape, RenderOptions, RenderRequest};
use crate::deprecated;
use crate::engine::{Rectangle, RenderedImage, RenderingEngine};
use crate::error::Error;
use crate::stream::Rsvg;

impl<E: RenderingEngine> Rsvg<E> {
    /// The URL that relative references are resolved against.
    pub fn base_uri(&self) -> Result<Option<String>, Error> {
        self.handle.base_uri()
    }

    /// Sets the base URL.  Values that are not absolute URLs are ignored.
    pub fn set_base_uri(&mut self, uri: Option<&str>) -> Result<(), Error> {
        self.handle.set_base_uri(uri)
    }

    /// Width of the document in pixels; zero until the document is known.
    pub fn width(&self) -> Result<u32, Error> {
        self.handle.width()
    }

    /// Height of the document in pixels; zero until the document is known.
    pub fn height(&self) -> Result<u32, Error> {
        self.handle.height()
    }

    /// Size of the document, or position and size of the element with the given
    /// `#id`.
    pub fn dimensions(&self, id: Option<&str>) -> Result<Rectangle, Error> {
        self.handle.dimensions(id)
    }

    /// Whether the document has an element with the given `#id`.  Never fails.
    pub fn has_element(&self, id: Option<&str>) -> bool {
        self.handle.has_element(id).unwrap_or(false)
    }

    /// The smallest area that has content, rounded to three decimals.
    pub fn autocrop(&self) -> Result<Rectangle, Error> {
        self.handle.autocrop().map(|area| area.round_to(3))
    }

    pub fn render(&self, options: &RenderOptions) -> Result<RenderedImage, Error> {
        self.render_request(&RenderRequest::from(options.clone()))
    }

    /// Renders from loosely-typed arguments in either call shape.
    ///
    /// The positional shape `(width, height, format, id)` is deprecated.
    pub fn render_args(&self, args: &[Arg<'_>]) -> Result<RenderedImage, Error> {
        let normalized = normalize(args);

        if normalized.shape == CallShape::Legacy {
            self.deprecation(deprecated::RENDER_POSITIONAL);
        }

        self.render_request(&normalized.request)
    }

    pub fn render_request(&self, request: &RenderRequest) -> Result<RenderedImage, Error> {
        self.handle.render(request)
    }
}
