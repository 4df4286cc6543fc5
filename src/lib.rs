//! Stream SVG documents in, then measure and render them.
//!
//! An [`Rsvg`] wraps a single SVG document.  The document can be given in full when
//! the [`Rsvg`] is created, or written to it in chunks of any size, like to any
//! other byte sink.  Once the stream ends the document is sealed, and can be queried
//! for its size, for the position of its elements, for the area that actually has
//! content, and rendered to raw pixels, PNG, PDF or SVG.
//!
//! Parsing and rendering are done by a [`RenderingEngine`].  The default one,
//! [`ResvgEngine`], is built on `usvg`, `resvg` and `svg2pdf`.
//!
//! # Example
//!
//! ```no_run
//! use rsvg_stream::{RenderOptions, Rsvg};
//!
//! let mut svg = Rsvg::new().unwrap();
//!
//! svg.on_error(|e| eprintln!("{e}"));
//!
//! let chunks: [&[u8]; 3] = [
//!     b"<svg width=\"40\" height=\"30\">",
//!     b"<rect width=\"10\" height=\"10\"/>",
//!     b"</svg>",
//! ];
//!
//! for chunk in chunks {
//!     svg.write(chunk);
//! }
//! svg.end();
//!
//! let image = svg
//!     .render(&RenderOptions::new().with_format("png").with_width(80))
//!     .unwrap();
//!
//! assert_eq!((image.width, image.height), (80, 60));
//! std::fs::write("out.png", &image.data).unwrap();
//! ```
//!
//! # Lifecycle
//!
//! A document is *open* until the first chunk is accepted, then *writable* until the
//! stream ends, and *sealed* after that.  Chunks that do not continue the document
//! are rejected one by one; the document stays writable.  Some errors cannot be
//! recovered from, like content after the root element; they leave the document
//! *faulted*, and every later operation fails with [`Error::Faulted`].
//!
//! # Logging
//!
//! Set the `RSVG_LOG=1` environment variable to get messages on stdout about
//! rejected chunks, failed renders and invalid base URIs.

#![allow(clippy::derive_partial_eq_without_eq)]
#![warn(nonstandard_style, rust_2018_idioms, unused)]
#![warn(trivial_casts, trivial_numeric_casts)]

pub use crate::args::{normalize, Arg, CallShape, Normalized, RenderOptions, RenderRequest};
pub use crate::dpi::Dpi;
pub use crate::engine::{
    LoadOptions, OutputFormat, PixelFormat, Rectangle, RenderedImage, RenderingEngine,
    ResvgEngine, SvgDocument,
};
pub use crate::error::{Error, ImplementationLimit, LoadingError, RenderingError, WriteError};
pub use crate::events::Event;
pub use crate::handle::{Handle, State};
pub use crate::session::Session;
pub use crate::stream::{Rsvg, StreamOptions};

mod args;
pub mod deprecated;
mod dpi;
mod engine;
mod error;
mod events;
mod handle;
pub mod limits;
mod log;
mod properties;
mod session;
mod stream;
