//! Error types.
//!
//! There are two layers here.  [`LoadingError`], [`WriteError`] and [`RenderingError`]
//! are what a [`crate::RenderingEngine`] reports.  [`Error`] is what an [`crate::Rsvg`]
//! reports to its callers; it says at which point of the handle's life the engine
//! failed.

use std::error;
use std::fmt;

use crate::limits;

/// Errors that can happen while loading an SVG document.
///
/// All of these codes are for unrecoverable errors that keep an SVG document from being
/// fully loaded and parsed.  To see the reasons for recoverable problems, you may want
/// to set the `RSVG_LOG=1` environment variable.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub enum LoadingError {
    /// The handle was sealed before any data was written to it.
    NoDataPassedToParser,

    /// XML syntax error.
    XmlParseError(String),

    /// There is no `<svg>` root element in the XML.
    NoSvgRoot,

    /// A particular implementation-defined limit was exceeded.
    LimitExceeded(ImplementationLimit),

    /// Catch-all for loading errors.
    Other(String),
}

/// Errors for implementation-defined limits, to mitigate malicious SVG documents.
#[non_exhaustive]
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ImplementationLimit {
    /// Document exceeded the maximum number of elements that can be loaded.
    ///
    /// This is a mitigation for SVG files which create millions of
    /// elements in an attempt to exhaust memory.
    TooManyLoadedElements,

    /// Document exceeded the maximum number of bytes that a handle accepts
    /// when it was not created with `unlimited_size`.
    DocumentTooLarge,
}

/// A chunk of data was rejected by the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteError {
    /// The chunk does not continue the document so far.
    ///
    /// The engine discarded the chunk; the document is as it was before.
    Rejected(String),

    /// The engine cannot continue with this document at all.
    Fatal(String),

    /// The handle was already sealed.
    HandleClosed,
}

/// Errors that can happen while measuring or rendering an SVG document.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub enum RenderingError {
    /// An error from the rendering backend.
    Rendering(String),

    /// The output format is not one of the known names.
    InvalidFormat,

    /// The output format is known but cannot be produced.
    UnsupportedFormat(&'static str),

    /// A width or height that was given is not positive.
    InvalidSize(&'static str),

    /// Tried to reference an SVG element that does not exist.
    IdNotFound,

    /// Tried to reference an SVG element from a fragment identifier that is incorrect.
    InvalidId(String),

    /// The element or the document has an empty extent.
    InvalidDimensions,

    /// The handle does not have a loaded document.
    HandleIsNotLoaded,

    /// Not enough memory was available for rendering.
    OutOfMemory(String),
}

/// Errors reported by an [`crate::Rsvg`].
///
/// The variants follow the life of a handle: a document may fail to load during
/// construction, a chunk may fail to be written, the handle may fail to close, or the
/// handle may be faulted because of an earlier fatal error.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// The content given at construction time was rejected.
    Load(LoadingError),

    /// A chunk was rejected; the handle remains writable unless the error was fatal.
    Write(WriteError),

    /// The document could not be finalized.
    Close(LoadingError),

    /// A previous fatal error left the handle unusable; the message is that error's.
    Faulted(String),

    /// An argument had the wrong type.  The payload names the argument.
    TypeMismatch(&'static str),

    /// A query or render failed.
    Rendering(RenderingError),
}

impl WriteError {
    /// Whether the handle must be faulted after this error.
    pub fn is_fatal(&self) -> bool {
        matches!(*self, WriteError::Fatal(_))
    }
}

impl error::Error for LoadingError {}

impl fmt::Display for LoadingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            LoadingError::NoDataPassedToParser => write!(f, "no data passed to parser"),
            LoadingError::XmlParseError(ref s) => write!(f, "XML parse error: {s}"),
            LoadingError::NoSvgRoot => write!(f, "XML does not have <svg> root"),
            LoadingError::LimitExceeded(ref l) => write!(f, "{l}"),
            LoadingError::Other(ref s) => write!(f, "{s}"),
        }
    }
}

impl From<usvg::Error> for LoadingError {
    fn from(e: usvg::Error) -> LoadingError {
        match e {
            usvg::Error::ElementsLimitReached => {
                LoadingError::LimitExceeded(ImplementationLimit::TooManyLoadedElements)
            }
            usvg::Error::ParsingFailed(ref e) => LoadingError::XmlParseError(format!("{e}")),
            e => LoadingError::Other(format!("{e}")),
        }
    }
}

impl fmt::Display for ImplementationLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ImplementationLimit::TooManyLoadedElements => write!(
                f,
                "cannot load more than {} XML elements",
                limits::MAX_LOADED_ELEMENTS
            ),

            ImplementationLimit::DocumentTooLarge => write!(
                f,
                "cannot load more than {} bytes without unlimited_size",
                limits::MAX_DOCUMENT_BYTES
            ),
        }
    }
}

impl error::Error for WriteError {}

impl fmt::Display for WriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            WriteError::Rejected(ref s) => write!(f, "{s}"),
            WriteError::Fatal(ref s) => write!(f, "{s}"),
            WriteError::HandleClosed => {
                write!(f, "Handle must not be closed in order to write to it")
            }
        }
    }
}

impl From<LoadingError> for WriteError {
    fn from(e: LoadingError) -> WriteError {
        WriteError::Fatal(format!("{e}"))
    }
}

impl error::Error for RenderingError {}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            RenderingError::Rendering(ref s) => write!(f, "rendering error: {s}"),
            RenderingError::InvalidFormat => write!(f, "Invalid argument: format"),
            RenderingError::UnsupportedFormat(name) => write!(f, "Format not supported: {name}"),
            RenderingError::InvalidSize(dimension) => write!(f, "Expected {dimension} > 0."),
            RenderingError::IdNotFound => write!(f, "SVG element with given id does not exists."),
            RenderingError::InvalidId(ref s) => write!(f, "invalid id: {s:?}"),
            RenderingError::InvalidDimensions => {
                write!(f, "Got invalid dimensions of SVG element or whole image.")
            }
            RenderingError::HandleIsNotLoaded => write!(f, "SVG data is not loaded into handle"),
            RenderingError::OutOfMemory(ref s) => write!(f, "out of memory: {s}"),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::Load(ref e) | Error::Close(ref e) => Some(e),
            Error::Write(ref e) => Some(e),
            Error::Rendering(ref e) => Some(e),
            Error::Faulted(_) | Error::TypeMismatch(_) => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Error::Load(ref e) => write!(f, "Rsvg load failure: {e}"),
            Error::Write(ref e) => write!(f, "Rsvg write failure: {e}"),
            Error::Close(ref e) => write!(f, "Rsvg close failure: {e}"),
            Error::Faulted(ref s) => write!(f, "Rsvg handle is faulted: {s}"),
            Error::TypeMismatch(arg) => write!(f, "Invalid argument: {arg}"),
            Error::Rendering(ref e) => write!(f, "{e}"),
        }
    }
}

impl From<RenderingError> for Error {
    fn from(e: RenderingError) -> Error {
        Error::Rendering(e)
    }
}

impl Error {
    /// The engine's own message, without the prefix that says where it failed.
    ///
    /// This is what gets compared when deciding whether a close failure repeats an
    /// error that was already reported.
    pub fn engine_message(&self) -> String {
        match *self {
            Error::Load(ref e) | Error::Close(ref e) => e.to_string(),
            Error::Write(ref e) => e.to_string(),
            Error::Rendering(ref e) => e.to_string(),
            Error::Faulted(ref s) => s.clone(),
            Error::TypeMismatch(arg) => arg.to_string(),
        }
    }
}
