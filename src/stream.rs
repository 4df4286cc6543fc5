//! The streaming front end of a document.
//!
//! An [`Rsvg`] is a push sink: chunks arrive with [`Rsvg::write`] (or through
//! [`std::io::Write`]), and [`Rsvg::end`] says that there are no more.  Failures of
//! single chunks do not end the stream.  What happens is reported to listeners as
//! [`Event`]s.
//!
//! A document given in full at construction is loaded before the constructor
//! returns.  Its [`Event::Load`] is only queued, though, so that listeners can be
//! attached first; [`Rsvg::run_pending`] delivers it.
//!
//! ```no_run
//! use std::io::Write;
//! use rsvg_stream::Rsvg;
//!
//! let mut svg = Rsvg::new().unwrap();
//! svg.on_load(|| println!("loaded"));
//!
//! svg.write_all(b"<svg width=\"4\" height=\"6\">").unwrap();
//! svg.write_all(b"</svg>").unwrap();
//! svg.end();
//!
//! assert_eq!(svg.width().unwrap(), 4);
//! ```

use std::fmt;
use std::io;

use crate::args::Arg;
use crate::engine::{RenderingEngine, ResvgEngine};
use crate::error::Error;
use crate::events::{Emitter, Event};
use crate::handle::{Handle, State};
use crate::rsvg_log;
use crate::session::Session;

/// Configuration of the ingestion side of an [`Rsvg`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StreamOptions {
    /// [`Rsvg::write`] returns `false` for chunks of at least this many bytes.
    pub high_water_mark: usize,
}

impl Default for StreamOptions {
    fn default() -> Self {
        StreamOptions {
            high_water_mark: 16 * 1024,
        }
    }
}

/// An SVG document that is fed incrementally, then queried and rendered.
pub struct Rsvg<E: RenderingEngine = ResvgEngine> {
    pub(crate) handle: Handle<E>,
    pub(crate) emitter: Emitter,
    pub(crate) session: Session,
    options: StreamOptions,

    // Message of the last error that was reported, so that the same failure is not
    // reported again when the stream ends.
    last_error_message: Option<String>,
    ended: bool,
    load_emitted: bool,
}

impl Rsvg<ResvgEngine> {
    /// Creates an empty document that waits for data.
    pub fn new() -> Result<Self, Error> {
        Self::with_options(StreamOptions::default())
    }

    pub fn with_options(options: StreamOptions) -> Result<Self, Error> {
        let session = Session::new();
        let mut rsvg = Self::with_engine(ResvgEngine::new(session.clone()), None, session)?;
        rsvg.options = options;
        Ok(rsvg)
    }

    /// Loads a complete document.
    pub fn from_bytes(data: &[u8]) -> Result<Self, Error> {
        let session = Session::new();
        Self::with_engine(ResvgEngine::new(session.clone()), Some(data), session)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(data: &str) -> Result<Self, Error> {
        Self::from_bytes(data.as_bytes())
    }

    /// Creates a document from a value of unknown type, as bindings forward it.
    ///
    /// Content is loaded, [`Arg::StreamOptions`] configures an empty document, and
    /// [`Arg::Null`] is an empty document with default options.
    pub fn from_arg(arg: Arg<'_>) -> Result<Self, Error> {
        match arg {
            Arg::Null => Self::new(),
            Arg::Bytes(data) => Self::from_bytes(data),
            Arg::Str(data) => Self::from_str(data),
            Arg::StreamOptions(options) => Self::with_options(options),
            Arg::Number(_) | Arg::RenderOptions(_) => Err(Error::TypeMismatch("buffer")),
        }
    }
}

impl<E: RenderingEngine> Rsvg<E> {
    /// Creates a document on a specific engine; with `initial` data it is loaded now.
    pub fn with_engine(engine: E, initial: Option<&[u8]>, session: Session) -> Result<Self, Error> {
        let handle = Handle::new(engine, initial, session.clone())?;

        Ok(Self::from_parts(
            handle,
            StreamOptions::default(),
            session,
            initial.is_some(),
        ))
    }

    fn from_parts(handle: Handle<E>, options: StreamOptions, session: Session, loaded: bool) -> Self {
        let rsvg = Rsvg {
            handle,
            emitter: Emitter::new(),
            session,
            options,
            last_error_message: None,
            ended: loaded,
            load_emitted: loaded,
        };

        if loaded {
            rsvg.emitter.defer(Event::Load);
        }

        rsvg
    }

    pub fn options(&self) -> &StreamOptions {
        &self.options
    }

    pub fn state(&self) -> &State {
        self.handle.state()
    }

    /// Calls `f` for every event.
    pub fn on_event<F>(&self, f: F)
    where
        F: FnMut(&Event) + 'static,
    {
        self.emitter.add_listener(f);
    }

    pub fn on_load<F>(&self, mut f: F)
    where
        F: FnMut() + 'static,
    {
        self.on_event(move |e| {
            if *e == Event::Load {
                f()
            }
        });
    }

    pub fn on_error<F>(&self, mut f: F)
    where
        F: FnMut(&Error) + 'static,
    {
        self.on_event(move |e| {
            if let Event::Error(ref err) = *e {
                f(err)
            }
        });
    }

    /// Delivers events that were queued for later, like the load event of a document
    /// that was given in full at construction.  Returns how many were delivered.
    pub fn run_pending(&self) -> usize {
        self.emitter.run_deferred()
    }

    /// Whether [`Rsvg::run_pending`] has anything to deliver.
    pub fn has_pending(&self) -> bool {
        self.emitter.has_deferred()
    }

    /// Writes a chunk.  Returns whether the caller may keep writing without waiting.
    ///
    /// A failed chunk is reported as an [`Event::Error`].
    pub fn write(&mut self, chunk: &[u8]) -> bool {
        if let Err(e) = self.write_chunk(chunk) {
            self.emitter.emit(Event::Error(e));
        }

        chunk.len() < self.options.high_water_mark
    }

    fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), Error> {
        self.handle.write(chunk).map_err(|e| {
            rsvg_log!(self.session, "{}", e);
            self.last_error_message = Some(e.engine_message());
            e
        })
    }

    /// Says that there is no more data, and seals the document.
    ///
    /// Ending a second time does nothing.  If sealing fails with the same message as
    /// the last reported error, it is not reported again.
    pub fn end(&mut self) {
        if self.ended {
            return;
        }
        self.ended = true;

        match self.handle.close() {
            Ok(()) => {
                if !self.load_emitted {
                    self.load_emitted = true;
                    self.emitter.emit(Event::Load);
                }
            }

            Err(e) => {
                let message = e.engine_message();

                if self.last_error_message.as_deref() != Some(message.as_str()) {
                    rsvg_log!(self.session, "{}", e);
                    self.last_error_message = Some(message);
                    self.emitter.emit(Event::Error(e));
                }
            }
        }
    }

    /// Writes every chunk, then ends the stream.
    pub fn feed<I, B>(&mut self, chunks: I)
    where
        I: IntoIterator<Item = B>,
        B: AsRef<[u8]>,
    {
        for chunk in chunks {
            self.write(chunk.as_ref());
        }

        self.end();
    }
}

/// Errors are returned for each chunk instead of being sent as events.
impl<E: RenderingEngine> io::Write for Rsvg<E> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_chunk(buf)
            .map(|()| buf.len())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<E: RenderingEngine> fmt::Display for Rsvg<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let State::Faulted(ref msg) = *self.handle.state() {
            return write!(f, "{{ [Rsvg] faulted: {msg:?} }}");
        }

        write!(f, "{{ [Rsvg]")?;

        if let Ok(Some(uri)) = self.handle.base_uri() {
            write!(f, " base_uri: {uri:?},")?;
        }

        write!(
            f,
            " width: {}, height: {} }}",
            self.handle.width().unwrap_or(0),
            self.handle.height().unwrap_or(0)
        )
    }
}

impl<E: RenderingEngine> fmt::Debug for Rsvg<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rsvg")
            .field("state", self.handle.state())
            .field("bytes_written", &self.handle.bytes_written())
            .field("options", &self.options)
            .field("ended", &self.ended)
            .finish()
    }
}
