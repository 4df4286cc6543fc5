//! The lifecycle of a single document.
//!
//! A [`Handle`] owns one document of a [`RenderingEngine`] and decides which engine
//! operations are allowed at each point of its life:
//!
//! ```text
//!  Open ──write──> Writable ──close──> Sealed
//!    │                │
//!    └──fatal write error──> Faulted
//! ```
//!
//! Rejected chunks leave the handle where it was.  A fatal write error faults it, and
//! from then on every operation fails without reaching the engine.  Closing seals the
//! handle whether or not the engine could make sense of the data; in the latter case
//! queries report an empty document and renders fail.

use crate::args::RenderRequest;
use crate::dpi::Dpi;
use crate::engine::{Rectangle, RenderedImage, RenderingEngine};
use crate::error::{Error, WriteError};
use crate::rsvg_log;
use crate::session::Session;

/// Where a [`Handle`] is in its life.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State {
    /// Nothing was written yet.
    Open,

    /// Some data was accepted, and more may follow.
    Writable,

    /// No more data is accepted.
    Sealed,

    /// A fatal error happened; the payload is its message.
    Faulted(String),
}

/// Owner of a document of a [`RenderingEngine`].
pub struct Handle<E: RenderingEngine> {
    engine: E,
    document: E::Document,
    state: State,
    bytes_written: usize,
    session: Session,
}

impl<E: RenderingEngine> Handle<E> {
    /// Creates a handle.  With initial data, the handle is sealed before this returns.
    pub fn new(engine: E, initial: Option<&[u8]>, session: Session) -> Result<Self, Error> {
        let document = engine.open(initial).map_err(|e| {
            rsvg_log!(session, "could not load initial data: {}", e);
            Error::Load(e)
        })?;

        let (state, bytes_written) = match initial {
            Some(buf) => (State::Sealed, buf.len()),
            None => (State::Open, 0),
        };

        Ok(Handle {
            engine,
            document,
            state,
            bytes_written,
            session,
        })
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn is_faulted(&self) -> bool {
        matches!(self.state, State::Faulted(_))
    }

    pub fn is_sealed(&self) -> bool {
        self.state == State::Sealed
    }

    /// Number of bytes the engine accepted.
    pub fn bytes_written(&self) -> usize {
        self.bytes_written
    }

    pub fn write(&mut self, buf: &[u8]) -> Result<(), Error> {
        match self.state {
            State::Faulted(ref msg) => Err(Error::Faulted(msg.clone())),

            State::Sealed => Err(Error::Write(WriteError::HandleClosed)),

            State::Open | State::Writable => match self.engine.write(&mut self.document, buf) {
                Ok(()) => {
                    self.bytes_written += buf.len();
                    self.state = State::Writable;
                    Ok(())
                }

                Err(e) => {
                    if e.is_fatal() {
                        rsvg_log!(self.session, "handle is now faulted: {}", e);
                        self.state = State::Faulted(e.to_string());
                    }

                    Err(Error::Write(e))
                }
            },
        }
    }

    /// Seals the handle.
    ///
    /// Closing a sealed handle asks the engine again, so that a failed close keeps
    /// reporting its error.
    pub fn close(&mut self) -> Result<(), Error> {
        if let State::Faulted(ref msg) = self.state {
            return Err(Error::Faulted(msg.clone()));
        }

        self.state = State::Sealed;

        self.engine.close(&mut self.document).map_err(Error::Close)
    }

    fn check_faulted(&self) -> Result<(), Error> {
        match self.state {
            State::Faulted(ref msg) => Err(Error::Faulted(msg.clone())),
            _ => Ok(()),
        }
    }

    pub fn base_uri(&self) -> Result<Option<String>, Error> {
        self.check_faulted()?;
        Ok(self.engine.base_uri(&self.document))
    }

    pub fn set_base_uri(&mut self, uri: Option<&str>) -> Result<(), Error> {
        self.check_faulted()?;
        self.engine.set_base_uri(&mut self.document, uri);
        Ok(())
    }

    pub fn dpi(&self) -> Result<Dpi, Error> {
        self.check_faulted()?;
        Ok(self.engine.dpi(&self.document))
    }

    pub fn set_dpi(&mut self, dpi: Dpi) -> Result<(), Error> {
        self.check_faulted()?;
        self.engine.set_dpi(&mut self.document, dpi);
        Ok(())
    }

    pub fn width(&self) -> Result<u32, Error> {
        self.check_faulted()?;
        Ok(self.engine.width(&self.document))
    }

    pub fn height(&self) -> Result<u32, Error> {
        self.check_faulted()?;
        Ok(self.engine.height(&self.document))
    }

    pub fn dimensions(&self, id: Option<&str>) -> Result<Rectangle, Error> {
        self.check_faulted()?;
        Ok(self.engine.dimensions(&self.document, id)?)
    }

    pub fn has_element(&self, id: Option<&str>) -> Result<bool, Error> {
        self.check_faulted()?;
        Ok(self.engine.has_element(&self.document, id))
    }

    /// The unrounded extents of what the document draws.
    pub fn autocrop(&self) -> Result<Rectangle, Error> {
        self.check_faulted()?;
        Ok(self.engine.autocrop(&self.document)?)
    }

    pub fn render(&self, request: &RenderRequest) -> Result<RenderedImage, Error> {
        self.check_faulted()?;
        Ok(self.engine.render(&self.document, request)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ResvgEngine;
    use crate::error::{ImplementationLimit, LoadingError, RenderingError};
    use crate::limits;

    fn handle(initial: Option<&[u8]>) -> Result<Handle<ResvgEngine>, Error> {
        let session = Session::new_for_test_suite();
        Handle::new(ResvgEngine::new(session.clone()), initial, session)
    }

    #[test]
    fn initial_data_seals_the_handle() {
        let h = handle(Some(b"<svg width=\"5\" height=\"7\"></svg>")).unwrap();
        assert_eq!(*h.state(), State::Sealed);
        assert_eq!((h.width().unwrap(), h.height().unwrap()), (5, 7));
    }

    #[test]
    fn malformed_initial_data_fails_to_load() {
        assert!(matches!(
            handle(Some(b"this is not a SVG file")),
            Err(Error::Load(_))
        ));
    }

    #[test]
    fn writes_move_to_writable_then_close_seals() {
        let mut h = handle(None).unwrap();
        assert_eq!(*h.state(), State::Open);

        h.write(b"<svg width=\"4\" height=\"6\">").unwrap();
        assert_eq!(*h.state(), State::Writable);

        h.write(b"</svg>").unwrap();
        h.close().unwrap();
        assert_eq!(*h.state(), State::Sealed);
        assert_eq!(h.bytes_written(), 32);
    }

    #[test]
    fn rejected_chunk_keeps_the_handle_writable() {
        let mut h = handle(None).unwrap();

        assert!(matches!(
            h.write(b"this is not a SVG file"),
            Err(Error::Write(WriteError::Rejected(_)))
        ));
        assert_eq!(*h.state(), State::Open);
        assert_eq!(h.bytes_written(), 0);

        h.write(b"<svg width=\"2\" height=\"3\"/>").unwrap();
        h.close().unwrap();
        assert_eq!((h.width().unwrap(), h.height().unwrap()), (2, 3));
    }

    #[test]
    fn write_after_close_fails_without_changes() {
        let mut h = handle(Some(b"<svg width=\"5\" height=\"7\"/>")).unwrap();

        assert_eq!(
            h.write(b"<svg width=\"50\" height=\"70\"/>"),
            Err(Error::Write(WriteError::HandleClosed))
        );
        assert_eq!(*h.state(), State::Sealed);
        assert_eq!((h.width().unwrap(), h.height().unwrap()), (5, 7));
    }

    #[test]
    fn failed_close_is_reported_again() {
        let mut h = handle(None).unwrap();

        let e = Error::Close(LoadingError::NoDataPassedToParser);
        assert_eq!(h.close(), Err(e.clone()));
        assert_eq!(h.close(), Err(e));
        assert_eq!(*h.state(), State::Sealed);

        assert_eq!(h.width(), Ok(0));
        assert_eq!(
            h.render(&RenderRequest::default()),
            Err(Error::Rendering(RenderingError::HandleIsNotLoaded))
        );
    }

    #[test]
    fn fatal_error_faults_everything() {
        let mut h = handle(None).unwrap();

        h.write(b"<svg/>").unwrap();
        assert!(matches!(
            h.write(b"<g/>"),
            Err(Error::Write(WriteError::Fatal(_)))
        ));
        assert!(h.is_faulted());

        assert!(matches!(h.write(b" "), Err(Error::Faulted(_))));
        assert!(matches!(h.close(), Err(Error::Faulted(_))));
        assert!(matches!(h.width(), Err(Error::Faulted(_))));
        assert!(matches!(h.has_element(Some("#a")), Err(Error::Faulted(_))));
        assert!(matches!(h.set_base_uri(None), Err(Error::Faulted(_))));
    }

    #[test]
    fn too_much_data_faults_the_handle() {
        let mut h = handle(None).unwrap();
        let big = vec![b' '; limits::MAX_DOCUMENT_BYTES];

        h.write(b"<svg>").unwrap();
        let e = h.write(&big).unwrap_err();
        assert_eq!(
            e.engine_message(),
            LoadingError::LimitExceeded(ImplementationLimit::DocumentTooLarge).to_string()
        );
        assert!(h.is_faulted());
    }
}
