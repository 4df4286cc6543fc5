use once_cell::sync::Lazy;
use url::Url;
use usvg::fontdb;

use super::document::SvgDocument;
use super::render::{self, Subject};
use super::{autocrop, LoadOptions, Rectangle, RenderedImage, RenderingEngine};
use crate::args::RenderRequest;
use crate::dpi::Dpi;
use crate::error::{LoadingError, RenderingError, WriteError};
use crate::rsvg_log;
use crate::session::Session;

// Loading the system fonts is slow, so it happens once per process.
static FONTS: Lazy<fontdb::Database> = Lazy::new(|| {
    let mut db = fontdb::Database::new();
    db.load_system_fonts();
    db
});

/// A [`RenderingEngine`] backed by `usvg`, `resvg` and `svg2pdf`.
#[derive(Clone, Debug, Default)]
pub struct ResvgEngine {
    session: Session,
    options: LoadOptions,
}

impl ResvgEngine {
    pub fn new(session: Session) -> ResvgEngine {
        ResvgEngine {
            session,
            options: LoadOptions::default(),
        }
    }

    pub fn with_options(mut self, options: LoadOptions) -> ResvgEngine {
        self.options = options;
        self
    }
}

impl RenderingEngine for ResvgEngine {
    type Document = SvgDocument;

    fn open(&self, initial: Option<&[u8]>) -> Result<SvgDocument, LoadingError> {
        let mut doc = SvgDocument::new();

        if let Some(buf) = initial {
            doc.write(buf, &self.options).map_err(|e| match e {
                WriteError::Rejected(msg) | WriteError::Fatal(msg) => LoadingError::XmlParseError(msg),
                e => LoadingError::Other(e.to_string()),
            })?;

            self.close(&mut doc)?;
        }

        Ok(doc)
    }

    fn write(&self, doc: &mut SvgDocument, buf: &[u8]) -> Result<(), WriteError> {
        doc.write(buf, &self.options).map_err(|e| {
            rsvg_log!(self.session, "rejected chunk of {} bytes: {}", buf.len(), e);
            e
        })
    }

    fn close(&self, doc: &mut SvgDocument) -> Result<(), LoadingError> {
        let was_loading = doc.is_loading();

        doc.close(&FONTS).map_err(|e| {
            if was_loading {
                rsvg_log!(self.session, "could not load document: {}", e);
            }
            e
        })
    }

    fn base_uri(&self, doc: &SvgDocument) -> Option<String> {
        doc.base_url.get().map(|url| url.as_str().to_string())
    }

    fn set_base_uri(&self, doc: &mut SvgDocument, uri: Option<&str>) {
        let uri = match uri {
            Some(uri) => uri,
            None => {
                doc.base_url.set(None);
                return;
            }
        };

        match Url::parse(uri) {
            Ok(u) => {
                rsvg_log!(self.session, "setting base_uri to \"{}\"", u.as_str());
                doc.base_url.set(Some(u));
            }

            Err(e) => {
                rsvg_log!(
                    self.session,
                    "not setting base_uri to \"{}\" since it is invalid: {}",
                    uri,
                    e
                );
            }
        }
    }

    fn dpi(&self, doc: &SvgDocument) -> Dpi {
        doc.dpi
    }

    fn set_dpi(&self, doc: &mut SvgDocument, dpi: Dpi) {
        doc.dpi = dpi;
    }

    fn width(&self, doc: &SvgDocument) -> u32 {
        match doc.tree() {
            Some(tree) => render::document_size(tree).0,
            None if doc.is_loading() => round_declared(doc.declared_size().0),
            None => 0,
        }
    }

    fn height(&self, doc: &SvgDocument) -> u32 {
        match doc.tree() {
            Some(tree) => render::document_size(tree).1,
            None if doc.is_loading() => round_declared(doc.declared_size().1),
            None => 0,
        }
    }

    fn dimensions(&self, doc: &SvgDocument, id: Option<&str>) -> Result<Rectangle, RenderingError> {
        let tree = match doc.tree() {
            Some(tree) => tree,
            None if id.is_none() => {
                return Ok(Rectangle::from_size(
                    f64::from(self.width(doc)),
                    f64::from(self.height(doc)),
                ))
            }
            None => return Ok(Rectangle::default()),
        };

        let subject = match id {
            Some(id) => Subject::Element(render::lookup_node(tree, id)?),
            None => Subject::Document,
        };

        Ok(render::extents(tree, &subject))
    }

    fn has_element(&self, doc: &SvgDocument, id: Option<&str>) -> bool {
        match (doc.tree(), id) {
            (Some(tree), Some(id)) => render::lookup_node(tree, id).is_ok(),
            _ => false,
        }
    }

    fn autocrop(&self, doc: &SvgDocument) -> Result<Rectangle, RenderingError> {
        match doc.tree() {
            Some(tree) => autocrop::autocrop(tree),
            None => Ok(Rectangle::default()),
        }
    }

    fn render(&self, doc: &SvgDocument, request: &RenderRequest) -> Result<RenderedImage, RenderingError> {
        let tree = doc.tree().ok_or(RenderingError::HandleIsNotLoaded)?;

        render::render(tree, request).map_err(|e| {
            rsvg_log!(self.session, "could not render ({}): {}", request, e);
            e
        })
    }
}

fn round_declared(v: Option<f64>) -> u32 {
    v.map(|v| v.round() as u32).unwrap_or(0)
}
