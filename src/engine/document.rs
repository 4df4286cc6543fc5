//! The document type of [`super::ResvgEngine`].

use std::borrow::Cow;
use std::path::PathBuf;

use url::Url;
use usvg::{fontdb, roxmltree, PostProcessingSteps, TreeParsing, TreePostProc};

use super::xml::{FeedError, XmlFeed};
use super::LoadOptions;
use crate::dpi::Dpi;
use crate::error::{ImplementationLimit, LoadingError, WriteError};
use crate::limits;

const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// An SVG document that is being loaded, or has been loaded, by a [`super::ResvgEngine`].
pub struct SvgDocument {
    feed: XmlFeed,
    content: Content,
    pub(crate) base_url: BaseUrl,
    pub(crate) dpi: Dpi,
}

enum Content {
    Loading,
    Loaded(Box<usvg::Tree>),
    Failed(LoadingError),
}

/// The URL that relative references in the document are resolved against.
#[derive(Default, Clone, Debug)]
pub(crate) struct BaseUrl {
    inner: Option<Url>,
}

impl BaseUrl {
    pub fn set(&mut self, url: Option<Url>) {
        self.inner = url;
    }

    pub fn get(&self) -> Option<&Url> {
        self.inner.as_ref()
    }

    /// For `file:` URLs, the directory that contains the document.
    pub fn resources_dir(&self) -> Option<PathBuf> {
        let url = self.inner.as_ref().filter(|u| u.scheme() == "file")?;
        let path = url.to_file_path().ok()?;

        if url.path().ends_with('/') {
            Some(path)
        } else {
            path.parent().map(PathBuf::from)
        }
    }
}

impl SvgDocument {
    pub(crate) fn new() -> SvgDocument {
        SvgDocument {
            feed: XmlFeed::new(),
            content: Content::Loading,
            base_url: BaseUrl::default(),
            dpi: Dpi::default(),
        }
    }

    pub(crate) fn write(&mut self, buf: &[u8], options: &LoadOptions) -> Result<(), WriteError> {
        if !matches!(self.content, Content::Loading) {
            return Err(WriteError::HandleClosed);
        }

        if !options.unlimited_size && self.feed.bytes().len() + buf.len() > limits::MAX_DOCUMENT_BYTES
        {
            let e = LoadingError::LimitExceeded(ImplementationLimit::DocumentTooLarge);
            return Err(WriteError::from(e));
        }

        self.feed.push(buf).map_err(|e| match e {
            FeedError::Syntax(msg) => WriteError::Rejected(msg),
            FeedError::Fatal(msg) => WriteError::Fatal(msg),
        })
    }

    /// Parses everything that was written.  Closing again reports the same result.
    pub(crate) fn close(&mut self, fontdb: &fontdb::Database) -> Result<(), LoadingError> {
        match self.content {
            Content::Loaded(_) => Ok(()),

            Content::Failed(ref e) => Err(e.clone()),

            Content::Loading => match self.load(fontdb) {
                Ok(tree) => {
                    self.content = Content::Loaded(Box::new(tree));
                    Ok(())
                }

                Err(e) => {
                    self.content = Content::Failed(e.clone());
                    Err(e)
                }
            },
        }
    }

    pub(crate) fn tree(&self) -> Option<&usvg::Tree> {
        match self.content {
            Content::Loaded(ref tree) => Some(tree),
            _ => None,
        }
    }

    pub(crate) fn is_loading(&self) -> bool {
        matches!(self.content, Content::Loading)
    }

    /// The size of the root element as far as it is known while loading.
    pub(crate) fn declared_size(&self) -> (Option<f64>, Option<f64>) {
        match self.feed.root() {
            Some(root) => (root.pixel_width(), root.pixel_height()),
            None => (None, None),
        }
    }

    fn load(&self, fontdb: &fontdb::Database) -> Result<usvg::Tree, LoadingError> {
        if self.feed.is_empty() {
            return Err(LoadingError::NoDataPassedToParser);
        }

        let data: Cow<'_, [u8]> = if self.feed.is_compressed() {
            Cow::Owned(usvg::decompress_svgz(self.feed.bytes())?)
        } else {
            Cow::Borrowed(self.feed.bytes())
        };

        let text = std::str::from_utf8(&data)
            .map_err(|_| LoadingError::XmlParseError("Input is not proper UTF-8".to_string()))?;

        let text = with_svg_namespace(text)?;
        let xml = parse_xml(&text)?;

        let options = usvg::Options {
            resources_dir: self.base_url.resources_dir(),
            ..usvg::Options::default()
        };

        let mut tree = usvg::Tree::from_xmltree(&xml, &options)?;
        tree.postprocess(PostProcessingSteps::default(), fontdb);

        Ok(tree)
    }
}

fn parse_xml(text: &str) -> Result<roxmltree::Document<'_>, LoadingError> {
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    };

    roxmltree::Document::parse_with_options(text, options)
        .map_err(|e| LoadingError::XmlParseError(e.to_string()))
}

/// Documents are often written without `xmlns`; an unqualified `<svg>` root is taken
/// to be in the SVG namespace.
fn with_svg_namespace(text: &str) -> Result<Cow<'_, str>, LoadingError> {
    let xml = parse_xml(text)?;
    let root = xml.root_element();

    if root.tag_name().name() != "svg" {
        return Err(LoadingError::NoSvgRoot);
    }

    match root.tag_name().namespace() {
        Some(SVG_NAMESPACE) => Ok(Cow::Borrowed(text)),

        Some(_) => Err(LoadingError::NoSvgRoot),

        None => {
            let at = root.range().start + "<svg".len();

            let mut fixed = String::with_capacity(text.len() + 40);
            fixed.push_str(&text[..at]);
            fixed.push_str(" xmlns=\"");
            fixed.push_str(SVG_NAMESPACE);
            fixed.push('"');
            fixed.push_str(&text[at..]);

            Ok(Cow::Owned(fixed))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(text: &str) -> Result<usvg::Tree, LoadingError> {
        let mut doc = SvgDocument::new();
        doc.write(text.as_bytes(), &LoadOptions::default())
            .map_err(|e| LoadingError::Other(e.to_string()))?;
        doc.close(&fontdb::Database::new())?;
        match doc.content {
            Content::Loaded(tree) => Ok(*tree),
            _ => unreachable!(),
        }
    }

    #[test]
    fn root_without_namespace_is_svg() {
        let tree = load(r#"<svg width="5" height="7"></svg>"#).unwrap();
        assert_eq!(tree.size.width(), 5.0);
        assert_eq!(tree.size.height(), 7.0);
    }

    #[test]
    fn root_with_namespace_is_svg() {
        let tree = load(r#"<svg xmlns="http://www.w3.org/2000/svg" width="2" height="3"/>"#).unwrap();
        assert_eq!(tree.size.width(), 2.0);
    }

    #[test]
    fn other_roots_are_rejected() {
        assert_eq!(
            load(r#"<html width="5" height="7"/>"#).err(),
            Some(LoadingError::NoSvgRoot)
        );
        assert_eq!(
            load(r#"<svg xmlns="urn:other" width="5" height="7"/>"#).err(),
            Some(LoadingError::NoSvgRoot)
        );
    }

    #[test]
    fn closing_without_data_fails_every_time() {
        let mut doc = SvgDocument::new();
        let fontdb = fontdb::Database::new();

        assert_eq!(doc.close(&fontdb), Err(LoadingError::NoDataPassedToParser));
        assert_eq!(doc.close(&fontdb), Err(LoadingError::NoDataPassedToParser));
        assert!(doc.tree().is_none());
    }

    #[test]
    fn writing_after_close_is_an_error() {
        let mut doc = SvgDocument::new();
        let options = LoadOptions::default();
        doc.write(b"<svg width='1' height='1'/>", &options).unwrap();
        doc.close(&fontdb::Database::new()).unwrap();

        assert_eq!(doc.write(b"<g/>", &options), Err(WriteError::HandleClosed));
    }

    #[test]
    fn resources_dir_is_the_directory_of_the_document() {
        let mut base = BaseUrl::default();
        assert_eq!(base.resources_dir(), None);

        base.set(Some(Url::parse("file:///tmp/images/foo.svg").unwrap()));
        assert_eq!(base.resources_dir(), Some(PathBuf::from("/tmp/images")));

        base.set(Some(Url::parse("file:///tmp/images/").unwrap()));
        assert_eq!(base.resources_dir(), Some(PathBuf::from("/tmp/images/")));

        base.set(Some(Url::parse("http://example.com/foo.svg").unwrap()));
        assert_eq!(base.resources_dir(), None);
    }
}
