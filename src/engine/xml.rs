//! Incremental well-formedness checks for the chunks written to a document.
//!
//! The full parse happens when the document is closed.  Until then, every chunk is run
//! through an `xml5ever` tokenizer so that garbage can be rejected as soon as it
//! arrives, and so that the size of the root element is known before the whole
//! document is.
//!
//! A chunk that does not continue the document is discarded.  Since the tokenizer
//! cannot be rewound, discarding a chunk means building a new tokenizer and feeding it
//! everything that was accepted so far; a stream of many rejected chunks is therefore
//! quadratic in the size of the accepted data.
//!
//! Two kinds of documents are only buffered, and checked when they are closed: SVGZ
//! data, and documents whose DOCTYPE has an internal subset, since entity declarations
//! are beyond what the tokenizer understands.

use markup5ever::buffer_queue::BufferQueue;
use xml5ever::tendril::StrTendril;
use xml5ever::tokenizer::{Tag, TagKind, Token, TokenSink, XmlTokenizer, XmlTokenizerOpts};

use crate::error::ImplementationLimit;
use crate::limits;

/// Why a chunk was not accepted.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedError {
    /// The chunk was discarded; the document is as it was before.
    Syntax(String),

    /// The document cannot be continued.
    Fatal(String),
}

/// What we know about the root element before the document is complete.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RootElement {
    pub name: String,
    pub width: Option<String>,
    pub height: Option<String>,
}

#[derive(Debug, Copy, Clone, PartialEq)]
enum Phase {
    Prolog,
    Root,
    Epilog,
}

struct FeedSink {
    phase: Phase,
    open_elements: Vec<String>,
    num_elements: usize,
    root: Option<RootElement>,
    error: Option<FeedError>,
}

pub struct XmlFeed {
    tokenizer: XmlTokenizer<FeedSink>,

    // Everything accepted so far.
    accepted: Vec<u8>,

    // How much of `accepted` went to the tokenizer; the rest is an incomplete
    // UTF-8 sequence.
    fed: usize,

    compressed: bool,

    // The DOCTYPE has an internal subset; nothing is tokenized.
    has_internal_subset: bool,
}

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

impl XmlFeed {
    pub fn new() -> XmlFeed {
        XmlFeed {
            tokenizer: new_tokenizer(),
            accepted: Vec::new(),
            fed: 0,
            compressed: false,
            has_internal_subset: false,
        }
    }

    /// Appends a chunk, or leaves the feed unchanged if the chunk is rejected.
    pub fn push(&mut self, chunk: &[u8]) -> Result<(), FeedError> {
        if self.accepted.is_empty() && chunk.starts_with(&GZIP_MAGIC) {
            self.compressed = true;
        }

        let start = self.accepted.len();
        self.accepted.extend_from_slice(chunk);

        if self.compressed || self.has_internal_subset {
            return Ok(());
        }

        if self.root().is_none() && internal_subset_in_prolog(&self.accepted) {
            self.has_internal_subset = true;
            return Ok(());
        }

        match self.tokenize_pending() {
            Ok(()) => Ok(()),

            Err(FeedError::Syntax(msg)) => {
                self.accepted.truncate(start);
                self.replay()?;
                Err(FeedError::Syntax(msg))
            }

            Err(e) => Err(e),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.accepted
    }

    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty()
    }

    /// SVGZ data is only buffered; it is checked when the document is closed.
    pub fn is_compressed(&self) -> bool {
        self.compressed
    }

    pub fn root(&self) -> Option<&RootElement> {
        self.tokenizer.sink.root.as_ref()
    }

    fn replay(&mut self) -> Result<(), FeedError> {
        self.tokenizer = new_tokenizer();
        self.fed = 0;

        // These bytes were accepted once, so they can only fail again if the
        // tokenizer is not deterministic.
        self.tokenize_pending().map_err(|e| match e {
            FeedError::Syntax(msg) => FeedError::Fatal(msg),
            e => e,
        })
    }

    fn tokenize_pending(&mut self) -> Result<(), FeedError> {
        let pending = &self.accepted[self.fed..];

        let text = match std::str::from_utf8(pending) {
            Ok(text) => text,

            // A multi-byte sequence split across chunks; feed what we can.
            Err(e) if e.error_len().is_none() => {
                std::str::from_utf8(&pending[..e.valid_up_to()]).unwrap_or_default()
            }

            Err(_) => {
                return Err(FeedError::Syntax(
                    "Input is not proper UTF-8, indicate encoding !".to_string(),
                ))
            }
        };

        if !text.is_empty() {
            let mut queue = BufferQueue::new();
            queue.push_back(StrTendril::from_slice(text));
            self.tokenizer.feed(&mut queue);
        }

        self.fed += text.len();

        match self.tokenizer.sink.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Default for XmlFeed {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether the DOCTYPE in `prolog` opens an internal subset (`<!DOCTYPE svg [ ... ]>`).
///
/// A DOCTYPE that is cut short at the end of `prolog` does not count yet.
fn internal_subset_in_prolog(prolog: &[u8]) -> bool {
    const DOCTYPE: &[u8] = b"<!DOCTYPE";

    let start = match prolog.windows(DOCTYPE.len()).position(|w| w == DOCTYPE) {
        Some(i) => i + DOCTYPE.len(),
        None => return false,
    };

    prolog[start..]
        .iter()
        .find(|&&b| b == b'[' || b == b'>')
        .map_or(false, |&b| b == b'[')
}

fn new_tokenizer() -> XmlTokenizer<FeedSink> {
    let sink = FeedSink {
        phase: Phase::Prolog,
        open_elements: Vec::new(),
        num_elements: 0,
        root: None,
        error: None,
    };

    XmlTokenizer::new(sink, XmlTokenizerOpts::default())
}

impl FeedSink {
    fn fail(&mut self, e: FeedError) {
        if self.error.is_none() {
            self.error = Some(e);
        }
    }

    fn syntax(&mut self, msg: &str) {
        self.fail(FeedError::Syntax(msg.to_string()));
    }

    fn extra_content(&mut self) {
        self.fail(FeedError::Fatal(
            "Extra content at the end of the document".to_string(),
        ));
    }

    fn tag(&mut self, tag: Tag) {
        let name = qualified_name(&tag);

        match tag.kind {
            TagKind::StartTag | TagKind::EmptyTag => {
                if self.phase == Phase::Epilog {
                    self.extra_content();
                    return;
                }

                self.num_elements += 1;
                if self.num_elements > limits::MAX_LOADED_ELEMENTS {
                    let limit = ImplementationLimit::TooManyLoadedElements;
                    self.fail(FeedError::Fatal(limit.to_string()));
                    return;
                }

                if self.phase == Phase::Prolog {
                    self.root = Some(RootElement::from_tag(&tag));
                }

                if tag.kind == TagKind::StartTag {
                    self.open_elements.push(name);
                    self.phase = Phase::Root;
                } else if self.phase == Phase::Prolog {
                    self.phase = Phase::Epilog;
                }
            }

            TagKind::EndTag | TagKind::ShortTag => match self.open_elements.pop() {
                Some(open) => {
                    if tag.kind == TagKind::EndTag && open != name {
                        self.open_elements.push(open.clone());
                        self.syntax(&format!(
                            "Opening and ending tag mismatch: {open} and {name}"
                        ));
                    } else if self.open_elements.is_empty() {
                        self.phase = Phase::Epilog;
                    }
                }

                None => {
                    if self.phase == Phase::Epilog {
                        self.extra_content();
                    } else {
                        self.syntax("Start tag expected, '<' not found");
                    }
                }
            },
        }
    }
}

impl TokenSink for FeedSink {
    fn process_token(&mut self, token: Token) {
        if self.error.is_some() {
            return;
        }

        match token {
            Token::ParseError(msg) => self.syntax(&msg),

            Token::NullCharacterToken => self.syntax("Char 0x0 out of allowed range"),

            Token::CharacterTokens(text) => {
                if text.trim().is_empty() {
                    return;
                }

                match self.phase {
                    Phase::Prolog => self.syntax("Start tag expected, '<' not found"),
                    Phase::Epilog => self.extra_content(),
                    Phase::Root => (),
                }
            }

            Token::TagToken(tag) => self.tag(tag),

            _ => (),
        }
    }
}

fn qualified_name(tag: &Tag) -> String {
    match tag.name.prefix {
        Some(ref prefix) => format!("{}:{}", prefix, tag.name.local),
        None => tag.name.local.to_string(),
    }
}

impl RootElement {
    fn from_tag(tag: &Tag) -> RootElement {
        let attr = |wanted: &str| {
            tag.attrs
                .iter()
                .find(|a| a.name.prefix.is_none() && &*a.name.local == wanted)
                .map(|a| a.value.to_string())
        };

        RootElement {
            name: tag.name.local.to_string(),
            width: attr("width"),
            height: attr("height"),
        }
    }

    /// The root width in pixels, if it is a plain number or has `px` units.
    pub fn pixel_width(&self) -> Option<f64> {
        self.width.as_deref().and_then(parse_pixels)
    }

    pub fn pixel_height(&self) -> Option<f64> {
        self.height.as_deref().and_then(parse_pixels)
    }
}

fn parse_pixels(s: &str) -> Option<f64> {
    let s = s.trim();
    let number = s.strip_suffix("px").unwrap_or(s).trim_end();

    number
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}
