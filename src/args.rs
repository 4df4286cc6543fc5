//! Normalizing the historical call shapes of the render operation.
//!
//! Rendering used to take four positional arguments, `(width, height, format, id)`.
//! It now takes a single set of named options.  Bindings that forward untyped values
//! cannot know which shape the caller meant, so they pass a slice of [`Arg`] and let
//! [`normalize`] decide.  The decision is purely structural:
//!
//! * a single [`Arg::RenderOptions`] (or a single [`Arg::Null`], or nothing at all) is
//!   the canonical shape;
//! * anything else is the positional shape.  Its format is lowercased, since the old
//!   API accepted `"PNG"` as well as `"png"`.

use std::fmt;

use crate::stream::StreamOptions;

/// A loosely-typed argument, as forwarded by hosts that do not know the call shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg<'a> {
    Null,
    Number(f64),
    Str(&'a str),
    Bytes(&'a [u8]),
    RenderOptions(RenderOptions),
    StreamOptions(StreamOptions),
}

/// Named options for [`crate::Rsvg::render`].
///
/// Every field is optional.  A missing format means raw pixels, missing sizes mean
/// the natural size of what is rendered, and a missing id means the whole document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderOptions {
    pub format: Option<String>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub id: Option<String>,
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_format(mut self, format: &str) -> Self {
        self.format = Some(format.to_string());
        self
    }

    pub fn with_size(mut self, width: i32, height: i32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_width(mut self, width: i32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_height(mut self, height: i32) -> Self {
        self.height = Some(height);
        self
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }
}

/// The canonical description of one render invocation.
///
/// This is what reaches the [`crate::RenderingEngine`]; it is never modified after
/// [`normalize`] creates it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderRequest {
    format: Option<String>,
    width: Option<i32>,
    height: Option<i32>,
    id: Option<String>,
}

impl RenderRequest {
    pub fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }

    pub fn width(&self) -> Option<i32> {
        self.width
    }

    pub fn height(&self) -> Option<i32> {
        self.height
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

impl From<RenderOptions> for RenderRequest {
    fn from(o: RenderOptions) -> RenderRequest {
        let RenderOptions {
            format,
            width,
            height,
            id,
        } = o;

        RenderRequest {
            format,
            width,
            height,
            id,
        }
    }
}

impl fmt::Display for RenderRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "format={} width={} height={} id={}",
            self.format.as_deref().unwrap_or("(default)"),
            opt_to_string(self.width),
            opt_to_string(self.height),
            self.id.as_deref().unwrap_or("(document)"),
        )
    }
}

fn opt_to_string(v: Option<i32>) -> String {
    v.map(|v| v.to_string()).unwrap_or_else(|| "(natural)".to_string())
}

/// Which call shape [`normalize`] recognized.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CallShape {
    Canonical,
    Legacy,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub request: RenderRequest,
    pub shape: CallShape,
}

/// Turns the raw arguments of a render call into a [`RenderRequest`].
///
/// This never fails; arguments of the wrong type in the positional shape are taken as
/// absent.
pub fn normalize(args: &[Arg<'_>]) -> Normalized {
    match args {
        [] | [Arg::Null] => Normalized {
            request: RenderRequest::default(),
            shape: CallShape::Canonical,
        },

        [Arg::RenderOptions(options)] => Normalized {
            request: RenderRequest::from(options.clone()),
            shape: CallShape::Canonical,
        },

        _ => Normalized {
            request: positional(args),
            shape: CallShape::Legacy,
        },
    }
}

fn positional(args: &[Arg<'_>]) -> RenderRequest {
    let arg = |i: usize| args.get(i).unwrap_or(&Arg::Null);

    RenderRequest {
        width: to_int(arg(0)),
        height: to_int(arg(1)),
        format: to_str(arg(2)).map(str::to_lowercase),
        id: to_str(arg(3)).map(String::from),
    }
}

fn to_int(arg: &Arg<'_>) -> Option<i32> {
    let n = match *arg {
        Arg::Number(n) => n,
        Arg::Str(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    if n.is_nan() {
        Some(0)
    } else {
        // saturating, like any float to int cast
        Some(n.trunc() as i32)
    }
}

fn to_str<'a>(arg: &Arg<'a>) -> Option<&'a str> {
    match *arg {
        Arg::Str(s) => Some(s),
        _ => None,
    }
}
