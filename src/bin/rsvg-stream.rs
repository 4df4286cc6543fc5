#![warn(nonstandard_style, rust_2018_idioms, unused)]

use std::cell::{Cell, RefCell};
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use clap::crate_version;
use thiserror::Error;
use url::Url;

use rsvg_stream::{LoadOptions, Rectangle, RenderOptions, ResvgEngine, Rsvg, Session};

#[derive(Debug, Error)]
enum Error {
    #[error("Error reading {input}: {source}")]
    Read { input: String, source: io::Error },

    #[error("Error writing output: {0}")]
    Write(#[from] io::Error),

    #[error("Error loading SVG {input}: {message}")]
    Load { input: String, message: String },

    #[error("{0}")]
    Rsvg(#[from] rsvg_stream::Error),

    #[error("Could not find the absolute path of {0}")]
    Path(String),
}

#[derive(Debug)]
enum Input {
    Stdin,
    Named(PathBuf),
}

impl std::fmt::Display for Input {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Input::Stdin => write!(f, "stdin"),
            Input::Named(ref p) => write!(f, "{}", p.display()),
        }
    }
}

#[derive(Debug)]
enum Action {
    Info,
    Autocrop,
    Render(RenderOptions),
}

#[derive(Debug)]
struct Streamer {
    input: Input,
    output: Option<PathBuf>,
    chunk_size: usize,
    base_uri: Option<String>,
    unlimited: bool,
    id: Option<String>,
    action: Action,
}

fn build_cli() -> clap::Command {
    clap::Command::new("rsvg-stream")
        .version(concat!("version ", crate_version!()))
        .about("Stream an SVG document in chunks, then measure or render it")
        .disable_help_flag(true)
        .arg(
            clap::Arg::new("help")
                .short('?')
                .long("help")
                .help("Display the help")
                .action(clap::ArgAction::Help),
        )
        .arg(
            clap::Arg::new("chunk_size")
                .short('c')
                .long("chunk-size")
                .value_name("bytes")
                .default_value("4096")
                .value_parser(clap::value_parser!(u32).range(1..))
                .help("Size of the chunks the input is written in"),
        )
        .arg(
            clap::Arg::new("info")
                .long("info")
                .action(clap::ArgAction::SetTrue)
                .conflicts_with("autocrop")
                .help("Print the size of the document, or of the element given by --id"),
        )
        .arg(
            clap::Arg::new("autocrop")
                .long("autocrop")
                .action(clap::ArgAction::SetTrue)
                .help("Print the area of the document that has content"),
        )
        .arg(
            clap::Arg::new("format")
                .short('f')
                .long("format")
                .value_name("name")
                .default_value("png")
                .help("Output format: png, pdf, svg, raw or a raw pixel format like argb32"),
        )
        .arg(
            clap::Arg::new("width")
                .short('w')
                .long("width")
                .value_name("pixels")
                .value_parser(clap::value_parser!(i32))
                .help("Width [defaults to the width of the SVG]"),
        )
        .arg(
            clap::Arg::new("height")
                .short('h')
                .long("height")
                .value_name("pixels")
                .value_parser(clap::value_parser!(i32))
                .help("Height [defaults to the height of the SVG]"),
        )
        .arg(
            clap::Arg::new("id")
                .short('i')
                .long("id")
                .value_name("id")
                .help("Only measure or render the element with this id"),
        )
        .arg(
            clap::Arg::new("output")
                .short('o')
                .long("output")
                .value_name("file")
                .value_parser(clap::value_parser!(PathBuf))
                .help("Output filename [defaults to stdout]"),
        )
        .arg(
            clap::Arg::new("base_uri")
                .short('b')
                .long("base-uri")
                .value_name("url")
                .help("Base URI for references [defaults to the input file]"),
        )
        .arg(
            clap::Arg::new("unlimited")
                .short('u')
                .long("unlimited")
                .action(clap::ArgAction::SetTrue)
                .help("Allow huge SVG files"),
        )
        .arg(
            clap::Arg::new("FILE")
                .value_parser(clap::value_parser!(PathBuf))
                .help("The input file [defaults to stdin]"),
        )
}

fn parse_args() -> Result<Streamer, clap::Error> {
    let matches = build_cli().try_get_matches()?;

    let input = match matches.get_one::<PathBuf>("FILE") {
        Some(p) if p.as_os_str() != "-" => Input::Named(p.clone()),
        _ => Input::Stdin,
    };

    // An id may be given with or without the leading '#'.
    let id = matches.get_one::<String>("id").map(|id| {
        if id.starts_with('#') {
            id.clone()
        } else {
            format!("#{id}")
        }
    });

    let action = if matches.get_flag("info") {
        Action::Info
    } else if matches.get_flag("autocrop") {
        Action::Autocrop
    } else {
        Action::Render(RenderOptions {
            format: matches.get_one::<String>("format").cloned(),
            width: matches.get_one::<i32>("width").copied(),
            height: matches.get_one::<i32>("height").copied(),
            id: id.clone(),
        })
    };

    let chunk_size = matches.get_one::<u32>("chunk_size").copied().unwrap_or(4096);

    Ok(Streamer {
        input,
        output: matches.get_one::<PathBuf>("output").cloned(),
        chunk_size: chunk_size as usize,
        base_uri: matches.get_one::<String>("base_uri").cloned(),
        unlimited: matches.get_flag("unlimited"),
        id,
        action,
    })
}

fn file_url(path: &Path) -> Result<String, Error> {
    let absolute = path
        .canonicalize()
        .map_err(|_| Error::Path(path.display().to_string()))?;

    Url::from_file_path(&absolute)
        .map(String::from)
        .map_err(|_| Error::Path(path.display().to_string()))
}

impl Streamer {
    fn run(self) -> Result<(), Error> {
        let svg = self.load()?;

        match self.action {
            Action::Info => {
                let mut out = Vec::new();
                writeln!(out, "width: {}", svg.width()?)?;
                writeln!(out, "height: {}", svg.height()?)?;

                if let Some(ref id) = self.id {
                    let r = svg.dimensions(Some(id))?;
                    writeln!(out, "{id}: {}", format_rect(&r))?;
                }

                self.write_output(&out)
            }

            Action::Autocrop => {
                let r = svg.autocrop()?;
                self.write_output(format!("{}\n", format_rect(&r)).as_bytes())
            }

            Action::Render(ref options) => {
                let image = svg.render(options)?;
                self.write_output(&image.data)
            }
        }
    }

    fn load(&self) -> Result<Rsvg, Error> {
        let session = Session::new();
        let engine = ResvgEngine::new(session.clone()).with_options(LoadOptions {
            unlimited_size: self.unlimited,
        });

        let mut svg = Rsvg::with_engine(engine, None, session)?;

        let base_uri = match (&self.base_uri, &self.input) {
            (Some(uri), _) => Some(uri.clone()),
            (None, Input::Named(p)) => Some(file_url(p)?),
            (None, Input::Stdin) => None,
        };
        svg.set_base_uri(base_uri.as_deref())?;

        let loaded = Rc::new(Cell::new(false));
        let errors = Rc::new(RefCell::new(Vec::new()));

        {
            let loaded = loaded.clone();
            svg.on_load(move || loaded.set(true));

            let errors = errors.clone();
            svg.on_error(move |e| errors.borrow_mut().push(e.to_string()));
        }

        let mut reader: Box<dyn Read> = match self.input {
            Input::Stdin => Box::new(io::stdin()),
            Input::Named(ref p) => Box::new(File::open(p).map_err(|e| self.read_error(e))?),
        };

        let mut buf = vec![0u8; self.chunk_size];
        loop {
            let n = reader.read(&mut buf).map_err(|e| self.read_error(e))?;
            if n == 0 {
                break;
            }

            svg.write(&buf[..n]);
        }

        svg.end();

        if loaded.get() {
            for e in errors.borrow().iter() {
                eprintln!("warning: {e}");
            }

            Ok(svg)
        } else {
            let message = errors
                .borrow()
                .last()
                .cloned()
                .unwrap_or_else(|| "unknown error".to_string());

            Err(Error::Load {
                input: self.input.to_string(),
                message,
            })
        }
    }

    fn read_error(&self, source: io::Error) -> Error {
        Error::Read {
            input: self.input.to_string(),
            source,
        }
    }

    fn write_output(&self, data: &[u8]) -> Result<(), Error> {
        match self.output {
            Some(ref p) => File::create(p)?.write_all(data)?,
            None => {
                let stdout = io::stdout();
                let mut lock = stdout.lock();
                lock.write_all(data)?;
                lock.flush()?;
            }
        }

        Ok(())
    }
}

fn format_rect(r: &Rectangle) -> String {
    format!(
        "x={} y={} width={} height={}",
        r.x, r.y, r.width, r.height
    )
}

fn main() {
    let streamer = match parse_args() {
        Ok(s) => s,
        Err(e) => e.exit(),
    };

    if let Err(e) = streamer.run() {
        std::eprintln!("{e}");
        std::process::exit(1);
    }
}
