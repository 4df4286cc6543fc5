#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use rsvg_stream::{Event, ResvgEngine, Rsvg, Session};

pub const SHAPES: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="12" height="10">
  <rect x="-2" y="3" width="7" height="5" id="r1"/>
  <rect x="8" y="4" width="4" height="6" id="r2" fill="red"/>
  <circle cx="8" cy="3" r="3" id="circ"/>
</svg>
"##;

/// An empty document that does not log, whatever `RSVG_LOG` says.
pub fn empty() -> Rsvg {
    let session = Session::new_for_test_suite();
    Rsvg::with_engine(ResvgEngine::new(session.clone()), None, session).unwrap()
}

pub fn load(svg: &str) -> Rsvg {
    let session = Session::new_for_test_suite();
    Rsvg::with_engine(ResvgEngine::new(session.clone()), Some(svg.as_bytes()), session).unwrap()
}

/// Collects every event `svg` sends from now on.
pub fn record(svg: &Rsvg) -> Rc<RefCell<Vec<Event>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let e = events.clone();
    svg.on_event(move |event| e.borrow_mut().push(event.clone()));
    events
}

pub fn png_size(data: &[u8]) -> Option<(u32, u32)> {
    let decoder = png::Decoder::new(data);
    let reader = decoder.read_info().ok()?;
    let info = reader.info();
    Some((info.width, info.height))
}
