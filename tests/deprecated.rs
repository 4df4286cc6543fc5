//! Warnings are sent once per process, so every message is used by a single test.

#![allow(deprecated)]

use rsvg_stream::deprecated::{
    DPI_X, DPI_Y, GET_DPI, RENDER_PDF, RENDER_PNG, RENDER_POSITIONAL, RENDER_RAW, RENDER_SVG,
    SET_DPI,
};
use rsvg_stream::{Arg, Event, OutputFormat, PixelFormat, RenderOptions};

mod utils;

use self::utils::{load, png_size, record, SHAPES};

fn deprecations(events: &[Event]) -> Vec<&'static str> {
    events
        .iter()
        .filter_map(|e| match *e {
            Event::Deprecation(msg) => Some(msg),
            _ => None,
        })
        .collect()
}

#[test]
fn horizontal_dpi() {
    let mut svg = load(SHAPES);
    let events = record(&svg);

    assert_eq!(svg.dpi_x(), Ok(90.0));
    svg.set_dpi_x(300.0).unwrap();
    assert_eq!(svg.dpi_x(), Ok(300.0));

    svg.set_dpi_x(-1.0).unwrap();
    assert_eq!(svg.dpi_x(), Ok(90.0));

    assert_eq!(deprecations(&events.borrow()), vec![DPI_X]);

    // a second document is not warned again
    let other = load(SHAPES);
    let other_events = record(&other);
    other.dpi_x().unwrap();
    assert!(other_events.borrow().is_empty());
}

#[test]
fn vertical_dpi() {
    let mut svg = load(SHAPES);
    let events = record(&svg);

    svg.set_dpi_y(72.0).unwrap();
    assert_eq!(svg.dpi_y(), Ok(72.0));

    assert_eq!(deprecations(&events.borrow()), vec![DPI_Y]);
}

#[test]
fn dpi_pair() {
    let mut svg = load(SHAPES);
    let events = record(&svg);

    let dpi = svg.dpi().unwrap();
    assert_eq!((dpi.x(), dpi.y()), (90.0, 90.0));

    svg.set_dpi(Some(150.0), None).unwrap();
    let dpi = svg.dpi().unwrap();
    assert_eq!((dpi.x(), dpi.y()), (150.0, 150.0));

    svg.set_dpi(Some(150.0), Some(75.0)).unwrap();
    let dpi = svg.dpi().unwrap();
    assert_eq!((dpi.x(), dpi.y()), (150.0, 75.0));

    svg.set_dpi(None, None).unwrap();
    let dpi = svg.dpi().unwrap();
    assert_eq!((dpi.x(), dpi.y()), (90.0, 90.0));

    assert_eq!(deprecations(&events.borrow()), vec![GET_DPI, SET_DPI]);
}

#[test]
fn positional_render() {
    let svg = load(SHAPES);
    let events = record(&svg);

    let image = svg
        .render_legacy(Some(24), Some(20), Some("PNG"), None)
        .unwrap();
    assert_eq!(image.format, OutputFormat::Png);
    assert_eq!(png_size(&image.data), Some((24, 20)));

    let again = svg
        .render_args(&[Arg::Number(24.0), Arg::Number(20.0), Arg::Str("png")])
        .unwrap();
    assert_eq!(image, again);

    // the canonical shape is not deprecated
    svg.render_args(&[Arg::RenderOptions(RenderOptions::new())])
        .unwrap();

    assert_eq!(deprecations(&events.borrow()), vec![RENDER_POSITIONAL]);
}

#[test]
fn format_shortcuts() {
    let svg = load(SHAPES);
    let events = record(&svg);

    let raw = svg.render_raw(12, 10, None).unwrap();
    assert_eq!(raw.format, OutputFormat::Raw(PixelFormat::Argb32));
    assert_eq!(raw.data.len(), 12 * 10 * 4);

    let png = svg.render_png(8, 12, Some("#r2")).unwrap();
    assert_eq!(png_size(&png.data), Some((8, 12)));

    let pdf = svg.render_pdf(12, 10, None).unwrap();
    assert!(pdf.data.starts_with(b"%PDF"));

    let vector = svg.render_svg(12, 10, None).unwrap();
    assert_eq!(vector.format, OutputFormat::Svg);

    // shortcuts fail exactly like render()
    let e = svg.render_png(0, 10, None).unwrap_err();
    assert_eq!(e.to_string(), "Expected width > 0.");

    assert_eq!(
        deprecations(&events.borrow()),
        vec![RENDER_RAW, RENDER_PNG, RENDER_PDF, RENDER_SVG]
    );
}
