use float_cmp::approx_eq;
use matches::matches;

use rsvg_stream::{
    Arg, Error, Event, LoadingError, RenderOptions, RenderingError, Rectangle, Rsvg, State,
    StreamOptions, WriteError,
};

mod utils;

use self::utils::{empty, load, record, SHAPES};

#[test]
fn complete_document_loads_before_constructor_returns() {
    let svg = load(r#"<svg width="5" height="7"></svg>"#);
    let events = record(&svg);

    assert_eq!(svg.width(), Ok(5));
    assert_eq!(svg.height(), Ok(7));
    assert_eq!(*svg.state(), State::Sealed);

    // the load event waits for the next turn
    assert!(events.borrow().is_empty());
    assert!(svg.has_pending());

    assert_eq!(svg.run_pending(), 1);
    assert_eq!(*events.borrow(), vec![Event::Load]);

    assert_eq!(svg.run_pending(), 0);
    assert_eq!(events.borrow().len(), 1);
}

#[test]
fn streamed_document_loads_after_end() {
    let mut svg = empty();
    let events = record(&svg);

    assert!(svg.write(br#"<svg width="4" height="6">"#));
    assert!(svg.write(b"</svg>"));
    assert!(events.borrow().is_empty());

    svg.end();
    assert_eq!(*events.borrow(), vec![Event::Load]);

    svg.end();
    assert_eq!(svg.run_pending(), 0);
    assert_eq!(*events.borrow(), vec![Event::Load]);

    assert_eq!((svg.width(), svg.height()), (Ok(4), Ok(6)));
}

#[test]
fn size_is_known_before_the_document_ends() {
    let mut svg = empty();
    svg.write(br#"<svg width="4" height="6"><rect width="1" height="1"/>"#);

    assert_eq!(*svg.state(), State::Writable);
    assert_eq!((svg.width(), svg.height()), (Ok(4), Ok(6)));
}

#[test]
fn rejected_chunks_are_reported_one_by_one() {
    let mut svg = empty();
    let events = record(&svg);

    svg.write(b"this is not a SVG file");
    svg.write(b"this is not a SVG file");

    {
        let events = events.borrow();
        assert_eq!(events.len(), 2);

        for e in events.iter() {
            match *e {
                Event::Error(ref e @ Error::Write(WriteError::Rejected(_))) => {
                    assert!(e.to_string().starts_with("Rsvg write failure: "));
                }
                ref e => panic!("unexpected event {e:?}"),
            }
        }
    }

    assert_eq!(*svg.state(), State::Open);

    svg.write(br#"<svg width="2" height="3"/>"#);
    svg.end();

    assert_eq!(events.borrow().last(), Some(&Event::Load));
    assert_eq!(svg.width(), Ok(2));
}

#[test]
fn empty_document_is_shown_with_zero_size() {
    let svg = empty();
    let s = svg.to_string();
    assert!(s.contains("width: 0, height: 0"), "{s}");
}

#[test]
fn display_shows_base_uri_when_set() {
    let mut svg = load(r#"<svg width="5" height="7"/>"#);
    svg.set_base_uri(Some("file:///tmp/image.svg")).unwrap();

    assert_eq!(
        svg.to_string(),
        r#"{ [Rsvg] base_uri: "file:///tmp/image.svg", width: 5, height: 7 }"#
    );
}

#[test]
fn invalid_base_uri_is_ignored() {
    let mut svg = empty();
    svg.set_base_uri(Some("file:///tmp/image.svg")).unwrap();
    svg.set_base_uri(Some("not a url")).unwrap();

    assert_eq!(svg.base_uri(), Ok(Some("file:///tmp/image.svg".to_string())));
}

#[test]
fn write_after_end_fails_and_changes_nothing() {
    let mut svg = load(r#"<svg width="5" height="7"/>"#);
    let events = record(&svg);

    svg.write(br#"<svg width="50" height="70"/>"#);

    assert_eq!(
        *events.borrow(),
        vec![Event::Error(Error::Write(WriteError::HandleClosed))]
    );
    assert_eq!((svg.width(), svg.height()), (Ok(5), Ok(7)));
}

#[test]
fn malformed_initial_content_fails_construction() {
    let e = Rsvg::from_str("this is not a SVG file").unwrap_err();

    assert!(matches!(e, Error::Load(_)));
    assert!(e.to_string().starts_with("Rsvg load failure: "));
}

#[test]
fn initial_content_without_svg_root_fails_construction() {
    assert_eq!(
        Rsvg::from_str("<html/>").unwrap_err(),
        Error::Load(LoadingError::NoSvgRoot)
    );
}

#[test]
fn construction_from_loose_arguments() {
    let svg = Rsvg::from_arg(Arg::Bytes(br#"<svg width="3" height="4"/>"#)).unwrap();
    assert_eq!(svg.width(), Ok(3));

    let svg = Rsvg::from_arg(Arg::Null).unwrap();
    assert_eq!(*svg.state(), State::Open);

    let options = StreamOptions { high_water_mark: 1 };
    let svg = Rsvg::from_arg(Arg::StreamOptions(options)).unwrap();
    assert_eq!(svg.options().high_water_mark, 1);

    let e = Rsvg::from_arg(Arg::RenderOptions(RenderOptions::new())).unwrap_err();
    assert_eq!(e, Error::TypeMismatch("buffer"));
    assert_eq!(e.to_string(), "Invalid argument: buffer");
}

#[test]
fn element_dimensions() {
    let svg = load(SHAPES);

    assert_eq!(
        svg.dimensions(Some("#r1")),
        Ok(Rectangle::new(-2.0, 3.0, 7.0, 5.0))
    );

    let c = svg.dimensions(Some("#circ")).unwrap();
    assert!(approx_eq!(f64, c.x, 5.0, epsilon = 0.001));
    assert!(approx_eq!(f64, c.y, 0.0, epsilon = 0.001));
    assert!(approx_eq!(f64, c.width, 6.0, epsilon = 0.001));
    assert!(approx_eq!(f64, c.height, 6.0, epsilon = 0.001));

    assert_eq!(svg.dimensions(None), Ok(Rectangle::new(0.0, 0.0, 12.0, 10.0)));
}

#[test]
fn dimensions_of_missing_element_is_an_error() {
    let svg = load(SHAPES);

    assert_eq!(
        svg.dimensions(Some("#nope")),
        Err(Error::Rendering(RenderingError::IdNotFound))
    );
}

#[test]
fn has_element_never_fails() {
    let svg = load(SHAPES);

    assert!(svg.has_element(Some("#r1")));
    assert!(svg.has_element(Some("#circ")));
    assert!(!svg.has_element(Some("r1")));
    assert!(!svg.has_element(Some("#nope")));
    assert!(!svg.has_element(Some("")));
    assert!(!svg.has_element(None));

    assert!(!empty().has_element(Some("#r1")));
}

#[test]
fn autocrop_is_rounded_to_three_decimals() {
    let svg = load(
        r#"<svg width="100" height="100">
             <rect x="10.5" y="20.25" width="30" height="40.125"/>
           </svg>"#,
    );

    let area = svg.autocrop().unwrap();

    for v in [area.x, area.y, area.width, area.height] {
        assert_eq!((v * 1000.0).round() / 1000.0, v);
    }

    assert!(approx_eq!(f64, area.x, 10.5, epsilon = 0.01));
    assert!(approx_eq!(f64, area.y, 20.25, epsilon = 0.01));
    assert!(approx_eq!(f64, area.width, 30.0, epsilon = 0.02));
    assert!(approx_eq!(f64, area.height, 40.125, epsilon = 0.02));
}

#[test]
fn autocrop_of_empty_document_is_whole_document() {
    let svg = load(r#"<svg width="30" height="20"/>"#);
    assert_eq!(svg.autocrop(), Ok(Rectangle::new(0.0, 0.0, 30.0, 20.0)));
}

#[test]
fn both_render_call_shapes_give_the_same_image() {
    let svg = load(SHAPES);

    let canonical = svg
        .render_args(&[Arg::RenderOptions(
            RenderOptions::new().with_format("png").with_size(10, 20),
        )])
        .unwrap();

    let legacy = svg
        .render_args(&[
            Arg::Number(10.0),
            Arg::Number(20.0),
            Arg::Str("PNG"),
        ])
        .unwrap();

    assert_eq!(canonical, legacy);
    assert_eq!((canonical.width, canonical.height), (10, 20));
}

#[test]
fn fatal_error_faults_the_document() {
    let mut svg = empty();
    let events = record(&svg);

    svg.write(b"<svg/>");
    svg.write(b"<svg/>");

    assert!(matches!(*svg.state(), State::Faulted(_)));
    assert!(matches!(svg.dimensions(None), Err(Error::Faulted(_))));
    assert!(matches!(svg.width(), Err(Error::Faulted(_))));
    assert!(matches!(
        svg.render(&RenderOptions::new()),
        Err(Error::Faulted(_))
    ));
    assert!(!svg.has_element(Some("#r1")));
    assert!(svg.to_string().starts_with("{ [Rsvg] faulted: "));

    // writes keep failing, but ending does not repeat the same error
    svg.write(b" ");
    svg.end();

    let events = events.borrow();
    assert_eq!(events.len(), 2);
    assert!(matches!(events[0], Event::Error(Error::Write(WriteError::Fatal(_)))));
    assert!(matches!(events[1], Event::Error(Error::Faulted(_))));
}

#[test]
fn close_error_is_reported_once() {
    let mut svg = empty();
    let events = record(&svg);

    svg.end();
    svg.end();

    assert_eq!(
        *events.borrow(),
        vec![Event::Error(Error::Close(LoadingError::NoDataPassedToParser))]
    );
    assert_eq!(*svg.state(), State::Sealed);
    assert_eq!(svg.width(), Ok(0));
}

#[test]
fn split_multibyte_characters_are_accepted() {
    let data = r#"<svg width="8" height="9"><title>été</title></svg>"#.as_bytes();
    let split = data.iter().position(|&b| b == 0xc3).unwrap() + 1;

    let mut svg = empty();
    let events = record(&svg);

    svg.write(&data[..split]);
    svg.write(&data[split..]);
    svg.end();

    assert_eq!(*events.borrow(), vec![Event::Load]);
    assert_eq!(svg.height(), Ok(9));
}

#[test]
fn io_copy_into_a_document() {
    let data = SHAPES.as_bytes();
    let mut svg = empty();

    std::io::copy(&mut &data[..], &mut svg).unwrap();
    svg.end();

    assert!(svg.has_element(Some("#r2")));
}

#[test]
fn failed_close_after_data_reports_an_empty_document() {
    let mut svg = empty();
    let events = record(&svg);

    assert!(svg.write(br#"<svg width="4" height="6">"#));
    assert_eq!(svg.width(), Ok(4));

    svg.end();

    {
        let events = events.borrow();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], Event::Error(Error::Close(_))));
    }

    assert_eq!(*svg.state(), State::Sealed);
    assert_eq!((svg.width(), svg.height()), (Ok(0), Ok(0)));
    assert_eq!(svg.dimensions(None), Ok(Rectangle::default()));
    assert_eq!(
        svg.render(&RenderOptions::new()),
        Err(Error::Rendering(RenderingError::HandleIsNotLoaded))
    );
}

const WITH_ENTITIES: &str = r#"<?xml version="1.0"?>
<!DOCTYPE svg [
<!ENTITY w "5">
]>
<svg xmlns="http://www.w3.org/2000/svg" width="5" height="7"><rect id="r" width="&w;" height="2"/></svg>"#;

#[test]
fn doctype_with_internal_subset_loads() {
    let svg = Rsvg::from_str(WITH_ENTITIES).unwrap();

    assert_eq!((svg.width(), svg.height()), (Ok(5), Ok(7)));
    assert_eq!(svg.dimensions(Some("#r")), Ok(Rectangle::new(0.0, 0.0, 5.0, 2.0)));
}

#[test]
fn doctype_with_internal_subset_streams() {
    let mut svg = empty();
    let events = record(&svg);

    svg.feed(WITH_ENTITIES.as_bytes().chunks(7));

    assert_eq!(*events.borrow(), vec![Event::Load]);
    assert_eq!(svg.height(), Ok(7));
}

#[test]
fn cdata_style_block_streams() {
    let data = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE svg PUBLIC "-//W3C//DTD SVG 1.1//EN" "http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd">
<svg xmlns="http://www.w3.org/2000/svg" width="8" height="3">
  <style><![CDATA[ svg > .a { fill: red } ]]></style>
  <rect class="a" width="8" height="3"/>
</svg>"#;

    let mut svg = empty();
    let events = record(&svg);

    svg.feed(data.as_bytes().chunks(5));

    assert_eq!(*events.borrow(), vec![Event::Load]);
    assert_eq!((svg.width(), svg.height()), (Ok(8), Ok(3)));
}
