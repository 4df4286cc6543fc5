//! Rendering a document, or one of its elements, into an output of a given size.
//!
//! Every output format goes through the same step: a new tree is built whose canvas
//! has the requested size, and whose only content is the thing being rendered, scaled
//! uniformly to fit and centered.  That tree is then rasterized, or converted to PDF,
//! or written back as SVG.

use tiny_skia::Pixmap;
use usvg::{
    AspectRatio, Group, Node, NonZeroRect, Size, Transform, TreeWriting, ViewBox, XmlOptions,
};

use super::{pixels, OutputFormat, Rectangle, RenderedImage};
use crate::args::RenderRequest;
use crate::error::RenderingError;

/// What is being rendered or measured.
pub enum Subject<'a> {
    Document,
    Element(&'a Node),
}

/// Finds an element from a fragment identifier like `#foo`.
pub fn lookup_node<'a>(tree: &'a usvg::Tree, id: &str) -> Result<&'a Node, RenderingError> {
    let fragment = id
        .strip_prefix('#')
        .filter(|f| !f.is_empty())
        .ok_or_else(|| RenderingError::InvalidId(id.to_string()))?;

    tree.node_by_id(fragment).ok_or(RenderingError::IdNotFound)
}

/// Maps user space of the root element to document pixels.
pub fn viewport_transform(tree: &usvg::Tree) -> Transform {
    usvg::utils::view_box_to_transform(tree.view_box.rect, tree.view_box.aspect, tree.size)
}

/// Natural size of the document in whole pixels.
pub fn document_size(tree: &usvg::Tree) -> (u32, u32) {
    (
        tree.size.width().round() as u32,
        tree.size.height().round() as u32,
    )
}

/// Extents of the subject in document pixels, including strokes.
pub fn extents(tree: &usvg::Tree, subject: &Subject<'_>) -> Rectangle {
    match *subject {
        Subject::Document => {
            let (w, h) = document_size(tree);
            Rectangle::from_size(f64::from(w), f64::from(h))
        }

        Subject::Element(node) => {
            let viewport = viewport_transform(tree);

            let bbox = match node.abs_stroke_bounding_box() {
                Some(r) => r.transform(viewport).map(|r| r.to_rect()),
                None => node.abs_bounding_box().and_then(|r| r.transform(viewport)),
            };

            bbox.map(|r| {
                Rectangle::new(
                    f64::from(r.x()),
                    f64::from(r.y()),
                    f64::from(r.width()),
                    f64::from(r.height()),
                )
            })
            .unwrap_or_default()
        }
    }
}

/// The output size for a request: given sizes win, a missing one keeps the aspect
/// ratio of the subject, and with neither the subject's own size is used.
pub fn output_size(
    width: Option<i32>,
    height: Option<i32>,
    extents: &Rectangle,
) -> Result<(u32, u32), RenderingError> {
    if matches!(width, Some(w) if w <= 0) {
        return Err(RenderingError::InvalidSize("width"));
    }

    if matches!(height, Some(h) if h <= 0) {
        return Err(RenderingError::InvalidSize("height"));
    }

    let natural_w = extents.width.ceil().max(1.0);
    let natural_h = extents.height.ceil().max(1.0);

    let (w, h) = match (width, height) {
        (Some(w), Some(h)) => (f64::from(w), f64::from(h)),
        (Some(w), None) => (f64::from(w), (f64::from(w) * extents.height / extents.width).round()),
        (None, Some(h)) => ((f64::from(h) * extents.width / extents.height).round(), f64::from(h)),
        (None, None) => (natural_w, natural_h),
    };

    Ok((w.max(1.0) as u32, h.max(1.0) as u32))
}

/// Builds a `width` by `height` tree that shows only the subject.
pub fn framed_tree(
    tree: &usvg::Tree,
    subject: &Subject<'_>,
    extents: &Rectangle,
    width: u32,
    height: u32,
) -> Result<usvg::Tree, RenderingError> {
    let (w, h) = (f64::from(width), f64::from(height));

    let scale = (w / extents.width).min(h / extents.height);
    let offset_x = ((w - (scale * extents.width).round()) / 2.0).trunc();
    let offset_y = ((h - (scale * extents.height).round()) / 2.0).trunc();

    let frame = Transform::from_translate(offset_x as f32, offset_y as f32)
        .pre_scale(scale as f32, scale as f32)
        .pre_translate(-extents.x as f32, -extents.y as f32);

    let children = match *subject {
        Subject::Document => tree.root.children.clone(),
        Subject::Element(node) => vec![detach(node)],
    };

    let content = Group {
        transform: viewport_transform(tree),
        children,
        ..Group::default()
    };

    let framed = Group {
        transform: frame,
        children: vec![Node::Group(Box::new(content))],
        ..Group::default()
    };

    let size = Size::from_wh(width as f32, height as f32).ok_or(RenderingError::InvalidDimensions)?;
    let rect = NonZeroRect::from_xywh(0.0, 0.0, width as f32, height as f32)
        .ok_or(RenderingError::InvalidDimensions)?;

    let mut result = usvg::Tree {
        size,
        view_box: ViewBox {
            rect,
            aspect: AspectRatio::default(),
        },
        root: Group {
            children: vec![Node::Group(Box::new(framed))],
            ..Group::default()
        },
    };

    result.calculate_abs_transforms();
    result.calculate_bounding_boxes();

    Ok(result)
}

/// A copy of `node` that can be placed directly under the root.
fn detach(node: &Node) -> Node {
    match *node {
        Node::Group(ref group) => {
            let mut group = group.clone();
            group.transform = group.abs_transform;
            Node::Group(group)
        }

        _ => Node::Group(Box::new(Group {
            transform: node.abs_transform(),
            children: vec![node.clone()],
            ..Group::default()
        })),
    }
}

pub fn rasterize(tree: &usvg::Tree, transform: Transform, width: u32, height: u32) -> Result<Pixmap, RenderingError> {
    let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
        RenderingError::OutOfMemory(format!("cannot create a {width}x{height} pixmap"))
    })?;

    resvg::render(tree, transform, &mut pixmap.as_mut());

    Ok(pixmap)
}

pub fn render(tree: &usvg::Tree, request: &RenderRequest) -> Result<RenderedImage, RenderingError> {
    // Same order of checks as always: sizes, format, element, geometry.
    if matches!(request.width(), Some(w) if w <= 0) {
        return Err(RenderingError::InvalidSize("width"));
    }

    if matches!(request.height(), Some(h) if h <= 0) {
        return Err(RenderingError::InvalidSize("height"));
    }

    let format = OutputFormat::parse(request.format())?;

    let subject = match request.id() {
        Some(id) => Subject::Element(lookup_node(tree, id).map_err(|e| match e {
            RenderingError::InvalidId(_) => RenderingError::IdNotFound,
            e => e,
        })?),
        None => Subject::Document,
    };

    let extents = extents(tree, &subject);
    if extents.is_empty() {
        return Err(RenderingError::InvalidDimensions);
    }

    let (width, height) = output_size(request.width(), request.height(), &extents)?;
    let framed = framed_tree(tree, &subject, &extents, width, height)?;

    let (data, stride) = match format {
        OutputFormat::Raw(pixel_format) => {
            let pixmap = rasterize(&framed, Transform::identity(), width, height)?;
            let (data, stride) = pixels::convert(&pixmap, pixel_format);
            (data, Some(stride))
        }

        OutputFormat::Png => {
            let pixmap = rasterize(&framed, Transform::identity(), width, height)?;
            let data = pixmap
                .encode_png()
                .map_err(|e| RenderingError::Rendering(format!("{e}")))?;
            (data, None)
        }

        OutputFormat::Pdf => (svg2pdf::convert_tree(&framed, svg2pdf::Options::default()), None),

        OutputFormat::Svg => (framed.to_string(&XmlOptions::default()).into_bytes(), None),
    };

    Ok(RenderedImage {
        data,
        format,
        width,
        height,
        stride,
    })
}
