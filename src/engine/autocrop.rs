//! Finding the extents of what a document actually draws.
//!
//! Geometry alone is not enough for this, since transparent or clipped content has a
//! bounding box too.  Instead, the document is rendered into a small tile, and the
//! first row that differs from the top row tells where the drawing starts.  That row
//! is then rendered on its own, scaled up to the size of a tile, to find the edge
//! with sub-pixel precision.  The same is done for the bottom, left and right edges.

use tiny_skia::Transform;

use super::render::{document_size, rasterize};
use super::Rectangle;
use crate::error::RenderingError;
use crate::limits::{AUTOCROP_MAX_DEPTH, AUTOCROP_PRECISION, AUTOCROP_TILE_SIZE};

#[derive(Debug, Copy, Clone, PartialEq)]
struct Region {
    top: f64,
    bottom: f64,
    left: f64,
    right: f64,
}

#[derive(Debug, Copy, Clone, PartialEq)]
enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

pub fn autocrop(tree: &usvg::Tree) -> Result<Rectangle, RenderingError> {
    let (width, height) = document_size(tree);

    let mut area = Region {
        top: 0.0,
        bottom: f64::from(height),
        left: 0.0,
        right: f64::from(width),
    };

    for edge in [Edge::Top, Edge::Bottom, Edge::Left, Edge::Right] {
        crop(tree, &mut area, edge, 0)?;
    }

    Ok(Rectangle::new(
        area.left,
        area.top,
        area.right - area.left,
        area.bottom - area.top,
    ))
}

fn crop(tree: &usvg::Tree, region: &mut Region, edge: Edge, depth: u32) -> Result<(), RenderingError> {
    if region.bottom - region.top < AUTOCROP_PRECISION
        || region.right - region.left < AUTOCROP_PRECISION
        || depth > AUTOCROP_MAX_DEPTH
    {
        return Ok(());
    }

    let size = AUTOCROP_TILE_SIZE;
    let tile_size = f64::from(size);
    let sx = tile_size / (region.right - region.left);
    let sy = tile_size / (region.bottom - region.top);

    let transform = Transform::from_scale(sx as f32, sy as f32)
        .pre_translate(-region.left as f32, -region.top as f32);

    let pixmap = rasterize(tree, transform, size, size)?;
    let tile = Tile {
        data: pixmap.data(),
        size: size as usize,
    };

    if tile.area_color(0, tile.size - 1, 0, tile.size - 1).is_some() {
        return Ok(());
    }

    let to_user_x = |x: f64| x / sx + region.left;
    let to_user_y = |y: f64| y / sy + region.top;

    let (top, bottom, left, right) = match edge {
        Edge::Top => {
            let top = tile.find_edge(0, 1) as f64;
            (top, top + 1.0, 0.0, tile_size)
        }

        Edge::Bottom => {
            let bottom = tile.find_edge(0, -1) as f64 + 1.0;
            (bottom - 1.0, bottom, 0.0, tile_size)
        }

        Edge::Left => {
            let left = tile.find_edge(1, 0) as f64;
            (0.0, tile_size, left, left + 1.0)
        }

        Edge::Right => {
            let right = tile.find_edge(-1, 0) as f64 + 1.0;
            (0.0, tile_size, right - 1.0, right)
        }
    };

    let mut sub = Region {
        top: to_user_y(top),
        bottom: to_user_y(bottom),
        left: to_user_x(left),
        right: to_user_x(right),
    };

    crop(tree, &mut sub, edge, depth + 1)?;

    match edge {
        Edge::Top => region.top = sub.top,
        Edge::Bottom => region.bottom = sub.bottom,
        Edge::Left => region.left = sub.left,
        Edge::Right => region.right = sub.right,
    }

    Ok(())
}

/// A square of premultiplied RGBA pixels.
struct Tile<'a> {
    data: &'a [u8],
    size: usize,
}

impl<'a> Tile<'a> {
    fn pixel(&self, x: usize, y: usize) -> &'a [u8] {
        let offset = (y * self.size + x) * 4;
        &self.data[offset..offset + 4]
    }

    /// The color of an inclusive area, if the whole area has a single color.
    fn area_color(&self, x0: usize, x1: usize, y0: usize, y1: usize) -> Option<&'a [u8]> {
        let color = self.pixel(x0, y0);

        for x in x0..=x1 {
            for y in y0..=y1 {
                if self.pixel(x, y) != color {
                    return None;
                }
            }
        }

        Some(color)
    }

    /// Walks lines from one side of the tile, in direction `(dx, dy)`, and returns
    /// the index of the first line that is not the same uniform color as the first
    /// one; or of the last line, if all of them are.
    fn find_edge(&self, dx: isize, dy: isize) -> usize {
        let last = self.size as isize - 1;

        let (mut x0, mut x1, mut y0, mut y1) = match (dx, dy) {
            (1, _) => (0, 0, 0, last),
            (-1, _) => (last, last, 0, last),
            (_, 1) => (0, last, 0, 0),
            (_, -1) => (0, last, last, last),
            _ => return 0,
        };

        let in_bounds = |v: isize| (0..=last).contains(&v);
        let mut edge_color = None;

        loop {
            let color = self.area_color(x0 as usize, x1 as usize, y0 as usize, y1 as usize);

            if edge_color.is_none() {
                edge_color = color;
            }

            if color.is_none() || color != edge_color {
                break;
            }

            let next = (x0 + dx, x1 + dx, y0 + dy, y1 + dy);
            if !(in_bounds(next.0) && in_bounds(next.1) && in_bounds(next.2) && in_bounds(next.3)) {
                break;
            }

            (x0, x1, y0, y1) = next;
        }

        if dx != 0 {
            x0 as usize
        } else {
            y0 as usize
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile_with_rows(size: usize, painted_rows: std::ops::Range<usize>) -> Vec<u8> {
        let mut data = vec![0u8; size * size * 4];
        for y in painted_rows {
            for x in 0..size {
                let offset = (y * size + x) * 4;
                data[offset..offset + 4].copy_from_slice(&[255, 0, 0, 255]);
            }
        }
        data
    }

    #[test]
    fn finds_first_differing_row_from_each_side() {
        let data = tile_with_rows(10, 3..7);
        let tile = Tile {
            data: &data,
            size: 10,
        };

        assert_eq!(tile.find_edge(0, 1), 3);
        assert_eq!(tile.find_edge(0, -1), 6);
        assert_eq!(tile.find_edge(1, 0), 0);
        assert!(tile.area_color(0, 9, 0, 9).is_none());
        assert!(tile.area_color(0, 9, 3, 6).is_some());
    }

    #[test]
    fn uniform_tile_walks_to_the_far_side() {
        let data = tile_with_rows(4, 0..0);
        let tile = Tile {
            data: &data,
            size: 4,
        };

        assert_eq!(tile.find_edge(0, 1), 3);
        assert_eq!(tile.find_edge(-1, 0), 0);
    }
}
