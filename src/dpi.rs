//! Resolution of a document, in dots per inch.
//!
//! The resolution is stored and reported back, but it has no effect on rendering;
//! documents are always measured in CSS pixels.  A value of zero or less means "use
//! the default", which is what older versions of the library did.

pub const DEFAULT_DPI_X: f64 = 90.0;
pub const DEFAULT_DPI_Y: f64 = 90.0;

#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Dpi {
    x: f64,
    y: f64,
}

impl Dpi {
    pub fn new(x: f64, y: f64) -> Dpi {
        Dpi { x, y }
    }

    pub fn x(&self) -> f64 {
        if self.x <= 0.0 || !self.x.is_finite() {
            DEFAULT_DPI_X
        } else {
            self.x
        }
    }

    pub fn y(&self) -> f64 {
        if self.y <= 0.0 || !self.y.is_finite() {
            DEFAULT_DPI_Y
        } else {
            self.y
        }
    }

    pub fn with_x(self, x: f64) -> Dpi {
        Dpi { x, ..self }
    }

    pub fn with_y(self, y: f64) -> Dpi {
        Dpi { y, ..self }
    }
}
