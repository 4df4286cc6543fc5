//! Processing limits to mitigate malicious SVGs.

/// Maximum number of elements loadable per document.
///
/// This is a mitigation for SVG files which create millions of elements
/// in an attempt to exhaust memory.  We don't allow loading more than
/// this number of elements during the initial streaming load process.
pub const MAX_LOADED_ELEMENTS: usize = 1_000_000;

/// Maximum number of bytes a handle accepts without [`crate::LoadOptions::unlimited_size`].
pub const MAX_DOCUMENT_BYTES: usize = 10 * 1024 * 1024;

/// Side of the square tiles rendered while searching for the drawing extents.
pub const AUTOCROP_TILE_SIZE: u32 = 100;

/// Extents smaller than this are considered resolved by the autocrop search.
pub const AUTOCROP_PRECISION: f64 = 0.0001;

/// How many times the autocrop search may zoom into a one-pixel strip.
pub const AUTOCROP_MAX_DEPTH: u32 = 32;
