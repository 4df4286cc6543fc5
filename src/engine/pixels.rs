//! Conversion from `tiny-skia` pixmaps to Cairo's memory layouts.
//!
//! A pixmap is premultiplied RGBA, one byte per channel.  Cairo packs pixels into
//! native-endian words, which is what callers of the raw format have always received.

use tiny_skia::Pixmap;

use super::PixelFormat;

/// Returns the converted data and its stride.
pub fn convert(pixmap: &Pixmap, format: PixelFormat) -> (Vec<u8>, usize) {
    let width = pixmap.width();
    let stride = format.stride(width);
    let mut data = vec![0u8; stride * pixmap.height() as usize];

    for (src_row, dest_row) in pixmap
        .data()
        .chunks_exact(width as usize * 4)
        .zip(data.chunks_exact_mut(stride))
    {
        for (x, px) in src_row.chunks_exact(4).enumerate() {
            let (r, g, b, a) = (px[0], px[1], px[2], px[3]);

            match format {
                PixelFormat::Argb32 => put_u32(dest_row, x, pack(a, r, g, b)),

                PixelFormat::Rgb24 => put_u32(dest_row, x, pack(0, r, g, b)),

                PixelFormat::Rgb30 => {
                    let v = (widen(r) << 20) | (widen(g) << 10) | widen(b);
                    put_u32(dest_row, x, v);
                }

                PixelFormat::Rgb16_565 => {
                    let v = (u16::from(r >> 3) << 11) | (u16::from(g >> 2) << 5) | u16::from(b >> 3);
                    dest_row[x * 2..x * 2 + 2].copy_from_slice(&v.to_ne_bytes());
                }

                PixelFormat::A8 => dest_row[x] = a,

                PixelFormat::A1 => {
                    if a >= 0x80 {
                        let word = x / 32;
                        let mut v = get_u32(dest_row, word);
                        v |= a1_bit(x % 32);
                        put_u32(dest_row, word, v);
                    }
                }
            }
        }
    }

    (data, stride)
}

fn pack(a: u8, r: u8, g: u8, b: u8) -> u32 {
    u32::from(a) << 24 | u32::from(r) << 16 | u32::from(g) << 8 | u32::from(b)
}

// 8 to 10 bits, replicating the top bits
fn widen(v: u8) -> u32 {
    let v = u32::from(v);
    (v << 2) | (v >> 6)
}

// Cairo numbers A1 pixels from the least significant bit on little-endian machines,
// and from the most significant bit on big-endian ones.
fn a1_bit(index: usize) -> u32 {
    if cfg!(target_endian = "little") {
        1 << index
    } else {
        0x8000_0000 >> index
    }
}

fn put_u32(row: &mut [u8], index: usize, v: u32) {
    row[index * 4..index * 4 + 4].copy_from_slice(&v.to_ne_bytes());
}

fn get_u32(row: &[u8], index: usize) -> u32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&row[index * 4..index * 4 + 4]);
    u32::from_ne_bytes(bytes)
}
