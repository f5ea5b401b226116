//! Packs palette indices into bytes at 1, 4 or 8 bits per pixel.
//!
//! Inside a byte the leftmost pixel takes the most significant bits, so the
//! shift for the pixel at offset `x` is `(pixels_per_byte - 1 - x % pixels_per_byte) * bpp`.

use crate::image::format::BitDepth;

#[inline]
fn shift_for(depth: BitDepth, x: usize) -> usize {
    let ppb = depth.pixels_per_byte();
    (ppb - 1 - x % ppb) * depth.bits()
}

/// Packs `values` as one continuous bit stream.
///
/// Row ends do not start a new byte; the last byte is zero-filled.
pub fn pack(values: &[u8], depth: BitDepth) -> Vec<u8> {
    if depth == BitDepth::Eight {
        return values.to_vec();
    }
    let mut out = vec![0u8; values.len().div_ceil(depth.pixels_per_byte())];
    write_run(&mut out, values, depth);
    out
}

/// Packs `values` row by row, each row starting on a fresh byte.
pub fn pack_rows(values: &[u8], width: usize, depth: BitDepth) -> Vec<u8> {
    if width == 0 {
        return Vec::new();
    }
    let stride = width.div_ceil(depth.pixels_per_byte());
    let rows = values.len().div_ceil(width);
    let mut out = vec![0u8; stride * rows];
    for (row, run) in values.chunks(width).enumerate() {
        write_run(&mut out[row * stride..(row + 1) * stride], run, depth);
    }
    out
}

fn write_run(out: &mut [u8], run: &[u8], depth: BitDepth) {
    let ppb = depth.pixels_per_byte();
    for (x, &value) in run.iter().enumerate() {
        out[x / ppb] |= (value & depth.mask()) << shift_for(depth, x);
    }
}

/// Reads `count` values back out of a continuous stream produced by [`pack`].
pub fn unpack(bytes: &[u8], count: usize, depth: BitDepth) -> Vec<u8> {
    read_run(bytes, count, depth)
}

/// Reads `rows` rows of `width` values produced by [`pack_rows`].
pub fn unpack_rows(bytes: &[u8], width: usize, rows: usize, depth: BitDepth) -> Vec<u8> {
    if width == 0 {
        return Vec::new();
    }
    let stride = width.div_ceil(depth.pixels_per_byte());
    let mut values = Vec::with_capacity(width * rows);
    for row in bytes.chunks(stride).take(rows) {
        values.extend(read_run(row, width, depth));
    }
    values
}

fn read_run(bytes: &[u8], count: usize, depth: BitDepth) -> Vec<u8> {
    let ppb = depth.pixels_per_byte();
    (0..count)
        .map(|x| (bytes[x / ppb] >> shift_for(depth, x)) & depth.mask())
        .collect()
}
