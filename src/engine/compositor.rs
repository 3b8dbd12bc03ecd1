//! Frame compositing primitives
//!
//! Pure RGBA pixel operations used by the renderer: an opaque canvas,
//! opaque blits, alpha blending, and quarter-turn rotation for orientation
//! normalization. All operations clip against the canvas bounds.

use crate::domain::model::{Dimensions, Orientation};

/// Bytes per RGBA pixel
pub const RGBA_CHANNELS: usize = 4;

/// Tightly packed RGBA pixel canvas, row-major, origin top-left
#[derive(Debug, Clone)]
pub struct Canvas {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Canvas {
    /// Create an opaque black canvas
    pub fn new(size: Dimensions) -> Self {
        let mut data = vec![0u8; size.width as usize * size.height as usize * RGBA_CHANNELS];
        for pixel in data.chunks_exact_mut(RGBA_CHANNELS) {
            pixel[3] = 255;
        }
        Self {
            width: size.width,
            height: size.height,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Packed RGBA pixel data
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Copy source pixels onto the canvas at (x, y), ignoring source alpha.
    /// Regions falling outside the canvas are clipped.
    pub fn blit(&mut self, src: &[u8], src_size: Dimensions, x: i64, y: i64) {
        self.compose(src, src_size, x, y, false);
    }

    /// Alpha-blend source pixels onto the canvas at (x, y). Regions falling
    /// outside the canvas are clipped; (x, y) may be negative.
    pub fn blend(&mut self, src: &[u8], src_size: Dimensions, x: i64, y: i64) {
        self.compose(src, src_size, x, y, true);
    }

    fn compose(&mut self, src: &[u8], src_size: Dimensions, x: i64, y: i64, use_alpha: bool) {
        let src_width = src_size.width as i64;
        let src_height = src_size.height as i64;
        if src.len() < (src_width * src_height) as usize * RGBA_CHANNELS {
            return;
        }

        for src_row in 0..src_height {
            let dst_row = y + src_row;
            if dst_row < 0 || dst_row >= self.height as i64 {
                continue;
            }
            for src_col in 0..src_width {
                let dst_col = x + src_col;
                if dst_col < 0 || dst_col >= self.width as i64 {
                    continue;
                }

                let src_offset = ((src_row * src_width + src_col) as usize) * RGBA_CHANNELS;
                let dst_offset =
                    ((dst_row * self.width as i64 + dst_col) as usize) * RGBA_CHANNELS;

                if use_alpha {
                    let alpha = src[src_offset + 3] as u32;
                    if alpha == 0 {
                        continue;
                    }
                    let inverse = 255 - alpha;
                    for channel in 0..3 {
                        let s = src[src_offset + channel] as u32;
                        let d = self.data[dst_offset + channel] as u32;
                        self.data[dst_offset + channel] =
                            ((s * alpha + d * inverse + 127) / 255) as u8;
                    }
                } else {
                    self.data[dst_offset..dst_offset + 3]
                        .copy_from_slice(&src[src_offset..src_offset + 3]);
                    self.data[dst_offset + 3] = 255;
                }
            }
        }
    }
}

/// Rotate packed RGBA pixels by the given display orientation, returning the
/// rotated pixels and their dimensions (swapped for quarter turns).
pub fn rotate_rgba(src: &[u8], size: Dimensions, orientation: Orientation) -> (Vec<u8>, Dimensions) {
    let width = size.width as usize;
    let height = size.height as usize;

    match orientation {
        Orientation::Up => (src.to_vec(), size),
        Orientation::Down => {
            let mut out = vec![0u8; src.len()];
            for row in 0..height {
                for col in 0..width {
                    let src_offset = (row * width + col) * RGBA_CHANNELS;
                    let dst_offset =
                        ((height - 1 - row) * width + (width - 1 - col)) * RGBA_CHANNELS;
                    out[dst_offset..dst_offset + RGBA_CHANNELS]
                        .copy_from_slice(&src[src_offset..src_offset + RGBA_CHANNELS]);
                }
            }
            (out, size)
        }
        Orientation::Right => {
            // 90 degrees clockwise: (col, row) -> (height - 1 - row, col)
            let mut out = vec![0u8; src.len()];
            for row in 0..height {
                for col in 0..width {
                    let src_offset = (row * width + col) * RGBA_CHANNELS;
                    let dst_offset = (col * height + (height - 1 - row)) * RGBA_CHANNELS;
                    out[dst_offset..dst_offset + RGBA_CHANNELS]
                        .copy_from_slice(&src[src_offset..src_offset + RGBA_CHANNELS]);
                }
            }
            (out, size.swapped())
        }
        Orientation::Left => {
            // 90 degrees counter-clockwise: (col, row) -> (row, width - 1 - col)
            let mut out = vec![0u8; src.len()];
            for row in 0..height {
                for col in 0..width {
                    let src_offset = (row * width + col) * RGBA_CHANNELS;
                    let dst_offset = ((width - 1 - col) * height + row) * RGBA_CHANNELS;
                    out[dst_offset..dst_offset + RGBA_CHANNELS]
                        .copy_from_slice(&src[src_offset..src_offset + RGBA_CHANNELS]);
                }
            }
            (out, size.swapped())
        }
    }
}
