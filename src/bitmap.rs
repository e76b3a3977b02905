//! Conversion between 1-bit bitmaps and bit streams.
//!
//! Pixels are walked row by row. A dark pixel is a 1 bit, a light pixel a 0.

use crate::{Error, Result};
use image::{GrayImage, Luma};
use std::path::Path;

const INK: u8 = 0x00;
const PAPER: u8 = 0xFF;

pub fn bitmap_bits(image: &GrayImage, threshold: u8) -> Vec<bool> {
    image.pixels().map(|&Luma([luma])| luma < threshold).collect()
}

/// Lays `bits` out `width` pixels per row.
pub fn bits_to_bitmap(bits: &[bool], width: u32) -> Result<GrayImage> {
    let row = width as usize;
    if row == 0 || bits.is_empty() || bits.len() % row != 0 {
        return Err(Error::InvalidDimensions {
            bits: bits.len(),
            width,
        });
    }
    let height = (bits.len() / row) as u32;
    trace!("bitmap {width}x{height}");
    Ok(GrayImage::from_fn(width, height, |x, y| {
        if bits[y as usize * row + x as usize] {
            Luma([INK])
        } else {
            Luma([PAPER])
        }
    }))
}

pub fn open_bitmap<P: AsRef<Path>>(path: P, threshold: u8) -> Result<Vec<bool>> {
    let image = image::open(path)?.to_luma8();
    debug!("loaded {}x{} bitmap", image.width(), image.height());
    Ok(bitmap_bits(&image, threshold))
}

pub fn save_bitmap<P: AsRef<Path>>(bits: &[bool], width: u32, path: P) -> Result<()> {
    bits_to_bitmap(bits, width)?.save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{bitmap_bits, bits_to_bitmap};
    use crate::{compress_bits, expand_bytes, Error, OverflowPolicy};
    use image::{GrayImage, Luma};

    fn glyph() -> GrayImage {
        // a 4x3 box outline
        GrayImage::from_fn(4, 3, |x, y| {
            if y == 1 && (x == 1 || x == 2) {
                Luma([0xF0])
            } else {
                Luma([0x10])
            }
        })
    }

    #[test]
    fn test_bitmap_bits_row_major() {
        let bits = bitmap_bits(&glyph(), 128);
        let expected = [
            [true, true, true, true],
            [true, false, false, true],
            [true, true, true, true],
        ];
        assert_eq!(bits, expected.concat());
        assert!(bitmap_bits(&glyph(), 0).iter().all(|bit| !bit));
    }

    #[test]
    fn test_bitmap_survives_compression() {
        let bits = bitmap_bits(&glyph(), 128);
        let compressed = compress_bits(&bits, OverflowPolicy::Split).unwrap();
        assert_eq!(compressed, [0, 5, 2, 5]);

        let image = bits_to_bitmap(&expand_bytes(&compressed).unwrap(), 4).unwrap();
        assert_eq!(image.dimensions(), (4, 3));
        assert_eq!(bitmap_bits(&image, 128), bits);
        assert_eq!(image.get_pixel(1, 1), &Luma([0xFF]));
        assert_eq!(image.get_pixel(0, 0), &Luma([0x00]));
    }

    #[test]
    fn test_bitmap_invalid_dimensions() {
        for (len, width) in [(12, 5), (12, 0), (0, 4)] {
            let bits = vec![false; len];
            assert!(matches!(
                bits_to_bitmap(&bits, width),
                Err(Error::InvalidDimensions { .. })
            ));
        }
    }
}
