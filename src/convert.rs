//! RGBA to YUYV 4:2:2 conversion.
//!
//! Integer BT.601 coefficients with studio-range output (Y in 16..=235).
//! The byte layout and rounding must stay bit-exact: downstream consumers
//! compare against frames produced by the same arithmetic.

use crate::error::{Result, SinkError};
use crate::format::{OutputFormat, RGBA_BYTES_PER_PIXEL, YUYV_BYTES_PER_PIXEL};

#[inline]
fn clamp_u8(value: i32) -> u8 {
    value.clamp(0, 255) as u8
}

/// Luma of a single pixel
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    let (r, g, b) = (r as i32, g as i32, b as i32);
    clamp_u8(((66 * r + 129 * g + 25 * b + 128) >> 8) + 16)
}

/// Chroma pair (U, V) of an already averaged colour
#[inline]
pub fn chroma(r: u8, g: u8, b: u8) -> (u8, u8) {
    let (r, g, b) = (r as i32, g as i32, b as i32);
    let u = ((-38 * r - 74 * g + 112 * b + 128) >> 8) + 128;
    let v = ((112 * r - 94 * g - 18 * b + 128) >> 8) + 128;
    (clamp_u8(u), clamp_u8(v))
}

#[inline]
fn average(a: u8, b: u8) -> u8 {
    ((a as u16 + b as u16) >> 1) as u8
}

/// Convert one packed RGBA frame into `out` as YUYV.
///
/// Alpha is ignored. `rgba` must hold at least `width * height * 4` bytes
/// and `out` at least `width * height * 2`; only those prefixes are touched.
/// Does not allocate.
pub fn rgba_to_yuyv(rgba: &[u8], width: u32, height: u32, out: &mut [u8]) -> Result<()> {
    let format = OutputFormat::new(width, height)?;
    SinkError::check_len(format.rgba_size(), rgba.len())?;
    SinkError::check_len(format.image_size(), out.len())?;

    let src_pair = 2 * RGBA_BYTES_PER_PIXEL;
    let dst_pair = 2 * YUYV_BYTES_PER_PIXEL;
    let src = rgba[..format.rgba_size()].chunks_exact(src_pair);
    let dst = out[..format.image_size()].chunks_exact_mut(dst_pair);

    // Rows have an even number of pixels, so pairs never straddle a row.
    for (px, macropixel) in src.zip(dst) {
        let (r0, g0, b0) = (px[0], px[1], px[2]);
        let (r1, g1, b1) = (px[4], px[5], px[6]);

        let (u, v) = chroma(average(r0, r1), average(g0, g1), average(b0, b1));

        macropixel[0] = luma(r0, g0, b0);
        macropixel[1] = u;
        macropixel[2] = luma(r1, g1, b1);
        macropixel[3] = v;
    }

    Ok(())
}

/// Allocating wrapper around [`rgba_to_yuyv`]
pub fn convert_frame(rgba: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    let format = OutputFormat::new(width, height)?;
    let mut yuyv = vec![0u8; format.image_size()];
    rgba_to_yuyv(rgba, width, height, &mut yuyv)?;
    Ok(yuyv)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
        rgba.iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect()
    }

    #[test]
    fn test_black_maps_to_black_point() {
        for (w, h) in [(2, 1), (4, 4), (640, 480)] {
            let yuyv = convert_frame(&vec![0u8; w * h * 4], w as u32, h as u32).unwrap();
            assert_eq!(yuyv.len(), w * h * 2);
            for macropixel in yuyv.chunks_exact(4) {
                assert_eq!(macropixel, [16, 128, 16, 128]);
            }
        }
    }

    #[test]
    fn test_primaries() {
        let cases = [
            ([255, 0, 0, 255], [82, 90, 82, 240]),
            ([0, 255, 0, 255], [144, 54, 144, 34]),
            ([0, 0, 255, 255], [41, 240, 41, 110]),
            ([255, 255, 255, 255], [235, 128, 235, 128]),
        ];
        for (rgba, expected) in cases {
            let yuyv = convert_frame(&solid(2, 1, rgba), 2, 1).unwrap();
            assert_eq!(yuyv, expected, "rgba {:?}", rgba);
        }
    }

    #[test]
    fn test_alpha_is_ignored() {
        let opaque = convert_frame(&solid(4, 2, [10, 200, 30, 255]), 4, 2).unwrap();
        let clear = convert_frame(&solid(4, 2, [10, 200, 30, 0]), 4, 2).unwrap();
        assert_eq!(opaque, clear);
    }

    #[test]
    fn test_chroma_uses_pair_average() {
        // black then white: averaged colour is (127, 127, 127), which is neutral
        let rgba = [0, 0, 0, 255, 255, 255, 255, 255];
        let yuyv = convert_frame(&rgba, 2, 1).unwrap();
        assert_eq!(yuyv, [16, 128, 235, 128]);

        // red then blue averages to (127, 0, 127)
        let rgba = [255, 0, 0, 255, 0, 0, 255, 255];
        let yuyv = convert_frame(&rgba, 2, 1).unwrap();
        let (u, v) = chroma(127, 0, 127);
        assert_eq!(yuyv, [82, u, 41, v]);
    }

    #[test]
    fn test_conversion_is_pure() {
        let rgba: Vec<u8> = (0..8 * 6 * 4).map(|i| (i * 37 % 256) as u8).collect();
        let first = convert_frame(&rgba, 8, 6).unwrap();
        let second = convert_frame(&rgba, 8, 6).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 8 * 6 * 2);
    }

    #[test]
    fn test_only_prefix_is_written() {
        let rgba = solid(2, 1, [255, 0, 0, 255]);
        let mut out = [0xAAu8; 6];
        rgba_to_yuyv(&rgba, 2, 1, &mut out).unwrap();
        assert_eq!(out, [82, 90, 82, 240, 0xAA, 0xAA]);
    }

    #[test]
    fn test_invalid_geometry() {
        assert!(matches!(
            convert_frame(&[0u8; 12], 3, 1),
            Err(SinkError::InvalidArgument(_))
        ));
        assert!(matches!(
            convert_frame(&[], 0, 0),
            Err(SinkError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_short_buffers() {
        assert!(matches!(
            convert_frame(&[0u8; 7], 2, 1),
            Err(SinkError::BufferTooSmall {
                required: 8,
                actual: 7
            })
        ));

        let mut out = [0u8; 3];
        assert!(matches!(
            rgba_to_yuyv(&[0u8; 8], 2, 1, &mut out),
            Err(SinkError::BufferTooSmall {
                required: 4,
                actual: 3
            })
        ));
    }
}
