//! Synthetic frames for exercising an output device without a producer.

use crate::error::{Result, SinkError};
use crate::format::OutputFormat;

/// Fill `out` with the animated diagnostic gradient, directly in YUYV.
///
/// Luma ramps along x; even bytes' partners alternate U (ramping along y)
/// and V (ramping along the diagonal). `phase` shifts all three ramps, so
/// advancing it once per frame scrolls the pattern.
pub fn gradient_yuyv(width: u32, height: u32, phase: u32, out: &mut [u8]) -> Result<()> {
    let format = OutputFormat::new(width, height)?;
    SinkError::check_len(format.image_size(), out.len())?;

    let phase = phase as usize;
    let rows = out[..format.image_size()].chunks_exact_mut(format.bytes_per_line() as usize);
    for (y, row) in rows.enumerate() {
        for (x, px) in row.chunks_exact_mut(2).enumerate() {
            px[0] = ((x + phase) % 255) as u8;
            let chroma = if x % 2 == 0 {
                (y + phase) % 255
            } else {
                (x + y + phase) % 255
            };
            px[1] = (chroma as u8).wrapping_sub(128);
        }
    }
    Ok(())
}

/// Uniform packed RGBA frame
pub fn solid_rgba(width: u32, height: u32, rgba: [u8; 4]) -> Result<Vec<u8>> {
    let format = OutputFormat::new(width, height)?;
    Ok(rgba.repeat(format.rgba_size() / 4))
}

/// Parse `RRGGBB` or `RRGGBBAA` (optional leading `#`) into RGBA
pub fn parse_color(text: &str) -> Result<[u8; 4]> {
    let hex = text.strip_prefix('#').unwrap_or(text);
    if !(hex.len() == 6 || hex.len() == 8) || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(SinkError::invalid(format!("expected RRGGBB or RRGGBBAA, got {:?}", text)));
    }

    let mut rgba = [0, 0, 0, 255];
    for (i, slot) in rgba.iter_mut().enumerate().take(hex.len() / 2) {
        *slot = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
            .map_err(|_| SinkError::invalid(format!("invalid colour {:?}", text)))?;
    }
    Ok(rgba)
}
