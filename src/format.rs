//! Output format negotiated with the device.
//!
//! The sink supports exactly one layout: packed YUYV 4:2:2, progressive,
//! sRGB. Everything else in the request is derived from the resolution.

use crate::error::{Result, SinkError};

/// Bytes per pixel of the YUYV layout
pub const YUYV_BYTES_PER_PIXEL: usize = 2;

/// Bytes per pixel of packed RGBA input
pub const RGBA_BYTES_PER_PIXEL: usize = 4;

/// Format request sent to the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputFormat {
    pub width: u32,
    pub height: u32,
}

impl OutputFormat {
    pub const FOURCC: [u8; 4] = *b"YUYV";

    /// Validate a resolution and build the request for it.
    ///
    /// Width and height must be positive, width must be even (one chroma
    /// pair covers two pixels), the YUYV frame size must fit the device's
    /// 32-bit image size and the RGBA frame size must fit in `usize`.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(SinkError::invalid(format!(
                "width and height must be positive, got {}x{}",
                width, height
            )));
        }
        if width % 2 != 0 {
            return Err(SinkError::invalid(format!(
                "width must be even for YUYV output, got {}",
                width
            )));
        }
        // sizeimage is a u32 in the device request
        let image_size = width as u64 * height as u64 * YUYV_BYTES_PER_PIXEL as u64;
        if image_size > u32::MAX as u64 {
            return Err(SinkError::invalid(format!(
                "frame size {} bytes for {}x{} exceeds the device limit",
                image_size, width, height
            )));
        }
        usize::try_from(image_size * 2)
            .map_err(|_| SinkError::invalid(format!("frame size overflow for {}x{}", width, height)))?;

        Ok(Self { width, height })
    }

    pub fn bytes_per_line(&self) -> u32 {
        self.width * YUYV_BYTES_PER_PIXEL as u32
    }

    /// Size of one YUYV frame in bytes
    pub fn image_size(&self) -> usize {
        self.pixels() * YUYV_BYTES_PER_PIXEL
    }

    /// Size of one RGBA input frame in bytes
    pub fn rgba_size(&self) -> usize {
        self.pixels() * RGBA_BYTES_PER_PIXEL
    }

    fn pixels(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Frame interval hint, `numerator / denominator` seconds per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameInterval {
    pub numerator: u32,
    pub denominator: u32,
}

impl FrameInterval {
    pub const fn per_second(fps: u32) -> Self {
        Self {
            numerator: 1,
            denominator: fps,
        }
    }
}

/// Interval requested on every configure
pub const DEFAULT_FRAME_INTERVAL: FrameInterval = FrameInterval::per_second(30);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_sizes() {
        let fmt = OutputFormat::new(1280, 720).unwrap();
        assert_eq!(fmt.bytes_per_line(), 2560);
        assert_eq!(fmt.image_size(), 1280 * 720 * 2);
        assert_eq!(fmt.rgba_size(), 1280 * 720 * 4);
    }

    #[test]
    fn test_rejects_bad_geometry() {
        assert!(matches!(
            OutputFormat::new(0, 480),
            Err(SinkError::InvalidArgument(_))
        ));
        assert!(matches!(
            OutputFormat::new(640, 0),
            Err(SinkError::InvalidArgument(_))
        ));
        assert!(matches!(
            OutputFormat::new(641, 480),
            Err(SinkError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_rejects_oversized_frames() {
        // line fits, frame does not
        assert!(matches!(
            OutputFormat::new(65536, 65536),
            Err(SinkError::InvalidArgument(_))
        ));
        // line alone is too wide
        assert!(matches!(
            OutputFormat::new(u32::MAX - 1, 1),
            Err(SinkError::InvalidArgument(_))
        ));

        let largest = OutputFormat::new(65536, 32767).unwrap();
        assert!(largest.image_size() <= u32::MAX as usize);
    }

    #[test]
    fn test_default_interval() {
        assert_eq!(DEFAULT_FRAME_INTERVAL.numerator, 1);
        assert_eq!(DEFAULT_FRAME_INTERVAL.denominator, 30);
    }
}
