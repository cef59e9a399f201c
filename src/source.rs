use anyhow::{bail, Context, Result};
use image::RgbaImage;
use loopcam::pattern;
use std::path::Path;

/// One frame handed to the sink
pub enum Frame<'a> {
    /// Already in the device's YUYV layout
    Yuyv(&'a [u8]),
    /// Packed RGBA, converted by the sink
    Rgba(&'a [u8]),
}

/// Trait for frame producers feeding the output device
pub trait FrameSource {
    /// Produce the next frame
    fn next_frame(&mut self) -> Result<Frame<'_>>;
}

/// Scrolling diagnostic gradient, generated straight into YUYV
pub struct GradientSource {
    width: u32,
    height: u32,
    phase: u32,
    buffer: Vec<u8>,
}

impl GradientSource {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            phase: 0,
            buffer: vec![0u8; width as usize * height as usize * 2],
        }
    }
}

impl FrameSource for GradientSource {
    fn next_frame(&mut self) -> Result<Frame<'_>> {
        pattern::gradient_yuyv(self.width, self.height, self.phase, &mut self.buffer)?;
        self.phase = (self.phase + 1) % 256;
        Ok(Frame::Yuyv(&self.buffer))
    }
}

/// Constant RGBA frame, either a flat colour or a still image
pub struct StillSource {
    rgba: Vec<u8>,
}

impl StillSource {
    pub fn solid(width: u32, height: u32, color: [u8; 4]) -> Result<Self> {
        let rgba = pattern::solid_rgba(width, height, color)?;
        Ok(Self { rgba })
    }

    /// Load an image file; its size must match the output resolution
    pub fn image<P: AsRef<Path>>(path: P, width: u32, height: u32) -> Result<Self> {
        let path = path.as_ref();
        let image: RgbaImage = image::open(path)
            .with_context(|| format!("Failed to load image {}", path.display()))?
            .to_rgba8();

        if image.dimensions() != (width, height) {
            bail!(
                "Image {} is {}x{}, output is {}x{}",
                path.display(),
                image.width(),
                image.height(),
                width,
                height
            );
        }

        tracing::info!("Loaded still image {}", path.display());
        Ok(Self {
            rgba: image.into_raw(),
        })
    }
}

impl FrameSource for StillSource {
    fn next_frame(&mut self) -> Result<Frame<'_>> {
        Ok(Frame::Rgba(&self.rgba))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradient_advances_phase() {
        let mut source = GradientSource::new(4, 2);
        let first = match source.next_frame().unwrap() {
            Frame::Yuyv(data) => data.to_vec(),
            Frame::Rgba(_) => panic!("gradient must be YUYV"),
        };
        let second = match source.next_frame().unwrap() {
            Frame::Yuyv(data) => data.to_vec(),
            Frame::Rgba(_) => panic!("gradient must be YUYV"),
        };
        assert_eq!(first.len(), 16);
        assert_eq!(first[0], 0);
        assert_eq!(second[0], 1);
    }

    #[test]
    fn test_solid_source() {
        let mut source = StillSource::solid(2, 2, [255, 0, 0, 255]).unwrap();
        match source.next_frame().unwrap() {
            Frame::Rgba(data) => assert_eq!(data.len(), 16),
            Frame::Yuyv(_) => panic!("solid colour must be RGBA"),
        }
    }

    #[test]
    fn test_missing_image() {
        assert!(StillSource::image("/nonexistent/frame.png", 2, 2).is_err());
    }
}
