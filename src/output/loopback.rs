use super::OutputDevice;
use crate::format::{FrameInterval, OutputFormat};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use v4l::format::{Colorspace, FieldOrder};
use v4l::video::output::Parameters;
use v4l::video::Output;
use v4l::{Device, Format, FourCC, Fraction};

/// v4l2 output node (usually a v4l2loopback device)
///
/// Frames go through a blocking read-write `File`; format and stream
/// parameters go through a v4l `Device` on the same node. Both descriptors
/// are released together on drop.
pub struct V4l2Loopback {
    file: File,
    device: Device,
}

impl OutputDevice for V4l2Loopback {
    fn open(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        let device = Device::with_path(path)?;

        tracing::debug!("Opened output node {}", path.display());

        Ok(Self { file, device })
    }

    fn set_format(&mut self, format: &OutputFormat) -> io::Result<()> {
        let mut fmt = Format::new(format.width, format.height, FourCC::new(&OutputFormat::FOURCC));
        fmt.field_order = FieldOrder::Progressive;
        fmt.stride = format.bytes_per_line();
        // bounded to u32 by OutputFormat::new
        fmt.size = format.image_size() as u32;
        fmt.colorspace = Colorspace::SRGB;

        let applied = self.device.set_format(&fmt)?;
        tracing::debug!(
            "Device accepted format {}x{} {} stride={} size={}",
            applied.width,
            applied.height,
            applied.fourcc,
            applied.stride,
            applied.size
        );
        Ok(())
    }

    fn set_frame_interval(&mut self, interval: FrameInterval) -> io::Result<()> {
        let params = Parameters::new(Fraction::new(interval.numerator, interval.denominator));
        self.device.set_params(&params)?;
        Ok(())
    }

    fn write_frame(&mut self, data: &[u8]) -> io::Result<usize> {
        // one write call; a short count is returned to the caller as-is
        self.file.write(data)
    }
}
