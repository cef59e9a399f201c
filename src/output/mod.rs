mod loopback;
mod sink;

pub use loopback::V4l2Loopback;
pub use sink::{DeviceSink, SinkState};

use crate::format::{FrameInterval, OutputFormat};
use std::io;
use std::path::Path;

/// Device node that accepts frames written by the sink
///
/// Every method is a single blocking OS call; implementations must not
/// retry or buffer internally.
pub trait OutputDevice: Sized {
    /// Acquire read-write access to the node at `path`
    fn open(path: &Path) -> io::Result<Self>;

    /// Program the output format
    fn set_format(&mut self, format: &OutputFormat) -> io::Result<()>;

    /// Request a frame interval; callers treat failure as advisory
    fn set_frame_interval(&mut self, interval: FrameInterval) -> io::Result<()>;

    /// Write one frame, returning the byte count the OS reports
    fn write_frame(&mut self, data: &[u8]) -> io::Result<usize>;
}
