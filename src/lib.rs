//! Virtual camera output for v4l2loopback devices.
//!
//! [`DeviceSink`] owns an output device node and feeds it YUYV 4:2:2 frames,
//! either supplied directly or converted from packed RGBA by [`convert`].
//!
//! ```no_run
//! use loopcam::DeviceSink;
//!
//! # fn main() -> loopcam::Result<()> {
//! let mut sink: DeviceSink = DeviceSink::new();
//! sink.open("/dev/video10")?;
//! sink.configure(640, 480)?;
//!
//! let frame = vec![0u8; 640 * 480 * 4];
//! sink.write_rgba(&frame)?;
//! sink.close();
//! # Ok(())
//! # }
//! ```

pub mod convert;
pub mod error;
pub mod format;
pub mod output;
pub mod pattern;

pub use error::{Result, SinkError};
pub use format::{FrameInterval, OutputFormat};
pub use output::{DeviceSink, OutputDevice, SinkState, V4l2Loopback};
