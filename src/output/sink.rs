use super::{OutputDevice, V4l2Loopback};
use crate::convert;
use crate::error::{Result, SinkError};
use crate::format::{OutputFormat, DEFAULT_FRAME_INTERVAL};
use image::RgbaImage;
use std::path::{Path, PathBuf};

/// Lifecycle position of a [`DeviceSink`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkState {
    /// No device handle (never opened, or closed)
    Unopened,
    /// Handle held, no format programmed on it yet
    Opened,
    /// Format programmed and scratch buffer allocated; writes accepted
    Configured,
}

/// Frame sink bound to one output device node
///
/// Drive it strictly in order: [`open`](Self::open), [`configure`](Self::configure),
/// any number of [`write_raw`](Self::write_raw) / [`write_rgba`](Self::write_rgba)
/// calls, then [`close`](Self::close). Dropping the sink releases the device.
///
/// Opening an already-open sink closes the current handle before opening the
/// new path; the sink must be configured again afterwards.
pub struct DeviceSink<D: OutputDevice = V4l2Loopback> {
    device: Option<D>,
    path: Option<PathBuf>,
    /// Format programmed on the current handle
    format: Option<OutputFormat>,
    /// YUYV conversion target, replaced on every successful configure
    scratch: Option<Vec<u8>>,
    frames_written: u64,
}

impl<D: OutputDevice> Default for DeviceSink<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: OutputDevice> DeviceSink<D> {
    pub fn new() -> Self {
        Self {
            device: None,
            path: None,
            format: None,
            scratch: None,
            frames_written: 0,
        }
    }

    pub fn open<P: AsRef<Path>>(&mut self, device_path: P) -> Result<bool> {
        let path = device_path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(SinkError::invalid("device path must not be empty"));
        }

        if self.device.is_some() {
            tracing::info!("Output device already open, closing it before reopening");
            self.close();
        }

        tracing::info!("Opening v4l2 output device at {}", path.display());

        let device = D::open(path).map_err(|e| SinkError::DeviceOpen {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        self.device = Some(device);
        self.path = Some(path.to_path_buf());
        self.format = None;
        self.frames_written = 0;

        tracing::info!("v4l2 output device opened successfully");
        Ok(true)
    }

    /// Program the YUYV output format and size the conversion buffer.
    ///
    /// May be called again while configured to change resolution. The
    /// 30 fps interval request is advisory; a device refusing it is not an
    /// error. On a rejected format the sink keeps its previous state.
    pub fn configure(&mut self, width: u32, height: u32) -> Result<bool> {
        let device = self.device.as_mut().ok_or(SinkError::DeviceNotOpen)?;
        let format = OutputFormat::new(width, height)?;

        tracing::info!("Setting output format {}x{} YUYV", width, height);

        device
            .set_format(&format)
            .map_err(|e| SinkError::FormatRejected(e.to_string()))?;

        if let Err(e) = device.set_frame_interval(DEFAULT_FRAME_INTERVAL) {
            tracing::debug!("Device ignored frame interval hint: {}", e);
        }

        self.scratch = Some(vec![0u8; format.image_size()]);
        self.format = Some(format);
        Ok(true)
    }

    /// Write a frame that is already YUYV.
    ///
    /// Exactly `width * height * 2` bytes are passed to a single write; the
    /// returned count is whatever the OS reported, short writes included.
    pub fn write_raw(&mut self, buffer: &[u8]) -> Result<usize> {
        let (device, format) = match (self.device.as_mut(), self.format) {
            (Some(device), Some(format)) => (device, format),
            _ => return Err(SinkError::DeviceNotOpen),
        };

        let size = format.image_size();
        SinkError::check_len(size, buffer.len())?;

        let written = device
            .write_frame(&buffer[..size])
            .map_err(|e| SinkError::Write(e.to_string()))?;

        self.record_write(written, size);
        Ok(written)
    }

    /// Convert a packed RGBA frame to YUYV and write it.
    pub fn write_rgba(&mut self, buffer: &[u8]) -> Result<usize> {
        let device = self.device.as_mut().ok_or(SinkError::DeviceNotOpen)?;
        let (format, scratch) = match (self.format, self.scratch.as_mut()) {
            (Some(format), Some(scratch)) => (format, scratch),
            _ => return Err(SinkError::DeviceNotReady),
        };

        SinkError::check_len(format.rgba_size(), buffer.len())?;
        convert::rgba_to_yuyv(buffer, format.width, format.height, scratch)?;

        let size = format.image_size();
        let written = device
            .write_frame(&scratch[..size])
            .map_err(|e| SinkError::Write(e.to_string()))?;

        self.record_write(written, size);
        Ok(written)
    }

    /// Write an RGBA image whose dimensions match the configured resolution.
    /// Frames are never scaled.
    pub fn write_image(&mut self, image: &RgbaImage) -> Result<usize> {
        if let Some(format) = self.format {
            if image.dimensions() != (format.width, format.height) {
                return Err(SinkError::invalid(format!(
                    "image is {}x{}, device is configured for {}x{}",
                    image.width(),
                    image.height(),
                    format.width,
                    format.height
                )));
            }
        }
        self.write_rgba(image.as_raw())
    }

    /// Release the device handle. Safe to call repeatedly.
    ///
    /// The scratch buffer is kept until the next configure or drop.
    pub fn close(&mut self) -> bool {
        if let Some(device) = self.device.take() {
            tracing::info!(
                "Closing v4l2 output device {} (wrote {} frames)",
                self.path.as_deref().unwrap_or(Path::new("?")).display(),
                self.frames_written
            );
            drop(device);
        }
        self.path = None;
        self.format = None;
        true
    }

    pub fn state(&self) -> SinkState {
        match (&self.device, &self.format) {
            (None, _) => SinkState::Unopened,
            (Some(_), None) => SinkState::Opened,
            (Some(_), Some(_)) => SinkState::Configured,
        }
    }

    pub fn is_open(&self) -> bool {
        self.device.is_some()
    }

    pub fn is_configured(&self) -> bool {
        self.state() == SinkState::Configured
    }

    /// Configured resolution of the open device
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.format.map(|f| (f.width, f.height))
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Successful write calls since the last open
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    fn record_write(&mut self, written: usize, expected: usize) {
        if written < expected {
            tracing::debug!("Short write: {} of {} bytes", written, expected);
        }
        self.frames_written += 1;
    }
}

impl<D: OutputDevice> Drop for DeviceSink<D> {
    fn drop(&mut self) {
        self.close();
    }
}
