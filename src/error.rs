use thiserror::Error;

pub type Result<T> = std::result::Result<T, SinkError>;

/// Errors surfaced by the sink, the converter and the device boundary
#[derive(Debug, Error)]
pub enum SinkError {
    /// Missing or out-of-range input (empty path, zero or odd width, ...)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The device node could not be acquired
    #[error("Failed to open device {path}: {message}")]
    DeviceOpen { path: String, message: String },

    #[error("Device not opened")]
    DeviceNotOpen,

    /// The device refused the requested output format
    #[error("Failed to set format: {0}")]
    FormatRejected(String),

    /// RGBA write attempted before a successful configure
    #[error("Device not ready")]
    DeviceNotReady,

    #[error("Buffer too small: need {required} bytes, got {actual}")]
    BufferTooSmall { required: usize, actual: usize },

    #[error("Failed to write frame: {0}")]
    Write(String),
}

impl SinkError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Ensure `actual` covers `required` bytes
    pub fn check_len(required: usize, actual: usize) -> Result<()> {
        if actual < required {
            Err(Self::BufferTooSmall { required, actual })
        } else {
            Ok(())
        }
    }
}
