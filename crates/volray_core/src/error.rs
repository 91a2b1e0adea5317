//! Volume loading error types

use std::fmt;
use std::io;

/// Error type for volume decoding and loading
#[derive(Debug)]
pub enum VolumeError {
    /// IO error (file not found, permission denied, etc.)
    Io(io::Error),
    /// The sample count does not match the declared dimensions
    DimensionMismatch {
        /// width * height * depth
        expected: usize,
        /// samples actually present in the buffer
        actual: usize,
    },
    /// The byte stream is not a whole number of 16-bit samples
    TruncatedStream {
        /// byte length of the stream
        len: usize,
    },
    /// Every axis of the grid must be at least one voxel
    ZeroDimension {
        width: u32,
        height: u32,
        depth: u32,
    },
}

impl fmt::Display for VolumeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VolumeError::Io(err) => write!(f, "Volume IO error: {}", err),
            VolumeError::DimensionMismatch { expected, actual } => write!(
                f,
                "Volume dimension mismatch: expected {} samples, got {}",
                expected, actual
            ),
            VolumeError::TruncatedStream { len } => write!(
                f,
                "Volume stream truncated: {} bytes is not a whole number of u16 samples",
                len
            ),
            VolumeError::ZeroDimension {
                width,
                height,
                depth,
            } => write!(
                f,
                "Volume dimensions must be positive, got {}x{}x{}",
                width, height, depth
            ),
        }
    }
}

impl std::error::Error for VolumeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            VolumeError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for VolumeError {
    fn from(err: io::Error) -> Self {
        VolumeError::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_mismatch() {
        let err = VolumeError::DimensionMismatch {
            expected: 8,
            actual: 7,
        };
        let msg = err.to_string();
        assert!(msg.contains("expected 8"));
        assert!(msg.contains("got 7"));
    }

    #[test]
    fn test_display_zero_dimension() {
        let err = VolumeError::ZeroDimension {
            width: 0,
            height: 4,
            depth: 4,
        };
        assert!(err.to_string().contains("0x4x4"));
    }

    #[test]
    fn test_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "missing");
        let err: VolumeError = io_err.into();
        assert!(matches!(err, VolumeError::Io(_)));
    }
}
