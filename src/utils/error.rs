//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use thiserror::Error;

/// Errors that can occur while decoding or encoding page images
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Failed to decode PNG: {0}")]
    Decode(#[source] image::ImageError),

    #[error("Failed to encode PNG: {0}")]
    Encode(#[source] image::ImageError),

    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("RGBA buffer of {len} bytes does not fit {width}x{height}")]
    InvalidBuffer { width: u32, height: u32, len: usize },
}

/// Errors raised by a raster source
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Rendering scale must be greater than 0, got {0}")]
    InvalidScale(f64),

    #[error("Malformed document: {0}")]
    Malformed(String),

    #[error("Rasterizer backend not available ({bin}): {source}")]
    BackendUnavailable {
        bin: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Rasterizer failed: {0}")]
    Backend(String),

    #[error("Failed to read rendered page: {0}")]
    Page(#[from] ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while comparing two pages
#[derive(Error, Debug)]
pub enum DiffError {
    #[error(
        "Received page and snapshot have different sizes: received {}x{}, snapshot {}x{}",
        received.0, received.1, reference.0, reference.1
    )]
    SizeMismatch {
        received: (u32, u32),
        reference: (u32, u32),
    },

    #[error("Failure threshold must be within [0, 1], got {0}")]
    InvalidThreshold(f64),

    #[error(transparent)]
    Image(#[from] ImageError),
}

/// Errors that can occur while reading or writing stored snapshots
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Stored snapshot {identifier} is not a valid image: {source}")]
    Corrupt {
        identifier: String,
        #[source]
        source: ImageError,
    },

    #[error("Invalid snapshot key: {0}")]
    InvalidKey(String),

    #[error("Snapshot store lock poisoned")]
    Poisoned,
}

/// Errors that can occur during communication with a remote match service
#[derive(Error, Debug)]
pub enum RpcError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Invalid response from match service: {0}")]
    InvalidResponse(String),

    #[error("Match service error {code}: {message}")]
    Remote { code: String, message: String },
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}

/// Errors that can occur while loading the configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Config TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Errors that abort a whole match operation
///
/// Changed, added and deleted pages are reported data, never errors.
#[derive(Error, Debug)]
pub enum MatchError {
    #[error("Invalid usage: {0}")]
    InvalidUsage(String),

    #[error(transparent)]
    Diff(#[from] DiffError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error(transparent)]
    Image(#[from] ImageError),
}

impl RpcError {
    /// Whether the remote service rejected the match over page dimensions.
    ///
    /// Recognised by the `SIZE_MISMATCH` code, or by the "different sizes"
    /// wording services use when they send no code.
    pub fn is_size_mismatch(&self) -> bool {
        match self {
            RpcError::Remote { code, message } => {
                code == REMOTE_SIZE_MISMATCH_CODE || message.contains("different sizes")
            }
            RpcError::RequestFailed(_) | RpcError::InvalidResponse(_) => false,
        }
    }
}

/// Error code a match service sends for mismatched page dimensions
pub const REMOTE_SIZE_MISMATCH_CODE: &str = "SIZE_MISMATCH";

impl MatchError {
    /// Whether the failure comes from mismatched page dimensions, raised
    /// locally or reported by a remote match service
    pub fn is_size_mismatch(&self) -> bool {
        match self {
            MatchError::Diff(DiffError::SizeMismatch { .. }) => true,
            MatchError::Rpc(rpc) => rpc.is_size_mismatch(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_size_mismatch() {
        let err = MatchError::from(DiffError::SizeMismatch {
            received: (10, 10),
            reference: (10, 12),
        });
        assert!(err.is_size_mismatch());
        assert!(!MatchError::InvalidUsage("bad".to_string()).is_size_mismatch());
    }

    #[test]
    fn test_remote_size_mismatch() {
        let by_code = MatchError::from(RpcError::Remote {
            code: REMOTE_SIZE_MISMATCH_CODE.to_string(),
            message: "page 2".to_string(),
        });
        assert!(by_code.is_size_mismatch());

        let by_message = MatchError::from(RpcError::Remote {
            code: "INTERNAL_SERVER_ERROR".to_string(),
            message: "Received pdf and snapshot pdf have different sizes".to_string(),
        });
        assert!(by_message.is_size_mismatch());

        let other = MatchError::from(RpcError::Remote {
            code: "BAD_REQUEST".to_string(),
            message: "scale out of range".to_string(),
        });
        assert!(!other.is_size_mismatch());
    }
}
