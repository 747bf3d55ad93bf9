//! Address QR codes
//!
//! The wallet core treats QR rendering as a collaborator: it hands over an
//! address string and gets back an opaque image reference (a `data:` URL).
//! No key material ever reaches a renderer.
//!
//! # Usage
//! ```rust,ignore
//! use turion_wallet::qr::{QrRenderer, SvgQrRenderer};
//!
//! let url = SvgQrRenderer::default().render("tur1q...")?;
//! assert!(url.starts_with("data:image/svg+xml;base64,"));
//! ```

mod renderer;

pub use renderer::SvgQrRenderer;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::TurionError;

/// QR module errors
#[derive(Error, Debug)]
pub enum QrError {
    #[error("Nothing to encode")]
    EmptyPayload,

    #[error("Payload too large for a single QR code: {0} bytes (max {1})")]
    PayloadTooLarge(usize, usize),

    #[error("QR generation failed: {0}")]
    Generation(String),
}

/// Result type for QR operations
pub type QrResult<T> = Result<T, QrError>;

impl From<QrError> for TurionError {
    fn from(e: QrError) -> Self {
        TurionError::qr_error(e.to_string())
    }
}

/// Maximum bytes for a single QR code at error correction level L
pub const MAX_QR_BYTES_L: usize = 2953;
/// Maximum bytes for a single QR code at error correction level M
pub const MAX_QR_BYTES_M: usize = 2331;
/// Maximum bytes for a single QR code at error correction level Q
pub const MAX_QR_BYTES_Q: usize = 1663;
/// Maximum bytes for a single QR code at error correction level H
pub const MAX_QR_BYTES_H: usize = 1273;

/// QR code error correction level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ErrorCorrectionLevel {
    /// Low (~7% recovery)
    L,
    /// Medium (~15% recovery)
    #[default]
    M,
    /// Quartile (~25% recovery)
    Q,
    /// High (~30% recovery)
    H,
}

impl ErrorCorrectionLevel {
    /// Maximum bytes for this error correction level
    pub fn max_bytes(&self) -> usize {
        match self {
            ErrorCorrectionLevel::L => MAX_QR_BYTES_L,
            ErrorCorrectionLevel::M => MAX_QR_BYTES_M,
            ErrorCorrectionLevel::Q => MAX_QR_BYTES_Q,
            ErrorCorrectionLevel::H => MAX_QR_BYTES_H,
        }
    }
}

/// Turns an address into an image reference
pub trait QrRenderer: Send + Sync {
    fn render(&self, address: &str) -> QrResult<String>;
}
