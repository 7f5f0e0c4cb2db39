//! Error types for zvd-aac
//!
//! Every native status code coming out of the AAC engine is translated into
//! one of these variants at the call site (see `codec::aac::status`). Two of
//! them, [`Error::NotEnoughBits`] and [`Error::NoData`], are not failures:
//! they tell the caller to feed more input and call again.

use thiserror::Error;

/// Result type alias for zvd-aac operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for zvd-aac
#[derive(Error, Debug)]
pub enum Error {
    /// The engine instance could not be opened
    #[error("Initialization error: {0}")]
    InitializationFailure(String),

    /// A scratch buffer could not be allocated
    #[error("Out of memory")]
    OutOfMemory,

    /// Channel count outside 1-8
    #[error("Unsupported channel count: {0} (expected 1-8)")]
    UnsupportedChannelCount(u32),

    /// VBR quality index outside 1-5
    #[error("Invalid VBR quality: {0} (expected 1-5)")]
    InvalidVbrQuality(u32),

    /// The engine configuration call for `param` was rejected
    #[error("Unable to set {param}: {message}")]
    Configuration {
        /// Parameter being applied when the engine failed
        param: &'static str,
        /// Translated native message
        message: String,
    },

    /// Malformed or rejected input during fill or decode
    #[error("Invalid data")]
    InvalidData,

    /// No complete frame buffered yet, fill more bytes and retry
    #[error("Not enough bits")]
    NotEnoughBits,

    /// Any other decoder engine failure, carrying the native code
    #[error("Unknown decode failure: {0:#06x}")]
    UnknownDecodeFailure(u32),

    /// Non-OK engine status during encode
    #[error("Encode error: {0}")]
    EncodeFailure(String),

    /// The encode step produced no output (priming or drained flush)
    #[error("No data")]
    NoData,

    /// Operation not valid in the session's current state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// More PCM than one encoder frame was offered in a single call
    #[error("Input of {len} bytes exceeds one frame ({max} bytes)")]
    FrameTooLarge {
        /// Whole-sample bytes offered
        len: usize,
        /// Bytes in one frame across all channels
        max: usize,
    },
}

impl Error {
    /// Create an initialization error
    pub fn init<S: Into<String>>(msg: S) -> Self {
        Error::InitializationFailure(msg.into())
    }

    /// Create an encode error
    pub fn encode<S: Into<String>>(msg: S) -> Self {
        Error::EncodeFailure(msg.into())
    }

    /// Create an invalid state error
    pub fn invalid_state<S: Into<String>>(msg: S) -> Self {
        Error::InvalidState(msg.into())
    }

    /// `true` for the signals that drive a caller-side retry loop
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::NotEnoughBits | Error::NoData)
    }

    /// The encoder reported that a flush has fully drained
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, Error::EncodeFailure(msg) if msg == crate::codec::aac::status::END_OF_FILE)
    }

    /// Stable short reason reported across the host boundary
    pub fn reason(&self) -> &'static str {
        match self {
            Error::InitializationFailure(_) => "unknown",
            Error::OutOfMemory => "no_memory",
            Error::UnsupportedChannelCount(_) => "unsupported_channels",
            Error::InvalidVbrQuality(_) => "invalid_vbr",
            Error::Configuration { .. } => "invalid_config",
            Error::InvalidData => "invalid_data",
            Error::NotEnoughBits => "not_enough_bits",
            Error::UnknownDecodeFailure(_) => "unknown",
            Error::EncodeFailure(_) => "encode_error",
            Error::NoData => "no_data",
            Error::InvalidState(_) => "invalid_state",
            Error::FrameTooLarge { .. } => "invalid_input",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_signals() {
        assert!(Error::NotEnoughBits.is_recoverable());
        assert!(Error::NoData.is_recoverable());
        assert!(!Error::InvalidData.is_recoverable());
        assert!(!Error::OutOfMemory.is_recoverable());
        assert!(!Error::encode("Encoding error").is_recoverable());
    }

    #[test]
    fn test_reason_atoms() {
        assert_eq!(Error::init("x").reason(), "unknown");
        assert_eq!(Error::OutOfMemory.reason(), "no_memory");
        assert_eq!(Error::InvalidData.reason(), "invalid_data");
        assert_eq!(Error::NotEnoughBits.reason(), "not_enough_bits");
        assert_eq!(Error::UnknownDecodeFailure(0x2003).reason(), "unknown");
        assert_eq!(Error::NoData.reason(), "no_data");
        assert_eq!(Error::InvalidVbrQuality(9).reason(), "invalid_vbr");
        assert_eq!(Error::FrameTooLarge { len: 8192, max: 4096 }.reason(), "invalid_input");
    }

    #[test]
    fn test_display() {
        assert_eq!(
            Error::UnsupportedChannelCount(9).to_string(),
            "Unsupported channel count: 9 (expected 1-8)"
        );
        assert_eq!(
            Error::UnknownDecodeFailure(0x2003).to_string(),
            "Unknown decode failure: 0x2003"
        );
        let err = Error::Configuration {
            param: "sample rate",
            message: "Unsupported parameter".to_string(),
        };
        assert_eq!(err.to_string(), "Unable to set sample rate: Unsupported parameter");
        assert_eq!(
            Error::FrameTooLarge { len: 8192, max: 4096 }.to_string(),
            "Input of 8192 bytes exceeds one frame (4096 bytes)"
        );
    }
}
