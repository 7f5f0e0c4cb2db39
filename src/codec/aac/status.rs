//! Native status codes and their translation into [`Error`]
//!
//! The engine reports failures as `AACENC_ERROR` / `AAC_DECODER_ERROR`
//! integers. They are wrapped in [`EncoderStatus`] / [`DecoderStatus`] right
//! where the native call returns and translated here, so no raw code leaves
//! the session types (except as the diagnostic payload of
//! [`Error::UnknownDecodeFailure`]).

use std::fmt;

use super::engine::EncoderParam;
use crate::error::Error;

/// Message for `AACENC_ENCODE_EOF`, the engine's "flush drained" status
pub const END_OF_FILE: &str = "End of file";

/// `AACENC_ERROR` value returned by the encoder engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EncoderStatus(pub u32);

impl EncoderStatus {
    pub const OK: Self = EncoderStatus(0x0000);
    pub const INVALID_HANDLE: Self = EncoderStatus(0x0020);
    pub const MEMORY_ERROR: Self = EncoderStatus(0x0021);
    pub const UNSUPPORTED_PARAMETER: Self = EncoderStatus(0x0022);
    pub const INVALID_CONFIG: Self = EncoderStatus(0x0023);
    pub const INIT_ERROR: Self = EncoderStatus(0x0040);
    pub const INIT_AAC_ERROR: Self = EncoderStatus(0x0041);
    pub const INIT_SBR_ERROR: Self = EncoderStatus(0x0042);
    pub const INIT_TP_ERROR: Self = EncoderStatus(0x0043);
    pub const INIT_META_ERROR: Self = EncoderStatus(0x0044);
    pub const INIT_MPS_ERROR: Self = EncoderStatus(0x0045);
    pub const ENCODE_ERROR: Self = EncoderStatus(0x0060);
    pub const ENCODE_EOF: Self = EncoderStatus(0x0080);

    /// Check for `AACENC_OK`
    pub fn is_ok(self) -> bool {
        self == Self::OK
    }

    /// Human-readable description of the code
    pub fn message(self) -> &'static str {
        match self {
            Self::OK => "No error",
            Self::INVALID_HANDLE => "Invalid handle",
            Self::MEMORY_ERROR => "Memory allocation error",
            Self::UNSUPPORTED_PARAMETER => "Unsupported parameter",
            Self::INVALID_CONFIG => "Invalid config",
            Self::INIT_ERROR => "Initialization error",
            Self::INIT_AAC_ERROR => "AAC library initialization error",
            Self::INIT_SBR_ERROR => "SBR library initialization error",
            Self::INIT_TP_ERROR => "Transport library initialization error",
            Self::INIT_META_ERROR => "Metadata library initialization error",
            Self::INIT_MPS_ERROR => "MPS library initialization error",
            Self::ENCODE_ERROR => "Encoding error",
            Self::ENCODE_EOF => END_OF_FILE,
            _ => "Unknown error",
        }
    }
}

impl fmt::Display for EncoderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:#x})", self.message(), self.0)
    }
}

/// `AAC_DECODER_ERROR` value returned by the decoder engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecoderStatus(pub u32);

impl DecoderStatus {
    pub const OK: Self = DecoderStatus(0x0000);
    pub const OUT_OF_MEMORY: Self = DecoderStatus(0x0002);
    pub const UNKNOWN: Self = DecoderStatus(0x0005);
    pub const TRANSPORT_SYNC_ERROR: Self = DecoderStatus(0x1001);
    pub const NOT_ENOUGH_BITS: Self = DecoderStatus(0x1002);
    pub const INVALID_HANDLE: Self = DecoderStatus(0x2001);
    pub const UNSUPPORTED_FORMAT: Self = DecoderStatus(0x2003);
    pub const OUTPUT_BUFFER_TOO_SMALL: Self = DecoderStatus(0x200C);
    pub const TRANSPORT_ERROR: Self = DecoderStatus(0x4001);
    pub const PARSE_ERROR: Self = DecoderStatus(0x4002);
    pub const DECODE_FRAME_ERROR: Self = DecoderStatus(0x4004);
    pub const CRC_ERROR: Self = DecoderStatus(0x4005);

    /// Check for `AAC_DEC_OK`
    pub fn is_ok(self) -> bool {
        self == Self::OK
    }

    /// Codes in the engine's decode error range (`IS_DECODE_ERROR`), raised
    /// when the bitstream itself is corrupt
    pub fn is_decode_error(self) -> bool {
        (0x4000..=0x4FFF).contains(&self.0)
    }

    /// Human-readable description of the code
    pub fn message(self) -> &'static str {
        match self {
            Self::OK => "No error",
            Self::OUT_OF_MEMORY => "Heap returned NULL pointer",
            Self::UNKNOWN => "Unknown error",
            Self::TRANSPORT_SYNC_ERROR => "Transport sync lost",
            Self::NOT_ENOUGH_BITS => "Not enough bits supplied",
            Self::INVALID_HANDLE => "Invalid handle",
            Self::UNSUPPORTED_FORMAT => "Unsupported format",
            Self::OUTPUT_BUFFER_TOO_SMALL => "Output buffer too small",
            Self::TRANSPORT_ERROR => "Transport error",
            Self::PARSE_ERROR => "Bitstream parse error",
            Self::DECODE_FRAME_ERROR => "Frame decode error",
            Self::CRC_ERROR => "CRC check failed",
            s if (0x2000..=0x2FFF).contains(&s.0) => "Decoder initialization error",
            s if s.is_decode_error() => "Corrupt bitstream",
            _ => "Unknown error",
        }
    }
}

impl fmt::Display for DecoderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:#x})", self.message(), self.0)
    }
}

/// Any failure reported by the fill step means the input was rejected
pub fn fill_error(_status: DecoderStatus) -> Error {
    Error::InvalidData
}

/// Classify a decode step failure
pub fn decode_error(status: DecoderStatus) -> Error {
    if status == DecoderStatus::NOT_ENOUGH_BITS {
        Error::NotEnoughBits
    } else if status == DecoderStatus::TRANSPORT_SYNC_ERROR || status.is_decode_error() {
        Error::InvalidData
    } else {
        Error::UnknownDecodeFailure(status.0)
    }
}

/// A creation-time parameter was rejected
pub fn configuration_error(param: EncoderParam, status: EncoderStatus) -> Error {
    Error::Configuration {
        param: param.name(),
        message: status.message().to_string(),
    }
}

/// The encoder instance could not be opened or initialized
pub fn initialization_error(status: EncoderStatus) -> Error {
    Error::init(status.message())
}

/// Any non-OK status from the encode step
pub fn encode_error(status: EncoderStatus) -> Error {
    Error::encode(status.message())
}
