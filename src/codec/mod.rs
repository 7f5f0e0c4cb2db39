//! Codec implementations (encoders and decoders)

pub mod aac;

pub use aac::{DecoderSession, EncoderConfig, EncoderSession};
