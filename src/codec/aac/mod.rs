//! AAC (Advanced Audio Coding) sessions over the Fraunhofer FDK AAC engine
//!
//! The engine does the signal processing. This module negotiates its
//! parameters, drives its buffer protocol and translates its status codes.
//!
//! ## Features
//! - **Channels**: the encoder takes 1 to 8 (mono through 7.1) in WAV channel
//!   order. The decoder outputs up to 8 channels, except that the engine does
//!   not decode 6.1 (7-channel) ADTS and fails with
//!   `UnknownDecodeFailure(0x5)`.
//! - **Profiles**: AAC-LC, HE-AAC, HE-AACv2 and MPEG-2 variants. AAC-LD and
//!   AAC-ELD cannot be carried in ADTS, so creating an encoder for them fails
//!   with `InitializationFailure("Transport library initialization error")`.
//! - **Bitrate**: CBR (explicit or estimated from the channel layout) or VBR 1-5
//! - **Transport**: ADTS in both directions. The decoder needs a few frames of
//!   input before the first one comes out.
//!
//! ## Usage
//!
//! ```no_run
//! use zvd_aac::codec::aac::{pipeline, AudioObjectType, BitrateMode, DecoderSession, EncoderSession};
//!
//! let mut encoder = EncoderSession::create(2, 44100, AudioObjectType::AacLc, BitrateMode::Cbr, None)?;
//! let pcm = vec![0u8; 4096 * 10];
//! let adts: Vec<u8> = pipeline::encode_stream(&mut encoder, &pcm)?.concat();
//!
//! let mut decoder = DecoderSession::create()?;
//! for frame in pipeline::decode_stream(&mut decoder, &adts)? {
//!     println!("{} Hz, {} channels", frame.metadata.sample_rate, frame.metadata.channel_count);
//! }
//! # Ok::<(), zvd_aac::error::Error>(())
//! ```
//!
//! ## Patent Notice
//! **AAC is patent-encumbered.** Commercial use may require patent licensing from
//! Via Licensing Corporation and other AAC patent holders.
//!
//! ## License
//! - Fraunhofer FDK AAC: FDK AAC license (see the `fdk-aac-sys` crate)

pub mod bitrate;
pub mod channel_layout;
pub mod decoder;
pub mod encoder;
pub mod engine;
pub mod fdk;
pub mod pipeline;
pub mod status;

pub use bitrate::{AudioObjectType, BitrateMode, BitratePlan};
pub use channel_layout::{ChannelLayout, ChannelMode};
pub use decoder::{DecodedFrame, DecoderSession, DecoderState, FillOutcome};
pub use encoder::{EncoderConfig, EncoderSession};
pub use engine::{DecoderEngine, EncoderEngine, StreamMetadata};
pub use fdk::{FdkDecoder, FdkEncoder};
