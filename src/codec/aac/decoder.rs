//! AAC decoder session
//!
//! Decoding is two-phase: [`DecoderSession::fill`] hands compressed ADTS bytes
//! to the engine, then [`DecoderSession::decode_frame`] asks for one frame of
//! interleaved 16-bit PCM. When the engine has not buffered a complete frame
//! yet, `decode_frame` returns [`Error::NotEnoughBits`] and the caller is
//! expected to fill more bytes and retry.
//!
//! The FDK engine holds back output until it has locked ADTS sync, which takes
//! several frames: a stream of three ADTS frames yields nothing on its own,
//! five decode normally. Encoding one PCM frame and flushing gives three ADTS
//! frames, encoding three gives five.

use std::fmt;

use bytes::Bytes;
use tracing::{debug, warn};

use super::engine::{DecoderEngine, StreamMetadata};
use super::fdk::FdkDecoder;
use super::status::{self, DecoderStatus};
use crate::error::{Error, Result};
use crate::util::{ScratchBuffer, SAMPLE_WIDTH};

/// Most channels the engine will decode into the scratch buffer
pub const DECODER_MAX_CHANNELS: usize = 8;

/// Most samples per channel in one decoded frame
pub const DECODER_MAX_FRAME_SAMPLES: usize = 2048;

/// Where the session is in the fill/decode cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderState {
    /// Waiting for input
    Ready,
    /// Bytes were handed to the engine since the last decode
    Filled,
}

/// Result of a fill
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillOutcome {
    /// Bytes the engine took
    pub consumed: usize,
    /// Bytes the engine did not take; offer them again on the next fill
    pub leftover: usize,
}

/// One decoded frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame {
    /// Interleaved native-endian s16 samples
    pub pcm: Bytes,
    /// Stream properties at the time of the decode
    pub metadata: StreamMetadata,
}

impl DecodedFrame {
    /// Samples per channel carried by `pcm`
    pub fn samples_per_channel(&self) -> usize {
        let channels = self.metadata.channel_count as usize;
        if channels == 0 {
            0
        } else {
            self.pcm.len() / (channels * SAMPLE_WIDTH)
        }
    }
}

/// Decoder session for one ADTS stream
pub struct DecoderSession<E: DecoderEngine = FdkDecoder> {
    engine: Option<E>,
    scratch: Option<ScratchBuffer<i16>>,
    state: DecoderState,
    leftover: usize,
    frames_decoded: u64,
}

impl DecoderSession<FdkDecoder> {
    /// Open an FDK decoder for ADTS input, with output allowed up to
    /// [`DECODER_MAX_CHANNELS`] channels
    pub fn create() -> Result<Self> {
        Self::create_with(|| FdkDecoder::open(DECODER_MAX_CHANNELS as u32))
    }
}

impl<E: DecoderEngine> DecoderSession<E> {
    /// Create a session around the engine returned by `open`.
    ///
    /// A status from `open` is reported as an initialization failure. If
    /// the scratch buffer cannot be allocated, the engine is released before
    /// the error is returned.
    pub fn create_with<F>(open: F) -> Result<Self>
    where
        F: FnOnce() -> std::result::Result<E, DecoderStatus>,
    {
        let engine = open().map_err(|status| {
            warn!(code = status.0, "AAC: could not initialize decoder: {}", status);
            Error::init(status.message())
        })?;

        let mut session = DecoderSession {
            engine: Some(engine),
            scratch: None,
            state: DecoderState::Ready,
            leftover: 0,
            frames_decoded: 0,
        };
        session.scratch = Some(ScratchBuffer::allocate(
            DECODER_MAX_CHANNELS * DECODER_MAX_FRAME_SAMPLES,
        )?);

        debug!("AAC decoder created");
        Ok(session)
    }

    /// Hand compressed bytes to the engine.
    ///
    /// A non-zero leftover is not an error. It is logged and reported in the
    /// returned [`FillOutcome`].
    pub fn fill(&mut self, data: &[u8]) -> Result<FillOutcome> {
        let engine = self
            .engine
            .as_mut()
            .ok_or_else(|| Error::invalid_state("decoder session destroyed"))?;

        let leftover = engine.fill(data).map_err(|status| {
            warn!(code = status.0, "AAC: fill failed: {}", status);
            status::fill_error(status)
        })?;
        if leftover != 0 {
            warn!(
                leftover,
                "AAC: fill did not consume all data, {} bytes left", leftover
            );
        }

        self.leftover = leftover;
        self.state = DecoderState::Filled;
        Ok(FillOutcome {
            consumed: data.len().saturating_sub(leftover),
            leftover,
        })
    }

    /// Decode one frame out of the bytes filled so far
    pub fn decode_frame(&mut self) -> Result<DecodedFrame> {
        let (engine, scratch) = match (self.engine.as_mut(), self.scratch.as_mut()) {
            (Some(engine), Some(scratch)) => (engine, scratch),
            _ => return Err(Error::invalid_state("decoder session destroyed")),
        };
        self.state = DecoderState::Ready;

        if let Err(status) = engine.decode_frame(scratch.as_mut_slice()) {
            let err = status::decode_error(status);
            match err {
                Error::NotEnoughBits => debug!("AAC: not enough bits to decode a frame"),
                _ => warn!(code = status.0, "AAC: decode failed: {}", status),
            }
            return Err(err);
        }

        let metadata = engine.stream_info();
        let payload_size =
            metadata.frame_size as usize * metadata.channel_count as usize * SAMPLE_WIDTH;
        let pcm = scratch.copy_out(payload_size).ok_or_else(|| {
            warn!(
                payload_size,
                capacity = scratch.capacity_bytes(),
                "AAC: decoded frame does not fit the output buffer"
            );
            Error::UnknownDecodeFailure(DecoderStatus::OUTPUT_BUFFER_TOO_SMALL.0)
        })?;

        self.frames_decoded += 1;
        Ok(DecodedFrame { pcm, metadata })
    }

    /// Current stream properties as reported by the engine
    pub fn metadata(&self) -> Result<StreamMetadata> {
        self.engine
            .as_ref()
            .map(|engine| engine.stream_info())
            .ok_or_else(|| Error::invalid_state("decoder session destroyed"))
    }

    /// Release the engine and the scratch buffer. Safe to call more than once.
    pub fn destroy(&mut self) {
        if let Some(engine) = self.engine.take() {
            drop(engine);
            debug!(frames = self.frames_decoded, "AAC decoder closed");
        }
        self.scratch = None;
    }

    /// Position in the fill/decode cycle
    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// Leftover byte count from the last successful fill
    pub fn leftover(&self) -> usize {
        self.leftover
    }

    /// PCM scratch capacity in bytes (0 once destroyed)
    pub fn scratch_capacity(&self) -> usize {
        self.scratch.as_ref().map_or(0, |s| s.capacity_bytes())
    }

    /// Frames decoded so far
    pub fn frames_decoded(&self) -> u64 {
        self.frames_decoded
    }

    /// Check if the session has been destroyed
    pub fn is_destroyed(&self) -> bool {
        self.engine.is_none()
    }
}

impl<E: DecoderEngine> Drop for DecoderSession<E> {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl<E: DecoderEngine> fmt::Debug for DecoderSession<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecoderSession")
            .field("state", &self.state)
            .field("leftover", &self.leftover)
            .field("frames_decoded", &self.frames_decoded)
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}
