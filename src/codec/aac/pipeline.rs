//! Whole-stream drivers over the session protocol
//!
//! These are the loops a caller would otherwise write by hand: feed the
//! encoder whole frames and flush it at the end, or keep re-offering ADTS
//! bytes to the decoder until every complete frame has come out. They only use
//! the public session operations.

use bytes::Bytes;
use tracing::debug;

use super::decoder::{DecodedFrame, DecoderSession};
use super::encoder::EncoderSession;
use super::engine::{DecoderEngine, EncoderEngine};
use crate::error::{Error, Result};
use crate::util::SAMPLE_WIDTH;

/// Upper bound on flush calls at end of stream
pub const MAX_FLUSH_CALLS: usize = 64;

/// Consecutive empty flushes treated as fully drained
pub const MAX_IDLE_FLUSHES: usize = 4;

/// Frame length assumed when the engine did not report one
const DEFAULT_FRAME_SAMPLES: usize = 1024;

/// Encode a complete PCM stream and flush the encoder.
///
/// `pcm` is interleaved native-endian s16. Returns every ADTS frame produced,
/// in order.
pub fn encode_stream<E: EncoderEngine>(
    session: &mut EncoderSession<E>,
    pcm: &[u8],
) -> Result<Vec<Bytes>> {
    let chunk_len = session.bytes_per_frame().unwrap_or(
        DEFAULT_FRAME_SAMPLES * session.channel_count() as usize * SAMPLE_WIDTH,
    );

    let mut packets = Vec::new();
    for chunk in pcm.chunks(chunk_len) {
        match session.encode_frame(chunk) {
            Ok(packet) => packets.push(packet),
            Err(Error::NoData) => {}
            Err(e) => return Err(e),
        }
    }
    packets.extend(flush(session)?);
    Ok(packets)
}

/// Drain the encoder's look-ahead.
///
/// Stops when the engine reports end of stream or returns nothing
/// [`MAX_IDLE_FLUSHES`] times in a row.
pub fn flush<E: EncoderEngine>(session: &mut EncoderSession<E>) -> Result<Vec<Bytes>> {
    let mut packets = Vec::new();
    let mut idle = 0;
    for _ in 0..MAX_FLUSH_CALLS {
        match session.encode_frame(&[]) {
            Ok(packet) => {
                idle = 0;
                packets.push(packet);
            }
            Err(Error::NoData) => {
                idle += 1;
                if idle >= MAX_IDLE_FLUSHES {
                    return Ok(packets);
                }
            }
            Err(e) if e.is_end_of_stream() => {
                debug!(frames = packets.len(), "AAC: encoder drained");
                return Ok(packets);
            }
            Err(e) => return Err(e),
        }
    }
    Err(Error::invalid_state(format!(
        "encoder still producing output after {} flush calls",
        MAX_FLUSH_CALLS
    )))
}

/// Decode every complete frame in an ADTS byte stream.
///
/// Non-empty input that yields no frame at all is reported as
/// [`Error::NotEnoughBits`]. The FDK engine needs a few ADTS frames to lock
/// sync and holds back a stream shorter than that, so the caller can fill
/// more bytes through the same session. Empty input returns no frames.
pub fn decode_stream<E: DecoderEngine>(
    session: &mut DecoderSession<E>,
    adts: &[u8],
) -> Result<Vec<DecodedFrame>> {
    let mut frames = Vec::new();
    let mut offset = 0;
    loop {
        let mut consumed = 0;
        if offset < adts.len() {
            consumed = session.fill(&adts[offset..])?.consumed;
            offset += consumed;
        }

        let before = frames.len();
        loop {
            match session.decode_frame() {
                Ok(frame) => frames.push(frame),
                Err(Error::NotEnoughBits) => break,
                Err(e) => return Err(e),
            }
        }

        if offset >= adts.len() {
            if frames.is_empty() && !adts.is_empty() {
                debug!(bytes = adts.len(), "AAC: stream too short to decode a frame");
                return Err(Error::NotEnoughBits);
            }
            return Ok(frames);
        }
        if consumed == 0 && frames.len() == before {
            return Err(Error::invalid_state(
                "decoder accepted no input and produced no frame",
            ));
        }
    }
}
