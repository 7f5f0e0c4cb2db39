//! The native entry points the AAC sessions drive
//!
//! [`DecoderEngine`] and [`EncoderEngine`] describe exactly the calls the
//! sessions make into the codec engine. Releasing an engine is its `Drop`.
//! The production implementations live in [`super::fdk`]; tests substitute
//! scripted engines.

use super::status::{DecoderStatus, EncoderStatus};

/// `TT_MP4_ADTS`: container-less elementary stream framing
pub const TRANSPORT_ADTS: u32 = 2;

/// `AACENC_CHANNELORDER` value selecting WAV (interleaved Microsoft) order
pub const CHANNEL_ORDER_WAV: u32 = 1;

/// `numInSamples` value that asks the encoder to flush its look-ahead
pub const FLUSH_SAMPLE_COUNT: i32 = -1;

/// Stream properties reported by the decoder after a decode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreamMetadata {
    /// Samples per channel in the last decoded frame
    pub frame_size: u32,
    /// Output sample rate in Hz
    pub sample_rate: u32,
    /// Output channel count
    pub channel_count: u32,
}

/// Decoder side of the engine
pub trait DecoderEngine {
    /// Offer compressed bytes to the engine's internal input buffer.
    ///
    /// Returns how many bytes of `data` the engine did *not* take.
    fn fill(&mut self, data: &[u8]) -> Result<usize, DecoderStatus>;

    /// Decode one frame of interleaved 16-bit PCM into `pcm`
    fn decode_frame(&mut self, pcm: &mut [i16]) -> Result<(), DecoderStatus>;

    /// Current stream properties (engine defaults before the first decode)
    fn stream_info(&self) -> StreamMetadata;
}

/// Encoder parameters set during session creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EncoderParam {
    /// `AACENC_AOT`
    AudioObjectType,
    /// `AACENC_BITRATE`
    Bitrate,
    /// `AACENC_BITRATEMODE`
    BitrateMode,
    /// `AACENC_SAMPLERATE`
    SampleRate,
    /// `AACENC_CHANNELMODE`
    ChannelMode,
    /// `AACENC_CHANNELORDER`
    ChannelOrder,
    /// `AACENC_TRANSMUX`
    Transmux,
}

impl EncoderParam {
    /// Native `AACENC_PARAM` identifier
    pub fn native(self) -> u32 {
        match self {
            EncoderParam::AudioObjectType => 0x0100,
            EncoderParam::Bitrate => 0x0101,
            EncoderParam::BitrateMode => 0x0102,
            EncoderParam::SampleRate => 0x0103,
            EncoderParam::ChannelMode => 0x0106,
            EncoderParam::ChannelOrder => 0x0107,
            EncoderParam::Transmux => 0x0300,
        }
    }

    /// Name used in error messages and logs
    pub fn name(self) -> &'static str {
        match self {
            EncoderParam::AudioObjectType => "audio object type",
            EncoderParam::Bitrate => "bitrate",
            EncoderParam::BitrateMode => "VBR mode",
            EncoderParam::SampleRate => "sample rate",
            EncoderParam::ChannelMode => "channel mode",
            EncoderParam::ChannelOrder => "channel order",
            EncoderParam::Transmux => "transport type",
        }
    }
}

/// Input buffer description for one encode call
#[derive(Debug, Clone, Copy)]
pub struct InputDescriptor<'a> {
    /// Interleaved native-endian s16 bytes (empty for a flush)
    pub data: &'a [u8],
    /// Interleaved sample total, or [`FLUSH_SAMPLE_COUNT`]
    pub num_in_samples: i32,
}

impl<'a> InputDescriptor<'a> {
    /// Describe `data` holding `num_in_samples` interleaved samples
    pub fn pcm(data: &'a [u8], num_in_samples: i32) -> Self {
        InputDescriptor {
            data,
            num_in_samples,
        }
    }

    /// Zero-length descriptor requesting a flush
    pub fn flush() -> Self {
        InputDescriptor {
            data: &[],
            num_in_samples: FLUSH_SAMPLE_COUNT,
        }
    }

    /// Check if this descriptor requests a flush
    pub fn is_flush(&self) -> bool {
        self.num_in_samples == FLUSH_SAMPLE_COUNT
    }
}

/// Result of one encode call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EncodeProgress {
    /// Bytes written to the output buffer
    pub output_bytes: usize,
    /// Input samples the engine consumed
    pub consumed_samples: usize,
}

/// Encoder properties available once parameters are committed
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EncoderInfo {
    /// Samples per channel per frame
    pub frame_length: u32,
    /// AudioSpecificConfig bytes
    pub audio_specific_config: Vec<u8>,
    /// Codec delay in samples
    pub delay: u32,
}

/// Encoder side of the engine
pub trait EncoderEngine {
    /// Set one creation parameter
    fn set_param(&mut self, param: EncoderParam, value: u32) -> Result<(), EncoderStatus>;

    /// Apply the parameters set so far (an encode call with no buffers)
    fn commit(&mut self) -> Result<(), EncoderStatus>;

    /// Encode `input` into `output`
    fn encode(
        &mut self,
        input: &InputDescriptor<'_>,
        output: &mut [u8],
    ) -> Result<EncodeProgress, EncoderStatus>;

    /// Query the committed configuration
    fn info(&self) -> Result<EncoderInfo, EncoderStatus>;
}
