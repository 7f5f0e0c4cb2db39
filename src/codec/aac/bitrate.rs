//! Bitrate policy for the encoder
//!
//! CBR without an explicit bitrate follows the "rule of thumb" estimate from
//! <https://trac.ffmpeg.org/wiki/Encode/AAC#fdk_cbr>: 96 kbit/s per single
//! channel element and 128 kbit/s per channel pair element at 44.1 kHz,
//! scaled linearly with the sample rate.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// AAC audio object type (profile) passed to `AACENC_AOT`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AudioObjectType {
    /// MPEG-4 AAC Low Complexity
    AacLc,
    /// MPEG-4 HE-AAC (SBR)
    HeAac,
    /// MPEG-4 AAC Low Delay
    AacLd,
    /// MPEG-4 HE-AAC v2 (SBR + PS)
    HeAacV2,
    /// MPEG-4 AAC Enhanced Low Delay
    AacEld,
    /// MPEG-2 AAC Low Complexity
    Mpeg2AacLc,
    /// MPEG-2 HE-AAC
    Mpeg2HeAac,
    /// Any other object type, left for the engine to accept or reject
    Other(u32),
}

impl AudioObjectType {
    /// Native AOT number
    pub fn native(self) -> u32 {
        match self {
            AudioObjectType::AacLc => 2,
            AudioObjectType::HeAac => 5,
            AudioObjectType::AacLd => 23,
            AudioObjectType::HeAacV2 => 29,
            AudioObjectType::AacEld => 39,
            AudioObjectType::Mpeg2AacLc => 129,
            AudioObjectType::Mpeg2HeAac => 132,
            AudioObjectType::Other(aot) => aot,
        }
    }

    /// Profiles using spectral band replication, which need half the bitrate
    pub fn is_high_efficiency(self) -> bool {
        matches!(self.native(), 5 | 29 | 132)
    }
}

impl From<u32> for AudioObjectType {
    fn from(aot: u32) -> Self {
        match aot {
            2 => AudioObjectType::AacLc,
            5 => AudioObjectType::HeAac,
            23 => AudioObjectType::AacLd,
            29 => AudioObjectType::HeAacV2,
            39 => AudioObjectType::AacEld,
            129 => AudioObjectType::Mpeg2AacLc,
            132 => AudioObjectType::Mpeg2HeAac,
            other => AudioObjectType::Other(other),
        }
    }
}

impl Default for AudioObjectType {
    fn default() -> Self {
        AudioObjectType::AacLc
    }
}

/// Requested bitrate mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BitrateMode {
    /// Constant bitrate
    Cbr,
    /// Variable bitrate with quality index 1 (lowest) to 5 (highest)
    Vbr(u32),
}

impl From<u32> for BitrateMode {
    /// Native convention: 0 selects CBR, anything else is a VBR quality.
    fn from(mode: u32) -> Self {
        match mode {
            0 => BitrateMode::Cbr,
            quality => BitrateMode::Vbr(quality),
        }
    }
}

impl Default for BitrateMode {
    fn default() -> Self {
        BitrateMode::Cbr
    }
}

/// The single bitrate parameter applied to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BitratePlan {
    /// Apply `AACENC_BITRATEMODE = quality`
    Vbr { quality: u32 },
    /// Apply `AACENC_BITRATE = bitrate` (bits per second)
    Cbr { bitrate: u32 },
}

/// Compute the bitrate plan.
///
/// An explicit bitrate of `Some(0)` is treated as absent.
pub fn estimate(
    mode: BitrateMode,
    sample_rate: u32,
    single_channel_elements: u32,
    channel_pair_elements: u32,
    profile: AudioObjectType,
    explicit_bitrate: Option<u32>,
) -> Result<BitratePlan> {
    match mode {
        BitrateMode::Vbr(quality) => {
            if !(1..=5).contains(&quality) {
                return Err(Error::InvalidVbrQuality(quality));
            }
            Ok(BitratePlan::Vbr { quality })
        }
        BitrateMode::Cbr => {
            let mut bitrate = match explicit_bitrate.filter(|&b| b != 0) {
                Some(bitrate) => bitrate,
                None => {
                    let kbps = 96 * single_channel_elements as u64
                        + 128 * channel_pair_elements as u64;
                    let estimate = kbps * sample_rate as u64 / 44;
                    u32::try_from(estimate).unwrap_or(u32::MAX)
                }
            };
            if profile.is_high_efficiency() {
                bitrate /= 2;
            }
            Ok(BitratePlan::Cbr { bitrate })
        }
    }
}
