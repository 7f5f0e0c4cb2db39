//! Channel count to FDK channel mode mapping
//!
//! The element counts (single channel elements and channel pair elements) are
//! what the CBR bitrate estimate is computed from. See
//! <https://wiki.multimedia.cx/index.php/Understanding_AAC#Frames_And_Syntax_Elements>.

use std::fmt;

use crate::error::{Error, Result};

/// Multi-channel configuration understood by the encoder engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelMode {
    /// 1.0
    Mono,
    /// 2.0
    Stereo,
    /// 3.0 (C, L, R)
    Surround30,
    /// 4.0 (C, L, R, rear C)
    Surround40,
    /// 5.0
    Surround50,
    /// 5.1
    Surround51,
    /// 6.1
    Surround61,
    /// 7.1
    Surround71,
}

impl ChannelMode {
    /// Native `CHANNEL_MODE` value passed to `AACENC_CHANNELMODE`
    pub fn native_tag(self) -> u32 {
        match self {
            ChannelMode::Mono => 1,       // MODE_1
            ChannelMode::Stereo => 2,     // MODE_2
            ChannelMode::Surround30 => 3, // MODE_1_2
            ChannelMode::Surround40 => 4, // MODE_1_2_1
            ChannelMode::Surround50 => 5, // MODE_1_2_2
            ChannelMode::Surround51 => 6, // MODE_1_2_2_1
            ChannelMode::Surround61 => 11, // MODE_6_1
            ChannelMode::Surround71 => 7, // MODE_1_2_2_2_1
        }
    }

    /// Short human-readable name
    pub fn name(self) -> &'static str {
        match self {
            ChannelMode::Mono => "mono",
            ChannelMode::Stereo => "stereo",
            ChannelMode::Surround30 => "3.0",
            ChannelMode::Surround40 => "4.0",
            ChannelMode::Surround50 => "5.0",
            ChannelMode::Surround51 => "5.1",
            ChannelMode::Surround61 => "6.1",
            ChannelMode::Surround71 => "7.1",
        }
    }
}

impl fmt::Display for ChannelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Channel mode plus the syntax element counts it implies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelLayout {
    /// Engine channel mode
    pub mode: ChannelMode,
    /// Single channel elements (SCE)
    pub single_channel_elements: u32,
    /// Channel pair elements (CPE)
    pub channel_pair_elements: u32,
}

impl ChannelLayout {
    const fn new(mode: ChannelMode, sce: u32, cpe: u32) -> Self {
        ChannelLayout {
            mode,
            single_channel_elements: sce,
            channel_pair_elements: cpe,
        }
    }

    /// Resolve the layout for `channel_count` (1-8)
    pub fn resolve(channel_count: u32) -> Result<Self> {
        let layout = match channel_count {
            1 => Self::new(ChannelMode::Mono, 1, 0),
            2 => Self::new(ChannelMode::Stereo, 0, 1),
            3 => Self::new(ChannelMode::Surround30, 1, 1),
            4 => Self::new(ChannelMode::Surround40, 2, 1),
            5 => Self::new(ChannelMode::Surround50, 1, 2),
            6 => Self::new(ChannelMode::Surround51, 2, 2),
            7 => Self::new(ChannelMode::Surround61, 3, 2),
            8 => Self::new(ChannelMode::Surround71, 2, 3),
            other => return Err(Error::UnsupportedChannelCount(other)),
        };
        Ok(layout)
    }

    /// Number of channels this layout carries
    pub fn channels(&self) -> u32 {
        match self.mode {
            ChannelMode::Mono => 1,
            ChannelMode::Stereo => 2,
            ChannelMode::Surround30 => 3,
            ChannelMode::Surround40 => 4,
            ChannelMode::Surround50 => 5,
            ChannelMode::Surround51 => 6,
            ChannelMode::Surround61 => 7,
            ChannelMode::Surround71 => 8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_table() {
        let expected = [
            (1, ChannelMode::Mono, 1, 0),
            (2, ChannelMode::Stereo, 0, 1),
            (3, ChannelMode::Surround30, 1, 1),
            (4, ChannelMode::Surround40, 2, 1),
            (5, ChannelMode::Surround50, 1, 2),
            (6, ChannelMode::Surround51, 2, 2),
            (7, ChannelMode::Surround61, 3, 2),
            (8, ChannelMode::Surround71, 2, 3),
        ];
        for (channels, mode, sce, cpe) in expected {
            let layout = ChannelLayout::resolve(channels).unwrap();
            assert_eq!(layout.mode, mode, "mode for {} channels", channels);
            assert_eq!(layout.single_channel_elements, sce);
            assert_eq!(layout.channel_pair_elements, cpe);
            assert_eq!(layout.channels(), channels);
        }
    }

    #[test]
    fn test_element_counts_cover_channels() {
        for channels in 1..=8 {
            let layout = ChannelLayout::resolve(channels).unwrap();
            assert_eq!(
                layout.single_channel_elements + 2 * layout.channel_pair_elements,
                channels
            );
        }
    }

    #[test]
    fn test_unsupported_counts() {
        for channels in [0, 9, 10, 48, u32::MAX] {
            assert!(matches!(
                ChannelLayout::resolve(channels),
                Err(Error::UnsupportedChannelCount(c)) if c == channels
            ));
        }
    }

    #[test]
    fn test_native_tags() {
        assert_eq!(ChannelMode::Mono.native_tag(), 1);
        assert_eq!(ChannelMode::Stereo.native_tag(), 2);
        assert_eq!(ChannelMode::Surround51.native_tag(), 6);
        assert_eq!(ChannelMode::Surround61.native_tag(), 11);
        assert_eq!(ChannelMode::Surround71.native_tag(), 7);
    }

    #[test]
    fn test_mode_names() {
        assert_eq!(ChannelMode::Surround51.to_string(), "5.1");
        assert_eq!(ChannelMode::Mono.to_string(), "mono");
    }
}
