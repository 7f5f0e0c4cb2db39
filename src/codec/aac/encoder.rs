//! AAC encoder session
//!
//! All negotiation happens in [`EncoderSession::create`]: the channel layout
//! and bitrate plan are validated first, then the engine is opened and
//! configured one parameter at a time and the configuration committed. After
//! that the session only encodes. Each [`EncoderSession::encode_frame`] call
//! hands one buffer of interleaved 16-bit PCM to the engine and returns
//! whatever ADTS bytes it produced. An empty buffer flushes the engine's
//! look-ahead at end of stream.

use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::bitrate::{self, AudioObjectType, BitrateMode, BitratePlan};
use super::channel_layout::ChannelLayout;
use super::engine::{
    EncoderEngine, EncoderParam, InputDescriptor, CHANNEL_ORDER_WAV, TRANSPORT_ADTS,
};
use super::fdk::FdkEncoder;
use super::status::{self, EncoderStatus};
use crate::error::{Error, Result};
use crate::util::{ScratchBuffer, SAMPLE_WIDTH};

/// Output scratch size in bytes
pub const MAX_AAC_BUFFER_SIZE: usize = 8192;

/// Encoder session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// Number of interleaved input channels (1-8)
    pub channels: u32,
    /// Input sample rate in Hz
    pub sample_rate: u32,
    /// AAC profile
    pub audio_object_type: AudioObjectType,
    /// CBR or VBR with a quality index
    pub bitrate_mode: BitrateMode,
    /// CBR target in bits per second, estimated from the layout when absent
    pub bitrate: Option<u32>,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        EncoderConfig {
            channels: 2,
            sample_rate: 44100,
            audio_object_type: AudioObjectType::AacLc,
            bitrate_mode: BitrateMode::Cbr,
            bitrate: None,
        }
    }
}

/// Encoder session producing ADTS frames
pub struct EncoderSession<E: EncoderEngine = FdkEncoder> {
    engine: Option<E>,
    scratch: Option<ScratchBuffer<u8>>,
    channel_count: u32,
    sample_rate: u32,
    layout: ChannelLayout,
    plan: BitratePlan,
    frame_size: Option<u32>,
    delay: Option<u32>,
    audio_specific_config: Option<Bytes>,
    leftover_samples: usize,
}

impl EncoderSession<FdkEncoder> {
    /// Create an FDK encoder session
    ///
    /// # Arguments
    /// * `channels` - Interleaved channel count (1-8)
    /// * `sample_rate` - Input sample rate in Hz
    /// * `audio_object_type` - AAC profile
    /// * `bitrate_mode` - CBR, or VBR with quality 1-5
    /// * `bitrate` - CBR target in bits per second (`None` or `Some(0)` to estimate)
    pub fn create(
        channels: u32,
        sample_rate: u32,
        audio_object_type: AudioObjectType,
        bitrate_mode: BitrateMode,
        bitrate: Option<u32>,
    ) -> Result<Self> {
        Self::with_config(&EncoderConfig {
            channels,
            sample_rate,
            audio_object_type,
            bitrate_mode,
            bitrate,
        })
    }

    /// Create an FDK encoder session from a configuration
    pub fn with_config(config: &EncoderConfig) -> Result<Self> {
        Self::create_with(FdkEncoder::open, config)
    }
}

impl<E: EncoderEngine> EncoderSession<E> {
    /// Create a session around the engine returned by `open`.
    ///
    /// `open` receives the channel count. Any failure after it succeeds
    /// releases the engine before the error is returned.
    pub fn create_with<F>(open: F, config: &EncoderConfig) -> Result<Self>
    where
        F: FnOnce(u32) -> std::result::Result<E, EncoderStatus>,
    {
        let layout = ChannelLayout::resolve(config.channels).map_err(|e| {
            warn!(channels = config.channels, "AAC: unsupported channel count");
            e
        })?;
        let plan = bitrate::estimate(
            config.bitrate_mode,
            config.sample_rate,
            layout.single_channel_elements,
            layout.channel_pair_elements,
            config.audio_object_type,
            config.bitrate,
        )?;

        let engine = open(config.channels).map_err(|status| {
            warn!(code = status.0, "AAC: unable to open encoder: {}", status);
            status::initialization_error(status)
        })?;

        let mut session = EncoderSession {
            engine: Some(engine),
            scratch: None,
            channel_count: config.channels,
            sample_rate: config.sample_rate,
            layout,
            plan,
            frame_size: None,
            delay: None,
            audio_specific_config: None,
            leftover_samples: 0,
        };

        session.apply(EncoderParam::AudioObjectType, config.audio_object_type.native())?;
        session.apply(EncoderParam::SampleRate, config.sample_rate)?;
        session.apply(EncoderParam::Transmux, TRANSPORT_ADTS)?;
        session.apply(EncoderParam::ChannelMode, layout.mode.native_tag())?;
        session.apply(EncoderParam::ChannelOrder, CHANNEL_ORDER_WAV)?;
        match plan {
            BitratePlan::Vbr { quality } => session.apply(EncoderParam::BitrateMode, quality)?,
            BitratePlan::Cbr { bitrate } => session.apply(EncoderParam::Bitrate, bitrate)?,
        }

        session.scratch = Some(ScratchBuffer::allocate(MAX_AAC_BUFFER_SIZE).map_err(|e| {
            warn!("AAC: unable to allocate output buffer");
            e
        })?);

        session.engine_mut()?.commit().map_err(|status| {
            warn!(code = status.0, "AAC: unable to initialize the encoder: {}", status);
            status::initialization_error(status)
        })?;

        session.load_info();

        debug!(
            channels = session.channel_count,
            sample_rate = session.sample_rate,
            layout = %layout.mode,
            plan = ?plan,
            "AAC encoder created"
        );
        Ok(session)
    }

    fn engine_mut(&mut self) -> Result<&mut E> {
        self.engine
            .as_mut()
            .ok_or_else(|| Error::invalid_state("encoder session destroyed"))
    }

    fn apply(&mut self, param: EncoderParam, value: u32) -> Result<()> {
        self.engine_mut()?.set_param(param, value).map_err(|status| {
            warn!(
                param = param.name(),
                value,
                code = status.0,
                "AAC: unable to set {}: {}",
                param.name(),
                status
            );
            status::configuration_error(param, status)
        })
    }

    fn load_info(&mut self) {
        let info = match self.engine.as_ref().map(|engine| engine.info()) {
            Some(Ok(info)) => info,
            Some(Err(status)) => {
                warn!(code = status.0, "AAC: unable to query encoder info: {}", status);
                return;
            }
            None => return,
        };
        self.frame_size = Some(info.frame_length).filter(|&n| n != 0);
        self.delay = Some(info.delay);
        if !info.audio_specific_config.is_empty() {
            self.audio_specific_config = Some(Bytes::from(info.audio_specific_config));
        }
    }

    /// Encode interleaved native-endian s16 PCM.
    ///
    /// Only whole samples across all channels are described to the engine,
    /// trailing bytes are ignored. At most one frame may be offered per call
    /// ([`Self::bytes_per_frame`]), larger input fails with
    /// [`Error::FrameTooLarge`] before reaching the engine. Samples the engine
    /// did not take are reported by [`Self::leftover_samples`]. An empty
    /// `samples` requests a flush. Returns [`Error::NoData`] when the engine
    /// produced nothing this call.
    pub fn encode_frame(&mut self, samples: &[u8]) -> Result<Bytes> {
        let channels = self.channel_count as usize;
        let max_len = self.bytes_per_frame();
        let (engine, scratch) = match (self.engine.as_mut(), self.scratch.as_mut()) {
            (Some(engine), Some(scratch)) => (engine, scratch),
            _ => return Err(Error::invalid_state("encoder session destroyed")),
        };

        let input = if samples.is_empty() {
            InputDescriptor::flush()
        } else {
            let sample_count = samples.len() / (channels * SAMPLE_WIDTH);
            let byte_len = SAMPLE_WIDTH * channels * sample_count;
            if let Some(max) = max_len.filter(|&max| byte_len > max) {
                warn!(len = byte_len, max, "AAC: input exceeds one frame");
                return Err(Error::FrameTooLarge { len: byte_len, max });
            }
            let num_in_samples = i32::try_from(channels * sample_count)
                .map_err(|_| Error::encode("input buffer too large"))?;
            InputDescriptor::pcm(&samples[..byte_len], num_in_samples)
        };

        let progress = engine
            .encode(&input, scratch.as_mut_slice())
            .map_err(|status| {
                if status != EncoderStatus::ENCODE_EOF {
                    warn!(code = status.0, "AAC: encode failed: {}", status);
                }
                status::encode_error(status)
            })?;

        let offered = input.num_in_samples.max(0) as usize;
        self.leftover_samples = offered.saturating_sub(progress.consumed_samples);
        if self.leftover_samples != 0 {
            warn!(
                consumed = progress.consumed_samples,
                offered,
                "AAC: encoder did not consume all input samples, {} left",
                self.leftover_samples
            );
        }
        if progress.output_bytes == 0 {
            return Err(Error::NoData);
        }
        scratch
            .copy_out(progress.output_bytes)
            .ok_or_else(|| Error::encode("encoder output exceeds buffer size"))
    }

    /// Release the engine and the scratch buffer. Safe to call more than once.
    pub fn destroy(&mut self) {
        if let Some(engine) = self.engine.take() {
            drop(engine);
            debug!("AAC encoder closed");
        }
        self.scratch = None;
    }

    /// Check if the session has been destroyed
    pub fn is_destroyed(&self) -> bool {
        self.engine.is_none()
    }

    /// Samples per channel per frame, once known
    pub fn frame_size(&self) -> Option<u32> {
        self.frame_size
    }

    /// Input bytes making up one full frame
    pub fn bytes_per_frame(&self) -> Option<usize> {
        self.frame_size
            .map(|n| n as usize * self.channel_count as usize * SAMPLE_WIDTH)
    }

    /// Codec delay in samples per channel, once known
    pub fn encoder_delay(&self) -> Option<u32> {
        self.delay
    }

    /// Interleaved samples the engine left unconsumed on the last encode
    pub fn leftover_samples(&self) -> usize {
        self.leftover_samples
    }

    /// AudioSpecificConfig for container muxing
    pub fn audio_specific_config(&self) -> Option<&Bytes> {
        self.audio_specific_config.as_ref()
    }

    /// Get the number of channels
    pub fn channel_count(&self) -> u32 {
        self.channel_count
    }

    /// Get the sample rate
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Channel layout applied to the engine
    pub fn layout(&self) -> ChannelLayout {
        self.layout
    }

    /// Bitrate parameter applied to the engine
    pub fn bitrate_plan(&self) -> BitratePlan {
        self.plan
    }
}

impl<E: EncoderEngine> Drop for EncoderSession<E> {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl<E: EncoderEngine> fmt::Debug for EncoderSession<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncoderSession")
            .field("channel_count", &self.channel_count)
            .field("sample_rate", &self.sample_rate)
            .field("layout", &self.layout)
            .field("plan", &self.plan)
            .field("frame_size", &self.frame_size)
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::aac::engine::{EncodeProgress, EncoderInfo};
    use crate::codec::aac::ChannelMode;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[derive(Default)]
    struct CallLog {
        closed: Cell<usize>,
        params: RefCell<Vec<(EncoderParam, u32)>>,
        inputs: RefCell<Vec<(usize, i32)>>,
    }

    struct ScriptedEncoder {
        calls: Rc<CallLog>,
        reject: Option<EncoderParam>,
        fail_commit: bool,
        output_bytes: usize,
        consume_limit: Option<usize>,
    }

    impl ScriptedEncoder {
        fn new(calls: &Rc<CallLog>) -> Self {
            ScriptedEncoder {
                calls: Rc::clone(calls),
                reject: None,
                fail_commit: false,
                output_bytes: 0,
                consume_limit: None,
            }
        }
    }

    impl EncoderEngine for ScriptedEncoder {
        fn set_param(
            &mut self,
            param: EncoderParam,
            value: u32,
        ) -> std::result::Result<(), EncoderStatus> {
            if self.reject == Some(param) {
                return Err(EncoderStatus::UNSUPPORTED_PARAMETER);
            }
            self.calls.params.borrow_mut().push((param, value));
            Ok(())
        }

        fn commit(&mut self) -> std::result::Result<(), EncoderStatus> {
            if self.fail_commit {
                Err(EncoderStatus::INIT_AAC_ERROR)
            } else {
                Ok(())
            }
        }

        fn encode(
            &mut self,
            input: &InputDescriptor<'_>,
            output: &mut [u8],
        ) -> std::result::Result<EncodeProgress, EncoderStatus> {
            self.calls
                .inputs
                .borrow_mut()
                .push((input.data.len(), input.num_in_samples));
            for byte in output[..self.output_bytes].iter_mut() {
                *byte = 0xAB;
            }
            let offered = input.num_in_samples.max(0) as usize;
            Ok(EncodeProgress {
                output_bytes: self.output_bytes,
                consumed_samples: self.consume_limit.map_or(offered, |n| offered.min(n)),
            })
        }

        fn info(&self) -> std::result::Result<EncoderInfo, EncoderStatus> {
            Ok(EncoderInfo {
                frame_length: 1024,
                audio_specific_config: vec![0x12, 0x10],
                delay: 2048,
            })
        }
    }

    impl Drop for ScriptedEncoder {
        fn drop(&mut self) {
            self.calls.closed.set(self.calls.closed.get() + 1);
        }
    }

    fn session_with(
        calls: &Rc<CallLog>,
        config: &EncoderConfig,
        setup: impl FnOnce(&mut ScriptedEncoder),
    ) -> Result<EncoderSession<ScriptedEncoder>> {
        let mut engine = ScriptedEncoder::new(calls);
        setup(&mut engine);
        EncoderSession::create_with(move |_| Ok(engine), config)
    }

    #[test]
    fn test_parameters_applied_in_order() {
        let calls = Rc::new(CallLog::default());
        let session = session_with(&calls, &EncoderConfig::default(), |_| {}).unwrap();

        let params = calls.params.borrow();
        assert_eq!(
            *params,
            vec![
                (EncoderParam::AudioObjectType, 2),
                (EncoderParam::SampleRate, 44100),
                (EncoderParam::Transmux, 2),
                (EncoderParam::ChannelMode, 2),
                (EncoderParam::ChannelOrder, 1),
                (EncoderParam::Bitrate, 128_290),
            ]
        );
        assert_eq!(session.frame_size(), Some(1024));
        assert_eq!(session.bytes_per_frame(), Some(4096));
        assert_eq!(session.audio_specific_config().unwrap().as_ref(), &[0x12, 0x10]);
        assert_eq!(session.layout().mode, ChannelMode::Stereo);
        assert_eq!(session.encoder_delay(), Some(2048));
    }

    #[test]
    fn test_vbr_sets_bitrate_mode_only() {
        let calls = Rc::new(CallLog::default());
        let config = EncoderConfig {
            channels: 6,
            sample_rate: 48000,
            bitrate_mode: BitrateMode::Vbr(4),
            bitrate: Some(320_000),
            ..Default::default()
        };
        let session = session_with(&calls, &config, |_| {}).unwrap();
        let params = calls.params.borrow();
        assert!(params.contains(&(EncoderParam::ChannelMode, 6)));
        assert!(params.contains(&(EncoderParam::BitrateMode, 4)));
        assert!(!params.iter().any(|(p, _)| *p == EncoderParam::Bitrate));
        assert_eq!(session.bitrate_plan(), BitratePlan::Vbr { quality: 4 });
    }

    #[test]
    fn test_validation_precedes_open() {
        let opened = Cell::new(false);
        let config = EncoderConfig {
            channels: 9,
            ..Default::default()
        };
        let result = EncoderSession::<ScriptedEncoder>::create_with(
            |_| {
                opened.set(true);
                Err(EncoderStatus::INVALID_HANDLE)
            },
            &config,
        );
        assert!(matches!(result, Err(Error::UnsupportedChannelCount(9))));

        let config = EncoderConfig {
            bitrate_mode: BitrateMode::Vbr(6),
            ..Default::default()
        };
        let result = EncoderSession::<ScriptedEncoder>::create_with(
            |_| {
                opened.set(true);
                Err(EncoderStatus::INVALID_HANDLE)
            },
            &config,
        );
        assert!(matches!(result, Err(Error::InvalidVbrQuality(6))));
        assert!(!opened.get());
    }

    #[test]
    fn test_open_failure() {
        let result = EncoderSession::<ScriptedEncoder>::create_with(
            |_| Err(EncoderStatus::MEMORY_ERROR),
            &EncoderConfig::default(),
        );
        match result {
            Err(Error::InitializationFailure(msg)) => assert_eq!(msg, "Memory allocation error"),
            other => panic!("unexpected {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_each_rejected_param_releases_engine_once() {
        for param in [
            EncoderParam::AudioObjectType,
            EncoderParam::SampleRate,
            EncoderParam::Transmux,
            EncoderParam::ChannelMode,
            EncoderParam::ChannelOrder,
            EncoderParam::Bitrate,
        ] {
            let calls = Rc::new(CallLog::default());
            let result = session_with(&calls, &EncoderConfig::default(), |e| e.reject = Some(param));
            match result {
                Err(Error::Configuration { param: name, message }) => {
                    assert_eq!(name, param.name());
                    assert_eq!(message, "Unsupported parameter");
                }
                other => panic!("unexpected {:?}", other.map(|_| ())),
            }
            assert_eq!(calls.closed.get(), 1, "engine released after {:?}", param);
        }
    }

    #[test]
    fn test_commit_failure_releases_engine() {
        let calls = Rc::new(CallLog::default());
        let result = session_with(&calls, &EncoderConfig::default(), |e| e.fail_commit = true);
        assert!(matches!(result, Err(Error::InitializationFailure(_))));
        assert_eq!(calls.closed.get(), 1);
    }

    #[test]
    fn test_encode_describes_whole_samples() {
        let calls = Rc::new(CallLog::default());
        let mut session =
            session_with(&calls, &EncoderConfig::default(), |e| e.output_bytes = 371).unwrap();

        let packet = session.encode_frame(&[0u8; 4097]).unwrap();
        assert_eq!(packet.len(), 371);
        assert!(packet.iter().all(|&b| b == 0xAB));
        assert_eq!(calls.inputs.borrow()[0], (4096, 2048));
    }

    #[test]
    fn test_encode_rejects_more_than_one_frame() {
        let calls = Rc::new(CallLog::default());
        let mut session =
            session_with(&calls, &EncoderConfig::default(), |e| e.output_bytes = 100).unwrap();

        // Twenty stereo frames in one buffer
        match session.encode_frame(&vec![0u8; 20 * 4096]) {
            Err(Error::FrameTooLarge { len, max }) => {
                assert_eq!(len, 20 * 4096);
                assert_eq!(max, 4096);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(calls.inputs.borrow().is_empty());

        // Trailing partial-sample bytes do not count against the limit
        assert!(session.encode_frame(&[0u8; 4099]).is_ok());
        assert_eq!(calls.inputs.borrow()[0], (4096, 2048));
    }

    #[test]
    fn test_unconsumed_samples_are_reported() {
        let calls = Rc::new(CallLog::default());
        let mut session = session_with(&calls, &EncoderConfig::default(), |e| {
            e.output_bytes = 100;
            e.consume_limit = Some(1500);
        })
        .unwrap();

        session.encode_frame(&[0u8; 4096]).unwrap();
        assert_eq!(session.leftover_samples(), 548);

        session.encode_frame(&[0u8; 2000]).unwrap();
        assert_eq!(session.leftover_samples(), 0);
    }

    #[test]
    fn test_encode_input_shorter_than_one_sample() {
        let calls = Rc::new(CallLog::default());
        let config = EncoderConfig {
            channels: 3,
            ..Default::default()
        };
        let mut session = session_with(&calls, &config, |_| {}).unwrap();
        assert!(matches!(session.encode_frame(&[0u8; 5]), Err(Error::NoData)));
        assert_eq!(calls.inputs.borrow()[0], (0, 0));
    }

    #[test]
    fn test_empty_input_flushes() {
        let calls = Rc::new(CallLog::default());
        let mut session = session_with(&calls, &EncoderConfig::default(), |_| {}).unwrap();
        let err = session.encode_frame(&[]).unwrap_err();
        assert!(matches!(err, Error::NoData));
        assert!(err.is_recoverable());
        assert_eq!(calls.inputs.borrow()[0], (0, -1));
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let calls = Rc::new(CallLog::default());
        let mut session = session_with(&calls, &EncoderConfig::default(), |_| {}).unwrap();
        session.destroy();
        session.destroy();
        assert_eq!(calls.closed.get(), 1);
        assert!(matches!(session.encode_frame(&[0u8; 4]), Err(Error::InvalidState(_))));
        drop(session);
        assert_eq!(calls.closed.get(), 1);
    }

    #[test]
    fn test_config_serde() {
        let config = EncoderConfig {
            channels: 1,
            bitrate_mode: BitrateMode::Vbr(3),
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let parsed: EncoderConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);

        let partial: EncoderConfig = serde_json::from_str(r#"{"channels": 6}"#).unwrap();
        assert_eq!(partial.channels, 6);
        assert_eq!(partial.sample_rate, 44100);
    }
}
