//! Fraunhofer FDK AAC engine bindings
//!
//! This is the only module with `unsafe` code. Each engine type owns its
//! native handle exclusively and closes it in `Drop`.

use std::os::raw::{c_int, c_void};
use std::{mem, ptr};

use fdk_aac_sys as sys;

use super::engine::{
    DecoderEngine, EncodeProgress, EncoderEngine, EncoderInfo, EncoderParam, InputDescriptor,
    StreamMetadata, TRANSPORT_ADTS,
};
use super::status::{DecoderStatus, EncoderStatus};
use crate::util::SAMPLE_WIDTH;

/// `IN_AUDIO_DATA` buffer identifier
const IN_AUDIO_DATA: c_int = 0;
/// `OUT_BITSTREAM_DATA` buffer identifier
const OUT_BITSTREAM_DATA: c_int = 3;

fn check_decoder(code: sys::AAC_DECODER_ERROR) -> Result<(), DecoderStatus> {
    let status = DecoderStatus(code as u32);
    if status.is_ok() {
        Ok(())
    } else {
        Err(status)
    }
}

fn check_encoder(code: sys::AACENC_ERROR) -> Result<(), EncoderStatus> {
    let status = EncoderStatus(code as u32);
    if status.is_ok() {
        Ok(())
    } else {
        Err(status)
    }
}

fn to_int(len: usize) -> c_int {
    c_int::try_from(len).unwrap_or(c_int::MAX)
}

/// FDK decoder instance reading ADTS
pub struct FdkDecoder {
    handle: sys::HANDLE_AACDECODER,
}

// SAFETY: the handle is owned by this value alone and every call through it
// takes `&mut self` or `&self` on this value, so moving it between threads is
// sound. The engine keeps no thread-local state.
unsafe impl Send for FdkDecoder {}

impl FdkDecoder {
    /// Open a decoder for one layer of ADTS input, emitting up to
    /// `max_output_channels` channels without downmixing.
    pub fn open(max_output_channels: u32) -> Result<Self, DecoderStatus> {
        let handle = unsafe { sys::aacDecoder_Open(TRANSPORT_ADTS as _, 1) };
        if handle.is_null() {
            return Err(DecoderStatus::OUT_OF_MEMORY);
        }
        let decoder = FdkDecoder { handle };
        // The engine default caps output at 6 channels and downmixes 7.1.
        check_decoder(unsafe {
            sys::aacDecoder_SetParam(
                decoder.handle,
                sys::AACDEC_PARAM_AAC_PCM_MAX_OUTPUT_CHANNELS,
                max_output_channels as _,
            )
        })?;
        Ok(decoder)
    }
}

impl DecoderEngine for FdkDecoder {
    fn fill(&mut self, data: &[u8]) -> Result<usize, DecoderStatus> {
        let size = u32::try_from(data.len()).map_err(|_| DecoderStatus::UNKNOWN)?;
        let mut buffer = data.as_ptr() as *mut u8;
        let mut valid = size;
        // The engine copies out of `buffer` and never writes through it.
        check_decoder(unsafe {
            sys::aacDecoder_Fill(self.handle, &mut buffer, &size, &mut valid)
        })?;
        Ok(valid as usize)
    }

    fn decode_frame(&mut self, pcm: &mut [i16]) -> Result<(), DecoderStatus> {
        check_decoder(unsafe {
            sys::aacDecoder_DecodeFrame(self.handle, pcm.as_mut_ptr(), to_int(pcm.len()), 0)
        })
    }

    fn stream_info(&self) -> StreamMetadata {
        let info = unsafe { sys::aacDecoder_GetStreamInfo(self.handle) };
        if info.is_null() {
            return StreamMetadata::default();
        }
        let info = unsafe { &*info };
        StreamMetadata {
            frame_size: info.frameSize.max(0) as u32,
            sample_rate: info.sampleRate.max(0) as u32,
            channel_count: info.numChannels.max(0) as u32,
        }
    }
}

impl Drop for FdkDecoder {
    fn drop(&mut self) {
        if !self.handle.is_null() {
            unsafe { sys::aacDecoder_Close(self.handle) };
            self.handle = ptr::null_mut();
        }
    }
}

/// FDK encoder instance
pub struct FdkEncoder {
    handle: sys::HANDLE_AACENCODER,
}

// SAFETY: see `FdkDecoder`.
unsafe impl Send for FdkEncoder {}

impl FdkEncoder {
    /// Open an encoder supporting up to `max_channels` channels
    pub fn open(max_channels: u32) -> Result<Self, EncoderStatus> {
        let mut handle: sys::HANDLE_AACENCODER = ptr::null_mut();
        let code = unsafe { sys::aacEncOpen(&mut handle, 0, max_channels as _) };
        // Wrap first so a handle returned alongside an error is still closed.
        let encoder = FdkEncoder { handle };
        check_encoder(code)?;
        if encoder.handle.is_null() {
            return Err(EncoderStatus::INVALID_HANDLE);
        }
        Ok(encoder)
    }
}

impl EncoderEngine for FdkEncoder {
    fn set_param(&mut self, param: EncoderParam, value: u32) -> Result<(), EncoderStatus> {
        check_encoder(unsafe { sys::aacEncoder_SetParam(self.handle, param.native() as _, value as _) })
    }

    fn commit(&mut self) -> Result<(), EncoderStatus> {
        check_encoder(unsafe {
            sys::aacEncEncode(
                self.handle,
                ptr::null(),
                ptr::null(),
                ptr::null(),
                ptr::null_mut(),
            )
        })
    }

    fn encode(
        &mut self,
        input: &InputDescriptor<'_>,
        output: &mut [u8],
    ) -> Result<EncodeProgress, EncoderStatus> {
        // The engine wants a non-null input pointer even for a flush.
        let mut dummy = [0u8; SAMPLE_WIDTH];
        let mut in_ptr = if input.data.is_empty() {
            dummy.as_mut_ptr() as *mut c_void
        } else {
            input.data.as_ptr() as *mut c_void
        };
        let mut in_id = IN_AUDIO_DATA;
        let mut in_size = to_int(input.data.len());
        let mut in_el_size = SAMPLE_WIDTH as c_int;
        let in_desc = sys::AACENC_BufDesc {
            numBufs: 1,
            bufs: &mut in_ptr,
            bufferIdentifiers: &mut in_id,
            bufSizes: &mut in_size,
            bufElSizes: &mut in_el_size,
        };

        let mut out_ptr = output.as_mut_ptr() as *mut c_void;
        let mut out_id = OUT_BITSTREAM_DATA;
        let mut out_size = to_int(output.len());
        let mut out_el_size: c_int = 1;
        let out_desc = sys::AACENC_BufDesc {
            numBufs: 1,
            bufs: &mut out_ptr,
            bufferIdentifiers: &mut out_id,
            bufSizes: &mut out_size,
            bufElSizes: &mut out_el_size,
        };

        let mut in_args: sys::AACENC_InArgs = unsafe { mem::zeroed() };
        in_args.numInSamples = input.num_in_samples as _;
        let mut out_args: sys::AACENC_OutArgs = unsafe { mem::zeroed() };

        check_encoder(unsafe {
            sys::aacEncEncode(self.handle, &in_desc, &out_desc, &in_args, &mut out_args)
        })?;

        Ok(EncodeProgress {
            output_bytes: out_args.numOutBytes.max(0) as usize,
            consumed_samples: out_args.numInSamples.max(0) as usize,
        })
    }

    fn info(&self) -> Result<EncoderInfo, EncoderStatus> {
        let mut info: sys::AACENC_InfoStruct = unsafe { mem::zeroed() };
        check_encoder(unsafe { sys::aacEncInfo(self.handle, &mut info) })?;
        let conf_len = (info.confSize as usize).min(info.confBuf.len());
        Ok(EncoderInfo {
            frame_length: info.frameLength as u32,
            audio_specific_config: info.confBuf[..conf_len].to_vec(),
            delay: info.nDelay as u32,
        })
    }
}

impl Drop for FdkEncoder {
    fn drop(&mut self) {
        if !self.handle.is_null() {
            unsafe { sys::aacEncClose(&mut self.handle) };
            self.handle = ptr::null_mut();
        }
    }
}
