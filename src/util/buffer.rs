//! Fixed-capacity scratch buffers shared with the codec engine
//!
//! A [`ScratchBuffer`] is allocated exactly once when a session is created and
//! is never resized. The engine reads from or writes into it on each call, and
//! everything handed back to the caller is copied out into a fresh [`Bytes`],
//! so the buffer contents are only meaningful until the next call.

use bytes::{Bytes, BytesMut};

use crate::error::{Error, Result};

mod sealed {
    pub trait Sealed {}
    impl Sealed for u8 {}
    impl Sealed for i16 {}
}

/// Element types a scratch buffer can hold
pub trait ScratchElement: Copy + Default + sealed::Sealed {
    /// Width of one element in bytes
    const WIDTH: usize;

    /// Append the native-endian bytes of `src` to `out`
    fn extend_bytes(src: &[Self], out: &mut BytesMut);
}

impl ScratchElement for u8 {
    const WIDTH: usize = 1;

    fn extend_bytes(src: &[Self], out: &mut BytesMut) {
        out.extend_from_slice(src);
    }
}

impl ScratchElement for i16 {
    const WIDTH: usize = 2;

    fn extend_bytes(src: &[Self], out: &mut BytesMut) {
        for sample in src {
            out.extend_from_slice(&sample.to_ne_bytes());
        }
    }
}

/// Session-owned buffer with a capacity fixed at allocation time
#[derive(Debug)]
pub struct ScratchBuffer<T: ScratchElement> {
    data: Vec<T>,
}

impl<T: ScratchElement> ScratchBuffer<T> {
    /// Allocate `len` zeroed elements, reporting allocation failure as
    /// [`Error::OutOfMemory`] instead of aborting.
    pub fn allocate(len: usize) -> Result<Self> {
        let mut data = Vec::new();
        data.try_reserve_exact(len).map_err(|_| Error::OutOfMemory)?;
        data.resize(len, T::default());
        Ok(ScratchBuffer { data })
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the buffer holds no elements
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Capacity in bytes
    pub fn capacity_bytes(&self) -> usize {
        self.data.len() * T::WIDTH
    }

    /// Read-only view of the elements
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Mutable view handed to the engine
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Copy the first `byte_len` bytes into a freshly allocated buffer.
    ///
    /// Returns `None` when `byte_len` exceeds the capacity or does not cover
    /// whole elements.
    pub fn copy_out(&self, byte_len: usize) -> Option<Bytes> {
        if byte_len > self.capacity_bytes() || byte_len % T::WIDTH != 0 {
            return None;
        }
        let mut out = BytesMut::with_capacity(byte_len);
        T::extend_bytes(&self.data[..byte_len / T::WIDTH], &mut out);
        Some(out.freeze())
    }
}
