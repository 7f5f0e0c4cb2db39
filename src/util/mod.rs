//! Common utilities and data structures

pub mod buffer;

pub use buffer::{ScratchBuffer, ScratchElement};

/// Width in bytes of one PCM sample exchanged with the engine (signed 16-bit)
pub const SAMPLE_WIDTH: usize = 2;
