//! zvd-aac - AAC encoder and decoder sessions for media pipelines
//!
//! zvd-aac drives the Fraunhofer FDK AAC engine through a narrow,
//! session-based protocol: create a session once per stream, issue one
//! fill/decode or encode call per frame, then destroy it.
//!
//! # Architecture
//!
//! - `codec`: the AAC sessions, their configuration and the engine bindings
//! - `error`: the error taxonomy every native status is translated into
//! - `util`: fixed-capacity scratch buffers shared with the engine

pub mod codec;
pub mod error;
pub mod util;

pub use codec::aac::{
    AudioObjectType, BitrateMode, DecodedFrame, DecoderSession, EncoderConfig, EncoderSession,
    StreamMetadata,
};
pub use error::{Error, Result};

/// zvd-aac version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const VERSION_MAJOR: u32 = 0;
pub const VERSION_MINOR: u32 = 1;
pub const VERSION_PATCH: u32 = 0;

/// Configuration for the zvd-aac library
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Enable verbose logging
    pub verbose: bool,
    /// Enable debug output
    pub debug: bool,
}

/// Initialize the library with the given configuration
pub fn init(config: Config) -> Result<()> {
    if config.verbose || config.debug {
        let level = if config.debug { "debug" } else { "info" };
        tracing_subscriber::fmt()
            .with_env_filter(level)
            .try_init()
            .map_err(|e| Error::init(format!("Failed to initialize logging: {}", e)))?;
    }

    Ok(())
}
