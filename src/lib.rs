//! CommProfile - Speech Communication Profiling Library
//!
//! Reduces an utterance (waveform plus transcript) to audio and text feature
//! sets, merges them into one canonical profile and derives feedback from it.

pub mod audio;
pub mod config;
pub mod error;
pub mod features;
pub mod text;
pub mod processing;
pub mod feedback;

pub use config::{Config, Args};
pub use error::{ProfileError, Result};
pub use audio::{Waveform, WavLoader};
pub use features::{AudioFeatureExtractor, AudioFeatureSet};
pub use text::{TextFeatureExtractor, TextFeatureSet};
pub use processing::{CommunicationProfile, Pipeline, ProfileIntegrator};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Initialise `env_logger`; `RUST_LOG` still wins when set.
pub fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .try_init()
        .ok();
}

pub fn get_library_info() -> LibraryInfo {
    LibraryInfo {
        name: NAME.to_string(),
        version: VERSION.to_string(),
        description: DESCRIPTION.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct LibraryInfo {
    pub name: String,
    pub version: String,
    pub description: String,
}

impl std::fmt::Display for LibraryInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} v{} - {}", self.name, self.version, self.description)
    }
}
