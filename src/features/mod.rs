//! Audio feature extraction
//!
//! Framing and STFT live in `frames`; the remaining modules compute one family
//! of features each from the shared spectrogram.

pub mod frames;
pub mod spectral;
pub mod prosody;
pub mod voice;
pub mod extractor;

pub use frames::{FrameGrid, Spectrogram};
pub use extractor::{AudioFeatureExtractor, AudioFeatureSet};
