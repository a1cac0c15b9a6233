//! Audio Input Module
//!
//! Decodes WAV input into a mono [`Waveform`] and converts sample rates.
//! Codec support beyond WAV is left to callers; anything that yields samples and
//! a rate can build a `Waveform` directly.

pub mod wav;
pub mod converter;

pub use wav::{Waveform, WavLoader, SampleEncoding};
pub use converter::AudioConverter;
