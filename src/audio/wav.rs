//! WAV decoding into analysis waveforms

use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::Path;
use hound::{SampleFormat, WavReader, WavWriter};
use log::debug;
use crate::error::{ProfileError, Result};

/// On-disk sample encoding used when writing a waveform back out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleEncoding {
    Int16,
    Float32,
}

impl SampleEncoding {
    pub fn name(&self) -> &'static str {
        match self {
            SampleEncoding::Int16 => "int16",
            SampleEncoding::Float32 => "float32",
        }
    }

    pub fn bits_per_sample(&self) -> u16 {
        match self {
            SampleEncoding::Int16 => 16,
            SampleEncoding::Float32 => 32,
        }
    }

    fn to_sample_format(self) -> SampleFormat {
        match self {
            SampleEncoding::Int16 => SampleFormat::Int,
            SampleEncoding::Float32 => SampleFormat::Float,
        }
    }
}

/// Mono sample sequence plus its rate. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl Waveform {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(ProfileError::audio_decode("Sample rate cannot be 0"));
        }
        if let Some(pos) = samples.iter().position(|s| !s.is_finite()) {
            return Err(ProfileError::audio_decode(format!(
                "Sample at position {} is not a finite value", pos
            )));
        }
        Ok(Self { samples, sample_rate })
    }

    /// All-zero waveform of the given length.
    pub fn silence(duration_secs: f32, sample_rate: u32) -> Result<Self> {
        let len = (duration_secs.max(0.0) * sample_rate as f32).round() as usize;
        Self::new(vec![0.0; len], sample_rate)
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Largest absolute sample value.
    pub fn peak(&self) -> f32 {
        self.samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P, encoding: SampleEncoding) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: encoding.bits_per_sample(),
            sample_format: encoding.to_sample_format(),
        };
        let mut writer = WavWriter::create(path, spec)
            .map_err(|e| ProfileError::io(format!("Cannot create output file {}: {}", path.display(), e)))?;

        for &sample in &self.samples {
            let clamped = sample.clamp(-1.0, 1.0);
            match encoding {
                SampleEncoding::Float32 => writer.write_sample(clamped)?,
                SampleEncoding::Int16 => writer.write_sample((clamped * 32767.0) as i16)?,
            }
        }

        writer.finalize()?;
        Ok(())
    }
}

/// Decodes WAV containers into mono [`Waveform`]s.
pub struct WavLoader;

impl WavLoader {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Waveform> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            ProfileError::audio_decode(format!("Cannot open audio file {}: {}", path.display(), e))
        })?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Waveform> {
        Self::from_reader(Cursor::new(bytes))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Waveform> {
        let mut reader = WavReader::new(reader)
            .map_err(|e| ProfileError::audio_decode(format!("Cannot create WAV reader: {}", e)))?;

        let spec = reader.spec();
        if spec.sample_rate == 0 {
            return Err(ProfileError::audio_decode("Invalid sample rate"));
        }
        if spec.channels == 0 {
            return Err(ProfileError::audio_decode("Invalid channel count"));
        }

        let interleaved: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
            (SampleFormat::Float, 32) => reader
                .samples::<f32>()
                .collect::<std::result::Result<Vec<_>, _>>()?,
            (SampleFormat::Int, bits @ (8 | 16 | 24 | 32)) => {
                let scale = (1i64 << (bits - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect::<std::result::Result<Vec<_>, _>>()?
            }
            (format, bits) => {
                return Err(ProfileError::audio_decode(format!(
                    "Unsupported sample format: {:?} with {} bits", format, bits
                )));
            }
        };

        if interleaved.is_empty() {
            return Err(ProfileError::audio_decode("Audio stream contains no samples"));
        }

        let channels = spec.channels as usize;
        let samples = if channels == 1 {
            interleaved
        } else {
            interleaved
                .chunks_exact(channels)
                .map(|frame| frame.iter().sum::<f32>() / channels as f32)
                .collect()
        };

        debug!(
            "Decoded WAV: {} Hz, {} ch, {} bits, {} frames",
            spec.sample_rate, spec.channels, spec.bits_per_sample, samples.len()
        );

        Waveform::new(samples, spec.sample_rate)
    }
}
