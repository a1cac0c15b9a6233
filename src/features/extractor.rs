//! Audio feature extraction

use std::time::Instant;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use crate::audio::Waveform;
use crate::config::{AudioConfig, FormantMethod};
use crate::error::{ProfileError, Result};
use super::frames::{FrameGrid, Spectrogram, mean, std_dev};
use super::prosody::{PauseDetector, PitchTracker, detect_onsets, estimate_tempo, frame_rms};
use super::spectral::{
    chroma_means, log_mel_spectrogram, mfcc_means, onset_envelope,
    spectral_centroid, spectral_rolloff, zero_crossing_rate,
};
use super::voice::{harmonic_ratio, lpc_formants, lpc_order, spectral_peak_formants};

/// Spectral, prosodic and voice-quality summary of one utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioFeatureSet {
    /// Beats per minute.
    pub tempo: f64,
    pub spectral_centroid: f64,
    pub spectral_rolloff: f64,
    pub zero_crossing_rate: f64,
    pub mfccs: Vec<f64>,
    /// Pitch classes C through B.
    pub chroma: Vec<f64>,
    pub pitch_mean: f64,
    pub pitch_variability: f64,
    pub energy_mean: f64,
    pub energy_variability: f64,
    /// Onsets per second.
    pub speech_rate: f64,
    pub pause_count: usize,
    pub pause_duration_mean: f64,
    pub voice_quality_hnr: f64,
    pub formants: Vec<f64>,
}

impl AudioFeatureSet {
    /// All-zero set with the configured vector lengths.
    pub fn zeroed(n_mfcc: usize, n_formants: usize) -> Self {
        Self {
            tempo: 0.0,
            spectral_centroid: 0.0,
            spectral_rolloff: 0.0,
            zero_crossing_rate: 0.0,
            mfccs: vec![0.0; n_mfcc],
            chroma: vec![0.0; 12],
            pitch_mean: 0.0,
            pitch_variability: 0.0,
            energy_mean: 0.0,
            energy_variability: 0.0,
            speech_rate: 0.0,
            pause_count: 0,
            pause_duration_mean: 0.0,
            voice_quality_hnr: 0.0,
            formants: vec![0.0; n_formants],
        }
    }

    /// First non-finite value, named by field.
    fn first_non_finite(&self) -> Option<String> {
        let scalars = [
            ("tempo", self.tempo),
            ("spectral_centroid", self.spectral_centroid),
            ("spectral_rolloff", self.spectral_rolloff),
            ("zero_crossing_rate", self.zero_crossing_rate),
            ("pitch_mean", self.pitch_mean),
            ("pitch_variability", self.pitch_variability),
            ("energy_mean", self.energy_mean),
            ("energy_variability", self.energy_variability),
            ("speech_rate", self.speech_rate),
            ("pause_duration_mean", self.pause_duration_mean),
            ("voice_quality_hnr", self.voice_quality_hnr),
        ];
        if let Some((name, _)) = scalars.iter().find(|(_, v)| !v.is_finite()) {
            return Some(name.to_string());
        }

        let vectors = [("mfccs", &self.mfccs), ("chroma", &self.chroma), ("formants", &self.formants)];
        vectors.iter().find_map(|(name, values)| {
            values
                .iter()
                .position(|v| !v.is_finite())
                .map(|i| format!("{}[{}]", name, i))
        })
    }
}

struct SpectralShape {
    centroid: f64,
    rolloff: f64,
    zcr: f64,
    mfccs: Vec<f64>,
    chroma: Vec<f64>,
}

struct Rhythm {
    tempo: f64,
    speech_rate: f64,
}

struct Prosody {
    pitch_mean: f64,
    pitch_variability: f64,
    energy_mean: f64,
    energy_variability: f64,
    pause_count: usize,
    pause_duration_mean: f64,
}

struct VoiceQuality {
    hnr: f64,
    formants: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct AudioFeatureExtractor {
    config: AudioConfig,
}

impl AudioFeatureExtractor {
    pub fn new(config: AudioConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AudioConfig {
        &self.config
    }

    /// Compute the full feature set. Either every feature is produced or an error is returned.
    pub fn extract(&self, wave: &Waveform) -> Result<AudioFeatureSet> {
        let start_time = Instant::now();
        let sample_rate = wave.sample_rate();
        if sample_rate == 0 {
            return Err(ProfileError::audio_decode("Sample rate must be positive"));
        }

        if wave.is_empty() {
            debug!("Empty waveform, returning zeroed features");
            return Ok(AudioFeatureSet::zeroed(self.config.n_mfcc, self.config.n_formants));
        }

        let grid = FrameGrid::from_config(&self.config, sample_rate);
        let frames = grid.frames(wave.samples());
        let spec = Spectrogram::compute(&frames, grid.n_fft, sample_rate)?;
        let log_mel = log_mel_spectrogram(&spec, self.config.n_mels);
        let rms = frame_rms(&frames);
        debug!(
            "Framed {:.2}s at {} Hz: {} frames (window {}, hop {}, fft {})",
            wave.duration(), sample_rate, spec.n_frames(), grid.frame_length, grid.hop_length, grid.n_fft
        );

        let ((shape, rhythm), (prosody, voice)) = rayon::join(
            || rayon::join(
                || self.spectral_shape(&spec, &frames, &log_mel),
                || self.rhythm(&log_mel, grid.frame_rate(sample_rate), wave.duration()),
            ),
            || rayon::join(
                || self.prosody(&spec, &rms, wave),
                || self.voice_quality(&spec, &rms, wave, &grid),
            ),
        );

        let features = AudioFeatureSet {
            tempo: rhythm.tempo,
            spectral_centroid: shape.centroid,
            spectral_rolloff: shape.rolloff,
            zero_crossing_rate: shape.zcr,
            mfccs: shape.mfccs,
            chroma: shape.chroma,
            pitch_mean: prosody.pitch_mean,
            pitch_variability: prosody.pitch_variability,
            energy_mean: prosody.energy_mean,
            energy_variability: prosody.energy_variability,
            speech_rate: rhythm.speech_rate,
            pause_count: prosody.pause_count,
            pause_duration_mean: prosody.pause_duration_mean,
            voice_quality_hnr: voice.hnr,
            formants: voice.formants,
        };

        if let Some(field) = features.first_non_finite() {
            return Err(ProfileError::audio_analysis(format!("Non-finite value in {}", field)));
        }

        info!(
            "Audio features extracted in {:.1}ms (tempo {:.1} bpm, pitch {:.1} Hz, {} pauses)",
            start_time.elapsed().as_secs_f64() * 1000.0,
            features.tempo, features.pitch_mean, features.pause_count
        );
        Ok(features)
    }

    fn spectral_shape(&self, spec: &Spectrogram, frames: &ndarray::Array2<f32>, log_mel: &ndarray::Array2<f32>) -> SpectralShape {
        SpectralShape {
            centroid: mean(&spectral_centroid(spec)),
            rolloff: mean(&spectral_rolloff(spec, self.config.rolloff_percent)),
            zcr: mean(&zero_crossing_rate(frames)),
            mfccs: mfcc_means(log_mel, self.config.n_mfcc),
            chroma: chroma_means(spec),
        }
    }

    fn rhythm(&self, log_mel: &ndarray::Array2<f32>, frame_rate: f32, duration: f64) -> Rhythm {
        let envelope = onset_envelope(log_mel);
        let onsets = detect_onsets(&envelope, frame_rate);
        Rhythm {
            tempo: estimate_tempo(&envelope, frame_rate),
            speech_rate: if duration > 0.0 { onsets.len() as f64 / duration } else { 0.0 },
        }
    }

    fn prosody(&self, spec: &Spectrogram, rms: &[f32], wave: &Waveform) -> Prosody {
        let pitches = PitchTracker::from_config(&self.config).track(spec, rms);
        let voiced: Vec<f32> = pitches.into_iter().filter(|&p| p > 0.0).collect();
        let pauses = PauseDetector::from_config(&self.config).detect(wave.samples(), wave.sample_rate());
        let pause_duration_mean = if pauses.is_empty() {
            0.0
        } else {
            pauses.iter().sum::<f64>() / pauses.len() as f64
        };

        Prosody {
            pitch_mean: mean(&voiced),
            pitch_variability: std_dev(&voiced),
            energy_mean: mean(rms),
            energy_variability: std_dev(rms),
            pause_count: pauses.len(),
            pause_duration_mean,
        }
    }

    fn voice_quality(&self, spec: &Spectrogram, rms: &[f32], wave: &Waveform, grid: &FrameGrid) -> VoiceQuality {
        let n_formants = self.config.n_formants;
        let formants = match self.config.formant_method {
            FormantMethod::Lpc => {
                let segment = self.loudest_segment(wave, rms, grid);
                lpc_formants(segment, wave.sample_rate(), lpc_order(wave.sample_rate()), n_formants)
            }
            FormantMethod::SpectralPeaks => spectral_peak_formants(spec, n_formants),
        };

        VoiceQuality {
            hnr: harmonic_ratio(spec, self.config.hpss_kernel),
            formants,
        }
    }

    /// Analysis window centred on the frame with the highest RMS.
    fn loudest_segment<'a>(&self, wave: &'a Waveform, rms: &[f32], grid: &FrameGrid) -> &'a [f32] {
        let samples = wave.samples();
        let loudest = rms
            .iter()
            .enumerate()
            .fold((0, f32::NEG_INFINITY), |best, (i, &r)| if r > best.1 { (i, r) } else { best })
            .0;
        let window = ((self.config.formant_window_secs * wave.sample_rate() as f32).round() as usize).max(1);
        let center = (loudest * grid.hop_length + grid.frame_length / 2).min(samples.len());
        let start = center.saturating_sub(window / 2).min(samples.len());
        let end = (start + window).min(samples.len());
        &samples[start..end]
    }
}
