//! Profiling pipeline: audio and text extraction in parallel, then integration

use std::path::Path;
use std::time::{Duration, Instant};
use log::{debug, info};
use crate::audio::{AudioConverter, WavLoader, Waveform};
use crate::config::Config;
use crate::error::{ProfileError, Result};
use crate::features::{AudioFeatureExtractor, AudioFeatureSet};
use crate::processing::integrator::{CommunicationProfile, ProfileIntegrator};
use crate::text::{TextFeatureExtractor, TextFeatureSet};

fn timed<T>(f: impl FnOnce() -> Result<T>) -> (Result<T>, Duration) {
    let start = Instant::now();
    let result = f();
    (result, start.elapsed())
}

#[derive(Debug)]
pub struct Pipeline {
    config: Config,
    pool: rayon::ThreadPool,
    audio: AudioFeatureExtractor,
    text: TextFeatureExtractor,
}

impl Pipeline {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.threads())
            .build()
            .map_err(|e| ProfileError::config(format!("Failed to build thread pool: {}", e)))?;
        let audio = AudioFeatureExtractor::new(config.audio.clone());
        let text = TextFeatureExtractor::new(config.text.clone())?;

        debug!("Pipeline ready with {} threads", config.threads());
        Ok(Self { config, pool, audio, text })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Decode a WAV file and resample it to the configured analysis rate.
    pub fn load_audio<P: AsRef<Path>>(&self, path: P) -> Result<Waveform> {
        let path = path.as_ref();
        let wave = WavLoader::from_file(path)?;
        info!(
            "Loaded {}: {:.2}s at {} Hz",
            path.display(), wave.duration(), wave.sample_rate()
        );
        self.prepare(wave)
    }

    /// Apply the configured resampling, if any.
    pub fn prepare(&self, wave: Waveform) -> Result<Waveform> {
        match self.config.audio.target_sample_rate {
            Some(rate) if rate != wave.sample_rate() => AudioConverter::resample(&wave, rate),
            _ => Ok(wave),
        }
    }

    /// Full profile from a waveform and its transcript.
    pub fn run(&self, wave: &Waveform, transcript: &str) -> Result<PipelineResult> {
        let start_time = Instant::now();

        let ((audio, audio_time), (text, text_time)) = self.pool.install(|| {
            rayon::join(
                || timed(|| self.audio.extract(wave)),
                || timed(|| self.text.extract(transcript)),
            )
        });
        let (audio, text) = (audio?, text?);

        let (profile, integration_time) = timed(|| ProfileIntegrator::integrate(&audio, &text));
        let profile = profile?;

        let metrics = PerformanceMetrics::new(
            Some(wave), start_time.elapsed(), audio_time, text_time, integration_time, self.config.threads(),
        );
        info!("Profile complete in {:.2}s", metrics.processing_time_seconds);

        Ok(PipelineResult {
            profile,
            audio_features: Some(audio),
            text_features: Some(text),
            metrics,
        })
    }

    pub fn run_audio_only(&self, wave: &Waveform) -> Result<PipelineResult> {
        let start_time = Instant::now();
        let (audio, audio_time) = self.pool.install(|| timed(|| self.audio.extract(wave)));
        let audio = audio?;
        let (profile, integration_time) = timed(|| ProfileIntegrator::integrate_audio_only(&audio));

        Ok(PipelineResult {
            profile: profile?,
            audio_features: Some(audio),
            text_features: None,
            metrics: PerformanceMetrics::new(
                Some(wave), start_time.elapsed(), audio_time, Duration::ZERO, integration_time, self.config.threads(),
            ),
        })
    }

    pub fn run_text_only(&self, transcript: &str) -> Result<PipelineResult> {
        let start_time = Instant::now();
        let (text, text_time) = self.pool.install(|| timed(|| self.text.extract(transcript)));
        let text = text?;
        let (profile, integration_time) = timed(|| ProfileIntegrator::integrate_text_only(&text));

        Ok(PipelineResult {
            profile: profile?,
            audio_features: None,
            text_features: Some(text),
            metrics: PerformanceMetrics::new(
                None, start_time.elapsed(), Duration::ZERO, text_time, integration_time, self.config.threads(),
            ),
        })
    }
}

#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub profile: CommunicationProfile,
    pub audio_features: Option<AudioFeatureSet>,
    pub text_features: Option<TextFeatureSet>,
    pub metrics: PerformanceMetrics,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceMetrics {
    pub input_duration_seconds: f64,
    pub processing_time_seconds: f64,
    pub audio_time_seconds: f64,
    pub text_time_seconds: f64,
    pub integration_time_seconds: f64,
    /// Processing time over audio duration; 0 without audio.
    pub real_time_factor: f64,
    pub sample_rate: Option<u32>,
    pub threads: usize,
}

impl PerformanceMetrics {
    fn new(
        wave: Option<&Waveform>,
        total: Duration,
        audio: Duration,
        text: Duration,
        integration: Duration,
        threads: usize,
    ) -> Self {
        let input_duration_seconds = wave.map_or(0.0, Waveform::duration);
        let processing_time_seconds = total.as_secs_f64();
        Self {
            input_duration_seconds,
            processing_time_seconds,
            audio_time_seconds: audio.as_secs_f64(),
            text_time_seconds: text.as_secs_f64(),
            integration_time_seconds: integration.as_secs_f64(),
            real_time_factor: if input_duration_seconds > 0.0 {
                processing_time_seconds / input_duration_seconds
            } else {
                0.0
            },
            sample_rate: wave.map(Waveform::sample_rate),
            threads,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use crate::processing::integrator::Modality;

    fn config() -> Config {
        let mut config = Config::default();
        config.processing.threads = 2;
        config
    }

    #[test]
    fn test_full_run() {
        let pipeline = Pipeline::new(config()).unwrap();
        let wave = Waveform::silence(1.0, 16000).unwrap();
        let result = pipeline
            .run(&wave, "This is a very happy and positive test sentence.")
            .unwrap();

        assert_eq!(result.profile.modality, Modality::Full);
        let pauses = result.profile.field("audio_features", "pause_count").unwrap();
        assert!(pauses.as_u64().unwrap() >= 1);
        assert_eq!(result.profile.field("audio_features", "pitch_mean"), Some(&json!(0.0)));
        assert_eq!(result.profile.field("text_features", "word_count"), Some(&json!(9)));
        assert!(result.audio_features.is_some() && result.text_features.is_some());
        assert!((result.metrics.input_duration_seconds - 1.0).abs() < 1e-9);
        assert_eq!(result.metrics.sample_rate, Some(16000));
        assert_eq!(result.metrics.threads, 2);
    }

    #[test]
    fn test_reduced_runs() {
        let pipeline = Pipeline::new(config()).unwrap();
        let wave = Waveform::silence(0.5, 8000).unwrap();

        let audio = pipeline.run_audio_only(&wave).unwrap();
        assert_eq!(audio.profile.modality, Modality::AudioOnly);
        assert!(audio.profile.text_features.is_none());
        assert!(audio.text_features.is_none());

        let text = pipeline.run_text_only("").unwrap();
        assert_eq!(text.profile.modality, Modality::TextOnly);
        assert!(text.profile.audio_features.is_none());
        assert_eq!(text.metrics.real_time_factor, 0.0);
        assert_eq!(text.metrics.sample_rate, None);
    }

    #[test]
    fn test_prepare_resamples() {
        let mut config = config();
        config.audio.target_sample_rate = Some(8000);
        let pipeline = Pipeline::new(config).unwrap();

        let wave = Waveform::silence(1.0, 16000).unwrap();
        let prepared = pipeline.prepare(wave).unwrap();
        assert_eq!(prepared.sample_rate(), 8000);
        assert_eq!(prepared.len(), 8000);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = config();
        config.audio.n_mfcc = 0;
        assert!(Pipeline::new(config).is_err());
    }
}
