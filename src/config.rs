//! Configuration management for profile extraction

use crate::error::{ProfileError, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub audio_path: Option<PathBuf>,
    pub transcript_path: Option<PathBuf>,
    pub output_path: Option<PathBuf>,
    pub audio: AudioConfig,
    pub text: TextConfig,
    pub processing: ProcessingConfig,
}

/// How formant frequencies are estimated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormantMethod {
    /// Pole frequencies of an all-pole (linear prediction) fit.
    Lpc,
    /// Strongest peaks of the mean magnitude spectrum.
    SpectralPeaks,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Resample loaded audio to this rate before analysis.
    pub target_sample_rate: Option<u32>,
    pub frame_duration_secs: f32,
    pub hop_ratio: f32,
    pub n_mfcc: usize,
    pub n_mels: usize,
    pub rolloff_percent: f32,
    pub pitch_fmin: f32,
    pub pitch_fmax: f32,
    pub pitch_threshold: f32,
    pub voicing_rms_floor: f32,
    pub pause_threshold_db: f32,
    pub silence_floor_db: f32,
    pub min_pause_secs: f32,
    pub hpss_kernel: usize,
    pub n_formants: usize,
    pub formant_method: FormantMethod,
    pub formant_window_secs: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    /// Sentences longer than this many words count as complex.
    pub complex_sentence_words: usize,
    pub top_words: usize,
    pub extra_stopwords: Vec<String>,
    /// VADER-format lexicon replacing the embedded one.
    pub lexicon_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    pub threads: usize,
    pub verbose: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            target_sample_rate: None,
            frame_duration_secs: 0.023,
            hop_ratio: 0.5,
            n_mfcc: 13,
            n_mels: 40,
            rolloff_percent: 0.85,
            pitch_fmin: 75.0,
            pitch_fmax: 500.0,
            pitch_threshold: 0.1,
            voicing_rms_floor: 1e-4,
            pause_threshold_db: -30.0,
            silence_floor_db: -90.0,
            min_pause_secs: 0.5,
            hpss_kernel: 31,
            n_formants: 4,
            formant_method: FormantMethod::Lpc,
            formant_window_secs: 0.05,
        }
    }
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            complex_sentence_words: 20,
            top_words: 10,
            extra_stopwords: Vec::new(),
            lexicon_path: None,
        }
    }
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            threads: num_cpus::get(),
            verbose: false,
        }
    }
}

impl AudioConfig {
    /// Analysis window length in samples for `sample_rate`.
    pub fn frame_length(&self, sample_rate: u32) -> usize {
        ((sample_rate as f32 * self.frame_duration_secs).round() as usize).max(2)
    }

    /// Hop between consecutive analysis windows.
    pub fn hop_length(&self, sample_rate: u32) -> usize {
        ((self.frame_length(sample_rate) as f32 * self.hop_ratio).round() as usize).max(1)
    }

    /// FFT size: next power of two covering the window.
    pub fn n_fft(&self, sample_rate: u32) -> usize {
        self.frame_length(sample_rate).next_power_of_two()
    }
}

impl Config {
    /// Get verbose mode (convenience method)
    pub fn verbose(&self) -> bool {
        self.processing.verbose
    }

    /// Get worker thread count (convenience method)
    pub fn threads(&self) -> usize {
        self.processing.threads
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "commprofile", about = "Speech Communication Profiler", version, author)]
pub struct Args {
    #[arg(short = 'a', long = "audio", help = "Input audio file path (WAV format)")]
    pub audio: Option<PathBuf>,

    #[arg(short = 't', long = "transcript", help = "Transcript text file path")]
    pub transcript: Option<PathBuf>,

    #[arg(long = "text", conflicts_with = "transcript", help = "Transcript given inline")]
    pub text: Option<String>,

    #[arg(short = 'o', long = "output", help = "Write the profile JSON here instead of stdout")]
    pub output: Option<PathBuf>,

    #[arg(short = 'r', long = "sample-rate", help = "Resample audio to this rate (Hz) before analysis")]
    pub sample_rate: Option<u32>,

    #[arg(long = "mfcc", help = "Number of MFCC coefficients")]
    pub n_mfcc: Option<usize>,

    #[arg(long = "formants", help = "Number of formants to report")]
    pub n_formants: Option<usize>,

    #[arg(long = "threads", help = "Worker thread count")]
    pub threads: Option<usize>,

    #[arg(long = "audio-only", conflicts_with = "text_only", help = "Build a reduced audio-only profile")]
    pub audio_only: bool,

    #[arg(long = "text-only", help = "Build a reduced text-only profile")]
    pub text_only: bool,

    #[arg(short = 'f', long = "feedback", help = "Also print rule-based feedback for the profile")]
    pub feedback: bool,

    #[arg(short = 'v', long = "verbose", help = "Enable verbose output mode")]
    pub verbose: bool,

    #[arg(short = 'c', long = "config", help = "Config file path (TOML format)")]
    pub config_file: Option<PathBuf>,

    #[arg(long = "write-default-config", help = "Write the default config to this path and exit")]
    pub write_default_config: Option<PathBuf>,
}

impl Config {
    /// Create config from command line arguments and config file
    pub fn from_args_and_config(args: Args) -> Result<Self> {
        let mut config = if let Some(config_path) = &args.config_file {
            Self::from_file(config_path)?
        } else {
            Self::default()
        };

        // Command line arguments override config file settings
        if args.audio.is_some() {
            config.audio_path = args.audio;
        }
        if args.transcript.is_some() {
            config.transcript_path = args.transcript;
        }
        if args.output.is_some() {
            config.output_path = args.output;
        }
        if args.sample_rate.is_some() {
            config.audio.target_sample_rate = args.sample_rate;
        }
        if let Some(n) = args.n_mfcc {
            config.audio.n_mfcc = n;
        }
        if let Some(n) = args.n_formants {
            config.audio.n_formants = n;
        }
        if let Some(n) = args.threads {
            config.processing.threads = n;
        }
        config.processing.verbose |= args.verbose;

        config.validate()?;

        Ok(config)
    }

    /// Load config from TOML config file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ProfileError::config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| ProfileError::config(format!("Failed to parse config file: {}", e)))
    }

    /// Validate configuration parameter validity
    pub fn validate(&self) -> Result<()> {
        let audio = &self.audio;

        if let Some(rate) = audio.target_sample_rate {
            if rate < 4000 {
                return Err(ProfileError::config("Target sample rate must be at least 4000 Hz"));
            }
            if rate > 192000 {
                return Err(ProfileError::config("Target sample rate cannot exceed 192000 Hz"));
            }
        }

        if !(0.005..=0.2).contains(&audio.frame_duration_secs) {
            return Err(ProfileError::config("Frame duration must be in range [0.005, 0.2] seconds"));
        }
        if audio.hop_ratio <= 0.0 || audio.hop_ratio > 1.0 {
            return Err(ProfileError::config("Hop ratio must be in range (0.0, 1.0]"));
        }

        if audio.n_mfcc == 0 {
            return Err(ProfileError::config("MFCC count must be greater than 0"));
        }
        if audio.n_mels < audio.n_mfcc {
            return Err(ProfileError::config("Mel band count cannot be smaller than MFCC count"));
        }

        if !(0.0..1.0).contains(&audio.rolloff_percent) || audio.rolloff_percent == 0.0 {
            return Err(ProfileError::config("Rolloff percent must be in range (0.0, 1.0)"));
        }

        if audio.pitch_fmin <= 0.0 || audio.pitch_fmin >= audio.pitch_fmax {
            return Err(ProfileError::config("Pitch range must satisfy 0 < fmin < fmax"));
        }
        if !(0.0..1.0).contains(&audio.pitch_threshold) {
            return Err(ProfileError::config("Pitch threshold must be in range [0.0, 1.0)"));
        }

        if audio.pause_threshold_db >= 0.0 || audio.silence_floor_db >= 0.0 {
            return Err(ProfileError::config("Silence thresholds must be negative dB values"));
        }
        if audio.min_pause_secs <= 0.0 {
            return Err(ProfileError::config("Minimum pause duration must be greater than 0"));
        }

        if audio.hpss_kernel == 0 || audio.hpss_kernel % 2 == 0 {
            return Err(ProfileError::config("HPSS kernel size must be odd"));
        }

        if audio.n_formants == 0 || audio.n_formants > 8 {
            return Err(ProfileError::config("Formant count must be in range [1, 8]"));
        }
        if audio.formant_window_secs < audio.frame_duration_secs {
            return Err(ProfileError::config("Formant window cannot be shorter than the analysis frame"));
        }

        if self.text.complex_sentence_words == 0 {
            return Err(ProfileError::config("Complex sentence threshold must be greater than 0"));
        }
        if self.text.top_words == 0 {
            return Err(ProfileError::config("Top word count must be greater than 0"));
        }

        if self.processing.threads == 0 {
            return Err(ProfileError::config("Thread count must be greater than 0"));
        }
        if self.processing.threads > num_cpus::get() * 2 {
            return Err(ProfileError::config("Thread count cannot exceed 2x logical CPU cores"));
        }

        Ok(())
    }

    /// Save config to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ProfileError::config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| ProfileError::config(format!("Failed to write config file: {}", e)))
    }

    /// Create default config file
    pub fn create_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
        Self::default().save_to_file(path)
    }
}
