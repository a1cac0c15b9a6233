//! Prosodic features: pitch, energy, onsets, tempo and pauses

use ndarray::{Array1, Array2};
use crate::config::AudioConfig;
use super::frames::Spectrogram;

const AMPLITUDE_MIN: f32 = 1e-5;
const TEMPO_MIN_BPM: f32 = 30.0;
const TEMPO_MAX_BPM: f32 = 300.0;
const TEMPO_PRIOR_BPM: f32 = 120.0;

/// Per-frame root-mean-square amplitude.
pub fn frame_rms(frames: &Array2<f32>) -> Vec<f32> {
    let len = frames.ncols().max(1) as f32;
    frames
        .outer_iter()
        .map(|row| (row.iter().map(|&x| x * x).sum::<f32>() / len).sqrt())
        .collect()
}

/// Strongest spectral peak per frame inside the configured pitch band.
#[derive(Debug, Clone)]
pub struct PitchTracker {
    pub fmin: f32,
    pub fmax: f32,
    pub threshold: f32,
    pub voicing_rms_floor: f32,
}

impl PitchTracker {
    pub fn from_config(config: &AudioConfig) -> Self {
        Self {
            fmin: config.pitch_fmin,
            fmax: config.pitch_fmax,
            threshold: config.pitch_threshold,
            voicing_rms_floor: config.voicing_rms_floor,
        }
    }

    /// Pitch in Hz per frame; 0 marks an unvoiced frame.
    pub fn track(&self, spec: &Spectrogram, rms: &[f32]) -> Vec<f32> {
        let bin_hz = spec.sample_rate() as f32 / spec.n_fft() as f32;
        let n_bins = spec.n_bins();
        if n_bins < 3 {
            return vec![0.0; spec.n_frames()];
        }
        let lo = ((self.fmin / bin_hz).ceil() as usize).max(1);
        let hi = ((self.fmax / bin_hz).floor() as usize).min(n_bins - 2);

        spec.magnitudes()
            .outer_iter()
            .zip(rms)
            .map(|(row, &frame_rms)| {
                if frame_rms < self.voicing_rms_floor || lo > hi {
                    return 0.0;
                }
                let floor = self.threshold * row.iter().copied().fold(0.0f32, f32::max);

                let mut best: Option<(usize, f32)> = None;
                for k in lo..=hi {
                    let m = row[k];
                    if m > floor && m > row[k - 1] && m >= row[k + 1]
                        && best.is_none_or(|(_, bm)| m > bm)
                    {
                        best = Some((k, m));
                    }
                }

                match best {
                    Some((k, _)) => {
                        let (a, b, c) = (row[k - 1], row[k], row[k + 1]);
                        let denom = a - 2.0 * b + c;
                        let shift = if denom.abs() > f32::EPSILON { 0.5 * (a - c) / denom } else { 0.0 };
                        (k as f32 + shift) * bin_hz
                    }
                    None => 0.0,
                }
            })
            .collect()
    }
}

/// Peak picking over an envelope.
///
/// A sample is a peak when it is the maximum of `x[n - pre_max .. n + post_max]`,
/// exceeds the mean of `x[n - pre_avg .. n + post_avg]` by `delta`, and lies more
/// than `wait` samples after the previous peak.
pub fn peak_pick(
    x: &[f32],
    pre_max: usize,
    post_max: usize,
    pre_avg: usize,
    post_avg: usize,
    delta: f32,
    wait: usize,
) -> Vec<usize> {
    let n = x.len();
    let mut peaks: Vec<usize> = Vec::new();

    for i in 0..n {
        let max_window = &x[i.saturating_sub(pre_max)..(i + post_max.max(1)).min(n)];
        let local_max = max_window.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        if x[i] < local_max {
            continue;
        }

        let avg_window = &x[i.saturating_sub(pre_avg)..(i + post_avg.max(1)).min(n)];
        let local_avg = avg_window.iter().sum::<f32>() / avg_window.len() as f32;
        if x[i] < local_avg + delta {
            continue;
        }

        if peaks.last().is_some_and(|&last| i <= last + wait) {
            continue;
        }
        peaks.push(i);
    }

    peaks
}

/// Onset frames from an onset-strength envelope.
pub fn detect_onsets(envelope: &Array1<f32>, frame_rate: f32) -> Vec<usize> {
    let min = envelope.iter().copied().fold(f32::INFINITY, f32::min);
    let max = envelope.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    if envelope.is_empty() || max - min <= f32::EPSILON {
        return Vec::new();
    }

    let normalized: Vec<f32> = envelope.iter().map(|&v| (v - min) / (max - min)).collect();
    let short = (0.03 * frame_rate) as usize;
    let long = (0.10 * frame_rate) as usize;

    peak_pick(&normalized, short, 1, long, long + 1, 0.07, short)
}

/// Global tempo in beats per minute from onset-envelope autocorrelation.
///
/// Lags between 30 and 300 bpm are scored by their autocorrelation weighted
/// with a log-normal prior around 120 bpm. Returns 0 for a flat envelope.
pub fn estimate_tempo(envelope: &Array1<f32>, frame_rate: f32) -> f64 {
    let n = envelope.len();
    if n < 4 {
        return 0.0;
    }

    let mean = envelope.iter().sum::<f32>() / n as f32;
    let centered: Vec<f32> = envelope.iter().map(|&v| v - mean).collect();
    let energy: f32 = centered.iter().map(|v| v * v).sum();
    if energy <= f32::EPSILON {
        return 0.0;
    }

    let lag_min = ((60.0 * frame_rate / TEMPO_MAX_BPM).floor() as usize).max(1);
    let lag_max = ((60.0 * frame_rate / TEMPO_MIN_BPM).ceil() as usize).min(n - 1);

    let mut best: Option<(usize, f32)> = None;
    for lag in lag_min..=lag_max {
        let overlap = n - lag;
        let ac = centered[..overlap]
            .iter()
            .zip(&centered[lag..])
            .map(|(a, b)| a * b)
            .sum::<f32>() / overlap as f32;
        if ac <= 0.0 {
            continue;
        }
        let bpm = 60.0 * frame_rate / lag as f32;
        let octaves = (bpm / TEMPO_PRIOR_BPM).log2();
        let score = ac * (-0.5 * octaves * octaves).exp();
        if best.is_none_or(|(_, s)| score > s) {
            best = Some((lag, score));
        }
    }

    best.map(|(lag, _)| (60.0 * frame_rate / lag as f32) as f64).unwrap_or(0.0)
}

/// Silence-run based pause detection.
#[derive(Debug, Clone)]
pub struct PauseDetector {
    /// Level relative to the clip peak under which a sample is silent.
    pub threshold_db: f32,
    /// A clip whose peak (dBFS) stays under this level is silent throughout.
    pub floor_db: f32,
    pub min_pause_secs: f32,
}

impl PauseDetector {
    pub fn from_config(config: &AudioConfig) -> Self {
        Self {
            threshold_db: config.pause_threshold_db,
            floor_db: config.silence_floor_db,
            min_pause_secs: config.min_pause_secs,
        }
    }

    /// Durations in seconds of every silent run at least `min_pause_secs` long.
    pub fn detect(&self, samples: &[f32], sample_rate: u32) -> Vec<f64> {
        if samples.is_empty() || sample_rate == 0 {
            return Vec::new();
        }

        let peak = samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max);
        let ref_db = 20.0 * peak.max(AMPLITUDE_MIN).log10();
        let min_run = (self.min_pause_secs * sample_rate as f32).ceil() as usize;
        let digital_silence = ref_db < self.floor_db;

        let mut pauses = Vec::new();
        let mut run = 0usize;
        for &s in samples {
            let level_db = 20.0 * s.abs().max(AMPLITUDE_MIN).log10();
            let silent = digital_silence || level_db - ref_db < self.threshold_db;
            if silent {
                run += 1;
            } else {
                if run >= min_run {
                    pauses.push(run as f64 / sample_rate as f64);
                }
                run = 0;
            }
        }
        if run >= min_run {
            pauses.push(run as f64 / sample_rate as f64);
        }

        pauses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;
    use crate::features::frames::FrameGrid;
    use crate::features::spectral::{log_mel_spectrogram, onset_envelope};

    fn sine(freq: f32, sr: u32, secs: f32, amp: f32) -> Vec<f32> {
        (0..(sr as f32 * secs) as usize)
            .map(|i| amp * (2.0 * PI * freq * i as f32 / sr as f32).sin())
            .collect()
    }

    /// Short 1 kHz bursts every `interval` samples.
    fn click_train(sr: u32, secs: f32, interval: usize) -> Vec<f32> {
        let mut samples = vec![0.0f32; (sr as f32 * secs) as usize];
        let burst = (sr / 200) as usize;
        for start in (0..samples.len()).step_by(interval) {
            for i in 0..burst.min(samples.len() - start) {
                let decay = 1.0 - i as f32 / burst as f32;
                samples[start + i] = 0.8 * decay * (2.0 * PI * 1000.0 * i as f32 / sr as f32).sin();
            }
        }
        samples
    }

    fn analyse(samples: &[f32], sr: u32) -> (FrameGrid, Array2<f32>, Spectrogram) {
        let grid = FrameGrid::new(368, 184);
        let frames = grid.frames(samples);
        let spec = Spectrogram::compute(&frames, grid.n_fft, sr).unwrap();
        (grid, frames, spec)
    }

    #[test]
    fn test_frame_rms() {
        let frames = Array2::from_shape_vec((2, 2), vec![1.0, -1.0, 0.0, 0.0]).unwrap();
        assert_eq!(frame_rms(&frames), vec![1.0, 0.0]);
    }

    #[test]
    fn test_pitch_tracks_sine() {
        let sr = 16000;
        let (_, frames, spec) = analyse(&sine(220.0, sr, 1.0, 0.5), sr);
        let tracker = PitchTracker::from_config(&AudioConfig::default());
        let pitches = tracker.track(&spec, &frame_rms(&frames));

        let voiced: Vec<f32> = pitches.iter().copied().filter(|&p| p > 0.0).collect();
        assert!(!voiced.is_empty());
        let mean = voiced.iter().sum::<f32>() / voiced.len() as f32;
        assert!((mean - 220.0).abs() < 15.0, "mean pitch {}", mean);
    }

    #[test]
    fn test_pitch_silence_unvoiced() {
        let sr = 16000;
        let (_, frames, spec) = analyse(&vec![0.0; 8000], sr);
        let tracker = PitchTracker::from_config(&AudioConfig::default());
        assert!(tracker.track(&spec, &frame_rms(&frames)).iter().all(|&p| p == 0.0));
    }

    #[test]
    fn test_peak_pick_respects_wait() {
        let x = [0.0, 1.0, 0.0, 0.9, 0.0, 0.0, 0.0, 1.0, 0.0];
        assert_eq!(peak_pick(&x, 1, 1, 1, 1, 0.1, 0), vec![1, 3, 7]);
        assert_eq!(peak_pick(&x, 1, 1, 1, 1, 0.1, 3), vec![1, 7]);
    }

    #[test]
    fn test_peak_pick_flat_signal() {
        assert!(peak_pick(&[0.5; 10], 2, 1, 2, 2, 0.07, 1).is_empty());
    }

    #[test]
    fn test_tempo_of_click_train() {
        let sr = 16000;
        // 43 hops between clicks: 60 * (16000 / 184) / 43 = 121.3 bpm
        let (grid, _, spec) = analyse(&click_train(sr, 8.0, 43 * 184), sr);
        let envelope = onset_envelope(&log_mel_spectrogram(&spec, 40));
        let tempo = estimate_tempo(&envelope, grid.frame_rate(sr));
        assert!(tempo > 110.0 && tempo < 130.0, "tempo {}", tempo);

        let onsets = detect_onsets(&envelope, grid.frame_rate(sr));
        let rate = onsets.len() as f32 / 8.0;
        assert!(rate > 1.0 && rate < 4.0, "onset rate {}", rate);
    }

    #[test]
    fn test_tempo_flat_envelope() {
        assert_eq!(estimate_tempo(&Array1::zeros(500), 86.9), 0.0);
        assert_eq!(estimate_tempo(&Array1::zeros(2), 86.9), 0.0);
        assert!(detect_onsets(&Array1::zeros(500), 86.9).is_empty());
    }

    #[test]
    fn test_pauses_in_silence() {
        let detector = PauseDetector::from_config(&AudioConfig::default());
        let pauses = detector.detect(&vec![0.0; 16000], 16000);
        assert_eq!(pauses, vec![1.0]);
    }

    #[test]
    fn test_pauses_between_tones() {
        let sr = 16000;
        let mut samples = sine(200.0, sr, 0.5, 0.5);
        samples.extend(vec![0.0; 12000]);
        samples.extend(sine(200.0, sr, 0.5, 0.5));
        samples.extend(vec![0.0; 4000]);
        samples.extend(sine(200.0, sr, 0.5, 0.5));

        let detector = PauseDetector::from_config(&AudioConfig::default());
        let pauses = detector.detect(&samples, sr);
        assert_eq!(pauses.len(), 1);
        assert!((pauses[0] - 0.75).abs() < 0.01);
    }

    #[test]
    fn test_no_pauses_in_continuous_tone() {
        let detector = PauseDetector::from_config(&AudioConfig::default());
        assert!(detector.detect(&sine(200.0, 16000, 2.0, 0.5), 16000).is_empty());
        assert!(detector.detect(&[], 16000).is_empty());
    }

    #[test]
    fn test_quiet_tone_is_not_a_pause() {
        let detector = PauseDetector::from_config(&AudioConfig::default());
        assert!(detector.detect(&sine(200.0, 16000, 1.0, 0.0008), 16000).is_empty());

        // below the floor the whole clip counts as silence
        let hiss = vec![1e-6; 16000];
        assert_eq!(detector.detect(&hiss, 16000), vec![1.0]);
    }
}
