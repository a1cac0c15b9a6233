//! Spectral shape features: centroid, rolloff, zero crossings, MFCC, chroma

use std::f32::consts::PI;
use ndarray::{Array1, Array2, Axis};
use super::frames::{Spectrogram, column_means};

const AMIN: f32 = 1e-10;
const TOP_DB: f32 = 80.0;
/// Lowest frequency folded into chroma (C1).
const CHROMA_FMIN: f32 = 32.703;

/// Per-frame spectral centroid in Hz.
pub fn spectral_centroid(spec: &Spectrogram) -> Vec<f32> {
    let freqs = spec.frequencies();
    spec.magnitudes()
        .outer_iter()
        .map(|row| {
            let total: f32 = row.sum();
            if total <= 0.0 {
                return 0.0;
            }
            row.iter().zip(&freqs).map(|(&m, &f)| m * f).sum::<f32>() / total
        })
        .collect()
}

/// Per-frame frequency below which `percent` of the magnitude lies.
pub fn spectral_rolloff(spec: &Spectrogram, percent: f32) -> Vec<f32> {
    let freqs = spec.frequencies();
    spec.magnitudes()
        .outer_iter()
        .map(|row| {
            let total: f32 = row.sum();
            if total <= 0.0 {
                return 0.0;
            }
            let threshold = total * percent;
            let mut cumulative = 0.0;
            for (&m, &f) in row.iter().zip(&freqs) {
                cumulative += m;
                if cumulative >= threshold {
                    return f;
                }
            }
            freqs.last().copied().unwrap_or(0.0)
        })
        .collect()
}

/// Per-frame fraction of adjacent samples that change sign.
pub fn zero_crossing_rate(frames: &Array2<f32>) -> Vec<f32> {
    let len = frames.ncols();
    frames
        .outer_iter()
        .map(|row| {
            if len < 2 {
                return 0.0;
            }
            let crossings = row
                .iter()
                .zip(row.iter().skip(1))
                .filter(|&(&a, &b)| (a < 0.0) != (b < 0.0))
                .count();
            crossings as f32 / len as f32
        })
        .collect()
}

pub fn hz_to_mel(hz: f32) -> f32 {
    let f_sp = 200.0 / 3.0;
    let min_log_hz = 1000.0;
    let min_log_mel = min_log_hz / f_sp;
    let logstep = 6.4f32.ln() / 27.0;
    if hz >= min_log_hz {
        min_log_mel + (hz / min_log_hz).ln() / logstep
    } else {
        hz / f_sp
    }
}

pub fn mel_to_hz(mel: f32) -> f32 {
    let f_sp = 200.0 / 3.0;
    let min_log_hz = 1000.0;
    let min_log_mel = min_log_hz / f_sp;
    let logstep = 6.4f32.ln() / 27.0;
    if mel >= min_log_mel {
        min_log_hz * (logstep * (mel - min_log_mel)).exp()
    } else {
        mel * f_sp
    }
}

/// Slaney-style triangular mel filterbank, `n_mels x n_bins`, area normalised.
pub fn mel_filterbank(sample_rate: u32, n_fft: usize, n_mels: usize) -> Array2<f32> {
    let n_bins = n_fft / 2 + 1;
    let fmax = sample_rate as f32 / 2.0;
    let mel_max = hz_to_mel(fmax);
    let hz_points: Vec<f32> = (0..n_mels + 2)
        .map(|i| mel_to_hz(mel_max * i as f32 / (n_mels + 1) as f32))
        .collect();
    let fft_freqs: Vec<f32> = (0..n_bins)
        .map(|k| k as f32 * sample_rate as f32 / n_fft as f32)
        .collect();

    let mut weights = Array2::zeros((n_mels, n_bins));
    for m in 0..n_mels {
        let (lo, center, hi) = (hz_points[m], hz_points[m + 1], hz_points[m + 2]);
        let enorm = 2.0 / (hi - lo);
        for (k, &f) in fft_freqs.iter().enumerate() {
            let lower = (f - lo) / (center - lo);
            let upper = (hi - f) / (hi - center);
            let w = lower.min(upper).max(0.0);
            weights[[m, k]] = w * enorm;
        }
    }
    weights
}

/// Power to decibels (reference 1.0), clipped to `TOP_DB` below the peak.
pub fn power_to_db(power: &Array2<f32>) -> Array2<f32> {
    let db = power.mapv(|p| 10.0 * p.max(AMIN).log10());
    let peak = db.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    if !peak.is_finite() {
        return db;
    }
    db.mapv(|v| v.max(peak - TOP_DB))
}

/// Orthonormal DCT-II basis, `n_out x n_in`.
pub fn dct_matrix(n_out: usize, n_in: usize) -> Array2<f32> {
    let mut basis = Array2::zeros((n_out, n_in));
    for k in 0..n_out {
        let scale = if k == 0 {
            (1.0 / n_in as f32).sqrt()
        } else {
            (2.0 / n_in as f32).sqrt()
        };
        for n in 0..n_in {
            basis[[k, n]] = scale * (PI * k as f32 * (2 * n + 1) as f32 / (2 * n_in) as f32).cos();
        }
    }
    basis
}

/// Mel power spectrogram in dB, `frames x n_mels`.
pub fn log_mel_spectrogram(spec: &Spectrogram, n_mels: usize) -> Array2<f32> {
    let filterbank = mel_filterbank(spec.sample_rate(), spec.n_fft(), n_mels);
    let mel_power = spec.power().dot(&filterbank.t());
    power_to_db(&mel_power)
}

/// Per-coefficient MFCC means across frames.
pub fn mfcc_means(log_mel: &Array2<f32>, n_mfcc: usize) -> Vec<f64> {
    let dct = dct_matrix(n_mfcc, log_mel.ncols());
    let mfcc = log_mel.dot(&dct.t());
    column_means(&mfcc)
}

/// Pitch class (0 = C) of a frequency.
fn pitch_class(freq: f32) -> usize {
    let midi = 69.0 + 12.0 * (freq / 440.0).log2();
    (midi.round() as i64).rem_euclid(12) as usize
}

/// Per-pitch-class chroma means across frames, each frame max-normalised.
pub fn chroma_means(spec: &Spectrogram) -> Vec<f64> {
    let classes: Vec<Option<usize>> = spec
        .frequencies()
        .into_iter()
        .map(|f| (f >= CHROMA_FMIN).then(|| pitch_class(f)))
        .collect();

    let mut chroma = Array2::<f32>::zeros((spec.n_frames(), 12));
    for (mut out, row) in chroma.outer_iter_mut().zip(spec.magnitudes().outer_iter()) {
        for (&m, class) in row.iter().zip(&classes) {
            if let Some(c) = class {
                out[*c] += m * m;
            }
        }
        let peak = out.iter().copied().fold(0.0f32, f32::max);
        if peak > 0.0 {
            out.mapv_inplace(|v| v / peak);
        }
    }
    column_means(&chroma)
}

/// Onset strength: mean positive change of mel dB between consecutive frames.
pub fn onset_envelope(log_mel: &Array2<f32>) -> Array1<f32> {
    let n_frames = log_mel.nrows();
    let mut envelope = Array1::zeros(n_frames);
    for t in 1..n_frames {
        let flux = log_mel.index_axis(Axis(0), t)
            .iter()
            .zip(log_mel.index_axis(Axis(0), t - 1).iter())
            .map(|(&cur, &prev)| (cur - prev).max(0.0))
            .sum::<f32>();
        envelope[t] = flux / log_mel.ncols().max(1) as f32;
    }
    envelope
}
