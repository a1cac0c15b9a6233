//! Voice quality and formant estimation
//!
//! Formants here are an approximation: either the pole frequencies of a
//! low-order all-pole fit on the loudest stretch of the clip, or the strongest
//! peaks of the average spectrum. Neither is a formant tracker.

use std::f64::consts::PI;
use ndarray::{Array2, Axis};
use rustfft::num_complex::Complex;
use super::frames::Spectrogram;

const PRE_EMPHASIS: f64 = 0.97;
const FORMANT_MIN_HZ: f64 = 90.0;
const FORMANT_MAX_BANDWIDTH_HZ: f64 = 400.0;
const ROOT_MAX_ITERATIONS: usize = 500;
const ROOT_TOLERANCE: f64 = 1e-12;

/// Median filter along `axis` with a window truncated at the edges.
pub fn median_filter(matrix: &Array2<f32>, kernel: usize, axis: Axis) -> Array2<f32> {
    let half = kernel / 2;
    let along_rows = axis == Axis(0);
    let len = matrix.len_of(axis);
    let mut out = Array2::zeros(matrix.dim());
    let mut window = Vec::with_capacity(kernel);

    for ((r, c), value) in out.indexed_iter_mut() {
        let pos = if along_rows { r } else { c };
        window.clear();
        for p in pos.saturating_sub(half)..(pos + half + 1).min(len) {
            window.push(if along_rows { matrix[[p, c]] } else { matrix[[r, p]] });
        }
        let mid = (window.len() - 1) / 2;
        let (_, median, _) = window.select_nth_unstable_by(mid, f32::total_cmp);
        *value = *median;
    }
    out
}

/// Harmonic to percussive energy ratio from median-filter separation.
///
/// Harmonic content is smooth along time, percussive content along frequency;
/// soft masks split the power spectrogram between the two. 0 for a silent clip.
pub fn harmonic_ratio(spec: &Spectrogram, kernel: usize) -> f64 {
    let power = spec.power();
    let total: f64 = power.iter().map(|&p| p as f64).sum();
    if total <= f64::EPSILON {
        return 0.0;
    }

    let (harmonic, percussive) = rayon::join(
        || median_filter(&power, kernel, Axis(0)),
        || median_filter(&power, kernel, Axis(1)),
    );

    let mut harmonic_energy = 0.0f64;
    let mut percussive_energy = 0.0f64;
    for ((&p, &h), &q) in power.iter().zip(harmonic.iter()).zip(percussive.iter()) {
        let (h2, q2) = ((h as f64).powi(2), (q as f64).powi(2));
        if h2 + q2 <= 0.0 {
            continue;
        }
        harmonic_energy += p as f64 * h2 / (h2 + q2);
        percussive_energy += p as f64 * q2 / (h2 + q2);
    }

    harmonic_energy / (percussive_energy + 1e-10)
}

/// Autocorrelation coefficients `r[0..=order]`.
pub fn autocorrelation(x: &[f64], order: usize) -> Vec<f64> {
    (0..=order)
        .map(|lag| {
            if lag >= x.len() {
                0.0
            } else {
                x[..x.len() - lag].iter().zip(&x[lag..]).map(|(a, b)| a * b).sum()
            }
        })
        .collect()
}

/// Levinson-Durbin recursion: prediction polynomial `[1, a1, .., a_order]`.
///
/// Stops early once the prediction error is negligible; remaining
/// coefficients stay 0.
pub fn levinson_durbin(r: &[f64], order: usize) -> Vec<f64> {
    let mut a = vec![0.0; order + 1];
    a[0] = 1.0;
    if r.is_empty() || r[0] <= 0.0 {
        return a;
    }

    let mut error = r[0];
    for i in 1..=order.min(r.len() - 1) {
        if error <= r[0] * 1e-12 {
            break;
        }
        let acc = r[i] + (1..i).map(|j| a[j] * r[i - j]).sum::<f64>();
        let k = -acc / error;
        let prev = a.clone();
        for j in 1..i {
            a[j] = prev[j] + k * prev[i - j];
        }
        a[i] = k;
        error *= 1.0 - k * k;
    }
    a
}

fn horner(coeffs: &[f64], z: Complex<f64>) -> Complex<f64> {
    coeffs
        .iter()
        .fold(Complex::new(0.0, 0.0), |acc, &c| acc * z + Complex::new(c, 0.0))
}

/// Roots of a polynomial given by descending coefficients (Durand-Kerner).
pub fn polynomial_roots(coeffs: &[f64]) -> Vec<Complex<f64>> {
    let start = coeffs.iter().position(|c| c.abs() > 0.0).unwrap_or(coeffs.len());
    let coeffs = &coeffs[start..];
    if coeffs.len() < 2 {
        return Vec::new();
    }
    let monic: Vec<f64> = coeffs.iter().map(|c| c / coeffs[0]).collect();
    let degree = monic.len() - 1;

    let seed = Complex::new(0.4, 0.9);
    let mut roots: Vec<Complex<f64>> = (0..degree).map(|k| seed.powu(k as u32)).collect();

    for _ in 0..ROOT_MAX_ITERATIONS {
        let mut max_delta = 0.0f64;
        for k in 0..degree {
            let zk = roots[k];
            let denom = roots
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != k)
                .fold(Complex::new(1.0, 0.0), |acc, (_, &zj)| acc * (zk - zj));
            if denom.norm() == 0.0 {
                roots[k] = zk + Complex::new(1e-6, 1e-6);
                max_delta = f64::INFINITY;
                continue;
            }
            let delta = horner(&monic, zk) / denom;
            roots[k] = zk - delta;
            max_delta = max_delta.max(delta.norm());
        }
        if max_delta < ROOT_TOLERANCE {
            break;
        }
    }
    roots
}

/// LPC order for a sample rate: two poles per kHz plus two, clamped to [8, 24].
pub fn lpc_order(sample_rate: u32) -> usize {
    (2 + sample_rate as usize / 1000).clamp(8, 24)
}

/// Formant estimates from LPC pole frequencies, ascending and zero-padded to `n`.
pub fn lpc_formants(segment: &[f32], sample_rate: u32, order: usize, n: usize) -> Vec<f64> {
    let mut formants = Vec::with_capacity(n);
    let len = segment.len();

    if len > order {
        let denom = (len - 1).max(1) as f64;
        let emphasized: Vec<f64> = (0..len)
            .map(|i| {
                let prev = if i == 0 { 0.0 } else { segment[i - 1] as f64 };
                let hamming = 0.54 - 0.46 * (2.0 * PI * i as f64 / denom).cos();
                (segment[i] as f64 - PRE_EMPHASIS * prev) * hamming
            })
            .collect();

        let r = autocorrelation(&emphasized, order);
        if r[0] > 1e-12 {
            let mut a = levinson_durbin(&r, order);
            while a.len() > 1 && a.last().is_some_and(|c| c.abs() < 1e-12) {
                a.pop();
            }

            let sr = sample_rate as f64;
            let mut candidates: Vec<f64> = polynomial_roots(&a)
                .into_iter()
                .filter(|z| z.im > 0.0)
                .filter_map(|z| {
                    let freq = z.im.atan2(z.re) * sr / (2.0 * PI);
                    let bandwidth = -(sr / PI) * z.norm().ln();
                    let valid = freq > FORMANT_MIN_HZ
                        && freq < sr / 2.0 - 50.0
                        && bandwidth < FORMANT_MAX_BANDWIDTH_HZ;
                    valid.then_some(freq)
                })
                .collect();
            candidates.sort_by(f64::total_cmp);
            formants.extend(candidates.into_iter().take(n));
        }
    }

    formants.resize(n, 0.0);
    formants
}

/// Formant estimates from the strongest peaks of the mean spectrum.
pub fn spectral_peak_formants(spec: &Spectrogram, n: usize) -> Vec<f64> {
    let mean = spec.mean_spectrum();
    let freqs = spec.frequencies();

    let mut peaks: Vec<(f64, f32)> = (1..mean.len().saturating_sub(1))
        .filter(|&k| {
            mean[k] > 0.0
                && mean[k] > mean[k - 1]
                && mean[k] >= mean[k + 1]
                && freqs[k] as f64 > FORMANT_MIN_HZ
        })
        .map(|k| (freqs[k] as f64, mean[k]))
        .collect();
    peaks.sort_by(|a, b| b.1.total_cmp(&a.1));
    peaks.truncate(n);

    let mut formants: Vec<f64> = peaks.into_iter().map(|(f, _)| f).collect();
    formants.sort_by(f64::total_cmp);
    formants.resize(n, 0.0);
    formants
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand::rngs::StdRng;
    use crate::features::frames::FrameGrid;

    fn spectrogram(samples: &[f32], sr: u32) -> Spectrogram {
        let grid = FrameGrid::new(368, 184);
        Spectrogram::compute(&grid.frames(samples), grid.n_fft, sr).unwrap()
    }

    #[test]
    fn test_median_filter() {
        let m = Array2::from_shape_vec((1, 5), vec![1.0, 9.0, 2.0, 8.0, 3.0]).unwrap();
        let along_freq = median_filter(&m, 3, Axis(1));
        assert_eq!(along_freq.row(0).to_vec(), vec![1.0, 2.0, 8.0, 3.0, 3.0]);
        let along_time = median_filter(&m, 3, Axis(0));
        assert_eq!(along_time, m);
    }

    #[test]
    fn test_levinson_ar1() {
        let a = levinson_durbin(&[1.0, 0.5, 0.25], 2);
        assert!((a[0] - 1.0).abs() < 1e-12);
        assert!((a[1] + 0.5).abs() < 1e-12);
        assert!(a[2].abs() < 1e-12);
    }

    #[test]
    fn test_levinson_zero_energy() {
        assert_eq!(levinson_durbin(&[0.0, 0.0, 0.0], 2), vec![1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_autocorrelation() {
        let r = autocorrelation(&[1.0, 2.0, 3.0], 3);
        assert_eq!(r, vec![14.0, 8.0, 3.0, 0.0]);
    }

    #[test]
    fn test_polynomial_roots_real() {
        // (z - 0.5)(z + 0.25)
        let mut roots: Vec<f64> = polynomial_roots(&[1.0, -0.25, -0.125])
            .into_iter()
            .map(|z| {
                assert!(z.im.abs() < 1e-9);
                z.re
            })
            .collect();
        roots.sort_by(f64::total_cmp);
        assert!((roots[0] + 0.25).abs() < 1e-9);
        assert!((roots[1] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_polynomial_roots_complex_pair() {
        let (r, theta) = (0.9f64, 0.6f64);
        let roots = polynomial_roots(&[1.0, -2.0 * r * theta.cos(), r * r]);
        assert_eq!(roots.len(), 2);
        for z in roots {
            assert!((z.norm() - r).abs() < 1e-9);
            assert!((z.im.atan2(z.re).abs() - theta).abs() < 1e-9);
        }
    }

    #[test]
    fn test_lpc_order() {
        assert_eq!(lpc_order(8000), 10);
        assert_eq!(lpc_order(16000), 18);
        assert_eq!(lpc_order(48000), 24);
        assert_eq!(lpc_order(4000), 8);
    }

    #[test]
    fn test_lpc_formant_of_resonance() {
        let sr = 16000u32;
        let (r, freq) = (0.99f64, 1000.0f64);
        let omega = 2.0 * PI * freq / sr as f64;
        let mut rng = StdRng::seed_from_u64(7);
        let samples: Vec<f32> = (0..800)
            .map(|n| {
                let ring = r.powi(n) * (omega * (n + 1) as f64).sin();
                (0.5 * ring) as f32 + rng.gen_range(-1e-4..1e-4)
            })
            .collect();

        let formants = lpc_formants(&samples, sr, lpc_order(sr), 8);
        assert_eq!(formants.len(), 8);
        assert!(
            formants.iter().any(|&f| (f - freq).abs() < 100.0),
            "formants {:?}", formants
        );
    }

    #[test]
    fn test_formants_of_silence() {
        assert_eq!(lpc_formants(&[0.0; 800], 16000, 18, 4), vec![0.0; 4]);
        assert_eq!(lpc_formants(&[], 16000, 18, 5), vec![0.0; 5]);
        let spec = spectrogram(&[0.0; 4000], 16000);
        assert_eq!(spectral_peak_formants(&spec, 4), vec![0.0; 4]);
    }

    #[test]
    fn test_spectral_peak_formants_two_tones() {
        let sr = 16000;
        let samples: Vec<f32> = (0..8000)
            .map(|i| {
                let t = i as f32 / sr as f32;
                0.5 * (2.0 * std::f32::consts::PI * 500.0 * t).sin()
                    + 0.3 * (2.0 * std::f32::consts::PI * 1500.0 * t).sin()
            })
            .collect();
        let formants = spectral_peak_formants(&spectrogram(&samples, sr), 2);
        assert!((formants[0] - 500.0).abs() < 32.0, "{:?}", formants);
        assert!((formants[1] - 1500.0).abs() < 32.0, "{:?}", formants);
    }

    #[test]
    fn test_harmonic_ratio_tone_vs_noise() {
        let sr = 16000;
        let tone: Vec<f32> = (0..16000)
            .map(|i| 0.5 * (2.0 * std::f32::consts::PI * 300.0 * i as f32 / sr as f32).sin())
            .collect();
        let mut rng = StdRng::seed_from_u64(11);
        let noise: Vec<f32> = (0..16000).map(|_| rng.gen_range(-0.5..0.5)).collect();

        let tone_hnr = harmonic_ratio(&spectrogram(&tone, sr), 31);
        let noise_hnr = harmonic_ratio(&spectrogram(&noise, sr), 31);
        assert!(tone_hnr > 1.0, "tone {}", tone_hnr);
        assert!(tone_hnr > noise_hnr, "tone {} noise {}", tone_hnr, noise_hnr);
        assert_eq!(harmonic_ratio(&spectrogram(&[0.0; 4000], sr), 31), 0.0);
    }
}
