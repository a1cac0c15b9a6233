//! Short-time framing and magnitude spectrogram

use std::f32::consts::PI;
use ndarray::{Array1, Array2, Axis};
use rayon::prelude::*;
use rustfft::{FftPlanner, num_complex::Complex};
use crate::config::AudioConfig;
use crate::error::{ProfileError, Result};

/// Window/hop geometry shared by every frame-based feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameGrid {
    pub frame_length: usize,
    pub hop_length: usize,
    pub n_fft: usize,
}

impl FrameGrid {
    pub fn new(frame_length: usize, hop_length: usize) -> Self {
        Self {
            frame_length,
            hop_length: hop_length.max(1),
            n_fft: frame_length.next_power_of_two(),
        }
    }

    pub fn from_config(config: &AudioConfig, sample_rate: u32) -> Self {
        Self {
            frame_length: config.frame_length(sample_rate),
            hop_length: config.hop_length(sample_rate),
            n_fft: config.n_fft(sample_rate),
        }
    }

    /// Number of frames covering `len` samples; the trailing frame is zero-padded.
    pub fn frame_count(&self, len: usize) -> usize {
        if len == 0 {
            0
        } else if len <= self.frame_length {
            1
        } else {
            1 + (len - self.frame_length).div_ceil(self.hop_length)
        }
    }

    /// Frames as rows of a `frame_count x frame_length` matrix.
    pub fn frames(&self, samples: &[f32]) -> Array2<f32> {
        let count = self.frame_count(samples.len());
        let mut frames = Array2::zeros((count, self.frame_length));
        for (i, mut row) in frames.outer_iter_mut().enumerate() {
            let start = i * self.hop_length;
            let end = (start + self.frame_length).min(samples.len());
            for (dst, &src) in row.iter_mut().zip(&samples[start..end]) {
                *dst = src;
            }
        }
        frames
    }

    /// Frames per second of signal.
    pub fn frame_rate(&self, sample_rate: u32) -> f32 {
        sample_rate as f32 / self.hop_length as f32
    }
}

/// Periodic Hann window.
pub fn hann_window(len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f32 / len as f32).cos())
        .collect()
}

/// Magnitude STFT, one row per frame.
#[derive(Debug, Clone)]
pub struct Spectrogram {
    magnitudes: Array2<f32>,
    sample_rate: u32,
    n_fft: usize,
}

impl Spectrogram {
    pub fn compute(frames: &Array2<f32>, n_fft: usize, sample_rate: u32) -> Result<Self> {
        let n_frames = frames.nrows();
        let frame_length = frames.ncols();
        let n_bins = n_fft / 2 + 1;

        if frame_length > n_fft {
            return Err(ProfileError::audio_analysis(format!(
                "Frame length {} exceeds FFT size {}", frame_length, n_fft
            )));
        }

        let window = hann_window(frame_length);
        let fft = FftPlanner::<f32>::new().plan_fft_forward(n_fft);

        let rows: Vec<Vec<f32>> = (0..n_frames)
            .into_par_iter()
            .map(|i| {
                let mut buffer = vec![Complex { re: 0.0f32, im: 0.0 }; n_fft];
                for ((dst, &x), &w) in buffer.iter_mut().zip(frames.row(i).iter()).zip(&window) {
                    dst.re = x * w;
                }
                fft.process(&mut buffer);
                buffer[..n_bins].iter().map(|c| c.norm()).collect()
            })
            .collect();

        let magnitudes = Array2::from_shape_vec((n_frames, n_bins), rows.concat())
            .map_err(|e| ProfileError::audio_analysis(format!("Spectrogram shape: {}", e)))?;

        Ok(Self { magnitudes, sample_rate, n_fft })
    }

    pub fn magnitudes(&self) -> &Array2<f32> {
        &self.magnitudes
    }

    pub fn power(&self) -> Array2<f32> {
        self.magnitudes.mapv(|m| m * m)
    }

    pub fn n_frames(&self) -> usize {
        self.magnitudes.nrows()
    }

    pub fn n_bins(&self) -> usize {
        self.magnitudes.ncols()
    }

    pub fn n_fft(&self) -> usize {
        self.n_fft
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Centre frequency of each bin in Hz.
    pub fn frequencies(&self) -> Vec<f32> {
        (0..self.n_bins())
            .map(|k| k as f32 * self.sample_rate as f32 / self.n_fft as f32)
            .collect()
    }

    /// Average magnitude per bin across frames.
    pub fn mean_spectrum(&self) -> Array1<f32> {
        self.magnitudes
            .mean_axis(Axis(0))
            .unwrap_or_else(|| Array1::zeros(self.n_bins()))
    }
}

/// Mean of `values`, 0 for an empty slice.
pub fn mean(values: &[f32]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|&v| v as f64).sum::<f64>() / values.len() as f64
}

/// Population standard deviation, 0 for an empty slice.
pub fn std_dev(values: &[f32]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|&v| (v as f64 - m).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

/// Column means of a `frames x n` matrix, zeros when there are no frames.
pub fn column_means(matrix: &Array2<f32>) -> Vec<f64> {
    if matrix.nrows() == 0 {
        return vec![0.0; matrix.ncols()];
    }
    matrix
        .axis_iter(Axis(1))
        .map(|col| col.iter().map(|&v| v as f64).sum::<f64>() / matrix.nrows() as f64)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_count() {
        let grid = FrameGrid::new(4, 2);
        assert_eq!(grid.n_fft, 4);
        assert_eq!(grid.frame_count(0), 0);
        assert_eq!(grid.frame_count(3), 1);
        assert_eq!(grid.frame_count(4), 1);
        assert_eq!(grid.frame_count(5), 2);
        assert_eq!(grid.frame_count(7), 3);
    }

    #[test]
    fn test_frames_zero_padded() {
        let grid = FrameGrid::new(4, 2);
        let frames = grid.frames(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(frames.dim(), (2, 4));
        assert_eq!(frames.row(1).to_vec(), vec![3.0, 4.0, 5.0, 0.0]);
    }

    #[test]
    fn test_hann_window() {
        let w = hann_window(8);
        assert_eq!(w.len(), 8);
        assert!(w[0].abs() < 1e-6);
        assert!((w[4] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_spectrogram_peak_bin() {
        let sr = 16000;
        let n = 512;
        // 2000 Hz sits exactly on bin 64 for a 512-point FFT
        let samples: Vec<f32> = (0..n)
            .map(|i| (2.0 * PI * 2000.0 * i as f32 / sr as f32).sin())
            .collect();
        let grid = FrameGrid::new(n, n);
        let spec = Spectrogram::compute(&grid.frames(&samples), grid.n_fft, sr).unwrap();

        assert_eq!(spec.n_frames(), 1);
        assert_eq!(spec.n_bins(), 257);
        let row = spec.magnitudes().row(0);
        let peak = row.iter().enumerate().fold((0, 0.0f32), |acc, (i, &m)| if m > acc.1 { (i, m) } else { acc });
        assert_eq!(peak.0, 64);
        assert!((spec.frequencies()[64] - 2000.0).abs() < 1e-3);
    }

    #[test]
    fn test_empty_spectrogram() {
        let grid = FrameGrid::new(368, 184);
        let spec = Spectrogram::compute(&grid.frames(&[]), grid.n_fft, 16000).unwrap();
        assert_eq!(spec.n_frames(), 0);
        assert_eq!(spec.mean_spectrum().len(), 257);
    }

    #[test]
    fn test_stats() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(std_dev(&[]), 0.0);
        assert!((mean(&[1.0, 2.0, 3.0]) - 2.0).abs() < 1e-12);
        assert!((std_dev(&[2.0, 4.0]) - 1.0).abs() < 1e-12);

        let m = Array2::from_shape_vec((2, 2), vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(column_means(&m), vec![2.0, 3.0]);
        assert_eq!(column_means(&Array2::zeros((0, 3))), vec![0.0; 3]);
    }
}
