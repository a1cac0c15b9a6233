//! Sample rate conversion

use log::debug;
use crate::audio::Waveform;
use crate::error::Result;

pub struct AudioConverter;

impl AudioConverter {
    /// Convert sample rate using linear interpolation
    pub fn resample(wave: &Waveform, target_sample_rate: u32) -> Result<Waveform> {
        if wave.sample_rate() == target_sample_rate || wave.is_empty() {
            return Waveform::new(wave.samples().to_vec(), target_sample_rate);
        }

        let ratio = target_sample_rate as f64 / wave.sample_rate() as f64;
        let new_length = ((wave.len() as f64 * ratio) as usize).max(1);
        let data = wave.samples();
        let last = data.len() - 1;

        let resampled: Vec<f32> = (0..new_length)
            .map(|i| {
                let old_pos = i as f64 / ratio;
                let old_index = old_pos.floor() as usize;
                let fraction = (old_pos - old_index as f64) as f32;

                if old_index >= last {
                    data[last]
                } else {
                    data[old_index] + (data[old_index + 1] - data[old_index]) * fraction
                }
            })
            .collect();

        debug!(
            "Resampled {} Hz -> {} Hz ({} -> {} samples)",
            wave.sample_rate(), target_sample_rate, wave.len(), new_length
        );

        Waveform::new(resampled, target_sample_rate)
    }
}
