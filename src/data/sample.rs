//! Synthetic phonon power spectra generation.
//!
//! Produces a shared frequency axis and one noisy Lorentzian peak per mode,
//! seeded for reproducibility. The ground-truth parameters are returned so
//! demos and tests can compare fitted values against what was generated.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use nalgebra::DMatrix;

use crate::domain::{DatasetStats, PeakParams, SampleConfig, SpectrumData};
use crate::error::AppError;
use crate::models::lorentzian;

#[derive(Debug, Clone)]
pub struct SampleData {
    pub data: SpectrumData,
    /// Ground-truth parameters, one per mode (column).
    pub truth: Vec<PeakParams>,
    pub stats: DatasetStats,
}

pub fn generate_spectra(config: &SampleConfig) -> Result<SampleData, AppError> {
    if config.modes == 0 {
        return Err(AppError::new(2, "Mode count must be > 0."));
    }
    if config.samples < 5 {
        return Err(AppError::new(
            2,
            "Sample count must be at least 5 (need more samples than fit parameters).",
        ));
    }
    if !(config.freq_min.is_finite() && config.freq_max.is_finite() && config.freq_max > config.freq_min) {
        return Err(AppError::new(2, "Invalid frequency range for sample generation."));
    }
    if !config.noise.is_finite() || config.noise < 0.0 {
        return Err(AppError::new(2, "Noise level must be finite and >= 0."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::new(4, format!("Failed to build the noise distribution: {e}")))?;

    let span = config.freq_max - config.freq_min;
    let n = config.samples;
    let m = config.modes;

    let mut frequencies = Vec::with_capacity(n);
    for i in 0..n {
        let u = i as f64 / (n as f64 - 1.0);
        frequencies.push(config.freq_min + u * span);
    }

    // Spread the peaks evenly across the axis interior, with a small jitter
    // that keeps each center inside its own slot.
    let mut truth = Vec::with_capacity(m);
    for i in 0..m {
        let slot = span / (m as f64 + 1.0);
        let base = config.freq_min + slot * (i as f64 + 1.0);
        let jitter = rng.gen_range(-0.25 * slot..=0.25 * slot);

        let center = base + jitter;
        let hwhm = span * rng.gen_range(0.01..=0.04);
        let amplitude = rng.gen_range(0.5..=2.0);
        let offset = rng.gen_range(0.0..=0.05);

        truth.push(PeakParams::new(center, hwhm, amplitude, offset));
    }

    let mut columns: Vec<Vec<f64>> = Vec::with_capacity(m);
    for params in &truth {
        // Noise scales with the mode's clean peak height so every mode gets a
        // comparable signal-to-noise ratio.
        let peak_height = params.amplitude / (std::f64::consts::PI * params.hwhm);
        let sigma = config.noise * peak_height;

        let mut column = Vec::with_capacity(n);
        for &x in &frequencies {
            let z: f64 = normal.sample(&mut rng);
            column.push(lorentzian(x, params) + sigma * z);
        }
        columns.push(column);
    }

    let matrix = DMatrix::from_fn(n, m, |r, c| columns[c][r]);

    let data = SpectrumData {
        frequencies,
        matrix,
        source: format!("synthetic (seed {})", config.seed),
    };
    let stats = data.stats();

    Ok(SampleData { data, truth, stats })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::lorentzian_curve;

    #[test]
    fn generation_is_deterministic_for_a_seed() {
        let config = SampleConfig::default();
        let a = generate_spectra(&config).unwrap();
        let b = generate_spectra(&config).unwrap();

        assert_eq!(a.data.frequencies, b.data.frequencies);
        assert_eq!(a.data.matrix, b.data.matrix);
        assert_eq!(a.truth.len(), b.truth.len());
        for (pa, pb) in a.truth.iter().zip(&b.truth) {
            assert_eq!(pa, pb);
        }
    }

    #[test]
    fn truth_peaks_lie_inside_the_axis() {
        let config = SampleConfig {
            modes: 6,
            ..SampleConfig::default()
        };
        let sample = generate_spectra(&config).unwrap();

        assert_eq!(sample.truth.len(), 6);
        for p in &sample.truth {
            assert!(p.center > config.freq_min && p.center < config.freq_max);
            assert!(p.hwhm > 0.0);
            assert!(p.amplitude > 0.0);
            assert!(p.offset >= 0.0);
        }
    }

    #[test]
    fn zero_noise_matches_the_analytic_lineshape() {
        let config = SampleConfig {
            noise: 0.0,
            modes: 2,
            samples: 50,
            ..SampleConfig::default()
        };
        let sample = generate_spectra(&config).unwrap();

        for (i, params) in sample.truth.iter().enumerate() {
            let expected = lorentzian_curve(&sample.data.frequencies, params);
            for (r, &want) in expected.iter().enumerate() {
                assert_eq!(sample.data.matrix[(r, i)], want);
            }
        }
    }

    #[test]
    fn invalid_configs_are_rejected() {
        let no_modes = SampleConfig {
            modes: 0,
            ..SampleConfig::default()
        };
        assert_eq!(generate_spectra(&no_modes).unwrap_err().exit_code(), 2);

        let too_few = SampleConfig {
            samples: 3,
            ..SampleConfig::default()
        };
        assert_eq!(generate_spectra(&too_few).unwrap_err().exit_code(), 2);

        let bad_range = SampleConfig {
            freq_min: 5.0,
            freq_max: 5.0,
            ..SampleConfig::default()
        };
        assert_eq!(generate_spectra(&bad_range).unwrap_err().exit_code(), 2);

        let bad_noise = SampleConfig {
            noise: -0.5,
            ..SampleConfig::default()
        };
        assert_eq!(generate_spectra(&bad_noise).unwrap_err().exit_code(), 2);
    }
}
