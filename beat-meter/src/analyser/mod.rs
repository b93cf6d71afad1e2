//! Spectrum analysis of the fetched samples.
//!
//! The [Analyser] behaves like the analyser node of a browser's audio graph:
//! Blackman window, per-bin magnitude smoothing over time and the result in decibels.
pub mod config;

use std::sync::Arc;

use cpal::SampleRate;
use realfft::{num_complex::Complex32, RealFftPlanner, RealToComplex};
use tracing::{debug, instrument, warn};

pub use config::{Config, ConfigError};

use crate::fetcher::Fetcher;

/// Computes the frequency data of the samples of a fetcher.
pub struct Analyser {
    fft: Arc<dyn RealToComplex<f32>>,
    blackman_window: Box<[f32]>,

    time_domain: Box<[f32]>,
    fft_in: Box<[f32]>,
    fft_out: Box<[Complex32]>,
    scratch_buffer: Box<[Complex32]>,

    smoothed_magnitudes: Box<[f32]>,
    decibels: Box<[f32]>,

    config: Config,
    fetcher: Box<dyn Fetcher>,
}

impl Analyser {
    /// Creates a new instance with the given fetcher where the audio samples are fetched from.
    #[instrument(name = "Analyser::new", skip(fetcher))]
    pub fn new(fetcher: Box<dyn Fetcher>, config: Config) -> Result<Self, ConfigError> {
        config.validate()?;

        let fft_size = config.fft_size;
        let bin_count = config.bin_count();

        let fft = RealFftPlanner::<f32>::new().plan_fft_forward(fft_size);

        let blackman_window = apodize::blackman_iter(fft_size)
            .map(|val| val as f32)
            .collect::<Vec<f32>>()
            .into_boxed_slice();

        let fft_out = fft.make_output_vec().into_boxed_slice();
        let scratch_buffer = fft.make_scratch_vec().into_boxed_slice();

        debug!(
            "Sample rate: {} Hz, bin width: {} Hz",
            fetcher.sample_rate().0,
            fetcher.sample_rate().0 as f32 / fft_size as f32
        );

        Ok(Self {
            fft,
            blackman_window,

            time_domain: vec![0.; fft_size].into_boxed_slice(),
            fft_in: vec![0.; fft_size].into_boxed_slice(),
            fft_out,
            scratch_buffer,

            smoothed_magnitudes: vec![0.; bin_count].into_boxed_slice(),
            decibels: vec![f32::NEG_INFINITY; bin_count].into_boxed_slice(),

            config,
            fetcher,
        })
    }

    /// Takes the newest samples of the fetcher and updates the frequency data.
    pub fn process_next_samples(&mut self) {
        self.fetcher.fetch_samples(&mut self.time_domain);

        for ((fft_in, &sample), &weight) in self
            .fft_in
            .iter_mut()
            .zip(self.time_domain.iter())
            .zip(self.blackman_window.iter())
        {
            *fft_in = sample * weight;
        }

        if let Err(err) = self.fft.process_with_scratch(
            &mut self.fft_in,
            &mut self.fft_out,
            &mut self.scratch_buffer,
        ) {
            warn!("Couldn't compute the FFT: {}", err);
            return;
        }

        let tau = self.config.smoothing_time_constant;
        let normalize = 1. / self.config.fft_size as f32;
        for ((smoothed, decibel), bin) in self
            .smoothed_magnitudes
            .iter_mut()
            .zip(self.decibels.iter_mut())
            .zip(self.fft_out.iter())
        {
            let magnitude = bin.norm() * normalize;
            *smoothed = tau * *smoothed + (1. - tau) * magnitude;
            *decibel = to_decibels(*smoothed);
        }
    }

    /// The smoothed magnitude of each bin in decibels.
    ///
    /// Silent bins are `f32::NEG_INFINITY`.
    pub fn frequency_data(&self) -> &[f32] {
        &self.decibels
    }

    /// The latest `fft_size` samples, oldest first.
    pub fn time_domain_data(&self) -> &[f32] {
        &self.time_domain
    }

    /// Returns the index of the bin which contains the given frequency.
    ///
    /// Frequencies above the nyquist frequency map to [Analyser::bin_count].
    pub fn index_for_frequency(&self, freq: f32) -> usize {
        index_for_frequency(freq, self.sample_rate(), self.bin_count())
    }

    pub fn bin_count(&self) -> usize {
        self.config.bin_count()
    }

    pub fn sample_rate(&self) -> SampleRate {
        self.fetcher.sample_rate()
    }

    /// Returns its config.
    pub fn config(&self) -> &Config {
        &self.config
    }
}

fn to_decibels(magnitude: f32) -> f32 {
    if magnitude > 0. {
        20. * magnitude.log10()
    } else {
        f32::NEG_INFINITY
    }
}

fn index_for_frequency(freq: f32, sample_rate: SampleRate, bin_count: usize) -> usize {
    let nyquist = sample_rate.0 as f32 / 2.;
    let index = (freq.max(0.) / nyquist * bin_count as f32).round() as usize;

    index.min(bin_count)
}
