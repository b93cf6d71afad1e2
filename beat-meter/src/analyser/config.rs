//! Config of an [Analyser].
//!
//! [Analyser]: crate::analyser::Analyser

/// Smallest allowed FFT size.
pub const MIN_FFT_SIZE: usize = 32;

/// Biggest allowed FFT size.
pub const MAX_FFT_SIZE: usize = 32_768;

/// All validation errors of the [Config].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// Occurs, if [`Config::fft_size`] isn't a power of two within `[MIN_FFT_SIZE, MAX_FFT_SIZE]`.
    ///
    /// # Example
    /// ```rust
    /// use beat_meter::analyser::config::Config;
    ///
    /// let config = Config {
    ///     fft_size: 1000,
    ///     ..Default::default()
    /// };
    ///
    /// // must be a power of two!
    /// assert!(config.validate().is_err());
    /// ```
    #[error("The FFT size must be a power of two between {MIN_FFT_SIZE} and {MAX_FFT_SIZE} but you gave: {0}")]
    InvalidFftSize(usize),

    /// Occurs, if [`Config::smoothing_time_constant`] is outside of `[0, 1]`.
    #[error("The smoothing time constant must be within [0, 1] but you gave: {0}")]
    InvalidSmoothing(f32),
}

/// Configure an [Analyser].
///
/// [Analyser]: crate::analyser::Analyser
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// The amount of samples per FFT. Higher values are slower but more detailed.
    ///
    /// The analyser provides `fft_size / 2` frequency bins.
    pub fft_size: usize,

    /// Averaging of the magnitudes between two analyses.
    ///
    /// - `0.0` means no averaging: fast response, jittery.
    /// - `1.0` means maximum averaging: slow response, smooth.
    pub smoothing_time_constant: f32,
}

impl Config {
    /// Checks if the current config is valid or contains any mistakes.
    ///
    /// See [`ConfigError`] to see all possible errors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fft_size_in_range = (MIN_FFT_SIZE..=MAX_FFT_SIZE).contains(&self.fft_size);
        if !fft_size_in_range || !self.fft_size.is_power_of_two() {
            return Err(ConfigError::InvalidFftSize(self.fft_size));
        }

        if !(0. ..=1.).contains(&self.smoothing_time_constant) {
            return Err(ConfigError::InvalidSmoothing(self.smoothing_time_constant));
        }

        Ok(())
    }

    /// The amount of frequency bins an analyser with this config provides.
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fft_size: 1024,
            smoothing_time_constant: 0.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert_eq!(Config::default().validate(), Ok(()));
        assert_eq!(Config::default().bin_count(), 512);
    }

    #[test]
    fn fft_size_bounds() {
        for fft_size in [0, 16, 1000, 65_536] {
            let config = Config {
                fft_size,
                ..Default::default()
            };

            assert_eq!(
                config.validate(),
                Err(ConfigError::InvalidFftSize(fft_size))
            );
        }

        for fft_size in [MIN_FFT_SIZE, MAX_FFT_SIZE] {
            let config = Config {
                fft_size,
                ..Default::default()
            };
            assert!(config.validate().is_ok());
        }
    }

    #[test]
    fn smoothing_bounds() {
        for smoothing_time_constant in [-0.1, 1.1, f32::NAN] {
            let config = Config {
                smoothing_time_constant,
                ..Default::default()
            };

            assert!(matches!(
                config.validate(),
                Err(ConfigError::InvalidSmoothing(_))
            ));
        }
    }
}
