//! Decides whether the current audio frame contains a pulse.
//!
//! All strategies are simple thresholds. They are meant to be tuned by hand for
//! the sound you want to detect (a clap, a metronome, ...).
use tracing::trace;

use crate::analyser::Analyser;

/// Default bin for the detection. Found by testing with claps and an FFT size of 1024.
pub const DEFAULT_BIN: usize = 144;

/// Default threshold in decibels of [DEFAULT_BIN].
pub const DEFAULT_THRESHOLD_DB: f32 = -80.;

/// The strategy which decides if there's a pulse.
#[derive(Debug, Clone, PartialEq)]
pub enum Detection {
    /// A single frequency bin exceeds the threshold (in dB).
    Bin { bin: usize, threshold: f32 },

    /// Any bin within the frequency range (in Hz) exceeds the threshold (in dB).
    ///
    /// Note that the FFT size and the smoothing have an averaging effect.
    FrequencyRange {
        low_freq: f32,
        high_freq: f32,
        threshold: f32,
    },

    /// Any sample of the waveform exceeds the threshold, regardless of the frequency.
    ///
    /// Higher FFT sizes are needed to detect shorter pulses.
    Peak { threshold: f32 },

    /// The average amplitude of the waveform reaches the threshold.
    Sustained { threshold: f32 },
}

impl Default for Detection {
    fn default() -> Self {
        Self::Bin {
            bin: DEFAULT_BIN,
            threshold: DEFAULT_THRESHOLD_DB,
        }
    }
}

impl Detection {
    /// Returns `true` if the current data of the analyser contains a pulse.
    pub fn is_hit(&self, analyser: &Analyser) -> bool {
        match *self {
            Self::Bin { bin, threshold } => {
                threshold_bin(analyser.frequency_data(), bin, threshold)
            }
            Self::FrequencyRange {
                low_freq,
                high_freq,
                threshold,
            } => {
                let low = analyser.index_for_frequency(low_freq);
                let high = analyser.index_for_frequency(high_freq);

                threshold_frequency(analyser.frequency_data(), low..high, threshold)
            }
            Self::Peak { threshold } => threshold_peak(analyser.time_domain_data(), threshold),
            Self::Sustained { threshold } => {
                threshold_sustained(analyser.time_domain_data(), threshold)
            }
        }
    }

    /// The bin whose level is reported to the display, if the strategy watches one.
    pub fn watched_bin(&self) -> Option<usize> {
        match self {
            Self::Bin { bin, .. } => Some(*bin),
            _ => None,
        }
    }
}

/// Returns `true` if the level of `bin` is above `threshold`.
///
/// A bin outside of `freq_data` never hits.
pub fn threshold_bin(freq_data: &[f32], bin: usize, threshold: f32) -> bool {
    freq_data.get(bin).is_some_and(|&level| level > threshold)
}

/// Returns `true` if any bin within `bins` is above `threshold`.
pub fn threshold_frequency(freq_data: &[f32], bins: std::ops::Range<usize>, threshold: f32) -> bool {
    let end = bins.end.min(freq_data.len());
    let start = bins.start.min(end);
    let samples = &freq_data[start..end];

    if samples.iter().any(|&level| level > threshold) {
        return true;
    }

    // useful to find a threshold
    let max = samples.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    trace!("Freq max: {}", max);
    false
}

/// Returns `true` if the waveform hits a peak above `threshold` at any point.
pub fn threshold_peak(wave: &[f32], threshold: f32) -> bool {
    wave.iter().any(|sample| sample.abs() > threshold)
}

/// Returns `true` if the average amplitude across the whole waveform reaches `threshold`.
pub fn threshold_sustained(wave: &[f32], threshold: f32) -> bool {
    if wave.is_empty() {
        return false;
    }

    let avg = wave.iter().map(|sample| sample.abs()).sum::<f32>() / wave.len() as f32;
    trace!("Sustained avg: {}", avg);

    avg >= threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bin_threshold() {
        let freq = [-100., -90., -70.];

        assert!(threshold_bin(&freq, 2, -80.));
        assert!(!threshold_bin(&freq, 1, -80.));
        // equal is not above
        assert!(!threshold_bin(&freq, 1, -90.));
        assert!(!threshold_bin(&freq, 3, -200.));
    }

    #[test]
    fn silence_never_hits_a_bin() {
        let freq = [f32::NEG_INFINITY; 4];
        assert!(!threshold_bin(&freq, 0, -200.));
    }

    #[test]
    fn frequency_range_threshold() {
        let freq = [-50., -100., -100., -60., -100.];

        assert!(threshold_frequency(&freq, 1..4, -70.));
        assert!(!threshold_frequency(&freq, 1..3, -70.));
        assert!(!threshold_frequency(&freq, 3..3, -200.));
        // out of bounds ranges get cut
        assert!(threshold_frequency(&freq, 3..100, -70.));
        assert!(!threshold_frequency(&freq, 50..100, -200.));
    }

    #[test]
    fn peak_threshold() {
        assert!(threshold_peak(&[0., 0.001, -0.005], 0.004));
        assert!(!threshold_peak(&[0., 0.001, -0.003], 0.004));
    }

    #[test]
    fn sustained_threshold() {
        assert!(threshold_sustained(&[0.5, -0.5, 0.5, -0.5], 0.5));
        assert!(!threshold_sustained(&[1., 0., 0., 0.], 0.5));
        assert!(!threshold_sustained(&[], 0.));
    }

    #[test]
    fn default_detection() {
        assert_eq!(
            Detection::default(),
            Detection::Bin {
                bin: 144,
                threshold: -80.
            }
        );
        assert_eq!(Detection::default().watched_bin(), Some(144));
        assert_eq!(Detection::Peak { threshold: 0.1 }.watched_bin(), None);
    }
}
