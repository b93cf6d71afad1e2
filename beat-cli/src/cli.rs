use std::{num::NonZeroUsize, path::PathBuf};

use beat_meter::{
    analyser,
    detector::{Detection, DEFAULT_BIN, DEFAULT_THRESHOLD_DB},
    MeterConfig, SessionConfig,
};
use clap::{Parser, ValueEnum};

/// Fallback threshold for the waveform based detections.
const DEFAULT_AMPLITUDE_THRESHOLD: f32 = 0.004;

/// How a pulse should be detected.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// A single frequency bin exceeds the threshold (in dB).
    Bin,
    /// Any frequency within `--low-freq` and `--high-freq` exceeds the threshold (in dB).
    Range,
    /// Any sample of the waveform exceeds the threshold.
    Peak,
    /// The average amplitude of the waveform reaches the threshold.
    Sustained,
}

#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Args {
    /// The name of the input device. The default input device is used if not set.
    #[arg(short, long)]
    pub device: Option<String>,

    /// List the names of the available input devices and exit.
    #[arg(long)]
    pub list_devices: bool,

    /// How a pulse should be detected.
    #[arg(short, long, value_enum, default_value_t = Mode::Bin)]
    pub mode: Mode,

    /// The frequency bin which is watched in `bin` mode.
    ///
    /// The default one was found by clapping. It's probably not your sound, so play around with it.
    #[arg(short, long, default_value_t = DEFAULT_BIN)]
    pub bin: usize,

    /// Lower end of the frequency range in Hz for the `range` mode.
    #[arg(long, default_value_t = 3_000.)]
    pub low_freq: f32,

    /// Upper end of the frequency range in Hz for the `range` mode.
    #[arg(long, default_value_t = 15_000.)]
    pub high_freq: f32,

    /// The detection threshold.
    ///
    /// Decibels for `bin` and `range` (default: -80), an amplitude for `peak` and `sustained` (default: 0.004).
    #[arg(short, long, allow_negative_numbers = true)]
    pub threshold: Option<f32>,

    /// The amount of pulses to measure over.
    #[arg(short, long, default_value_t = NonZeroUsize::new(5).unwrap())]
    pub samples: NonZeroUsize,

    /// The expected length of a pulse in milliseconds, to avoid counting the same sound several times.
    ///
    /// Setting this too high means that legit pulses will be ignored.
    #[arg(short, long, default_value_t = 200.)]
    pub lockout: f64,

    /// Stop showing the tempo if there wasn't any pulse for this many milliseconds.
    #[arg(long)]
    pub stale_after: Option<f64>,

    /// How often the tempo is refreshed, in milliseconds.
    #[arg(short, long, default_value_t = 300.)]
    pub refresh: f64,

    /// The FFT size, must be a power of 2 within [32, 32768]. Higher values are slower but more detailed.
    #[arg(long, default_value_t = 1024)]
    pub fft_size: usize,

    /// Averaging of the frequency data, within [0, 1]. 0 is fast but jittery, 1 is slow but smooth.
    #[arg(long, default_value_t = 0.5)]
    pub smoothing: f32,

    /// Where the logs are written to. The terminal is occupied by the UI.
    #[arg(long, default_value = "/tmp/beat-cli.log")]
    pub log_file: PathBuf,
}

impl Args {
    pub fn detection(&self) -> Detection {
        match self.mode {
            Mode::Bin => Detection::Bin {
                bin: self.bin,
                threshold: self.threshold.unwrap_or(DEFAULT_THRESHOLD_DB),
            },
            Mode::Range => Detection::FrequencyRange {
                low_freq: self.low_freq,
                high_freq: self.high_freq,
                threshold: self.threshold.unwrap_or(DEFAULT_THRESHOLD_DB),
            },
            Mode::Peak => Detection::Peak {
                threshold: self.threshold.unwrap_or(DEFAULT_AMPLITUDE_THRESHOLD),
            },
            Mode::Sustained => Detection::Sustained {
                threshold: self.threshold.unwrap_or(DEFAULT_AMPLITUDE_THRESHOLD),
            },
        }
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            analyser: analyser::Config {
                fft_size: self.fft_size,
                smoothing_time_constant: self.smoothing,
            },
            meter: MeterConfig {
                sample_count: self.samples,
                lockout: self.lockout,
                stale_after: self.stale_after,
            },
            detection: self.detection(),
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}
