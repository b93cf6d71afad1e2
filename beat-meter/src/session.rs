//! Bundles everything which is needed while listening.
//!
//! A [Session] is driven by two independent tasks which both run on the same thread:
//!
//! - [Session::on_frame] once per rendered frame: analyse the newest samples and
//!   record a pulse if the threshold is exceeded.
//! - [Session::on_tick] once per refresh period: compute the tempo and how to show it.
use tracing::{debug, instrument, warn};

use crate::{
    analyser::{self, Analyser},
    detector::Detection,
    display::{self, Drift, Hsl},
    fetcher::{Fetcher, SystemAudioError},
    meter::{self, IntervalMeter, MeterConfig},
    Millis,
};

/// Errors which can occur while setting up a [Session].
#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Audio(#[from] SystemAudioError),

    #[error(transparent)]
    Analyser(#[from] analyser::ConfigError),

    #[error(transparent)]
    Meter(#[from] meter::ConfigError),
}

/// The config options for a [Session].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionConfig {
    pub analyser: analyser::Config,
    pub meter: MeterConfig,
    pub detection: Detection,
}

/// What happened within a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    /// The detection threshold got exceeded.
    pub hit: bool,

    /// The hit got recorded as a new pulse (it wasn't part of the previous one).
    pub pulsed: bool,

    /// The level of the watched bin in dB (or the loudest bin, if the detection
    /// doesn't watch a single one).
    pub level_db: f32,

    /// The drift position, within `[0, 1]`.
    pub drift: f64,
}

/// What should be shown after a refresh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Readout {
    /// The average interval between the pulses in milliseconds.
    pub interval: Option<Millis>,

    /// The truncated BPM, `0` if there's no data.
    pub bpm: u32,

    /// How fast the pulses are, within `[0, 1]`.
    pub ratio: f64,

    /// The background color.
    pub color: Hsl,
}

/// The state of one capture session.
pub struct Session {
    analyser: Analyser,
    detection: Detection,
    meter: IntervalMeter,
    drift: Drift,
}

impl Session {
    /// Creates a new session which listens to the given fetcher.
    #[instrument(name = "Session::new", skip(fetcher))]
    pub fn new(fetcher: Box<dyn Fetcher>, config: SessionConfig) -> Result<Self, SessionError> {
        let SessionConfig {
            analyser,
            meter,
            detection,
        } = config;

        let analyser = Analyser::new(fetcher, analyser)?;
        let meter = IntervalMeter::new(meter)?;

        if let Some(bin) = detection.watched_bin() {
            if bin >= analyser.bin_count() {
                warn!(
                    "Bin {} is out of range (only {} bins), it will never hit",
                    bin,
                    analyser.bin_count()
                );
            }
        }

        Ok(Self {
            analyser,
            detection,
            meter,
            drift: Drift::new(),
        })
    }

    /// The per-frame task.
    pub fn on_frame(&mut self, now: Millis) -> FrameReport {
        self.analyser.process_next_samples();

        let hit = self.detection.is_hit(&self.analyser);
        let pulsed = hit && self.meter.pulse(now);
        if pulsed {
            debug!("Pulse at {} ms", now);
        }

        let level_db = self.level_db();
        let drift = self.drift.update(level_db);

        FrameReport {
            hit,
            pulsed,
            level_db,
            drift,
        }
    }

    /// The refresh task.
    pub fn on_tick(&self, now: Millis) -> Readout {
        let interval = self.meter.calculate(now);
        let ratio = display::speed_ratio(interval);

        Readout {
            interval,
            bpm: display::whole_bpm(interval),
            ratio,
            color: display::color(ratio),
        }
    }

    /// Forgets all pulses and lets the drift start from the beginning.
    pub fn reset(&mut self) {
        self.meter.reset();
        self.drift.reset();
    }

    pub fn analyser(&self) -> &Analyser {
        &self.analyser
    }

    pub fn meter(&self) -> &IntervalMeter {
        &self.meter
    }

    fn level_db(&self) -> f32 {
        let freq_data = self.analyser.frequency_data();

        match self.detection.watched_bin() {
            Some(bin) => freq_data.get(bin).copied().unwrap_or(f32::NEG_INFINITY),
            None => freq_data.iter().copied().fold(f32::NEG_INFINITY, f32::max),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::fetcher::DummyFetcher;

    use super::*;

    #[test]
    fn silence_never_pulses() {
        let mut session = Session::new(DummyFetcher::new(), SessionConfig::default()).unwrap();

        for frame in 0..60 {
            let report = session.on_frame(frame as f64 * 16.);
            assert!(!report.hit);
            assert!(!report.pulsed);
            assert_eq!(report.drift, 0.);
        }

        let readout = session.on_tick(1000.);
        assert_eq!(readout.interval, None);
        assert_eq!(readout.bpm, 0);
        assert_eq!(readout.ratio, 0.);
    }

    #[test]
    fn invalid_configs_are_reported() {
        let analyser_config = SessionConfig {
            analyser: analyser::Config {
                fft_size: 3,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            Session::new(DummyFetcher::new(), analyser_config),
            Err(SessionError::Analyser(_))
        ));

        let meter_config = SessionConfig {
            meter: MeterConfig {
                lockout: -1.,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            Session::new(DummyFetcher::new(), meter_config),
            Err(SessionError::Meter(_))
        ));
    }
}
