//! The pulse/interval meter.
//!
//! [IntervalMeter] turns a noisy stream of "threshold exceeded" signals (one per
//! rendered frame while a sound lasts) into discrete pulses and reports the
//! average time between the most recent ones.
use std::{collections::VecDeque, num::NonZeroUsize};

use tracing::{debug, trace};

use crate::Millis;

/// Milliseconds per minute, used to convert an interval into beats per minute.
const MS_PER_MINUTE: f64 = 60_000.;

/// Validation errors of a [MeterConfig].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// The lockout window has to be a non-negative, finite amount of milliseconds.
    #[error("The lockout window must be a non-negative amount of milliseconds but you gave: {0}")]
    NegativeLockout(Millis),

    /// The staleness timeout has to be a positive, finite amount of milliseconds.
    #[error("The staleness timeout must be a positive amount of milliseconds but you gave: {0}")]
    InvalidStaleAfter(Millis),
}

/// Configure an [IntervalMeter].
#[derive(Debug, Clone, PartialEq)]
pub struct MeterConfig {
    /// How many of the most recent pulses are used for the average.
    pub sample_count: NonZeroUsize,

    /// The expected length of a single pulse in milliseconds.
    ///
    /// Signals arriving within this window after an accepted pulse are treated as
    /// part of the same sound. Setting this too high means legit pulses get ignored.
    pub lockout: Millis,

    /// If set, [IntervalMeter::calculate] reports no data once the last accepted
    /// pulse is older than this many milliseconds.
    ///
    /// `None` keeps reporting the last known average forever.
    pub stale_after: Option<Millis>,
}

impl MeterConfig {
    /// Checks if the current config is valid.
    ///
    /// See [ConfigError] for all possible errors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.lockout.is_finite() && self.lockout >= 0.) {
            return Err(ConfigError::NegativeLockout(self.lockout));
        }

        if let Some(stale_after) = self.stale_after {
            if !(stale_after.is_finite() && stale_after > 0.) {
                return Err(ConfigError::InvalidStaleAfter(stale_after));
            }
        }

        Ok(())
    }
}

impl Default for MeterConfig {
    fn default() -> Self {
        Self {
            sample_count: NonZeroUsize::new(5).unwrap(),
            lockout: 200.,
            stale_after: None,
        }
    }
}

/// A single accepted pulse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PulseSample {
    /// Monotonic time in milliseconds at which the pulse was accepted.
    pub timestamp: Millis,
}

/// Tracks discrete pulses over a rolling window and computes the average interval
/// between them.
///
/// # Example
/// ```
/// use std::num::NonZeroUsize;
/// use beat_meter::{bpm, IntervalMeter};
///
/// let mut meter = IntervalMeter::with(NonZeroUsize::new(4).unwrap(), 200.);
/// for now in [0., 500., 1000., 1500.] {
///     assert!(meter.pulse(now));
/// }
///
/// let interval = meter.calculate(1500.).unwrap();
/// assert_eq!(interval, 500.);
/// assert_eq!(bpm(interval), Some(120.));
/// ```
#[derive(Debug, Clone)]
pub struct IntervalMeter {
    history: VecDeque<PulseSample>,
    last_accepted: Option<Millis>,

    config: MeterConfig,
}

impl IntervalMeter {
    /// Creates a new meter from the given config.
    pub fn new(config: MeterConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        debug!("{:?}", config);

        Ok(Self {
            history: VecDeque::with_capacity(config.sample_count.get()),
            last_accepted: None,
            config,
        })
    }

    /// Shorthand for a meter without a staleness timeout.
    ///
    /// **Panics** if `lockout` is negative or not finite.
    pub fn with(sample_count: NonZeroUsize, lockout: Millis) -> Self {
        Self::new(MeterConfig {
            sample_count,
            lockout,
            stale_after: None,
        })
        .expect("Lockout must be a non-negative amount of milliseconds")
    }

    /// Registers a pulse signal at `now`.
    ///
    /// Returns `true` if the pulse got recorded and `false` if it seems to be part
    /// of an already noted pulse (it arrived within the lockout window).
    ///
    /// `now` must not decrease between calls. The behaviour for a clock going
    /// backwards is unspecified.
    pub fn pulse(&mut self, now: Millis) -> bool {
        if let Some(last) = self.last_accepted {
            debug_assert!(now >= last, "`now` ({now}) went back in time (last: {last})");

            if now - last < self.config.lockout {
                return false;
            }
        }

        if self.history.len() == self.config.sample_count.get() {
            self.history.pop_front();
        }
        self.history.push_back(PulseSample { timestamp: now });
        self.last_accepted = Some(now);

        trace!("Pulse at {now} ms");
        true
    }

    /// Returns the average interval between the recorded pulses in milliseconds.
    ///
    /// `None` means there's no data yet: less than two pulses were recorded, or
    /// (with [MeterConfig::stale_after] set) the last pulse is too old.
    pub fn calculate(&self, now: Millis) -> Option<Millis> {
        if self.history.len() < 2 {
            return None;
        }

        if let (Some(stale_after), Some(last)) = (self.config.stale_after, self.last_accepted) {
            if now - last > stale_after {
                return None;
            }
        }

        let first = self.history.front()?.timestamp;
        let last = self.history.back()?.timestamp;

        Some((last - first) / (self.history.len() - 1) as f64)
    }

    /// Forgets all recorded pulses and the lockout state.
    pub fn reset(&mut self) {
        self.history.clear();
        self.last_accepted = None;
    }

    /// The timestamps of the recorded pulses, oldest first.
    pub fn history(&self) -> impl Iterator<Item = Millis> + '_ {
        self.history.iter().map(|sample| sample.timestamp)
    }

    /// The timestamp of the last accepted pulse.
    pub fn last_accepted(&self) -> Option<Millis> {
        self.last_accepted
    }

    /// Amount of recorded pulses.
    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Returns its config.
    pub fn config(&self) -> &MeterConfig {
        &self.config
    }
}

/// Converts an average interval in milliseconds into beats per minute.
///
/// Only defined for positive intervals.
pub fn bpm(interval: Millis) -> Option<f64> {
    (interval > 0.).then(|| MS_PER_MINUTE / interval)
}
