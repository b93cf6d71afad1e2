//! # Description
//! A crate which listens to an audio source (usually the microphone), detects
//! rhythmic pulses like claps and estimates their tempo.
//!
//! The heart of the crate is the [IntervalMeter]: it turns the raw "threshold exceeded"
//! signals of every frame into discrete pulses and averages the time between them.
//! The rest feeds it: a [fetcher](crate::fetcher) provides the samples, the
//! [Analyser](crate::analyser::Analyser) computes the frequency data and a
//! [Detection](crate::detector::Detection) decides if a frame contains a pulse.
//!
//! ### [cpal]
//!
//! This crate also re-exports [cpal] so there's no need to add [cpal] exclusively
//! to your dependency list.
//!
//! # Example
//!
//! ## Only the meter
//! ```
//! use std::num::NonZeroUsize;
//! use beat_meter::{bpm, IntervalMeter};
//!
//! // measure over the last 5 pulses, a pulse lasts about 200ms
//! let mut meter = IntervalMeter::with(NonZeroUsize::new(5).unwrap(), 200.);
//!
//! assert!(meter.pulse(0.));
//! // still the same clap
//! assert!(!meter.pulse(16.));
//! assert!(meter.pulse(500.));
//!
//! let interval = meter.calculate(500.).unwrap();
//! assert_eq!(bpm(interval), Some(120.));
//! ```
//!
//! ## A whole session
//! ```
//! use beat_meter::{fetcher::DummyFetcher, Session, SessionConfig, Timer};
//!
//! let mut session = Session::new(DummyFetcher::new(), SessionConfig::default()).unwrap();
//! let mut refresh = Timer::new(300.);
//!
//! for frame in 0..10 {
//!     let now = frame as f64 * 16.;
//!
//!     let report = session.on_frame(now);
//!     assert!(!report.pulsed);
//!
//!     if refresh.is_due(now) {
//!         let readout = session.on_tick(now);
//!         assert_eq!(readout.bpm, 0);
//!     }
//! }
//! ```
pub mod analyser;
pub mod detector;
pub mod display;
pub mod fetcher;
pub mod meter;

mod session;
mod timer;

pub use cpal;
pub use meter::{bpm, IntervalMeter, MeterConfig, PulseSample};
pub use session::{FrameReport, Readout, Session, SessionConfig, SessionError};
pub use timer::Timer;

use cpal::SampleRate;

/// Milliseconds of a monotonic clock.
pub type Millis = f64;

/// The default sample rate for a fetcher.
/// Fetchers are allowed to use this for orientation.
pub const DEFAULT_SAMPLE_RATE: SampleRate = SampleRate(44_100);
