use std::num::NonZeroUsize;

use beat_meter::{
    analyser,
    cpal::SampleRate,
    detector::Detection,
    fetcher::{Fetcher, SignalFetcher},
    MeterConfig, Session, SessionConfig,
};

const SAMPLE_RATE: SampleRate = SampleRate(48_000);
const FFT_SIZE: usize = 1024;
const FRAME_MS: f64 = 1000. / 60.;
/// Samples per rendered frame at 60 fps.
const CHUNK: usize = 800;

/// A clap every `period_ms`: a short, loud noise-like burst followed by silence.
fn claps(period_ms: usize) -> Vec<f32> {
    let period = SAMPLE_RATE.0 as usize * period_ms / 1000;
    let burst = SAMPLE_RATE.0 as usize / 20;

    let mut signal = vec![0.; period * 4];
    for start in (0..signal.len()).step_by(period) {
        for (i, sample) in signal[start..start + burst].iter_mut().enumerate() {
            // a few sines to fill the spectrum
            let t = i as f32 / SAMPLE_RATE.0 as f32;
            *sample = [700., 3_000., 6_750., 11_000.]
                .iter()
                .map(|freq| 0.2 * (2. * std::f32::consts::PI * freq * t).sin())
                .sum();
        }
    }

    signal
}

fn session(fetcher: Box<dyn Fetcher>) -> Session {
    Session::new(
        fetcher,
        SessionConfig {
            analyser: analyser::Config {
                fft_size: FFT_SIZE,
                smoothing_time_constant: 0.,
            },
            meter: MeterConfig {
                sample_count: NonZeroUsize::new(5).unwrap(),
                lockout: 200.,
                stale_after: None,
            },
            detection: Detection::Peak { threshold: 0.1 },
        },
    )
    .unwrap()
}

#[test]
fn claps_are_measured() {
    let mut session = session(SignalFetcher::new(claps(500), SAMPLE_RATE, CHUNK));

    let mut pulses = 0;
    let mut hits = 0;
    for frame in 0..180 {
        let report = session.on_frame(frame as f64 * FRAME_MS);
        hits += report.hit as usize;
        pulses += report.pulsed as usize;
    }

    // 180 frames equal 3 seconds => 6 claps
    assert_eq!(pulses, 6);
    assert!(hits > pulses, "one clap should last several frames");

    let readout = session.on_tick(180. * FRAME_MS);
    let interval = readout.interval.unwrap();
    assert!((interval - 500.).abs() <= FRAME_MS, "interval: {}", interval);
    assert!((115..=125).contains(&readout.bpm), "bpm: {}", readout.bpm);
}

#[test]
fn reset_forgets_the_tempo() {
    let mut session = session(SignalFetcher::new(claps(500), SAMPLE_RATE, CHUNK));

    for frame in 0..120 {
        session.on_frame(frame as f64 * FRAME_MS);
    }
    assert!(session.on_tick(120. * FRAME_MS).interval.is_some());

    session.reset();
    let readout = session.on_tick(120. * FRAME_MS);
    assert_eq!(readout.interval, None);
    assert_eq!(readout.bpm, 0);
    assert!(session.meter().is_empty());
}

#[test]
fn bin_detection_follows_the_watched_frequency() {
    let tone = SignalFetcher::sine(6_750., 0.5, SAMPLE_RATE);
    let fetcher = SignalFetcher::new(tone, SAMPLE_RATE, CHUNK);

    let mut session = Session::new(fetcher, SessionConfig::default()).unwrap();
    let bin = session.analyser().index_for_frequency(6_750.);
    assert_eq!(bin, 144);

    let report = session.on_frame(0.);
    assert!(report.hit);
    assert!(report.pulsed);
    assert!(report.level_db > -80.);
    assert!(report.drift > 0.);

    // the tone keeps going, but it's still the same pulse
    let report = session.on_frame(FRAME_MS);
    assert!(report.hit);
    assert!(!report.pulsed);
}
