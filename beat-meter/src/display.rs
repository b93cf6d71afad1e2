//! Maps the measured tempo to what's shown on screen.
//!
//! Everything here is a pure function of its input, except [Drift] which
//! keeps the floating position between frames.
use crate::{bpm, Millis};

/// The fastest interval which is expected. Used to normalize the speed.
pub const FASTEST_INTERVAL_MS: Millis = 300.;

/// Above this BPM the balloon stops following the tempo.
pub const BPM_CEILING: u32 = 270;

/// The BPM which maps to the full height.
const BPM_FULL_HEIGHT: f64 = 300.;

/// Decibels which map to a drift level of zero.
const DB_RANGE: f32 = 120.;

/// How much a fully loud frame pushes the drift.
const DRIFT_GAIN: f64 = 1. / 30.;

/// How much the drift floats back each frame.
const DRIFT_DECAY: f64 = 0.99;

/// A color in the HSL color space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    /// Hue in degrees, `[0, 360]`.
    pub hue: f64,
    /// Saturation in percent.
    pub saturation: f64,
    /// Lightness in percent.
    pub lightness: f64,
}

impl Hsl {
    /// Converts the color into RGB.
    pub fn to_rgb(self) -> (u8, u8, u8) {
        let s = (self.saturation / 100.).clamp(0., 1.);
        let l = (self.lightness / 100.).clamp(0., 1.);
        let h = self.hue.rem_euclid(360.) / 60.;

        let chroma = (1. - (2. * l - 1.).abs()) * s;
        let x = chroma * (1. - (h % 2. - 1.).abs());
        let m = l - chroma / 2.;

        let (r, g, b) = match h as u8 {
            0 => (chroma, x, 0.),
            1 => (x, chroma, 0.),
            2 => (0., chroma, x),
            3 => (0., x, chroma),
            4 => (x, 0., chroma),
            _ => (chroma, 0., x),
        };

        let to_u8 = |val: f64| ((val + m) * 255.).round() as u8;
        (to_u8(r), to_u8(g), to_u8(b))
    }
}

impl std::fmt::Display for Hsl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "hsl({}, {}%, {}%)",
            self.hue, self.saturation, self.lightness
        )
    }
}

/// How fast the pulses are compared to [FASTEST_INTERVAL_MS], within `[0, 1]`.
///
/// No data counts as standing still.
pub fn speed_ratio(interval: Option<Millis>) -> f64 {
    match interval {
        Some(interval) if interval > 0. => (FASTEST_INTERVAL_MS / interval).clamp(0., 1.),
        Some(_) => 1.,
        None => 0.,
    }
}

/// The background color for the given speed ratio.
pub fn color(ratio: f64) -> Hsl {
    let ratio = ratio.clamp(0., 1.);

    Hsl {
        hue: ratio * 360.,
        saturation: 100.,
        lightness: ratio * 80.,
    }
}

/// The BPM as shown in the readout: truncated, and `0` if there's no data.
pub fn whole_bpm(interval: Option<Millis>) -> u32 {
    interval.and_then(bpm).map(|bpm| bpm as u32).unwrap_or(0)
}

/// The distance of the balloon from the bottom for the given BPM.
///
/// Grows linearly with the BPM and stays at the height of [BPM_CEILING] above it.
pub fn vertical_offset(bpm: u32, height: f64) -> f64 {
    height / BPM_FULL_HEIGHT * bpm.min(BPM_CEILING) as f64
}

/// The distance of the balloon from the left for the given drift.
pub fn horizontal_offset(drift: f64, width: f64, object_width: f64) -> f64 {
    (width - object_width).max(0.) * drift.clamp(0., 1.)
}

/// A position within `[0, 1]` which is pushed by loud frames and slowly floats back on its own.
///
/// Pushing it is deliberately slow: it should feel like the sound affects the
/// position instead of controlling it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Drift {
    position: f64,
}

impl Drift {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances the drift by one frame with the level of the watched bin (in dB).
    pub fn update(&mut self, level_db: f32) -> f64 {
        let push = level(level_db) as f64 * DRIFT_GAIN;

        self.position = ((self.position + push) * DRIFT_DECAY).clamp(0., 1.);
        self.position
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn reset(&mut self) {
        self.position = 0.;
    }
}

/// Maps decibels to `[0, 1]`: `0 dB` is `1`, `-120 dB` and below (or silence) is `0`.
fn level(level_db: f32) -> f32 {
    (1. - (level_db / DB_RANGE).abs()).max(0.).min(1.)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_is_clamped() {
        assert_eq!(speed_ratio(Some(600.)), 0.5);
        assert_eq!(speed_ratio(Some(300.)), 1.);
        assert_eq!(speed_ratio(Some(100.)), 1.);
        assert_eq!(speed_ratio(Some(0.)), 1.);
        assert_eq!(speed_ratio(None), 0.);
    }

    #[test]
    fn color_mapping() {
        assert_eq!(
            color(0.5),
            Hsl {
                hue: 180.,
                saturation: 100.,
                lightness: 40.
            }
        );
        assert_eq!(color(2.), color(1.));
        assert_eq!(color(0.).to_rgb(), (0, 0, 0));
    }

    #[test]
    fn hsl_to_rgb() {
        let rgb = |hue, lightness| {
            Hsl {
                hue,
                saturation: 100.,
                lightness,
            }
            .to_rgb()
        };

        assert_eq!(rgb(0., 50.), (255, 0, 0));
        assert_eq!(rgb(120., 50.), (0, 255, 0));
        assert_eq!(rgb(240., 50.), (0, 0, 255));
        assert_eq!(rgb(360., 50.), (255, 0, 0));
        assert_eq!(rgb(60., 100.), (255, 255, 255));
    }

    #[test]
    fn hsl_as_css() {
        assert_eq!(color(0.5).to_string(), "hsl(180, 100%, 40%)");
    }

    #[test]
    fn readout_bpm() {
        assert_eq!(whole_bpm(Some(500.)), 120);
        assert_eq!(whole_bpm(Some(700.)), 85);
        assert_eq!(whole_bpm(None), 0);
    }

    #[test]
    fn vertical_offset_follows_bpm_up_to_the_ceiling() {
        assert_eq!(vertical_offset(0, 300.), 0.);
        assert_eq!(vertical_offset(120, 300.), 120.);
        assert_eq!(vertical_offset(270, 300.), 270.);
        assert_eq!(vertical_offset(400, 300.), 270.);
    }

    #[test]
    fn horizontal_offset_stays_within_the_width() {
        assert_eq!(horizontal_offset(0.5, 110., 10.), 50.);
        assert_eq!(horizontal_offset(2., 110., 10.), 100.);
        assert_eq!(horizontal_offset(1., 5., 10.), 0.);
    }

    #[test]
    fn levels() {
        assert_eq!(level(0.), 1.);
        assert_eq!(level(-60.), 0.5);
        assert_eq!(level(-200.), 0.);
        assert_eq!(level(f32::NEG_INFINITY), 0.);
        assert_eq!(level(f32::NAN), 0.);
    }

    #[test]
    fn drift_rises_with_sound_and_falls_back() {
        let mut drift = Drift::new();

        let mut prev = 0.;
        for _ in 0..10 {
            let curr = drift.update(0.);
            assert!(curr > prev);
            prev = curr;
        }

        for _ in 0..10 {
            let curr = drift.update(f32::NEG_INFINITY);
            assert!(curr < prev);
            prev = curr;
        }
    }

    #[test]
    fn drift_stays_within_bounds() {
        let mut drift = Drift::new();

        for _ in 0..10_000 {
            let position = drift.update(0.);
            assert!((0. ..=1.).contains(&position));
        }

        // the decay balances the push below the upper bound
        let limit = DRIFT_GAIN * DRIFT_DECAY / (1. - DRIFT_DECAY);
        assert!((drift.position() - limit.min(1.)).abs() < 1e-6);

        drift.reset();
        assert_eq!(drift.position(), 0.);
    }
}
