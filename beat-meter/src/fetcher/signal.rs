use cpal::SampleRate;

use super::{slide_in, Fetcher};

/// Replays a given signal in a loop.
///
/// Each call to [Fetcher::fetch_samples] hands out the next `chunk_size` samples,
/// like an audio device delivering a new batch for each rendered frame.
/// Useful for tests and for trying out thresholds without a microphone.
pub struct SignalFetcher {
    signal: Box<[f32]>,
    chunk: Vec<f32>,
    chunk_size: usize,
    position: usize,
    sample_rate: SampleRate,
}

impl SignalFetcher {
    /// Creates a new fetcher which replays `signal` in chunks of `chunk_size`.
    pub fn new(signal: Vec<f32>, sample_rate: SampleRate, chunk_size: usize) -> Box<Self> {
        Box::new(Self {
            signal: signal.into_boxed_slice(),
            chunk: Vec::with_capacity(chunk_size),
            chunk_size,
            position: 0,
            sample_rate,
        })
    }

    /// Creates a sine signal with the given frequency and amplitude which lasts one second.
    pub fn sine(freq: f32, amplitude: f32, sample_rate: SampleRate) -> Vec<f32> {
        (0..sample_rate.0)
            .map(|i| {
                let t = i as f32 / sample_rate.0 as f32;
                amplitude * (2. * std::f32::consts::PI * freq * t).sin()
            })
            .collect()
    }
}

impl Fetcher for SignalFetcher {
    fn fetch_samples(&mut self, buf: &mut [f32]) {
        if self.signal.is_empty() {
            return;
        }

        self.chunk.clear();
        for _ in 0..self.chunk_size {
            self.chunk.push(self.signal[self.position]);
            self.position = (self.position + 1) % self.signal.len();
        }

        slide_in(buf, &self.chunk);
    }

    fn sample_rate(&self) -> SampleRate {
        self.sample_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replays_in_a_loop() {
        let mut fetcher = SignalFetcher::new(vec![1., 2., 3.], SampleRate(3), 2);
        let mut buf = [0.; 4];

        fetcher.fetch_samples(&mut buf);
        assert_eq!(buf, [0., 0., 1., 2.]);

        fetcher.fetch_samples(&mut buf);
        assert_eq!(buf, [1., 2., 3., 1.]);
    }

    #[test]
    fn empty_signal_leaves_buffer_untouched() {
        let mut fetcher = SignalFetcher::new(Vec::new(), SampleRate(3), 2);
        let mut buf = [4.; 2];

        fetcher.fetch_samples(&mut buf);
        assert_eq!(buf, [4., 4.]);
    }
}
