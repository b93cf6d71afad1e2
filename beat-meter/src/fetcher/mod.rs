//! Each struct here can be used to fetch the audio data from various sources.
//! Pick the one you need to fetch from.
mod dummy;
mod signal;
mod system_audio;

use cpal::SampleRate;
pub use dummy::DummyFetcher;
pub use signal::SignalFetcher;
pub use system_audio::{input_device_names, SystemAudio as SystemAudioFetcher, SystemAudioError};

/// Interface for all structs (fetchers) which are listed in the [fetcher module](crate::fetcher).
pub trait Fetcher {
    /// Moves the newest (mono) samples of the fetcher into the end of `buf`.
    ///
    /// `buf` is a sliding window in chronological order: the content is shifted
    /// to the left by the amount of new samples, so the newest sample is always
    /// the last one.
    fn fetch_samples(&mut self, buf: &mut [f32]);

    fn sample_rate(&self) -> SampleRate;
}

/// Shifts `buf` to the left and appends the newest samples of `new_samples`.
pub(crate) fn slide_in(buf: &mut [f32], new_samples: &[f32]) {
    let buf_len = buf.len();
    let amount = buf_len.min(new_samples.len());

    buf.copy_within(amount.., 0);
    buf[buf_len - amount..].copy_from_slice(&new_samples[new_samples.len() - amount..]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slide_in_fewer_samples() {
        let mut buf = [1., 2., 3., 4.];
        slide_in(&mut buf, &[5., 6.]);

        assert_eq!(buf, [3., 4., 5., 6.]);
    }

    #[test]
    fn slide_in_more_samples_than_space() {
        let mut buf = [1., 2., 3.];
        slide_in(&mut buf, &[4., 5., 6., 7., 8.]);

        assert_eq!(buf, [6., 7., 8.]);
    }

    #[test]
    fn slide_in_nothing() {
        let mut buf = [1., 2.];
        slide_in(&mut buf, &[]);

        assert_eq!(buf, [1., 2.]);
    }
}
