use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, PoisonError},
};

use cpal::{
    traits::{DeviceTrait, HostTrait, StreamTrait},
    SampleFormat, SampleRate, StreamError, SupportedStreamConfigRange,
};
use tracing::{debug, instrument, warn};

use crate::DEFAULT_SAMPLE_RATE;

use super::{slide_in, Fetcher};

/// Mono samples which the audio callback pushed but nobody fetched yet.
struct SampleBuffer {
    buffer: VecDeque<f32>,
    capacity: usize,
    channels: u16,
}

impl SampleBuffer {
    pub fn new(sample_rate: SampleRate, channels: u16) -> Self {
        // one second of audio
        let capacity = sample_rate.0 as usize;

        Self {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
            channels,
        }
    }

    /// Appends the given interleaved frames as mono samples and drops the oldest
    /// ones if there's not enough space.
    pub fn push(&mut self, data: &[f32]) {
        for frame in data.chunks_exact(self.channels as usize) {
            if self.buffer.len() == self.capacity {
                self.buffer.pop_front();
            }

            self.buffer
                .push_back(frame.iter().sum::<f32>() / self.channels as f32);
        }
    }
}

/// Errors which can occur while creating [crate::fetcher::SystemAudioFetcher].
#[derive(thiserror::Error, Debug)]
pub enum SystemAudioError {
    /// No default input device (microphone) could be found to fetch from.
    #[error("Couldn't retrieve the default input device")]
    NoDefaultDevice,

    /// There's no input device with the given name.
    #[error("There's no input device called '{0}'")]
    DeviceNotFound(String),

    /// The device doesn't offer any input config with `f32` samples.
    #[error("Couldn't retrieve any `f32` config of the input stream of the device.")]
    NoInputConfigs,

    #[error("Couldn't list the input devices: {0}")]
    Devices(#[from] cpal::DevicesError),

    #[error("Couldn't retrieve the supported input configs: {0}")]
    SupportedConfigs(#[from] cpal::SupportedStreamConfigsError),

    #[error("Couldn't build the input stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("Couldn't start the input stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
}

/// Fetcher for an audio input device, usually the microphone.
///
/// It's recommended to use [SystemAudio::default] to create a new instance of this struct.
pub struct SystemAudio {
    sample_buffer: Arc<Mutex<SampleBuffer>>,
    pending: Vec<f32>,
    sample_rate: SampleRate,

    stream: cpal::Stream,
}

impl SystemAudio {
    /// This exposes the API of [cpal] which you can use to use your own [cpal::Device] and [cpal::SupportedStreamConfigRange]
    /// if you want.
    #[instrument(name = "SystemAudio::new", skip_all)]
    pub fn new<E>(
        device: &cpal::Device,
        stream_config_range: &SupportedStreamConfigRange,
        error_callback: E,
    ) -> Result<Box<Self>, SystemAudioError>
    where
        E: FnMut(StreamError) + Send + 'static,
    {
        let stream_config = {
            let supported_stream_config = stream_config_range
                .clone()
                .try_with_sample_rate(DEFAULT_SAMPLE_RATE)
                .unwrap_or_else(|| stream_config_range.clone().with_max_sample_rate());
            supported_stream_config.config()
        };
        let sample_rate = stream_config.sample_rate;

        debug!("Stream config: {:?}", stream_config);

        let sample_buffer = {
            let channels = stream_config.channels;
            let buffer = SampleBuffer::new(sample_rate, channels);
            Arc::new(Mutex::new(buffer))
        };

        let stream = device.build_input_stream(
            &stream_config,
            {
                let buffer = sample_buffer.clone();
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    let mut buf = buffer.lock().unwrap_or_else(PoisonError::into_inner);
                    buf.push(data);
                }
            },
            error_callback,
            None,
        )?;
        stream.play()?;

        Ok(Box::new(Self {
            stream,
            sample_buffer,
            pending: Vec::with_capacity(sample_rate.0 as usize),
            sample_rate,
        }))
    }

    /// Listens to the default input device of the default host.
    ///
    /// This is the recommended function to create an instance of this struct.
    ///
    /// # Args
    /// - `error_callback` will be passed to the
    ///   `error_callback` of [`cpal::traits::DeviceTrait::build_input_stream`].
    pub fn default<E>(error_callback: E) -> Result<Box<Self>, SystemAudioError>
    where
        E: FnMut(StreamError) + Send + 'static,
    {
        let Some(device) = cpal::default_host().default_input_device() else {
            return Err(SystemAudioError::NoDefaultDevice);
        };

        let stream_config = default_input_config(&device)?;

        Self::new(&device, &stream_config, error_callback)
    }

    /// Listens to the input device with the given name.
    pub fn with_device_name<E>(
        device_name: &str,
        error_callback: E,
    ) -> Result<Box<Self>, SystemAudioError>
    where
        E: FnMut(StreamError) + Send + 'static,
    {
        let device = cpal::default_host()
            .input_devices()?
            .find(|device| match device.name() {
                Ok(name) => name == device_name,
                Err(_) => false,
            })
            .ok_or_else(|| SystemAudioError::DeviceNotFound(device_name.to_string()))?;

        let stream_config = default_input_config(&device)?;

        Self::new(&device, &stream_config, error_callback)
    }
}

impl Drop for SystemAudio {
    /// Closes the audio stream before it gets dropped.
    fn drop(&mut self) {
        if let Err(err) = self.stream.pause() {
            warn!("Couldn't pause the input stream: {}", err);
        }
    }
}

impl Fetcher for SystemAudio {
    fn fetch_samples(&mut self, buf: &mut [f32]) {
        // keep the lock short, the audio callback is waiting for it
        {
            let mut sample_buffer = self
                .sample_buffer
                .lock()
                .unwrap_or_else(PoisonError::into_inner);

            self.pending.clear();
            self.pending.extend(sample_buffer.buffer.drain(..));
        }

        slide_in(buf, &self.pending);
    }

    fn sample_rate(&self) -> SampleRate {
        self.sample_rate
    }
}

/// Returns the names of all input devices of the default host which can deliver `f32` samples.
pub fn input_device_names() -> Result<Vec<String>, SystemAudioError> {
    let names = cpal::default_host()
        .input_devices()?
        .filter(|device| match device.supported_input_configs() {
            Ok(mut configs) => configs.any(|config| config.sample_format() == SampleFormat::F32),
            Err(_) => false,
        })
        .filter_map(|device| device.name().ok())
        .collect();

    Ok(names)
}

#[instrument(skip_all)]
fn default_input_config(
    device: &cpal::Device,
) -> Result<SupportedStreamConfigRange, SystemAudioError> {
    let mut matching_configs: Vec<_> = device
        .supported_input_configs()?
        .filter(|config| config.sample_format() == SampleFormat::F32)
        .collect();

    matching_configs.sort_by(|a, b| a.cmp_default_heuristics(b));
    matching_configs
        .into_iter()
        .next()
        .ok_or(SystemAudioError::NoInputConfigs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_buffer_mixes_down_to_mono() {
        let mut buffer = SampleBuffer::new(SampleRate(4), 2);
        buffer.push(&[1., 3., -1., 1.]);

        assert_eq!(buffer.buffer, [2., 0.]);
    }

    #[test]
    fn sample_buffer_drops_oldest_samples() {
        let mut buffer = SampleBuffer::new(SampleRate(3), 1);
        buffer.push(&[1., 2., 3., 4., 5.]);

        assert_eq!(buffer.buffer, [3., 4., 5.]);
    }
}
