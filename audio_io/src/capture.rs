use crate::SampleSource;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample};
use log::{error, info, trace};
use ringbuf::{HeapConsumer, HeapProducer, HeapRb};
use tone_core::{AudioBuffer, Error};

/// Ring capacity in seconds of mono audio.
const RING_SECONDS: usize = 2;

/// Names of the available input devices.
pub fn list_input_devices() -> Result<Vec<String>, Error> {
    let host = cpal::default_host();
    let devices = host
        .input_devices()
        .map_err(|e| Error::Audio(format!("Failed to get input devices: {}", e)))?;

    Ok(devices.filter_map(|d| d.name().ok()).collect())
}

/// Keeps the cpal input stream alive. Dropping it stops capture.
///
/// The stream itself is not `Send` on every platform, so it stays with the
/// owner while the [`CaptureStream`] half travels to the analysis task.
pub struct MicrophoneCapture {
    stream: cpal::Stream,
    device_name: String,
}

/// Reading half of a microphone capture.
pub struct CaptureStream {
    consumer: HeapConsumer<f32>,
    sample_rate: u32,
}

impl MicrophoneCapture {
    /// Open an input device by name, or the system default when `device_name`
    /// is empty or not found, and start capturing.
    pub fn open(device_name: &str) -> Result<(Self, CaptureStream), Error> {
        let host = cpal::default_host();

        let device = host
            .input_devices()
            .map_err(|e| Error::Audio(format!("Failed to get input devices: {}", e)))?
            .find(|d| !device_name.is_empty() && d.name().map_or(false, |n| n == device_name))
            .or_else(|| host.default_input_device())
            .ok_or_else(|| Error::Audio("No input device found".to_string()))?;

        let name = device.name().unwrap_or_else(|_| "unknown".to_string());

        let supported = device
            .default_input_config()
            .map_err(|e| Error::Audio(format!("Default config not supported: {}", e)))?;
        let sample_format = supported.sample_format();
        let config: cpal::StreamConfig = supported.into();
        let sample_rate = config.sample_rate.0;

        let rb = HeapRb::<f32>::new(sample_rate as usize * RING_SECONDS);
        let (producer, consumer) = rb.split();

        let stream = match sample_format {
            cpal::SampleFormat::F32 => build_stream::<f32>(&device, &config, producer)?,
            cpal::SampleFormat::I16 => build_stream::<i16>(&device, &config, producer)?,
            cpal::SampleFormat::U16 => build_stream::<u16>(&device, &config, producer)?,
            other => {
                return Err(Error::Audio(format!(
                    "Unsupported sample format: {:?}",
                    other
                )))
            }
        };

        stream
            .play()
            .map_err(|e| Error::Audio(format!("Failed to start audio stream: {}", e)))?;

        info!(
            "Capturing from '{}' at {} Hz, {} channel(s)",
            name, sample_rate, config.channels
        );

        Ok((
            Self {
                stream,
                device_name: name,
            },
            CaptureStream {
                consumer,
                sample_rate,
            },
        ))
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Pause the underlying stream.
    pub fn pause(&self) -> Result<(), Error> {
        self.stream
            .pause()
            .map_err(|e| Error::Audio(format!("Failed to pause audio stream: {}", e)))
    }
}

/// Build an input stream that downmixes every frame to mono.
fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut producer: HeapProducer<f32>,
) -> Result<cpal::Stream, Error>
where
    T: SizedSample,
    f32: FromSample<T>,
{
    let channels = config.channels.max(1) as usize;

    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                for frame in data.chunks(channels) {
                    let sum: f32 = frame.iter().map(|&s| f32::from_sample(s)).sum();
                    // A full ring drops the newest samples until the reader catches up.
                    let _ = producer.push(sum / frame.len() as f32);
                }
            },
            |err| error!("An error occurred on the audio stream: {}", err),
            None,
        )
        .map_err(|e| Error::Audio(format!("Failed to build input stream: {}", e)))
}

impl SampleSource for CaptureStream {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn read(&mut self, out: &mut AudioBuffer) -> Result<usize, Error> {
        let before = out.len();
        out.extend(self.consumer.pop_iter());
        let read = out.len() - before;
        trace!("Read {} captured samples", read);
        Ok(read)
    }
}
