use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, Stream, StreamConfig};

use super::buffer::{AudioBuffer, SAMPLE_RATE};

/// Microphone gain multiplier. Quiet laptop mics hurt recognition of soft
/// Japanese speech more than clipping does.
const MIC_GAIN: f32 = 4.0;

/// Wrapper to make cpal::Stream usable across threads.
/// On WASAPI (Windows), the stream handle is safe to move between threads.
struct SendStream(Stream);
unsafe impl Send for SendStream {}

pub struct AudioCapture {
    stream: Option<SendStream>,
    buffer: AudioBuffer,
    device_sample_rate: u32,
}

unsafe impl Sync for AudioCapture {}

impl AudioCapture {
    pub fn new(buffer: AudioBuffer) -> Self {
        Self {
            stream: None,
            buffer,
            device_sample_rate: 48_000,
        }
    }

    /// Open the default input device and start streaming into the buffer.
    /// Any previous stream is torn down first so at most one is ever live.
    pub fn start(&mut self) -> Result<u32, String> {
        self.stream = None;

        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or("No input device found")?;

        let supported_config = device
            .default_input_config()
            .map_err(|e| format!("Failed to get default input config: {}", e))?;

        let sample_format = supported_config.sample_format();
        let config: StreamConfig = supported_config.into();
        self.device_sample_rate = config.sample_rate.0;
        let channels = config.channels as usize;
        let native_rate = self.device_sample_rate;

        let buffer = self.buffer.clone();
        let ingest = move |frames: Vec<f32>| {
            let mono = to_mono(&frames, channels);
            let resampled = resample(&mono, native_rate, SAMPLE_RATE);
            let amplified = apply_gain(&resampled, MIC_GAIN);
            buffer.push_samples(&amplified);
        };

        let on_error = |err| log::error!("Audio stream error: {}", err);

        let stream = match sample_format {
            SampleFormat::F32 => device
                .build_input_stream(
                    &config,
                    move |data: &[f32], _info: &cpal::InputCallbackInfo| {
                        ingest(data.to_vec());
                    },
                    on_error,
                    None,
                )
                .map_err(|e| format!("Failed to build f32 input stream: {}", e))?,
            SampleFormat::I16 => device
                .build_input_stream(
                    &config,
                    move |data: &[i16], _info: &cpal::InputCallbackInfo| {
                        let frames = data.iter().map(|&s| s as f32 / i16::MAX as f32).collect();
                        ingest(frames);
                    },
                    on_error,
                    None,
                )
                .map_err(|e| format!("Failed to build i16 input stream: {}", e))?,
            SampleFormat::U16 => device
                .build_input_stream(
                    &config,
                    move |data: &[u16], _info: &cpal::InputCallbackInfo| {
                        let frames = data
                            .iter()
                            .map(|&s| (s as f32 - 32_768.0) / 32_768.0)
                            .collect();
                        ingest(frames);
                    },
                    on_error,
                    None,
                )
                .map_err(|e| format!("Failed to build u16 input stream: {}", e))?,
            _ => return Err(format!("Unsupported sample format: {:?}", sample_format)),
        };

        stream
            .play()
            .map_err(|e| format!("Failed to start stream: {}", e))?;
        self.stream = Some(SendStream(stream));
        Ok(self.device_sample_rate)
    }

    pub fn stop(&mut self) {
        self.stream = None;
    }

    pub fn is_capturing(&self) -> bool {
        self.stream.is_some()
    }

    pub fn device_sample_rate(&self) -> u32 {
        self.device_sample_rate
    }
}

/// Convert multi-channel audio to mono by averaging channels.
fn to_mono(data: &[f32], channels: usize) -> Vec<f32> {
    if channels == 1 {
        return data.to_vec();
    }
    data.chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Apply gain and clamp to [-1.0, 1.0] to avoid clipping.
fn apply_gain(data: &[f32], gain: f32) -> Vec<f32> {
    data.iter().map(|&s| (s * gain).clamp(-1.0, 1.0)).collect()
}

/// Linear interpolation resampler (e.g., 48000 -> 16000 Hz).
fn resample(data: &[f32], source_rate: u32, target_rate: u32) -> Vec<f32> {
    if source_rate == target_rate || data.is_empty() {
        return data.to_vec();
    }
    let ratio = source_rate as f64 / target_rate as f64;
    let output_len = (data.len() as f64 / ratio) as usize;
    let mut output = Vec::with_capacity(output_len);

    for i in 0..output_len {
        let src_idx = i as f64 * ratio;
        let idx_floor = src_idx.floor() as usize;
        let idx_ceil = (idx_floor + 1).min(data.len() - 1);
        let frac = src_idx - idx_floor as f64;
        let sample = data[idx_floor] as f64 * (1.0 - frac) + data[idx_ceil] as f64 * frac;
        output.push(sample as f32);
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stereo_downmix_averages_frames() {
        let stereo = [1.0, 0.0, 0.5, 0.5, -1.0, 1.0];
        assert_eq!(to_mono(&stereo, 2), vec![0.5, 0.5, 0.0]);
    }

    #[test]
    fn mono_passes_through() {
        let mono = [0.25, -0.25];
        assert_eq!(to_mono(&mono, 1), mono.to_vec());
    }

    #[test]
    fn gain_clamps_to_unit_range() {
        let out = apply_gain(&[0.1, 0.5, -0.5], 4.0);
        assert_eq!(out, vec![0.4, 1.0, -1.0]);
    }

    #[test]
    fn resample_halves_sample_count() {
        let input: Vec<f32> = (0..480).map(|i| i as f32 / 480.0).collect();
        let out = resample(&input, 48_000, 16_000);
        assert_eq!(out.len(), 160);
    }

    #[test]
    fn resample_same_rate_is_identity() {
        let input = vec![0.1, 0.2, 0.3];
        assert_eq!(resample(&input, 16_000, 16_000), input);
    }
}
