use piper_rs::synth::PiperSpeechSynthesizer;
use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, Sink};
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Mutex};

/// Piper voices are mono at 22.05 kHz.
const PIPER_SAMPLE_RATE: u32 = 22_050;

enum SpeakerCommand {
    Speak { text: String },
    LoadVoice { config_path: PathBuf },
    SetVolume(f32),
}

/// Text-to-speech output on a dedicated thread. Synthesis and playback are
/// serialized on the thread; callers enqueue and return immediately, so an
/// utterance may still be playing after the app has gone back to idle.
pub struct Speaker {
    sender: Mutex<mpsc::Sender<SpeakerCommand>>,
}

impl Speaker {
    pub fn new(volume: f32) -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || {
            let Ok((_stream, handle)) = OutputStream::try_default() else {
                log::error!("Failed to create audio output stream for speech");
                return;
            };
            log::info!("Speaker initialized");

            let mut synth: Option<PiperSpeechSynthesizer> = None;
            let mut cfg_volume = volume;

            for cmd in rx {
                match cmd {
                    SpeakerCommand::LoadVoice { config_path } => {
                        match load_voice(&config_path) {
                            Ok(s) => {
                                synth = Some(s);
                                log::info!("Voice loaded from {:?}", config_path);
                            }
                            Err(e) => log::error!("Failed to load voice: {}", e),
                        }
                    }
                    SpeakerCommand::SetVolume(v) => {
                        cfg_volume = v.clamp(0.0, 1.0);
                    }
                    SpeakerCommand::Speak { text } => {
                        let Some(s) = synth.as_ref() else {
                            log::warn!("No voice loaded, dropping utterance");
                            continue;
                        };
                        match synthesize(s, &text) {
                            Ok(samples) => play(&handle, samples, cfg_volume),
                            Err(e) => log::error!("Speech synthesis failed: {}", e),
                        }
                    }
                }
            }
        });

        Speaker {
            sender: Mutex::new(tx),
        }
    }

    /// Fire-and-forget. Completion is not observable from here.
    pub fn speak(&self, text: &str) {
        if text.trim().is_empty() {
            return;
        }
        if let Ok(tx) = self.sender.lock() {
            let _ = tx.send(SpeakerCommand::Speak {
                text: text.to_string(),
            });
        }
    }

    pub fn load_voice(&self, config_path: PathBuf) {
        if let Ok(tx) = self.sender.lock() {
            let _ = tx.send(SpeakerCommand::LoadVoice { config_path });
        }
    }

    pub fn set_volume(&self, volume: f32) {
        if let Ok(tx) = self.sender.lock() {
            let _ = tx.send(SpeakerCommand::SetVolume(volume));
        }
    }
}

fn load_voice(config_path: &Path) -> Result<PiperSpeechSynthesizer, String> {
    if !config_path.exists() {
        return Err(format!("Voice config not found: {:?}", config_path));
    }
    let model = piper_rs::from_config_path(config_path)
        .map_err(|e| format!("Failed to load Piper voice config: {}", e))?;
    PiperSpeechSynthesizer::new(model)
        .map_err(|e| format!("Failed to create Piper synthesizer: {}", e))
}

fn synthesize(synth: &PiperSpeechSynthesizer, text: &str) -> Result<Vec<f32>, String> {
    let audio_results = synth
        .synthesize_parallel(text.to_string(), None)
        .map_err(|e| format!("Failed to synthesize: {}", e))?;

    let mut samples: Vec<f32> = Vec::new();
    for result in audio_results {
        let chunk = result.map_err(|e| format!("Failed to get audio chunk: {}", e))?;
        samples.extend(chunk.into_vec());
    }
    Ok(samples)
}

fn play(handle: &rodio::OutputStreamHandle, samples: Vec<f32>, volume: f32) {
    let Ok(sink) = Sink::try_new(handle) else {
        log::error!("Failed to create playback sink");
        return;
    };
    sink.set_volume(volume);
    sink.append(SamplesBuffer::new(1, PIPER_SAMPLE_RATE, samples));
    sink.sleep_until_end();
}
