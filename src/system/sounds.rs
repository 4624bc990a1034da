use rodio::{OutputStream, Sink, Source};
use std::sync::{mpsc, Mutex};
use std::time::Duration;

enum SoundCommand {
    PlayStart,
    PlayStop,
    SetVolume(f32),
}

/// Short cue chimes for capture start/stop, played from a persistent output
/// stream so the first cue has no device-open latency.
pub struct SoundPlayer {
    sender: Mutex<mpsc::Sender<SoundCommand>>,
}

impl SoundPlayer {
    pub fn new(volume: f32) -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || {
            let Ok((_stream, handle)) = OutputStream::try_default() else {
                log::error!("Failed to create audio output stream for cues");
                return;
            };

            let mut cfg_volume = volume;

            for cmd in rx {
                match cmd {
                    SoundCommand::SetVolume(v) => {
                        cfg_volume = v.clamp(0.0, 1.0);
                    }
                    SoundCommand::PlayStart => {
                        // ascending: A4 -> C#5
                        play_chime(&handle, cfg_volume, 440.0, 554.0);
                    }
                    SoundCommand::PlayStop => {
                        // descending: C#5 -> A4
                        play_chime(&handle, cfg_volume, 554.0, 440.0);
                    }
                }
            }
        });

        SoundPlayer {
            sender: Mutex::new(tx),
        }
    }

    pub fn play_start(&self) {
        if let Ok(tx) = self.sender.lock() {
            let _ = tx.send(SoundCommand::PlayStart);
        }
    }

    pub fn play_stop(&self) {
        if let Ok(tx) = self.sender.lock() {
            let _ = tx.send(SoundCommand::PlayStop);
        }
    }

    pub fn set_volume(&self, volume: f32) {
        if let Ok(tx) = self.sender.lock() {
            let _ = tx.send(SoundCommand::SetVolume(volume));
        }
    }
}

fn play_chime(handle: &rodio::OutputStreamHandle, volume: f32, first_hz: f32, second_hz: f32) {
    let Ok(sink) = Sink::try_new(handle) else {
        return;
    };
    sink.set_volume(volume);

    let tone1 = rodio::source::SineWave::new(first_hz)
        .take_duration(Duration::from_millis(60))
        .amplify(0.08)
        .fade_in(Duration::from_millis(10));
    let tone2 = rodio::source::SineWave::new(second_hz)
        .take_duration(Duration::from_millis(80))
        .amplify(0.06)
        .fade_in(Duration::from_millis(10));
    sink.append(tone1);
    sink.append(tone2);
    sink.sleep_until_end();
}
