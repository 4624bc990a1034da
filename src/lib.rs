pub mod audio;
pub mod commands;
pub mod config;
pub mod recognition;
pub mod settings;
pub mod speech;
pub mod state;
pub mod system;
pub mod translation;

use std::sync::Mutex;
use tauri::{Emitter, Listener, Manager};

use audio::buffer::{AudioBuffer, SAMPLE_RATE};
use audio::capture::AudioCapture;
use config::AppConfig;
use recognition::engine::SpeechRecognizer;
use settings::Settings;
use speech::speaker::Speaker;
use speech::voices;
use state::{AppState, Mode, ToggleAction};
use system::sounds::SoundPlayer;

/// Whisper model the recognizer loads at startup. Multilingual; the `.en`
/// models cannot hear Japanese.
const RECOGNIZER_MODEL: &str = "ggml-small.bin";

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    env_logger::init();

    tauri::Builder::default()
        .plugin(
            tauri_plugin_global_shortcut::Builder::new()
                .with_handler(|app, shortcut, event| {
                    use tauri_plugin_global_shortcut::ShortcutState;
                    log::info!("Hotkey event: {:?} state={:?}", shortcut, event.state);
                    match event.state {
                        // The hotkey toggles like the button does
                        ShortcutState::Pressed => {
                            let _ = app.emit("hotkey-toggle", ());
                        }
                        // release is not a step in a toggle
                        ShortcutState::Released => {}
                    }
                })
                .build(),
        )
        .setup(|app| {
            let config = AppConfig::new();
            config.ensure_dirs().expect("Failed to create app directories");

            let buffer = AudioBuffer::new();
            let capture = AudioCapture::new(buffer.clone());

            let mut recognizer = SpeechRecognizer::new();
            let model_path = config.model_path(RECOGNIZER_MODEL);

            let mut initial_state = AppState::default();

            if model_path.exists() {
                match recognizer.load_model(&model_path) {
                    Ok(_) => {
                        log::info!("Model loaded from {:?}", model_path);
                        initial_state.recognizer_ready = true;
                    }
                    Err(e) => log::error!("Failed to load model: {}", e),
                }
            } else {
                log::warn!(
                    "Model not found at {:?}. Download it to enable recognition.",
                    model_path
                );
            }

            let user_settings = Settings::load(&config.data_dir);
            log::info!("Loaded hotkey setting: {}", user_settings.hotkey);

            let sound_player = SoundPlayer::new(user_settings.sound_volume);

            let speaker = Speaker::new(user_settings.speech_volume);
            if voices::voice_exists(&config.voices_dir, &user_settings.voice) {
                speaker.load_voice(voices::voice_config_path(
                    &config.voices_dir,
                    &user_settings.voice,
                ));
            } else {
                log::warn!(
                    "Voice {} not found under {:?}. Download it to enable speech output.",
                    user_settings.voice,
                    config.voices_dir
                );
            }

            let recognizer_ready = initial_state.recognizer_ready;
            app.manage(Mutex::new(initial_state));
            app.manage(Mutex::new(capture));
            app.manage(buffer.clone());
            app.manage(Mutex::new(recognizer));
            app.manage(config);
            app.manage(sound_player);
            app.manage(speaker);
            app.manage(Mutex::new(user_settings.clone()));

            system::tray::setup_tray(app.handle())?;

            {
                use tauri_plugin_global_shortcut::GlobalShortcutExt;
                let shortcut = commands::parse_hotkey(&user_settings.hotkey)
                    .map_err(|e| -> Box<dyn std::error::Error> { e.into() })?;
                app.global_shortcut().register(shortcut)?;
                log::info!("Global hotkey registered: {}", user_settings.hotkey);
            }

            // Close button hides the window; the tray keeps the app alive
            if let Some(window) = app.get_webview_window("main") {
                let w = window.clone();
                window.on_window_event(move |event| {
                    if let tauri::WindowEvent::CloseRequested { api, .. } = event {
                        api.prevent_close();
                        let _ = w.hide();
                    }
                });
            }

            let app_handle = app.handle().clone();
            app.listen("hotkey-toggle", move |_event| {
                toggle_flow(&app_handle);
            });

            let app_handle = app.handle().clone();
            app.listen("tray-toggle", move |_event| {
                toggle_flow(&app_handle);
            });

            let _ = app.emit("recognizer-ready", recognizer_ready);

            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::toggle_translation,
            commands::get_state,
            commands::get_mode,
            commands::is_recognizer_ready,
            commands::get_models_dir,
            commands::list_input_devices,
            commands::get_hotkey,
            commands::set_hotkey,
            commands::get_sound_volume,
            commands::set_sound_volume,
            commands::test_sound,
            commands::get_translation_settings,
            commands::set_translation_settings,
            commands::get_speech_settings,
            commands::set_speech_settings,
            commands::test_voice,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}

fn emit_mode(app: &tauri::AppHandle, mode: Mode) {
    let _ = app.emit("mode-changed", mode.view());
}

/// One entry point for button, hotkey and tray. What it does depends on the
/// current mode; a toggle while a translation is in flight does nothing.
pub fn toggle_flow(app: &tauri::AppHandle) {
    let action = {
        let state = app.state::<Mutex<AppState>>();
        let s = state.lock().unwrap();
        s.mode.toggle_action()
    };

    match action {
        ToggleAction::StartListening => start_listening_flow(app),
        ToggleAction::FinishListening => {
            let app = app.clone();
            tauri::async_runtime::spawn(async move {
                stop_and_translate_flow(&app).await;
            });
        }
        ToggleAction::Ignore => {
            log::debug!("Toggle ignored while translating");
        }
    }
}

fn start_listening_flow(app: &tauri::AppHandle) {
    log::info!("start_listening_flow called");
    let state = app.state::<Mutex<AppState>>();
    let capture = app.state::<Mutex<AudioCapture>>();
    let buffer = app.state::<AudioBuffer>();

    {
        let s = state.lock().unwrap();
        if s.mode != Mode::Idle {
            return;
        }
        if !s.recognizer_ready {
            log::warn!("Recognizer not ready, ignoring start");
            return;
        }
    }

    buffer.clear();

    // Capture must be live before the mode advances: a failed start leaves
    // the app idle with no user-facing error.
    {
        let mut cap = capture.lock().unwrap();
        match cap.start() {
            Ok(rate) => log::info!("Capture started at {} Hz", rate),
            Err(e) => {
                log::error!("Failed to start capture: {}", e);
                return;
            }
        }
    }

    {
        let mut s = state.lock().unwrap();
        s.begin_recording();
    }
    let _ = app.emit("transcript-changed", "");
    let _ = app.emit("translation-changed", "");
    emit_mode(app, Mode::Recording);
    app.state::<SoundPlayer>().play_start();

    let app_clone = app.clone();
    tauri::async_runtime::spawn(async move {
        partial_transcript_loop(app_clone).await;
    });
}

/// Re-run recognition over the rolling tail of the buffer every ~2s while
/// recording, so the transcript display fills in as the user speaks.
async fn partial_transcript_loop(app: tauri::AppHandle) {
    use std::time::Duration;

    // Cap the partial pass at 10s of audio to keep it fast; the final pass
    // sees the whole utterance.
    const MAX_PARTIAL_SAMPLES: usize = SAMPLE_RATE as usize * 10;

    let still_recording = |app: &tauri::AppHandle| {
        let state = app.state::<Mutex<AppState>>();
        let mode = state.lock().unwrap().mode;
        mode == Mode::Recording
    };

    // Need ~1.5s of audio before the first pass is worth running
    for _ in 0..15 {
        tokio::time::sleep(Duration::from_millis(100)).await;
        if !still_recording(&app) {
            return;
        }
    }

    loop {
        let buffer = app.state::<AudioBuffer>();
        let full_samples = buffer.snapshot();

        if full_samples.len() >= SAMPLE_RATE as usize {
            let samples = if full_samples.len() > MAX_PARTIAL_SAMPLES {
                &full_samples[full_samples.len() - MAX_PARTIAL_SAMPLES..]
            } else {
                &full_samples
            };

            if !still_recording(&app) {
                return;
            }

            // Skip the round if the final pass holds the engine
            let engine = app.state::<Mutex<SpeechRecognizer>>();
            if let Ok(eng) = engine.try_lock() {
                let duration = samples.len() as f32 / SAMPLE_RATE as f32;
                log::info!("Partial pass: recognizing {:.1}s", duration);
                match eng.transcribe(samples) {
                    Ok(text) if !text.is_empty() => {
                        let text = strip_annotations(&text);
                        // Partial results only apply while still recording
                        let state = app.state::<Mutex<AppState>>();
                        let mut s = state.lock().unwrap();
                        if s.mode == Mode::Recording && !text.is_empty() {
                            s.transcript = text.clone();
                            drop(s);
                            let _ = app.emit("partial-transcript", &text);
                        }
                    }
                    _ => {}
                }
            } else {
                log::info!("Partial pass: engine busy, skipping");
            }
        }

        // Wait 2s before the next pass, bailing quickly once recording ends
        for _ in 0..20 {
            tokio::time::sleep(Duration::from_millis(100)).await;
            if !still_recording(&app) {
                return;
            }
        }
    }
}

async fn stop_and_translate_flow(app: &tauri::AppHandle) {
    log::info!("stop_and_translate_flow called");
    let state = app.state::<Mutex<AppState>>();
    let capture = app.state::<Mutex<AudioCapture>>();
    let buffer = app.state::<AudioBuffer>();
    let engine = app.state::<Mutex<SpeechRecognizer>>();

    {
        let s = state.lock().unwrap();
        if s.mode != Mode::Recording {
            return;
        }
    }

    {
        capture.lock().unwrap().stop();
    }
    app.state::<SoundPlayer>().play_stop();

    {
        state.lock().unwrap().mode = Mode::Translating;
    }
    emit_mode(app, Mode::Translating);

    let samples = buffer.take_samples();
    if samples.is_empty() {
        log::warn!("No audio recorded");
        return back_to_idle(app);
    }

    log::info!(
        "Recognizing {:.1}s of audio",
        samples.len() as f32 / SAMPLE_RATE as f32
    );

    let transcript = {
        let eng = engine.lock().unwrap();
        match eng.transcribe(&samples) {
            Ok(t) => strip_annotations(&t),
            Err(e) => {
                log::error!("Recognition failed: {}", e);
                return back_to_idle(app);
            }
        }
    };

    if transcript.is_empty() {
        log::warn!("No speech detected");
        return back_to_idle(app);
    }

    log::info!("Transcript: {}", transcript);
    {
        let mut s = state.lock().unwrap();
        s.transcript = transcript.clone();
    }
    let _ = app.emit("transcript-changed", &transcript);

    let (translation_settings, save_recordings) = {
        let settings = app.state::<Mutex<Settings>>();
        let guard = settings.lock().unwrap();
        (guard.translation.clone(), guard.save_recordings)
    };

    if save_recordings {
        let config = app.state::<AppConfig>();
        match audio::wav::save_utterance(&config.recordings_dir, &samples) {
            Ok(path) => log::info!("Recording saved to {:?}", path),
            Err(e) => log::warn!("Failed to save recording: {}", e),
        }
    }

    let translated = translation::translate_text(&transcript, &translation_settings).await;
    {
        let mut s = state.lock().unwrap();
        s.translation = translated.clone();
    }
    let _ = app.emit("translation-changed", &translated);

    // Fire-and-forget: idle is not gated on playback finishing
    app.state::<Speaker>().speak(&translated);

    back_to_idle(app)
}

fn back_to_idle(app: &tauri::AppHandle) {
    app.state::<Mutex<AppState>>().lock().unwrap().mode = Mode::Idle;
    emit_mode(app, Mode::Idle);
}

/// Drop Whisper's bracketed non-speech annotations, e.g. `[音楽]`, `(拍手)`,
/// `（笑）`, and tidy the remaining whitespace.
fn strip_annotations(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut depth = 0u32;
    for c in text.chars() {
        match c {
            '[' | '(' | '（' | '【' => depth += 1,
            ']' | ')' | '）' | '】' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::strip_annotations;

    #[test]
    fn drops_noise_annotations() {
        assert_eq!(strip_annotations("[音楽] こんにちは"), "こんにちは");
        assert_eq!(strip_annotations("はい （拍手） どうも"), "はい どうも");
        assert_eq!(strip_annotations("(applause) thank you"), "thank you");
    }

    #[test]
    fn plain_text_is_untouched() {
        assert_eq!(strip_annotations("おはようございます"), "おはようございます");
    }

    #[test]
    fn unbalanced_brackets_do_not_eat_the_rest() {
        assert_eq!(strip_annotations("途中で) 切れた"), "途中で 切れた");
    }
}
