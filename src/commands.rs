use std::sync::Mutex;
use tauri::{AppHandle, Manager, State};
use tauri_plugin_global_shortcut::{Code, GlobalShortcutExt, Modifiers, Shortcut};

use crate::audio::devices::{self, AudioDeviceInfo};
use crate::config::AppConfig;
use crate::settings::Settings;
use crate::speech::speaker::Speaker;
use crate::speech::voices;
use crate::state::{AppState, ModeView};
use crate::system::sounds::SoundPlayer;
use crate::translation::TranslationSettings;

/// Snapshot handed to the frontend on load.
#[derive(serde::Serialize)]
pub struct StateView {
    pub mode: ModeView,
    pub transcript: String,
    pub translation: String,
    pub recognizer_ready: bool,
}

/// The button tap. Same entry point as the hotkey and the tray item.
#[tauri::command]
pub fn toggle_translation(app: AppHandle) -> Result<ModeView, String> {
    crate::toggle_flow(&app);
    let state = app.state::<Mutex<AppState>>();
    let s = state.lock().map_err(|e| e.to_string())?;
    Ok(s.mode.view())
}

#[tauri::command]
pub fn get_state(state: State<'_, Mutex<AppState>>) -> Result<StateView, String> {
    let s = state.lock().map_err(|e| e.to_string())?;
    Ok(StateView {
        mode: s.mode.view(),
        transcript: s.transcript.clone(),
        translation: s.translation.clone(),
        recognizer_ready: s.recognizer_ready,
    })
}

#[tauri::command]
pub fn get_mode(state: State<'_, Mutex<AppState>>) -> Result<ModeView, String> {
    let s = state.lock().map_err(|e| e.to_string())?;
    Ok(s.mode.view())
}

#[tauri::command]
pub fn is_recognizer_ready(state: State<'_, Mutex<AppState>>) -> Result<bool, String> {
    let s = state.lock().map_err(|e| e.to_string())?;
    Ok(s.recognizer_ready)
}

#[tauri::command]
pub fn get_models_dir(config: State<'_, AppConfig>) -> Result<String, String> {
    Ok(config.models_dir.to_string_lossy().to_string())
}

#[tauri::command]
pub fn list_input_devices() -> Vec<AudioDeviceInfo> {
    devices::list_input_devices()
}

#[tauri::command]
pub fn get_hotkey(settings: State<'_, Mutex<Settings>>) -> Result<String, String> {
    let s = settings.lock().map_err(|e| e.to_string())?;
    Ok(s.hotkey.clone())
}

#[tauri::command]
pub fn set_hotkey(
    app: AppHandle,
    hotkey: String,
    settings: State<'_, Mutex<Settings>>,
    config: State<'_, AppConfig>,
) -> Result<String, String> {
    let new_shortcut = parse_hotkey(&hotkey)?;

    let old_hotkey = {
        let s = settings.lock().map_err(|e| e.to_string())?;
        s.hotkey.clone()
    };
    let old_shortcut = parse_hotkey(&old_hotkey)?;

    let gs = app.global_shortcut();
    gs.unregister(old_shortcut)
        .map_err(|e| format!("Failed to unregister old hotkey: {}", e))?;
    gs.register(new_shortcut)
        .map_err(|e| format!("Failed to register new hotkey: {}", e))?;

    {
        let mut s = settings.lock().map_err(|e| e.to_string())?;
        s.hotkey = hotkey.clone();
        s.save(&config.data_dir)?;
    }

    log::info!("Hotkey changed to: {}", hotkey);
    Ok(hotkey)
}

#[tauri::command]
pub fn get_sound_volume(settings: State<'_, Mutex<Settings>>) -> Result<f32, String> {
    let s = settings.lock().map_err(|e| e.to_string())?;
    Ok(s.sound_volume)
}

#[tauri::command]
pub fn set_sound_volume(
    volume: f32,
    settings: State<'_, Mutex<Settings>>,
    config: State<'_, AppConfig>,
    player: State<'_, SoundPlayer>,
) -> Result<(), String> {
    let volume = volume.clamp(0.0, 1.0);
    player.set_volume(volume);

    let mut s = settings.lock().map_err(|e| e.to_string())?;
    s.sound_volume = volume;
    s.save(&config.data_dir)?;
    Ok(())
}

#[tauri::command]
pub fn test_sound(which: String, player: State<'_, SoundPlayer>) -> Result<(), String> {
    match which.as_str() {
        "start" => player.play_start(),
        "stop" => player.play_stop(),
        _ => return Err("Unknown sound: use 'start' or 'stop'".to_string()),
    }
    Ok(())
}

#[tauri::command]
pub fn get_translation_settings(
    settings: State<'_, Mutex<Settings>>,
) -> Result<TranslationSettings, String> {
    let s = settings.lock().map_err(|e| e.to_string())?;
    Ok(s.translation.clone())
}

#[tauri::command]
pub fn set_translation_settings(
    translation: TranslationSettings,
    settings: State<'_, Mutex<Settings>>,
    config: State<'_, AppConfig>,
) -> Result<(), String> {
    let mut s = settings.lock().map_err(|e| e.to_string())?;
    log::info!("Translation settings updated: provider={:?}", translation.provider);
    s.translation = translation;
    s.save(&config.data_dir)?;
    Ok(())
}

#[derive(serde::Serialize, serde::Deserialize)]
pub struct SpeechSettings {
    pub voice: String,
    pub speech_volume: f32,
    pub save_recordings: bool,
}

#[tauri::command]
pub fn get_speech_settings(
    settings: State<'_, Mutex<Settings>>,
) -> Result<SpeechSettings, String> {
    let s = settings.lock().map_err(|e| e.to_string())?;
    Ok(SpeechSettings {
        voice: s.voice.clone(),
        speech_volume: s.speech_volume,
        save_recordings: s.save_recordings,
    })
}

#[tauri::command]
pub fn set_speech_settings(
    speech: SpeechSettings,
    settings: State<'_, Mutex<Settings>>,
    config: State<'_, AppConfig>,
    speaker: State<'_, Speaker>,
) -> Result<(), String> {
    let volume = speech.speech_volume.clamp(0.0, 1.0);
    speaker.set_volume(volume);

    let voice_changed = {
        let s = settings.lock().map_err(|e| e.to_string())?;
        s.voice != speech.voice
    };
    if voice_changed {
        if voices::voice_exists(&config.voices_dir, &speech.voice) {
            speaker.load_voice(voices::voice_config_path(&config.voices_dir, &speech.voice));
        } else {
            log::warn!(
                "Voice {} not installed under {:?}; keeping current voice loaded",
                speech.voice,
                config.voices_dir
            );
        }
    }

    let mut s = settings.lock().map_err(|e| e.to_string())?;
    s.voice = speech.voice;
    s.speech_volume = volume;
    s.save_recordings = speech.save_recordings;
    s.save(&config.data_dir)?;
    Ok(())
}

#[tauri::command]
pub fn test_voice(speaker: State<'_, Speaker>) -> Result<(), String> {
    speaker.speak("Hello! This is how your translations will sound.");
    Ok(())
}

/// Parse a hotkey string like "Ctrl+Shift+T" into a tauri Shortcut.
pub fn parse_hotkey(hotkey: &str) -> Result<Shortcut, String> {
    let parts: Vec<&str> = hotkey.split('+').map(|s| s.trim()).collect();
    if parts.is_empty() {
        return Err("Empty hotkey".to_string());
    }

    let mut modifiers = Modifiers::empty();
    let mut key_code: Option<Code> = None;

    for part in &parts {
        match part.to_lowercase().as_str() {
            "ctrl" | "control" => modifiers |= Modifiers::CONTROL,
            "shift" => modifiers |= Modifiers::SHIFT,
            "alt" => modifiers |= Modifiers::ALT,
            "super" | "win" | "meta" | "cmd" => modifiers |= Modifiers::SUPER,
            key => {
                if key_code.is_some() {
                    return Err(format!("Multiple keys in hotkey: {}", hotkey));
                }
                key_code = Some(parse_key_code(key)?);
            }
        }
    }

    let code = key_code.ok_or_else(|| format!("No key specified in hotkey: {}", hotkey))?;
    let mods = if modifiers.is_empty() {
        None
    } else {
        Some(modifiers)
    };

    Ok(Shortcut::new(mods, code))
}

const LETTER_CODES: [Code; 26] = [
    Code::KeyA, Code::KeyB, Code::KeyC, Code::KeyD, Code::KeyE, Code::KeyF, Code::KeyG,
    Code::KeyH, Code::KeyI, Code::KeyJ, Code::KeyK, Code::KeyL, Code::KeyM, Code::KeyN,
    Code::KeyO, Code::KeyP, Code::KeyQ, Code::KeyR, Code::KeyS, Code::KeyT, Code::KeyU,
    Code::KeyV, Code::KeyW, Code::KeyX, Code::KeyY, Code::KeyZ,
];

const DIGIT_CODES: [Code; 10] = [
    Code::Digit0, Code::Digit1, Code::Digit2, Code::Digit3, Code::Digit4,
    Code::Digit5, Code::Digit6, Code::Digit7, Code::Digit8, Code::Digit9,
];

const FUNCTION_CODES: [Code; 12] = [
    Code::F1, Code::F2, Code::F3, Code::F4, Code::F5, Code::F6,
    Code::F7, Code::F8, Code::F9, Code::F10, Code::F11, Code::F12,
];

fn parse_key_code(key: &str) -> Result<Code, String> {
    let lower = key.to_lowercase();

    let mut chars = lower.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        match c {
            'a'..='z' => return Ok(LETTER_CODES[(c as u8 - b'a') as usize]),
            '0'..='9' => return Ok(DIGIT_CODES[(c as u8 - b'0') as usize]),
            _ => {}
        }
    }
    if let Some(n) = lower.strip_prefix('f').and_then(|n| n.parse::<usize>().ok()) {
        if (1..=12).contains(&n) {
            return Ok(FUNCTION_CODES[n - 1]);
        }
    }

    match lower.as_str() {
        "space" => Ok(Code::Space),
        "enter" | "return" => Ok(Code::Enter),
        "tab" => Ok(Code::Tab),
        "escape" | "esc" => Ok(Code::Escape),
        "backspace" => Ok(Code::Backspace),
        "delete" | "del" => Ok(Code::Delete),
        "insert" => Ok(Code::Insert),
        "home" => Ok(Code::Home),
        "end" => Ok(Code::End),
        "pageup" => Ok(Code::PageUp),
        "pagedown" => Ok(Code::PageDown),
        "up" => Ok(Code::ArrowUp),
        "down" => Ok(Code::ArrowDown),
        "left" => Ok(Code::ArrowLeft),
        "right" => Ok(Code::ArrowRight),
        "`" | "backquote" => Ok(Code::Backquote),
        "-" | "minus" => Ok(Code::Minus),
        "=" | "equal" => Ok(Code::Equal),
        "[" | "bracketleft" => Ok(Code::BracketLeft),
        "]" | "bracketright" => Ok(Code::BracketRight),
        "\\" | "backslash" => Ok(Code::Backslash),
        ";" | "semicolon" => Ok(Code::Semicolon),
        "'" | "quote" => Ok(Code::Quote),
        "," | "comma" => Ok(Code::Comma),
        "." | "period" => Ok(Code::Period),
        "/" | "slash" => Ok(Code::Slash),
        other => Err(format!("Unknown key: {}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_default_hotkey() {
        let shortcut = parse_hotkey("Ctrl+Shift+T").unwrap();
        let expected = Shortcut::new(Some(Modifiers::CONTROL | Modifiers::SHIFT), Code::KeyT);
        assert_eq!(shortcut, expected);
    }

    #[test]
    fn parses_bare_function_key() {
        let shortcut = parse_hotkey("F9").unwrap();
        assert_eq!(shortcut, Shortcut::new(None, Code::F9));
    }

    #[test]
    fn parses_letters_digits_and_named_keys() {
        assert_eq!(parse_key_code("j").unwrap(), Code::KeyJ);
        assert_eq!(parse_key_code("7").unwrap(), Code::Digit7);
        assert_eq!(parse_key_code("space").unwrap(), Code::Space);
        assert_eq!(parse_key_code("pageup").unwrap(), Code::PageUp);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_hotkey("Ctrl+").is_err());
        assert!(parse_hotkey("Ctrl+Q+W").is_err());
        assert!(parse_key_code("f13").is_err());
        assert!(parse_key_code("nosuchkey").is_err());
    }
}
