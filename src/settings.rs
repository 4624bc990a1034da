use crate::translation::TranslationSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub hotkey: String,
    #[serde(default = "default_volume")]
    pub sound_volume: f32,
    #[serde(default = "default_speech_volume")]
    pub speech_volume: f32,
    /// Piper voice base name under the voices dir, e.g. "en_US-amy-medium".
    #[serde(default = "default_voice")]
    pub voice: String,
    #[serde(default)]
    pub save_recordings: bool,
    #[serde(default)]
    pub translation: TranslationSettings,
}

fn default_volume() -> f32 {
    0.5
}

fn default_speech_volume() -> f32 {
    1.0
}

fn default_voice() -> String {
    "en_US-amy-medium".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            hotkey: "Ctrl+Shift+T".to_string(),
            sound_volume: default_volume(),
            speech_volume: default_speech_volume(),
            voice: default_voice(),
            save_recordings: false,
            translation: TranslationSettings::default(),
        }
    }
}

impl Settings {
    pub fn file_path(data_dir: &Path) -> PathBuf {
        data_dir.join("settings.json")
    }

    pub fn load(data_dir: &Path) -> Self {
        let path = Self::file_path(data_dir);
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(contents) => match serde_json::from_str(&contents) {
                    Ok(settings) => return settings,
                    Err(e) => log::warn!("Failed to parse settings: {}, using defaults", e),
                },
                Err(e) => log::warn!("Failed to read settings: {}, using defaults", e),
            }
        }
        Self::default()
    }

    pub fn save(&self, data_dir: &Path) -> Result<(), String> {
        let path = Self::file_path(data_dir);
        let json = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;
        std::fs::write(&path, json).map_err(|e| e.to_string())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translation::TranslationProvider;

    #[test]
    fn save_and_reload_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.hotkey = "Ctrl+Alt+J".to_string();
        settings.save_recordings = true;
        settings.translation.provider = TranslationProvider::OpenAi;
        settings.save(dir.path()).unwrap();

        let loaded = Settings::load(dir.path());
        assert_eq!(loaded.hotkey, "Ctrl+Alt+J");
        assert!(loaded.save_recordings);
        assert_eq!(loaded.translation.provider, TranslationProvider::OpenAi);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Settings::load(dir.path());
        assert_eq!(loaded.hotkey, "Ctrl+Shift+T");
        assert_eq!(loaded.voice, "en_US-amy-medium");
        assert!(!loaded.save_recordings);
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(Settings::file_path(dir.path()), "{not json").unwrap();
        let loaded = Settings::load(dir.path());
        assert_eq!(loaded.hotkey, "Ctrl+Shift+T");
    }
}
