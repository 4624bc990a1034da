use std::path::{Path, PathBuf};

const VOICE_BASE_URL: &str = "https://huggingface.co/rhasspy/piper-voices/resolve/main";

pub struct VoiceInfo {
    pub name: String,
    /// Repo subpath, e.g. "en/en_US/amy/medium".
    pub repo_path: String,
    pub size_bytes: u64,
}

impl VoiceInfo {
    pub fn onnx_filename(&self) -> String {
        format!("{}.onnx", self.name)
    }

    pub fn config_filename(&self) -> String {
        format!("{}.onnx.json", self.name)
    }

    pub fn onnx_url(&self) -> String {
        format!("{}/{}/{}", VOICE_BASE_URL, self.repo_path, self.onnx_filename())
    }

    pub fn config_url(&self) -> String {
        format!("{}/{}/{}", VOICE_BASE_URL, self.repo_path, self.config_filename())
    }
}

/// English output voices. The original app spoke its translations with an
/// English system voice; these are the local equivalents.
pub fn get_available_voices() -> Vec<VoiceInfo> {
    vec![
        VoiceInfo {
            name: "en_US-amy-medium".to_string(),
            repo_path: "en/en_US/amy/medium".to_string(),
            size_bytes: 63_201_294,
        },
        VoiceInfo {
            name: "en_US-lessac-medium".to_string(),
            repo_path: "en/en_US/lessac/medium".to_string(),
            size_bytes: 63_201_294,
        },
        VoiceInfo {
            name: "en_GB-alan-medium".to_string(),
            repo_path: "en/en_GB/alan/medium".to_string(),
            size_bytes: 63_201_294,
        },
    ]
}

/// A voice is installed once both the model and its config sit in the
/// voices dir.
pub fn voice_exists(voices_dir: &Path, voice_name: &str) -> bool {
    voices_dir.join(format!("{}.onnx", voice_name)).exists()
        && voices_dir.join(format!("{}.onnx.json", voice_name)).exists()
}

/// Path handed to the synthesizer loader; piper-rs resolves the .onnx file
/// next to its config.
pub fn voice_config_path(voices_dir: &Path, voice_name: &str) -> PathBuf {
    voices_dir.join(format!("{}.onnx.json", voice_name))
}

/// Download a voice (model + config) into the voices dir.
pub async fn download_voice(voices_dir: &Path, voice: &VoiceInfo) -> Result<PathBuf, String> {
    std::fs::create_dir_all(voices_dir)
        .map_err(|e| format!("Failed to create voices dir: {}", e))?;

    for (url, filename) in [
        (voice.onnx_url(), voice.onnx_filename()),
        (voice.config_url(), voice.config_filename()),
    ] {
        let dest = voices_dir.join(&filename);
        if dest.exists() {
            continue;
        }

        log::info!("Downloading voice file {}...", filename);
        let response = reqwest::get(&url)
            .await
            .map_err(|e| format!("Failed to download voice: {}", e))?;

        if !response.status().is_success() {
            return Err(format!(
                "Voice download failed with status: {}",
                response.status()
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| format!("Failed to read response: {}", e))?;

        std::fs::write(&dest, &bytes)
            .map_err(|e| format!("Failed to write voice file: {}", e))?;
    }

    Ok(voice_config_path(voices_dir, &voice.name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_follow_repo_layout() {
        let voices = get_available_voices();
        assert!(!voices.is_empty());
        for voice in &voices {
            assert!(voice.onnx_url().contains(&voice.repo_path));
            assert!(voice.config_url().ends_with(".onnx.json"));
        }
    }

    #[test]
    fn voice_requires_both_files() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!voice_exists(dir.path(), "en_US-amy-medium"));

        std::fs::write(dir.path().join("en_US-amy-medium.onnx"), b"stub").unwrap();
        assert!(!voice_exists(dir.path(), "en_US-amy-medium"));

        std::fs::write(dir.path().join("en_US-amy-medium.onnx.json"), b"{}").unwrap();
        assert!(voice_exists(dir.path(), "en_US-amy-medium"));
    }

    #[test]
    fn config_path_points_into_voices_dir() {
        let p = voice_config_path(Path::new("/tmp/voices"), "en_US-amy-medium");
        assert_eq!(
            p,
            PathBuf::from("/tmp/voices/en_US-amy-medium.onnx.json")
        );
    }
}
