use std::path::{Path, PathBuf};

const MODEL_BASE_URL: &str = "https://huggingface.co/ggerganov/whisper.cpp/resolve/main";

pub struct ModelInfo {
    pub name: String,
    pub filename: String,
    pub url: String,
    pub size_bytes: u64,
}

/// Multilingual ggml models only. The `.en` variants cannot transcribe
/// Japanese.
pub fn get_available_models() -> Vec<ModelInfo> {
    vec![
        ModelInfo {
            name: "base".to_string(),
            filename: "ggml-base.bin".to_string(),
            url: format!("{}/ggml-base.bin", MODEL_BASE_URL),
            size_bytes: 147_964_211,
        },
        ModelInfo {
            name: "small".to_string(),
            filename: "ggml-small.bin".to_string(),
            url: format!("{}/ggml-small.bin", MODEL_BASE_URL),
            size_bytes: 487_601_967,
        },
        ModelInfo {
            name: "medium".to_string(),
            filename: "ggml-medium.bin".to_string(),
            url: format!("{}/ggml-medium.bin", MODEL_BASE_URL),
            size_bytes: 1_533_763_059,
        },
    ]
}

pub fn model_exists(models_dir: &Path, filename: &str) -> bool {
    models_dir.join(filename).exists()
}

/// Download a model file. Simple buffered download; the files are large but
/// this runs once per model.
pub async fn download_model(models_dir: &Path, model: &ModelInfo) -> Result<PathBuf, String> {
    let dest = models_dir.join(&model.filename);
    if dest.exists() {
        return Ok(dest);
    }

    std::fs::create_dir_all(models_dir)
        .map_err(|e| format!("Failed to create models dir: {}", e))?;

    log::info!(
        "Downloading model {} ({} bytes)...",
        model.name,
        model.size_bytes
    );

    let response = reqwest::get(&model.url)
        .await
        .map_err(|e| format!("Failed to download model: {}", e))?;

    if !response.status().is_success() {
        return Err(format!(
            "Download failed with status: {}",
            response.status()
        ));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| format!("Failed to read response: {}", e))?;

    std::fs::write(&dest, &bytes)
        .map_err(|e| format!("Failed to write model file: {}", e))?;

    log::info!("Model downloaded to {:?}", dest);
    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_multilingual() {
        for model in get_available_models() {
            assert!(!model.filename.contains(".en."), "{}", model.filename);
            assert!(model.url.ends_with(&model.filename));
            assert!(model.size_bytes > 0);
        }
    }

    #[test]
    fn model_exists_checks_the_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!model_exists(dir.path(), "ggml-base.bin"));
        std::fs::write(dir.path().join("ggml-base.bin"), b"stub").unwrap();
        assert!(model_exists(dir.path(), "ggml-base.bin"));
    }
}
