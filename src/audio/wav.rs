use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavSpec, WavWriter};

use super::buffer::SAMPLE_RATE;

/// Write an utterance to disk as 16-bit mono PCM. Used when the
/// `save_recordings` setting is on; filenames are sequence-numbered so a
/// session's utterances sort in order.
pub fn save_utterance(dir: &Path, samples: &[f32]) -> Result<PathBuf, String> {
    let path = next_recording_path(dir)?;

    let spec = WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer =
        WavWriter::create(&path, spec).map_err(|e| format!("Failed to create WAV: {}", e))?;
    for &s in samples {
        let v = (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer
            .write_sample(v)
            .map_err(|e| format!("Failed to write WAV sample: {}", e))?;
    }
    writer
        .finalize()
        .map_err(|e| format!("Failed to finalize WAV: {}", e))?;

    Ok(path)
}

fn next_recording_path(dir: &Path) -> Result<PathBuf, String> {
    std::fs::create_dir_all(dir).map_err(|e| format!("Failed to create recordings dir: {}", e))?;

    let mut seq = 0u32;
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            if let Some(stem) = entry.path().file_stem().and_then(|s| s.to_str()) {
                if let Some(n) = stem
                    .strip_prefix("utterance-")
                    .and_then(|n| n.parse::<u32>().ok())
                {
                    seq = seq.max(n);
                }
            }
        }
    }

    Ok(dir.join(format!("utterance-{:05}.wav", seq + 1)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_playable_wav() {
        let dir = tempfile::tempdir().unwrap();
        let samples: Vec<f32> = (0..1600)
            .map(|i| (i as f32 * 0.01).sin() * 0.5)
            .collect();
        let path = save_utterance(dir.path(), &samples).unwrap();
        assert!(path.exists());

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().channels, 1);
        assert_eq!(reader.spec().sample_rate, SAMPLE_RATE);
        assert_eq!(reader.len(), 1600);
    }

    #[test]
    fn sequence_numbers_advance() {
        let dir = tempfile::tempdir().unwrap();
        let a = save_utterance(dir.path(), &[0.0; 16]).unwrap();
        let b = save_utterance(dir.path(), &[0.0; 16]).unwrap();
        assert!(a.ends_with("utterance-00001.wav"));
        assert!(b.ends_with("utterance-00002.wav"));
    }

    #[test]
    fn clamps_out_of_range_samples() {
        let dir = tempfile::tempdir().unwrap();
        let path = save_utterance(dir.path(), &[2.0, -2.0]).unwrap();
        let mut reader = hound::WavReader::open(&path).unwrap();
        let vals: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(vals, vec![i16::MAX, -i16::MAX]);
    }
}
