use std::sync::{Arc, Mutex};

/// Capture target rate. Whisper wants 16 kHz mono f32.
pub const SAMPLE_RATE: u32 = 16_000;

/// Thread-safe accumulation buffer shared between the cpal callback and the
/// recognition side. One utterance is recorded in full, then taken.
#[derive(Clone)]
pub struct AudioBuffer {
    samples: Arc<Mutex<Vec<f32>>>,
}

impl AudioBuffer {
    pub fn new() -> Self {
        Self {
            // room for 30 seconds of speech before any realloc
            samples: Arc::new(Mutex::new(Vec::with_capacity(SAMPLE_RATE as usize * 30))),
        }
    }

    pub fn push_samples(&self, data: &[f32]) {
        if let Ok(mut buf) = self.samples.lock() {
            buf.extend_from_slice(data);
        }
    }

    /// Drain the utterance, leaving the buffer empty for the next one.
    pub fn take_samples(&self) -> Vec<f32> {
        if let Ok(mut buf) = self.samples.lock() {
            std::mem::take(&mut *buf)
        } else {
            Vec::new()
        }
    }

    pub fn clear(&self) {
        if let Ok(mut buf) = self.samples.lock() {
            buf.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.samples.lock().map(|b| b.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the current samples without draining, for partial results.
    pub fn snapshot(&self) -> Vec<f32> {
        if let Ok(buf) = self.samples.lock() {
            buf.clone()
        } else {
            Vec::new()
        }
    }

    pub fn duration_secs(&self) -> f32 {
        self.len() as f32 / SAMPLE_RATE as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_take_clears() {
        let buf = AudioBuffer::new();
        buf.push_samples(&[0.1, 0.2, 0.3]);
        assert_eq!(buf.len(), 3);
        let taken = buf.take_samples();
        assert_eq!(taken, vec![0.1, 0.2, 0.3]);
        assert!(buf.is_empty());
    }

    #[test]
    fn snapshot_does_not_drain() {
        let buf = AudioBuffer::new();
        buf.push_samples(&[0.5; 10]);
        assert_eq!(buf.snapshot().len(), 10);
        assert_eq!(buf.len(), 10);
    }

    #[test]
    fn clones_share_storage() {
        let buf = AudioBuffer::new();
        let other = buf.clone();
        other.push_samples(&[1.0, -1.0]);
        assert_eq!(buf.len(), 2);
        buf.clear();
        assert!(other.is_empty());
    }
}
