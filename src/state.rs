use serde::{Deserialize, Serialize};

/// What the app is doing right now. Drives the button label and spinner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    Idle,
    Recording,
    Translating,
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Idle
    }
}

/// What a toggle (button tap, hotkey press, tray item) does in each mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleAction {
    StartListening,
    FinishListening,
    Ignore,
}

impl Mode {
    pub fn toggle_action(&self) -> ToggleAction {
        match self {
            Mode::Idle => ToggleAction::StartListening,
            Mode::Recording => ToggleAction::FinishListening,
            Mode::Translating => ToggleAction::Ignore,
        }
    }

    /// Button label shown to the user. The source language of the app is
    /// Japanese, so the labels are too.
    pub fn button_label(&self) -> &'static str {
        match self {
            Mode::Idle => "開始",
            Mode::Recording => "翻訳",
            Mode::Translating => "",
        }
    }

    /// The spinner is only shown while a translation is in flight.
    pub fn busy(&self) -> bool {
        matches!(self, Mode::Translating)
    }

    pub fn view(&self) -> ModeView {
        ModeView {
            mode: *self,
            label: self.button_label(),
            busy: self.busy(),
        }
    }
}

/// Serialized snapshot of the mode for the frontend and for events.
#[derive(Debug, Clone, Serialize)]
pub struct ModeView {
    pub mode: Mode,
    pub label: &'static str,
    pub busy: bool,
}

pub struct AppState {
    pub mode: Mode,
    /// True once the Whisper model loaded; the toggle button is disabled
    /// until then, like the original authorization gate.
    pub recognizer_ready: bool,
    pub transcript: String,
    pub translation: String,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            mode: Mode::Idle,
            recognizer_ready: false,
            transcript: String::new(),
            translation: String::new(),
        }
    }
}

impl AppState {
    /// Entering recording clears both displays.
    pub fn begin_recording(&mut self) {
        self.mode = Mode::Recording;
        self.transcript.clear();
        self.translation.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_dispatch() {
        assert_eq!(Mode::Idle.toggle_action(), ToggleAction::StartListening);
        assert_eq!(Mode::Recording.toggle_action(), ToggleAction::FinishListening);
        assert_eq!(Mode::Translating.toggle_action(), ToggleAction::Ignore);
    }

    #[test]
    fn labels_and_spinner() {
        assert_eq!(Mode::Idle.button_label(), "開始");
        assert_eq!(Mode::Recording.button_label(), "翻訳");
        assert_eq!(Mode::Translating.button_label(), "");
        assert!(!Mode::Idle.busy());
        assert!(!Mode::Recording.busy());
        assert!(Mode::Translating.busy());
    }

    /// Walk every toggle sequence a few steps deep and check the machine
    /// never skips a state: from Idle it can only reach Recording, from
    /// Recording only Translating, and a toggle in Translating changes
    /// nothing.
    #[test]
    fn no_state_skips() {
        // capture_ok mirrors whether AudioCapture::start succeeded
        fn step(mode: Mode, capture_ok: bool) -> Mode {
            match mode.toggle_action() {
                ToggleAction::StartListening => {
                    if capture_ok {
                        Mode::Recording
                    } else {
                        Mode::Idle
                    }
                }
                ToggleAction::FinishListening => Mode::Translating,
                ToggleAction::Ignore => mode,
            }
        }

        let mut mode = Mode::Idle;
        for &ok in &[true, true, true, true] {
            let next = step(mode, ok);
            match (mode, next) {
                (Mode::Idle, Mode::Idle) | (Mode::Idle, Mode::Recording) => {}
                (Mode::Recording, Mode::Translating) => {}
                (Mode::Translating, Mode::Translating) => {}
                other => panic!("illegal transition {:?}", other),
            }
            mode = next;
        }
        assert_eq!(mode, Mode::Translating);
        assert_eq!(step(mode, true), Mode::Translating);
    }

    #[test]
    fn failed_capture_start_stays_idle() {
        let mode = Mode::Idle;
        // start failed: the flow never advances the mode
        assert_eq!(mode.toggle_action(), ToggleAction::StartListening);
        assert_eq!(mode, Mode::Idle);
        assert_eq!(mode.button_label(), "開始");
    }

    #[test]
    fn begin_recording_clears_displays() {
        let mut state = AppState {
            mode: Mode::Idle,
            recognizer_ready: true,
            transcript: "こんにちは".to_string(),
            translation: "hello".to_string(),
        };
        state.begin_recording();
        assert_eq!(state.mode, Mode::Recording);
        assert!(state.transcript.is_empty());
        assert!(state.translation.is_empty());
    }
}
