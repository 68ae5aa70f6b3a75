//! Keystroke admission gate - rate limiter and key classifier.
//!
//! [`InputGate::admit`] turns raw [`InputEvent`]s into a capped stream of
//! [`AdmittedAction`]s. Recognition order:
//!
//! 1. Global control combos (Ctrl+Shift+Q/C/S) - admitted before, and
//!    exempt from, all throttling.
//! 2. Any other event holding ctrl/alt/meta - suppressed; the host owns
//!    those shortcuts.
//! 3. Minimum inter-keystroke interval.
//! 4. Sliding one-second window cap.
//! 5. Classification: Backspace, Enter, Space, or a single letter (digits
//!    when configured). Everything else is dropped silently.
//!
//! Throttle state advances only on admission; a suppressed key neither
//! extends the interval nor occupies a window slot.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::config::SharedConfig;
use crate::input::event::{InputEvent, Key};

/// Width of the sliding rate-limit window.
const WINDOW: Duration = Duration::from_secs(1);

// ---------------------------------------------------------------------------
// AdmittedAction / Admission
// ---------------------------------------------------------------------------

/// Global control combos recognised ahead of everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    /// Ctrl+Shift+Q - leave fullscreen mode.
    ExitFullscreen,
    /// Ctrl+Shift+C - clear the typing display.
    ClearScreen,
    /// Ctrl+Shift+S - toggle the typing-speed readout.
    ToggleSpeedDisplay,
}

/// A classified, admitted keystroke for the caller to dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmittedAction {
    Control(ControlCommand),
    Backspace,
    Enter,
    Space,
    Character(char),
}

/// Why an event was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppressReason {
    /// Carried ctrl/alt/meta and was not a recognised combo.
    ModifierCombo,
    /// Arrived before the minimum inter-keystroke interval elapsed.
    TooSoon,
    /// The one-second window already held the maximum admitted keys.
    RateLimited,
    /// Not one of the four admitted key classes (arrows, F-keys, …).
    Unclassified,
}

/// Outcome of [`InputGate::admit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted(AdmittedAction),
    Suppressed(SuppressReason),
}

// ---------------------------------------------------------------------------
// InputGate
// ---------------------------------------------------------------------------

/// Stateful admission gate. One per session; not shared across threads.
pub struct InputGate {
    config: SharedConfig,
    /// Arrival time of the last admitted keystroke.
    last_admitted: Option<Instant>,
    /// Arrival times of keystrokes admitted within the trailing window.
    window: VecDeque<Instant>,
}

impl InputGate {
    pub fn new(config: SharedConfig) -> Self {
        Self {
            config,
            last_admitted: None,
            window: VecDeque::new(),
        }
    }

    /// Admit or suppress a raw key event.
    pub fn admit(&mut self, event: &InputEvent) -> Admission {
        // Control combos bypass rate limiting entirely and leave the
        // throttle state untouched.
        if let Some(cmd) = recognize_combo(event) {
            return Admission::Admitted(AdmittedAction::Control(cmd));
        }

        if event.modifiers.has_platform_modifier() {
            return Admission::Suppressed(SuppressReason::ModifierCombo);
        }

        let (min_interval, cap, admit_digits) = {
            let cfg = self.config.read().unwrap();
            (
                Duration::from_millis(cfg.input.min_key_interval_ms),
                cfg.input.max_keys_per_second as usize,
                cfg.input.admit_digits,
            )
        };

        // Minimum inter-keystroke interval. An event timestamped before the
        // last admission (host clock weirdness) counts as too soon.
        if let Some(last) = self.last_admitted {
            let elapsed = event.at.checked_duration_since(last);
            if elapsed.is_none_or(|d| d < min_interval) {
                return Admission::Suppressed(SuppressReason::TooSoon);
            }
        }

        // Sliding one-second window.
        while let Some(front) = self.window.front() {
            match event.at.checked_duration_since(*front) {
                Some(age) if age >= WINDOW => {
                    self.window.pop_front();
                }
                _ => break,
            }
        }
        if self.window.len() >= cap {
            return Admission::Suppressed(SuppressReason::RateLimited);
        }

        let action = match classify(&event.key, admit_digits) {
            Some(action) => action,
            None => return Admission::Suppressed(SuppressReason::Unclassified),
        };

        self.last_admitted = Some(event.at);
        self.window.push_back(event.at);
        Admission::Admitted(action)
    }
}

/// Match the three global Ctrl+Shift combos.
fn recognize_combo(event: &InputEvent) -> Option<ControlCommand> {
    if !(event.modifiers.ctrl && event.modifiers.shift) {
        return None;
    }
    match &event.key {
        Key::Char(c) => match c.to_ascii_lowercase() {
            'q' => Some(ControlCommand::ExitFullscreen),
            'c' => Some(ControlCommand::ClearScreen),
            's' => Some(ControlCommand::ToggleSpeedDisplay),
            _ => None,
        },
        _ => None,
    }
}

/// Classify an unmodified key into one of the four admitted classes.
fn classify(key: &Key, admit_digits: bool) -> Option<AdmittedAction> {
    match key {
        Key::Backspace => Some(AdmittedAction::Backspace),
        Key::Enter => Some(AdmittedAction::Enter),
        Key::Space => Some(AdmittedAction::Space),
        Key::Char(' ') => Some(AdmittedAction::Space),
        Key::Char(c) if c.is_ascii_alphabetic() => Some(AdmittedAction::Character(*c)),
        Key::Char(c) if c.is_ascii_digit() && admit_digits => {
            Some(AdmittedAction::Character(*c))
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
