//! Session orchestrator - wires the gate, buffer, resolver and sinks.
//!
//! The host feeds every raw keystroke to [`Session::handle_event`]; the
//! session admits it through the gate, mutates the buffer, and drives the
//! speech and render sinks plus the image resolver. Window-level control
//! combos (fullscreen, speed display) are returned to the host as
//! [`HostCommand`]s - the core does not manage windows.
//!
//! The gate and buffer stay responsive while a previous word's image
//! resolution is still in flight; overlapping resolutions are settled by
//! the resolver's supersession protocol.

use std::sync::Arc;

use crate::config::SharedConfig;
use crate::display::buffer::TypingBuffer;
use crate::display::render::RenderSink;
use crate::input::event::InputEvent;
use crate::input::gate::{Admission, AdmittedAction, ControlCommand, InputGate};
use crate::images::resolver::ImageResolver;
use crate::speech::SpeechSink;

// ---------------------------------------------------------------------------
// HostCommand
// ---------------------------------------------------------------------------

/// Requests the session hands back to the host shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCommand {
    /// Leave fullscreen mode.
    ExitFullscreen,
    /// Toggle the typing-speed readout.
    ToggleSpeedDisplay,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

pub struct Session {
    config: SharedConfig,
    gate: InputGate,
    buffer: TypingBuffer,
    resolver: Arc<ImageResolver>,
    speech: Arc<dyn SpeechSink>,
    render: Arc<dyn RenderSink>,
}

impl Session {
    pub fn new(
        config: SharedConfig,
        resolver: Arc<ImageResolver>,
        speech: Arc<dyn SpeechSink>,
        render: Arc<dyn RenderSink>,
    ) -> Self {
        let gate = InputGate::new(Arc::clone(&config));
        let session = Self {
            config,
            gate,
            buffer: TypingBuffer::new(),
            resolver,
            speech,
            render,
        };
        session.render_text();
        session.render.set_status("Type a letter to begin");
        session
    }

    /// Admit and dispatch one raw keystroke.
    ///
    /// Returns a [`HostCommand`] when the keystroke was a window-level
    /// combo the host must act on.
    pub async fn handle_event(&mut self, event: &InputEvent) -> Option<HostCommand> {
        let action = match self.gate.admit(event) {
            Admission::Admitted(action) => action,
            Admission::Suppressed(reason) => {
                log::debug!("suppressed keystroke: {reason:?}");
                return None;
            }
        };

        match action {
            AdmittedAction::Control(ControlCommand::ExitFullscreen) => {
                return Some(HostCommand::ExitFullscreen);
            }
            AdmittedAction::Control(ControlCommand::ToggleSpeedDisplay) => {
                return Some(HostCommand::ToggleSpeedDisplay);
            }
            AdmittedAction::Control(ControlCommand::ClearScreen) => {
                self.clear();
            }
            AdmittedAction::Backspace => {
                // Speak only when something was actually removed.
                if self.buffer.remove_character().is_some() {
                    self.speech.speak_system("backspace");
                }
                self.render_text();
            }
            AdmittedAction::Enter => {
                match self.buffer.commit_line() {
                    Some(word) => {
                        self.render_text();
                        self.word_completed(&word).await;
                    }
                    None => {
                        self.render_text();
                        self.speech.speak_system("new line");
                    }
                }
            }
            AdmittedAction::Space => {
                if let Some(word) = self.buffer.handle_space() {
                    self.render_text();
                    self.word_completed(&word).await;
                } else {
                    self.render_text();
                }
            }
            AdmittedAction::Character(c) => {
                self.buffer.add_character(c);
                self.speech.speak_letter(c);
                self.render_text();
            }
        }

        None
    }

    /// Word-boundary feedback: announce the word and resolve its image.
    async fn word_completed(&self, word: &str) {
        self.render
            .set_status(&format!("You typed: {}", word.to_uppercase()));
        self.speech.speak_word(word);
        self.resolver.resolve(word).await;
    }

    /// Clear the visible buffer and the image panel. Word history survives.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.resolver.show_default();
        self.render_text();
        self.render.set_status("Type a letter to begin");
        self.speech.speak_system("screen cleared");
    }

    /// Project the buffer through the render sink using the configured
    /// visible-line count.
    fn render_text(&self) {
        let max = self.config.read().unwrap().display.visible_lines;
        self.render
            .set_lines(self.buffer.visible_lines(max), self.buffer.current_line());
    }

    /// The typing buffer (and, through it, the session word history).
    pub fn buffer(&self) -> &TypingBuffer {
        &self.buffer
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
