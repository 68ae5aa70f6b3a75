//! Keystroke input: raw events, admission control and classification.
//!
//! The host feeds every raw keystroke to [`InputGate::admit`] and dispatches
//! the returned [`AdmittedAction`] (usually via
//! [`Session::handle_event`](crate::session::Session::handle_event)).
//! Suppressed events have no effect anywhere - the gate is the single place
//! where rate limiting and key classification happen.

pub mod event;
pub mod gate;

pub use event::{InputEvent, Key, Modifiers};
pub use gate::{Admission, AdmittedAction, ControlCommand, InputGate, SuppressReason};
