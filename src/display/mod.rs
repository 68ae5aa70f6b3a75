//! Text display model: the typing buffer, the session word history, and the
//! render-sink interface the surrounding shell implements.

pub mod buffer;
pub mod history;
pub mod render;

pub use buffer::TypingBuffer;
pub use history::{WordHistory, WordHistoryEntry};
pub use render::{ImageState, RenderSink};
