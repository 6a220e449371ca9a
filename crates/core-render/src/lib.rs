//! The Append Buffer, the viewport/scroll model, and the renderer that
//! turns a `Document` plus editor state into one frame of terminal output.

pub mod append_buffer;
pub mod renderer;
pub mod status;
pub mod viewport;

pub use append_buffer::AppendBuffer;
pub use renderer::{FrameContext, render_frame};
pub use viewport::Viewport;
