//! The interactive glue: the Prompt/Find sub-loop and the Main Loop's key
//! dispatch, built on top of `core-state`'s pure editor operations. This is
//! the only crate that reads keys and writes frames, so it is the only one
//! generic over an `io::Read`/`io::Write` pair.

mod dispatch;
mod prompt;

pub use dispatch::{QUIT_TIMES, run};
pub use prompt::{find, prompt as prompt_for, save};

use std::io;
use std::time::Duration;

use thiserror::Error;

use core_input::DecodeError;
use core_render::{AppendBuffer, FrameContext, render_frame};
use core_state::Editor;

/// The only two ways dispatching a key or running the prompt loop can fail:
/// the underlying reader errored, or writing a frame errored. Both are
/// fatal-system per the error taxonomy; recoverable conditions (a failed
/// save, a cancelled prompt) are expressed as a status message instead.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub version: &'static str,
    pub status_timeout: Duration,
}

pub(crate) fn render<W: io::Write>(
    editor: &mut Editor,
    out: &mut W,
    opts: RenderOptions,
) -> io::Result<()> {
    editor.scroll();
    let ctx = FrameContext {
        document: &editor.document,
        viewport: &editor.viewport,
        term_rows: editor.term_rows,
        term_cols: editor.term_cols,
        cx: editor.cx,
        cy: editor.cy,
        rx: editor.rx,
        file_name: editor.filename.as_deref(),
        file_type: editor.syntax.map(|s| s.file_type),
        dirty: editor.dirty,
        status_message: editor.status_msg.as_deref(),
        status_message_age: editor.status_message_age(),
        status_timeout: opts.status_timeout,
        version: opts.version,
    };
    let mut buf = AppendBuffer::new();
    render_frame(&ctx, &mut buf)?;
    buf.release(out)
}
