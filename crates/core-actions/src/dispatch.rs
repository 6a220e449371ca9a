//! The Main Loop (SPEC_FULL.md §4.J): `refresh(); processKey()` each tick,
//! dispatching one logical key to an editing op, a movement, or one of the
//! save/find/quit commands.

use std::io::{Read, Write};

use tracing::warn;

use core_events::{BACKSPACE, CR, ESC, Key, ctrl_key};
use core_input::KeyDecoder;
use core_state::{Direction, Editor};

use crate::prompt::{find, save};
use crate::{ActionError, RenderOptions, render};

/// Number of consecutive `CTRL-Q` presses required to quit with unsaved
/// changes.
pub const QUIT_TIMES: u8 = 3;

enum Flow {
    Continue,
    Quit,
}

/// Runs the editor until a clean quit. Returns once the user has confirmed
/// quitting (or there was nothing to confirm).
pub fn run<R: Read, W: Write>(
    editor: &mut Editor,
    decoder: &mut KeyDecoder<R>,
    out: &mut W,
    opts: RenderOptions,
) -> Result<(), ActionError> {
    let mut quit_remaining = QUIT_TIMES;
    loop {
        render(editor, out, opts)?;
        let key = decoder.read_key()?;
        match process_key(editor, decoder, out, opts, key, &mut quit_remaining)? {
            Flow::Quit => return Ok(()),
            Flow::Continue => {}
        }
    }
}

fn process_key<R: Read, W: Write>(
    editor: &mut Editor,
    decoder: &mut KeyDecoder<R>,
    out: &mut W,
    opts: RenderOptions,
    key: Key,
    quit_remaining: &mut u8,
) -> Result<Flow, ActionError> {
    match key {
        Key::Byte(CR) => editor.insert_newline(),

        Key::Byte(b) if b == ctrl_key(b'q') => {
            if editor.dirty && *quit_remaining > 1 {
                *quit_remaining -= 1;
                warn!(remaining = *quit_remaining, "quit blocked by unsaved changes");
                editor.set_status(format!(
                    "File has unsaved changes. Press Ctrl-Q {} more time(s) to quit.",
                    *quit_remaining
                ));
                return Ok(Flow::Continue);
            }
            return Ok(Flow::Quit);
        }

        Key::Byte(b) if b == ctrl_key(b's') => save(editor, decoder, out, opts)?,
        Key::Byte(b) if b == ctrl_key(b'f') => find(editor, decoder, out, opts)?,

        Key::Home => editor.cx = 0,
        Key::End => {
            if editor.cy < editor.row_count() {
                editor.cx = editor.document.row(editor.cy).unwrap().len_chars();
            }
        }

        Key::Byte(b) if b == BACKSPACE || b == ctrl_key(b'h') => editor.delete_char(),
        Key::Delete => {
            editor.move_cursor(Direction::Right);
            editor.delete_char();
        }

        Key::PageUp | Key::PageDown => page_jump(editor, key),

        Key::ArrowLeft => editor.move_cursor(Direction::Left),
        Key::ArrowRight => editor.move_cursor(Direction::Right),
        Key::ArrowUp => editor.move_cursor(Direction::Up),
        Key::ArrowDown => editor.move_cursor(Direction::Down),

        Key::Byte(b) if b == ctrl_key(b'l') || b == ESC => {}

        Key::Byte(b) => editor.insert_char(b),
    }

    *quit_remaining = QUIT_TIMES;
    Ok(Flow::Continue)
}

/// `PAGE_UP`/`PAGE_DOWN` (§4.J): jump to the top or bottom of the current
/// screen, then replay `termRows` single-line moves through `moveCursor` so
/// clamping and end-of-row snapping are reused rather than duplicated.
fn page_jump(editor: &mut Editor, key: Key) {
    let direction = match key {
        Key::PageUp => {
            editor.cy = editor.viewport.row_offset;
            Direction::Up
        }
        Key::PageDown => {
            editor.cy = (editor.viewport.row_offset + editor.term_rows.saturating_sub(1))
                .min(editor.row_count());
            Direction::Down
        }
        _ => unreachable!("page_jump only called for PageUp/PageDown"),
    };
    for _ in 0..editor.term_rows {
        editor.move_cursor(direction);
    }
}
