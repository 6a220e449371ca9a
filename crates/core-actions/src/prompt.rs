//! The Prompt/Find sub-loop (SPEC_FULL.md §4.I): a modal mini-loop that
//! grows a byte buffer one key at a time, rendering a frame between each
//! read, exiting on `ESC` (cancel) or `CR` (commit on a non-empty buffer).

use std::io::{Read, Write};

use core_events::{BACKSPACE, CR, ESC, Key, ctrl_key};
use core_input::KeyDecoder;
use core_state::{Editor, EditorError, FindState};

use crate::{ActionError, RenderOptions, render};

/// Runs the prompt mini-loop. `callback`, if it does anything, is invoked
/// after every key (including `ESC`/`CR`) with the buffer as it stood at
/// that point and the key that produced it. This is the capability
/// interface SPEC_FULL.md §9 calls for in place of the source's raw
/// function-pointer callback; the find state lives in the closure's
/// environment rather than in static storage.
pub fn prompt<R: Read, W: Write>(
    editor: &mut Editor,
    decoder: &mut KeyDecoder<R>,
    out: &mut W,
    opts: RenderOptions,
    format: &str,
    mut callback: impl FnMut(&mut Editor, &[u8], Key),
) -> Result<Option<Vec<u8>>, ActionError> {
    let mut buf: Vec<u8> = Vec::with_capacity(128);
    loop {
        let shown = String::from_utf8_lossy(&buf);
        editor.set_status(format.replacen("{}", &shown, 1));
        render(editor, out, opts)?;

        let key = decoder.read_key()?;
        match key {
            Key::Byte(b) if b == BACKSPACE || b == ctrl_key(b'h') => {
                buf.pop();
            }
            Key::Delete => {
                buf.pop();
            }
            Key::Byte(ESC) => {
                editor.status_msg = None;
                callback(editor, &buf, key);
                return Ok(None);
            }
            Key::Byte(CR) => {
                if !buf.is_empty() {
                    editor.status_msg = None;
                    callback(editor, &buf, key);
                    return Ok(Some(buf));
                }
            }
            Key::Byte(b) if key.is_printable_ascii() => {
                buf.push(b);
            }
            _ => {}
        }
        callback(editor, &buf, key);
    }
}

/// `find()` (§4.I): an incremental search built on [`prompt`]. Snapshots the
/// cursor and viewport so a cancelled search restores them exactly.
pub fn find<R: Read, W: Write>(
    editor: &mut Editor,
    decoder: &mut KeyDecoder<R>,
    out: &mut W,
    opts: RenderOptions,
) -> Result<(), ActionError> {
    let saved_cx = editor.cx;
    let saved_cy = editor.cy;
    let saved_viewport = editor.viewport;
    let mut find_state = FindState::new();

    let result = prompt(
        editor,
        decoder,
        out,
        opts,
        "Search: {} (ESC/Enter to cancel, arrows to navigate)",
        |editor, buf, key| {
            match key {
                Key::Byte(CR) | Key::Byte(ESC) => {
                    editor.restore_find_highlight(&mut find_state);
                    find_state.reset();
                    return;
                }
                Key::ArrowRight | Key::ArrowDown => find_state.direction = 1,
                Key::ArrowLeft | Key::ArrowUp => find_state.direction = -1,
                _ => find_state.reset(),
            }
            editor.find_step(&mut find_state, buf);
        },
    )?;

    if result.is_none() {
        editor.cx = saved_cx;
        editor.cy = saved_cy;
        editor.viewport = saved_viewport;
    }
    Ok(())
}

/// `save()` (§4.F): prompts for a filename when none is set, then writes the
/// document. A save failure (including a cancelled filename prompt) is
/// recoverable-user: it becomes a status message, not a propagated error.
pub fn save<R: Read, W: Write>(
    editor: &mut Editor,
    decoder: &mut KeyDecoder<R>,
    out: &mut W,
    opts: RenderOptions,
) -> Result<(), ActionError> {
    if editor.filename.is_none() {
        let name = prompt(editor, decoder, out, opts, "Save as: {}", |_, _, _| {})?;
        let Some(name) = name else {
            editor.set_status("Save aborted");
            return Ok(());
        };
        editor.set_filename(String::from_utf8_lossy(&name).into_owned());
    }

    match editor.save() {
        Ok(bytes) => editor.set_status(format!("{bytes} bytes written to disk")),
        Err(EditorError::Io { source, .. }) => {
            editor.set_status(format!("Cannot save file: {source}"))
        }
        Err(err) => editor.set_status(format!("Cannot save file: {err}")),
    }
    Ok(())
}
