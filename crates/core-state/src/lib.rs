//! The editor's owning aggregate: cursor, viewport, document and the small
//! bits of bookkeeping (filename, dirty flag, status message, syntax rule)
//! that together make up "the" editor state. Everything here is plain data
//! plus the operations that mutate it in place. No interactive I/O, no
//! terminal handling, no key decoding.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, warn};

use core_render::Viewport;
use core_syntax::{SyntaxRule, rehighlight_all, select_syntax, update_syntax};
use core_text::{Document, Highlight};

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("io error for {path:?}: {source}")]
    Io {
        #[source]
        source: io::Error,
        path: Option<PathBuf>,
    },
    #[error("no filename set")]
    NoFilename,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

/// The editor's single owning aggregate, passed by reference through every
/// core operation (see SPEC_FULL.md §9 on replacing global state).
pub struct Editor {
    pub document: Document,
    pub cx: usize,
    pub cy: usize,
    pub rx: usize,
    pub viewport: Viewport,
    pub term_rows: usize,
    pub term_cols: usize,
    pub filename: Option<String>,
    pub syntax: Option<&'static SyntaxRule>,
    pub dirty: bool,
    pub status_msg: Option<String>,
    pub status_msg_time: Instant,
    pub tab_stop: usize,
}

impl Editor {
    pub fn new(term_rows: usize, term_cols: usize, tab_stop: usize) -> Self {
        Self {
            document: Document::new(),
            cx: 0,
            cy: 0,
            rx: 0,
            viewport: Viewport::new(),
            term_rows,
            term_cols,
            filename: None,
            syntax: None,
            dirty: false,
            status_msg: None,
            status_msg_time: Instant::now(),
            tab_stop,
        }
    }

    pub fn row_count(&self) -> usize {
        self.document.row_count()
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_msg = Some(message.into());
        self.status_msg_time = Instant::now();
    }

    pub fn status_message_age(&self) -> Duration {
        self.status_msg_time.elapsed()
    }

    fn highlight_row(&mut self, at: usize) {
        if let Some(row) = self.document.row_mut(at) {
            update_syntax(row, self.syntax);
        }
    }

    /// `selectSyntax` (§4.D): runs whenever `filename` changes, re-highlighting
    /// every existing row against the newly resolved rule (or `NORMAL` if none
    /// matches).
    fn resolve_syntax(&mut self) {
        self.syntax = self.filename.as_deref().and_then(select_syntax);
        rehighlight_all(&mut self.document, self.syntax);
    }

    pub fn set_filename(&mut self, filename: String) {
        self.filename = Some(filename);
        self.resolve_syntax();
    }

    /// `open(filename)` (§4.F): replaces the document, resolves syntax, and
    /// clears `dirty`. A read failure is fatal by design (§7), propagated to
    /// the caller rather than swallowed.
    pub fn open(&mut self, path: &Path) -> Result<(), EditorError> {
        let bytes = fs::read(path).map_err(|source| {
            warn!(path = %path.display(), error = %source, "open failed");
            EditorError::Io {
                source,
                path: Some(path.to_path_buf()),
            }
        })?;

        let mut lines: Vec<&[u8]> = if bytes.is_empty() {
            Vec::new()
        } else {
            bytes.split(|&b| b == b'\n').collect()
        };
        if lines.last().is_some_and(|l| l.is_empty()) && lines.len() > 1 {
            lines.pop();
        }

        self.document = Document::new();
        for line in lines {
            let mut owned = line.to_vec();
            if owned.last() == Some(&b'\r') {
                owned.pop();
            }
            self.document
                .insert_row(self.document.row_count(), owned, self.tab_stop);
        }

        self.filename = Some(path.to_string_lossy().into_owned());
        self.resolve_syntax();

        self.cx = 0;
        self.cy = 0;
        self.viewport = Viewport::new();
        self.dirty = false;
        debug!(path = %path.display(), rows = self.document.row_count(), "opened file");
        Ok(())
    }

    /// `save()` (§4.F), minus the "no filename" prompt dance: the caller
    /// (the prompt-aware orchestration in `core-actions`) is responsible for
    /// calling [`Editor::set_filename`] first when `filename` is `None`.
    /// Serializes every row followed by `\n`, including after the last row.
    pub fn save(&mut self) -> Result<usize, EditorError> {
        let filename = self.filename.clone().ok_or(EditorError::NoFilename)?;
        let mut out = Vec::new();
        for row in self.document.rows() {
            out.extend_from_slice(row.chars());
            out.push(b'\n');
        }
        fs::write(&filename, &out).map_err(|source| {
            warn!(path = %filename, error = %source, "save failed");
            EditorError::Io {
                source,
                path: Some(PathBuf::from(&filename)),
            }
        })?;
        self.dirty = false;
        debug!(path = %filename, bytes = out.len(), "saved file");
        Ok(out.len())
    }

    /// `insertChar(byte)` (§4.E).
    pub fn insert_char(&mut self, byte: u8) {
        if self.cy == self.row_count() {
            self.document.insert_row(self.cy, Vec::new(), self.tab_stop);
        }
        self.document
            .insert_char_in_row(self.cy, self.cx, byte, self.tab_stop);
        self.cx += 1;
        self.highlight_row(self.cy);
        self.dirty = true;
    }

    /// `insertNewline()` (§4.E).
    pub fn insert_newline(&mut self) {
        if self.cx == 0 {
            self.document.insert_row(self.cy, Vec::new(), self.tab_stop);
        } else {
            let tail = self.document.row(self.cy).unwrap().chars()[self.cx..].to_vec();
            self.document.truncate_row(self.cy, self.cx, self.tab_stop);
            self.document.insert_row(self.cy + 1, tail, self.tab_stop);
            self.highlight_row(self.cy);
            self.highlight_row(self.cy + 1);
        }
        self.cy += 1;
        self.cx = 0;
        self.dirty = true;
    }

    /// `deleteChar()` (§4.E): deletes the byte left of the cursor.
    pub fn delete_char(&mut self) {
        if self.cy == self.row_count() {
            return;
        }
        if self.cx == 0 && self.cy == 0 {
            return;
        }

        if self.cx > 0 {
            self.document
                .delete_char_in_row(self.cy, self.cx - 1, self.tab_stop);
            self.cx -= 1;
            self.highlight_row(self.cy);
        } else {
            let prev_len = self.document.row(self.cy - 1).unwrap().len_chars();
            let tail = self.document.row(self.cy).unwrap().chars().to_vec();
            self.document
                .append_bytes_to_row(self.cy - 1, &tail, self.tab_stop);
            self.document.delete_row(self.cy);
            self.cy -= 1;
            self.cx = prev_len;
            self.highlight_row(self.cy);
        }
        self.dirty = true;
    }

    /// `moveCursor(key)` (§4.J): applies the movement then snaps `cx` down to
    /// the (possibly shorter) new row's length.
    pub fn move_cursor(&mut self, direction: Direction) {
        let row_count = self.row_count();
        match direction {
            Direction::Left => {
                if self.cx > 0 {
                    self.cx -= 1;
                } else if self.cy > 0 {
                    self.cy -= 1;
                    self.cx = self.document.row(self.cy).map_or(0, |r| r.len_chars());
                }
            }
            Direction::Right => {
                let row_len = self.document.row(self.cy).map_or(0, |r| r.len_chars());
                if self.cy < row_count && self.cx < row_len {
                    self.cx += 1;
                } else if self.cy < row_count {
                    self.cy += 1;
                    self.cx = 0;
                }
            }
            Direction::Up => self.cy = self.cy.saturating_sub(1),
            Direction::Down => {
                if self.cy < row_count {
                    self.cy += 1;
                }
            }
        }

        let row_len = self.document.row(self.cy).map_or(0, |r| r.len_chars());
        if self.cx > row_len {
            self.cx = row_len;
        }
    }

    fn recompute_rx(&mut self) {
        self.rx = match self.document.row(self.cy) {
            Some(row) => row.cx_to_rx(self.cx, self.tab_stop),
            None => 0,
        };
    }

    /// `scroll()` (§4.G): recomputes `rx` then slides the viewport just
    /// enough to keep the cursor visible.
    pub fn scroll(&mut self) {
        self.recompute_rx();
        self.viewport
            .scroll(self.cy, self.rx, self.term_rows, self.term_cols);
    }
}

/// Incremental-search state threaded through the prompt callback (§4.I),
/// held by the caller of `find()` rather than in static storage.
pub struct FindState {
    pub last_match: i64,
    pub direction: i32,
    pub saved_highlight_line: Option<usize>,
    pub saved_highlight: Option<Vec<Highlight>>,
}

impl Default for FindState {
    fn default() -> Self {
        Self::new()
    }
}

impl FindState {
    pub fn new() -> Self {
        Self {
            last_match: -1,
            direction: 1,
            saved_highlight_line: None,
            saved_highlight: None,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

impl Editor {
    /// Restores the highlight row that the last `find_step` call
    /// overwrote with `Highlight::Match`, if any. Called at the start of
    /// every `find_step`, and must also be called directly on commit or
    /// cancel of a search, since the last match would otherwise stay
    /// marked forever.
    pub fn restore_find_highlight(&mut self, find: &mut FindState) {
        if let Some(line) = find.saved_highlight_line.take() {
            if let (Some(saved), Some(row)) =
                (find.saved_highlight.take(), self.document.row_mut(line))
            {
                row.highlight = saved;
            }
        }
    }

    /// One step of the incremental search (§4.I): restores the previous
    /// match's highlight, then searches from `find.last_match` in
    /// `find.direction`, wrapping around the document, for `query`.
    pub fn find_step(&mut self, find: &mut FindState, query: &[u8]) {
        self.restore_find_highlight(find);

        if query.is_empty() {
            return;
        }
        let row_count = self.row_count() as i64;
        if row_count == 0 {
            return;
        }

        let mut current = find.last_match;
        for _ in 0..row_count {
            current += find.direction as i64;
            if current == -1 {
                current = row_count - 1;
            } else if current == row_count {
                current = 0;
            }
            let row_idx = current as usize;
            let row = self.document.row(row_idx).unwrap();
            let Some(pos) = find_subslice(&row.render, query) else {
                continue;
            };

            find.last_match = current;
            self.cy = row_idx;
            self.cx = row.rx_to_cx(pos, self.tab_stop);
            self.viewport.row_offset = self.row_count();

            find.saved_highlight_line = Some(row_idx);
            find.saved_highlight = Some(row.highlight.clone());
            let row = self.document.row_mut(row_idx).unwrap();
            for h in row.highlight[pos..pos + query.len()].iter_mut() {
                *h = Highlight::Match;
            }
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor_with_rows(rows: &[&str]) -> Editor {
        let mut ed = Editor::new(24, 80, 8);
        for (i, row) in rows.iter().enumerate() {
            ed.document.insert_row(i, row.as_bytes().to_vec(), ed.tab_stop);
        }
        ed
    }

    #[test]
    fn typing_abc_builds_one_row_and_marks_dirty() {
        let mut ed = Editor::new(24, 80, 8);
        for b in b"abc" {
            ed.insert_char(*b);
        }
        assert_eq!(ed.document.row(0).unwrap().chars(), b"abc");
        assert!(ed.dirty);
        assert_eq!((ed.cx, ed.cy), (3, 0));
    }

    #[test]
    fn newline_splits_row_at_cursor() {
        let mut ed = Editor::new(24, 80, 8);
        ed.insert_char(b'a');
        ed.insert_char(b'b');
        ed.insert_newline();
        ed.insert_char(b'c');
        assert_eq!(ed.document.row(0).unwrap().chars(), b"ab");
        assert_eq!(ed.document.row(1).unwrap().chars(), b"c");
        assert_eq!((ed.cx, ed.cy), (1, 1));
    }

    #[test]
    fn end_key_then_backspace() {
        let mut ed = editor_with_rows(&["hello"]);
        ed.cx = ed.document.row(0).unwrap().len_chars();
        assert_eq!(ed.cx, 5);
        ed.delete_char();
        assert_eq!(ed.document.row(0).unwrap().chars(), b"hell");
        assert_eq!(ed.cx, 4);
    }

    #[test]
    fn delete_at_origin_is_a_no_op() {
        let mut ed = editor_with_rows(&["hello"]);
        ed.delete_char();
        assert_eq!(ed.document.row(0).unwrap().chars(), b"hello");
        assert_eq!((ed.cx, ed.cy), (0, 0));
    }

    #[test]
    fn backspace_at_row_start_merges_with_previous_row() {
        let mut ed = editor_with_rows(&["ab", "cd"]);
        ed.cy = 1;
        ed.cx = 0;
        ed.delete_char();
        assert_eq!(ed.row_count(), 1);
        assert_eq!(ed.document.row(0).unwrap().chars(), b"abcd");
        assert_eq!((ed.cx, ed.cy), (2, 0));
    }

    #[test]
    fn split_then_merge_restores_original_row_and_cursor() {
        let mut ed = editor_with_rows(&["hello world"]);
        ed.cx = 5;
        ed.cy = 0;
        ed.insert_newline();
        ed.delete_char();
        assert_eq!(ed.row_count(), 1);
        assert_eq!(ed.document.row(0).unwrap().chars(), b"hello world");
        assert_eq!((ed.cx, ed.cy), (5, 0));
    }

    #[test]
    fn right_arrow_at_row_end_wraps_to_next_row() {
        let mut ed = editor_with_rows(&["ab", "cd"]);
        ed.cx = 2;
        ed.cy = 0;
        ed.move_cursor(Direction::Right);
        assert_eq!((ed.cx, ed.cy), (0, 1));
    }

    #[test]
    fn left_arrow_at_column_zero_wraps_to_previous_row_end() {
        let mut ed = editor_with_rows(&["ab", "cd"]);
        ed.cx = 0;
        ed.cy = 1;
        ed.move_cursor(Direction::Left);
        assert_eq!((ed.cx, ed.cy), (2, 0));
    }

    #[test]
    fn up_arrow_at_top_is_a_no_op() {
        let mut ed = editor_with_rows(&["ab"]);
        ed.move_cursor(Direction::Up);
        assert_eq!((ed.cx, ed.cy), (0, 0));
    }

    #[test]
    fn moving_to_a_shorter_row_snaps_cx_down() {
        let mut ed = editor_with_rows(&["hello", "hi"]);
        ed.cx = 5;
        ed.cy = 0;
        ed.move_cursor(Direction::Down);
        assert_eq!((ed.cx, ed.cy), (2, 1));
    }

    #[test]
    fn scroll_keeps_cursor_within_viewport() {
        let mut ed = Editor::new(3, 80, 8);
        for i in 0..10 {
            ed.document
                .insert_row(i, format!("row{i}").into_bytes(), ed.tab_stop);
        }
        ed.cy = 9;
        ed.scroll();
        assert_eq!(ed.viewport.row_offset, 7);
    }

    #[test]
    fn find_step_marks_first_match_and_recenters() {
        let mut ed = editor_with_rows(&["foo", "food"]);
        let mut find = FindState::new();
        ed.find_step(&mut find, b"foo");
        assert_eq!((ed.cx, ed.cy), (0, 0));
        assert_eq!(find.last_match, 0);
        assert!(
            ed.document.row(0).unwrap().highlight[..3]
                .iter()
                .all(|&h| h == Highlight::Match)
        );
    }

    #[test]
    fn find_step_advances_on_next_call_with_same_direction() {
        let mut ed = editor_with_rows(&["foo", "food"]);
        let mut find = FindState::new();
        ed.find_step(&mut find, b"foo");
        ed.find_step(&mut find, b"foo");
        assert_eq!(ed.cy, 1);
    }

    #[test]
    fn find_step_restores_previous_highlight_before_next_search() {
        let mut ed = editor_with_rows(&["foo", "food"]);
        let mut find = FindState::new();
        ed.find_step(&mut find, b"foo");
        ed.find_step(&mut find, b"foo");
        assert!(
            ed.document.row(0).unwrap().highlight[..3]
                .iter()
                .all(|&h| h == Highlight::Normal)
        );
    }

    #[test]
    fn open_missing_file_is_an_error() {
        let mut ed = Editor::new(24, 80, 8);
        let err = ed.open(Path::new("/nonexistent/path/does/not/exist.txt"));
        assert!(err.is_err());
    }

    #[test]
    fn save_without_filename_errors() {
        let mut ed = editor_with_rows(&["a"]);
        assert!(matches!(ed.save(), Err(EditorError::NoFilename)));
    }

    #[test]
    fn open_then_save_round_trips_rows() {
        let dir = tempdir();
        let path = dir.join("round_trip.txt");
        fs::write(&path, b"alpha\nbeta\n").unwrap();

        let mut ed = Editor::new(24, 80, 8);
        ed.open(&path).unwrap();
        assert!(!ed.dirty);
        assert_eq!(ed.document.row(0).unwrap().chars(), b"alpha");
        assert_eq!(ed.document.row(1).unwrap().chars(), b"beta");

        ed.insert_char(b'!');
        let written = ed.save().unwrap();
        assert!(!ed.dirty);

        let roundtrip = fs::read(&path).unwrap();
        assert_eq!(roundtrip.len(), written);

        let mut reopened = Editor::new(24, 80, 8);
        reopened.open(&path).unwrap();
        assert_eq!(reopened.row_count(), 2);
    }

    fn tempdir() -> PathBuf {
        let mut dir = std::env::temp_dir();
        dir.push(format!("core-state-test-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }
}
