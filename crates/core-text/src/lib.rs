//! Row and document model: the editor treats text as raw bytes, not
//! graphemes. One byte is one terminal cell. There is no unicode
//! segmentation here.

/// Highlight class assigned to a single rendered byte. Computed by `core-syntax`,
/// stored alongside [`Row::render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    Normal,
    Comment,
    Keyword1,
    Keyword2,
    String,
    Number,
    Match,
}

/// One logical line. `chars` never contains `\n` or `\r`.
///
/// `render` and `highlight` are derived from `chars` and are always kept the
/// same length; both are regenerated by [`Row::update_render`] (which
/// recomputes `render`) and the syntax pass in `core-syntax` (which fills
/// `highlight`).
#[derive(Debug, Clone)]
pub struct Row {
    chars: Vec<u8>,
    pub render: Vec<u8>,
    pub highlight: Vec<Highlight>,
}

impl Row {
    pub fn new(chars: Vec<u8>, tab_stop: usize) -> Self {
        let mut row = Self {
            chars,
            render: Vec::new(),
            highlight: Vec::new(),
        };
        row.update_render(tab_stop);
        row
    }

    pub fn chars(&self) -> &[u8] {
        &self.chars
    }

    pub fn len_chars(&self) -> usize {
        self.chars.len()
    }

    /// Regenerate `render` from `chars`, expanding tabs so the next character
    /// lands on a multiple of `tab_stop`. Resets `highlight` to all-`Normal`
    /// at the new length; callers that care about syntax colors must re-run
    /// the highlighter afterward.
    pub fn update_render(&mut self, tab_stop: usize) {
        self.render.clear();
        for &b in &self.chars {
            if b == b'\t' {
                self.render.push(b' ');
                while self.render.len() % tab_stop.max(1) != 0 {
                    self.render.push(b' ');
                }
            } else {
                self.render.push(b);
            }
        }
        self.highlight = vec![Highlight::Normal; self.render.len()];
    }

    /// Render-coordinate column for `chars[0..cx)`.
    pub fn cx_to_rx(&self, cx: usize, tab_stop: usize) -> usize {
        let tab_stop = tab_stop.max(1);
        let mut rx = 0usize;
        for &b in &self.chars[..cx.min(self.chars.len())] {
            if b == b'\t' {
                rx += tab_stop - (rx % tab_stop);
            } else {
                rx += 1;
            }
        }
        rx
    }

    /// Inverse of [`Row::cx_to_rx`]: the largest `cx` whose render column does
    /// not exceed `rx`, saturating at `len_chars()`.
    pub fn rx_to_cx(&self, rx: usize, tab_stop: usize) -> usize {
        let tab_stop = tab_stop.max(1);
        let mut cur_rx = 0usize;
        for (cx, &b) in self.chars.iter().enumerate() {
            let next_rx = if b == b'\t' {
                cur_rx + (tab_stop - (cur_rx % tab_stop))
            } else {
                cur_rx + 1
            };
            if next_rx > rx {
                return cx;
            }
            cur_rx = next_rx;
        }
        self.chars.len()
    }
}

/// A byte counts as a separator for keyword/number boundary detection:
/// whitespace, NUL, or one of `,.()+-/*=~%<>[];`.
pub fn is_separator(b: u8) -> bool {
    b.is_ascii_whitespace() || b == 0 || b",.()+-/*=~%<>[];".contains(&b)
}

/// Ordered collection of rows, owned by the editor. Structural edits
/// (insert/delete row, insert/delete/append within a row) live here;
/// cursor and viewport state live one layer up in `core-state`.
#[derive(Debug, Clone, Default)]
pub struct Document {
    rows: Vec<Row>,
}

impl Document {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, at: usize) -> Option<&Row> {
        self.rows.get(at)
    }

    pub fn row_mut(&mut self, at: usize) -> Option<&mut Row> {
        self.rows.get_mut(at)
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Splice a new row at `at`, which must be in `[0, row_count()]`.
    pub fn insert_row(&mut self, at: usize, chars: Vec<u8>, tab_stop: usize) {
        self.rows.insert(at, Row::new(chars, tab_stop));
    }

    /// Splice out the row at `at`, which must be in `[0, row_count())`.
    pub fn delete_row(&mut self, at: usize) {
        self.rows.remove(at);
    }

    /// Insert one byte into `rows[row].chars` at `at` and regenerate `render`.
    pub fn insert_char_in_row(&mut self, row: usize, at: usize, byte: u8, tab_stop: usize) {
        let r = &mut self.rows[row];
        r.chars.insert(at, byte);
        r.update_render(tab_stop);
    }

    /// Append `bytes` to the end of `rows[row].chars` and regenerate `render`.
    pub fn append_bytes_to_row(&mut self, row: usize, bytes: &[u8], tab_stop: usize) {
        let r = &mut self.rows[row];
        r.chars.extend_from_slice(bytes);
        r.update_render(tab_stop);
    }

    /// Remove the byte at `at` from `rows[row].chars` and regenerate `render`.
    pub fn delete_char_in_row(&mut self, row: usize, at: usize, tab_stop: usize) {
        let r = &mut self.rows[row];
        r.chars.remove(at);
        r.update_render(tab_stop);
    }

    /// Truncate `rows[row].chars` to `len` bytes and regenerate `render`.
    /// Used when splitting a row at the cursor for `insertNewline`.
    pub fn truncate_row(&mut self, row: usize, len: usize, tab_stop: usize) {
        let r = &mut self.rows[row];
        r.chars.truncate(len);
        r.update_render(tab_stop);
    }
}
