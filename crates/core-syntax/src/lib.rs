//! Static syntax rule table and the per-row highlighting pass.
//!
//! Highlighting is a pure function of a row's `render` bytes and the
//! currently selected [`SyntaxRule`]; nothing here owns the document.

use bitflags::bitflags;
use core_text::{Highlight, Row, is_separator};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SyntaxFlags: u8 {
        const HIGHLIGHT_NUMBERS = 0b01;
        const HIGHLIGHT_STRINGS = 0b10;
    }
}

/// One entry in the static file-type table. `keywords` entries ending in `|`
/// are "secondary" keywords (rendered as [`Highlight::Keyword2`]).
pub struct SyntaxRule {
    pub file_type: &'static str,
    pub file_match: &'static [&'static str],
    pub keywords: &'static [&'static str],
    pub single_line_comment: Option<&'static str>,
    pub flags: SyntaxFlags,
}

const C_KEYWORDS: &[&str] = &[
    "switch", "if", "while", "for", "break", "continue", "return", "else", "struct", "union",
    "typedef", "static", "enum", "class", "case", "int|", "long|", "double|", "float|", "char|",
    "unsigned|", "signed|", "void|",
];

const RUST_KEYWORDS: &[&str] = &[
    "fn", "let", "mut", "if", "else", "match", "loop", "while", "for", "in", "return", "break",
    "continue", "struct", "enum", "impl", "trait", "pub", "use", "mod", "const", "static", "move",
    "ref", "self", "Self", "as", "dyn", "where", "unsafe", "i8|", "i16|", "i32|", "i64|", "isize|",
    "u8|", "u16|", "u32|", "u64|", "usize|", "f32|", "f64|", "bool|", "char|", "str|", "String|",
];

/// The static table consulted by [`select_syntax`]. Order matters only in
/// that the first matching entry wins.
pub static SYNTAX_DATABASE: &[SyntaxRule] = &[
    SyntaxRule {
        file_type: "c",
        file_match: &[".c", ".h", ".cpp"],
        keywords: C_KEYWORDS,
        single_line_comment: Some("//"),
        flags: SyntaxFlags::HIGHLIGHT_NUMBERS.union(SyntaxFlags::HIGHLIGHT_STRINGS),
    },
    SyntaxRule {
        file_type: "rust",
        file_match: &[".rs"],
        keywords: RUST_KEYWORDS,
        single_line_comment: Some("//"),
        flags: SyntaxFlags::HIGHLIGHT_NUMBERS.union(SyntaxFlags::HIGHLIGHT_STRINGS),
    },
];

/// Resolve a syntax rule for `filename`: a pattern starting with `.` matches a
/// suffix, anything else matches as a substring. Returns the first match.
pub fn select_syntax(filename: &str) -> Option<&'static SyntaxRule> {
    SYNTAX_DATABASE.iter().find(|rule| {
        rule.file_match.iter().any(|pat| {
            if let Some(ext) = pat.strip_prefix('.') {
                filename.ends_with(&format!(".{ext}"))
            } else {
                filename.contains(pat)
            }
        })
    })
}

/// Foreground SGR parameter for a highlight class.
pub fn color_for(h: Highlight) -> u8 {
    match h {
        Highlight::Comment => 36,
        Highlight::Keyword1 => 33,
        Highlight::Keyword2 => 32,
        Highlight::String => 35,
        Highlight::Number => 31,
        Highlight::Match => 34,
        Highlight::Normal => 37,
    }
}

/// Recompute `row.highlight` in place from `row.render`, per the rule table
/// entry `syntax` (or leave the row all-`Normal` if `syntax` is `None`).
pub fn update_syntax(row: &mut Row, syntax: Option<&SyntaxRule>) {
    let len = row.render.len();
    row.highlight = vec![Highlight::Normal; len];
    let Some(syntax) = syntax else { return };

    let render = row.render.clone();
    let mut i = 0usize;
    let mut prev_is_sep = true;
    let mut in_string: Option<u8> = None;

    while i < len {
        let b = render[i];
        let prev_hl = if i > 0 { row.highlight[i - 1] } else { Highlight::Normal };

        if in_string.is_none() {
            if let Some(comment) = syntax.single_line_comment {
                let cb = comment.as_bytes();
                if !cb.is_empty() && render[i..].starts_with(cb) {
                    for h in &mut row.highlight[i..len] {
                        *h = Highlight::Comment;
                    }
                    break;
                }
            }
        }

        if syntax.flags.contains(SyntaxFlags::HIGHLIGHT_STRINGS) {
            if let Some(delim) = in_string {
                row.highlight[i] = Highlight::String;
                if b == b'\\' && i + 1 < len {
                    row.highlight[i + 1] = Highlight::String;
                    i += 2;
                    continue;
                }
                if b == delim {
                    in_string = None;
                }
                i += 1;
                prev_is_sep = true;
                continue;
            } else if b == b'"' || b == b'\'' {
                in_string = Some(b);
                row.highlight[i] = Highlight::String;
                i += 1;
                continue;
            }
        }

        if syntax.flags.contains(SyntaxFlags::HIGHLIGHT_NUMBERS)
            && ((b.is_ascii_digit() && (prev_is_sep || prev_hl == Highlight::Number))
                || (b == b'.' && prev_hl == Highlight::Number))
        {
            row.highlight[i] = Highlight::Number;
            i += 1;
            prev_is_sep = false;
            continue;
        }

        if prev_is_sep {
            if let Some((kw_len, secondary)) = match_keyword(&render[i..], syntax.keywords) {
                let class = if secondary { Highlight::Keyword2 } else { Highlight::Keyword1 };
                for h in &mut row.highlight[i..i + kw_len] {
                    *h = class;
                }
                i += kw_len;
                prev_is_sep = false;
                continue;
            }
        }

        row.highlight[i] = Highlight::Normal;
        prev_is_sep = is_separator(b);
        i += 1;
    }
}

/// Try each keyword against `rest`; a match requires the keyword text (with
/// any trailing `|` stripped) as a prefix followed by a separator (or end of
/// input). Returns the matched length and whether it was a secondary keyword.
fn match_keyword(rest: &[u8], keywords: &[&str]) -> Option<(usize, bool)> {
    for kw in keywords {
        let (text, secondary) = match kw.strip_suffix('|') {
            Some(stripped) => (stripped, true),
            None => (*kw, false),
        };
        let text = text.as_bytes();
        if rest.len() < text.len() || &rest[..text.len()] != text {
            continue;
        }
        let boundary_ok = match rest.get(text.len()) {
            None => true,
            Some(&b) => is_separator(b),
        };
        if boundary_ok {
            return Some((text.len(), secondary));
        }
    }
    None
}

/// Re-run [`update_syntax`] over every row, e.g. after [`select_syntax`] picks
/// (or changes) the active rule.
pub fn rehighlight_all(doc: &mut core_text::Document, syntax: Option<&SyntaxRule>) {
    for i in 0..doc.row_count() {
        if let Some(row) = doc.row_mut(i) {
            update_syntax(row, syntax);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_text::Document;

    #[test]
    fn select_syntax_matches_suffix() {
        let rule = select_syntax("x.c").expect("c rule");
        assert_eq!(rule.file_type, "c");
        assert!(select_syntax("README").is_none());
    }

    #[test]
    fn c_file_highlights_keyword_and_number() {
        let mut doc = Document::new();
        doc.insert_row(0, b"int main(){return 0;}".to_vec(), 8);
        let syntax = select_syntax("x.c").unwrap();
        update_syntax(doc.row_mut(0).unwrap(), Some(syntax));
        let row = doc.row(0).unwrap();

        assert_eq!(row.highlight[0], Highlight::Keyword2); // "int"
        assert_eq!(row.highlight[1], Highlight::Keyword2);
        assert_eq!(row.highlight[2], Highlight::Keyword2);
        assert_ne!(row.highlight[3], Highlight::Keyword2); // space after "int"

        let zero_idx = row.render.iter().position(|&b| b == b'0').unwrap();
        assert_eq!(row.highlight[zero_idx], Highlight::Number);

        let return_idx = row.render.windows(6).position(|w| w == b"return").unwrap();
        for i in return_idx..return_idx + 6 {
            assert_eq!(row.highlight[i], Highlight::Keyword1);
        }
    }

    #[test]
    fn comment_consumes_rest_of_line() {
        let mut doc = Document::new();
        doc.insert_row(0, b"x; // trailing".to_vec(), 8);
        let syntax = select_syntax("x.c").unwrap();
        update_syntax(doc.row_mut(0).unwrap(), Some(syntax));
        let row = doc.row(0).unwrap();
        let slash_idx = row.render.windows(2).position(|w| w == b"//").unwrap();
        for h in &row.highlight[slash_idx..] {
            assert_eq!(*h, Highlight::Comment);
        }
        assert_ne!(row.highlight[0], Highlight::Comment);
    }

    #[test]
    fn strings_handle_escape_and_close() {
        let mut doc = Document::new();
        doc.insert_row(0, br#"char *s = "a\"b";"#.to_vec(), 8);
        let syntax = select_syntax("x.c").unwrap();
        update_syntax(doc.row_mut(0).unwrap(), Some(syntax));
        let row = doc.row(0).unwrap();
        let open = row.render.iter().position(|&b| b == b'"').unwrap();
        assert_eq!(row.highlight[open], Highlight::String);
        // trailing semicolon after the closing quote is back to Normal.
        assert_eq!(*row.highlight.last().unwrap(), Highlight::Normal);
    }

    #[test]
    fn no_syntax_selected_stays_normal() {
        let mut doc = Document::new();
        doc.insert_row(0, b"int x = 1;".to_vec(), 8);
        update_syntax(doc.row_mut(0).unwrap(), None);
        assert!(doc.row(0).unwrap().highlight.iter().all(|h| *h == Highlight::Normal));
    }
}
