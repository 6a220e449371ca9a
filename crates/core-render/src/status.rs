//! Status bar and message bar composition.
//!
//! Two-stage pipeline: `compose_status` builds the left/right segments,
//! `format_status` pads them into a single line exactly `term_cols` wide
//! with the right segment ending at the last column.

pub struct StatusContext<'a> {
    pub file_name: Option<&'a str>,
    pub row_count: usize,
    pub dirty: bool,
    pub file_type: Option<&'a str>,
    /// 1-based current line, or `row_count` (i.e. one past the end) on the
    /// virtual trailing row.
    pub current_line_1: usize,
}

pub struct StatusSegments {
    pub left: String,
    pub right: String,
}

pub fn compose_status(ctx: &StatusContext<'_>) -> StatusSegments {
    let name = ctx.file_name.unwrap_or("[No Filename]");
    let modified = if ctx.dirty { " (modified)" } else { "" };
    let left = format!("{name} - {} lines{modified}", ctx.row_count);

    let file_type = ctx.file_type.unwrap_or("no file type");
    let right = format!("{file_type} | {}/{}", ctx.current_line_1, ctx.row_count);

    StatusSegments { left, right }
}

/// Pads `segments` into exactly `term_cols` bytes (truncating an overlong
/// left segment) so the right segment's last byte lands on the last column.
pub fn format_status(segments: &StatusSegments, term_cols: usize) -> String {
    let mut left = segments.left.clone();
    if left.len() > term_cols {
        left.truncate(term_cols);
    }

    let mut out = left;
    while out.len() < term_cols {
        if term_cols - out.len() == segments.right.len() {
            out.push_str(&segments.right);
            break;
        }
        out.push(' ');
    }
    out
}

/// The transient message bar: blank once `elapsed >= timeout`, otherwise the
/// message truncated to `term_cols` bytes.
pub fn format_message_bar(message: Option<&str>, elapsed: std::time::Duration, timeout: std::time::Duration, term_cols: usize) -> String {
    let Some(message) = message else {
        return String::new();
    };
    if elapsed >= timeout {
        return String::new();
    }
    if message.len() > term_cols {
        message[..term_cols].to_string()
    } else {
        message.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn status_bar_pads_right_segment_to_last_column() {
        let ctx = StatusContext {
            file_name: Some("main.rs"),
            row_count: 42,
            dirty: true,
            file_type: Some("rust"),
            current_line_1: 7,
        };
        let segs = compose_status(&ctx);
        assert_eq!(segs.left, "main.rs - 42 lines (modified)");
        assert_eq!(segs.right, "rust | 7/42");

        let line = format_status(&segs, 60);
        assert_eq!(line.len(), 60);
        assert!(line.ends_with("rust | 7/42"));
        assert!(line.starts_with("main.rs - 42 lines (modified)"));
    }

    #[test]
    fn status_bar_truncates_overlong_left_segment() {
        let ctx = StatusContext {
            file_name: Some("main.rs"),
            row_count: 1,
            dirty: false,
            file_type: None,
            current_line_1: 1,
        };
        let segs = compose_status(&ctx);
        let line = format_status(&segs, 5);
        assert_eq!(line.len(), 5);
    }

    #[test]
    fn no_filename_uses_placeholder() {
        let ctx = StatusContext {
            file_name: None,
            row_count: 0,
            dirty: false,
            file_type: None,
            current_line_1: 1,
        };
        let segs = compose_status(&ctx);
        assert!(segs.left.starts_with("[No Filename]"));
        assert_eq!(segs.right, "no file type | 1/0");
    }

    #[test]
    fn message_bar_expires_after_timeout() {
        let timeout = Duration::from_secs(5);
        assert_eq!(
            format_message_bar(Some("saved"), Duration::from_secs(1), timeout, 80),
            "saved"
        );
        assert_eq!(
            format_message_bar(Some("saved"), Duration::from_secs(5), timeout, 80),
            ""
        );
    }

    #[test]
    fn message_bar_truncates_to_width() {
        let line = format_message_bar(Some("0123456789"), Duration::ZERO, Duration::from_secs(5), 4);
        assert_eq!(line, "0123");
    }
}
