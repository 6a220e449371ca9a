//! Produces one full frame into the Append Buffer per tick: the text rows
//! (with syntax colors), the status bar, the message bar, and the final
//! cursor placement.

use std::io::{self, Write};
use std::time::Duration;

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::queue;

use core_syntax::color_for;
use core_text::{Document, Highlight};

use crate::append_buffer::AppendBuffer;
use crate::status::{self, StatusContext};
use crate::viewport::Viewport;

pub struct FrameContext<'a> {
    pub document: &'a Document,
    pub viewport: &'a Viewport,
    pub term_rows: usize,
    pub term_cols: usize,
    pub cx: usize,
    pub cy: usize,
    pub rx: usize,
    pub file_name: Option<&'a str>,
    pub file_type: Option<&'a str>,
    pub dirty: bool,
    pub status_message: Option<&'a str>,
    pub status_message_age: Duration,
    pub status_timeout: Duration,
    pub version: &'static str,
}

pub fn render_frame(ctx: &FrameContext<'_>, buf: &mut AppendBuffer) -> io::Result<()> {
    queue!(buf, Hide, MoveTo(0, 0))?;

    draw_rows(ctx, buf)?;
    draw_status_bar(ctx, buf)?;
    draw_message_bar(ctx, buf)?;

    let cursor_row = (ctx.cy.saturating_sub(ctx.viewport.row_offset)) as u16;
    let cursor_col = (ctx.rx.saturating_sub(ctx.viewport.col_offset)) as u16;
    queue!(buf, MoveTo(cursor_col, cursor_row), Show)?;
    Ok(())
}

fn draw_rows(ctx: &FrameContext<'_>, buf: &mut AppendBuffer) -> io::Result<()> {
    let row_count = ctx.document.row_count();
    for y in 0..ctx.term_rows {
        let file_row = y + ctx.viewport.row_offset;
        if file_row >= row_count {
            draw_filler_line(ctx, y, row_count, buf)?;
        } else {
            draw_text_line(ctx, file_row, buf)?;
        }
        buf.write_all(b"\x1b[K")?;
        buf.write_all(b"\r\n")?;
    }
    Ok(())
}

fn draw_filler_line(
    ctx: &FrameContext<'_>,
    y: usize,
    row_count: usize,
    buf: &mut AppendBuffer,
) -> io::Result<()> {
    if row_count == 0 && y == ctx.term_rows / 3 {
        let welcome = format!("Terminal Editor - Version {}", ctx.version);
        let mut welcome: String = welcome.chars().take(ctx.term_cols).collect();
        let mut padding = ctx.term_cols.saturating_sub(welcome.len()) / 2;
        buf.write_all(b"~")?;
        if padding > 0 {
            padding -= 1;
        }
        for _ in 0..padding {
            buf.write_all(b" ")?;
        }
        welcome.truncate(ctx.term_cols);
        buf.write_all(welcome.as_bytes())?;
    } else {
        buf.write_all(b"~")?;
    }
    Ok(())
}

fn draw_text_line(ctx: &FrameContext<'_>, file_row: usize, buf: &mut AppendBuffer) -> io::Result<()> {
    let row = ctx.document.row(file_row).expect("file_row < row_count");
    let len = row.render.len();
    let start = ctx.viewport.col_offset.min(len);
    let end = (ctx.viewport.col_offset + ctx.term_cols).min(len);

    let mut current: Option<Highlight> = None;
    for i in start..end {
        let byte = row.render[i];
        let class = row.highlight[i];

        if byte.is_ascii_control() {
            buf.write_all(b"\x1b[7m?")?;
            buf.write_all(b"\x1b[m")?;
            if let Some(restored) = current {
                write!(buf, "\x1b[{}m", color_for(restored))?;
            }
            continue;
        }

        if current != Some(class) {
            if class == Highlight::Normal {
                buf.write_all(b"\x1b[39m")?;
            } else {
                write!(buf, "\x1b[{}m", color_for(class))?;
            }
            current = Some(class);
        }
        buf.write_all(&[byte])?;
    }
    buf.write_all(b"\x1b[39m")?;
    Ok(())
}

fn draw_status_bar(ctx: &FrameContext<'_>, buf: &mut AppendBuffer) -> io::Result<()> {
    let status_ctx = StatusContext {
        file_name: ctx.file_name,
        row_count: ctx.document.row_count(),
        dirty: ctx.dirty,
        file_type: ctx.file_type,
        current_line_1: ctx.cy + 1,
    };
    let segments = status::compose_status(&status_ctx);
    let line = status::format_status(&segments, ctx.term_cols);

    buf.write_all(b"\x1b[7m")?;
    buf.write_all(line.as_bytes())?;
    buf.write_all(b"\x1b[m")?;
    buf.write_all(b"\r\n")?;
    Ok(())
}

fn draw_message_bar(ctx: &FrameContext<'_>, buf: &mut AppendBuffer) -> io::Result<()> {
    buf.write_all(b"\x1b[K")?;
    let message = status::format_message_bar(
        ctx.status_message,
        ctx.status_message_age,
        ctx.status_timeout,
        ctx.term_cols,
    );
    buf.write_all(message.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_syntax::{select_syntax, update_syntax};

    fn base_ctx<'a>(document: &'a Document, viewport: &'a Viewport) -> FrameContext<'a> {
        FrameContext {
            document,
            viewport,
            term_rows: 5,
            term_cols: 20,
            cx: 0,
            cy: 0,
            rx: 0,
            file_name: None,
            file_type: None,
            dirty: false,
            status_message: None,
            status_message_age: Duration::ZERO,
            status_timeout: Duration::from_secs(5),
            version: "0.0.1",
        }
    }

    #[test]
    fn empty_document_draws_welcome_and_tildes() {
        let document = Document::new();
        let viewport = Viewport::new();
        let ctx = base_ctx(&document, &viewport);

        let mut buf = AppendBuffer::new();
        render_frame(&ctx, &mut buf).unwrap();
        let rendered = String::from_utf8_lossy(buf.as_bytes());
        assert!(rendered.contains("Terminal Editor - Version 0.0.1"));
        assert!(rendered.matches('~').count() >= 4);
    }

    #[test]
    fn text_row_emits_color_transitions() {
        let mut document = Document::new();
        document.insert_row(0, b"int x = 1;".to_vec(), 8);
        let syntax = select_syntax("x.c").unwrap();
        update_syntax(document.row_mut(0).unwrap(), Some(syntax));

        let viewport = Viewport::new();
        let ctx = base_ctx(&document, &viewport);
        let mut buf = AppendBuffer::new();
        render_frame(&ctx, &mut buf).unwrap();
        let rendered = String::from_utf8_lossy(buf.as_bytes());
        assert!(rendered.contains("\x1b[32m")); // int => keyword2
        assert!(rendered.contains("\x1b[31m")); // 1 => number
        assert!(rendered.contains("int x = 1;"));
    }

    #[test]
    fn control_byte_renders_inverted_question_mark() {
        let mut document = Document::new();
        document.insert_row(0, vec![1u8, b'a'], 8);
        let viewport = Viewport::new();
        let ctx = base_ctx(&document, &viewport);
        let mut buf = AppendBuffer::new();
        render_frame(&ctx, &mut buf).unwrap();
        let rendered = String::from_utf8_lossy(buf.as_bytes());
        assert!(rendered.contains("\x1b[7m?\x1b[m"));
    }
}
