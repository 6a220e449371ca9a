//! Append Buffer: a growable byte buffer that accumulates one frame of
//! terminal output, flushed atomically in a single write.
//!
//! Terminal commands are queued with `crossterm`'s `Command`/`queue!` API,
//! but targeting this in-memory buffer rather than stdout directly. The
//! renderer still performs exactly one `write_all` per frame, matching the
//! damage-free redraw contract this type exists to serve.

use std::io::{self, Write};

#[derive(Default)]
pub struct AppendBuffer {
    bytes: Vec<u8>,
}

impl AppendBuffer {
    pub fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Write the whole accumulated frame to `out` in one call, then flush
    /// `out`. Consumes the buffer: a frame is built once and released once.
    pub fn release(self, out: &mut impl Write) -> io::Result<()> {
        out.write_all(&self.bytes)?;
        out.flush()
    }
}

/// `Write::write` on a `Vec<u8>` cannot fail, so append never surfaces an
/// error; an allocation failure here is the one silent failure mode, and the
/// frame is simply left partial.
impl Write for AppendBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::{cursor::MoveTo, queue};

    #[test]
    fn accumulates_and_releases_in_one_write() {
        let mut buf = AppendBuffer::new();
        queue!(buf, MoveTo(3, 1)).unwrap();
        buf.write_all(b"hi").unwrap();
        assert!(!buf.is_empty());

        let mut out = Vec::new();
        buf.release(&mut out).unwrap();
        assert!(out.ends_with(b"hi"));
        assert!(out.starts_with(b"\x1b["));
    }

    #[test]
    fn empty_buffer_releases_nothing() {
        let buf = AppendBuffer::new();
        let mut out = Vec::new();
        buf.release(&mut out).unwrap();
        assert!(out.is_empty());
    }
}
