//! Raw-mode terminal setup and window-size discovery.
//!
//! `crossterm`'s raw-mode API does not expose `VMIN`/`VTIME`, and the main
//! loop depends on a non-blocking-ish read (`VTIME=1`, i.e. a ~100ms poll)
//! rather than crossterm's own event stream, so this crate talks to termios
//! through `libc` directly. Window size still goes through crossterm first,
//! falling back to the cursor-position escape-sequence trick only if that
//! query fails.

use std::io::{self, Read, Write};
use std::mem::MaybeUninit;
use std::os::fd::RawFd;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TerminalError {
    #[error("failed to read terminal attributes: {0}")]
    GetAttr(#[source] io::Error),
    #[error("failed to set terminal attributes: {0}")]
    SetAttr(#[source] io::Error),
    #[error("failed to determine window size")]
    WindowSize,
    #[error("i/o error talking to the terminal: {0}")]
    Io(#[from] io::Error),
}

/// Puts stdin into raw mode (no echo, no canonical line buffering, no
/// signal-generating keys) with `VMIN=0`/`VTIME=1`, so `read()` returns after
/// at most ~100ms even with no input. Restores the original attributes on
/// drop, so construction and teardown survive every exit path, panics
/// included (so long as the guard itself is not leaked).
pub struct RawModeGuard {
    fd: RawFd,
    original: libc::termios,
    active: bool,
}

impl RawModeGuard {
    pub fn enable() -> Result<Self, TerminalError> {
        let fd = libc::STDIN_FILENO;
        let original = get_termios(fd)?;

        let mut raw = original;
        unsafe {
            libc::cfmakeraw(&mut raw);
        }
        raw.c_cc[libc::VMIN] = 0;
        raw.c_cc[libc::VTIME] = 1;

        set_termios(fd, &raw)?;
        Ok(Self {
            fd,
            original,
            active: true,
        })
    }

    pub fn disable(&mut self) -> Result<(), TerminalError> {
        if self.active {
            set_termios(self.fd, &self.original)?;
            self.active = false;
        }
        Ok(())
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = self.disable();
    }
}

fn get_termios(fd: RawFd) -> Result<libc::termios, TerminalError> {
    let mut termios = MaybeUninit::<libc::termios>::uninit();
    let rc = unsafe { libc::tcgetattr(fd, termios.as_mut_ptr()) };
    if rc != 0 {
        return Err(TerminalError::GetAttr(io::Error::last_os_error()));
    }
    Ok(unsafe { termios.assume_init() })
}

fn set_termios(fd: RawFd, termios: &libc::termios) -> Result<(), TerminalError> {
    let rc = unsafe { libc::tcsetattr(fd, libc::TCSAFLUSH, termios) };
    if rc != 0 {
        return Err(TerminalError::SetAttr(io::Error::last_os_error()));
    }
    Ok(())
}

/// `(rows, cols)` of the controlling terminal, queried once at startup.
/// Tries `crossterm::terminal::size()` first; on failure, falls back to
/// pushing the cursor to the bottom-right corner and asking the terminal to
/// report its own position.
pub fn window_size() -> Result<(u16, u16), TerminalError> {
    if let Ok((cols, rows)) = crossterm::terminal::size() {
        if cols > 0 && rows > 0 {
            return Ok((rows, cols));
        }
    }
    fallback_window_size()
}

fn fallback_window_size() -> Result<(u16, u16), TerminalError> {
    let mut stdout = io::stdout();
    stdout.write_all(b"\x1b[999C\x1b[999B")?;
    stdout.flush()?;
    stdout.write_all(b"\x1b[6n")?;
    stdout.flush()?;

    let mut stdin = io::stdin();
    parse_cursor_position_reply(&mut stdin).ok_or(TerminalError::WindowSize)
}

/// Reads and parses a `\x1b[<rows>;<cols>R` cursor-position report from
/// `reader`, byte by byte so it stops exactly at the terminating `R`.
fn parse_cursor_position_reply(reader: &mut impl Read) -> Option<(u16, u16)> {
    let mut buf = [0u8; 32];
    let mut len = 0usize;
    let mut byte = [0u8; 1];

    while len < buf.len() {
        if reader.read(&mut byte).ok()? == 0 {
            break;
        }
        buf[len] = byte[0];
        len += 1;
        if byte[0] == b'R' {
            break;
        }
    }

    let reply = std::str::from_utf8(&buf[..len]).ok()?;
    let body = reply.strip_prefix("\x1b[")?.strip_suffix('R')?;
    let (rows, cols) = body.split_once(';')?;
    Some((rows.parse().ok()?, cols.parse().ok()?))
}

/// Clears the screen and homes the cursor, for the fatal-error exit path:
/// best-effort, ignores write failures since the process is already dying.
pub fn clear_screen_and_home() {
    let mut stdout = io::stdout();
    let _ = stdout.write_all(b"\x1b[2J\x1b[H");
    let _ = stdout.flush();
}
