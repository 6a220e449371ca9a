//! Decodes raw terminal bytes into [`core_events::Key`] values.
//!
//! Two different read disciplines are at play here. The *first* byte of a
//! keypress blocks and retries across VTIME timeouts: that's "wait for the
//! next key". Once we've seen `ESC`, the continuation bytes of a possible
//! escape sequence get exactly one non-retrying read each: a lone `ESC`
//! keypress produces no further bytes within that window, and we must not
//! block waiting for bytes that are never coming.

use std::io::{self, Read};

use core_events::{ESC, Key};

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("i/o error reading a key: {0}")]
    Io(#[from] io::Error),
}

pub struct KeyDecoder<R> {
    reader: R,
}

impl<R: Read> KeyDecoder<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Blocks until a full key is available, retrying across read timeouts
    /// (`Ok(0)`) and interrupted syscalls.
    pub fn read_key(&mut self) -> Result<Key, DecodeError> {
        let b = self.read_byte_blocking()?;
        if b != ESC {
            return Ok(Key::Byte(b));
        }
        self.decode_escape_sequence()
    }

    fn decode_escape_sequence(&mut self) -> Result<Key, DecodeError> {
        let Some(seq0) = self.try_read_byte()? else {
            return Ok(Key::Byte(ESC));
        };

        match seq0 {
            b'[' => self.decode_csi(),
            b'O' => {
                let Some(seq1) = self.try_read_byte()? else {
                    return Ok(Key::Byte(ESC));
                };
                Ok(match seq1 {
                    b'H' => Key::Home,
                    b'F' => Key::End,
                    _ => Key::Byte(ESC),
                })
            }
            _ => Ok(Key::Byte(ESC)),
        }
    }

    fn decode_csi(&mut self) -> Result<Key, DecodeError> {
        let Some(seq1) = self.try_read_byte()? else {
            return Ok(Key::Byte(ESC));
        };

        if seq1.is_ascii_digit() {
            let Some(seq2) = self.try_read_byte()? else {
                return Ok(Key::Byte(ESC));
            };
            if seq2 != b'~' {
                return Ok(Key::Byte(ESC));
            }
            return Ok(match seq1 {
                b'1' | b'7' => Key::Home,
                b'3' => Key::Delete,
                b'4' | b'8' => Key::End,
                b'5' => Key::PageUp,
                b'6' => Key::PageDown,
                _ => Key::Byte(ESC),
            });
        }

        Ok(match seq1 {
            b'A' => Key::ArrowUp,
            b'B' => Key::ArrowDown,
            b'C' => Key::ArrowRight,
            b'D' => Key::ArrowLeft,
            b'H' => Key::Home,
            b'F' => Key::End,
            _ => Key::Byte(ESC),
        })
    }

    /// One byte, retrying forever across `Ok(0)` (VTIME timeout) and
    /// `Interrupted`. Used only for the first byte of a keypress.
    fn read_byte_blocking(&mut self) -> Result<u8, DecodeError> {
        let mut buf = [0u8; 1];
        loop {
            match self.reader.read(&mut buf) {
                Ok(1) => return Ok(buf[0]),
                Ok(0) => continue,
                Ok(_) => unreachable!("read with a 1-byte buffer cannot return >1"),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// One byte, single attempt: `Ok(None)` means the read timed out (or was
    /// interrupted) with nothing available, which for escape-sequence
    /// continuation bytes means "there was no sequence, just `ESC`".
    fn try_read_byte(&mut self) -> Result<Option<u8>, DecodeError> {
        let mut buf = [0u8; 1];
        match self.reader.read(&mut buf) {
            Ok(1) => Ok(Some(buf[0])),
            Ok(0) => Ok(None),
            Ok(_) => unreachable!("read with a 1-byte buffer cannot return >1"),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
