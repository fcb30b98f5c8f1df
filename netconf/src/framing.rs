// Switch Runtime: NETCONF Automation for Lab Switches
// Copyright (C) 2021  Tibor Schneider
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

//! # NETCONF 1.0 Framing
//!
//! Every message is terminated by the character sequence `]]>]]>` (RFC 6242, section 4.3).

use crate::{Error, Result};

use std::fmt;
use std::io::{ErrorKind, Read, Write};

/// End-of-message delimiter of the base:1.0 framing
pub const DELIMITER: &[u8] = b"]]>]]>";

const READ_CHUNK: usize = 4096;

/// Write a single message, followed by the delimiter, and flush the writer.
pub fn write_message<W: Write>(w: &mut W, msg: &str) -> Result<()> {
    w.write_all(msg.as_bytes())?;
    w.write_all(DELIMITER)?;
    w.flush()?;
    Ok(())
}

/// # Framed Stream
///
/// Wraps a bidirectional byte stream and splits the incoming bytes into NETCONF messages. Bytes
/// received after a delimiter are kept for the next call to [`FramedStream::read_message`].
pub struct FramedStream<S> {
    stream: S,
    buffer: Vec<u8>,
}

impl<S> fmt::Debug for FramedStream<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FramedStream({} bytes buffered)", self.buffer.len())
    }
}

impl<S: Read + Write> FramedStream<S> {
    /// Create a new framed stream
    pub fn new(stream: S) -> Self {
        Self { stream, buffer: Vec::new() }
    }

    /// Returns a mutable reference to the underlying stream
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    /// Returns the underlying stream, dropping everything that was buffered.
    pub fn into_inner(self) -> S {
        self.stream
    }

    /// Send a message
    pub fn write_message(&mut self, msg: &str) -> Result<()> {
        write_message(&mut self.stream, msg)
    }

    /// Block until a complete message was received, and return it without the delimiter.
    pub fn read_message(&mut self) -> Result<String> {
        let mut chunk = [0u8; READ_CHUNK];
        // bytes before this offset are known not to start a delimiter
        let mut scanned = 0;
        loop {
            if let Some(pos) = find_delimiter(&self.buffer, scanned) {
                let rest = self.buffer.split_off(pos + DELIMITER.len());
                self.buffer.truncate(pos);
                let msg = std::mem::replace(&mut self.buffer, rest);
                return Ok(String::from_utf8(msg)?);
            }
            let n = match self.stream.read(&mut chunk) {
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            if n == 0 {
                return Err(Error::UnexpectedEof);
            }
            scanned = (self.buffer.len() + 1).saturating_sub(DELIMITER.len());
            self.buffer.extend_from_slice(&chunk[..n]);
        }
    }
}

/// Position of the first delimiter that starts at or after `from`.
fn find_delimiter(buf: &[u8], from: usize) -> Option<usize> {
    buf.get(from..)?.windows(DELIMITER.len()).position(|w| w == DELIMITER).map(|pos| from + pos)
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use std::io::Cursor;

    /// In-memory stream: reads from a fixed input, and records everything written to it.
    #[derive(Debug, Default)]
    pub(crate) struct Duplex {
        pub input: Cursor<Vec<u8>>,
        pub output: Vec<u8>,
    }

    impl Duplex {
        pub fn new(input: impl Into<Vec<u8>>) -> Self {
            Self { input: Cursor::new(input.into()), output: Vec::new() }
        }

        pub fn written(&self) -> String {
            String::from_utf8(self.output.clone()).unwrap()
        }
    }

    impl Read for Duplex {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            // hand out small pieces, to exercise the reassembly
            let len = buf.len().min(5);
            self.input.read(&mut buf[..len])
        }
    }

    impl Write for Duplex {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.output.write(buf)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_appends_delimiter() {
        let mut out = Vec::new();
        write_message(&mut out, "<rpc/>").unwrap();
        assert_eq!(out, b"<rpc/>]]>]]>");
    }

    #[test]
    fn read_split_messages() {
        let mut s = FramedStream::new(Duplex::new("<a/>]]>]]>\n<b>x</b>]]>]]>"));
        assert_eq!(s.read_message().unwrap(), "<a/>");
        assert_eq!(s.read_message().unwrap(), "\n<b>x</b>");
        assert!(matches!(s.read_message(), Err(Error::UnexpectedEof)));
    }

    #[test]
    fn read_partial_delimiter_in_body() {
        let mut s = FramedStream::new(Duplex::new("<a>]]></a>]]>]]>"));
        assert_eq!(s.read_message().unwrap(), "<a>]]></a>");
    }

    #[test]
    fn read_large_message() {
        let body = "<x/>".repeat(3000);
        let input = format!("{}]]>]]><b/>]]>]]>", body);
        let mut s = FramedStream::new(std::io::Cursor::new(input.into_bytes()));
        assert_eq!(s.read_message().unwrap(), body);
        assert_eq!(s.read_message().unwrap(), "<b/>");
    }

    #[test]
    fn find_delimiter_from_offset() {
        assert_eq!(find_delimiter(b"ab]]>]]>", 0), Some(2));
        assert_eq!(find_delimiter(b"ab]]>]]>", 2), Some(2));
        assert_eq!(find_delimiter(b"ab]]>]]>", 3), None);
        assert_eq!(find_delimiter(b"ab", 5), None);
    }

    #[test]
    fn eof_before_delimiter() {
        let mut s = FramedStream::new(Duplex::new("<rpc-reply>"));
        assert!(matches!(s.read_message(), Err(Error::UnexpectedEof)));
    }
}
