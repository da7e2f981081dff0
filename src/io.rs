//! The interpreter's two external interfaces: a byte-oriented character
//! source and a character sink.
//!
//! The core never touches files or terminals directly. The binary wires
//! in a line editor and stdout; tests drive the interpreter with
//! [`StrSource`] and collect output in a `String`.

use std::io::Write;

/// A stream of input bytes. `None` means end of stream, which the
/// interpreter treats as an orderly shutdown.
///
/// A source is free to uppercase input, keep history or edit lines; the
/// core only sees the bytes it yields.
pub trait CharSource {
    fn next_char(&mut self) -> Option<u8>;
}

/// A writable stream of characters. Must accept the dotted-pair
/// separator `∙`, which is outside ASCII.
pub trait CharSink {
    fn put_char(&mut self, ch: char);
}

/// A source backed by an in-memory string.
pub struct StrSource {
    bytes: Vec<u8>,
    pos: usize,
}

impl StrSource {
    pub fn new(text: &str) -> StrSource {
        StrSource {
            bytes: text.as_bytes().to_vec(),
            pos: 0,
        }
    }
}

impl CharSource for StrSource {
    fn next_char(&mut self) -> Option<u8> {
        let b = self.bytes.get(self.pos).copied()?;
        self.pos += 1;
        Some(b)
    }
}

impl CharSink for String {
    fn put_char(&mut self, ch: char) {
        self.push(ch);
    }
}

/// A sink over any [`std::io::Write`], flushed at line ends so prompts
/// and results interleave correctly on a terminal.
pub struct WriteSink<W: Write> {
    inner: W,
}

impl<W: Write> WriteSink<W> {
    pub fn new(inner: W) -> WriteSink<W> {
        WriteSink { inner }
    }
}

impl<W: Write> CharSink for WriteSink<W> {
    fn put_char(&mut self, ch: char) {
        let mut buf = [0u8; 4];
        let _ = self.inner.write_all(ch.encode_utf8(&mut buf).as_bytes());
        if ch == '\n' {
            let _ = self.inner.flush();
        }
    }
}
