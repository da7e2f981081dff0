//! Tokenizer and recursive-descent parser.
//!
//! Input arrives one byte at a time through a single character of
//! lookahead: `get_char` hands back the previous lookahead and stores the
//! freshly read byte in its place, so the token loop can peek one byte
//! ahead without a pushback buffer. A delimiter is anything at or below
//! space, or a parenthesis; a token is a maximal run of non-delimiters.

use crate::arena::{Arena, Obj};
use crate::io::CharSource;
use crate::symbols::NIL;
use crate::Error;
use std::mem;

/// Reads objects from a character source, interning atoms and allocating
/// list cells in a borrowed arena.
pub struct Reader<S> {
    source: S,
    lookahead: u8,
    /// Scratch buffer holding the bytes of the token being staged.
    token: Vec<u8>,
}

impl<S: CharSource> Reader<S> {
    pub fn new(source: S) -> Reader<S> {
        Reader {
            source,
            lookahead: 0,
            token: Vec::new(),
        }
    }

    /// Swap the lookahead: return the buffered byte, buffer a fresh one.
    /// The first call of a session returns the initial NUL lookahead,
    /// which the token loop discards as whitespace.
    fn get_char(&mut self) -> Result<u8, Error> {
        let fresh = self.source.next_char().ok_or(Error::EndOfInput)?;
        Ok(mem::replace(&mut self.lookahead, fresh))
    }

    /// Stage the next token and return the byte that terminated it.
    ///
    /// One loop does all three jobs: leading whitespace is consumed while
    /// the current byte is at or below space, token bytes accumulate
    /// while both the current byte and the lookahead are above `)`, and
    /// the loop exits on the first delimiter. A parenthesis standing
    /// alone lands in the buffer too; the parser keys off the returned
    /// byte, not the buffer, in that case.
    fn next_token(&mut self) -> Result<u8, Error> {
        self.token.clear();
        loop {
            let ch = self.get_char()?;
            if ch > b' ' {
                self.token.push(ch);
            }
            if !(ch <= b' ' || (ch > b')' && self.lookahead > b')')) {
                return Ok(ch);
            }
        }
    }

    /// Read one complete expression.
    pub fn read_expr(&mut self, arena: &mut Arena) -> Result<Obj, Error> {
        let delim = self.next_token()?;
        self.read_object(delim, arena)
    }

    fn read_object(&mut self, delim: u8, arena: &mut Arena) -> Result<Obj, Error> {
        if delim == b'(' {
            self.read_list(arena)
        } else {
            arena.intern(&self.token)
        }
    }

    fn read_list(&mut self, arena: &mut Arena) -> Result<Obj, Error> {
        let delim = self.next_token()?;
        if delim == b')' {
            return Ok(NIL);
        }
        let head = self.read_object(delim, arena)?;
        let tail = self.read_list(arena)?;
        arena.cons(head, tail)
    }
}
