//! The symbol interner and the built-in symbol contract.
//!
//! Interned names live in the arena's symbol region as null-terminated
//! byte sequences, concatenated with no gaps. The region is seeded with
//! the built-ins below, and their offsets are load-bearing: the evaluator
//! dispatches primitives by exact handle value, and any atom with a
//! handle greater than `EQ` is by construction a user-defined name.

use crate::arena::{Arena, Obj};
use crate::Error;
use log::trace;

/// Seed image of the symbol region. The offset of each name inside this
/// sequence is its atom handle.
pub(crate) const BUILTIN_SYMBOLS: &[u8] =
    b"NIL\0T\0QUOTE\0COND\0READ\0PRINT\0ATOM\0CAR\0CDR\0CONS\0EQ\0";

/// The empty list, falsehood, and the atom printed as `NIL`, all at once.
pub const NIL: Obj = Obj(0);
/// Canonical truth.
pub const T: Obj = Obj(4);
/// Special form: `(QUOTE X)` is `X`, unevaluated.
pub const QUOTE: Obj = Obj(6);
/// Special form: clause list, first true test wins.
pub const COND: Obj = Obj(12);
/// Primitive: read the next expression from the character source.
pub const READ: Obj = Obj(17);
/// Primitive: print an object, or a bare newline with no argument.
pub const PRINT: Obj = Obj(22);
/// Primitive: `T` when the argument is an atom.
pub const ATOM: Obj = Obj(28);
/// Primitive: first component of a pair.
pub const CAR: Obj = Obj(33);
/// Primitive: second component of a pair.
pub const CDR: Obj = Obj(37);
/// Primitive: allocate a pair.
pub const CONS: Obj = Obj(41);
/// Primitive: handle equality. Also the highest built-in handle; every
/// atom above it resolves through the environment.
pub const EQ: Obj = Obj(46);

impl Arena {
    /// Intern a token, returning its atom handle.
    ///
    /// Walks the populated symbol region string by string, comparing byte
    /// by byte against the token; a match returns the existing offset, so
    /// byte-equal tokens always share a handle. An unseen token is
    /// appended at the write cursor. The scan is linear in the region
    /// size, which is fine at the scale of a few hundred symbols.
    pub fn intern(&mut self, token: &[u8]) -> Result<Obj, Error> {
        let mut i = 0;
        while i < self.sym_end() {
            let start = i;
            let mut j = 0;
            let matched = loop {
                let w = self.word(i);
                let t = token.get(j).copied().map(i32::from).unwrap_or(0);
                if w != t {
                    break false;
                }
                if w == 0 {
                    break true;
                }
                i += 1;
                j += 1;
            };
            if matched {
                return Ok(Obj(start));
            }
            while self.word(i) != 0 {
                i += 1;
            }
            i += 1;
        }

        let start = self.sym_end();
        let needed = token.len() as i32 + 1;
        if start + needed > self.sym_limit() {
            return Err(Error::SymbolsExhausted);
        }
        for (k, &b) in token.iter().enumerate() {
            self.set_word(start + k as i32, i32::from(b));
        }
        self.set_word(start + token.len() as i32, 0);
        self.set_sym_end(start + needed);
        trace!("interned {:?} at {}", String::from_utf8_lossy(token), start);
        Ok(Obj(start))
    }
}
