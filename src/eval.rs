//! The interpreter: `eval`/`apply` over association-list environments,
//! the seven primitives, and the read-eval-print loop.
//!
//! The whole machine is a value, [`Interp`], owning the arena, the reader
//! with its lookahead, and the output sink. Everything is single-threaded
//! and synchronous; the only blocking point is the character source.

use crate::arena::{Arena, Obj};
use crate::io::{CharSink, CharSource};
use crate::printer::print_obj;
use crate::reader::Reader;
use crate::symbols::{ATOM, CAR, CDR, COND, CONS, EQ, NIL, PRINT, QUOTE, READ, T};
use crate::{Error, DEFAULT_ARENA_WORDS};

impl Arena {
    /// Look a key up in an association list: the `cdr` of the first pair
    /// whose `car` is the key. An unbound key yields `NIL`, which is why
    /// unbound atoms evaluate to the empty list rather than failing.
    pub fn assoc(&self, key: Obj, alist: Obj) -> Obj {
        if alist == NIL {
            return NIL;
        }
        let pair = self.car(alist);
        if self.car(pair) == key {
            self.cdr(pair)
        } else {
            self.assoc(key, self.cdr(alist))
        }
    }

    /// Prepend `(key . value)` pairs onto an environment. The two lists
    /// are consumed in lockstep; a length mismatch reads garbage rather
    /// than failing.
    pub fn pairlis(&mut self, keys: Obj, values: Obj, env: Obj) -> Result<Obj, Error> {
        if keys == NIL {
            return Ok(env);
        }
        let pair = self.cons(self.car(keys), self.car(values))?;
        let rest = self.pairlis(self.cdr(keys), self.cdr(values), env)?;
        self.cons(pair, rest)
    }
}

/// A complete interpreter instance: arena, reader and sink. Multiple
/// instances are independent.
pub struct Interp<S, K> {
    arena: Arena,
    reader: Reader<S>,
    sink: K,
}

impl<S: CharSource, K: CharSink> Interp<S, K> {
    /// An interpreter with the default arena size.
    pub fn new(source: S, sink: K) -> Interp<S, K> {
        Interp::with_arena_words(DEFAULT_ARENA_WORDS, source, sink)
    }

    /// An interpreter over an arena of `words` 32-bit words.
    pub fn with_arena_words(words: usize, source: S, sink: K) -> Interp<S, K> {
        Interp {
            arena: Arena::new(words),
            reader: Reader::new(source),
            sink,
        }
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Recover the sink, e.g. to inspect a transcript after a session.
    pub fn into_sink(self) -> K {
        self.sink
    }

    /// Read the next expression from the source.
    pub fn read(&mut self) -> Result<Obj, Error> {
        self.reader.read_expr(&mut self.arena)
    }

    /// Print an object to the sink.
    pub fn print(&mut self, obj: Obj) {
        print_obj(&self.arena, &mut self.sink, obj);
    }

    /// Evaluate an expression in an environment.
    ///
    /// Atoms evaluate to their binding (or `NIL`). `(QUOTE X)` returns
    /// `X` untouched. `COND` and function application run inside a
    /// collection window: the heap cursor is marked on entry, and on the
    /// way out everything the result does not reach is reclaimed.
    pub fn eval(&mut self, expr: Obj, env: Obj) -> Result<Obj, Error> {
        if expr.is_atom() {
            return Ok(self.arena.assoc(expr, env));
        }
        let head = self.arena.car(expr);
        if head == QUOTE {
            return Ok(self.arena.car(self.arena.cdr(expr)));
        }
        let pre = self.arena.heap_mark();
        let result = if head == COND {
            self.evcon(self.arena.cdr(expr), env)?
        } else {
            let args = self.evlis(self.arena.cdr(expr), env)?;
            self.apply(head, args, env)?
        };
        self.arena.compact(result, pre)
    }

    /// Apply a function object to a list of already-evaluated arguments.
    ///
    /// A cons in function position is taken to be `(LAMBDA params body)`;
    /// the head symbol is never inspected, only the shape matters, so any
    /// three-element list with a parameter list second and a body third
    /// is callable. An atom above `EQ` is a user name: it is evaluated
    /// and the application retried with the resolution. Anything else
    /// dispatches on the exact handle.
    fn apply(&mut self, f: Obj, args: Obj, env: Obj) -> Result<Obj, Error> {
        if f.is_cons() {
            let params = self.arena.car(self.arena.cdr(f));
            let body = self.arena.car(self.arena.cdr(self.arena.cdr(f)));
            let bound = self.arena.pairlis(params, args, env)?;
            return self.eval(body, bound);
        }
        if f == NIL {
            return Err(Error::ApplyNil);
        }
        if f > EQ {
            let resolved = self.eval(f, env)?;
            return self.apply(resolved, args, env);
        }
        match f {
            EQ => {
                let first = self.arena.car(args);
                let second = self.arena.car(self.arena.cdr(args));
                Ok(if first == second { T } else { NIL })
            }
            CONS => {
                let first = self.arena.car(args);
                let second = self.arena.car(self.arena.cdr(args));
                self.arena.cons(first, second)
            }
            ATOM => Ok(if self.arena.car(args).is_atom() { T } else { NIL }),
            CAR => Ok(self.arena.car(self.arena.car(args))),
            CDR => Ok(self.arena.cdr(self.arena.car(args))),
            READ => self.read(),
            PRINT => {
                if args == NIL {
                    self.sink.put_char('\n');
                } else {
                    let obj = self.arena.car(args);
                    self.print(obj);
                }
                Ok(NIL)
            }
            _ => Ok(NIL),
        }
    }

    /// Evaluate clauses in order; the first test that is not `NIL`
    /// selects its body. Programs are expected to close with a
    /// `((QUOTE T) ...)` clause; falling off the end is an error here.
    fn evcon(&mut self, clauses: Obj, env: Obj) -> Result<Obj, Error> {
        if clauses == NIL {
            return Err(Error::NoTrueClause);
        }
        let clause = self.arena.car(clauses);
        let test = self.eval(self.arena.car(clause), env)?;
        if test != NIL {
            self.eval(self.arena.car(self.arena.cdr(clause)), env)
        } else {
            self.evcon(self.arena.cdr(clauses), env)
        }
    }

    /// Map `eval` over a list, strictly left to right. The order is
    /// observable through `PRINT` and `READ`.
    fn evlis(&mut self, list: Obj, env: Obj) -> Result<Obj, Error> {
        if list == NIL {
            return Ok(NIL);
        }
        let head = self.eval(self.arena.car(list), env)?;
        let tail = self.evlis(self.arena.cdr(list), env)?;
        self.arena.cons(head, tail)
    }

    /// One read-eval-print cycle: reset the heap, read an expression,
    /// evaluate it in the empty environment, print the result and a
    /// newline.
    pub fn step(&mut self) -> Result<(), Error> {
        self.arena.reset_heap();
        let expr = self.read()?;
        let result = self.eval(expr, NIL)?;
        self.print(result);
        self.sink.put_char('\n');
        Ok(())
    }

    /// Run cycles until the source ends (a final newline, then a clean
    /// return) or a failure surfaces. There is no error recovery.
    pub fn run(&mut self) -> Result<(), Error> {
        loop {
            match self.step() {
                Ok(()) => {}
                Err(Error::EndOfInput) => {
                    self.sink.put_char('\n');
                    return Ok(());
                }
                Err(err) => return Err(err),
            }
        }
    }
}
