//! Recursive printer emitting one character at a time.

use crate::arena::{Arena, Obj};
use crate::io::CharSink;
use crate::symbols::NIL;

/// Separator between the spine and a non-`NIL` atom tail.
const DOT: char = '∙';

/// Print an object: atoms by their interned name, cons cells as
/// parenthesized lists with ` ∙ ` before a dotted tail.
pub fn print_obj<K: CharSink>(arena: &Arena, sink: &mut K, obj: Obj) {
    if obj.is_cons() {
        print_list(arena, sink, obj);
    } else {
        print_atom(arena, sink, obj);
    }
}

/// Render an object into a fresh string. Convenience for tests and
/// diagnostics; the interpreter itself prints straight to its sink.
pub fn print_to_string(arena: &Arena, obj: Obj) -> String {
    let mut out = String::new();
    print_obj(arena, &mut out, obj);
    out
}

fn print_atom<K: CharSink>(arena: &Arena, sink: &mut K, atom: Obj) {
    let mut i = atom.handle();
    loop {
        let w = arena.word(i);
        if w == 0 {
            break;
        }
        sink.put_char(w as u8 as char);
        i += 1;
    }
}

fn print_list<K: CharSink>(arena: &Arena, sink: &mut K, list: Obj) {
    sink.put_char('(');
    print_obj(arena, sink, arena.car(list));
    let mut tail = arena.cdr(list);
    while tail != NIL {
        if tail.is_cons() {
            sink.put_char(' ');
            print_obj(arena, sink, arena.car(tail));
            tail = arena.cdr(tail);
        } else {
            sink.put_char(' ');
            sink.put_char(DOT);
            sink.put_char(' ');
            print_obj(arena, sink, tail);
            break;
        }
    }
    sink.put_char(')');
}
