//! Copy-and-compact collection, run at the exit of every evaluation that
//! can allocate.
//!
//! The heap cursor at entry to an evaluation is the pre-mark: every cell
//! with a handle below it was allocated by that evaluation and dies with
//! it unless the result still reaches it. Collection has three phases:
//!
//! 1. Copy. The result is traversed recursively; each reachable cell
//!    below the pre-mark is reallocated at the top of the heap, children
//!    first. The eventual slide moves every copy up by the distance from
//!    the post-mark to the pre-mark, so that fixed offset is added to
//!    each copied handle as it is made.
//! 2. Slide. The block of copies moves word by word, top down, until it
//!    abuts the cells that predate the pre-mark.
//! 3. Reset. The cursor lands just below the slid block; the gap holding
//!    the transients is gone.
//!
//! Cost is proportional to the live result. There is no free list, no
//! mark bits, and no second semispace; the copies are staged inside the
//! same heap region being collected.

use crate::arena::{Arena, Obj};
use crate::Error;
use log::debug;

impl Arena {
    /// Recursively copy every cell of `obj` allocated below `mark`,
    /// returning the handle the copy will have after the slide. Atoms and
    /// cells at or above the mark pass through untouched.
    fn copy_live(&mut self, obj: Obj, mark: i32, offset: i32) -> Result<Obj, Error> {
        if obj.handle() < mark {
            let car = self.copy_live(self.car(obj), mark, offset)?;
            let cdr = self.copy_live(self.cdr(obj), mark, offset)?;
            let copy = self.cons(car, cdr)?;
            Ok(Obj(copy.handle() + offset))
        } else {
            Ok(obj)
        }
    }

    /// Collect everything allocated since `pre` that `result` does not
    /// reach, returning the relocated result. The copy phase allocates
    /// through the normal allocator, so a heap within two cells of full
    /// can fail here.
    pub(crate) fn compact(&mut self, result: Obj, pre: i32) -> Result<Obj, Error> {
        let post = self.heap_mark();
        let kept = self.copy_live(result, pre, pre - post)?;

        // Slide the copies up against the surviving older cells.
        let mut src = post;
        let mut dst = pre;
        while self.heap_mark() < src {
            src -= 1;
            dst -= 1;
            let w = self.word(src);
            self.set_word(dst, w);
        }
        self.set_heap_mark(dst);

        debug!(
            "collected: {} words live, {} words freed",
            pre - dst,
            dst - post
        );
        Ok(kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printer::print_to_string;
    use crate::symbols::NIL;

    fn symbols(arena: &mut Arena, names: &[&[u8]]) -> Vec<Obj> {
        names.iter().map(|n| arena.intern(n).unwrap()).collect()
    }

    #[test]
    fn transients_are_reclaimed_and_the_result_survives() {
        let mut arena = Arena::new(2048);
        let syms = symbols(&mut arena, &[b"A", b"B"]);
        let (a, b) = (syms[0], syms[1]);

        let pre = arena.heap_mark();
        // Three transient cells the result will not reference.
        for _ in 0..3 {
            arena.cons(a, NIL).unwrap();
        }
        // A two-cell result: (A B)
        let tail = arena.cons(b, NIL).unwrap();
        let result = arena.cons(a, tail).unwrap();
        let before = print_to_string(&arena, result);

        let kept = arena.compact(result, pre).unwrap();
        assert_eq!(print_to_string(&arena, kept), before);
        // Only the two live cells remain allocated.
        assert_eq!(arena.heap_mark(), pre - 4);
    }

    #[test]
    fn result_outside_the_marked_region_frees_everything() {
        let mut arena = Arena::new(2048);
        let syms = symbols(&mut arena, &[b"A"]);
        let a = syms[0];

        // Allocated before the mark: survives untouched, uncopied.
        let old = arena.cons(a, NIL).unwrap();
        let pre = arena.heap_mark();
        for _ in 0..4 {
            arena.cons(a, a).unwrap();
        }

        let kept = arena.compact(old, pre).unwrap();
        assert_eq!(kept, old);
        assert_eq!(arena.heap_mark(), pre);
        assert_eq!(print_to_string(&arena, kept), "(A)");
    }

    #[test]
    fn cursor_depends_only_on_result_shape() {
        // Same result shape, different transient churn, same final cursor.
        let mut quiet = Arena::new(2048);
        let mut noisy = Arena::new(2048);
        for arena in [&mut quiet, &mut noisy] {
            symbols(arena, &[b"A", b"B"]);
        }
        let a = quiet.intern(b"A").unwrap();
        let b = quiet.intern(b"B").unwrap();

        let pre_q = quiet.heap_mark();
        let tail = quiet.cons(b, NIL).unwrap();
        let result_q = quiet.cons(a, tail).unwrap();
        let kept_q = quiet.compact(result_q, pre_q).unwrap();

        let a2 = noisy.intern(b"A").unwrap();
        let b2 = noisy.intern(b"B").unwrap();
        let pre_n = noisy.heap_mark();
        for _ in 0..10 {
            noisy.cons(a2, b2).unwrap();
        }
        let tail2 = noisy.cons(b2, NIL).unwrap();
        let result_n = noisy.cons(a2, tail2).unwrap();
        let kept_n = noisy.compact(result_n, pre_n).unwrap();

        assert_eq!(quiet.heap_mark(), noisy.heap_mark());
        assert_eq!(print_to_string(&quiet, kept_q), print_to_string(&noisy, kept_n));
    }

    #[test]
    fn nested_structure_is_copied_deeply() {
        let mut arena = Arena::new(2048);
        let syms = symbols(&mut arena, &[b"X", b"Y"]);
        let (x, y) = (syms[0], syms[1]);

        let pre = arena.heap_mark();
        arena.cons(y, y).unwrap(); // transient
        let inner = arena.cons(x, NIL).unwrap();
        let pair = arena.cons(inner, y).unwrap();
        let result = arena.cons(pair, NIL).unwrap();

        let kept = arena.compact(result, pre).unwrap();
        assert_eq!(print_to_string(&arena, kept), "(((X) ∙ Y))");
        assert_eq!(arena.heap_mark(), pre - 6);
    }

    #[test]
    fn collection_preserves_older_cells_verbatim() {
        let mut arena = Arena::new(2048);
        let syms = symbols(&mut arena, &[b"A", b"B"]);
        let (a, b) = (syms[0], syms[1]);

        let old = arena.cons(a, NIL).unwrap();
        let pre = arena.heap_mark();
        arena.cons(b, b).unwrap(); // transient
        // Result references the older cell; only the fresh spine is copied.
        let result = arena.cons(b, old).unwrap();

        let kept = arena.compact(result, pre).unwrap();
        assert_eq!(print_to_string(&arena, kept), "(B A)");
        assert_eq!(arena.cdr(kept), old);
        assert_eq!(arena.heap_mark(), pre - 2);
    }
}
