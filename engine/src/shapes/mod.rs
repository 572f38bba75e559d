//! Loop-shaped façades over the batch scheduler.

mod for_each;
mod for_range;
mod while_loop;

pub use while_loop::{Cursor, FnCursor, PredicateCursor, cursor_fn, predicate_cursor};
