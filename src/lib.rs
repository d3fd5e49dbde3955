//! Ordered map on a [left-leaning-red-black][llrb] tree, with cursors
//! that step through entries using parent back-links.
//!
//! [`Llrb`] is the balanced map. [`Bst`] is a plain binary search tree
//! over the same nodes, kept as a separate type so that its writes are
//! never mixed into a balanced tree. Read operations for both come from
//! the [`OrderedMap`] trait.
//!
//! ```
//! use llrb_map::{Llrb, OrderedMap};
//!
//! let mut llrb: Llrb<i64, f64> = Llrb::new("example");
//! llrb.insert(50, 1.1);
//! llrb.insert(30, 2.2);
//! llrb.insert(70, 3.3);
//!
//! let mut cursor = llrb.find(&50);
//! cursor.move_prev();
//! assert_eq!(cursor.entry(), Some((&30, &2.2)));
//! assert!(llrb.find(&40).is_end());
//! ```
//!
//! [llrb]: https://en.wikipedia.org/wiki/Left-leaning_red-black_tree

mod bst;
mod cursor;
mod depth;
mod error;
mod iter;
mod llrb;
mod map;
mod node;

pub use crate::bst::Bst;
pub use crate::cursor::{Cursor, CursorMut};
pub use crate::depth::Depth;
pub use crate::error::Error;
pub use crate::iter::{Iter, IterMut, Range};
pub use crate::llrb::{Llrb, Stats};
pub use crate::map::OrderedMap;
pub use crate::node::Node;

#[cfg(test)]
mod bst_test;
