//! An ordered bijective map built from two AVL trees sharing one set of records.

pub mod avl_tree;
pub mod bimap;
pub mod compare;
pub mod error;
pub mod heap;
pub mod record;

pub use crate::bimap::{Bimap, IntoIter, Iter, LeftPosition, Position, Range, RightPosition};
pub use crate::compare::{Compare, Natural, Reverse};
pub use crate::error::BimapError;
pub use crate::record::{LeftSide, RightSide, Side};
