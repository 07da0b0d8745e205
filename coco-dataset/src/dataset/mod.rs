//! Dataset construction and per-index retrieval.

mod category;
mod coco_;
mod filter;

pub use category::*;
pub use coco_::*;
pub use filter::*;
