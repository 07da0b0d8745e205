//! The per-image training target and its builder.

mod builder;
mod target_;

pub use builder::*;
pub use target_::*;
