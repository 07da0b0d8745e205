//! Box rows in a declared coordinate mode and image sizes.

mod common;

pub use hw::*;
pub mod hw;

pub use mode::*;
pub mod mode;

pub use box_list::*;
pub mod box_list;
