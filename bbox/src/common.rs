pub use anyhow::{bail, ensure, Error, Result};
pub use num_traits::Num;
pub use std::{
    fmt::{self, Display},
    str::FromStr,
};
