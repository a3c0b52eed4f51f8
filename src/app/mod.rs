pub mod error;

pub use error::{RanksnapError, Result};
