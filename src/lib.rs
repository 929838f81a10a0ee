pub mod config;
pub mod error;
pub mod fetch;
pub mod process;
mod utils;

pub use error::{PrepError, Result};
