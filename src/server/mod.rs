//! Accept loop and process-level shutdown.

pub mod listener;
pub mod shutdown;

pub use listener::{Server, run};
