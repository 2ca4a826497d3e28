pub mod cli;
pub mod commands;
pub mod replay;

pub use cli::*;
