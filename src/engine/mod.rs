//! Engine module: CLI surface, output sink, progress and path helpers

pub mod arg_parser;
pub mod cli;
pub mod progress;
pub mod sink;
pub mod tools;

// Re-export commonly used functions
pub use arg_parser::Cli;
pub use cli::{handle_run, setup_opts, validate_opts};
pub use sink::{OutputTarget, compress, decompress, render_header};
pub use tools::{dedup_preserving_order, path_relative_to, path_to_slash_string};
