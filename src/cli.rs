//! CLI domain for `embedgen`: parse, route and output only.

mod output;
mod parse;
mod route;

pub use output::{format_index_json, format_index_text, index_rows, map_error, IndexRow};
pub use parse::{Cli, Commands, SymlinkArg};
pub use route::RunContext;
