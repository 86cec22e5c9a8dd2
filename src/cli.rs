//! CLI domain: parse, route, help, output, and presentation only.
//! No pipeline logic; the single route table dispatches to the pipeline facade.

mod help;
mod output;
mod parse;
mod presentation;
mod route;

pub use help::command_name;
pub use output::{map_error, map_error_in, redact_paths, redact_root, stderr_excerpt};
pub use parse::{Cli, Commands, ConfigCommands};
pub use presentation::{format_config, format_validation_result, format_video_json, format_video_text};
pub use route::RunContext;
