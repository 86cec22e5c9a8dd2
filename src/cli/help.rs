//! Command-name contract for logging.

use crate::cli::parse::{Commands, ConfigCommands};

/// Command name for logs (e.g. "generate", "config.show").
pub fn command_name(command: &Commands) -> String {
    match command {
        Commands::Generate { .. } => "generate".to_string(),
        Commands::Compile { .. } => "compile".to_string(),
        Commands::Fetch { .. } => "fetch".to_string(),
        Commands::Latest { .. } => "latest".to_string(),
        Commands::Config { command } => format!("config.{}", config_command_name(command)),
    }
}

pub fn config_command_name(command: &ConfigCommands) -> &'static str {
    match command {
        ConfigCommands::Show { .. } => "show",
        ConfigCommands::Validate => "validate",
    }
}
