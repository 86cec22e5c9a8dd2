//! CLI parse: clap types for scenesmith. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// scenesmith - turn a problem statement into a rendered explainer video
#[derive(Parser)]
#[command(name = "scenesmith")]
#[command(about = "Generate, render, and retrieve Manim explainer videos")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, default_value = "false")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a video for a problem, repairing failed renders
    Generate {
        /// Problem statement
        #[arg(long)]
        problem: String,
        /// Extra context, such as a description of an attached image
        #[arg(long, alias = "image-note")]
        notes: Option<String>,
        /// Write the video here instead of embedding it in the output
        #[arg(long)]
        output: Option<PathBuf>,
        /// Output format (text or json)
        #[arg(long, default_value = "json")]
        format: String,
    },
    /// Compile a saved code-author answer (fenced code block) into a video, once
    Compile {
        /// File holding the raw answer text
        input: PathBuf,
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long, default_value = "json")]
        format: String,
    },
    /// Fetch the video previously rendered for an identifier
    Fetch {
        identifier: String,
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long, default_value = "json")]
        format: String,
    },
    /// Fetch the most recent video by modification time (unsafe while renders run)
    Latest {
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long, default_value = "json")]
        format: String,
    },
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show {
        /// Output format (toml or json)
        #[arg(long, default_value = "toml")]
        format: String,
    },
    /// Validate the effective configuration
    Validate,
}
