//! Command-line interface definition for Atelier
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for chat, history management, and artifact export.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Atelier - Conversational AI chat client
///
/// Chat with a generative assistant, collect the structured artifacts it
/// produces, and branch conversations by editing past messages.
#[derive(Parser, Debug, Clone)]
#[command(name = "atelier")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Snapshot database path override
    #[arg(long, env = "ATELIER_SNAPSHOT_DB")]
    pub storage_path: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Atelier
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive chat session
    Chat {
        /// Interface language override (en, ja)
        #[arg(short, long)]
        language: Option<String>,

        /// Initial input mode (chat, image, research, deep-research)
        #[arg(short, long)]
        mode: Option<String>,
    },

    /// Manage the stored conversation snapshot
    History {
        /// History subcommand
        #[command(subcommand)]
        command: HistoryCommand,
    },

    /// Export an artifact from a stored conversation to a file
    Export {
        /// Conversation identifier (full id or unique prefix)
        #[arg(long)]
        conversation: String,

        /// Artifact identifier (full id or unique prefix)
        #[arg(long)]
        artifact: String,

        /// Output directory (defaults to the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// History subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum HistoryCommand {
    /// List stored conversations
    List,

    /// Delete a stored conversation
    Delete {
        /// Conversation identifier (full id or unique prefix)
        id: String,
    },
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
