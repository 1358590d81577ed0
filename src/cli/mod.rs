//! CLI module for Taskhub

pub mod serve;

use clap::{Parser, Subcommand};

/// Taskhub - task management API with JWT authentication
#[derive(Parser)]
#[command(name = "taskhub")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the API server
    Serve,
}
