//! CLI module - Command-line interface for linkshelf
//!
//! Starts the server by default and carries a few admin commands that work
//! directly against the database.

mod commands;

use clap::{Parser, Subcommand};

/// linkshelf - personal link bookmarking service
#[derive(Parser)]
#[command(name = "linkshelf")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API (default)
    #[command(alias = "daemon")]
    Serve,

    /// Write a default config.toml if none exists
    Init,

    /// Create a user account
    #[command(name = "create-user")]
    CreateUser {
        username: String,

        email: String,

        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,

        #[arg(long)]
        staff: bool,

        #[arg(long)]
        superuser: bool,
    },

    /// Delete a user together with their links and collections
    #[command(name = "delete-user")]
    DeleteUser {
        username: String,

        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },

    /// Fetch a URL and print the metadata a new link would get
    Extract { url: String },
}

pub use commands::*;
