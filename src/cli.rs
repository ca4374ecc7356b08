//! Command-line interface for trainvox
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Voice-driven train journey search
#[derive(Parser, Debug)]
#[command(
    name = "trainvox",
    version,
    about = "Voice-driven train journey search"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress status output (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (-v: confidence + solver metadata, -vv: full diagnostics)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Audio input device (e.g., hw:0)
    #[arg(long, global = true, value_name = "DEVICE")]
    pub device: Option<String>,

    /// Solver base URL (default: http://localhost:8000)
    #[arg(long, global = true, value_name = "URL")]
    pub solver_url: Option<String>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search an itinerary from a typed query
    Query {
        /// Free-form query text, e.g. "Je veux aller de Paris à Bordeaux"
        #[arg(required = true)]
        text: Vec<String>,
    },

    /// Search an itinerary for a known origin/destination pair
    Route {
        /// Departure station
        origin: String,
        /// Arrival station
        destination: String,
    },

    /// Record a spoken query from the microphone
    Listen,

    /// Transcribe a spoken query without searching
    Transcribe,

    /// List available audio input devices
    Devices,

    /// Check solver availability
    Health,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

impl Commands {
    /// Joined query text for the `Query` command.
    pub fn query_text(words: &[String]) -> String {
        words.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_query_command() {
        let cli = Cli::parse_from(["trainvox", "query", "Je", "veux", "aller", "à", "Lyon"]);
        match cli.command {
            Some(Commands::Query { text }) => {
                assert_eq!(Commands::query_text(&text), "Je veux aller à Lyon");
            }
            _ => panic!("Expected Query command"),
        }
    }

    #[test]
    fn test_cli_parses_route_command() {
        let cli = Cli::parse_from(["trainvox", "route", "Paris", "Lyon"]);
        match cli.command {
            Some(Commands::Route {
                origin,
                destination,
            }) => {
                assert_eq!(origin, "Paris");
                assert_eq!(destination, "Lyon");
            }
            _ => panic!("Expected Route command"),
        }
    }

    #[test]
    fn test_cli_parses_listen_with_device() {
        let cli = Cli::parse_from(["trainvox", "--device", "pipewire", "listen"]);
        assert_eq!(cli.device.as_deref(), Some("pipewire"));
        assert!(matches!(cli.command, Some(Commands::Listen)));
    }

    #[test]
    fn test_cli_global_flags() {
        let cli = Cli::parse_from([
            "trainvox",
            "-q",
            "-vv",
            "--solver-url",
            "http://10.0.0.2:8000",
            "health",
        ]);
        assert!(cli.quiet);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.solver_url.as_deref(), Some("http://10.0.0.2:8000"));
    }

    #[test]
    fn test_cli_bare_invocation_has_no_command() {
        let cli = Cli::parse_from(["trainvox"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_query_requires_text() {
        let result = Cli::try_parse_from(["trainvox", "query"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_completions_parses_shell() {
        let cli = Cli::parse_from(["trainvox", "completions", "bash"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Completions { shell: Shell::Bash })
        ));
    }
}
