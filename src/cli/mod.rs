//! CLI argument definitions and command dispatch.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Wallshift - rotate wallpapers across displays from pluggable sources.
#[derive(Parser, Debug)]
#[command(name = "wsh", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (text for humans, json for scripts)
    #[arg(
        long,
        short = 'f',
        default_value = "text",
        global = true,
        env = "WSH_FORMAT"
    )]
    pub format: OutputFormat,

    /// Verbose output (repeat for more detail)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Config file path
    #[arg(long, short = 'c', global = true, env = "WSH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Target display (index or name)
    #[arg(long, short = 'd', global = true)]
    pub display: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Output format selection.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text with optional color
    #[default]
    Text,
    /// JSON output for scripts
    Json,
}

impl Cli {
    /// Returns true if output should be JSON.
    pub const fn use_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Set a random wallpaper now (default command)
    #[command(visible_alias = "s")]
    Set(SetArgs),

    /// Run the rotation schedule in the foreground
    #[command(visible_alias = "w")]
    Watch(WatchArgs),

    /// Show the current wallpaper for a display
    Current(CurrentArgs),

    /// Open a display's current wallpaper in an image viewer
    #[command(visible_alias = "v")]
    View(CurrentArgs),

    /// Blacklist a display's current wallpaper and rotate it away
    #[command(visible_alias = "bl")]
    Blacklist(CurrentArgs),

    /// Manage wallpaper lists
    #[command(visible_alias = "l")]
    List(ListArgs),

    /// Show the effective configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Parser, Debug, Default)]
pub struct SetArgs {
    /// Image sources overriding the configured ones
    pub sources: Vec<String>,

    /// Rotate on an interval (seconds) instead of exiting
    #[arg(long, short = 't')]
    pub interval: Option<u64>,

    /// Ignore the history when selecting a random image
    #[arg(long, short = 'i')]
    pub ignore_history: bool,

    /// Do not track current/history state
    #[arg(long, short = 'n')]
    pub no_track: bool,

    /// Set once and exit even when the config file has an interval
    #[arg(long)]
    pub once: bool,
}

#[derive(Parser, Debug)]
pub struct WatchArgs {
    /// Rotation interval in seconds (overrides the config file)
    #[arg(long, short = 't')]
    pub interval: Option<u64>,
}

#[derive(Parser, Debug)]
pub struct CurrentArgs {
    /// Display index or name (defaults to the first display)
    #[arg(value_name = "DISPLAY")]
    pub target: Option<String>,
}

#[derive(Parser, Debug)]
pub struct ListArgs {
    #[command(subcommand)]
    pub command: ListCommands,
}

#[derive(Subcommand, Debug)]
pub enum ListCommands {
    /// Show all lists, or the images in one list
    Ls {
        /// List name
        name: Option<String>,
    },
    /// Add an image (or a display's current wallpaper) to a list
    Add {
        /// List name
        name: String,
        /// Image file to add; defaults to the current wallpaper of the
        /// targeted display
        image: Option<PathBuf>,
    },
}

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Print only the config file path
    #[arg(long)]
    pub path: bool,
}

#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_set_with_interval() {
        let cli = Cli::parse_from(["wsh", "set", "-t", "300", "dir:///walls"]);
        match cli.command {
            Some(Commands::Set(args)) => {
                assert_eq!(args.interval, Some(300));
                assert_eq!(args.sources, vec!["dir:///walls".to_string()]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_global_display_flag() {
        let cli = Cli::parse_from(["wsh", "-d", "eDP-1", "current"]);
        assert_eq!(cli.display.as_deref(), Some("eDP-1"));
    }

    #[test]
    fn test_parse_blacklist_alias() {
        let cli = Cli::parse_from(["wsh", "bl", "0"]);
        match cli.command {
            Some(Commands::Blacklist(args)) => {
                assert_eq!(args.target.as_deref(), Some("0"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
