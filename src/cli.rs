//! CLI definitions: argument parsing, subcommands, and help text.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use clap_complete::Shell;

pub use clap_complete::generate;

const AFTER_HELP: &str = "\
EXAMPLES:
  prompt-booster enhance \"write a poem\"      Improve a prompt and save the session
  prompt-booster enhance - --copy            Read the prompt from stdin, copy the result
  prompt-booster execute                     Run the newest improved prompt
  prompt-booster execute <ID> --html         Run a session and print formatted HTML
  prompt-booster follow-up <ID> \"shorter\"    Continue an executed session
  prompt-booster history list                List saved sessions
  prompt-booster export <ID> --open          Write and open an HTML page
  cat answer.md | prompt-booster render      Format text with tables as HTML
  prompt-booster completions bash            Generate bash completions
";

/// Command-line arguments for the application.
#[derive(Parser)]
#[command(
    author,
    version,
    about = "Improve prompts with an LLM, run them, and keep a short history",
    after_help = AFTER_HELP
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (use multiple times for debug)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Reduce log output (errors only)
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ask the model for an improved prompt and a rationale, then save the session
    Enhance {
        /// Prompt to improve ('-' reads from stdin)
        prompt: String,
        /// Copy the improved prompt to the clipboard
        #[arg(long)]
        copy: bool,
    },
    /// Run the improved prompt of a session (newest by default)
    Execute {
        /// Session ID
        id: Option<String>,
        /// Print the result as formatted HTML
        #[arg(long)]
        html: bool,
        /// Wait for the full response instead of streaming it
        #[arg(long)]
        no_stream: bool,
    },
    /// Ask a follow-up question on an executed session
    FollowUp {
        /// Session ID
        id: String,
        /// Follow-up request ('-' reads from stdin)
        prompt: String,
    },
    /// Replace the improved prompt of a session, keeping its rationale
    Edit {
        /// Session ID
        id: String,
        /// New improved prompt ('-' reads from stdin)
        prompt: String,
    },
    /// Manage saved sessions
    History {
        #[command(subcommand)]
        subcommand: HistorySubcommand,
    },
    /// Write a session as a standalone HTML page
    Export {
        /// Session ID
        id: String,
        /// Output file (default: cache directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Open the page after writing it
        #[arg(long)]
        open: bool,
    },
    /// Split a model response read from stdin into prompt and rationale
    Segment {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Format text read from stdin as HTML
    Render {
        /// Only convert tables, leave other text as is
        #[arg(long)]
        tables_only: bool,
    },
    /// Show config paths, model, and API key status
    Config {
        #[command(subcommand)]
        subcommand: Option<ConfigSubcommand>,
    },
    /// Generate shell completion script
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        #[arg(value_parser = clap::value_parser!(Shell))]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum HistorySubcommand {
    /// List sessions, newest first
    List {
        /// Maximum number of sessions to show
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Show one session
    Show { id: String },
    /// Delete one session
    Remove { id: String },
    /// Delete all sessions
    Clear,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Store the API key in the config directory (reads stdin when omitted)
    SetApiKey { api_key: Option<String> },
}

impl Args {
    /// Log level based on -v/-q flags: error, warn, info, or debug.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else if self.verbose >= 2 {
            "debug"
        } else if self.verbose >= 1 {
            "info"
        } else {
            "warn"
        }
    }
}
