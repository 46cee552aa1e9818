use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rolesync")]
#[command(version)]
#[command(about = "Declarative sync for LobeChat role resources", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Reconcile the desired-state file against the remote store
    Sync(SyncArgs),

    /// List roles currently in the remote store
    List,

    /// Open chat sessions for roles by name (creates missing roles first)
    Open(OpenArgs),

    /// Delete roles by name (never done implicitly by sync)
    Delete {
        /// Names of the roles to delete
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser)]
pub struct SyncArgs {
    /// Desired-state JSON file
    #[arg(short, long, env = "ROLES_FILE", default_value = "src/storage/roles.json")]
    pub file: PathBuf,

    /// Role names to open after the sync completes
    #[arg(long, num_args = 1.., value_name = "NAME")]
    pub open: Vec<String>,

    /// Print session URLs without launching a browser
    #[arg(long)]
    pub no_open_browser: bool,
}

#[derive(Parser)]
pub struct OpenArgs {
    /// Names of the roles to open
    #[arg(required = true)]
    pub names: Vec<String>,

    /// Print session URLs without launching a browser
    #[arg(long)]
    pub no_open_browser: bool,
}
