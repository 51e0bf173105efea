mod commands;
mod shutdown;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use errand_types::Settings;

/// errand -- policy-gated command execution and desktop watching for
/// agent-driven hosts.
#[derive(Parser, Debug)]
#[command(name = "errand", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a single command through the policy gateway
    Exec {
        /// Command line to execute
        #[arg(trailing_var_arg = true, required = true)]
        command: Vec<String>,
    },

    /// Watch the desktop until the given task appears complete
    Watch {
        /// Natural-language description of the task being watched
        task: String,
    },

    /// Print the effective configuration
    Doctor,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing with env filter (e.g., RUST_LOG=debug)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_env();

    match cli.command {
        Commands::Exec { command } => commands::exec::run(&settings, &command.join(" ")).await,
        Commands::Watch { task } => commands::watch::run(&settings, &task).await,
        Commands::Doctor => commands::doctor::run(&settings),
    }
}
