//! Wolflog - CLI entry point

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell as CompletionShell};
use std::io;
use tracing_subscriber::EnvFilter;

use wolflog::{Config, ParseResult};

/// Version string; dev builds carry the git commit hash.
#[cfg(not(feature = "release"))]
const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("VERGEN_GIT_SHA"), ")");
#[cfg(feature = "release")]
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "wolflog")]
#[command(about = "Wolflog - parse multi-agent werewolf game transcripts into structured timelines")]
#[command(version = VERSION)]
struct Cli {
    /// Enable debug logging on stderr (or set RUST_LOG)
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a transcript and print the result as JSON
    Parse {
        /// Path to the transcript file
        file: String,
        /// Display names for Player1, Player2, ... (comma-separated)
        #[arg(long, value_delimiter = ',')]
        names: Option<Vec<String>>,
        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Print a human-readable summary of a transcript
    Summary {
        /// Path to the transcript file
        file: String,
        /// Display names for Player1, Player2, ... (comma-separated)
        #[arg(long, value_delimiter = ',')]
        names: Option<Vec<String>>,
    },

    /// Generate shell completions
    Completions {
        /// Target shell
        shell: CompletionShell,
    },

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Open configuration in editor
    Edit,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Parse {
            file,
            names,
            pretty,
        } => cmd_parse(&file, names, pretty),
        Commands::Summary { file, names } => cmd_summary(&file, names),
        Commands::Completions { shell } => cmd_completions(shell),
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show => cmd_config_show(),
            ConfigCommands::Edit => cmd_config_edit(),
        },
    }
}

fn cmd_parse(file: &str, names: Option<Vec<String>>, pretty: bool) -> Result<()> {
    let config = Config::load()?;
    let options = config.parse_options(names);
    let result = wolflog::parse_file(file, &options);

    let json = if pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{}", json);
    Ok(())
}

fn cmd_summary(file: &str, names: Option<Vec<String>>) -> Result<()> {
    let config = Config::load()?;
    let options = config.parse_options(names);
    let result = wolflog::parse_file(file, &options);
    print_summary(&result);
    Ok(())
}

fn print_summary(result: &ParseResult) {
    println!("Players:");
    for player in &result.players {
        match (player.wins, player.losses) {
            (Some(wins), Some(losses)) => println!(
                "{}: {}, win: {}, loss: {}",
                player.name, player.role, wins, losses
            ),
            _ => println!("{}: {}", player.name, player.role),
        }
    }

    println!();
    println!("Rounds: {}/{}", result.current_round, result.n_rounds);
    println!("Dialogue count: {}", result.dialogue.len());

    println!();
    println!("Message types distribution:");
    for (kind, count) in result.kind_distribution() {
        println!("{}: {}", kind, count);
    }

    println!();
    println!("Dialogue entries:");
    for (index, event) in result.dialogue.iter().enumerate() {
        println!(
            "{}. [{}] ({}): {}",
            index + 1,
            event.speaker,
            event.kind,
            event.content
        );
    }
}

fn cmd_completions(shell: CompletionShell) -> Result<()> {
    generate(shell, &mut Cli::command(), "wolflog", &mut io::stdout());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config = Config::load()?;
    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

/// Open the configuration file in the default editor ($EDITOR, or vi).
fn cmd_config_edit() -> Result<()> {
    let config_path = Config::config_path()?;

    if !config_path.exists() {
        Config::default().save()?;
    }

    let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());
    println!("Opening {} with {}", config_path.display(), editor);

    std::process::Command::new(&editor)
        .arg(&config_path)
        .status()
        .map_err(|e| anyhow::anyhow!("Failed to open editor: {}", e))?;

    Ok(())
}
