mod cli;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, ConfigCommands};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Read {
            file,
            format,
            max_chars,
        } => cli::read::run(&file, format.as_deref(), max_chars),
        Commands::Inspect { file, format } => cli::inspect::run(&file, format.as_deref()),
        Commands::Columns { headers } => cli::columns::run(&headers),
        Commands::Config { command } => match command {
            Some(ConfigCommands::Init { force }) => cli::config::init(force),
            None => cli::config::show(),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
