mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    check, convert, format, init, watch, CheckArgs, ConvertArgs, FormatArgs, InitArgs, WatchArgs,
};
use tracing_subscriber::EnvFilter;

/// Mindmap CLI - check, convert and live-sync mindmap documents
#[derive(Parser, Debug)]
#[command(name = "mindmap")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse and validate a mindmap file
    Check(CheckArgs),

    /// Convert a mindmap between JSON and YAML
    Convert(ConvertArgs),

    /// Re-serialize a mindmap in canonical form
    Format(FormatArgs),

    /// Re-check a mindmap every time it changes on disk
    Watch(WatchArgs),

    /// Write a starter mindmap.config.json
    Init(InitArgs),
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = std::env::current_dir()
        .map_err(anyhow::Error::from)
        .and_then(|cwd| match cli.command {
            Command::Check(args) => check(args, &cwd),
            Command::Convert(args) => convert(args, &cwd),
            Command::Format(args) => format(args, &cwd),
            Command::Watch(args) => watch(args, &cwd),
            Command::Init(args) => init(args, &cwd),
        });

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
