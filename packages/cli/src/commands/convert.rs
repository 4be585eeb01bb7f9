use super::load_document;
use crate::config::Config;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use mindmap_parser::{Format, Serializer};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Source mindmap file
    pub input: PathBuf,

    /// Destination file
    pub output: PathBuf,

    /// Input format; defaults to the input extension
    #[arg(long)]
    pub from: Option<Format>,

    /// Output format; defaults to the output extension
    #[arg(long)]
    pub to: Option<Format>,
}

pub fn convert(args: ConvertArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let from = config.format_for(&args.input, args.from);
    let to = args
        .to
        .or_else(|| Format::from_path(&args.output))
        .ok_or_else(|| {
            anyhow!(
                "Cannot tell the output format of {}; pass --to json|yaml",
                args.output.display()
            )
        })?;

    let (_, document) = load_document(&args.input, from)?;
    let text = Serializer::with_indent(&config.indent_string()).serialize(&document, to)?;
    fs::write(&args.output, text)?;

    println!(
        "  {} {} → {} ({} nodes)",
        "✓".green(),
        args.input.display(),
        args.output.display(),
        document.node_count()
    );

    Ok(())
}
