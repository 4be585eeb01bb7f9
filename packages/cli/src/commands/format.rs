use super::load_document;
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use mindmap_parser::{serialize_like, Format};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct FormatArgs {
    /// Mindmap file to format
    pub input: PathBuf,

    /// Input format; defaults to the file extension
    #[arg(short, long)]
    pub format: Option<Format>,

    /// Rewrite the file instead of printing to stdout
    #[arg(short, long)]
    pub write: bool,
}

pub fn format(args: FormatArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let format = config.format_for(&args.input, args.format);

    let (source, document) = load_document(&args.input, format)?;
    let text = serialize_like(&document, format, Some(&source))?;

    if !args.write {
        print!("{}", text);
        return Ok(());
    }

    if text == source {
        println!("  {} {} already formatted", "✓".green(), args.input.display());
    } else {
        fs::write(&args.input, text)?;
        println!("  {} Formatted {}", "✓".green(), args.input.display());
    }

    Ok(())
}
