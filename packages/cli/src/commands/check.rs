use super::load_schema;
use crate::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use mindmap_parser::{format_errors, parse, Format, NodeIndex, ParseError};
use mindmap_validator::{validate_document, ValidationResult};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Mindmap file to check
    pub input: PathBuf,

    /// Schema file (overrides config and the document's own schema)
    #[arg(short, long)]
    pub schema: Option<PathBuf>,

    /// Input format (json, yaml); defaults to the file extension
    #[arg(short, long)]
    pub format: Option<Format>,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub output: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct CheckReport {
    file: String,
    parse_errors: Vec<ParseError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    validation: Option<ValidationResult>,
}

impl CheckReport {
    fn error_count(&self) -> usize {
        self.parse_errors.iter().filter(|e| e.is_error()).count()
            + self.validation.as_ref().map_or(0, |v| v.errors.len())
    }
}

pub fn check(args: CheckArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let format = config.format_for(&args.input, args.format);
    let schema = match config.schema_path(cwd, args.schema.clone()) {
        Some(path) => Some(load_schema(&path)?),
        None => None,
    };

    let source = fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let file = args.input.display().to_string();

    let report = match parse(&source, format) {
        Ok(document) => {
            let validation = document.map(|doc| {
                let index = NodeIndex::build(&doc.root);
                validate_document(&doc, &index, schema.as_ref().or(doc.schema.as_ref()))
            });
            CheckReport {
                file,
                parse_errors: Vec::new(),
                validation,
            }
        }
        Err(errors) => CheckReport {
            file,
            parse_errors: errors,
            validation: None,
        },
    };

    if args.output == "json" {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_text(&report, &source);
    }

    // Exit with error code if there are errors
    if report.error_count() > 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn print_text(report: &CheckReport, source: &str) {
    if !report.parse_errors.is_empty() {
        eprint!("{}", format_errors(source, &report.file, &report.parse_errors));
    }

    if let Some(validation) = &report.validation {
        if !validation.errors.is_empty() {
            println!("{}", report.file);
        }
        for error in &validation.errors {
            let value = if error.value.is_null() {
                String::new()
            } else {
                format!(" (got {})", error.value)
            };
            println!(
                "  {} {} {}{}",
                "error".red().bold(),
                error.path.bright_white(),
                error.message,
                value.dimmed()
            );
        }
    }

    let errors = report.error_count();
    if errors == 0 {
        println!("{} {}", "✓".green(), report.file);
    } else {
        println!();
        println!(
            "{} {} {}",
            "✗".red(),
            report.file,
            format!("{} error{}", errors, if errors == 1 { "" } else { "s" }).red()
        );
    }
}
