use super::load_schema;
use crate::config::Config;
use anyhow::{anyhow, Context, Result};
use clap::Args;
use colored::Colorize;
use mindmap_editor::{Publication, SyncConfig, SyncCoordinator};
use mindmap_parser::Format;
use notify::{Config as NotifyConfig, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Mindmap file to watch
    pub input: PathBuf,

    /// Schema file (overrides config and the document's own schema)
    #[arg(short, long)]
    pub schema: Option<PathBuf>,

    /// Input format; defaults to the file extension
    #[arg(short, long)]
    pub format: Option<Format>,

    /// Quiet period before re-parsing, in milliseconds
    #[arg(long)]
    pub debounce_ms: Option<u64>,
}

pub fn watch(args: WatchArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run(args, config, cwd))
}

async fn run(args: WatchArgs, config: Config, cwd: &Path) -> Result<()> {
    let path = if args.input.is_absolute() {
        args.input.clone()
    } else {
        cwd.join(&args.input)
    };
    let format = config.format_for(&path, args.format);
    let debounce = args
        .debounce_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.debounce());

    let (sync, _writeback) =
        SyncCoordinator::spawn(SyncConfig::new(format).with_debounce(debounce));
    if let Some(schema_path) = config.schema_path(cwd, args.schema.clone()) {
        sync.set_schema(Some(load_schema(&schema_path)?)).await?;
    }

    // Watch the directory containing the file; editors often replace files
    // instead of writing them in place
    let watch_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| cwd.to_path_buf());
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| {
            if let Ok(event) = res {
                let _ = event_tx.send(event);
            }
        },
        NotifyConfig::default(),
    )?;
    watcher.watch(&watch_dir, RecursiveMode::NonRecursive)?;

    println!(
        "👀 {} {} ({}, debounce {}ms)",
        "Watching".green().bold(),
        args.input.display(),
        format,
        debounce.as_millis()
    );

    let mut publications = sync.subscribe();
    feed(&sync, &path).await?;

    loop {
        tokio::select! {
            Some(event) = event_rx.recv() => {
                let is_our_file = event
                    .paths
                    .iter()
                    .any(|p| p.file_name().is_some_and(|n| Some(n) == path.file_name()));
                if is_our_file && path.exists() {
                    feed(&sync, &path).await?;
                }
            }

            changed = publications.changed() => {
                if changed.is_err() {
                    return Err(anyhow!("sync coordinator stopped"));
                }
                if let Some(publication) = publications.borrow_and_update().clone() {
                    print_publication(&args.input, &publication);
                }
            }

            _ = tokio::signal::ctrl_c() => {
                println!();
                println!("✨ {} watching", "Stopped".green().bold());
                sync.shutdown().await?;
                return Ok(());
            }
        }
    }
}

async fn feed(sync: &SyncCoordinator, path: &Path) -> Result<()> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    sync.text_changed(text).await?;
    Ok(())
}

fn print_publication(input: &Path, publication: &Publication) {
    let label = format!("[#{}]", publication.sequence).dimmed();

    if !publication.parsed() {
        println!(
            "{} {} {}",
            label,
            input.display(),
            format!("parse failed ({} errors)", publication.parse_errors.len()).red()
        );
        for error in &publication.parse_errors {
            println!("    {}", error);
        }
        return;
    }

    let nodes = publication.document().map_or(0, |d| d.node_count());
    if publication.validation.valid {
        println!(
            "{} {} {} nodes, {}",
            label,
            input.display(),
            nodes,
            "valid".green()
        );
    } else {
        println!(
            "{} {} {} nodes, {}",
            label,
            input.display(),
            nodes,
            format!("{} problems", publication.validation.errors.len()).yellow()
        );
        for error in &publication.validation.errors {
            println!("    {}", error);
        }
    }
}
