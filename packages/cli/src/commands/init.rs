use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use mindmap_parser::{serialize, Format, MindmapDocument, MindmapNode};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Directory to initialize (defaults to current directory)
    pub dir: Option<PathBuf>,

    /// Default document format (json, yaml)
    #[arg(short, long, default_value = "json")]
    pub format: Format,

    /// Force overwrite existing config
    #[arg(long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &Path) -> Result<()> {
    let dir = args.dir.as_deref().map_or_else(|| cwd.to_path_buf(), |d| cwd.join(d));
    let config_path = dir.join(DEFAULT_CONFIG_NAME);

    // Check if config already exists
    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing mindmap project...".bright_blue().bold());

    if !dir.exists() {
        fs::create_dir_all(&dir)?;
        println!("  {} Created {}/", "✓".green(), dir.display());
    }

    // Create example mindmap
    let example_name = format!("mindmap.{}", args.format);
    let example_file = dir.join(&example_name);
    if !example_file.exists() {
        fs::write(&example_file, serialize(&example_document(), args.format)?)?;
        println!("  {} Created {}", "✓".green(), example_name);
    }

    let config = Config {
        format: Some(args.format),
        schema: None,
        debounce_ms: Some(300),
        indent: Some(2),
    };
    let config_json = serde_json::to_string_pretty(&config)?;
    fs::write(&config_path, config_json + "\n")?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("{}", "✅ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Edit {}", example_name);
    println!("  2. Run: mindmap check {}", example_name);
    println!("  3. Run: mindmap watch {}", example_name);

    Ok(())
}

fn example_document() -> MindmapDocument {
    let root = MindmapNode::new("root", "My project")
        .with_child(MindmapNode::new("goals", "Goals").with_child(MindmapNode::new("goal-1", "Ship v1")))
        .with_child(MindmapNode::new("ideas", "Ideas").with_tag("later"));
    MindmapDocument::new("1.0", "My project", root)
}
