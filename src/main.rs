use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use stream_render::{RenderOptions, StreamRenderer, TreeParser};
use tokio::io::AsyncWriteExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "stream-render", about = "Render a JSON node tree to HTML on stdout")]
struct Cli {
    /// Node tree JSON file
    input: PathBuf,

    /// Render options JSON file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Disable the component cache
    #[arg(long)]
    no_cache: bool,

    /// Component cache capacity
    #[arg(long)]
    cache_capacity: Option<usize>,

    /// Render the tree this many times, sharing the cache between passes
    #[arg(long, default_value_t = 1)]
    repeat: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut options = match &cli.config {
        Some(path) => RenderOptions::from_file(path)?,
        None => RenderOptions::default(),
    };
    if cli.no_cache {
        options.cache_enabled = false;
    }
    if let Some(capacity) = cli.cache_capacity {
        options.cache_capacity = capacity;
    }

    let json = std::fs::read_to_string(&cli.input)
        .with_context(|| format!("Failed to read {}", cli.input.display()))?;
    let tree = TreeParser.parse_str(&json)?;

    let renderer = StreamRenderer::new(&options)?;
    let mut stdout = tokio::io::stdout();
    for pass in 0..cli.repeat {
        tracing::debug!(pass, "rendering");
        renderer.render_to_stream(&tree, &mut stdout).await?;
        stdout.write_all(b"\n").await?;
    }
    stdout.flush().await?;

    Ok(())
}
