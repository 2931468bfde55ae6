//! The `cargolens rank` command: semantic similarity ranking.

use clap::Args;
use std::path::PathBuf;

use cargolens_core::search::{SemanticRanker, TextEmbedder};
use cargolens_core::{Config, OutputFormat, OutputWriter};

/// Arguments for the `rank` command.
#[derive(Args, Debug)]
pub struct RankArgs {
    /// The query to rank candidates against
    #[arg(short, long)]
    pub query: String,

    /// File with one candidate document per line
    #[arg(short, long)]
    pub docs: PathBuf,

    /// Number of top results to return (defaults to search.top_k)
    #[arg(short)]
    pub k: Option<usize>,

    /// Output format: json or jsonl
    #[arg(long)]
    pub format: Option<String>,

    /// Pretty-print the JSON payload
    #[arg(long)]
    pub pretty: bool,
}

/// Execute the rank command.
///
/// Argument problems (unreadable candidates file, unknown format) are
/// rejected before any model is loaded.
pub fn execute(args: RankArgs, config: &Config) -> anyhow::Result<()> {
    let documents = read_documents(&args.docs)?;

    let format_str = args.format.as_deref().unwrap_or(&config.output.format);
    let format = OutputFormat::parse(format_str)
        .ok_or_else(|| anyhow::anyhow!("Unknown output format: {format_str}"))?;

    let embedder = TextEmbedder::load(&config.model_dir(), &config.search.embedding_model)?;
    let ranker = SemanticRanker::new(embedder);

    let k = args.k.unwrap_or(config.search.top_k);
    let ranked = ranker.rank(&args.query, &documents, k)?;
    tracing::info!("Ranked {} of {} candidates", ranked.len(), documents.len());

    let pretty = args.pretty || config.output.pretty;
    let mut writer = OutputWriter::new(std::io::stdout().lock(), format, pretty);
    writer.write_all(&ranked)?;
    writer.flush()?;
    Ok(())
}

/// Read candidate documents from a file, one per line, skipping blanks.
fn read_documents(path: &std::path::Path) -> anyhow::Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Cannot read candidates file {:?}: {e}", path))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}
