//! The `cargolens analyze` command: tag and caption one cargo image.

use clap::Args;
use std::path::PathBuf;

use cargolens_core::{Config, ImageAnalyzer, OutputFormat, OutputWriter};

/// Arguments for the `analyze` command.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Path to the image file to analyze
    pub image: PathBuf,

    /// Pretty-print the JSON payload
    #[arg(long)]
    pub pretty: bool,
}

/// Execute the analyze command.
///
/// Emits the success payload on stdout. Fatal errors (missing file, model
/// load failure) propagate to main, which converts them into the `{error}`
/// payload on stderr with exit status 1.
pub async fn execute(args: AnalyzeArgs, config: &Config) -> anyhow::Result<()> {
    let analyzer = ImageAnalyzer::load(config)?;

    tracing::info!("Analyzing {:?}", args.image);
    let analysis = analyzer.analyze(&args.image).await?;

    if analysis.clip_tags.is_empty() {
        tracing::warn!("No category tags produced for {:?}", args.image);
    }

    let pretty = args.pretty || config.output.pretty;
    let mut writer = OutputWriter::new(std::io::stdout().lock(), OutputFormat::Json, pretty);
    writer.write(&analysis)?;
    writer.flush()?;
    Ok(())
}
