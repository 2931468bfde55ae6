//! The `cargolens query` command: interpret an Arabic search query.

use clap::Args;

use cargolens_core::search::{interpret, Lexicon};
use cargolens_core::{Config, OutputFormat, OutputWriter};

/// Arguments for the `query` command.
#[derive(Args, Debug)]
pub struct QueryArgs {
    /// The search query text
    pub text: Option<String>,

    /// Pretty-print the JSON payload
    #[arg(long)]
    pub pretty: bool,
}

/// Execute the query command.
///
/// Interpretation is a pure function over the lexicon; no model is loaded.
pub fn execute(args: QueryArgs, config: &Config) -> anyhow::Result<()> {
    let Some(text) = args.text else {
        anyhow::bail!("No query provided");
    };

    let lexicon = match config.lexicon_path() {
        Some(path) => {
            tracing::debug!("Loading lexicon override from {:?}", path);
            Lexicon::load_from(&path)?
        }
        None => Lexicon::default(),
    };

    let analysis = interpret(&text, &lexicon);

    let pretty = args.pretty || config.output.pretty;
    let mut writer = OutputWriter::new(std::io::stdout().lock(), OutputFormat::Json, pretty);
    writer.write(&analysis)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_query_is_an_error() {
        let args = QueryArgs {
            text: None,
            pretty: false,
        };
        let err = execute(args, &Config::default()).unwrap_err();
        assert_eq!(err.to_string(), "No query provided");
    }

    #[test]
    fn query_runs_without_any_model() {
        let args = QueryArgs {
            text: Some("شاحنات في جدة".to_string()),
            pretty: false,
        };
        assert!(execute(args, &Config::default()).is_ok());
    }

    #[test]
    fn missing_lexicon_override_is_an_error() {
        let mut config = Config::default();
        config.search.lexicon_file = Some("/nonexistent/lexicon.toml".to_string());

        let args = QueryArgs {
            text: Some("نقل اثاث".to_string()),
            pretty: false,
        };
        assert!(execute(args, &config).is_err());
    }

    #[test]
    fn lexicon_override_is_loaded_from_config_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lexicon.toml");
        std::fs::write(
            &path,
            "cities = [\"الرياض\"]\ncountries = [\"السعودية\"]\n",
        )
        .unwrap();

        let mut config = Config::default();
        config.search.lexicon_file = Some(path.display().to_string());

        let args = QueryArgs {
            text: Some("نقل من الرياض".to_string()),
            pretty: false,
        };
        assert!(execute(args, &config).is_ok());
    }
}
