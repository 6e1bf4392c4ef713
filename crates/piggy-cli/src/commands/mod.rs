//! Subcommand implementations.

pub mod batch;
pub mod config;
pub mod extract;
pub mod ledger;

use std::path::Path;

use tracing::debug;

use piggy_core::{HttpGenerator, PiggyConfig, ReceiptExtractor};

/// Load the configuration from `path`, else the default file if it exists,
/// else defaults; environment overrides are applied last.
pub fn load_config(path: Option<&str>) -> anyhow::Result<PiggyConfig> {
    let mut config = match path {
        Some(path) => PiggyConfig::from_file(Path::new(path))?,
        None => {
            let default_path = config::default_config_path();
            if default_path.exists() {
                debug!("Using config file {}", default_path.display());
                PiggyConfig::from_file(&default_path)?
            } else {
                PiggyConfig::default()
            }
        }
    };

    config.apply_env();
    Ok(config)
}

/// Build the extraction pipeline against the configured generation service.
pub fn build_extractor(config: &PiggyConfig) -> anyhow::Result<ReceiptExtractor<HttpGenerator>> {
    let generator = HttpGenerator::new(&config.llm, config.generation.clone())?;
    debug!("Generation endpoint: {}", generator.url());
    Ok(ReceiptExtractor::from_config(generator, &config.extraction))
}
