use std::{fs, path::Path};

use anyhow::{Context, Result};
use decay_cascade_core::CascadeConfig;
use serde::Deserialize;

use crate::Cli;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    cascade: CascadeConfig,
}

/// Builds the run configuration from the optional file and command-line overrides.
pub(crate) fn resolve(cli: &Cli) -> Result<CascadeConfig> {
    let mut config = match &cli.config {
        Some(path) => load(path)?,
        None => CascadeConfig::default(),
    };

    if let Some(layers) = cli.layers {
        config.layer_count = layers;
    }
    if let Some(stride) = cli.stride {
        config.stride = stride;
    }
    if let Some(threshold) = cli.threshold {
        config.threshold = threshold;
    }
    if let Some(coefficient) = cli.coefficient {
        config.coefficient = coefficient;
    }

    config
        .validate()
        .context("cascade configuration rejected")?;
    Ok(config)
}

fn load(path: &Path) -> Result<CascadeConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read cascade config at {}", path.display()))?;
    parse(&contents).with_context(|| format!("invalid cascade config at {}", path.display()))
}

fn parse(contents: &str) -> Result<CascadeConfig> {
    let file: ConfigFile =
        toml::from_str(contents).context("failed to parse cascade config toml contents")?;
    Ok(file.cascade)
}
