//! `commonsense compose`: build the environment record for the host.

use std::path::Path;

use anyhow::{bail, Context, Result};
use commonsense_env::{compose, Composition, Variant};

use crate::config::{load_board_or_default, HostConfig, CONFIG_FILE};

/// Options collected from the command line.
#[derive(Debug, Default)]
pub struct ComposeArgs<'a> {
    pub config: Option<&'a Path>,
    pub variant: Option<Variant>,
    pub board: Option<&'a Path>,
    pub output: Option<&'a Path>,
}

/// Compose and print (or write) the environment as JSON.
pub fn run(cwd: &Path, args: &ComposeArgs<'_>) -> Result<()> {
    let composition = compose_from(cwd, args)?;
    let json = composition.to_json()?;
    match args.output {
        Some(path) => {
            std::fs::write(path, json + "\n")
                .with_context(|| format!("writing {}", path.display()))?;
            log::info!("wrote {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

/// Load the config and board, then run composition.
pub fn compose_from(cwd: &Path, args: &ComposeArgs<'_>) -> Result<Composition> {
    let config = match args.config {
        Some(path) => HostConfig::load(path)?,
        None => match HostConfig::find_and_load(cwd)? {
            Some((config, _)) => config,
            None => bail!("no {CONFIG_FILE} found in {} or its parents", cwd.display()),
        },
    };

    let board = match args.board {
        Some(path) => load_board_or_default(Some(path))?,
        None => config.board()?,
    };
    let variant = args.variant.unwrap_or(config.variant);

    let composition = compose(variant, &board, &config.locator(), &config.host_context())
        .context("composing toolchain environment")?;
    Ok(composition)
}
