//! `commonsense init`: write a starter `commonsense.toml`.

use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::config::{HostConfig, CONFIG_FILE};

/// Create `commonsense.toml` in `dir`, refusing to overwrite an existing one.
pub fn run(dir: &Path, packages_dir: &str) -> Result<()> {
    let path = dir.join(CONFIG_FILE);
    if path.exists() {
        bail!("{} already exists", path.display());
    }
    std::fs::write(&path, HostConfig::template(packages_dir))
        .with_context(|| format!("writing {}", path.display()))?;
    println!("Created {}", path.display());
    Ok(())
}
