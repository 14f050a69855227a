//! `commonsense.toml` host configuration.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use commonsense_board::{BoardDescriptor, Package, PackageLocator, PackageMap, PackagesDir};
use commonsense_env::{HostContext, Variant};
use serde::{Deserialize, Serialize};

/// File name searched for by `find_and_load`.
pub const CONFIG_FILE: &str = "commonsense.toml";

/// The top-level host configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct HostConfig {
    /// Board descriptor file (`.json` or `.toml`); the built-in SAMD51 board when absent.
    #[serde(default)]
    pub board: Option<PathBuf>,
    /// Composer variant.
    #[serde(default = "default_variant")]
    pub variant: Variant,
    /// Host locations.
    pub host: HostSection,
    /// Package locations.
    #[serde(default)]
    pub packages: PackagesSection,
}

fn default_variant() -> Variant {
    Variant::Framework
}

/// `[host]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct HostSection {
    /// Platform package root.
    pub platform_dir: PathBuf,
    /// Build output area.
    #[serde(default = "default_build_dir")]
    pub build_dir: PathBuf,
    /// Project root; defaults to the directory holding the config file.
    #[serde(default)]
    pub project_dir: Option<PathBuf>,
}

fn default_build_dir() -> PathBuf {
    PathBuf::from(".pio/build")
}

/// `[packages]` section: `packages-dir` plus logical-name keys.
///
/// ```toml
/// [packages]
/// packages-dir = "/home/me/.platformio/packages"
/// core-headers = "/opt/cmsis"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PackagesSection {
    /// PlatformIO-style packages root.
    #[serde(default)]
    pub packages_dir: Option<PathBuf>,
    /// Explicit logical-name to path entries; these win over `packages-dir`.
    #[serde(flatten)]
    pub paths: BTreeMap<String, PathBuf>,
}

impl PackagesSection {
    /// Reject keys that name no known package.
    fn check_names(&self) -> Result<()> {
        for name in self.paths.keys() {
            if Package::from_logical_name(name).is_none() {
                let known: Vec<&str> = Package::ALL.iter().map(|p| p.logical_name()).collect();
                bail!(
                    "unknown key '{name}' in [packages] (expected packages-dir, {})",
                    known.join(", ")
                );
            }
        }
        Ok(())
    }
}

/// Explicit entries first, then the packages root.
#[derive(Debug, Clone)]
pub struct ConfigLocator {
    explicit: PackageMap,
    root: Option<PackagesDir>,
}

impl PackageLocator for ConfigLocator {
    fn resolve(&self, logical_name: &str) -> Option<PathBuf> {
        self.explicit
            .resolve(logical_name)
            .or_else(|| self.root.as_ref()?.resolve(logical_name))
    }
}

impl HostConfig {
    /// Search upward from `start_dir` for `commonsense.toml`, parse it and
    /// anchor its relative paths to the directory it was found in.
    pub fn find_and_load(start_dir: &Path) -> Result<Option<(Self, PathBuf)>> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let candidate = dir.join(CONFIG_FILE);
            if candidate.is_file() {
                let config = Self::load(&candidate)?;
                return Ok(Some((config, dir)));
            }
            if !dir.pop() {
                break;
            }
        }
        Ok(None)
    }

    /// Load a config file, anchoring relative paths to its directory.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config =
            Self::parse(&content).with_context(|| format!("parsing {}", path.display()))?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Ok(config.anchored(base))
    }

    /// Parse a config from a TOML string without anchoring.
    #[cfg(test)]
    pub fn from_str(s: &str) -> Result<Self> {
        Self::parse(s).context("parsing commonsense.toml")
    }

    fn parse(content: &str) -> Result<Self> {
        let config: HostConfig = toml::from_str(content)?;
        config.packages.check_names()?;
        Ok(config)
    }

    fn anchored(mut self, base: &Path) -> Self {
        self.board = self.board.map(|p| anchor(base, p));
        self.host.platform_dir = anchor(base, self.host.platform_dir);
        self.host.build_dir = anchor(base, self.host.build_dir);
        self.host.project_dir = Some(match self.host.project_dir {
            Some(p) => anchor(base, p),
            None => base.to_path_buf(),
        });
        self.packages.packages_dir = self.packages.packages_dir.map(|p| anchor(base, p));
        self.packages.paths = self
            .packages
            .paths
            .into_iter()
            .map(|(name, p)| (name, anchor(base, p)))
            .collect();
        self
    }

    /// Host locations for the composer.
    pub fn host_context(&self) -> HostContext {
        HostContext {
            platform_dir: self.host.platform_dir.clone(),
            build_dir: self.host.build_dir.clone(),
            project_dir: self.host.project_dir.clone(),
        }
    }

    /// Locator over the `[packages]` table.
    pub fn locator(&self) -> ConfigLocator {
        let explicit = self
            .packages
            .paths
            .iter()
            .fold(PackageMap::new(), |map, (name, path)| map.with(name.clone(), path.clone()));
        ConfigLocator {
            explicit,
            root: self.packages.packages_dir.clone().map(PackagesDir::new),
        }
    }

    /// The configured board, or the built-in one.
    pub fn board(&self) -> Result<BoardDescriptor> {
        load_board_or_default(self.board.as_deref())
    }

    /// Generate a starter config.
    pub fn template(packages_dir: &str) -> String {
        format!(
            r#"variant = "framework"

[host]
platform-dir = "platform"
build-dir = ".pio/build"

[packages]
packages-dir = "{packages_dir}"
"#
        )
    }
}

/// Load a board file, or fall back to the built-in SAMD51 board.
pub fn load_board_or_default(path: Option<&Path>) -> Result<BoardDescriptor> {
    match path {
        Some(path) => commonsense_board::load_board(path)
            .with_context(|| format!("loading board {}", path.display())),
        None => Ok(BoardDescriptor::commonsense_samd51()),
    }
}

fn anchor(base: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}
