//! Package locator: logical package names to installed directories.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Logical packages the composers depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Package {
    /// ARM CMSIS core headers and prebuilt DSP libraries.
    CoreHeaders,
    /// Atmel CMSIS device headers and startup sources.
    VendorHeaders,
    /// CommonSense framework sources and bundled linker script.
    FrameworkSources,
}

impl Package {
    /// Every package, in resolution order.
    pub const ALL: [Package; 3] = [
        Package::CoreHeaders,
        Package::VendorHeaders,
        Package::FrameworkSources,
    ];

    /// The name used when asking a locator for this package.
    pub fn logical_name(self) -> &'static str {
        match self {
            Package::CoreHeaders => "core-headers",
            Package::VendorHeaders => "vendor-headers",
            Package::FrameworkSources => "framework-sources",
        }
    }

    /// Directory name of the installed package under a packages root.
    pub fn install_name(self) -> &'static str {
        match self {
            Package::CoreHeaders => "framework-cmsis",
            Package::VendorHeaders => "framework-cmsis-atmel",
            Package::FrameworkSources => "framework-commonsense",
        }
    }

    /// Inverse of [`Package::logical_name`].
    pub fn from_logical_name(name: &str) -> Option<Package> {
        Package::ALL.into_iter().find(|p| p.logical_name() == name)
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.logical_name())
    }
}

/// Resolves logical package names to absolute directories on the host.
///
/// Returning `None` means the package is not installed. Locators do not
/// check that the returned path exists; the caller validates it.
pub trait PackageLocator {
    /// Directory of the package named `logical_name`, if installed.
    fn resolve(&self, logical_name: &str) -> Option<PathBuf>;
}

impl<L: PackageLocator + ?Sized> PackageLocator for &L {
    fn resolve(&self, logical_name: &str) -> Option<PathBuf> {
        (**self).resolve(logical_name)
    }
}

/// Explicit logical-name to path map, as written in a host config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageMap {
    entries: BTreeMap<String, PathBuf>,
}

impl PackageMap {
    /// An empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, logical_name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.insert(logical_name, path);
        self
    }

    /// Set the directory for a logical name, replacing any earlier entry.
    pub fn insert(&mut self, logical_name: impl Into<String>, path: impl Into<PathBuf>) {
        self.entries.insert(logical_name.into(), path.into());
    }

    /// Forget a logical name, returning its directory.
    pub fn remove(&mut self, logical_name: &str) -> Option<PathBuf> {
        self.entries.remove(logical_name)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no entries are set.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PackageLocator for PackageMap {
    fn resolve(&self, logical_name: &str) -> Option<PathBuf> {
        self.entries.get(logical_name).cloned()
    }
}

/// PlatformIO-style packages root: `<root>/<install name>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagesDir {
    root: PathBuf,
}

impl PackagesDir {
    /// Locate packages under `root`, typically `.platformio/packages` in the home directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl PackageLocator for PackagesDir {
    fn resolve(&self, logical_name: &str) -> Option<PathBuf> {
        let package = Package::from_logical_name(logical_name)?;
        let path = self.root.join(package.install_name());
        log::debug!("{logical_name} -> {}", path.display());
        Some(path)
    }
}
