//! Static libraries the host must build before the final link.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::flags::FlagList;

/// Library holding the framework's own sources.
pub const FRAMEWORK_CORE_LIB: &str = "FrameworkCommonSense";

/// Library holding the vendor device startup/system sources.
pub const VENDOR_DRIVERS_LIB: &str = "FrameworkCMSISDevice";

/// One static library to compile from a source directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LibraryBuildUnit {
    pub name: String,
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
}

/// The framework variant's two libraries, in link order.
pub fn framework_units(
    framework_dir: &Path,
    vendor_dir: &Path,
    variant: &str,
    build_dir: &Path,
) -> Vec<LibraryBuildUnit> {
    let vendor_sources = vendor_dir
        .join("CMSIS")
        .join("Device")
        .join("ATMEL")
        .join(variant)
        .join("source");
    [
        (FRAMEWORK_CORE_LIB, framework_dir.join("src")),
        (VENDOR_DRIVERS_LIB, vendor_sources),
    ]
    .into_iter()
    .map(|(name, source_dir)| LibraryBuildUnit {
        name: name.to_string(),
        source_dir,
        output_dir: build_dir.join(name),
    })
    .collect()
}

/// Check every unit's source directory exists.
pub fn check_sources(units: &[LibraryBuildUnit]) -> Result<(), ConfigError> {
    for unit in units {
        if !unit.source_dir.is_dir() {
            return Err(ConfigError::MissingLibrarySource {
                library: unit.name.clone(),
                path: unit.source_dir.clone(),
            });
        }
        log::debug!(
            "library {}: {} -> {}",
            unit.name,
            unit.source_dir.display(),
            unit.output_dir.display()
        );
    }
    Ok(())
}

/// Put the units ahead of every library registered so far, keeping their order.
pub fn register(units: &[LibraryBuildUnit], libs: &mut FlagList<String>) {
    libs.prepend(units.iter().map(|u| u.name.clone()));
}
