//! Environment composition orchestrator.

use std::path::PathBuf;

use commonsense_board::{BoardDescriptor, Package, PackageLocator};
use serde::{Deserialize, Serialize};

use crate::environment::{Composition, Environment};
use crate::error::ConfigError;
use crate::flags::{FlagSet, Variant};
use crate::ldscript::{resolve_linker_script, ScriptInputs};
use crate::library;
use crate::resolve::{board_fields, resolve_packages};

/// Host-owned locations the composers need besides packages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct HostContext {
    /// Root of the platform package (holds the bare variant's linker script).
    pub platform_dir: PathBuf,
    /// Build output area; library units are placed under it.
    pub build_dir: PathBuf,
    /// Project root, searched for relative linker script overrides.
    #[serde(default)]
    pub project_dir: Option<PathBuf>,
}

impl HostContext {
    /// Host context with no project directory.
    pub fn new(platform_dir: impl Into<PathBuf>, build_dir: impl Into<PathBuf>) -> Self {
        Self {
            platform_dir: platform_dir.into(),
            build_dir: build_dir.into(),
            project_dir: None,
        }
    }

    /// Search `project_dir` first for relative linker script overrides.
    pub fn with_project_dir(mut self, project_dir: impl Into<PathBuf>) -> Self {
        self.project_dir = Some(project_dir.into());
        self
    }
}

/// Packages each variant resolves before anything else.
pub fn required_packages(variant: Variant) -> &'static [Package] {
    match variant {
        Variant::Bare => &[Package::CoreHeaders, Package::VendorHeaders],
        Variant::Framework => &[
            Package::CoreHeaders,
            Package::VendorHeaders,
            Package::FrameworkSources,
        ],
    }
}

/// Compose the toolchain environment for one build:
/// resolve packages -> board fields -> flags -> linker script -> libraries -> finalize.
pub fn compose(
    variant: Variant,
    board: &BoardDescriptor,
    locator: &dyn PackageLocator,
    host: &HostContext,
) -> Result<Composition, ConfigError> {
    // Stage 1: Package and board resolution
    let packages = resolve_packages(locator, required_packages(variant))?;
    let core_dir = packages.require(Package::CoreHeaders)?;
    let vendor_dir = packages.require(Package::VendorHeaders)?;
    let framework_dir = match variant {
        Variant::Framework => Some(packages.require(Package::FrameworkSources)?),
        Variant::Bare => None,
    };
    let fields = board_fields(board)?;

    // Stage 2: Flag sets
    let mut flags = FlagSet::base(variant);
    flags.apply_hardware(&fields);
    flags.apply_math_library(&fields);
    flags.apply_defines(&fields);
    flags.add_cmsis_paths(core_dir, vendor_dir, fields.variant);
    if let Some(framework_dir) = framework_dir {
        flags.include_paths.append([framework_dir.join("src")]);
    }

    // Stage 3: Linker script
    let library_paths = flags.library_paths.finalize_unique();
    let script = resolve_linker_script(&ScriptInputs {
        variant,
        board_override: board.ldscript_override(),
        framework_dir,
        platform_dir: &host.platform_dir,
        project_dir: host.project_dir.as_deref(),
        library_paths: &library_paths,
    })?;
    if let Some(search_dir) = &script.search_dir {
        flags.library_paths.append([search_dir.clone()]);
    }
    log::debug!("linker script ({}): {}", script.source, script.path.display());

    // Stage 4: Library build units
    let libraries = match framework_dir {
        Some(framework_dir) => {
            let units =
                library::framework_units(framework_dir, vendor_dir, fields.variant, &host.build_dir);
            library::check_sources(&units)?;
            library::register(&units, &mut flags.libs);
            units
        }
        None => Vec::new(),
    };

    // Stage 5: Finalize
    let environment = Environment::finalize(&flags, script);
    log::info!(
        "composed {variant} environment for {}: {} compile flags, {} libraries to build, script {}",
        board_label(board),
        environment.compile_flags.len(),
        libraries.len(),
        environment.linker_script.path.display()
    );

    Ok(Composition {
        variant,
        environment,
        libraries,
    })
}

/// Compose with no framework sources.
pub fn compose_bare(
    board: &BoardDescriptor,
    locator: &dyn PackageLocator,
    host: &HostContext,
) -> Result<Composition, ConfigError> {
    compose(Variant::Bare, board, locator, host)
}

/// Compose with the framework sources compiled into libraries.
pub fn compose_framework(
    board: &BoardDescriptor,
    locator: &dyn PackageLocator,
    host: &HostContext,
) -> Result<Composition, ConfigError> {
    compose(Variant::Framework, board, locator, host)
}

fn board_label(board: &BoardDescriptor) -> &str {
    if board.name.is_empty() {
        board.cpu()
    } else {
        &board.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use commonsense_board::PackageMap;

    struct Tree {
        _dir: tempfile::TempDir,
        locator: PackageMap,
        host: HostContext,
        framework: PathBuf,
    }

    fn tree() -> Tree {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let core = root.join("framework-cmsis");
        let vendor = root.join("framework-cmsis-atmel");
        let framework = root.join("framework-commonsense");
        let platform = root.join("platform");
        for d in [
            core.join("CMSIS/Include"),
            vendor.join("CMSIS/Device/ATMEL/samd51/source"),
            framework.join("src"),
            framework.join("linker"),
            platform.join("linker"),
        ] {
            std::fs::create_dir_all(d).unwrap();
        }
        std::fs::write(framework.join("linker/commonsense_linker.ld"), "").unwrap();
        std::fs::write(platform.join("linker/commonsense_linker.ld"), "").unwrap();

        let locator = PackageMap::new()
            .with("core-headers", &core)
            .with("vendor-headers", &vendor)
            .with("framework-sources", &framework);
        let host = HostContext::new(platform, root.join(".build"));
        Tree {
            _dir: dir,
            locator,
            host,
            framework,
        }
    }

    #[test]
    fn framework_composition() {
        let t = tree();
        let board = BoardDescriptor::commonsense_samd51();
        let c = compose_framework(&board, &t.locator, &t.host).unwrap();
        assert_eq!(c.variant, Variant::Framework);
        assert_eq!(c.libraries.len(), 2);
        assert!(c.environment.include_paths.contains(&t.framework.join("src")));
        assert!(c
            .environment
            .library_paths
            .contains(&t.framework.join("linker")));
    }

    #[test]
    fn bare_composition_builds_nothing() {
        let t = tree();
        let board = BoardDescriptor::commonsense_samd51();
        let c = compose_bare(&board, &t.locator, &t.host).unwrap();
        assert!(c.libraries.is_empty());
        assert_eq!(c.environment.libs, vec!["arm_cortexM4lf_math", "m"]);
        assert!(!c
            .environment
            .include_paths
            .contains(&t.framework.join("src")));
    }

    #[test]
    fn bare_ignores_missing_framework_package() {
        let mut t = tree();
        t.locator.remove("framework-sources");
        let board = BoardDescriptor::commonsense_samd51();
        assert!(compose_bare(&board, &t.locator, &t.host).is_ok());
        let err = compose_framework(&board, &t.locator, &t.host).unwrap_err();
        assert_eq!(err.subject(), "framework-sources");
    }

    #[test]
    fn empty_variant_field_fails() {
        let t = tree();
        let mut board = BoardDescriptor::commonsense_samd51();
        board.build.variant.clear();
        let err = compose_bare(&board, &t.locator, &t.host).unwrap_err();
        assert!(matches!(err, ConfigError::MissingBoardField { .. }));
    }
}
