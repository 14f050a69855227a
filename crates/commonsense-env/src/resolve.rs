//! Package and board resolution.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use commonsense_board::{BoardDescriptor, FloatAbi, Package, PackageLocator};

use crate::error::ConfigError;

/// Packages resolved to existing directories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedPackages {
    dirs: BTreeMap<Package, PathBuf>,
}

impl ResolvedPackages {
    /// Directory of a resolved package.
    pub fn dir(&self, package: Package) -> Option<&Path> {
        self.dirs.get(&package).map(PathBuf::as_path)
    }

    /// Directory of a package the caller required.
    ///
    /// Fails with `UnresolvedPackage` if it was not part of the request.
    pub fn require(&self, package: Package) -> Result<&Path, ConfigError> {
        self.dir(package).ok_or_else(|| ConfigError::UnresolvedPackage {
            name: package.logical_name().to_string(),
        })
    }

    /// Number of resolved packages.
    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    /// True when nothing was resolved.
    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }
}

/// Resolve each required package and check it is an existing directory.
///
/// Stops at the first package that fails.
pub fn resolve_packages(
    locator: &dyn PackageLocator,
    required: &[Package],
) -> Result<ResolvedPackages, ConfigError> {
    let mut dirs = BTreeMap::new();
    for &package in required {
        let name = package.logical_name();
        let path = locator
            .resolve(name)
            .ok_or_else(|| ConfigError::UnresolvedPackage {
                name: name.to_string(),
            })?;
        if !path.is_dir() {
            return Err(ConfigError::MissingPackageDir {
                name: name.to_string(),
                path,
            });
        }
        log::debug!("package {name}: {}", path.display());
        dirs.insert(package, path);
    }
    Ok(ResolvedPackages { dirs })
}

/// Board fields every composer needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardFields<'a> {
    /// `-mcpu` value.
    pub cpu: &'a str,
    /// Device family, used for the CMSIS device paths.
    pub variant: &'a str,
    pub float_abi: FloatAbi,
    /// FPU switch value; `None` with the soft ABI even if the board names one.
    pub fpu: Option<&'a str>,
    /// Raw `build.f_cpu` token.
    pub clock: Option<&'a str>,
}

/// Read and check the board fields used by composition.
pub fn board_fields(board: &BoardDescriptor) -> Result<BoardFields<'_>, ConfigError> {
    if board.cpu().is_empty() {
        return Err(ConfigError::MissingBoardField {
            key: "build.cpu".into(),
        });
    }
    if board.variant().is_empty() {
        return Err(ConfigError::MissingBoardField {
            key: "build.variant".into(),
        });
    }

    let float_abi = board.float_abi();
    let fpu = match (float_abi, board.fpu()) {
        (FloatAbi::Soft, _) => None,
        (_, Some(fpu)) => Some(fpu),
        (abi, None) => {
            return Err(ConfigError::InvalidBoard {
                detail: format!("float ABI '{abi}' requires build.fpu"),
            })
        }
    };

    Ok(BoardFields {
        cpu: board.cpu(),
        variant: board.variant(),
        float_abi,
        fpu,
        clock: board.clock_define(),
    })
}
