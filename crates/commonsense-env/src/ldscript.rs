//! Linker script resolution.
//!
//! Priority chain, terminal on the first applicable state:
//! board override -> framework default (framework variant) -> platform default (bare variant).

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::flags::Variant;

/// File name of the bundled scripts.
pub const DEFAULT_SCRIPT_NAME: &str = "commonsense_linker.ld";

/// Directory holding the bundled script, relative to the framework or platform root.
pub const DEFAULT_SCRIPT_DIR: &str = "linker";

/// Where the resolved linker script came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScriptSource {
    BoardOverride,
    FrameworkDefault,
    PlatformDefault,
}

impl fmt::Display for ScriptSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScriptSource::BoardOverride => "board override",
            ScriptSource::FrameworkDefault => "framework default",
            ScriptSource::PlatformDefault => "platform default",
        })
    }
}

/// A resolved linker script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LinkerScript {
    /// The reference handed to the linker: an absolute path, or a file
    /// name found directly in `search_dir`.
    pub path: PathBuf,
    /// Which link of the chain produced the script.
    pub source: ScriptSource,
    /// Directory that must be on the library search path for `path` to resolve by name.
    pub search_dir: Option<PathBuf>,
}

impl LinkerScript {
    /// The `-T` switch for the linker.
    pub fn link_flag(&self) -> String {
        match (&self.search_dir, self.path.file_name()) {
            (Some(_), Some(name)) => format!("-T{}", name.to_string_lossy()),
            _ => format!("-T{}", self.path.display()),
        }
    }
}

/// Inputs to the resolution chain.
#[derive(Debug, Clone, Copy)]
pub struct ScriptInputs<'a> {
    pub variant: Variant,
    /// Non-empty `build.ldscript` from the board.
    pub board_override: Option<&'a Path>,
    /// Resolved framework root (framework variant).
    pub framework_dir: Option<&'a Path>,
    /// Platform package root (bare variant).
    pub platform_dir: &'a Path,
    /// Project root, searched first for relative overrides.
    pub project_dir: Option<&'a Path>,
    /// Library search paths collected so far, searched for relative overrides.
    pub library_paths: &'a [PathBuf],
}

/// Walk the chain and return the first applicable script.
///
/// A board override is terminal even when it cannot be found: falling back
/// to a bundled script would silently change the memory map.
pub fn resolve_linker_script(inputs: &ScriptInputs<'_>) -> Result<LinkerScript, ConfigError> {
    // State 1: board override
    if let Some(script) = inputs.board_override {
        return resolve_override(script, inputs);
    }

    match (inputs.variant, inputs.framework_dir) {
        // State 2: framework default
        (Variant::Framework, Some(framework_dir)) => {
            let dir = framework_dir.join(DEFAULT_SCRIPT_DIR);
            let path = dir.join(DEFAULT_SCRIPT_NAME);
            require_file(ScriptSource::FrameworkDefault, &path)?;
            Ok(LinkerScript {
                path,
                source: ScriptSource::FrameworkDefault,
                search_dir: Some(dir),
            })
        }
        (Variant::Framework, None) => Err(ConfigError::UnresolvedPackage {
            name: commonsense_board::Package::FrameworkSources
                .logical_name()
                .to_string(),
        }),
        // State 3: platform default
        (Variant::Bare, _) => {
            let path = inputs
                .platform_dir
                .join(DEFAULT_SCRIPT_DIR)
                .join(DEFAULT_SCRIPT_NAME);
            require_file(ScriptSource::PlatformDefault, &path)?;
            Ok(LinkerScript {
                path,
                source: ScriptSource::PlatformDefault,
                search_dir: None,
            })
        }
    }
}

fn resolve_override(script: &Path, inputs: &ScriptInputs<'_>) -> Result<LinkerScript, ConfigError> {
    if script.is_absolute() {
        require_file(ScriptSource::BoardOverride, script)?;
        return Ok(LinkerScript {
            path: script.to_path_buf(),
            source: ScriptSource::BoardOverride,
            search_dir: None,
        });
    }

    let missing = || ConfigError::MissingLinkerScript {
        origin: ScriptSource::BoardOverride,
        path: script.to_path_buf(),
    };
    let found = inputs
        .project_dir
        .into_iter()
        .chain(inputs.library_paths.iter().map(PathBuf::as_path))
        .map(|dir| dir.join(script))
        .find(|candidate| candidate.is_file())
        .ok_or_else(missing)?;

    // `-T` takes a bare name, so a script in a subdirectory is searched
    // from that subdirectory.
    let (Some(search_dir), Some(name)) = (found.parent(), found.file_name()) else {
        return Err(missing());
    };
    Ok(LinkerScript {
        path: PathBuf::from(name),
        source: ScriptSource::BoardOverride,
        search_dir: Some(search_dir.to_path_buf()),
    })
}

fn require_file(origin: ScriptSource, path: &Path) -> Result<(), ConfigError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ConfigError::MissingLinkerScript {
            origin,
            path: path.to_path_buf(),
        })
    }
}
