//! The environment record handed to the build host.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::flags::{FlagSet, Variant};
use crate::ldscript::LinkerScript;
use crate::library::LibraryBuildUnit;

/// Finalized toolchain environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Environment {
    /// Flags for both C and C++ compilation.
    pub compile_flags: Vec<String>,
    /// Compile flags plus `-x assembler-with-cpp`.
    pub assemble_flags: Vec<String>,
    pub c_flags: Vec<String>,
    pub cxx_flags: Vec<String>,
    pub link_flags: Vec<String>,
    /// Preprocessor definitions as `NAME=VALUE`.
    pub defines: Vec<String>,
    pub include_paths: Vec<PathBuf>,
    pub library_paths: Vec<PathBuf>,
    /// Libraries in link order.
    pub libs: Vec<String>,
    pub linker_script: LinkerScript,
}

impl Environment {
    /// Finalize every category of a flag set.
    ///
    /// Assembler flags are taken from the finalized compile flags here, so
    /// nothing added to the set afterwards can leave them stale.
    pub fn finalize(flags: &FlagSet, linker_script: LinkerScript) -> Self {
        Self {
            compile_flags: flags.compile.finalize(),
            assemble_flags: flags.assemble_flags(),
            c_flags: flags.c.finalize(),
            cxx_flags: flags.cxx.finalize(),
            link_flags: flags.link.finalize(),
            defines: flags.defines.finalize(),
            include_paths: flags.include_paths.finalize_unique(),
            library_paths: flags.library_paths.finalize_unique(),
            libs: flags.libs.finalize(),
            linker_script,
        }
    }

    /// Defines rendered as `-D` switches.
    pub fn define_flags(&self) -> Vec<String> {
        self.defines.iter().map(|d| format!("-D{d}")).collect()
    }

    /// Full linker argument tail: search paths, script, libraries.
    pub fn link_args(&self) -> Vec<String> {
        let mut args: Vec<String> = self
            .library_paths
            .iter()
            .map(|p| format!("-L{}", p.display()))
            .collect();
        args.push(self.linker_script.link_flag());
        args.extend(self.libs.iter().map(|l| format!("-l{l}")));
        args
    }
}

/// Everything one composition run produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Composition {
    pub variant: Variant,
    pub environment: Environment,
    /// Static libraries to build before linking; empty for the bare variant.
    pub libraries: Vec<LibraryBuildUnit>,
}

impl Composition {
    /// Pretty-printed JSON record for the host.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
