//! Flag-set composition.
//!
//! Every category is a [`FlagList`] with two containers: overrides (prepend
//! precedence) and base entries (append). Precedence is only applied when a
//! list is finalized, so the order of `prepend`/`append` calls between
//! categories does not matter.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::resolve::BoardFields;

/// Marker appended to the compile flags to form the assembler flags.
pub const PREPROCESSED_ASSEMBLY: [&str; 2] = ["-x", "assembler-with-cpp"];

/// Generic math library, always linked last.
pub const GENERIC_MATH_LIB: &str = "m";

/// Two-phase ordered token list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagList<T> {
    overrides: Vec<T>,
    base: Vec<T>,
}

impl<T> Default for FlagList<T> {
    fn default() -> Self {
        Self {
            overrides: Vec::new(),
            base: Vec::new(),
        }
    }
}

impl<T: Clone> FlagList<T> {
    /// An empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a group ahead of everything added so far, including earlier overrides.
    pub fn prepend<I>(&mut self, items: I)
    where
        I: IntoIterator,
        I::Item: Into<T>,
    {
        let group: Vec<T> = items.into_iter().map(Into::into).collect();
        self.overrides.splice(0..0, group);
    }

    /// Add entries after every base entry added so far.
    pub fn append<I>(&mut self, items: I)
    where
        I: IntoIterator,
        I::Item: Into<T>,
    {
        self.base.extend(items.into_iter().map(Into::into));
    }

    /// Prepended groups, most recent first.
    pub fn overrides(&self) -> &[T] {
        &self.overrides
    }

    /// Appended entries, in insertion order.
    pub fn base(&self) -> &[T] {
        &self.base
    }

    /// True when neither container holds anything.
    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty() && self.base.is_empty()
    }

    /// Overrides followed by base entries.
    pub fn finalize(&self) -> Vec<T> {
        self.overrides.iter().chain(&self.base).cloned().collect()
    }
}

impl FlagList<PathBuf> {
    /// Like [`FlagList::finalize`], keeping only the first occurrence of each path.
    pub fn finalize_unique(&self) -> Vec<PathBuf> {
        let mut seen = HashSet::new();
        self.overrides
            .iter()
            .chain(&self.base)
            .filter(|p| seen.insert(*p))
            .cloned()
            .collect()
    }
}

/// Which composer the flags are for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Variant {
    /// CMSIS headers and platform linker script only.
    Bare,
    /// Framework sources compiled into libraries, framework linker script.
    Framework,
}

impl Variant {
    /// Lowercase name, as used in configs and output records.
    pub fn as_str(self) -> &'static str {
        match self {
            Variant::Bare => "bare",
            Variant::Framework => "framework",
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flags shared by C and C++ compilation.
const BASE_COMPILE_FLAGS: &[&str] = &[
    "-Os",
    "-ffunction-sections",
    "-fdata-sections",
    "-Wall",
    "-nostdlib",
    "--param",
    "max-inline-insns-single=500",
];

const BASE_C_FLAGS: &[&str] = &["-std=gnu11"];

const BASE_CXX_FLAGS: &[&str] = &[
    "-fno-rtti",
    "-fno-exceptions",
    "-std=gnu++11",
    "-fno-threadsafe-statics",
];

const BASE_LINK_FLAGS: &[&str] = &[
    "-Os",
    "-Wl,--gc-sections",
    "-Wl,--check-sections",
    "-Wl,--unresolved-symbols=report-all",
    "-Wl,--warn-common",
    "-Wl,--warn-section-align",
];

/// newlib-nano with stubbed syscalls; the bare variant has no framework to provide them.
const BARE_LINK_SPECS: &[&str] = &["--specs=nosys.specs", "--specs=nano.specs"];

/// All flag and path categories, before finalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagSet {
    /// Flags shared by C, C++ and assembly.
    pub compile: FlagList<String>,
    /// C-only flags.
    pub c: FlagList<String>,
    /// C++-only flags.
    pub cxx: FlagList<String>,
    /// Linker driver flags.
    pub link: FlagList<String>,
    /// Preprocessor defines, `NAME` or `NAME=VALUE`.
    pub defines: FlagList<String>,
    /// Libraries, without the `-l` prefix.
    pub libs: FlagList<String>,
    /// Header search paths.
    pub include_paths: FlagList<PathBuf>,
    /// Library and linker script search paths.
    pub library_paths: FlagList<PathBuf>,
}

impl FlagSet {
    /// A set with every category empty.
    pub fn new() -> Self {
        Self::default()
    }

    /// Board-independent flags for a variant.
    pub fn base(variant: Variant) -> Self {
        let mut set = Self::new();
        set.compile.append(BASE_COMPILE_FLAGS.iter().copied());
        set.c.append(BASE_C_FLAGS.iter().copied());
        set.cxx.append(BASE_CXX_FLAGS.iter().copied());
        if variant == Variant::Bare {
            set.link.append(BARE_LINK_SPECS.iter().copied());
        }
        set.link.append(BASE_LINK_FLAGS.iter().copied());
        set.libs.append([GENERIC_MATH_LIB]);
        set
    }

    /// Prepend the CPU, instruction set and floating-point switches to the
    /// compile and link flags.
    pub fn apply_hardware(&mut self, board: &BoardFields<'_>) {
        let switches = hardware_flags(board);
        self.compile.prepend(switches.iter().cloned());
        self.link.prepend(switches);
    }

    /// Prepend the accelerated CMSIS-DSP library when the board has an FPU.
    pub fn apply_math_library(&mut self, board: &BoardFields<'_>) {
        let Some(fpu) = board.fpu else {
            return;
        };
        match accelerated_math_lib(board.cpu, fpu) {
            Some(lib) => self.libs.prepend([lib]),
            None => log::warn!(
                "no CMSIS-DSP library for {} with {fpu}, linking '{GENERIC_MATH_LIB}' only",
                board.cpu
            ),
        }
    }

    /// Add the clock frequency define.
    pub fn apply_defines(&mut self, board: &BoardFields<'_>) {
        match board.clock {
            Some(clock) => self.defines.append([format!("F_CPU={clock}")]),
            None => log::warn!("board has no build.f_cpu, F_CPU is not defined"),
        }
    }

    /// CMSIS core and vendor device headers.
    pub fn add_cmsis_paths(&mut self, core_dir: &Path, vendor_dir: &Path, variant: &str) {
        let device = vendor_dir.join("CMSIS").join("Device").join("ATMEL");
        self.include_paths.append([
            core_dir.join("CMSIS").join("Include"),
            device.clone(),
            device.join(variant),
        ]);
        self.library_paths
            .append([core_dir.join("CMSIS").join("Lib").join("GCC")]);
    }

    /// Assembler flags derived from the finalized compile flags.
    pub fn assemble_flags(&self) -> Vec<String> {
        let mut flags = self.compile.finalize();
        flags.extend(PREPROCESSED_ASSEMBLY.iter().map(|s| s.to_string()));
        flags
    }
}

/// `-mcpu`, `-mthumb`, `-mfloat-abi` and, with an FPU, `-mfpu`.
pub fn hardware_flags(board: &BoardFields<'_>) -> Vec<String> {
    let mut flags = vec![
        format!("-mcpu={}", board.cpu),
        "-mthumb".to_string(),
        format!("-mfloat-abi={}", board.float_abi),
    ];
    if let Some(fpu) = board.fpu {
        flags.push(format!("-mfpu={fpu}"));
    }
    flags
}

/// Prebuilt CMSIS-DSP library for a core/FPU pair (little-endian builds).
pub fn accelerated_math_lib(cpu: &str, fpu: &str) -> Option<&'static str> {
    match (cpu, fpu) {
        ("cortex-m4", _) => Some("arm_cortexM4lf_math"),
        ("cortex-m7", "fpv5-sp-d16") => Some("arm_cortexM7lfsp_math"),
        ("cortex-m7", _) => Some("arm_cortexM7lfdp_math"),
        ("cortex-m33", _) => Some("arm_ARMv8MMLlfsp_math"),
        _ => None,
    }
}
