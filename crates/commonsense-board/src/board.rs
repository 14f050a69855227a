//! Board descriptor model.
//!
//! Mirrors the `build.*` / `upload.*` layout of a PlatformIO board manifest,
//! so the same descriptor can be read from the host's JSON board files or
//! from a hand-written TOML file.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Floating-point calling convention passed as `-mfloat-abi`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FloatAbi {
    /// Software floating point, no FPU instructions.
    Soft,
    /// FPU instructions with the soft-float calling convention.
    Softfp,
    /// FPU instructions and FP registers for arguments.
    Hard,
}

impl FloatAbi {
    /// The value of the `-mfloat-abi=` switch.
    pub fn as_str(self) -> &'static str {
        match self {
            FloatAbi::Soft => "soft",
            FloatAbi::Softfp => "softfp",
            FloatAbi::Hard => "hard",
        }
    }
}

impl fmt::Display for FloatAbi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `build` section of a board descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// ARM core name (e.g., "cortex-m4").
    #[serde(default)]
    pub cpu: String,
    /// Vendor header subdirectory (e.g., "samd51").
    #[serde(default)]
    pub variant: String,
    /// MCU part name (e.g., "samd51j20a").
    #[serde(default)]
    pub mcu: String,
    /// Clock frequency token as written in the manifest (e.g., "120000000L").
    #[serde(default)]
    pub f_cpu: String,
    /// Floating-point ABI; derived from `fpu` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub float_abi: Option<FloatAbi>,
    /// FPU name (e.g., "fpv4-sp-d16"); empty for cores without one.
    #[serde(default)]
    pub fpu: String,
    /// Linker script override; empty means "use the default".
    #[serde(default)]
    pub ldscript: String,
}

/// The `upload` section of a board descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Flash size in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_size: Option<u64>,
    /// RAM size in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_ram_size: Option<u64>,
}

/// Read-only metadata describing one target board.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardDescriptor {
    /// Human-readable board name.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub build: BuildConfig,
    #[serde(default)]
    pub upload: UploadConfig,
}

impl BoardDescriptor {
    /// `build.cpu`, e.g. `cortex-m4`.
    pub fn cpu(&self) -> &str {
        self.build.cpu.trim()
    }

    /// `build.variant`, the device family directory name.
    pub fn variant(&self) -> &str {
        self.build.variant.trim()
    }

    /// `build.mcu`, the exact part number.
    pub fn mcu(&self) -> &str {
        self.build.mcu.trim()
    }

    /// FPU name, or `None` when the board has no FPU configured.
    pub fn fpu(&self) -> Option<&str> {
        let fpu = self.build.fpu.trim();
        (!fpu.is_empty()).then_some(fpu)
    }

    /// Effective floating-point ABI.
    ///
    /// An explicit `build.float_abi` wins; otherwise boards with an FPU
    /// default to `hard` and boards without one to `soft`.
    pub fn float_abi(&self) -> FloatAbi {
        match self.build.float_abi {
            Some(abi) => abi,
            None if self.fpu().is_some() => FloatAbi::Hard,
            None => FloatAbi::Soft,
        }
    }

    /// Whether generated code uses FPU instructions.
    pub fn has_hardware_fpu(&self) -> bool {
        self.float_abi() != FloatAbi::Soft && self.fpu().is_some()
    }

    /// Linker script override, or `None` when the default should be used.
    pub fn ldscript_override(&self) -> Option<&Path> {
        let script = self.build.ldscript.trim();
        (!script.is_empty()).then(|| Path::new(script))
    }

    /// The raw clock token (e.g., "120000000L"), suitable for a C define.
    pub fn clock_define(&self) -> Option<&str> {
        let f_cpu = self.build.f_cpu.trim();
        (!f_cpu.is_empty()).then_some(f_cpu)
    }

    /// Clock frequency in Hz, with C integer suffixes stripped.
    pub fn clock_frequency(&self) -> Option<u64> {
        let token = self.clock_define()?;
        token
            .trim_end_matches(['L', 'l', 'U', 'u'])
            .parse()
            .ok()
    }

    /// Dotted key lookup (e.g., "build.cpu", "upload.maximum_size").
    ///
    /// Missing or unknown keys yield an empty string.
    pub fn get(&self, key: &str) -> String {
        let Ok(value) = serde_json::to_value(self) else {
            return String::new();
        };
        let pointer = format!("/{}", key.replace('.', "/"));
        match value.pointer(&pointer) {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }

    /// The CommonSense SAMD51 board (Cortex-M4F, 120 MHz).
    pub fn commonsense_samd51() -> Self {
        Self {
            name: "CommonSense SAMD51".into(),
            build: BuildConfig {
                cpu: "cortex-m4".into(),
                variant: "samd51".into(),
                mcu: "samd51j20a".into(),
                f_cpu: "120000000L".into(),
                float_abi: Some(FloatAbi::Hard),
                fpu: "fpv4-sp-d16".into(),
                ldscript: String::new(),
            },
            upload: UploadConfig {
                maximum_size: Some(1024 * 1024), // 1 MiB
                maximum_ram_size: Some(256 * 1024), // 256 KiB
            },
        }
    }
}
