//! Toolchain environment composition for CommonSense Cortex-M targets.
//!
//! Turns a board descriptor and a package locator into the flags, search
//! paths, linker script and static library list an external build host needs
//! to drive `arm-none-eabi-gcc`. Composition is a single linear pass:
//! package resolution, flag-set composition, linker script resolution, and
//! (framework variant only) library build orchestration.
//!
//! Every failure is a [`ConfigError`]; no partial environment is ever returned.

pub mod compose;
pub mod environment;
pub mod error;
pub mod flags;
pub mod ldscript;
pub mod library;
pub mod resolve;

pub use compose::{compose, compose_bare, compose_framework, required_packages, HostContext};
pub use environment::{Composition, Environment};
pub use error::ConfigError;
pub use flags::{FlagList, FlagSet, Variant};
pub use ldscript::{resolve_linker_script, LinkerScript, ScriptInputs, ScriptSource};
pub use library::LibraryBuildUnit;
pub use resolve::{board_fields, resolve_packages, BoardFields, ResolvedPackages};
