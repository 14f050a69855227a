//! Board descriptor and package locator models for CommonSense targets.
//!
//! These are the two read-only inputs of environment composition:
//! - **Board Descriptor:** CPU, vendor variant, floating-point setup, clock, linker script override
//! - **Package Locator:** maps logical package names to installed directories

pub mod board;
pub mod error;
pub mod package;
pub mod parse;

pub use board::{BoardDescriptor, BuildConfig, FloatAbi, UploadConfig};
pub use error::{BoardError, Result};
pub use package::{Package, PackageLocator, PackageMap, PackagesDir};
pub use parse::{
    board_to_toml, discover_boards, load_board, parse_board_json, parse_board_toml, validate_board,
    ValidationIssue,
};
