//! Loading, serialization, validation, and discovery for board descriptors.
//!
//! Board descriptors are either PlatformIO `.json` manifests or hand-written
//! `.toml` files with the same `build` / `upload` layout.

use std::path::{Path, PathBuf};

use crate::board::{BoardDescriptor, FloatAbi};
use crate::error::{BoardError, Result};

/// A validation issue found in a board descriptor.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// Severity: "error" or "warning".
    pub severity: &'static str,
    /// Human-readable description.
    pub message: String,
}

impl ValidationIssue {
    fn error(message: impl Into<String>) -> Self {
        Self {
            severity: "error",
            message: message.into(),
        }
    }

    fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: "warning",
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == "error"
    }
}

/// Load a board descriptor, choosing the format by file extension.
pub fn load_board(path: &Path) -> Result<BoardDescriptor> {
    if !path.exists() {
        return Err(BoardError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path)?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => parse_board_toml(&content),
        Some("json") => parse_board_json(&content),
        _ => Err(BoardError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}

/// Parse a board descriptor from a TOML string.
pub fn parse_board_toml(toml_str: &str) -> Result<BoardDescriptor> {
    let board: BoardDescriptor = toml::from_str(toml_str)?;
    Ok(board)
}

/// Parse a board descriptor from a PlatformIO JSON manifest.
///
/// Keys outside `name`, `build` and `upload` are ignored.
pub fn parse_board_json(json_str: &str) -> Result<BoardDescriptor> {
    let board: BoardDescriptor = serde_json::from_str(json_str)?;
    Ok(board)
}

/// Serialize a board descriptor to pretty TOML.
pub fn board_to_toml(board: &BoardDescriptor) -> Result<String> {
    let toml_str = toml::to_string_pretty(board)?;
    Ok(toml_str)
}

/// Validate a board descriptor for use by the composers.
///
/// Returns `Ok(())` if there are no issues at all, or `Err(issues)`.
/// Callers decide whether warnings are fatal.
pub fn validate_board(board: &BoardDescriptor) -> std::result::Result<(), Vec<ValidationIssue>> {
    let mut issues = Vec::new();

    // 1. CPU is present and is a Cortex-M core
    if board.cpu().is_empty() {
        issues.push(ValidationIssue::error("build.cpu is empty"));
    } else if !board.cpu().starts_with("cortex-m") {
        issues.push(ValidationIssue::error(format!(
            "build.cpu '{}' is not a Cortex-M core",
            board.cpu()
        )));
    }

    // 2. Variant selects a vendor header directory
    if board.variant().is_empty() {
        issues.push(ValidationIssue::error("build.variant is empty"));
    }

    // 3. Float ABI and FPU agree
    match (board.float_abi(), board.fpu()) {
        (FloatAbi::Hard | FloatAbi::Softfp, None) => {
            issues.push(ValidationIssue::error(format!(
                "build.float_abi '{}' requires build.fpu",
                board.float_abi()
            )));
        }
        (FloatAbi::Soft, Some(fpu)) => {
            issues.push(ValidationIssue::warning(format!(
                "build.fpu '{fpu}' is ignored with build.float_abi 'soft'"
            )));
        }
        _ => {}
    }

    // 4. Clock frequency is usable as a numeric define
    match board.clock_define() {
        None => issues.push(ValidationIssue::warning("build.f_cpu is not set")),
        Some(token) if board.clock_frequency().is_none() => {
            issues.push(ValidationIssue::error(format!(
                "build.f_cpu '{token}' is not an integer frequency"
            )));
        }
        Some(_) => {}
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

/// Discover board descriptors (`*.json`, `*.toml`) in a directory.
///
/// Returns a list of (board_id, file_path) pairs sorted by id.
pub fn discover_boards(boards_dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    if !boards_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut boards = Vec::new();
    for entry in std::fs::read_dir(boards_dir)? {
        let path = entry?.path();
        let is_board = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("json" | "toml")
        );
        if !is_board {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            boards.push((stem.to_string(), path.clone()));
        }
    }
    boards.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(boards)
}
