//! CLI command implementations.

pub mod board;
pub mod compose;
pub mod init;
