//! `commonsense board`: board listing, description and validation.

use std::path::Path;

use anyhow::{bail, Result};
use commonsense_board::{discover_boards, validate_board, BoardDescriptor};
use commonsense_env::flags::{accelerated_math_lib, hardware_flags};
use commonsense_env::board_fields;

use crate::config::load_board_or_default;

/// List board descriptors found in a directory.
pub fn list(dir: &Path) -> Result<()> {
    let boards = discover_boards(dir)?;
    if boards.is_empty() {
        println!("No board descriptors in {}", dir.display());
        return Ok(());
    }
    println!("Boards in {}:", dir.display());
    println!();
    for (id, path) in boards {
        match commonsense_board::load_board(&path) {
            Ok(board) => println!("  {id:<25} {} ({})", board.name, board.cpu()),
            Err(e) => println!("  {id:<25} unreadable: {e}"),
        }
    }
    Ok(())
}

/// Describe a board and the hardware switches it implies.
pub fn describe(board_path: Option<&Path>, format: Option<&str>) -> Result<()> {
    let board = load_board_or_default(board_path)?;
    match format {
        None => print_board(&board),
        Some("toml") => print!("{}", commonsense_board::board_to_toml(&board)?),
        Some("json") => println!("{}", serde_json::to_string_pretty(&board)?),
        Some(other) => bail!("unknown format '{other}' (expected toml or json)"),
    }
    Ok(())
}

fn print_board(board: &BoardDescriptor) {
    println!("=== Board: {} ===", board.name);
    println!();
    println!("--- Build ---");
    println!("  CPU:       {}", board.cpu());
    println!("  Variant:   {}", board.variant());
    if !board.mcu().is_empty() {
        println!("  MCU:       {}", board.mcu());
    }
    println!("  Float ABI: {}", board.float_abi());
    println!("  FPU:       {}", board.fpu().unwrap_or("none"));
    if let Some(hz) = board.clock_frequency() {
        println!("  Clock:     {hz} Hz");
    }
    match board.ldscript_override() {
        Some(script) => println!("  Linker script: {} (override)", script.display()),
        None => println!("  Linker script: default"),
    }
    println!();

    println!("--- Memory ---");
    if let Some(flash) = board.upload.maximum_size {
        println!("  Flash: {flash} bytes");
    }
    if let Some(ram) = board.upload.maximum_ram_size {
        println!("  RAM:   {ram} bytes");
    }
    println!();

    if let Ok(fields) = board_fields(board) {
        println!("--- Toolchain ---");
        println!("  Switches: {}", hardware_flags(&fields).join(" "));
        let math = fields
            .fpu
            .and_then(|fpu| accelerated_math_lib(fields.cpu, fpu))
            .unwrap_or("m");
        println!("  Math library: {math}");
    }
}

/// Validate a board file; errors fail the command, warnings are printed.
pub fn validate(board_path: &Path) -> Result<()> {
    let board = load_board_or_default(Some(board_path))?;
    match validate_board(&board) {
        Ok(()) => {
            println!("{}: ok", board_path.display());
            Ok(())
        }
        Err(issues) => {
            for issue in &issues {
                println!("{}: {}", issue.severity, issue.message);
            }
            let errors = issues.iter().filter(|i| i.is_error()).count();
            if errors > 0 {
                bail!("{} has {errors} error(s)", board_path.display());
            }
            Ok(())
        }
    }
}
