//! Module Map Reader (§4.1): enumerates the executable modules mapped into
//! a running process by reading `/proc/<pid>/maps`.

use std::fs;
use std::path::PathBuf;

use crate::error::EngineError;

/// One ELF image mapped into the live process: the main executable, or a
/// shared library.
#[derive(Debug, Clone)]
pub struct Module {
    pub path: PathBuf,
    /// Lowest mapped address of an executable region backed by this file.
    pub load_base: u64,
    pub is_main: bool,
}

/// Selects how far the Module Map Reader walks `/proc/<pid>/maps`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
#[value(rename_all = "PascalCase")]
pub enum ScanMode {
    /// Stop after the first (main) executable module.
    Main,
    /// Continue through every mapped shared library too.
    All,
}

impl Default for ScanMode {
    fn default() -> Self {
        ScanMode::Main
    }
}

/// Reads the memory map of the process identified by `pid` and returns its
/// executable, file-backed modules in map order. The main module, if
/// present, is always first and is the only one with `is_main = true`.
pub fn read_modules(pid: u32, mode: ScanMode) -> Result<Vec<Module>, EngineError> {
    let path = format!("/proc/{pid}/maps");
    let contents = fs::read_to_string(&path).map_err(EngineError::MapOpen)?;

    let mut modules = Vec::new();
    for line in contents.lines() {
        match parse_maps_line(line) {
            Some((load_base, module_path)) => {
                let is_main = modules.is_empty();
                modules.push(Module {
                    path: module_path,
                    load_base,
                    is_main,
                });
                if is_main && mode == ScanMode::Main {
                    break;
                }
            }
            None => log::debug!("module map reader: skipping unparsable line `{line}`"),
        }
    }
    Ok(modules)
}

/// Convenience wrapper for introspecting the calling process itself,
/// which is this engine's only real use case.
pub fn read_self_modules(mode: ScanMode) -> Result<Vec<Module>, EngineError> {
    read_modules(std::process::id(), mode)
}

/// Parses one `/proc/pid/maps` line of the form
/// `range perms offset dev inode path`, returning `(load_base, path)` only
/// for lines that are executable and file-backed (rejecting anonymous
/// regions and pseudo-paths like `[vdso]`, `[heap]`, `[stack]`).
fn parse_maps_line(line: &str) -> Option<(u64, PathBuf)> {
    let mut parts = line.split_whitespace();
    let range = parts.next()?;
    let perms = parts.next()?;
    let _offset = parts.next()?;
    let _dev = parts.next()?;
    let _inode = parts.next()?;
    let path_str = parts.next()?;

    if !perms.contains('x') {
        return None;
    }
    if !path_str.starts_with('/') {
        return None;
    }

    let (start_hex, _end_hex) = range.split_once('-')?;
    let load_base = u64::from_str_radix(start_hex, 16).ok()?;

    Some((load_base, PathBuf::from(path_str)))
}
