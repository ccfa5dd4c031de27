//! Command implementations.

mod check;
mod debug;
mod eval;

pub use check::{check_file, CheckOptions};
pub use debug::parse_file;
pub use eval::eval_expression;

use kry_lower::CompileMode;

/// Read a source file, exiting with a readable message on failure.
fn read_file(path: &str) -> String {
    match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            let msg = match e.kind() {
                std::io::ErrorKind::NotFound => format!("cannot find file '{path}'"),
                std::io::ErrorKind::PermissionDenied => {
                    format!("permission denied reading '{path}'")
                }
                std::io::ErrorKind::InvalidData => {
                    format!("'{path}' contains invalid UTF-8 data")
                }
                _ => format!("error reading '{path}': {e}"),
            };
            eprintln!("{msg}");
            std::process::exit(1);
        }
    }
}

pub fn parse_mode(name: &str) -> Option<CompileMode> {
    match name {
        "runtime" => Some(CompileMode::Runtime),
        "codegen" => Some(CompileMode::Codegen),
        "hybrid" => Some(CompileMode::Hybrid),
        _ => None,
    }
}
