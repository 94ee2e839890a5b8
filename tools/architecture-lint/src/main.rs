//! Command-line entry point for the carmarket layering lint.
//!
//! Usage: `architecture-lint [BACKEND_DIR]`. Without an argument the
//! backend is found beside this tool in the workspace.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

fn main() -> ExitCode {
    let backend_dir = std::env::args_os()
        .nth(1)
        .map_or_else(default_backend_dir, PathBuf::from);

    let outcome = architecture_lint::lint_backend_sources(&backend_dir);
    let mut stderr = io::stderr().lock();
    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // Nothing useful remains to do if stderr itself is gone.
            let _ignored = writeln!(stderr, "{}", err.to_string().trim_end());
            ExitCode::FAILURE
        }
    }
}

/// `<workspace>/backend`, where this crate lives at `<workspace>/tools/architecture-lint`.
fn default_backend_dir() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .ancestors()
        .nth(2)
        .unwrap_or(manifest_dir)
        .join("backend")
}
