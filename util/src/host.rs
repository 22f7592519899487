//! Host platform utility functions

use std::path::PathBuf;

/// Get the root directory of the software installation.
///
/// The root is read from the `ALVIK_SW_ROOT` environment variable, which must
/// point at the directory containing the `params` and `sessions` directories.
pub fn get_alvik_sw_root() -> Result<PathBuf, std::env::VarError> {
    std::env::var("ALVIK_SW_ROOT").map(PathBuf::from)
}
