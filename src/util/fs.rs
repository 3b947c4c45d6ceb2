//! Filesystem utilities.

use std::path::{Path, PathBuf};

use glob::{glob_with, MatchOptions, Pattern, PatternError};

/// Whether a main reference contains glob metacharacters.
pub fn has_glob_meta(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

/// Find files matching a glob pattern relative to a base directory.
///
/// Directories are skipped. Results come back sorted.
pub fn glob_files(base: &Path, pattern: &str) -> Result<Vec<PathBuf>, PatternError> {
    // The base directory is literal text, not part of the pattern.
    let escaped_base = PathBuf::from(Pattern::escape(&base.to_string_lossy()));
    let full_pattern = escaped_base.join(pattern);
    let pattern_str = full_pattern.to_string_lossy();

    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };

    let mut results = Vec::new();
    for entry in glob_with(&pattern_str, options)? {
        match entry {
            Ok(path) => {
                if path.is_file() {
                    results.push(path);
                }
            }
            Err(e) => {
                tracing::warn!("glob error: {}", e);
            }
        }
    }

    results.sort();
    Ok(results)
}

/// Resolve a module file reference the way Node does.
///
/// Tries the exact file, then `<path>.js`, then `<path>/index.js`.
pub fn resolve_module_file(path: &Path) -> Option<PathBuf> {
    if path.is_file() {
        return Some(path.to_path_buf());
    }

    let mut with_ext = path.as_os_str().to_owned();
    with_ext.push(".js");
    let with_ext = PathBuf::from(with_ext);
    if with_ext.is_file() {
        return Some(with_ext);
    }

    let index = path.join("index.js");
    if index.is_file() {
        return Some(index);
    }

    None
}

/// Get the relative path from `base` to `path`.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}

/// Check if a path is inside another path.
pub fn is_inside(path: &Path, parent: &Path) -> bool {
    path.starts_with(parent)
}
