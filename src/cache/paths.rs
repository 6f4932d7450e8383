// Cache path utilities.
// Resolves the cache root, the log file location and safe per-user directory names.

use std::path::PathBuf;

use directories::ProjectDirs;

/// Get the base cache directory (~/.cache/ghfolio on Linux).
pub fn cache_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "ghfolio").map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Path to the dashboard log file.
pub fn log_path() -> Option<PathBuf> {
    cache_dir().map(|dir| dir.join("ghfolio.log"))
}

/// Sanitize a name for use in filesystem paths.
/// Replaces problematic characters with underscores.
/// Empty names and names made only of dots (`.`, `..`) become underscores.
pub fn sanitize_name(name: &str) -> String {
    if name.chars().all(|c| c == '.') {
        return "_".repeat(name.len().max(1));
    }

    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("simple"), "simple");
        assert_eq!(sanitize_name("../escape"), ".._escape");
        assert_eq!(sanitize_name("user:name"), "user_name");
    }

    #[test]
    fn test_sanitize_name_never_yields_relative_dirs() {
        assert_eq!(sanitize_name("."), "_");
        assert_eq!(sanitize_name(".."), "__");
        assert_eq!(sanitize_name(""), "_");
        assert_eq!(sanitize_name(".hidden"), ".hidden");
    }

    #[test]
    fn test_log_path_under_cache_dir() {
        if let (Some(dir), Some(log)) = (cache_dir(), log_path()) {
            assert_eq!(log.parent(), Some(dir.as_path()));
        }
    }
}
