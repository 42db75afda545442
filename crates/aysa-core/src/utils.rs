//! Shared utility functions for AySA crates

use crate::error::{Error, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::path::PathBuf;

/// Get the user's home directory
///
/// Prefers the HOME environment variable over dirs::home_dir() so that
/// an overridden HOME (containers, CI) is respected.
pub fn get_home_dir() -> Result<PathBuf> {
    if let Ok(home) = std::env::var("HOME") {
        if !home.is_empty() {
            return Ok(PathBuf::from(home));
        }
    }

    dirs::home_dir().ok_or_else(|| Error::invalid_config("Could not determine home directory"))
}

/// Expand a leading `~/` to the home directory
///
/// Paths without the prefix, or when no home directory can be found, are
/// returned unchanged.
pub fn expand_home(path: &Utf8Path) -> Utf8PathBuf {
    let Some(rest) = path.as_str().strip_prefix("~/") else {
        return path.to_owned();
    };
    match get_home_dir().ok().and_then(|h| Utf8PathBuf::try_from(h).ok()) {
        Some(home) => home.join(rest),
        None => path.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_home_dir_from_env() {
        if std::env::var("HOME").is_ok() {
            let home = get_home_dir().unwrap();
            assert!(!home.as_os_str().is_empty());
        }
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home(Utf8Path::new("/etc/key")), "/etc/key");
        assert_eq!(expand_home(Utf8Path::new("keys/id")), "keys/id");

        let expanded = expand_home(Utf8Path::new("~/.ssh/id_rsa"));
        assert!(expanded.as_str().ends_with(".ssh/id_rsa"));
        assert!(!expanded.as_str().starts_with('~'));
    }
}
