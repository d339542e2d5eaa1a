//! Configuration file discovery across standard locations.

use crate::error::{Error, Result};
use crate::formatter;
use std::path::{Path, PathBuf};

fn has_supported_extension(path: &Path) -> bool {
    formatter::formatter_for(path).is_some()
}

/// Get the directories searched for configuration files, in order.
///
/// The current directory comes first, then the user configuration
/// directory, the home directory and (on unix) `/etc`.
pub fn get_search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd);
    }
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir);
    }
    if let Some(home) = dirs::home_dir() {
        paths.push(home);
    }

    #[cfg(target_family = "unix")]
    paths.push(PathBuf::from("/etc"));

    paths
}

/// Find a configuration file by name.
///
/// An explicit path with a supported extension is returned as-is when it
/// exists. Otherwise every search path is tried with the name itself and
/// with each supported extension appended (`config` → `config.yaml`,
/// `config.yml`, `config.json`).
///
/// # Errors
///
/// `DocumentNotFound` carrying `name` when nothing matches.
pub fn find_config_file(name: &str) -> Result<PathBuf> {
    let path = Path::new(name);
    if has_supported_extension(path) && path.is_file() {
        return Ok(path.to_path_buf());
    }

    for base_path in get_search_paths() {
        let exact_path = base_path.join(name);
        if has_supported_extension(&exact_path) && exact_path.is_file() {
            return Ok(exact_path);
        }

        for fmt in formatter::formatters() {
            for ext in fmt.extensions() {
                let file_path = base_path.join(format!("{}.{}", name, ext));
                if file_path.is_file() {
                    tracing::debug!(path = %file_path.display(), "discovered configuration file");
                    return Ok(file_path);
                }
            }
        }
    }

    Err(Error::DocumentNotFound(PathBuf::from(name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_get_search_paths() {
        let paths = get_search_paths();
        assert!(!paths.is_empty());

        if let Ok(cwd) = std::env::current_dir() {
            assert_eq!(paths[0], cwd);
        }
    }

    #[cfg(target_family = "unix")]
    #[test]
    fn test_etc_is_searched_last() {
        let paths = get_search_paths();
        assert_eq!(paths.last().unwrap(), Path::new("/etc"));
    }

    #[test]
    fn test_has_supported_extension() {
        assert!(has_supported_extension(Path::new("config.yml")));
        assert!(has_supported_extension(Path::new("/path/to/config.yaml")));
        assert!(has_supported_extension(Path::new("config.json")));
        assert!(!has_supported_extension(Path::new("config")));
        assert!(!has_supported_extension(Path::new("config.toml")));
    }

    #[test]
    fn test_find_explicit_path() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("pitr.yml");
        std::fs::write(&file_path, "db: {}").unwrap();

        let found = find_config_file(file_path.to_str().unwrap()).unwrap();
        assert_eq!(found, file_path);
    }

    #[test]
    #[serial]
    fn test_find_file_appends_extension() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("pitrtest.yml"), "db: {}").unwrap();

        let original_dir = std::env::current_dir().unwrap();
        std::env::set_current_dir(temp_dir.path()).unwrap();

        let result = find_config_file("pitrtest");
        std::env::set_current_dir(original_dir).unwrap();

        assert!(result.unwrap().ends_with("pitrtest.yml"));
    }

    #[test]
    fn test_find_missing() {
        let result = find_config_file("nonexistent_config_file_xyz123");
        assert!(matches!(result, Err(Error::DocumentNotFound(p)) if p == Path::new("nonexistent_config_file_xyz123")));
    }
}
