//! Configuration loading: an optional `editor.toml`, discovered the same way
//! as the rest of this stack's config crates: a local file first, then a
//! platform config directory fallback, with parse failure or absence
//! falling back to defaults rather than erroring.

use anyhow::Result;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub tab_stop: usize,
    pub status_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tab_stop: 8,
            status_timeout_secs: 5,
        }
    }
}

/// Local `editor.toml` if present, else `<config_dir>/editor/editor.toml`.
pub fn discover() -> PathBuf {
    let local = PathBuf::from("editor.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("editor").join("editor.toml");
    }
    PathBuf::from("editor.toml")
}

/// Loads from `path`, or from [`discover`] if `path` is `None`. Missing file
/// and parse errors both fall back to [`Config::default`].
pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        return Ok(Config::default());
    };
    match toml::from_str(&content) {
        Ok(config) => {
            info!(path = %path.display(), "loaded config");
            Ok(config)
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "invalid config, using defaults");
            Ok(Config::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_when_missing_file() {
        let cfg = load_from(Some(PathBuf::from("__nonexistent_hopefully__.toml"))).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn parses_configured_values() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "tab_stop = 4\nstatus_timeout_secs = 2\n").unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.tab_stop, 4);
        assert_eq!(cfg.status_timeout_secs, 2);
    }

    #[test]
    fn partial_file_falls_back_for_missing_fields() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "tab_stop = 2\n").unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.tab_stop, 2);
        assert_eq!(cfg.status_timeout_secs, 5);
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "tab_stop = [not, valid\n").unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg, Config::default());
    }
}
