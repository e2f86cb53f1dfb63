use std::{
    fs::{self, OpenOptions},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use color_eyre::Result;
use dirs::config_dir;
use serde::{Deserialize, Serialize};

/// Namespace used when neither the CLI nor the config names one.
pub const DEFAULT_NAMESPACE: &str = "tokenkeep";

/// Environment variable holding the encryption key; takes precedence over the config file.
pub const ENCRYPTION_KEY_ENV: &str = "TOKENKEEP_ENCRYPTION_KEY";

/// User-level configuration loaded from `~/.config/tokenkeep/config.toml` (platform-specific).
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Namespace directory for stored credentials.
    pub namespace: Option<String>,
    /// Base directory override; the `TOKENKEEP_STORAGE_DIR` variable wins over it.
    pub storage_dir: Option<PathBuf>,
    /// 32-byte encryption key. Leave unset for plaintext storage.
    pub encryption_key: Option<String>,
}

impl Config {
    pub fn namespace_or_default(&self, cli_namespace: Option<&str>) -> String {
        cli_namespace
            .or(self.namespace.as_deref())
            .unwrap_or(DEFAULT_NAMESPACE)
            .to_string()
    }

    /// Environment key first, then the config file.
    pub fn resolve_encryption_key(&self, env_key: Option<String>) -> Option<String> {
        env_key
            .filter(|key| !key.is_empty())
            .or_else(|| self.encryption_key.clone())
    }
}

/// Read the user config, falling back to defaults when there is none.
pub fn load() -> Result<Config> {
    load_from_path(config_path()?)
}

/// Parse the TOML file at `path`. An absent or whitespace-only file yields defaults.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<Config> {
    let contents = match fs::read_to_string(path.as_ref()) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Config::default()),
        Err(err) => return Err(err.into()),
    };

    if contents.trim().is_empty() {
        return Ok(Config::default());
    }
    Ok(toml::from_str(&contents)?)
}

/// `<config_dir>/tokenkeep/config.toml`.
pub fn config_path() -> Result<PathBuf> {
    let base = config_dir().ok_or_else(|| color_eyre::eyre::eyre!("no config dir available"))?;
    Ok(base.join("tokenkeep").join("config.toml"))
}

/// Seed the user config file. An existing file is left untouched.
pub fn write_default_if_missing(config: &Config) -> Result<PathBuf> {
    let path = config_path()?;
    init_at(config, &path)?;
    Ok(path)
}

/// Returns whether a new file was written.
fn init_at(config: &Config, path: &Path) -> Result<bool> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == ErrorKind::AlreadyExists => return Ok(false),
        Err(err) => return Err(err.into()),
    };
    file.write_all(toml::to_string_pretty(config)?.as_bytes())?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_default_when_missing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = load_from_path(dir.path().join("config.toml")).expect("load");
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn returns_default_when_blank() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "  \n").expect("write");
        assert_eq!(load_from_path(&path).expect("load"), Config::default());
    }

    #[test]
    fn parses_custom_config() {
        let contents = r#"
            namespace = "my-app"
            storage_dir = "/tmp/tokenkeep-data"
            encryption_key = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"
        "#;
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, contents).expect("write temp config");

        let cfg = load_from_path(&path).expect("load");
        assert_eq!(
            cfg,
            Config {
                namespace: Some("my-app".into()),
                storage_dir: Some(PathBuf::from("/tmp/tokenkeep-data")),
                encryption_key: Some("a".repeat(32)),
            }
        );
    }

    #[test]
    fn init_writes_file_once() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");
        let cfg = Config {
            namespace: Some("my-app".into()),
            ..Config::default()
        };

        assert!(init_at(&cfg, &path).expect("write should succeed"));
        let other = Config {
            namespace: Some("clobber".into()),
            ..Config::default()
        };
        assert!(!init_at(&other, &path).expect("second write ok"));
        assert_eq!(load_from_path(&path).expect("load"), cfg);
    }

    #[test]
    fn namespace_precedence() {
        let cfg = Config {
            namespace: Some("from-config".into()),
            ..Config::default()
        };
        assert_eq!(cfg.namespace_or_default(Some("from-cli")), "from-cli");
        assert_eq!(cfg.namespace_or_default(None), "from-config");
        assert_eq!(Config::default().namespace_or_default(None), DEFAULT_NAMESPACE);
    }

    #[test]
    fn env_key_beats_config_key() {
        let cfg = Config {
            encryption_key: Some("from-config".into()),
            ..Config::default()
        };
        assert_eq!(
            cfg.resolve_encryption_key(Some("from-env".into())).as_deref(),
            Some("from-env")
        );
        assert_eq!(
            cfg.resolve_encryption_key(Some(String::new())).as_deref(),
            Some("from-config")
        );
        assert_eq!(Config::default().resolve_encryption_key(None), None);
    }
}
