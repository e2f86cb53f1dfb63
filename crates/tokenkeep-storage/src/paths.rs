//! Platform-aware resolution of the directory holding a namespace's credentials.
//!
//! Resolution is a pure function of a [`PathEnvironment`]; only
//! [`PathEnvironment::from_host`] looks at the running process.

use std::{
    env,
    path::{Component, Path, PathBuf},
};

use tokenkeep_core::CredentialError;
use tracing::debug;

/// Environment variable that replaces platform detection entirely.
pub const OVERRIDE_ENV: &str = "TOKENKEEP_STORAGE_DIR";

/// Windows application-data variable consulted before falling back to the home directory.
pub const APP_DATA_ENV: &str = "APPDATA";

const LINUX_STATE_ROOT: &str = "/var";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
    Other(String),
}

impl Platform {
    pub fn current() -> Self {
        Self::from_os(env::consts::OS)
    }

    pub fn from_os(os: &str) -> Self {
        match os {
            "windows" => Platform::Windows,
            "macos" => Platform::MacOs,
            "linux" => Platform::Linux,
            other => Platform::Other(other.to_string()),
        }
    }
}

/// Host facts the resolver depends on, captured once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathEnvironment {
    pub platform: Platform,
    pub override_dir: Option<PathBuf>,
    pub home: Option<PathBuf>,
    pub app_data: Option<PathBuf>,
}

impl PathEnvironment {
    /// Snapshot the running host: OS, override variable, home and app-data dirs.
    pub fn from_host() -> Self {
        Self {
            platform: Platform::current(),
            override_dir: non_empty_var(OVERRIDE_ENV),
            home: dirs::home_dir(),
            app_data: non_empty_var(APP_DATA_ENV),
        }
    }

    /// Environment that resolves every namespace under `dir`, whatever the platform.
    pub fn with_override(dir: impl Into<PathBuf>) -> Self {
        Self {
            platform: Platform::current(),
            override_dir: Some(dir.into()),
            home: None,
            app_data: None,
        }
    }
}

fn non_empty_var(name: &str) -> Option<PathBuf> {
    env::var_os(name)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Resolve `<base>/<namespace>` for the given environment. Does not touch the filesystem.
pub fn resolve_base_dir(namespace: &str, env: &PathEnvironment) -> Result<PathBuf, CredentialError> {
    validate_namespace(namespace)?;

    if let Some(dir) = &env.override_dir {
        debug!(?dir, "using storage dir override");
        return Ok(dir.join(namespace));
    }

    let base = match &env.platform {
        Platform::Windows => match &env.app_data {
            Some(app_data) => app_data.clone(),
            None => home(env)?.join("AppData").join("Local"),
        },
        Platform::MacOs => home(env)?.join("Library").join("Application Support"),
        Platform::Linux => PathBuf::from(LINUX_STATE_ROOT),
        Platform::Other(platform) => {
            return Err(CredentialError::UnsupportedPlatform {
                platform: platform.clone(),
            })
        }
    };

    Ok(base.join(namespace))
}

fn home(env: &PathEnvironment) -> Result<&Path, CredentialError> {
    env.home
        .as_deref()
        .ok_or(CredentialError::HomeDirUnavailable)
}

fn validate_namespace(namespace: &str) -> Result<(), CredentialError> {
    let mut components = Path::new(namespace).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(segment)), None) if segment == namespace => Ok(()),
        _ => Err(CredentialError::InvalidNamespace {
            namespace: namespace.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_for(platform: Platform) -> PathEnvironment {
        PathEnvironment {
            platform,
            override_dir: None,
            home: Some(PathBuf::from("/home/alice")),
            app_data: None,
        }
    }

    #[test]
    fn override_wins_on_every_platform() {
        for platform in [
            Platform::Windows,
            Platform::MacOs,
            Platform::Linux,
            Platform::Other("plan9".into()),
        ] {
            let env = PathEnvironment {
                override_dir: Some(PathBuf::from("/tmp/creds")),
                ..env_for(platform)
            };
            let dir = resolve_base_dir("my-app", &env).expect("resolve");
            assert_eq!(dir, PathBuf::from("/tmp/creds").join("my-app"));
        }
    }

    #[test]
    fn windows_prefers_app_data() {
        let env = PathEnvironment {
            app_data: Some(PathBuf::from("C:/Users/alice/AppData/Roaming")),
            ..env_for(Platform::Windows)
        };
        let dir = resolve_base_dir("my-app", &env).expect("resolve");
        assert_eq!(
            dir,
            PathBuf::from("C:/Users/alice/AppData/Roaming").join("my-app")
        );
    }

    #[test]
    fn windows_falls_back_to_local_app_data_under_home() {
        let dir = resolve_base_dir("my-app", &env_for(Platform::Windows)).expect("resolve");
        assert_eq!(
            dir,
            PathBuf::from("/home/alice")
                .join("AppData")
                .join("Local")
                .join("my-app")
        );
    }

    #[test]
    fn macos_uses_application_support() {
        let dir = resolve_base_dir("my-app", &env_for(Platform::MacOs)).expect("resolve");
        assert_eq!(
            dir,
            PathBuf::from("/home/alice/Library/Application Support/my-app")
        );
    }

    #[test]
    fn linux_uses_var() {
        let dir = resolve_base_dir("my-app", &env_for(Platform::Linux)).expect("resolve");
        assert_eq!(dir, PathBuf::from("/var/my-app"));
    }

    #[test]
    fn unknown_platform_is_unsupported() {
        let err = resolve_base_dir("my-app", &env_for(Platform::Other("haiku".into())))
            .expect_err("should fail");
        assert!(matches!(
            err,
            CredentialError::UnsupportedPlatform { platform } if platform == "haiku"
        ));
    }

    #[test]
    fn missing_home_is_reported() {
        let env = PathEnvironment {
            home: None,
            ..env_for(Platform::MacOs)
        };
        let err = resolve_base_dir("my-app", &env).expect_err("should fail");
        assert!(matches!(err, CredentialError::HomeDirUnavailable));
    }

    #[test]
    fn namespace_must_be_a_single_segment() {
        let env = env_for(Platform::Linux);
        for bad in ["", ".", "..", "a/b", "../escape", "/abs"] {
            let err = resolve_base_dir(bad, &env).expect_err("should reject");
            assert!(matches!(err, CredentialError::InvalidNamespace { .. }), "{bad}");
        }
    }

    #[test]
    fn maps_os_names() {
        assert_eq!(Platform::from_os("windows"), Platform::Windows);
        assert_eq!(Platform::from_os("macos"), Platform::MacOs);
        assert_eq!(Platform::from_os("linux"), Platform::Linux);
        assert_eq!(
            Platform::from_os("freebsd"),
            Platform::Other("freebsd".into())
        );
    }
}
