use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

const DEFAULT_ADMIN_PASSWORD: &str = "admin";

// Mock server configuration sourced from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockServerConfig {
    // Snapshot file; None keeps the store in memory only.
    pub data_path: Option<PathBuf>,
    // Persist after every successful mutation.
    pub autosave: bool,
    // Seed the built-in roles, admin user and default index set at startup.
    pub seed_defaults: bool,
    // Password of the seeded admin user.
    pub admin_password: String,
}

impl Default for MockServerConfig {
    fn default() -> Self {
        Self {
            data_path: None,
            autosave: true,
            seed_defaults: true,
            admin_password: DEFAULT_ADMIN_PASSWORD.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MockServerConfigOverride {
    data_path: Option<String>,
    autosave: Option<bool>,
    seed_defaults: Option<bool>,
    admin_password: Option<String>,
}

impl MockServerConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let data_path = std::env::var("GRAYMOCK_DATA_PATH")
            .ok()
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);
        let autosave = env_bool("GRAYMOCK_AUTOSAVE", defaults.autosave)?;
        let seed_defaults = env_bool("GRAYMOCK_SEED_DEFAULTS", defaults.seed_defaults)?;
        let admin_password =
            std::env::var("GRAYMOCK_ADMIN_PASSWORD").unwrap_or(defaults.admin_password);
        Ok(Self {
            data_path,
            autosave,
            seed_defaults,
            admin_password,
        })
    }

    pub fn from_env_or_yaml() -> Result<Self> {
        let mut config = Self::from_env()?;
        if let Ok(path) = std::env::var("GRAYMOCK_CONFIG") {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("read GRAYMOCK_CONFIG: {path}"))?;
            let override_cfg: MockServerConfigOverride = serde_yaml::from_str(&contents)
                .with_context(|| "parse mock server config yaml")?;
            if let Some(value) = override_cfg.data_path {
                config.data_path = (!value.is_empty()).then(|| PathBuf::from(value));
            }
            if let Some(value) = override_cfg.autosave {
                config.autosave = value;
            }
            if let Some(value) = override_cfg.seed_defaults {
                config.seed_defaults = value;
            }
            if let Some(value) = override_cfg.admin_password {
                config.admin_password = value;
            }
        }
        Ok(config)
    }
}

fn env_bool(key: &str, default: bool) -> Result<bool> {
    match std::env::var(key) {
        Ok(value) => parse_bool(&value).with_context(|| format!("parse {key}")),
        Err(_) => Ok(default),
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("invalid boolean {other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    const KEYS: [&str; 5] = [
        "GRAYMOCK_DATA_PATH",
        "GRAYMOCK_AUTOSAVE",
        "GRAYMOCK_SEED_DEFAULTS",
        "GRAYMOCK_ADMIN_PASSWORD",
        "GRAYMOCK_CONFIG",
    ];

    struct EnvGuard {
        key: &'static str,
        prev: Option<String>,
    }

    impl EnvGuard {
        fn set(key: &'static str, value: &str) -> Self {
            let prev = std::env::var(key).ok();
            unsafe {
                std::env::set_var(key, value);
            }
            Self { key, prev }
        }

        fn unset(key: &'static str) -> Self {
            let prev = std::env::var(key).ok();
            unsafe {
                std::env::remove_var(key);
            }
            Self { key, prev }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.prev {
                Some(value) => unsafe {
                    std::env::set_var(self.key, value);
                },
                None => unsafe {
                    std::env::remove_var(self.key);
                },
            }
        }
    }

    fn clear_env() -> Vec<EnvGuard> {
        KEYS.into_iter().map(EnvGuard::unset).collect()
    }

    #[test]
    #[serial]
    fn defaults_without_env() {
        let _guards = clear_env();
        let config = MockServerConfig::from_env_or_yaml().expect("config");
        assert_eq!(config, MockServerConfig::default());
        assert!(config.autosave);
        assert_eq!(config.admin_password, "admin");
    }

    #[test]
    #[serial]
    fn env_overrides_defaults() {
        let _guards = clear_env();
        let _g1 = EnvGuard::set("GRAYMOCK_DATA_PATH", "/tmp/graymock.json");
        let _g2 = EnvGuard::set("GRAYMOCK_AUTOSAVE", "false");
        let _g3 = EnvGuard::set("GRAYMOCK_SEED_DEFAULTS", "0");
        let _g4 = EnvGuard::set("GRAYMOCK_ADMIN_PASSWORD", "s3cret");

        let config = MockServerConfig::from_env().expect("config");
        assert_eq!(config.data_path, Some(PathBuf::from("/tmp/graymock.json")));
        assert!(!config.autosave);
        assert!(!config.seed_defaults);
        assert_eq!(config.admin_password, "s3cret");
    }

    #[test]
    #[serial]
    fn empty_data_path_disables_persistence() {
        let _guards = clear_env();
        let _g = EnvGuard::set("GRAYMOCK_DATA_PATH", "");
        let config = MockServerConfig::from_env().expect("config");
        assert_eq!(config.data_path, None);
    }

    #[test]
    #[serial]
    fn invalid_bool_names_variable() {
        let _guards = clear_env();
        let _g = EnvGuard::set("GRAYMOCK_AUTOSAVE", "sometimes");
        let err = MockServerConfig::from_env().expect_err("invalid bool");
        assert!(format!("{err:#}").contains("GRAYMOCK_AUTOSAVE"));
    }

    #[test]
    #[serial]
    fn yaml_overrides_env() {
        let _guards = clear_env();
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "data_path: /var/lib/graymock.json\nautosave: false").expect("write");
        let _g1 = EnvGuard::set("GRAYMOCK_ADMIN_PASSWORD", "from-env");
        let path = file.path().to_string_lossy().into_owned();
        let _g2 = EnvGuard::set("GRAYMOCK_CONFIG", &path);

        let config = MockServerConfig::from_env_or_yaml().expect("config");
        assert_eq!(
            config.data_path,
            Some(PathBuf::from("/var/lib/graymock.json"))
        );
        assert!(!config.autosave);
        assert!(config.seed_defaults);
        assert_eq!(config.admin_password, "from-env");
    }

    #[test]
    #[serial]
    fn yaml_with_unknown_key_is_rejected() {
        let _guards = clear_env();
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "bind_addr: 0.0.0.0:9000").expect("write");
        let path = file.path().to_string_lossy().into_owned();
        let _g = EnvGuard::set("GRAYMOCK_CONFIG", &path);
        assert!(MockServerConfig::from_env_or_yaml().is_err());
    }
}
