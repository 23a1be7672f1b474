use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub keys: KeySettings,
    #[serde(default)]
    pub validity: ValiditySettings,
    #[serde(default)]
    pub subjects: SubjectSettings,
    #[serde(default)]
    pub server_san: ServerSanSettings,
    #[serde(default)]
    pub output: OutputSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct KeySettings {
    #[serde(default = "default_ca_bits")]
    pub ca_bits: u32,
    #[serde(default = "default_leaf_bits")]
    pub leaf_bits: u32,
}

impl Default for KeySettings {
    fn default() -> Self {
        Self {
            ca_bits: default_ca_bits(),
            leaf_bits: default_leaf_bits(),
        }
    }
}

fn default_ca_bits() -> u32 {
    4096
}

fn default_leaf_bits() -> u32 {
    2048
}

#[derive(Debug, Deserialize, Clone)]
pub struct ValiditySettings {
    #[serde(default = "default_ca_years")]
    pub ca_years: u32,
    #[serde(default = "default_intermediate_years")]
    pub intermediate_years: u32,
    #[serde(default = "default_leaf_years")]
    pub leaf_years: u32,
}

impl Default for ValiditySettings {
    fn default() -> Self {
        Self {
            ca_years: default_ca_years(),
            intermediate_years: default_intermediate_years(),
            leaf_years: default_leaf_years(),
        }
    }
}

fn default_ca_years() -> u32 {
    10
}

fn default_intermediate_years() -> u32 {
    5
}

fn default_leaf_years() -> u32 {
    2
}

#[derive(Debug, Deserialize, Clone)]
pub struct SubjectSettings {
    #[serde(default = "default_root_cn")]
    pub root: String,
    #[serde(default = "default_intermediate_cn")]
    pub intermediate: String,
    #[serde(default = "default_server_cn")]
    pub server: String,
    #[serde(default = "default_client_cn")]
    pub client: String,
}

impl Default for SubjectSettings {
    fn default() -> Self {
        Self {
            root: default_root_cn(),
            intermediate: default_intermediate_cn(),
            server: default_server_cn(),
            client: default_client_cn(),
        }
    }
}

fn default_root_cn() -> String {
    "MyRootCA".to_string()
}

fn default_intermediate_cn() -> String {
    "MyIntermediateCA".to_string()
}

fn default_server_cn() -> String {
    "localhost".to_string()
}

fn default_client_cn() -> String {
    "client".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSanSettings {
    #[serde(default = "default_san_dns")]
    pub dns: Vec<String>,
    #[serde(default = "default_san_ip")]
    pub ip: Vec<String>,
}

impl Default for ServerSanSettings {
    fn default() -> Self {
        Self {
            dns: default_san_dns(),
            ip: default_san_ip(),
        }
    }
}

fn default_san_dns() -> Vec<String> {
    vec!["localhost".to_string()]
}

fn default_san_ip() -> Vec<String> {
    vec!["127.0.0.1".to_string()]
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputSettings {
    #[serde(default = "default_output_directory")]
    pub directory: PathBuf,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
        }
    }
}

fn default_output_directory() -> PathBuf {
    PathBuf::from("certs")
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let config_str = fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        let config: AppConfig =
            toml::from_str(&config_str).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults when the
    /// file does not exist. A present-but-malformed file is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_fixed_policy() {
        let config = AppConfig::default();
        assert_eq!(config.keys.ca_bits, 4096);
        assert_eq!(config.keys.leaf_bits, 2048);
        assert_eq!(config.validity.ca_years, 10);
        assert_eq!(config.validity.intermediate_years, 5);
        assert_eq!(config.validity.leaf_years, 2);
        assert_eq!(config.subjects.root, "MyRootCA");
        assert_eq!(config.subjects.intermediate, "MyIntermediateCA");
        assert_eq!(config.subjects.server, "localhost");
        assert_eq!(config.subjects.client, "client");
        assert_eq!(config.server_san.dns, vec!["localhost"]);
        assert_eq!(config.server_san.ip, vec!["127.0.0.1"]);
        assert_eq!(config.output.directory, PathBuf::from("certs"));
    }

    #[test]
    fn test_partial_file_fills_missing_sections_with_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [subjects]
            root = "Acme Root CA"

            [validity]
            ca_years = 20
            "#,
        )
        .unwrap();

        assert_eq!(config.subjects.root, "Acme Root CA");
        assert_eq!(config.subjects.server, "localhost");
        assert_eq!(config.validity.ca_years, 20);
        assert_eq!(config.validity.leaf_years, 2);
        assert_eq!(config.keys.ca_bits, 4096);
    }

    #[test]
    fn test_load_or_default_with_absent_file() {
        let config = AppConfig::load_or_default(Path::new("does/not/exist.toml")).unwrap();
        assert_eq!(config.subjects.root, "MyRootCA");
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pki.toml");
        fs::write(&path, "not valid toml [").unwrap();
        assert!(AppConfig::load_or_default(&path).is_err());
    }
}
