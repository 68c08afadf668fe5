use crate::domain::error::{AppError, Result};
use crate::domain::test_case::ReportingTool;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "checklist.toml";
pub const ENV_PREFIX: &str = "CHECKLIST_";
/// Evidence arrives base64-encoded inside JSON, a third larger than the file.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    /// Report title on the page, in exports and on the PDF cover.
    pub report_name: String,
    pub default_tool: ReportingTool,
    /// Pre-filled validator name.
    pub validator: String,
    pub seed_on_start: bool,
    /// Also push copied queries to the clipboard of the machine running
    /// the server.
    pub host_clipboard: bool,
    /// Largest JSON request body accepted, evidence uploads included.
    pub max_upload_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
            data_dir: PathBuf::from("checklist-data"),
            report_name: "Top 10 Suppliers".to_string(),
            default_tool: ReportingTool::PowerBi,
            validator: String::new(),
            seed_on_start: true,
            host_clipboard: false,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl AppConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

pub struct ConfigService;

impl ConfigService {
    /// Defaults, then `checklist.toml` in the working directory, then
    /// `CHECKLIST_*` environment variables.
    pub fn load() -> Result<AppConfig> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    pub fn load_from(path: &Path) -> Result<AppConfig> {
        let config: AppConfig = Self::figment_for(path)
            .extract()
            .map_err(|e| AppError::ConfigError(e.to_string()))?;
        if config.report_name.trim().is_empty() {
            return Err(AppError::ConfigError(
                "report_name must not be empty".to_string(),
            ));
        }
        if config.max_upload_bytes == 0 {
            return Err(AppError::ConfigError(
                "max_upload_bytes must be greater than zero".to_string(),
            ));
        }
        Ok(config)
    }

    pub fn figment_for(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let config: AppConfig = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(dir.path().join("missing.toml")))
            .extract()
            .unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.bind_address(), "127.0.0.1:3001");
        assert_eq!(config.max_upload_bytes, 25 * 1024 * 1024);
    }

    #[test]
    fn test_upload_limit_from_env() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("CHECKLIST_MAX_UPLOAD_BYTES", "1048576");
            let config = ConfigService::load().map_err(|e| e.to_string())?;
            assert_eq!(config.max_upload_bytes, 1024 * 1024);

            jail.set_env("CHECKLIST_MAX_UPLOAD_BYTES", "0");
            assert!(matches!(
                ConfigService::load(),
                Err(AppError::ConfigError(_))
            ));
            Ok(())
        });
    }

    #[test]
    fn test_toml_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(
            &path,
            "port = 8088\nreport_name = \"Quarterly Spend\"\ndefault_tool = \"oac\"\nseed_on_start = false\n",
        )
        .unwrap();

        let config: AppConfig = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(&path))
            .extract()
            .unwrap();
        assert_eq!(config.port, 8088);
        assert_eq!(config.report_name, "Quarterly Spend");
        assert_eq!(config.default_tool, ReportingTool::Oac);
        assert!(!config.seed_on_start);
        assert_eq!(config.host, "127.0.0.1");
    }

    #[test]
    fn test_env_overrides_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(CONFIG_FILE, "port = 8088\nvalidator = \"Ana\"")?;
            jail.set_env("CHECKLIST_PORT", "9090");
            let config = ConfigService::load().map_err(|e| e.to_string())?;
            assert_eq!(config.port, 9090);
            assert_eq!(config.validator, "Ana");
            Ok(())
        });
    }

    #[test]
    fn test_empty_report_name_is_rejected() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(CONFIG_FILE, "report_name = \"  \"")?;
            let err = ConfigService::load().unwrap_err();
            assert!(matches!(err, AppError::ConfigError(_)));
            Ok(())
        });
    }
}
