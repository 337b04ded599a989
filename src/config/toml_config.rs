use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{validate_file_extensions, validate_non_empty_string, validate_path, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub source: SourceConfig,
    pub store: StoreConfig,
    pub import: ImportConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceConfig {
    pub csv_path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    pub path: Option<String>,
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportConfig {
    pub clear_before_import: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數，支援 `${VAR}` 與 `${VAR:-default}`
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}").map_err(|e| {
            EtlError::ConfigError {
                message: format!("invalid substitution pattern: {}", e),
            }
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            match (std::env::var(var_name), caps.get(2)) {
                (Ok(value), _) => value,
                (Err(_), Some(default)) => default.as_str().to_string(),
                // 未定義的變數保留原樣
                (Err(_), None) => caps[0].to_string(),
            }
        });

        Ok(result.to_string())
    }

    pub fn monitoring_enabled(&self) -> Option<bool> {
        self.monitoring.as_ref().map(|m| m.enabled)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        if let Some(csv_path) = &self.source.csv_path {
            validate_path("source.csv_path", csv_path)?;
            validate_file_extensions("source.csv_path", &[csv_path.as_str()], &["csv"])?;
        }
        if let Some(path) = &self.store.path {
            validate_path("store.path", path)?;
        }
        if let Some(file_name) = &self.store.file_name {
            validate_non_empty_string("store.file_name", file_name)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[source]
csv_path = "./data/people.csv"

[store]
path = "./output"
file_name = "users.json"

[import]
clear_before_import = true

[monitoring]
enabled = true
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.source.csv_path.as_deref(), Some("./data/people.csv"));
        assert_eq!(config.store.file_name.as_deref(), Some("users.json"));
        assert_eq!(config.import.clear_before_import, Some(true));
        assert_eq!(config.monitoring_enabled(), Some(true));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sections_are_optional() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert!(config.source.csv_path.is_none());
        assert!(config.monitoring_enabled().is_none());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("PEOPLE_ETL_TEST_CSV", "/tmp/from-env.csv");

        let toml_content = r#"
[source]
csv_path = "${PEOPLE_ETL_TEST_CSV}"

[store]
path = "${PEOPLE_ETL_TEST_UNSET_STORE:-./fallback}"
file_name = "${PEOPLE_ETL_TEST_UNSET_NAME}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.source.csv_path.as_deref(), Some("/tmp/from-env.csv"));
        assert_eq!(config.store.path.as_deref(), Some("./fallback"));
        assert_eq!(
            config.store.file_name.as_deref(),
            Some("${PEOPLE_ETL_TEST_UNSET_NAME}")
        );

        std::env::remove_var("PEOPLE_ETL_TEST_CSV");
    }

    #[test]
    fn test_config_validation_rejects_non_csv_source() {
        let config = TomlConfig::from_toml_str("[source]\ncsv_path = \"people.xlsx\"\n").unwrap();
        assert!(matches!(
            config.validate(),
            Err(EtlError::InvalidConfigValueError { .. })
        ));
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = TomlConfig::from_toml_str("[source\ncsv_path = 1").unwrap_err();
        assert!(matches!(err, EtlError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[store]\npath = \"./file-output\"\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.store.path.as_deref(), Some("./file-output"));
    }
}
