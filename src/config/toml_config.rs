use crate::adapters::SUPPORTED_EXTENSIONS;
use crate::utils::error::{CemtError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_TABLE_PATH: &str = "cemt_data_final_replaced.xlsx";
pub const DEFAULT_IMAGE_DIR: &str = "images";
pub const DEFAULT_CONFIG_FILE: &str = "cemt.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub table: TableConfig,
    pub images: ImageConfig,
    pub cache: CacheConfig,
    pub query: QueryLimits,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub path: String,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_TABLE_PATH.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    pub dir: String,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            dir: DEFAULT_IMAGE_DIR.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_seconds: 600 }
    }
}

/// 船舶長度與寬度的輸入範圍（公尺）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryLimits {
    pub min_length: f64,
    pub max_length: f64,
    pub min_width: f64,
    pub max_width: f64,
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self {
            min_length: 10.0,
            max_length: 300.0,
            min_width: 2.0,
            max_width: 50.0,
        }
    }
}

impl QueryLimits {
    pub fn check_length(&self, length: f64) -> Result<()> {
        validation::validate_measurement("length", length, self.min_length, self.max_length)
    }

    pub fn check_width(&self, width: f64) -> Result<()> {
        validation::validate_measurement("width", width, self.min_width, self.max_width)
    }
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CemtError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 有指定檔案就一定要讀到；沒指定時，目前目錄有 cemt.toml 才讀，否則用預設值
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                tracing::debug!("Using {}", DEFAULT_CONFIG_FILE);
                Self::from_file(DEFAULT_CONFIG_FILE)
            }
            None => Ok(Self::default()),
        }
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| CemtError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${CEMT_DATA_DIR})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| CemtError::ConfigValidationError {
            field: "environment".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_path("table.path", &self.table.path)?;
        validation::validate_file_extension("table.path", &self.table.path, &SUPPORTED_EXTENSIONS)?;
        validation::validate_path("images.dir", &self.images.dir)?;
        validation::validate_positive_number("cache.ttl_seconds", self.cache.ttl_seconds, 1)?;

        let q = &self.query;
        for (field, min, max) in [
            ("query.length", q.min_length, q.max_length),
            ("query.width", q.min_width, q.max_width),
        ] {
            if !(min.is_finite() && max.is_finite()) || min > max || min < 0.0 {
                return Err(CemtError::InvalidConfigValueError {
                    field: field.to_string(),
                    value: format!("{}..{}", min, max),
                    reason: "Limits must be finite, non-negative and ordered".to_string(),
                });
            }
        }

        Ok(())
    }

    pub fn table_path(&self) -> PathBuf {
        PathBuf::from(&self.table.path)
    }

    pub fn image_dir(&self) -> PathBuf {
        PathBuf::from(&self.images.dir)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_seconds)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
