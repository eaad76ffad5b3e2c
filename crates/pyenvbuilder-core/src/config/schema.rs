//! 按领域分组的配置结构体
//!
//! 优先级（低 → 高）：内置默认值 → JSON 配置文件 → 环境变量 → CLI 参数（由调用方覆盖）。

use super::env_keys::{self, builder as builder_keys, observability as obv_keys};
use super::loader::{env_bool, env_optional, env_or};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 默认环境目录名
pub const DEFAULT_ENV_NAME: &str = "BuildEnv";

/// 默认最低 Python 版本
pub const DEFAULT_PYTHON_VERSION: &str = "3.6";

/// Errors raised while locating or reading a config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// JSON 配置文件内容，所有字段可选
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct FileConfig {
    pub env_name: Option<String>,
    pub python_version: Option<String>,
    pub python: Option<PathBuf>,
    pub requirements: Option<Vec<String>>,
    pub no_cache: Option<bool>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// 用户级默认配置文件：`<config_dir>/pyenvbuilder/config.json`
pub fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("pyenvbuilder").join("config.json"))
}

/// 虚拟环境构建配置
#[derive(Debug, Clone, PartialEq)]
pub struct BuilderConfig {
    pub env_name: String,
    /// 最低 Python 版本（字符串形式，由 preflight 解析）
    pub python_version: String,
    /// 显式指定的解释器；None 时在 PATH 中查找 python3 / python
    pub python: Option<PathBuf>,
    /// 每次 create 默认追加安装的包
    pub requirements: Vec<String>,
    pub no_cache: bool,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            env_name: DEFAULT_ENV_NAME.to_string(),
            python_version: DEFAULT_PYTHON_VERSION.to_string(),
            python: None,
            requirements: Vec::new(),
            no_cache: true,
        }
    }
}

impl BuilderConfig {
    /// 加载完整配置：`explicit`（--config）必须存在；否则依次尝试
    /// `$PYENVBUILDER_CONFIG` 与用户级默认文件（不存在则忽略）。
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        super::loader::load_dotenv();
        let mut cfg = Self::default();
        let file = match explicit {
            Some(p) => Some(FileConfig::load(p)?),
            None => match env_optional(env_keys::PYENVBUILDER_CONFIG, &[]) {
                Some(p) => Some(FileConfig::load(Path::new(&p))?),
                None => match default_config_file().filter(|p| p.exists()) {
                    Some(p) => Some(FileConfig::load(&p)?),
                    None => None,
                },
            },
        };
        if let Some(file) = file {
            tracing::debug!(?file, "Loaded config file");
            cfg.apply_file(file);
        }
        cfg.apply_env();
        Ok(cfg)
    }

    /// 用配置文件中已设置的字段覆盖当前值
    pub fn apply_file(&mut self, file: FileConfig) {
        if let Some(name) = file.env_name.filter(|s| !s.trim().is_empty()) {
            self.env_name = name;
        }
        if let Some(version) = file.python_version.filter(|s| !s.trim().is_empty()) {
            self.python_version = version;
        }
        if let Some(python) = file.python {
            self.python = Some(python);
        }
        if let Some(requirements) = file.requirements {
            self.requirements = requirements;
        }
        if let Some(no_cache) = file.no_cache {
            self.no_cache = no_cache;
        }
    }

    fn apply_env(&mut self) {
        if let Some(name) = env_optional(builder_keys::ENV_NAME, &[]) {
            self.env_name = name;
        }
        if let Some(version) = env_optional(builder_keys::PYTHON_VERSION, &[]) {
            self.python_version = version;
        }
        if let Some(python) = env_optional(builder_keys::PYTHON, builder_keys::PYTHON_ALIASES) {
            self.python = Some(PathBuf::from(python));
        }
        self.no_cache = env_bool(
            builder_keys::NO_CACHE,
            builder_keys::NO_CACHE_ALIASES,
            self.no_cache,
        );
    }
}

/// 可观测性配置：quiet、log_level、log_json、audit_log
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub quiet: bool,
    pub log_level: String,
    pub log_json: bool,
    pub audit_log: Option<String>,
}

impl ObservabilityConfig {
    pub fn from_env() -> &'static Self {
        use std::sync::OnceLock;
        static CACHE: OnceLock<ObservabilityConfig> = OnceLock::new();
        CACHE.get_or_init(|| {
            super::loader::load_dotenv();
            Self {
                quiet: env_bool(obv_keys::PYENVBUILDER_QUIET, &[], false),
                log_level: env_or(
                    obv_keys::PYENVBUILDER_LOG_LEVEL,
                    obv_keys::LOG_LEVEL_ALIASES,
                    || "pyenvbuilder=info".to_string(),
                ),
                log_json: env_bool(obv_keys::PYENVBUILDER_LOG_JSON, &[], false),
                audit_log: env_optional(obv_keys::PYENVBUILDER_AUDIT_LOG, &[]),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_defaults() {
        let cfg = BuilderConfig::default();
        assert_eq!(cfg.env_name, "BuildEnv");
        assert_eq!(cfg.python_version, "3.6");
        assert!(cfg.requirements.is_empty());
        assert!(cfg.no_cache);
        assert!(cfg.python.is_none());
    }

    #[test]
    fn test_file_config_partial_override() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        fs::write(
            &path,
            r#"{"env_name": "XcodeEnv", "requirements": ["wheel", "black==24.1.0"], "no_cache": false}"#,
        )
        .unwrap();

        let file = FileConfig::load(&path).unwrap();
        let mut cfg = BuilderConfig::default();
        cfg.apply_file(file);

        assert_eq!(cfg.env_name, "XcodeEnv");
        assert_eq!(cfg.python_version, "3.6");
        assert_eq!(cfg.requirements, vec!["wheel", "black==24.1.0"]);
        assert!(!cfg.no_cache);
    }

    #[test]
    fn test_file_config_blank_name_keeps_default() {
        let mut cfg = BuilderConfig::default();
        cfg.apply_file(FileConfig {
            env_name: Some("  ".into()),
            ..Default::default()
        });
        assert_eq!(cfg.env_name, DEFAULT_ENV_NAME);
    }

    #[test]
    fn test_file_config_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let err = FileConfig::load(&tmp.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_file_config_malformed() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        let err = FileConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("config.json"));
    }
}
