//! pyenvbuilder 统一配置层
//!
//! 所有环境变量读取集中在此模块，业务代码通过结构化配置访问，避免直接 `std::env::var`。
//!
//! - `loader`：env_or、env_optional、env_bool 等辅助函数，以及 `.env` 加载
//! - `schema`：BuilderConfig（默认值 → 配置文件 → 环境变量）、ObservabilityConfig
//! - `env_keys`：key 常量（含别名）

pub mod env_keys;
pub mod loader;
pub mod schema;

pub use loader::{env_bool, env_optional, env_or, load_dotenv, parse_bool};
pub use schema::{
    default_config_file, BuilderConfig, ConfigError, FileConfig, ObservabilityConfig,
    DEFAULT_ENV_NAME, DEFAULT_PYTHON_VERSION,
};
