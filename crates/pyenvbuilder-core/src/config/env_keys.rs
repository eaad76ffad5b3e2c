//! 环境变量 key 常量与别名定义
//!
//! 主变量统一使用 `PYENVBUILDER_*` 前缀。

/// 配置文件路径（JSON），`--config` 优先
pub const PYENVBUILDER_CONFIG: &str = "PYENVBUILDER_CONFIG";

/// 当前激活的虚拟环境（由 activate 脚本设置），cleanup 不会删除它
pub const VIRTUAL_ENV: &str = "VIRTUAL_ENV";

/// 虚拟环境构建参数
pub mod builder {
    /// 环境目录名（默认 BuildEnv）
    pub const ENV_NAME: &str = "PYENVBUILDER_ENV_NAME";

    /// 创建环境所用的解释器
    pub const PYTHON: &str = "PYENVBUILDER_PYTHON";
    pub const PYTHON_ALIASES: &[&str] = &["PYTHON3"];

    /// 最低 Python 版本
    pub const PYTHON_VERSION: &str = "PYENVBUILDER_PYTHON_VERSION";

    /// pip install 是否追加 --no-cache-dir
    pub const NO_CACHE: &str = "PYENVBUILDER_NO_CACHE";
    pub const NO_CACHE_ALIASES: &[&str] = &["PIP_NO_CACHE_DIR"];
}

/// 可观测性与日志
pub mod observability {
    pub const PYENVBUILDER_QUIET: &str = "PYENVBUILDER_QUIET";

    pub const PYENVBUILDER_LOG_LEVEL: &str = "PYENVBUILDER_LOG_LEVEL";
    pub const LOG_LEVEL_ALIASES: &[&str] = &["LOG_LEVEL"];

    pub const PYENVBUILDER_LOG_JSON: &str = "PYENVBUILDER_LOG_JSON";

    pub const PYENVBUILDER_AUDIT_LOG: &str = "PYENVBUILDER_AUDIT_LOG";
}
