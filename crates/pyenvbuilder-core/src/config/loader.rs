//! 统一环境变量加载逻辑
//!
//! 集中维护 fallback 链，避免在业务代码中重复 `or_else` 调用。

use std::env;
use std::path::Path;

/// 加载当前目录下的 `.env` 到环境变量（不覆盖已存在的变量）
pub fn load_dotenv() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let path = env::current_dir()
            .map(|d| d.join(".env"))
            .unwrap_or_else(|_| std::path::PathBuf::from(".env"));
        for (key, value) in read_dotenv(&path) {
            if env::var(&key).is_err() {
                #[allow(unsafe_code)]
                unsafe {
                    env::set_var(&key, &value);
                }
            }
        }
    });
}

/// 解析 `.env` 文件为 (key, value) 列表；文件不存在时返回空
pub(crate) fn read_dotenv(path: &Path) -> Vec<(String, String)> {
    let Ok(content) = std::fs::read_to_string(path) else {
        return Vec::new();
    };
    let mut pairs = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some(eq_pos) = line.find('=') else {
            continue;
        };
        let key = line[..eq_pos].trim();
        let mut value = line[eq_pos + 1..].trim();
        // Strip inline comment (# not inside quotes)
        if let Some(hash_pos) = value.find('#') {
            let before_hash = value[..hash_pos].trim_end();
            if !before_hash.contains('"') && !before_hash.contains('\'') {
                value = before_hash;
            }
        }
        if value.len() >= 2
            && ((value.starts_with('"') && value.ends_with('"'))
                || (value.starts_with('\'') && value.ends_with('\'')))
        {
            value = &value[1..value.len() - 1];
        }
        if !key.is_empty() {
            pairs.push((key.to_string(), value.to_string()));
        }
    }
    pairs
}

/// 从主变量或别名链读取环境变量，失败时使用默认值
pub fn env_or<F>(primary: &str, aliases: &[&str], default: F) -> String
where
    F: FnOnce() -> String,
{
    env_optional(primary, aliases).unwrap_or_else(default)
}

/// 从主变量或别名链读取，返回 Option（空值视为未设置）
pub fn env_optional(primary: &str, aliases: &[&str]) -> Option<String> {
    env::var(primary)
        .ok()
        .or_else(|| aliases.iter().find_map(|a| env::var(a).ok()))
        .and_then(|s| {
            let s = s.trim().to_string();
            if s.is_empty() {
                None
            } else {
                Some(s)
            }
        })
}

/// 解析布尔型环境变量：0/false/no/off 为 false，其余非空值为 true
pub fn env_bool(primary: &str, aliases: &[&str], default: bool) -> bool {
    env_optional(primary, aliases)
        .map(|s| parse_bool(&s))
        .unwrap_or(default)
}

/// 布尔字符串解析，供 env_bool 与配置文件共用
pub fn parse_bool(value: &str) -> bool {
    !matches!(
        value.trim().to_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_parse_bool() {
        for v in ["1", "true", "YES", "on"] {
            assert!(parse_bool(v), "{v}");
        }
        for v in ["0", "false", "No", " off "] {
            assert!(!parse_bool(v), "{v}");
        }
    }

    #[test]
    fn test_read_dotenv_quotes_and_comments() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(".env");
        fs::write(
            &path,
            "# comment\n\nPYENVBUILDER_ENV_NAME=\"XcodeEnv\"\nexport PYENVBUILDER_NO_CACHE=0 # off\nBROKEN\n",
        )
        .unwrap();
        let pairs = read_dotenv(&path);
        assert_eq!(
            pairs,
            vec![
                ("PYENVBUILDER_ENV_NAME".to_string(), "XcodeEnv".to_string()),
                ("PYENVBUILDER_NO_CACHE".to_string(), "0".to_string()),
            ]
        );
    }

    #[test]
    fn test_read_dotenv_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(read_dotenv(&tmp.path().join(".env")).is_empty());
    }
}
