use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;

/// 默认配置文件
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- 消息源 ---
    /// 存放订单邮件的目录
    pub message_folder: String,
    /// 邮件主题筛选词
    pub message_subject: String,
    /// 轮询间隔（分钟）
    pub sleep_timer_min: u64,
    // --- 输出 ---
    /// 完整报表（JSON，含敏感视图）
    pub report_file: String,
    /// 订单单据文件，留空则不生成
    pub slip_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- WordPress 配置 ---
    pub publish_enabled: bool,
    pub wp_url: String,
    pub wp_user: String,
    pub wp_pass: String,
    pub wp_postid: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            message_folder: "messages".to_string(),
            message_subject: "Herbstfest".to_string(),
            sleep_timer_min: 5,
            report_file: "herbstfest_report.json".to_string(),
            slip_file: String::new(),
            verbose_logging: false,
            publish_enabled: false,
            wp_url: String::new(),
            wp_user: String::new(),
            wp_pass: String::new(),
            wp_postid: String::new(),
        }
    }
}

fn env_parse<T: std::str::FromStr>(
    var_name: &str,
    expected_type: &str,
    default: T,
) -> Result<T, ConfigError> {
    match std::env::var(var_name) {
        Ok(value) => value.parse().map_err(|_| ConfigError::EnvVarParseFailed {
            var_name: var_name.to_string(),
            value,
            expected_type: expected_type.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

impl Config {
    /// 用环境变量覆盖 `base` 中的值
    pub fn with_env_overrides(base: Self) -> Result<Self, ConfigError> {
        Ok(Self {
            message_folder: std::env::var("MESSAGE_FOLDER").unwrap_or(base.message_folder),
            message_subject: std::env::var("MESSAGE_SUBJECT").unwrap_or(base.message_subject),
            sleep_timer_min: env_parse("SLEEP_TIMER_MIN", "u64", base.sleep_timer_min)?,
            report_file: std::env::var("REPORT_FILE").unwrap_or(base.report_file),
            slip_file: std::env::var("SLIP_FILE").unwrap_or(base.slip_file),
            verbose_logging: env_parse("VERBOSE_LOGGING", "bool", base.verbose_logging)?,
            publish_enabled: env_parse("PUBLISH_ENABLED", "bool", base.publish_enabled)?,
            wp_url: std::env::var("WP_URL").unwrap_or(base.wp_url),
            wp_user: std::env::var("WP_USER").unwrap_or(base.wp_user),
            wp_pass: std::env::var("WP_PASS").unwrap_or(base.wp_pass),
            wp_postid: std::env::var("WP_POSTID").unwrap_or(base.wp_postid),
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::with_env_overrides(Self::default())
    }

    pub fn from_toml_str(content: &str, path: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.to_string(),
            source,
        })
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: display.clone(),
            source,
        })?;
        Self::from_toml_str(&content, &display)
    }

    /// 加载配置：配置文件（`HERBSTFEST_CONFIG`，默认 config.toml，存在时）+ 环境变量
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("HERBSTFEST_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        let path = Path::new(&path);
        let base = if path.exists() {
            Self::from_toml_file(path)?
        } else {
            Self::default()
        };
        Self::with_env_overrides(base)
    }

    /// 轮询间隔
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.sleep_timer_min.saturating_mul(60))
    }

    pub fn slip_file(&self) -> Option<&str> {
        if self.slip_file.is_empty() {
            None
        } else {
            Some(&self.slip_file)
        }
    }
}
