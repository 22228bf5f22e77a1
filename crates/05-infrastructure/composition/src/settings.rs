//! 应用配置
//!
//! 配置来源按优先级从低到高依次为：字段默认值、TOML 文件、环境变量。
//! 环境变量以 `IOC_` 开头，层级之间用 `__` 分隔，例如
//! `IOC_CONTAINER__CIRCULAR_DEPENDENCIES=fail`。

use config::{Config, Environment, File, FileFormat};
use di_abstractions::ContainerConfig;
use infrastructure_common::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// 应用配置
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// 容器配置
    pub container: ContainerConfig,
    /// 日志配置
    pub logging: LoggingConfig,
}

impl AppSettings {
    /// 环境变量前缀
    pub const ENV_PREFIX: &'static str = "IOC";

    /// 从可选的 TOML 文件和 `IOC_` 环境变量加载配置
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_prefix(path, Self::ENV_PREFIX)
    }

    /// 使用指定的环境变量前缀加载配置
    pub fn load_with_prefix(path: Option<&Path>, prefix: &str) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            if !path.exists() {
                return Err(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                });
            }
            debug!("加载配置文件: {}", path.display());
            builder = builder.add_source(File::from(path).format(FileFormat::Toml));
        }

        let settings = builder
            .add_source(
                Environment::with_prefix(prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(parse_error)?;

        settings.try_deserialize().map_err(parse_error)
    }

    /// 从 TOML 文本解析配置，不读取环境变量
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from_str(content, FileFormat::Toml))
            .build()
            .and_then(Config::try_deserialize)
            .map_err(parse_error)
    }
}

fn parse_error(error: config::ConfigError) -> ConfigError {
    ConfigError::ParseError {
        source: Box::new(error),
    }
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志过滤规则，语法与 `RUST_LOG` 相同
    pub level: String,
    /// 是否使用 JSON 格式
    pub json_format: bool,
    /// 是否显示目标
    pub show_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            show_target: true,
        }
    }
}

impl LoggingConfig {
    /// 创建开发环境日志配置
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            json_format: false,
            show_target: true,
        }
    }

    /// 创建生产环境日志配置
    pub fn production() -> Self {
        Self {
            level: "info".to_string(),
            json_format: true,
            show_target: false,
        }
    }
}
