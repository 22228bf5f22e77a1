//! 日志初始化

use crate::settings::LoggingConfig;
use infrastructure_common::InfrastructureError;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 按配置安装全局 `tracing` 订阅者
///
/// 设置了 `RUST_LOG` 时以环境变量为准。每个进程只能成功调用一次。
pub fn init_logging(config: &LoggingConfig) -> Result<(), InfrastructureError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level).map_err(|e| {
            InfrastructureError::BootstrapFailed {
                message: format!("日志级别无效: {}, 原因: {}", config.level, e),
            }
        })?,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.show_target);

    if config.json_format {
        subscriber.json().try_init()
    } else {
        subscriber.try_init()
    }
    .map_err(|e| InfrastructureError::BootstrapFailed {
        message: format!("日志初始化失败: {}", e),
    })?;

    info!("日志系统初始化完成");
    Ok(())
}
