//! # 基础设施组合层
//!
//! 把配置加载、日志初始化、类型扫描和 bean 工厂串成一次完整的启动过程。
//!
//! ## 主要功能
//!
//! - **应用配置**: 从 TOML 文件和 `IOC_` 前缀的环境变量加载 [`AppSettings`]
//! - **日志初始化**: 按 [`LoggingConfig`] 安装 `tracing` 订阅者
//! - **类型扫描**: [`CatalogScanner`] 在类型目录中按命名空间查找类型
//! - **启动器**: [`ApplicationBootstrapper`] 扫描命名空间并初始化全部 bean
//!
//! ## 基本使用
//!
//! ```rust,no_run
//! use di_abstractions::TypeCatalog;
//! use infrastructure_composition::{ApplicationBootstrapper, CatalogScanner};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let catalog = TypeCatalog::new();
//!
//!     let context = ApplicationBootstrapper::new()
//!         .load_settings(Some("config/app.toml".as_ref()))?
//!         .enable_logging(true)
//!         .add_scanner(CatalogScanner::new("app", catalog))
//!         .scan_namespace("app")
//!         .bootstrap()
//!         .await?;
//!
//!     println!("已创建 {} 个 bean", context.len());
//!     Ok(())
//! }
//! ```

pub mod bootstrapper;
pub mod catalog_scanner;
pub mod logging;
pub mod settings;

pub use bootstrapper::ApplicationBootstrapper;
pub use catalog_scanner::CatalogScanner;
pub use logging::init_logging;
pub use settings::{AppSettings, LoggingConfig};

// 重新导出错误类型
pub use infrastructure_common::InfrastructureError;
