//! 应用启动器
//!
//! 负责协调一次启动的各个步骤：配置、日志、类型扫描、bean 初始化

use crate::logging::init_logging;
use crate::settings::AppSettings;
use di_abstractions::{TypeCatalog, TypeDescriptor, TypeScanner};
use di_impl::{BeanContext, BeanFactory};
use infrastructure_common::{ComponentError, InfrastructureError};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info};

/// 应用启动器
pub struct ApplicationBootstrapper {
    /// 应用配置
    settings: AppSettings,
    /// 类型扫描器列表
    scanners: Vec<Box<dyn TypeScanner>>,
    /// 要扫描的命名空间，为空时扫描全部
    namespaces: Vec<String>,
    /// 是否初始化日志
    logging_enabled: bool,
}

impl ApplicationBootstrapper {
    /// 创建使用默认配置的启动器
    pub fn new() -> Self {
        Self {
            settings: AppSettings::default(),
            scanners: Vec::new(),
            namespaces: Vec::new(),
            logging_enabled: false,
        }
    }

    /// 使用指定配置
    pub fn with_settings(mut self, settings: AppSettings) -> Self {
        self.settings = settings;
        self
    }

    /// 从可选的 TOML 文件和环境变量加载配置
    pub fn load_settings(mut self, path: Option<&Path>) -> Result<Self, InfrastructureError> {
        self.settings = AppSettings::load(path)?;
        Ok(self)
    }

    /// 是否在启动时初始化日志
    ///
    /// 默认不初始化，避免在测试中重复安装订阅者
    pub fn enable_logging(mut self, enabled: bool) -> Self {
        self.logging_enabled = enabled;
        self
    }

    /// 添加类型扫描器
    pub fn add_scanner<T: TypeScanner + 'static>(mut self, scanner: T) -> Self {
        debug!("添加类型扫描器: {}", scanner.name());
        self.scanners.push(Box::new(scanner));
        self
    }

    /// 添加要扫描的命名空间
    pub fn scan_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespaces.push(namespace.into());
        self
    }

    /// 当前配置
    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    /// 启动应用
    pub async fn bootstrap(self) -> Result<BeanContext, InfrastructureError> {
        if self.logging_enabled {
            init_logging(&self.settings.logging)?;
        }

        let started = Instant::now();
        info!("开始启动应用");

        let types = self.scan_types().await?;
        info!("类型扫描完成，共 {} 个类型", types.len());

        let factory = BeanFactory::new(self.settings.container.clone());
        let context = factory.init_beans(&types).map_err(|e| {
            error!("bean 初始化失败: {}", e);
            InfrastructureError::from(e)
        })?;

        info!(
            beans = context.len(),
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "应用启动完成"
        );
        Ok(context)
    }

    /// 扫描全部命名空间，同一类型只保留第一次发现
    async fn scan_types(&self) -> Result<Vec<TypeDescriptor>, InfrastructureError> {
        if self.scanners.is_empty() {
            return Err(InfrastructureError::BootstrapFailed {
                message: "没有注册类型扫描器".to_string(),
            });
        }

        let all = [String::new()];
        let namespaces = if self.namespaces.is_empty() {
            &all[..]
        } else {
            &self.namespaces[..]
        };

        let mut catalog = TypeCatalog::new();
        for namespace in namespaces {
            let mut supported = false;
            for scanner in self.scanners.iter().filter(|s| s.supports(namespace)) {
                supported = true;
                let found = scanner.scan(namespace).await?;
                debug!(
                    scanner = scanner.name(),
                    namespace = namespace.as_str(),
                    count = found.len(),
                    "命名空间扫描完成"
                );
                for descriptor in found {
                    let type_info = descriptor.type_info();
                    if !catalog.add(descriptor) {
                        debug!("重复发现的类型已忽略: {}", type_info);
                    }
                }
            }
            if !supported {
                return Err(ComponentError::scan_error(format!(
                    "没有扫描器支持命名空间: {}",
                    namespace
                ))
                .into());
            }
        }

        Ok(catalog.descriptors().to_vec())
    }
}

impl Default for ApplicationBootstrapper {
    fn default() -> Self {
        Self::new()
    }
}
