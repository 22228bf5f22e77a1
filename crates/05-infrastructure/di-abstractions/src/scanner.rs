//! 类型扫描器抽象接口
//!
//! 给定命名空间，返回其中可用的类型描述符

use crate::descriptor::{Describe, TypeDescriptor};
use async_trait::async_trait;
use infrastructure_common::{normalize_path, ComponentError};

/// 类型扫描器 trait
#[async_trait]
pub trait TypeScanner: Send + Sync {
    /// 扫描命名空间下的类型，保持发现顺序
    async fn scan(&self, namespace: &str) -> Result<Vec<TypeDescriptor>, ComponentError>;

    /// 获取扫描器名称
    fn name(&self) -> &str;

    /// 检查是否支持指定的命名空间
    fn supports(&self, _namespace: &str) -> bool {
        true
    }
}

/// 类型目录
///
/// 显式登记的有序描述符列表
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    descriptors: Vec<TypeDescriptor>,
}

impl TypeCatalog {
    /// 创建空目录
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记可自描述的类型
    pub fn with<T: Describe>(self) -> Self {
        self.with_descriptor(T::descriptor())
    }

    /// 登记描述符，同一类型只保留第一次登记
    pub fn with_descriptor(mut self, descriptor: TypeDescriptor) -> Self {
        self.add(descriptor);
        self
    }

    /// 登记描述符，返回是否为新类型
    pub fn add(&mut self, descriptor: TypeDescriptor) -> bool {
        if self.contains(&descriptor) {
            return false;
        }
        self.descriptors.push(descriptor);
        true
    }

    fn contains(&self, descriptor: &TypeDescriptor) -> bool {
        self.descriptors
            .iter()
            .any(|known| known.type_info() == descriptor.type_info())
    }

    /// 命名空间下的描述符
    ///
    /// 命名空间可用 `::` 或 `.` 分隔，按模块路径分段匹配；空命名空间匹配全部
    pub fn under(&self, namespace: &str) -> Vec<TypeDescriptor> {
        let namespace = normalize_path(namespace);
        self.descriptors
            .iter()
            .filter(|descriptor| in_namespace(descriptor.type_info().module_path(), &namespace))
            .cloned()
            .collect()
    }

    /// 全部描述符
    pub fn descriptors(&self) -> &[TypeDescriptor] {
        &self.descriptors
    }

    /// 登记的类型数量
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

fn in_namespace(module_path: &str, namespace: &str) -> bool {
    if namespace.is_empty() || module_path == namespace {
        return true;
    }
    // 允许省略 crate 前缀，例如 `service` 匹配 `app::service`
    let segments: Vec<&str> = module_path.split("::").collect();
    let wanted: Vec<&str> = namespace.split("::").collect();
    (0..segments.len()).any(|start| segments[start..].starts_with(&wanted))
}
