//! 基于类型目录的扫描器

use async_trait::async_trait;
use di_abstractions::{TypeCatalog, TypeDescriptor, TypeScanner};
use infrastructure_common::ComponentError;
use tracing::debug;

/// 类型目录扫描器
///
/// 在显式登记的 [`TypeCatalog`] 中查找命名空间下的类型，保持登记顺序
#[derive(Debug, Clone)]
pub struct CatalogScanner {
    name: String,
    catalog: TypeCatalog,
}

impl CatalogScanner {
    /// 创建扫描器
    pub fn new(name: impl Into<String>, catalog: TypeCatalog) -> Self {
        Self {
            name: name.into(),
            catalog,
        }
    }

    /// 扫描器使用的目录
    pub fn catalog(&self) -> &TypeCatalog {
        &self.catalog
    }
}

#[async_trait]
impl TypeScanner for CatalogScanner {
    async fn scan(&self, namespace: &str) -> Result<Vec<TypeDescriptor>, ComponentError> {
        let found = self.catalog.under(namespace);
        debug!(
            scanner = %self.name,
            namespace,
            count = found.len(),
            "扫描命名空间"
        );
        Ok(found)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn supports(&self, namespace: &str) -> bool {
        !self.catalog.under(namespace).is_empty()
    }
}
