//! 组件注册表实现

use dashmap::DashMap;
use di_abstractions::ComponentRegistry;
use infrastructure_common::{Bean, TypeInfo};
use std::any::TypeId;
use tracing::debug;

/// 基于 `DashMap` 的单例注册表
#[derive(Debug, Default)]
pub struct BeanRegistry {
    beans: DashMap<TypeId, Bean>,
}

impl BeanRegistry {
    /// 创建空注册表
    pub fn new() -> Self {
        Self::default()
    }
}

impl ComponentRegistry for BeanRegistry {
    fn register(&self, type_info: TypeInfo, bean: Bean) -> Option<Bean> {
        let previous = self.beans.insert(type_info.id, bean);
        if previous.is_some() {
            debug!("覆盖已注册的 bean: {}", type_info);
        } else {
            debug!("注册 bean: {}", type_info);
        }
        previous
    }

    fn lookup(&self, type_id: TypeId) -> Option<Bean> {
        self.beans.get(&type_id).map(|entry| entry.value().clone())
    }

    fn contains(&self, type_id: TypeId) -> bool {
        self.beans.contains_key(&type_id)
    }

    fn registered_types(&self) -> Vec<TypeInfo> {
        self.beans.iter().map(|entry| entry.value().type_info()).collect()
    }

    fn len(&self) -> usize {
        self.beans.len()
    }
}
