//! 能力索引
//!
//! 每次初始化开始时构建一次：能力类型 -> 按选择规则排好序的实现类型

use di_abstractions::{CapabilityTieBreak, ComponentRegistry, TypeDescriptor};
use infrastructure_common::{Bean, TypeInfo};
use std::any::TypeId;
use std::collections::HashMap;
use tracing::debug;

/// 能力索引
#[derive(Debug, Clone, Default)]
pub struct CapabilityIndex {
    candidates: HashMap<TypeId, Vec<TypeInfo>>,
}

impl CapabilityIndex {
    /// 从会被实例化的描述符构建索引
    pub fn build<'a>(
        descriptors: impl IntoIterator<Item = &'a TypeDescriptor>,
        tie_break: CapabilityTieBreak,
    ) -> Self {
        let mut candidates: HashMap<TypeId, Vec<TypeInfo>> = HashMap::new();
        for descriptor in descriptors.into_iter().filter(|d| d.is_bean()) {
            for binding in descriptor.capabilities() {
                let entry = candidates.entry(binding.capability().id).or_default();
                if !entry.contains(&descriptor.type_info()) {
                    entry.push(descriptor.type_info());
                }
            }
        }

        if tie_break == CapabilityTieBreak::TypeName {
            for implementations in candidates.values_mut() {
                implementations.sort_by_key(|info| info.type_name);
            }
        }

        Self { candidates }
    }

    /// 能力的候选实现，已排序
    pub fn candidates(&self, capability: TypeId) -> &[TypeInfo] {
        self.candidates
            .get(&capability)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// 取第一个已注册且提供该能力的实现
    pub fn resolve(&self, capability: TypeInfo, registry: &dyn ComponentRegistry) -> Option<Bean> {
        let candidates = self.candidates(capability.id);
        if candidates.len() > 1 {
            debug!(
                "能力 {} 有 {} 个候选实现，按选择规则取第一个可用实现",
                capability,
                candidates.len()
            );
        }
        candidates
            .iter()
            .filter_map(|candidate| registry.lookup(candidate.id))
            .find(|bean| bean.provides(capability.id))
    }
}
