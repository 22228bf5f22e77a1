//! 代理织入

use crate::aspect::AdviceBundle;
use di_abstractions::ComponentRegistry;
use infrastructure_common::{Bean, DependencyError};
use std::sync::Arc;
use tracing::{info, warn};

/// 代理织入器
///
/// 把目标实例包装为 `AspectProxy` 并以目标类型为键注册，替换原有的 bean
pub struct ProxyWeaver<'a> {
    registry: &'a dyn ComponentRegistry,
}

impl<'a> ProxyWeaver<'a> {
    pub fn new(registry: &'a dyn ComponentRegistry) -> Self {
        Self { registry }
    }

    /// 创建并注册代理
    pub fn create_proxy(&self, bundle: AdviceBundle) -> Result<Bean, DependencyError> {
        let AdviceBundle {
            aspect,
            target,
            target_instance,
            advice,
        } = bundle;
        let target_info = target.type_info();

        let method = advice.method().to_string();
        let proxy = target.weave(target_instance, Arc::new(advice))?;
        if let Some(previous) = self.registry.register(target_info, proxy.clone()) {
            if previous.is_proxy() {
                warn!("{} 已有切面代理，被切面 {} 覆盖", target_info, aspect);
            }
        }

        info!("织入切面 {} -> {}::{}", aspect.short_name(), target_info.short_name(), method);
        Ok(proxy)
    }
}
