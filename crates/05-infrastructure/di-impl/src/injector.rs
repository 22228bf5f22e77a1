//! 依赖注入器
//!
//! 实例化组件、按属性声明注入依赖，再把组装好的 bean 注册到注册表

use crate::capability::CapabilityIndex;
use di_abstractions::{ComponentRegistry, TypeDescriptor};
use infrastructure_common::{Bean, DependencyError, TypeInfo};
use tracing::{debug, warn};

/// 创建 bean 时某个属性实际拿到的值
#[derive(Debug, Clone)]
pub struct CapturedAttribute {
    /// 属性名称
    pub attribute: &'static str,
    /// 属性声明的类型
    pub requested: TypeInfo,
    /// 注入的 bean，未解析时为 `None`
    pub bean: Option<Bean>,
}

impl CapturedAttribute {
    /// 与当前解析结果相比是否已过期
    pub fn is_stale(&self, current: Option<&Bean>) -> bool {
        match (&self.bean, current) {
            (None, None) => false,
            (Some(captured), Some(current)) => !captured.same_instance(current),
            _ => true,
        }
    }
}

/// 新创建的 bean 及其注入记录
#[derive(Debug, Clone)]
pub struct CreatedBean {
    pub bean: Bean,
    pub captured: Vec<CapturedAttribute>,
}

/// 依赖注入器
pub struct DependencyInjector<'a> {
    registry: &'a dyn ComponentRegistry,
    capabilities: &'a CapabilityIndex,
}

impl<'a> DependencyInjector<'a> {
    pub fn new(registry: &'a dyn ComponentRegistry, capabilities: &'a CapabilityIndex) -> Self {
        Self {
            registry,
            capabilities,
        }
    }

    /// 解析属性声明的类型
    ///
    /// 先按类型键直接查找，找不到时视为能力类型查能力索引
    pub fn resolve(&self, requested: TypeInfo) -> Option<Bean> {
        match self.registry.lookup(requested.id) {
            Some(bean) if bean.provides(requested.id) => {
                if bean.is_proxy() && bean.type_info() == requested {
                    warn!(
                        "{} 已被切面代理，按具体类型注入的是代理内部的目标，调用不会被拦截",
                        requested
                    );
                }
                Some(bean)
            }
            Some(_) => None,
            None => self.capabilities.resolve(requested, self.registry),
        }
    }

    /// 创建并注册 bean
    ///
    /// 没有 Component/Controller 标记的类型直接跳过，返回 `None`。
    /// 无法解析的属性保持为空，是否致命由调用方在重新注入之后判断。
    pub fn create_bean(&self, descriptor: &TypeDescriptor) -> Result<Option<CreatedBean>, DependencyError> {
        let type_info = descriptor.type_info();
        if !descriptor.is_bean() {
            debug!("跳过未标记为组件的类型: {}", type_info);
            return Ok(None);
        }

        let mut value = descriptor.construct()?;
        let mut captured = Vec::with_capacity(descriptor.attributes().len());

        for attribute in descriptor.attributes() {
            let resolved = self.resolve(attribute.requested());
            if resolved.is_none() {
                debug!(
                    "{}.{} 的依赖 {} 暂时无法解析",
                    type_info.short_name(),
                    attribute.name(),
                    attribute.requested()
                );
            }

            attribute.inject(value.as_mut(), resolved.as_ref());
            captured.push(CapturedAttribute {
                attribute: attribute.name(),
                requested: attribute.requested(),
                bean: resolved,
            });
        }

        let bean = descriptor.assemble(value)?;
        self.registry.register(type_info, bean.clone());
        debug!("创建 bean: {}，注入 {} 个属性", type_info, captured.len());

        Ok(Some(CreatedBean { bean, captured }))
    }
}
