//! 切面解析
//!
//! 读取切面类型上的切点和通知方法，定位目标类型，并把通知绑定到新建的切面实例上

use di_abstractions::{Advice, AdviceFn, ErasedValue, MethodDescriptor, TypeDescriptor};
use infrastructure_common::{
    normalize_path, strip_arguments, BeanInstance, DependencyError, MethodMarker, TypeInfo,
};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// 解析后的切点表达式
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointcutExpression {
    /// 目标类型路径
    pub target_path: String,
    /// 被拦截的方法名
    pub method: String,
}

/// 解析 `owner::Type::method(...)` 形式的切点表达式
///
/// 也接受 `.` 分隔的路径。缺少类型或方法部分时返回 `None`。
pub fn parse_pointcut(expression: &str) -> Option<PointcutExpression> {
    let path = normalize_path(strip_arguments(expression));
    let (target_path, method) = path.rsplit_once("::")?;
    let target_path = target_path.trim_end_matches(':');
    if target_path.is_empty() || method.is_empty() {
        return None;
    }
    Some(PointcutExpression {
        target_path: target_path.to_string(),
        method: method.to_string(),
    })
}

/// 一个切面解析出的全部织入材料
pub struct AdviceBundle {
    /// 切面类型
    pub aspect: TypeInfo,
    /// 目标类型的描述符
    pub target: TypeDescriptor,
    /// 新建的目标实例，未注入任何依赖
    pub target_instance: ErasedValue,
    /// 绑定好的通知
    pub advice: Advice,
}

impl fmt::Debug for AdviceBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdviceBundle")
            .field("aspect", &self.aspect.type_name)
            .field("target", &self.target.type_info().type_name)
            .field("advice", &self.advice)
            .finish()
    }
}

/// 切面解析结果
#[derive(Debug)]
pub enum AspectResolution {
    /// 可以织入
    Woven(AdviceBundle),
    /// 跳过，附带原因
    Skipped(String),
}

/// 切面解析器
pub struct AspectResolver<'a> {
    catalog: &'a [TypeDescriptor],
}

impl<'a> AspectResolver<'a> {
    /// 在给定的类型列表中查找切点目标
    pub fn new(catalog: &'a [TypeDescriptor]) -> Self {
        Self { catalog }
    }

    /// 解析一个切面
    ///
    /// 切点缺失、表达式无效或没有匹配的通知时跳过；切点目标不在类型列表中时返回错误。
    pub fn resolve_advice(&self, aspect: &TypeDescriptor) -> Result<AspectResolution, DependencyError> {
        let aspect_info = aspect.type_info();

        let Some((pointcut_name, expression)) = find_pointcut(aspect) else {
            warn!("切面 {} 没有声明切点，跳过", aspect_info);
            return Ok(AspectResolution::Skipped("没有声明切点".to_string()));
        };

        let Some(pointcut) = parse_pointcut(expression) else {
            warn!("切面 {} 的切点表达式无效: {}", aspect_info, expression);
            return Ok(AspectResolution::Skipped(format!("切点表达式无效: {expression}")));
        };

        let target = self
            .catalog
            .iter()
            .find(|descriptor| descriptor.type_info().matches_path(&pointcut.target_path))
            .ok_or_else(|| DependencyError::AspectTargetNotFound {
                aspect: aspect_info.type_name.to_string(),
                target: pointcut.target_path.clone(),
            })?;

        if !target.is_bean() {
            warn!("切面 {} 的目标 {} 没有组件标记，跳过", aspect_info, target.type_info());
            return Ok(AspectResolution::Skipped(format!(
                "目标 {} 没有组件标记",
                target.type_info()
            )));
        }

        let instance: BeanInstance = Arc::from(aspect.construct()?);
        let mut before = None;
        let mut after = None;
        for method in aspect.methods() {
            match method.marker() {
                MethodMarker::Before(binding) if strip_arguments(binding) == pointcut_name => {
                    before = bind(method, &instance);
                }
                MethodMarker::After(binding) if strip_arguments(binding) == pointcut_name => {
                    after = bind(method, &instance);
                }
                MethodMarker::Before(binding) | MethodMarker::After(binding) => {
                    debug!(
                        "{}::{} 绑定到 {}，与切点 {} 不匹配",
                        aspect_info.short_name(),
                        method.name(),
                        binding,
                        pointcut_name
                    );
                }
                MethodMarker::Pointcut(_) => {}
            }
        }

        if before.is_none() && after.is_none() {
            warn!("切面 {} 没有绑定到切点 {} 的通知，跳过", aspect_info, pointcut_name);
            return Ok(AspectResolution::Skipped(format!(
                "没有绑定到切点 {pointcut_name} 的通知"
            )));
        }

        let target_instance = target.construct()?;
        let advice = Advice::new(aspect_info, pointcut.method)
            .with_before(before)
            .with_after(after);
        debug!(
            "切面 {} 作用于 {}::{}",
            aspect_info,
            target.type_info(),
            advice.method()
        );

        Ok(AspectResolution::Woven(AdviceBundle {
            aspect: aspect_info,
            target: target.clone(),
            target_instance,
            advice,
        }))
    }
}

/// 取切点方法名和表达式，多个切点时保留最后一个
fn find_pointcut(aspect: &TypeDescriptor) -> Option<(&'static str, &str)> {
    let mut found = None;
    for method in aspect.methods() {
        if let MethodMarker::Pointcut(expression) = method.marker() {
            if found.is_some() {
                warn!(
                    "切面 {} 声明了多个切点，只保留最后一个",
                    aspect.type_info()
                );
            }
            found = Some((method.name(), expression.as_str()));
        }
    }
    found
}

fn bind(method: &MethodDescriptor, instance: &BeanInstance) -> Option<AdviceFn> {
    let invoke = method.invoker()?.clone();
    let instance = instance.clone();
    Some(Arc::new(move || invoke(instance.as_ref())))
}
