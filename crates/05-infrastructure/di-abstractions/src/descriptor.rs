//! 类型描述符
//!
//! 描述符是一张类型擦除后的元数据表：组件标记、提供的能力、需要注入的属性、
//! 切面方法，以及构造、组装和织入代理所需的闭包。

use crate::proxy::{Advice, AspectProxy};
use infrastructure_common::{
    view_of, Bean, BeanInstance, BeanView, BoxError, ComponentMarker, DependencyError,
    MethodMarker, TypeInfo,
};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::warn;

/// 尚未组装的实例
pub type ErasedValue = Box<dyn Any + Send + Sync>;

/// 切面方法调用函数，参数为切面实例
pub type InvokeFn = Arc<dyn Fn(&(dyn Any + Send + Sync)) + Send + Sync>;

type ConstructFn = Arc<dyn Fn() -> Result<ErasedValue, BoxError> + Send + Sync>;
type AssembleFn = Arc<dyn Fn(ErasedValue) -> Result<Bean, DependencyError> + Send + Sync>;
type WeaveFn = Arc<dyn Fn(ErasedValue, Arc<Advice>) -> Result<Bean, DependencyError> + Send + Sync>;
type ViewFn = Arc<dyn Fn(&BeanInstance) -> Option<BeanView> + Send + Sync>;
type InjectFn = Arc<dyn Fn(&mut (dyn Any + Send + Sync), Option<&Bean>) -> bool + Send + Sync>;

/// 可自描述的类型
///
/// 通常由 `#[derive(Component)]` 生成
pub trait Describe: Send + Sync + 'static {
    /// 生成类型描述符
    fn descriptor() -> TypeDescriptor;
}

/// 切面类型上带标记的方法
///
/// 通常由 `#[advice]` 生成
pub trait AspectMethods {
    /// 列出切点和通知方法
    fn aspect_methods() -> Vec<MethodDescriptor>;
}

/// 能力绑定
#[derive(Clone)]
pub struct CapabilityBinding {
    capability: TypeInfo,
    direct: ViewFn,
    proxied: Option<ViewFn>,
}

impl CapabilityBinding {
    /// 能力类型
    pub fn capability(&self) -> TypeInfo {
        self.capability
    }

    /// 代理是否转发该能力
    pub fn is_proxied(&self) -> bool {
        self.proxied.is_some()
    }
}

/// 需要注入的属性
#[derive(Clone)]
pub struct AttributeDescriptor {
    name: &'static str,
    requested: TypeInfo,
    inject: InjectFn,
}

impl AttributeDescriptor {
    /// 属性名称
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// 属性声明的类型，可以是具体类型或能力类型
    pub fn requested(&self) -> TypeInfo {
        self.requested
    }

    /// 写入属性值，绕过可见性限制
    ///
    /// 返回是否写入了非空值
    pub fn inject(&self, target: &mut (dyn Any + Send + Sync), bean: Option<&Bean>) -> bool {
        (self.inject)(target, bean)
    }
}

impl fmt::Debug for AttributeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeDescriptor")
            .field("name", &self.name)
            .field("requested", &self.requested.type_name)
            .finish()
    }
}

/// 带标记的方法
#[derive(Clone)]
pub struct MethodDescriptor {
    name: &'static str,
    marker: MethodMarker,
    invoke: Option<InvokeFn>,
}

impl MethodDescriptor {
    /// 切点方法，只承载标记
    pub fn pointcut(name: &'static str, expression: impl Into<String>) -> Self {
        Self {
            name,
            marker: MethodMarker::Pointcut(expression.into()),
            invoke: None,
        }
    }

    /// 前置通知方法
    pub fn before<A, F>(name: &'static str, binding: impl Into<String>, advice: F) -> Self
    where
        A: Send + Sync + 'static,
        F: Fn(&A) + Send + Sync + 'static,
    {
        Self {
            name,
            marker: MethodMarker::Before(binding.into()),
            invoke: Some(erase_advice(advice)),
        }
    }

    /// 后置通知方法
    pub fn after<A, F>(name: &'static str, binding: impl Into<String>, advice: F) -> Self
    where
        A: Send + Sync + 'static,
        F: Fn(&A) + Send + Sync + 'static,
    {
        Self {
            name,
            marker: MethodMarker::After(binding.into()),
            invoke: Some(erase_advice(advice)),
        }
    }

    /// 方法名称
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// 方法标记
    pub fn marker(&self) -> &MethodMarker {
        &self.marker
    }

    /// 方法体
    pub fn invoker(&self) -> Option<&InvokeFn> {
        self.invoke.as_ref()
    }
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("name", &self.name)
            .field("marker", &self.marker)
            .finish()
    }
}

fn erase_advice<A, F>(advice: F) -> InvokeFn
where
    A: Send + Sync + 'static,
    F: Fn(&A) + Send + Sync + 'static,
{
    Arc::new(move |aspect: &(dyn Any + Send + Sync)| {
        if let Some(aspect) = aspect.downcast_ref::<A>() {
            advice(aspect);
        }
    })
}

/// 类型描述符
#[derive(Clone)]
pub struct TypeDescriptor {
    type_info: TypeInfo,
    marker: Option<ComponentMarker>,
    capabilities: Vec<CapabilityBinding>,
    attributes: Vec<AttributeDescriptor>,
    methods: Vec<MethodDescriptor>,
    constructor: Option<ConstructFn>,
    assemble: AssembleFn,
    weave: WeaveFn,
}

impl TypeDescriptor {
    /// 描述的类型
    pub fn type_info(&self) -> TypeInfo {
        self.type_info
    }

    /// 组件标记
    pub fn marker(&self) -> Option<ComponentMarker> {
        self.marker
    }

    /// 是否需要实例化为 bean
    pub fn is_bean(&self) -> bool {
        self.marker.map(|marker| marker.is_bean()).unwrap_or(false)
    }

    /// 是否为切面
    pub fn is_aspect(&self) -> bool {
        self.marker == Some(ComponentMarker::Aspect)
    }

    /// 提供的能力
    pub fn capabilities(&self) -> &[CapabilityBinding] {
        &self.capabilities
    }

    /// 需要注入的属性
    pub fn attributes(&self) -> &[AttributeDescriptor] {
        &self.attributes
    }

    /// 是否存在需要注入的属性
    pub fn has_injections(&self) -> bool {
        !self.attributes.is_empty()
    }

    /// 带标记的方法
    pub fn methods(&self) -> &[MethodDescriptor] {
        &self.methods
    }

    /// 是否存在默认构造函数
    pub fn has_constructor(&self) -> bool {
        self.constructor.is_some()
    }

    /// 调用默认构造函数
    pub fn construct(&self) -> Result<ErasedValue, DependencyError> {
        let constructor =
            self.constructor
                .as_ref()
                .ok_or_else(|| DependencyError::MissingDefaultConstructor {
                    type_name: self.type_info.type_name.to_string(),
                })?;
        constructor().map_err(|source| DependencyError::creation_failed(self.type_info.type_name, source))
    }

    /// 把实例组装为 bean
    pub fn assemble(&self, value: ErasedValue) -> Result<Bean, DependencyError> {
        (self.assemble)(value)
    }

    /// 把实例包装为切面代理
    pub fn weave(&self, value: ErasedValue, advice: Arc<Advice>) -> Result<Bean, DependencyError> {
        (self.weave)(value, advice)
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("type", &self.type_info.type_name)
            .field("marker", &self.marker)
            .field(
                "capabilities",
                &self
                    .capabilities
                    .iter()
                    .map(|binding| binding.capability.type_name)
                    .collect::<Vec<_>>(),
            )
            .field("attributes", &self.attributes)
            .field("methods", &self.methods)
            .field("has_constructor", &self.constructor.is_some())
            .finish()
    }
}

/// 类型描述符构建器
///
/// ```rust
/// use di_abstractions::ComponentType;
/// use std::sync::Arc;
///
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// #[derive(Default)]
/// struct English;
///
/// impl Greeter for English {
///     fn greet(&self) -> String {
///         "hello".to_string()
///     }
/// }
///
/// let descriptor = ComponentType::<English>::component()
///     .with_default()
///     .provides(|bean| -> Arc<dyn Greeter> { bean })
///     .build();
/// assert!(descriptor.is_bean());
/// ```
pub struct ComponentType<T> {
    marker: Option<ComponentMarker>,
    constructor: Option<ConstructFn>,
    capabilities: Vec<CapabilityBinding>,
    attributes: Vec<AttributeDescriptor>,
    methods: Vec<MethodDescriptor>,
    _type: PhantomData<fn() -> T>,
}

impl<T> ComponentType<T>
where
    T: Send + Sync + 'static,
{
    /// 创建没有组件标记的描述
    pub fn new() -> Self {
        Self {
            marker: None,
            constructor: None,
            capabilities: Vec::new(),
            attributes: Vec::new(),
            methods: Vec::new(),
            _type: PhantomData,
        }
    }

    /// 普通组件
    pub fn component() -> Self {
        Self::new().with_marker(ComponentMarker::Component)
    }

    /// 请求处理组件
    pub fn controller() -> Self {
        Self::new().with_marker(ComponentMarker::Controller)
    }

    /// 切面
    pub fn aspect() -> Self {
        Self::new().with_marker(ComponentMarker::Aspect)
    }

    /// 设置组件标记
    pub fn with_marker(mut self, marker: ComponentMarker) -> Self {
        self.marker = Some(marker);
        self
    }

    /// 使用 `Default` 作为默认构造函数
    pub fn with_default(self) -> Self
    where
        T: Default,
    {
        self.with_constructor(|| Ok::<T, BoxError>(T::default()))
    }

    /// 设置默认构造函数
    pub fn with_constructor<F, E>(mut self, constructor: F) -> Self
    where
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        self.constructor = Some(Arc::new(move || {
            constructor()
                .map(|value| Box::new(value) as ErasedValue)
                .map_err(Into::into)
        }));
        self
    }

    /// 声明提供的能力
    pub fn provides<C, F>(mut self, cast: F) -> Self
    where
        C: ?Sized + Send + Sync + 'static,
        F: Fn(Arc<T>) -> Arc<C> + Send + Sync + 'static,
    {
        self.capabilities.push(CapabilityBinding {
            capability: TypeInfo::of::<C>(),
            direct: erase_view(cast),
            proxied: None,
        });
        self
    }

    /// 声明提供的能力，并由 `AspectProxy<T>` 转发
    ///
    /// `AspectProxy<T>` 上的实现一般由 `forward_capability!` 生成
    pub fn proxied<C, F, P>(mut self, cast: F, proxy_cast: P) -> Self
    where
        C: ?Sized + Send + Sync + 'static,
        F: Fn(Arc<T>) -> Arc<C> + Send + Sync + 'static,
        P: Fn(Arc<AspectProxy<T>>) -> Arc<C> + Send + Sync + 'static,
    {
        self.capabilities.push(CapabilityBinding {
            capability: TypeInfo::of::<C>(),
            direct: erase_view(cast),
            proxied: Some(erase_view(proxy_cast)),
        });
        self
    }

    /// 声明需要注入的属性
    pub fn autowired<K, F>(mut self, name: &'static str, setter: F) -> Self
    where
        K: ?Sized + Send + Sync + 'static,
        F: Fn(&mut T, Option<Arc<K>>) + Send + Sync + 'static,
    {
        let inject: InjectFn = Arc::new(move |target: &mut (dyn Any + Send + Sync), bean: Option<&Bean>| {
            let Some(target) = target.downcast_mut::<T>() else {
                return false;
            };
            let value = bean.and_then(|bean| bean.view::<K>());
            let injected = value.is_some();
            setter(target, value);
            injected
        });
        self.attributes.push(AttributeDescriptor {
            name,
            requested: TypeInfo::of::<K>(),
            inject,
        });
        self
    }

    /// 声明切点方法
    pub fn pointcut(self, name: &'static str, expression: impl Into<String>) -> Self {
        self.method(MethodDescriptor::pointcut(name, expression))
    }

    /// 声明前置通知
    pub fn before<F>(self, name: &'static str, binding: impl Into<String>, advice: F) -> Self
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.method(MethodDescriptor::before::<T, F>(name, binding, advice))
    }

    /// 声明后置通知
    pub fn after<F>(self, name: &'static str, binding: impl Into<String>, advice: F) -> Self
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.method(MethodDescriptor::after::<T, F>(name, binding, advice))
    }

    /// 添加带标记的方法
    pub fn method(mut self, method: MethodDescriptor) -> Self {
        self.methods.push(method);
        self
    }

    /// 批量添加带标记的方法
    pub fn methods(mut self, methods: impl IntoIterator<Item = MethodDescriptor>) -> Self {
        self.methods.extend(methods);
        self
    }

    /// 生成描述符
    pub fn build(self) -> TypeDescriptor {
        let capabilities = Arc::new(self.capabilities.clone());

        let assemble_capabilities = capabilities.clone();
        let assemble: AssembleFn = Arc::new(move |value: ErasedValue| {
            let instance = downcast_value::<T>(value)?;
            let erased: BeanInstance = instance.clone();
            let mut views = HashMap::new();
            views.insert(TypeId::of::<T>(), view_of(instance));
            for binding in assemble_capabilities.iter() {
                if let Some(view) = (binding.direct)(&erased) {
                    views.insert(binding.capability.id, view);
                }
            }
            Ok(Bean::new(TypeInfo::of::<T>(), erased, views))
        });

        let weave: WeaveFn = Arc::new(move |value: ErasedValue, advice: Arc<Advice>| {
            let target = downcast_value::<T>(value)?;
            let raw_target: BeanInstance = target.clone();
            let proxy = Arc::new(AspectProxy::new(target.clone(), advice));
            let erased: BeanInstance = proxy.clone();
            let mut views = HashMap::new();
            // 具体类型视图指向代理内部的目标，调用不经过切面
            views.insert(TypeId::of::<T>(), view_of(target));
            views.insert(TypeId::of::<AspectProxy<T>>(), view_of(proxy));
            for binding in capabilities.iter() {
                let view = match &binding.proxied {
                    Some(proxied) => proxied(&erased),
                    None => {
                        warn!(
                            "能力 {} 没有代理转发实现，{} 的该能力调用不会被拦截",
                            binding.capability.type_name,
                            std::any::type_name::<T>()
                        );
                        (binding.direct)(&raw_target)
                    }
                };
                if let Some(view) = view {
                    views.insert(binding.capability.id, view);
                }
            }
            Ok(Bean::new(TypeInfo::of::<T>(), erased, views).into_proxy())
        });

        TypeDescriptor {
            type_info: TypeInfo::of::<T>(),
            marker: self.marker,
            capabilities: self.capabilities,
            attributes: self.attributes,
            methods: self.methods,
            constructor: self.constructor,
            assemble,
            weave,
        }
    }
}

impl<T> Default for ComponentType<T>
where
    T: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

fn downcast_value<T: Send + Sync + 'static>(value: ErasedValue) -> Result<Arc<T>, DependencyError> {
    value
        .downcast::<T>()
        .map(Arc::from)
        .map_err(|_| DependencyError::TypeMismatch {
            expected: std::any::type_name::<T>().to_string(),
        })
}

fn erase_view<S, C, F>(cast: F) -> ViewFn
where
    S: Send + Sync + 'static,
    C: ?Sized + Send + Sync + 'static,
    F: Fn(Arc<S>) -> Arc<C> + Send + Sync + 'static,
{
    Arc::new(move |instance: &BeanInstance| {
        instance
            .clone()
            .downcast::<S>()
            .ok()
            .map(|source| view_of(cast(source)))
    })
}
