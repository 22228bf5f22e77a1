//! 切面代理
//!
//! `AspectProxy<T>` 持有真实目标和通知，能力方法通过 [`AspectProxy::intercept`]
//! 显式转发。转发实现用 [`forward_capability!`](crate::forward_capability) 生成。

use infrastructure_common::TypeInfo;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// 通知函数，已绑定切面实例
pub type AdviceFn = Arc<dyn Fn() + Send + Sync>;

/// 作用在单个方法上的前置/后置通知
#[derive(Clone)]
pub struct Advice {
    aspect: TypeInfo,
    method: String,
    before: Option<AdviceFn>,
    after: Option<AdviceFn>,
}

impl Advice {
    /// 创建通知
    pub fn new(aspect: TypeInfo, method: impl Into<String>) -> Self {
        Self {
            aspect,
            method: method.into(),
            before: None,
            after: None,
        }
    }

    /// 设置前置通知
    pub fn with_before(mut self, before: Option<AdviceFn>) -> Self {
        self.before = before;
        self
    }

    /// 设置后置通知
    pub fn with_after(mut self, after: Option<AdviceFn>) -> Self {
        self.after = after;
        self
    }

    /// 定义通知的切面
    pub fn aspect(&self) -> TypeInfo {
        self.aspect
    }

    /// 被拦截的方法名
    pub fn method(&self) -> &str {
        &self.method
    }

    /// 是否有前置通知
    pub fn has_before(&self) -> bool {
        self.before.is_some()
    }

    /// 是否有后置通知
    pub fn has_after(&self) -> bool {
        self.after.is_some()
    }

    /// 是否拦截该方法
    pub fn applies_to(&self, method: &str) -> bool {
        self.method == method
    }

    fn run_before(&self) {
        if let Some(before) = &self.before {
            before();
        }
    }

    fn run_after(&self) {
        if let Some(after) = &self.after {
            after();
        }
    }
}

impl fmt::Debug for Advice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Advice")
            .field("aspect", &self.aspect.type_name)
            .field("method", &self.method)
            .field("before", &self.before.is_some())
            .field("after", &self.after.is_some())
            .finish()
    }
}

/// 切面代理
pub struct AspectProxy<T> {
    target: Arc<T>,
    advice: Arc<Advice>,
}

impl<T> AspectProxy<T> {
    /// 创建代理
    pub fn new(target: Arc<T>, advice: Arc<Advice>) -> Self {
        Self { target, advice }
    }

    /// 真实目标
    pub fn target(&self) -> &Arc<T> {
        &self.target
    }

    /// 通知
    pub fn advice(&self) -> &Advice {
        &self.advice
    }

    /// 调用目标方法
    ///
    /// 方法名命中时依次执行前置通知、真实方法、后置通知，返回真实方法的结果；
    /// 否则直接调用目标。
    pub fn intercept<'a, R>(&'a self, method: &str, call: impl FnOnce(&'a T) -> R) -> R {
        if !self.advice.applies_to(method) {
            return call(&*self.target);
        }

        trace!(
            "拦截 {}::{}，切面 {}",
            std::any::type_name::<T>(),
            method,
            self.advice.aspect.type_name
        );
        self.advice.run_before();
        let result = call(&*self.target);
        self.advice.run_after();
        result
    }
}

impl<T: fmt::Debug> fmt::Debug for AspectProxy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AspectProxy")
            .field("target", &self.target)
            .field("advice", &self.advice)
            .finish()
    }
}

/// 为 `AspectProxy<Target>` 生成能力转发实现
///
/// 每个方法都经过 [`AspectProxy::intercept`]，只有通知指定的方法会执行通知。
///
/// ```rust
/// use di_abstractions::forward_capability;
///
/// pub trait Singer: Send + Sync {
///     fn sing(&self, song: &str) -> String;
///     fn name(&self) -> &str;
/// }
///
/// pub struct Rapper;
///
/// impl Singer for Rapper {
///     fn sing(&self, song: &str) -> String {
///         format!("yo {song}")
///     }
///
///     fn name(&self) -> &str {
///         "rapper"
///     }
/// }
///
/// forward_capability! {
///     impl Singer for Rapper {
///         fn sing(&self, song: &str) -> String;
///         fn name(&self) -> &str;
///     }
/// }
/// ```
#[macro_export]
macro_rules! forward_capability {
    (impl $capability:ident for $target:ty {
        $( fn $method:ident(&self $(, $arg:ident : $arg_ty:ty)*) $(-> $ret:ty)?; )*
    }) => {
        impl $capability for $crate::AspectProxy<$target> {
            $(
                fn $method(&self $(, $arg: $arg_ty)*) $(-> $ret)? {
                    self.intercept(stringify!($method), move |target| {
                        <$target as $capability>::$method(target $(, $arg)*)
                    })
                }
            )*
        }
    };
}
