//! Bean 句柄
//!
//! 注册表里保存的是类型擦除后的实例，外加一张按类型索引的视图表：
//! 具体类型 `Arc<T>` 以及它所提供的每个能力 `Arc<dyn Capability>`。

use crate::metadata::TypeInfo;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// 类型擦除后的实例
pub type BeanInstance = Arc<dyn Any + Send + Sync>;

/// 一个类型视图，内部存放的是 `Arc<K>`
pub type BeanView = Arc<dyn Any + Send + Sync>;

/// 已注册的 bean
#[derive(Clone)]
pub struct Bean {
    type_info: TypeInfo,
    instance: BeanInstance,
    views: Arc<HashMap<TypeId, BeanView>>,
    proxy: bool,
}

impl Bean {
    /// 由实例和视图表构造 bean
    pub fn new(type_info: TypeInfo, instance: BeanInstance, views: HashMap<TypeId, BeanView>) -> Self {
        Self {
            type_info,
            instance,
            views: Arc::new(views),
            proxy: false,
        }
    }

    /// 标记为代理 bean
    pub fn into_proxy(mut self) -> Self {
        self.proxy = true;
        self
    }

    /// 注册键对应的类型
    pub fn type_info(&self) -> TypeInfo {
        self.type_info
    }

    /// 是否为切面代理
    pub fn is_proxy(&self) -> bool {
        self.proxy
    }

    /// 类型擦除后的实例
    pub fn instance(&self) -> &BeanInstance {
        &self.instance
    }

    /// 以 `K` 类型获取该 bean，`K` 可以是具体类型也可以是 `dyn Trait`
    pub fn view<K>(&self) -> Option<Arc<K>>
    where
        K: ?Sized + Send + Sync + 'static,
    {
        self.views
            .get(&TypeId::of::<K>())
            .and_then(|view| view.downcast_ref::<Arc<K>>())
            .cloned()
    }

    /// 是否提供 `type_id` 对应的视图
    pub fn provides(&self, type_id: TypeId) -> bool {
        self.views.contains_key(&type_id)
    }

    /// 是否指向同一个实例
    pub fn same_instance(&self, other: &Bean) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.instance) as *const (),
            Arc::as_ptr(&other.instance) as *const (),
        )
    }
}

impl fmt::Debug for Bean {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bean")
            .field("type", &self.type_info.type_name)
            .field("proxy", &self.proxy)
            .field("views", &self.views.len())
            .finish()
    }
}

/// 为 `Arc<K>` 创建视图
pub fn view_of<K>(value: Arc<K>) -> BeanView
where
    K: ?Sized + Send + Sync + 'static,
{
    Arc::new(value)
}
