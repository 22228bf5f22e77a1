//! 组件注册表抽象接口

use infrastructure_common::{Bean, TypeInfo};
use std::any::TypeId;
use std::sync::Arc;

/// 组件注册表 trait
///
/// 类型到单例 bean 的映射，必须支持并发读写
pub trait ComponentRegistry: Send + Sync {
    /// 注册 bean，无条件覆盖同一类型下的旧值并返回旧值
    fn register(&self, type_info: TypeInfo, bean: Bean) -> Option<Bean>;

    /// 按类型查找 bean
    fn lookup(&self, type_id: TypeId) -> Option<Bean>;

    /// 检查类型是否已注册
    fn contains(&self, type_id: TypeId) -> bool {
        self.lookup(type_id).is_some()
    }

    /// 已注册的类型
    fn registered_types(&self) -> Vec<TypeInfo>;

    /// 已注册 bean 数量
    fn len(&self) -> usize;

    /// 是否为空
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 类型化查找
pub trait BeanLookup {
    /// 按 `K` 自身的类型键查找，并以 `K` 视图返回
    fn get_bean<K>(&self) -> Option<Arc<K>>
    where
        K: ?Sized + Send + Sync + 'static;
}

impl<R> BeanLookup for R
where
    R: ComponentRegistry + ?Sized,
{
    fn get_bean<K>(&self) -> Option<Arc<K>>
    where
        K: ?Sized + Send + Sync + 'static,
    {
        self.lookup(TypeId::of::<K>())
            .and_then(|bean| bean.view::<K>())
    }
}
