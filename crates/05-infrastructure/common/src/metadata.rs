//! 元数据定义
//!
//! 提供类型标识以及组件、方法上的标记（marker）信息

use serde::Serialize;
use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// 类型信息
///
/// 同时适用于具体类型和能力类型（如 `dyn Greeter`）
#[derive(Debug, Clone, Copy)]
pub struct TypeInfo {
    /// 类型ID
    pub id: TypeId,
    /// 完整类型名称，例如 `demo::service::Rapper`
    pub type_name: &'static str,
}

impl TypeInfo {
    /// 从类型获取类型信息
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// 获取简短的类型名称（不包含模块路径）
    pub fn short_name(&self) -> &'static str {
        let name = self.type_name.trim_start_matches("dyn ");
        let base = name.split('<').next().unwrap_or(name);
        base.rsplit("::").next().unwrap_or(base)
    }

    /// 模块路径，即类型名中最后一个 `::` 之前的部分
    pub fn module_path(&self) -> &'static str {
        let name = self.type_name.trim_start_matches("dyn ");
        let base_len = name.find('<').unwrap_or(name.len());
        match name[..base_len].rfind("::") {
            Some(pos) => &name[..pos],
            None => "",
        }
    }

    /// 检查给定路径是否指向该类型
    ///
    /// 接受完整路径或以 `::` 分段对齐的路径后缀，`.` 视同 `::`
    pub fn matches_path(&self, path: &str) -> bool {
        let path = normalize_path(path);
        if path.is_empty() {
            return false;
        }
        let full = self.type_name;
        full == path
            || (full.len() > path.len()
                && full.ends_with(path.as_str())
                && full[..full.len() - path.len()].ends_with("::"))
    }
}

/// 把 `a.b.C` 形式的路径统一为 `a::b::C`
pub fn normalize_path(path: &str) -> String {
    path.trim().replace('.', "::")
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl Hash for TypeInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name)
    }
}

impl Serialize for TypeInfo {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.type_name)
    }
}

/// 组件标记
///
/// `Component` 与 `Controller` 对容器而言完全等价
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentMarker {
    /// 普通组件
    Component,
    /// 请求处理组件
    Controller,
    /// 切面，只提供横切逻辑，本身不注册为 bean
    Aspect,
}

impl ComponentMarker {
    /// 是否需要实例化并注册为 bean
    pub fn is_bean(&self) -> bool {
        matches!(self, Self::Component | Self::Controller)
    }
}

/// 方法标记
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodMarker {
    /// 切点，值为 `owner::Type::method(...)`
    Pointcut(String),
    /// 前置通知，值为 `pointcut_name(...)`
    Before(String),
    /// 后置通知，值为 `pointcut_name(...)`
    After(String),
}

impl MethodMarker {
    /// 标记上声明的表达式
    pub fn expression(&self) -> &str {
        match self {
            Self::Pointcut(value) | Self::Before(value) | Self::After(value) => value,
        }
    }
}

/// 截掉参数列表，`rap_point()` -> `rap_point`
pub fn strip_arguments(expression: &str) -> &str {
    let expression = expression.trim();
    match expression.find('(') {
        Some(pos) => expression[..pos].trim_end(),
        None => expression,
    }
}
