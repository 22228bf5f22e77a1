//! # Infrastructure Common
//!
//! 容器各层共享的基础类型。
//!
//! ## 核心类型
//!
//! - [`Bean`] - 注册表中的 bean 句柄，支持按具体类型或能力类型取视图
//! - [`TypeInfo`] - 类型标识
//! - [`ComponentMarker`] / [`MethodMarker`] - 声明式标记
//! - [`DependencyError`] 等错误类型
//!
//! ## 设计原则
//!
//! - 标记是附着在类型描述上的结构化元数据，只在加载阶段读取一次
//! - 所有实例都通过 `Arc` 共享，可跨线程读取

pub mod component;
pub mod errors;
pub mod metadata;

pub use component::*;
pub use errors::*;
pub use metadata::*;
