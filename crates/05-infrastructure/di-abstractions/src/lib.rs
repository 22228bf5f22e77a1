//! # Dependency Injection Abstractions
//!
//! 依赖注入抽象层，定义类型描述、组件注册和类型发现的核心接口。
//!
//! ## 核心接口
//!
//! - [`TypeDescriptor`] / [`ComponentType`] - 类型描述符及其构建器
//! - [`ComponentRegistry`] - 组件注册表接口
//! - [`TypeScanner`] - 类型扫描器接口
//! - [`AspectProxy`] - 切面代理
//! - [`ContainerConfig`] - 容器配置

pub mod container;
pub mod descriptor;
pub mod proxy;
pub mod registry;
pub mod scanner;

pub use container::*;
pub use descriptor::*;
pub use proxy::*;
pub use registry::*;
pub use scanner::*;
