//! # 依赖注入具体实现
//!
//! 提供组件注册表、依赖注入器、切面织入和初始化流程的具体实现。
//!
//! ## 初始化流程
//!
//! [`BeanFactory::init_beans`] 依次执行：
//!
//! 1. 发现：区分切面和普通类型，构建能力索引
//! 2. 创建普通 bean 并注入依赖
//! 3. 解析切面，为目标类型织入代理
//! 4. 按依赖关系重新注入引用已过期的 bean
//!
//! 成功后返回 [`BeanContext`]，失败时不发布任何 bean。

pub mod aspect;
pub mod capability;
pub mod factory;
pub mod graph;
pub mod injector;
pub mod registry;
pub mod report;
pub mod weaver;

pub use aspect::{parse_pointcut, AdviceBundle, AspectResolution, AspectResolver, PointcutExpression};
pub use capability::CapabilityIndex;
pub use factory::{BeanContext, BeanFactory};
pub use graph::{describe_cycle, DependencyGraph, GraphAnalysis};
pub use injector::{CapturedAttribute, CreatedBean, DependencyInjector};
pub use registry::BeanRegistry;
pub use report::{InitReport, SkippedAspect, UnresolvedAttribute, WovenTarget};
pub use weaver::ProxyWeaver;
