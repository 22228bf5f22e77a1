//! # Component Macros
//!
//! 声明式组件标记的过程宏，生成 `di_abstractions` 的类型描述符。
//!
//! ## 核心宏
//!
//! - [`Component`](derive@Component) - 为结构体生成 `Describe` 实现
//! - [`advice`](macro@advice) - 为切面的 impl 块生成 `AspectMethods` 实现
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use component_macros::{advice, Component};
//! use std::sync::Arc;
//!
//! #[derive(Default, Component)]
//! #[component]
//! #[proxy(dyn Performer)]
//! pub struct Rapper;
//!
//! #[derive(Default, Component)]
//! #[controller]
//! pub struct Stage {
//!     #[autowired]
//!     performer: Option<Arc<dyn Performer>>,
//! }
//!
//! #[derive(Default, Component)]
//! #[aspect]
//! pub struct Fans;
//!
//! #[advice]
//! impl Fans {
//!     #[pointcut("demo::Rapper::rap()")]
//!     fn rap_point(&self) {}
//!
//!     #[before("rap_point()")]
//!     fn say_yo(&self) {
//!         println!("yo");
//!     }
//! }
//! ```

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod advice;
mod component;
mod utils;

/// 组件派生宏
///
/// 类型必须实现 `Default`，它被用作默认构造函数。
///
/// # 结构体属性
///
/// - `#[component]` / `#[controller]` / `#[aspect]` - 组件标记，最多一个
/// - `#[provides(dyn Trait, ...)]` - 提供的能力
/// - `#[proxy(dyn Trait, ...)]` - 提供的能力，织入切面后由代理转发，
///   需要用 `forward_capability!` 为 `AspectProxy<Self>` 实现该能力
///
/// # 字段属性
///
/// - `#[autowired]` - 需要注入的依赖，字段类型必须是 `Option<Arc<T>>`
///
/// `#[aspect]` 类型还需要一个带 `#[advice]` 的 impl 块。
#[proc_macro_derive(Component, attributes(component, controller, aspect, provides, proxy, autowired))]
pub fn derive_component(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    component::derive_component_impl(input)
}

/// 切面方法宏
///
/// 用在切面类型的固有 impl 块上，识别以下方法属性：
///
/// - `#[pointcut("path::Type::method()")]` - 切点
/// - `#[before("pointcut_method()")]` - 前置通知
/// - `#[after("pointcut_method()")]` - 后置通知
///
/// 带标记的方法签名必须是 `fn name(&self)`。
#[proc_macro_attribute]
pub fn advice(args: TokenStream, input: TokenStream) -> TokenStream {
    advice::advice_impl(args, input)
}
