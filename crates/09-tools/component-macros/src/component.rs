//! `#[derive(Component)]` 实现

use crate::utils::{autowired_target, has_attribute};
use proc_macro::TokenStream;
use quote::quote;
use syn::{
    punctuated::Punctuated, spanned::Spanned, Attribute, Data, DeriveInput, Error, Fields, Ident,
    Result, Token, Type,
};

/// 组件标记
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Component,
    Controller,
    Aspect,
}

impl Marker {
    fn from_ident(ident: &Ident) -> Option<Self> {
        if ident == "component" {
            Some(Self::Component)
        } else if ident == "controller" {
            Some(Self::Controller)
        } else if ident == "aspect" {
            Some(Self::Aspect)
        } else {
            None
        }
    }
}

/// 从结构体属性中解析出的组件参数
#[derive(Default)]
pub struct ComponentArgs {
    /// 组件标记，未标记的类型只会被扫描，不会实例化
    pub marker: Option<Marker>,
    /// 提供的能力
    pub provides: Vec<Type>,
    /// 提供且由代理转发的能力
    pub proxied: Vec<Type>,
}

impl ComponentArgs {
    /// 解析结构体上的 `#[component]`/`#[controller]`/`#[aspect]`、`#[provides(..)]`、`#[proxy(..)]`
    pub fn from_attributes(attrs: &[Attribute]) -> Result<Self> {
        let mut args = Self::default();

        for attr in attrs {
            let Some(ident) = attr.path().get_ident() else {
                continue;
            };

            if let Some(marker) = Marker::from_ident(ident) {
                attr.meta.require_path_only()?;
                if args.marker.is_some() {
                    return Err(Error::new(attr.span(), "一个类型只能有一个组件标记"));
                }
                args.marker = Some(marker);
            } else if ident == "provides" {
                args.provides.extend(parse_types(attr)?);
            } else if ident == "proxy" {
                args.proxied.extend(parse_types(attr)?);
            }
        }

        Ok(args)
    }
}

fn parse_types(attr: &Attribute) -> Result<Vec<Type>> {
    let types = attr.parse_args_with(Punctuated::<Type, Token![,]>::parse_terminated)?;
    if types.is_empty() {
        return Err(Error::new(attr.span(), "至少需要声明一个能力类型"));
    }
    Ok(types.into_iter().collect())
}

/// 需要注入的字段
struct AutowiredField<'a> {
    ident: &'a Ident,
    target: &'a Type,
}

fn autowired_fields(input: &DeriveInput) -> Result<Vec<AutowiredField<'_>>> {
    let Data::Struct(data) = &input.data else {
        return Err(Error::new(input.ident.span(), "Component 只能用于结构体"));
    };

    let mut fields = Vec::new();
    if let Fields::Named(named) = &data.fields {
        for field in &named.named {
            if !has_attribute(&field.attrs, "autowired") {
                continue;
            }
            let Some(ident) = field.ident.as_ref() else {
                continue;
            };
            let target = autowired_target(&field.ty).ok_or_else(|| {
                Error::new(field.ty.span(), "#[autowired] 字段的类型必须是 Option<Arc<T>>")
            })?;
            fields.push(AutowiredField { ident, target });
        }
    } else if data.fields.iter().any(|field| has_attribute(&field.attrs, "autowired")) {
        return Err(Error::new(input.ident.span(), "#[autowired] 只能用于具名字段"));
    }

    Ok(fields)
}

/// 实现 #[derive(Component)] 宏
pub fn derive_component_impl(input: DeriveInput) -> TokenStream {
    match expand(&input) {
        Ok(tokens) => TokenStream::from(tokens),
        Err(e) => e.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> Result<proc_macro2::TokenStream> {
    if !input.generics.params.is_empty() {
        return Err(Error::new(input.generics.span(), "Component 不支持泛型类型"));
    }

    let struct_name = &input.ident;
    let args = ComponentArgs::from_attributes(&input.attrs)?;
    let fields = autowired_fields(input)?;

    let constructor = match args.marker {
        Some(Marker::Component) => quote! { component() },
        Some(Marker::Controller) => quote! { controller() },
        Some(Marker::Aspect) => quote! { aspect() },
        None => quote! { new() },
    };

    let provides = args.provides.iter().map(|capability| {
        quote! {
            .provides(|bean: ::std::sync::Arc<Self>| -> ::std::sync::Arc<#capability> { bean })
        }
    });

    let proxied = args.proxied.iter().map(|capability| {
        quote! {
            .proxied(
                |bean: ::std::sync::Arc<Self>| -> ::std::sync::Arc<#capability> { bean },
                |proxy: ::std::sync::Arc<::di_abstractions::AspectProxy<Self>>| -> ::std::sync::Arc<#capability> { proxy },
            )
        }
    });

    let autowired = fields.iter().map(|field| {
        let ident = field.ident;
        let target = field.target;
        let name = ident.to_string();
        quote! {
            .autowired(#name, |this: &mut Self, value: ::std::option::Option<::std::sync::Arc<#target>>| {
                this.#ident = value;
            })
        }
    });

    let methods = if args.marker == Some(Marker::Aspect) {
        quote! { .methods(<Self as ::di_abstractions::AspectMethods>::aspect_methods()) }
    } else {
        quote! {}
    };

    Ok(quote! {
        impl ::di_abstractions::Describe for #struct_name {
            fn descriptor() -> ::di_abstractions::TypeDescriptor {
                ::di_abstractions::ComponentType::<Self>::#constructor
                    .with_default()
                    #(#provides)*
                    #(#proxied)*
                    #(#autowired)*
                    #methods
                    .build()
            }
        }
    })
}
