//! `#[advice]` 实现
//!
//! 收集切面 impl 块中带 `#[pointcut]`、`#[before]`、`#[after]` 的方法，
//! 生成 `AspectMethods` 实现，并从输出中去掉这些标记。

use crate::utils::string_argument;
use proc_macro::TokenStream;
use quote::quote;
use syn::{
    parse_macro_input, spanned::Spanned, Error, FnArg, ImplItem, ImplItemFn, ItemImpl, Result,
};

/// 方法标记种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AdviceKind {
    Pointcut,
    Before,
    After,
}

impl AdviceKind {
    const ALL: [(&'static str, AdviceKind); 3] = [
        ("pointcut", AdviceKind::Pointcut),
        ("before", AdviceKind::Before),
        ("after", AdviceKind::After),
    ];
}

/// 一个带标记的方法
struct MarkedMethod {
    kind: AdviceKind,
    name: syn::Ident,
    expression: String,
}

/// 实现 #[advice] 宏
pub fn advice_impl(args: TokenStream, input: TokenStream) -> TokenStream {
    if !args.is_empty() {
        let args = proc_macro2::TokenStream::from(args);
        return Error::new(args.span(), "#[advice] 不接受参数")
            .to_compile_error()
            .into();
    }

    let mut item = parse_macro_input!(input as ItemImpl);
    match expand(&mut item) {
        Ok(tokens) => TokenStream::from(tokens),
        Err(e) => e.to_compile_error().into(),
    }
}

fn expand(item: &mut ItemImpl) -> Result<proc_macro2::TokenStream> {
    if item.trait_.is_some() {
        return Err(Error::new(item.span(), "#[advice] 只能用于固有 impl 块"));
    }

    let mut marked = Vec::new();
    for impl_item in item.items.iter_mut() {
        if let ImplItem::Fn(method) = impl_item {
            marked.extend(take_markers(method)?);
        }
    }

    let self_ty = &item.self_ty;
    let (impl_generics, _, where_clause) = item.generics.split_for_impl();
    let descriptors = marked.iter().map(|method| {
        let name = &method.name;
        let name_str = name.to_string();
        let expression = &method.expression;
        match method.kind {
            AdviceKind::Pointcut => quote! {
                ::di_abstractions::MethodDescriptor::pointcut(#name_str, #expression)
            },
            AdviceKind::Before => quote! {
                ::di_abstractions::MethodDescriptor::before(#name_str, #expression, |aspect: &#self_ty| {
                    let _ = aspect.#name();
                })
            },
            AdviceKind::After => quote! {
                ::di_abstractions::MethodDescriptor::after(#name_str, #expression, |aspect: &#self_ty| {
                    let _ = aspect.#name();
                })
            },
        }
    });

    Ok(quote! {
        #item

        impl #impl_generics ::di_abstractions::AspectMethods for #self_ty #where_clause {
            fn aspect_methods() -> ::std::vec::Vec<::di_abstractions::MethodDescriptor> {
                ::std::vec![#(#descriptors),*]
            }
        }
    })
}

/// 取出方法上的标记并从方法属性中移除
fn take_markers(method: &mut ImplItemFn) -> Result<Vec<MarkedMethod>> {
    let mut found = Vec::new();
    let mut kept = Vec::with_capacity(method.attrs.len());

    for attr in method.attrs.drain(..) {
        let kind = AdviceKind::ALL
            .iter()
            .find(|(name, _)| attr.path().is_ident(name))
            .map(|(_, kind)| *kind);
        match kind {
            Some(kind) => found.push(MarkedMethod {
                kind,
                name: method.sig.ident.clone(),
                expression: string_argument(&attr)?,
            }),
            None => kept.push(attr),
        }
    }
    method.attrs = kept;

    if found.is_empty() {
        return Ok(found);
    }

    check_signature(method)?;
    if found.iter().any(|marked| marked.kind == AdviceKind::Pointcut) {
        // 切点方法只承载标记，不会被调用
        method.attrs.push(syn::parse_quote!(#[allow(dead_code)]));
    }
    Ok(found)
}

/// 通知方法只能接收 `&self`
fn check_signature(method: &ImplItemFn) -> Result<()> {
    let mut inputs = method.sig.inputs.iter();
    let receiver_ok = matches!(
        inputs.next(),
        Some(FnArg::Receiver(receiver)) if receiver.reference.is_some() && receiver.mutability.is_none()
    );
    if !receiver_ok || inputs.next().is_some() || method.sig.asyncness.is_some() {
        return Err(Error::new(
            method.sig.span(),
            "切点和通知方法的签名必须是 fn name(&self)",
        ));
    }
    Ok(())
}
