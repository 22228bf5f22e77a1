//! 宏工具函数

use syn::{Attribute, GenericArgument, LitStr, PathArguments, Result, Type};

/// 检查属性列表中是否有指定名称的属性
pub fn has_attribute(attrs: &[Attribute], name: &str) -> bool {
    attrs.iter().any(|attr| attr.path().is_ident(name))
}

/// 读取 `#[name("...")]` 形式属性中的字符串参数
pub fn string_argument(attr: &Attribute) -> Result<String> {
    attr.parse_args::<LitStr>().map(|lit| lit.value())
}

/// 从类型中提取第一个泛型参数
pub fn extract_generic_type(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}

/// 检查类型路径的最后一段是否为指定名称
pub fn is_type_named(ty: &Type, name: &str) -> bool {
    match ty {
        Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .map(|segment| segment.ident == name)
            .unwrap_or(false),
        _ => false,
    }
}

/// 从 `Option<Arc<T>>` 中取出 `T`
pub fn autowired_target(ty: &Type) -> Option<&Type> {
    if !is_type_named(ty, "Option") {
        return None;
    }
    let arc = extract_generic_type(ty)?;
    if !is_type_named(arc, "Arc") {
        return None;
    }
    extract_generic_type(arc)
}
