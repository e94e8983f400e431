//! Elm naming rules
//!
//! Protobuf allows types to nest; Elm does not. Nested definitions are
//! flattened into top level names by joining the chain of enclosing names
//! (the "preface", innermost first) with `_`.

use heck::{ToLowerCamelCase, ToSnakeCase, ToUpperCamelCase};

/// Words that cannot be used as Elm identifiers
const RESERVED_KEYWORDS: &[&str] = &[
    "module", "exposing", "import", "type", "let", "in", "if", "then", "else", "where", "case",
    "of", "port", "as",
];

/// Uppercase the first character, leaving the rest untouched
pub fn first_upper(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Lowercase the first character, leaving the rest untouched
pub fn first_lower(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Join `_`-separated words, capitalising each word's first letter
///
/// Unlike heck's conversions, letters inside a word keep their case so
/// `HTTPHeader` stays `HTTPHeader`. Type definitions and type references must
/// agree exactly, and both go through here.
pub fn camel_case(s: &str) -> String {
    s.split('_')
        .filter(|part| !part.is_empty())
        .map(first_upper)
        .collect()
}

/// Top level Elm type name for a possibly nested protobuf definition
///
/// `nested_type("Inner", ["Middle", "Outer"])` is `Outer_Middle_Inner`.
pub fn nested_type<S: AsRef<str>>(name: &str, preface: &[S]) -> String {
    let mut full_name = camel_case(name);
    for p in preface {
        full_name = format!("{}_{}", camel_case(p.as_ref()), full_name);
    }
    first_upper(&full_name)
}

/// Elm variant name for an enum value or oneof member
///
/// The local name is lowercased before camel casing, so `STATUS_ACTIVE`
/// becomes `StatusActive`.
pub fn nested_variant_name<S: AsRef<str>>(name: &str, preface: &[S]) -> String {
    let mut full_name = camel_case(&name.to_lowercase());
    for p in preface {
        full_name = format!("{}_{}", camel_case(p.as_ref()), full_name);
    }
    full_name
}

/// Elm type name for a fully qualified protobuf type reference
///
/// Package segments (lowercase by convention) are dropped and the remaining
/// message segments are flattened like [`nested_type`]:
/// `.shop.v1.Order.Line` becomes `Order_Line`.
pub fn external_type(type_name: &str) -> String {
    type_name
        .split('.')
        .filter(|s| !s.is_empty())
        .filter(|s| !s.starts_with(|c: char| c.is_lowercase()))
        .map(|s| first_upper(&camel_case(s)))
        .collect::<Vec<_>>()
        .join("_")
}

/// Last segment of a fully qualified protobuf name
pub fn local_name(type_name: &str) -> &str {
    type_name.rsplit('.').next().unwrap_or(type_name)
}

/// Decoder function name for an Elm type
pub fn decoder_name(ty: &str) -> String {
    first_lower(&format!("{}Decoder", ty))
}

/// Encoder function name for an Elm type
pub fn encoder_name(ty: &str) -> String {
    first_lower(&format!("{}Encoder", ty))
}

/// Name of the constant holding an enum's default variant
pub fn enum_default_name(ty: &str) -> String {
    first_lower(&format!("{}Default", ty))
}

/// Name of an enum's variant-to-string function
pub fn to_string_name(ty: &str) -> String {
    first_lower(&format!("{}ToString", ty))
}

/// Name of an enum's string-to-variant function
pub fn from_string_name(ty: &str) -> String {
    first_lower(&format!("{}FromString", ty))
}

/// Name of the list of all variants of an enum
pub fn all_name(ty: &str) -> String {
    first_lower(&format!("{}All", ty))
}

/// Name of the string lookup table of an enum
pub fn dict_name(ty: &str) -> String {
    first_lower(&format!("{}Dict", ty))
}

fn escape_reserved(name: String) -> String {
    if RESERVED_KEYWORDS.contains(&name.as_str()) {
        format!("{}_", name)
    } else {
        name
    }
}

/// Elm record field name: lower camel case, reserved words suffixed with `_`
pub fn field_name(name: &str) -> String {
    escape_reserved(name.to_lower_camel_case())
}

/// Canonical name of an identifier wrapper type, e.g. `order_line` -> `OrderLine`
pub fn identifier_type_name(name: &str) -> String {
    name.to_upper_camel_case()
}

/// JSON key used by protobuf's canonical JSON mapping
pub fn json_name(name: &str) -> String {
    name.to_lower_camel_case()
}

/// Snake case segment used in RPC paths
pub fn path_segment(name: &str) -> String {
    name.to_snake_case()
}

/// Elm request function for an RPC: `OrderService` + `GetOrder` -> `orderServiceGetOrder`
pub fn rpc_function_name(service: &str, method: &str) -> String {
    format!(
        "{}{}",
        service.to_lower_camel_case(),
        method.to_upper_camel_case()
    )
}

/// HTTP path of an RPC: `OrderService` + `GetOrder` -> `/order_service/get_order`
pub fn rpc_path(service: &str, method: &str) -> String {
    format!("/{}/{}", path_segment(service), path_segment(method))
}

/// Elm package path for a `.proto` file: `shop/v1/order.proto` -> `Shop/V1/Order`
pub fn package_path(file_path: &str) -> String {
    let trimmed = file_path.strip_suffix(".proto").unwrap_or(file_path);
    trimmed
        .split('/')
        .filter(|s| !s.is_empty())
        .map(first_upper)
        .collect::<Vec<_>>()
        .join("/")
}

/// Elm module name for a package path: `Shop/V1/Order` -> `Shop.V1.Order`
pub fn module_name(package: &str) -> String {
    package
        .split('/')
        .filter(|s| !s.is_empty())
        .map(first_upper)
        .collect::<Vec<_>>()
        .join(".")
}

/// Output file name for a package path: `Shop/V1/Order` -> `Shop/V1/Order.elm`
pub fn output_file_name(package: &str) -> String {
    format!("{}.elm", package)
}
