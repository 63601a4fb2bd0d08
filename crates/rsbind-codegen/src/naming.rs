//! Naming convention utilities for code generation.
//!
//! Native names arrive in `snake_case`; host-facing methods and parameters
//! are rendered in `camelCase`, while native entry points keep the native
//! spelling.
//!
//! | Input | Function | Output |
//! |-------|----------|--------|
//! | `snake_case` | [`to_camel_case`] | `camelCase` |
//! | `snake_case` | [`to_pascal_case`] | `PascalCase` |
//! | `word` | [`capitalize`] | `Word` |
//! | `Word` | [`decapitalize`] | `word` |

/// Convert snake_case to camelCase.
///
/// # Examples
///
/// ```
/// use rsbind_codegen::naming::to_camel_case;
///
/// assert_eq!(to_camel_case("test_u8_1"), "testU81");
/// assert_eq!(to_camel_case("test_arg_callback_16"), "testArgCallback16");
/// assert_eq!(to_camel_case("already"), "already");
/// ```
pub fn to_camel_case(s: &str) -> String {
    let mut result = String::new();
    let mut capitalize_next = false;

    for c in s.chars() {
        if c == '_' {
            capitalize_next = !result.is_empty();
        } else if capitalize_next {
            result.extend(c.to_uppercase());
            capitalize_next = false;
        } else {
            result.push(c);
        }
    }

    result
}

/// Convert a string to PascalCase.
///
/// Handles snake_case, kebab-case, and already-capitalized input.
///
/// # Examples
///
/// ```
/// use rsbind_codegen::naming::to_pascal_case;
///
/// assert_eq!(to_pascal_case("demo_callback"), "DemoCallback");
/// assert_eq!(to_pascal_case("demo-lib"), "DemoLib");
/// ```
pub fn to_pascal_case(s: &str) -> String {
    s.split(['-', '_']).map(capitalize).collect()
}

/// Capitalize the first letter of a string.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// Lowercase the first letter of a string.
///
/// ```
/// use rsbind_codegen::naming::decapitalize;
///
/// assert_eq!(decapitalize("DemoCallback"), "demoCallback");
/// ```
pub fn decapitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().chain(chars).collect(),
    }
}

/// Crate names may contain dashes; C symbols may not.
pub fn to_symbol(s: &str) -> String {
    s.replace(['-', '.'], "_")
}

/// Wrap `name` in backticks when it collides with a reserved word.
pub fn escape_keyword(name: &str, keywords: &[&str]) -> String {
    if keywords.contains(&name) {
        format!("`{name}`")
    } else {
        name.to_string()
    }
}
