//! Symbol naming rules.
//!
//! Every function here is pure and total over well-formed qualified names.
//! Two distinct types whose qualified names differ only in separator
//! characters would collide; the verifier's identifier check makes that
//! impossible for schemas it accepts.

/// Perl class name for a message or enum: namespace separators become the
/// Perl package separator.
pub fn perl_class_name(qualified: &str) -> String {
    qualified.replace('.', "::")
}

/// Containing Perl module name: the class name of the *top-level* ancestor,
/// so every type nested under one top-level message shares its module.
pub fn module_name(package: Option<&str>, qualified: &str) -> String {
    perl_class_name(&top_level_ancestor(package, qualified))
}

/// C++ class name of the underlying generated message, globally qualified.
/// The package maps to nested namespaces; nested message path segments are
/// flattened with `_` the way the C++ generator names them.
pub fn cpp_class_name(package: Option<&str>, qualified: &str) -> String {
    let (namespace, tail) = split_package(package, qualified);
    let mut name = String::from("::");
    if !namespace.is_empty() {
        name.push_str(&namespace.replace('.', "::"));
        name.push_str("::");
    }
    name.push_str(&tail.replace('.', "_"));
    name
}

/// Flattened, collision-free typedef identifier for declaration contexts
/// that cannot spell a namespaced type name.
pub fn internal_alias(package: Option<&str>, qualified: &str) -> String {
    cpp_class_name(package, qualified).replace("::", "__")
}

/// Name of the typemap rule for a message.  Uppercased byte-by-byte over
/// ASCII only; locale must not influence the result, since downstream
/// tooling keys off this name across regenerations.
pub fn typemap_name(qualified: &str) -> String {
    let mut name = format!("T_{}", qualified.replace('.', "_"));
    name.make_ascii_uppercase();
    name
}

/// Identifier-safe form of a schema file's base name, used to name the
/// per-file output stream class.  Path separators and other non-identifier
/// characters become underscores.
pub fn file_identifier(base: &str) -> String {
    base.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Field name as spelled in the generated C++ accessors: lowercased, with
/// a trailing underscore when it would collide with a C++ keyword.
pub fn cpp_field_name(name: &str) -> String {
    let mut result = name.to_ascii_lowercase();
    if CPP_KEYWORDS.contains(&result.as_str()) {
        result.push('_');
    }
    result
}

const CPP_KEYWORDS: [&str; 26] = [
    "and", "bool", "break", "case", "class", "const", "continue", "default", "delete", "do",
    "double", "else", "enum", "float", "for", "friend", "if", "int", "long", "namespace", "new",
    "operator", "return", "switch", "union", "while",
];

fn top_level_ancestor(package: Option<&str>, qualified: &str) -> String {
    match package {
        Some(pkg) if !pkg.is_empty() => {
            let tail = qualified
                .strip_prefix(pkg)
                .and_then(|rest| rest.strip_prefix('.'))
                .unwrap_or(qualified);
            let first = tail.split('.').next().unwrap_or(tail);
            format!("{}.{}", pkg, first)
        }
        _ => qualified.split('.').next().unwrap_or(qualified).to_string(),
    }
}

fn split_package<'a>(package: Option<&str>, qualified: &'a str) -> (String, &'a str) {
    match package {
        Some(pkg) if !pkg.is_empty() => {
            let tail = qualified
                .strip_prefix(pkg)
                .and_then(|rest| rest.strip_prefix('.'))
                .unwrap_or(qualified);
            (pkg.to_string(), tail)
        }
        _ => (String::new(), qualified),
    }
}
