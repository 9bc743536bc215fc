//! Structural verification of a schema closure.  Every check here is
//! fatal: generation never starts on a closure that fails one.

use std::collections::{HashMap, HashSet};

use lazy_static::lazy_static;
use regex::Regex;

use protoxs_descriptor::{EnumSpec, MessageSpec, ScalarKind, SchemaSet};

use crate::error::CodegenError;

lazy_static! {
    static ref QUALIFIED_NAME: Regex =
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*$").unwrap();
}

fn kind_str(kind: ScalarKind) -> &'static str {
    match kind {
        ScalarKind::Int32 => "int32",
        ScalarKind::Uint32 => "uint32",
        ScalarKind::Int64 => "int64",
        ScalarKind::Uint64 => "uint64",
        ScalarKind::Float => "float",
        ScalarKind::Double => "double",
        ScalarKind::Bool => "bool",
        ScalarKind::String => "string",
        ScalarKind::Bytes => "bytes",
        ScalarKind::Enum => "enum",
        ScalarKind::Message => "message",
    }
}

/// Returns `Ok(())` if the closure is generatable, or the first fatal
/// problem found.
pub fn verify_schema_set(set: &SchemaSet) -> Result<(), CodegenError> {
    // 1) File names are unique and every dependency is present in the set.
    let mut file_names: HashSet<&str> = HashSet::new();
    for file in &set.files {
        if !file_names.insert(file.name.as_str()) {
            return Err(CodegenError::DuplicateFile(file.name.clone()));
        }
    }
    for file in &set.files {
        for dependency in &file.dependencies {
            if set.file(dependency).is_none() {
                return Err(CodegenError::MissingDependency {
                    file:       file.name.clone(),
                    dependency: dependency.clone(),
                });
            }
        }
    }

    // 2) The dependency graph is acyclic.
    let mut state: HashMap<&str, u8> = HashMap::new();
    fn check_cycles<'a>(
        name: &'a str,
        set: &'a SchemaSet,
        state: &mut HashMap<&'a str, u8>,
    ) -> Result<(), CodegenError> {
        match state.get(name) {
            Some(1) => return Err(CodegenError::DependencyCycle(name.to_string())),
            Some(2) => return Ok(()),
            _ => {}
        }
        state.insert(name, 1);
        if let Some(file) = set.file(name) {
            for dependency in &file.dependencies {
                check_cycles(dependency, set, state)?;
            }
        }
        state.insert(name, 2);
        Ok(())
    }
    for file in &set.files {
        check_cycles(&file.name, set, &mut state)?;
    }

    // 3) Collect every declared type; names must be well-formed, globally
    //    unique, and nested under their container's qualified name.
    let mut message_names: HashSet<&str> = HashSet::new();
    let mut enum_names: HashSet<&str> = HashSet::new();

    for file in &set.files {
        let prefix = file.package.as_deref().map(|p| format!("{}.", p));
        if let Some(package) = file.package.as_deref() {
            if !QUALIFIED_NAME.is_match(package) {
                return Err(CodegenError::InvalidName(package.to_string()));
            }
        }
        for message in &file.messages {
            check_containment(prefix.as_deref(), file.package.as_deref(), &message.qualified)?;
            collect_message(message, &mut message_names, &mut enum_names)?;
        }
        for enum_spec in &file.enums {
            check_containment(prefix.as_deref(), file.package.as_deref(), &enum_spec.qualified)?;
            collect_enum(enum_spec, &mut enum_names, &mut message_names)?;
        }
    }

    // 4) Field invariants hold and every type reference resolves to a
    //    declared type of the right flavor.
    for file in &set.files {
        for message in &file.messages {
            check_message_fields(message, &message_names, &enum_names)?;
        }
    }

    Ok(())
}

fn check_containment(
    prefix: Option<&str>,
    container: Option<&str>,
    qualified: &str,
) -> Result<(), CodegenError> {
    if let (Some(prefix), Some(container)) = (prefix, container) {
        if !qualified.starts_with(prefix) {
            return Err(CodegenError::NestingMismatch {
                container: container.to_string(),
                nested:    qualified.to_string(),
            });
        }
    }
    Ok(())
}

fn collect_message<'a>(
    message: &'a MessageSpec,
    message_names: &mut HashSet<&'a str>,
    enum_names: &mut HashSet<&'a str>,
) -> Result<(), CodegenError> {
    let qualified = message.qualified.as_str();
    if !QUALIFIED_NAME.is_match(qualified) {
        return Err(CodegenError::InvalidName(qualified.to_string()));
    }
    if message_names.contains(qualified) || enum_names.contains(qualified) {
        return Err(CodegenError::DuplicateType(qualified.to_string()));
    }
    message_names.insert(qualified);

    let mut field_names: HashSet<&str> = HashSet::new();
    for field in &message.fields {
        if !field_names.insert(field.name.as_str()) {
            return Err(CodegenError::DuplicateField {
                message: qualified.to_string(),
                field:   field.name.clone(),
            });
        }
    }

    let prefix = format!("{}.", qualified);
    for nested in &message.messages {
        check_containment(Some(&prefix), Some(qualified), &nested.qualified)?;
        collect_message(nested, message_names, enum_names)?;
    }
    for enum_spec in &message.enums {
        check_containment(Some(&prefix), Some(qualified), &enum_spec.qualified)?;
        collect_enum(enum_spec, enum_names, message_names)?;
    }

    Ok(())
}

fn collect_enum<'a>(
    enum_spec: &'a EnumSpec,
    enum_names: &mut HashSet<&'a str>,
    message_names: &mut HashSet<&'a str>,
) -> Result<(), CodegenError> {
    let qualified = enum_spec.qualified.as_str();
    if !QUALIFIED_NAME.is_match(qualified) {
        return Err(CodegenError::InvalidName(qualified.to_string()));
    }
    if enum_names.contains(qualified) || message_names.contains(qualified) {
        return Err(CodegenError::DuplicateType(qualified.to_string()));
    }
    enum_names.insert(qualified);

    let mut value_names: HashSet<&str> = HashSet::new();
    for value in &enum_spec.values {
        if !value_names.insert(value.name.as_str()) {
            return Err(CodegenError::DuplicateEnumValue {
                enum_name: qualified.to_string(),
                value:     value.name.clone(),
            });
        }
    }

    Ok(())
}

fn check_message_fields(
    message: &MessageSpec,
    message_names: &HashSet<&str>,
    enum_names: &HashSet<&str>,
) -> Result<(), CodegenError> {
    for field in &message.fields {
        match field.kind {
            ScalarKind::Enum => {
                if field.enum_type.is_none() || field.message_type.is_some() {
                    return Err(CodegenError::BadTypeReference {
                        field: field.name.clone(),
                        kind:  kind_str(field.kind),
                    });
                }
                let type_ref = field.enum_type.as_deref().unwrap_or("");
                if !enum_names.contains(type_ref) {
                    return Err(CodegenError::UnresolvedType {
                        field:     field.name.clone(),
                        type_name: type_ref.to_string(),
                    });
                }
            }
            ScalarKind::Message => {
                if field.message_type.is_none() || field.enum_type.is_some() {
                    return Err(CodegenError::BadTypeReference {
                        field: field.name.clone(),
                        kind:  kind_str(field.kind),
                    });
                }
                let type_ref = field.message_type.as_deref().unwrap_or("");
                if !message_names.contains(type_ref) {
                    return Err(CodegenError::UnresolvedType {
                        field:     field.name.clone(),
                        type_name: type_ref.to_string(),
                    });
                }
            }
            _ => {
                if field.enum_type.is_some() || field.message_type.is_some() {
                    return Err(CodegenError::BadTypeReference {
                        field: field.name.clone(),
                        kind:  kind_str(field.kind),
                    });
                }
            }
        }
    }

    for nested in &message.messages {
        check_message_fields(nested, message_names, enum_names)?;
    }

    Ok(())
}
