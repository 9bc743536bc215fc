//! The message/enum driver: walks a verified descriptor set and assembles
//! one generation unit per top-level message (XS glue, module wrapper,
//! typemap, POD) and one per top-level enum (constants module).

use std::fs;
use std::path::Path;

use protoxs_descriptor::{MessageSpec, SchemaSet};

use crate::error::CodegenError;
use crate::index::TypeIndex;
use crate::modules::{generate_enum_module, generate_message_module};
use crate::names;
use crate::options::GeneratorOptions;
use crate::pod::generate_message_pod;
use crate::printer::Printer;
use crate::verifier::verify_schema_set;
use crate::xs::generate_message_xs;

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedFile {
    pub name:    String,
    pub content: String,
}

/// Everything produced for one top-level message or enum.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationUnit {
    pub type_name: String,
    pub files:     Vec<GeneratedFile>,
}

/// Read a descriptor set from a JSON document on disk.
pub fn load_schema_set(path: &Path) -> Result<SchemaSet, CodegenError> {
    let text = fs::read_to_string(path)?;
    let set = serde_json::from_str(&text)?;
    Ok(set)
}

pub fn schema_set_to_json(set: &SchemaSet) -> Result<String, CodegenError> {
    let json = serde_json::to_string_pretty(set)?;
    Ok(json)
}

fn collect_messages<'a>(message: &'a MessageSpec, out: &mut Vec<&'a MessageSpec>) {
    for nested in &message.messages {
        collect_messages(nested, out);
    }
    out.push(message);
}

/// The marshalling descriptor for one top-level message: a rule per
/// reachable message type telling the XS bridge how to unwrap a blessed
/// handle into a native pointer and how to wrap one back up.  The `$arg`,
/// `$var` and `$type` placeholders are consumed downstream, which is why
/// this artifact substitutes on `*`.
fn generate_message_typemap(message: &MessageSpec, index: &TypeIndex) -> String {
    let mut printer = Printer::new('*');

    let mut types = Vec::new();
    collect_messages(message, &mut types);

    printer.write("TYPEMAP\n");
    for spec in &types {
        printer.print_pairs(
            &[
                ("alias", &index.alias(&spec.qualified)),
                ("rule", &names::typemap_name(&spec.qualified)),
            ],
            "*alias* **\t*rule*\n",
        );
    }

    printer.write("\nINPUT\n");
    for spec in &types {
        printer.print_pairs(
            &[
                ("rule", &names::typemap_name(&spec.qualified)),
                ("class", &names::perl_class_name(&spec.qualified)),
            ],
            "*rule*\n    if (sv_derived_from($arg, \"*class*\")) {\n        IV tmp = SvIV((SV**)SvRV($arg));\n        $var = INT2PTR($type, tmp);\n    }\n    else\n        croak(\"$var is not of type *class*\")\n\n",
        );
    }

    printer.write("\nOUTPUT\n");
    for spec in &types {
        printer.print_pairs(
            &[
                ("rule", &names::typemap_name(&spec.qualified)),
                ("class", &names::perl_class_name(&spec.qualified)),
            ],
            "*rule*\n    sv_setref_pv($arg, \"*class*\", (void**)$var);\n\n",
        );
    }

    printer.into_string()
}

/// Generate every artifact for one file of a verified descriptor set.
pub fn generate_file(
    set: &SchemaSet,
    file_name: &str,
    options: &GeneratorOptions,
) -> Result<Vec<GenerationUnit>, CodegenError> {
    verify_schema_set(set)?;

    let file = set
        .file(file_name)
        .ok_or_else(|| CodegenError::NoSuchFile(file_name.to_string()))?;
    let index = TypeIndex::build(set);

    let mut units = Vec::new();

    for message in &file.messages {
        let name = message.name();
        units.push(GenerationUnit {
            type_name: message.qualified.clone(),
            files:     vec![
                GeneratedFile {
                    name:    format!("{}.xs", name),
                    content: generate_message_xs(message, file, set, &index, options),
                },
                GeneratedFile {
                    name:    format!("{}.pm", name),
                    content: generate_message_module(message, file),
                },
                GeneratedFile {
                    name:    format!("{}.typemap", name),
                    content: generate_message_typemap(message, &index),
                },
                GeneratedFile {
                    name:    format!("{}.pod", name),
                    content: generate_message_pod(message, file),
                },
            ],
        });
    }

    for enum_spec in &file.enums {
        units.push(GenerationUnit {
            type_name: enum_spec.qualified.clone(),
            files:     vec![GeneratedFile {
                name:    format!("{}.pm", enum_spec.name()),
                content: generate_enum_module(enum_spec),
            }],
        });
    }

    Ok(units)
}

/// Generate artifacts for every file in the set, dependencies first.
pub fn generate_set(
    set: &SchemaSet,
    options: &GeneratorOptions,
) -> Result<Vec<GenerationUnit>, CodegenError> {
    verify_schema_set(set)?;

    let mut units = Vec::new();
    for file in &set.files {
        units.extend(generate_file(set, &file.name, options)?);
    }
    Ok(units)
}

/// Write every generated file under `dir`, creating it if needed.
pub fn write_units(units: &[GenerationUnit], dir: &Path) -> Result<(), CodegenError> {
    fs::create_dir_all(dir)?;
    for unit in units {
        for file in &unit.files {
            fs::write(dir.join(&file.name), &file.content)?;
        }
    }
    Ok(())
}
