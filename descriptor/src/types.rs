use serde::{Deserialize, Serialize};

/// The value kind of a single field, as reported by the upstream schema
/// compiler.  `Enum` and `Message` carry a type reference in the owning
/// [`FieldSpec`]; every other kind stands alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    Int32,
    Uint32,
    Int64,
    Uint64,
    Float,
    Double,
    Bool,
    String,
    Bytes,
    Enum,
    Message,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name:         String,
    pub kind:         ScalarKind,
    #[serde(default)]
    pub repeated:     bool,
    /// Qualified name of the referenced enum; `Some` iff `kind` is `Enum`.
    #[serde(default)]
    pub enum_type:    Option<String>,
    /// Qualified name of the embedded message; `Some` iff `kind` is `Message`.
    #[serde(default)]
    pub message_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumValue {
    pub name:   String,
    pub number: i32,
}

/// An enum declaration.  Value names are unique within the enum; the
/// integer values need not be unique or contiguous.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumSpec {
    pub qualified: String,
    #[serde(default)]
    pub values:    Vec<EnumValue>,
}

/// A message declaration.  `qualified` is unique within a schema closure,
/// and the qualified names of nested types are prefixed by the container's.
/// Field order is declaration order and drives emitted accessor order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageSpec {
    pub qualified: String,
    #[serde(default)]
    pub fields:    Vec<FieldSpec>,
    #[serde(default)]
    pub messages:  Vec<MessageSpec>,
    #[serde(default)]
    pub enums:     Vec<EnumSpec>,
}

/// One schema file as produced by the upstream compiler.  `dependencies`
/// lists the names of files this one imports; the closure must be acyclic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaFile {
    pub name:         String,
    #[serde(default)]
    pub package:      Option<String>,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub messages:     Vec<MessageSpec>,
    #[serde(default)]
    pub enums:        Vec<EnumSpec>,
}

/// A dependency-closed collection of schema files; the unit of input for
/// one generator run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaSet {
    pub files: Vec<SchemaFile>,
}

/// Last segment of a dot-separated qualified name.
pub fn simple_name(qualified: &str) -> &str {
    qualified.rsplit('.').next().unwrap_or(qualified)
}

impl EnumSpec {
    pub fn name(&self) -> &str {
        simple_name(&self.qualified)
    }
}

impl MessageSpec {
    pub fn name(&self) -> &str {
        simple_name(&self.qualified)
    }
}

impl SchemaFile {
    /// File name without its trailing `.proto` extension, used to derive
    /// artifact-local identifiers.
    pub fn base_name(&self) -> &str {
        self.name.strip_suffix(".proto").unwrap_or(&self.name)
    }
}

impl SchemaSet {
    pub fn file(&self, name: &str) -> Option<&SchemaFile> {
        self.files.iter().find(|f| f.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_name() {
        assert_eq!(simple_name("demo.corp.Outer.Inner"), "Inner");
        assert_eq!(simple_name("Point"), "Point");
    }

    #[test]
    fn test_base_name_strips_proto_extension() {
        let file = SchemaFile {
            name:         "demo.proto".to_string(),
            package:      None,
            dependencies: Vec::new(),
            messages:     Vec::new(),
            enums:        Vec::new(),
        };
        assert_eq!(file.base_name(), "demo");
    }
}
