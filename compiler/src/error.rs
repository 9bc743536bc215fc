use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodegenError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Descriptor decode error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("The type \"{0}\" is defined twice")]
    DuplicateType(String),

    #[error("The name \"{0}\" is not a well-formed qualified name")]
    InvalidName(String),

    #[error("The nested type \"{nested}\" is not contained in \"{container}\"")]
    NestingMismatch { container: String, nested: String },

    #[error("The type \"{type_name}\" is not defined for field \"{field}\"")]
    UnresolvedType { field: String, type_name: String },

    #[error("Field \"{field}\" of kind {kind} carries a mismatched type reference")]
    BadTypeReference { field: String, kind: &'static str },

    #[error("The field \"{field}\" is defined twice in \"{message}\"")]
    DuplicateField { message: String, field: String },

    #[error("The value \"{value}\" is defined twice in enum \"{enum_name}\"")]
    DuplicateEnumValue { enum_name: String, value: String },

    #[error("The file \"{0}\" is defined twice in the descriptor set")]
    DuplicateFile(String),

    #[error("The file \"{file}\" depends on \"{dependency}\", which is missing from the set")]
    MissingDependency { file: String, dependency: String },

    #[error("Dependency cycle through \"{0}\"")]
    DependencyCycle(String),

    #[error("No file named \"{0}\" in the descriptor set")]
    NoSuchFile(String),
}
