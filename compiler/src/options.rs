/// What the generated code does when handed a value it cannot apply: an
/// enum integer outside the declared set, or hashref input whose runtime
/// shape does not match the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Drop the assignment or skip the field; nothing is raised.
    #[default]
    Silent,
    /// Emit a `croak` branch naming the field instead of dropping.
    Croak,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GeneratorOptions {
    pub on_invalid_enum:   FailurePolicy,
    pub on_shape_mismatch: FailurePolicy,
}

impl GeneratorOptions {
    /// Both recovery paths report instead of dropping.
    pub fn strict() -> Self {
        GeneratorOptions {
            on_invalid_enum:   FailurePolicy::Croak,
            on_shape_mismatch: FailurePolicy::Croak,
        }
    }
}
