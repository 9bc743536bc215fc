//! The per-field-kind type-mapping table.
//!
//! Everything the accessor emitter and the structural converter need to
//! know about a field's value kind is decided here: how the value crosses
//! the XS boundary on the set path, whether it travels as a decimal string,
//! whether assignment is guarded by an enum validity check, and whether it
//! moves by deep copy.

use protoxs_descriptor::ScalarKind;

use crate::printer::{Printer, Vars};

/// Declared XS argument representation for the set/add path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerlArgType {
    /// Signed integer value.
    Iv,
    /// Unsigned integer value.
    Uv,
    /// Floating point value.
    Nv,
    /// NUL-terminated string, parsed by the setter.
    Str,
    /// Raw SV; the setter extracts pointer and length itself.
    Sv,
}

/// Shape of the presence query emitted for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    /// Singular: boolean `has_<field>`.
    Has,
    /// Repeated: element count `<field>_size`.
    Size,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldMapping {
    pub arg:              PerlArgType,
    /// 64-bit kinds cross the boundary as base-10 decimal strings; the
    /// host runtime's native numeric cannot represent every 64-bit value.
    pub string_transport: bool,
    /// Enum setters validate against the declared value set before
    /// assigning.
    pub needs_enum_check: bool,
    /// Message values move by deep copy in both directions; no live
    /// reference to internal state ever crosses the boundary.
    pub deep_copy:        bool,
    pub query:            QueryKind,
    /// `set` for singular fields, `add` for repeated ones.
    pub mutator:          &'static str,
}

pub fn field_mapping(kind: ScalarKind, repeated: bool) -> FieldMapping {
    let (arg, string_transport, needs_enum_check, deep_copy) = match kind {
        ScalarKind::Int32 | ScalarKind::Bool => (PerlArgType::Iv, false, false, false),
        ScalarKind::Enum => (PerlArgType::Iv, false, true, false),
        ScalarKind::Uint32 => (PerlArgType::Uv, false, false, false),
        ScalarKind::Float | ScalarKind::Double => (PerlArgType::Nv, false, false, false),
        ScalarKind::Int64 | ScalarKind::Uint64 => (PerlArgType::Str, true, false, false),
        ScalarKind::String | ScalarKind::Bytes => (PerlArgType::Sv, false, false, false),
        ScalarKind::Message => (PerlArgType::Sv, false, false, true),
    };

    FieldMapping {
        arg,
        string_transport,
        needs_enum_check,
        deep_copy,
        query: if repeated { QueryKind::Size } else { QueryKind::Has },
        mutator: if repeated { "add" } else { "set" },
    }
}

/// Emit the SV construction for one getter result at the given extra
/// indent depth.  `vars` carries `cppname` and `i`, plus `fieldtype` and
/// `fieldclass` for message fields.
pub fn perl_sv_get(printer: &mut Printer, vars: &Vars, kind: ScalarKind, depth: usize) {
    for _ in 0..depth {
        printer.indent();
    }

    match kind {
        ScalarKind::Int32 | ScalarKind::Bool | ScalarKind::Enum => {
            printer.print(vars, "sv = sv_2mortal(newSViv(THIS->$cppname$($i$)));\n");
        }
        ScalarKind::Uint32 => {
            printer.print(vars, "sv = sv_2mortal(newSVuv(THIS->$cppname$($i$)));\n");
        }
        ScalarKind::Float | ScalarKind::Double => {
            printer.print(vars, "sv = sv_2mortal(newSVnv(THIS->$cppname$($i$)));\n");
        }
        ScalarKind::Int64 | ScalarKind::Uint64 => {
            printer.print(
                vars,
                "ost.str(\"\");\nost << THIS->$cppname$($i$);\nsv = sv_2mortal(newSVpv(ost.str().c_str(),\n                        ost.str().length()));\n",
            );
        }
        ScalarKind::String | ScalarKind::Bytes => {
            printer.print(
                vars,
                "sv = sv_2mortal(newSVpv(THIS->$cppname$($i$).c_str(),\n                        THIS->$cppname$($i$).length()));\n",
            );
        }
        ScalarKind::Message => {
            printer.print(
                vars,
                "val = new $fieldtype$;\nval->CopyFrom(THIS->$cppname$($i$));\nsv = sv_newmortal();\nsv_setref_pv(sv, \"$fieldclass$\", (void *)val);\n",
            );
        }
    }

    for _ in 0..depth {
        printer.outdent();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sixty_four_bit_kinds_use_string_transport() {
        for kind in [ScalarKind::Int64, ScalarKind::Uint64] {
            let mapping = field_mapping(kind, false);
            assert!(mapping.string_transport);
            assert_eq!(mapping.arg, PerlArgType::Str);
        }
        assert!(!field_mapping(ScalarKind::Int32, false).string_transport);
    }

    #[test]
    fn test_enum_assignment_is_checked() {
        assert!(field_mapping(ScalarKind::Enum, false).needs_enum_check);
        assert!(field_mapping(ScalarKind::Enum, true).needs_enum_check);
        assert!(!field_mapping(ScalarKind::Uint32, false).needs_enum_check);
    }

    #[test]
    fn test_messages_move_by_deep_copy() {
        assert!(field_mapping(ScalarKind::Message, false).deep_copy);
        assert!(!field_mapping(ScalarKind::String, false).deep_copy);
    }

    #[test]
    fn test_arity_selects_query_and_mutator() {
        let singular = field_mapping(ScalarKind::Int32, false);
        assert_eq!(singular.query, QueryKind::Has);
        assert_eq!(singular.mutator, "set");

        let repeated = field_mapping(ScalarKind::Int32, true);
        assert_eq!(repeated.query, QueryKind::Size);
        assert_eq!(repeated.mutator, "add");
    }
}
