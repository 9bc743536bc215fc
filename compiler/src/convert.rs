//! The structural converter: recursive emission of the message ⇄ hashref
//! conversion bodies.
//!
//! Both directions walk a message's fields in declaration order and recurse
//! into embedded message types two depth steps at a time.  Every
//! intermediate identifier (`msg<d>`, `hv<d>`, `av<d>`, `sv<d>`, `i<d>`,
//! `ost<d>`, ...) is derived from the depth counter in [`setup_depth_vars`],
//! so no name is ever reused across nesting levels within one generation
//! unit.

use protoxs_descriptor::{FieldSpec, MessageSpec, ScalarKind};

use crate::index::TypeIndex;
use crate::mapping::field_mapping;
use crate::names;
use crate::options::{FailurePolicy, GeneratorOptions};
use crate::printer::{set_vars, Printer, Vars};

/// Derives the three depth-indexed suffixes every converter template uses:
/// `pdepth` for the current level, `depth` and `ndepth` for the next two.
pub fn setup_depth_vars(vars: &mut Vars, depth: usize) {
    set_vars(
        vars,
        &[
            ("pdepth", &depth.to_string()),
            ("depth", &(depth + 1).to_string()),
            ("ndepth", &(depth + 2).to_string()),
        ],
    );
}

// ---------------------------------------------------------------------
// message -> hashref
// ---------------------------------------------------------------------

fn start_field_to_hashref(field: &FieldSpec, printer: &mut Printer, vars: &mut Vars, depth: usize) {
    setup_depth_vars(vars, depth);

    if field.repeated {
        let loop_var = format!("i{}", depth);
        set_vars(vars, &[("i", &loop_var)]);
        printer.print(vars, "if ( msg$pdepth$->$cppname$_size() > 0 ) {\n");
        printer.indent();
        printer.print(
            vars,
            "AV * av$pdepth$ = newAV();\nSV * sv$pdepth$ = newRV_noinc((SV *)av$pdepth$);\n\nfor ( int $i$ = 0; $i$ < msg$pdepth$->$cppname$_size(); $i$++ ) {\n",
        );
    } else {
        set_vars(vars, &[("i", "")]);
        printer.print(vars, "if ( msg$pdepth$->has_$cppname$() ) {\n");
    }
    printer.indent();
}

fn field_to_hashref_helper(printer: &mut Printer, vars: &mut Vars, field: &FieldSpec) {
    let msg = format!("msg{}", vars["pdepth"]);
    let sv = if field.repeated {
        format!("sv{}", vars["depth"])
    } else {
        format!("sv{}", vars["pdepth"])
    };
    set_vars(vars, &[("msg", &msg), ("sv", &sv)]);

    match field.kind {
        ScalarKind::Int32 | ScalarKind::Bool | ScalarKind::Enum => {
            printer.print(vars, "SV * $sv$ = newSViv($msg$->$cppname$($i$));\n");
        }
        ScalarKind::Uint32 => {
            printer.print(vars, "SV * $sv$ = newSVuv($msg$->$cppname$($i$));\n");
        }
        ScalarKind::Float | ScalarKind::Double => {
            printer.print(vars, "SV * $sv$ = newSVnv($msg$->$cppname$($i$));\n");
        }
        ScalarKind::Int64 | ScalarKind::Uint64 => {
            printer.print(
                vars,
                "ostringstream ost$pdepth$;\n\nost$pdepth$ << $msg$->$cppname$($i$);\nSV * $sv$ = newSVpv(ost$pdepth$.str().c_str(), ost$pdepth$.str().length());\n",
            );
        }
        ScalarKind::String | ScalarKind::Bytes | ScalarKind::Message => {
            printer.print(
                vars,
                "SV * $sv$ = newSVpv($msg$->$cppname$($i$).c_str(), $msg$->$cppname$($i$).length());\n",
            );
        }
    }
}

fn end_field_to_hashref(field: &FieldSpec, printer: &mut Printer, vars: &mut Vars, depth: usize) {
    setup_depth_vars(vars, depth);

    if field.repeated {
        printer.print(vars, "av_push(av$pdepth$, sv$depth$);\n");
        printer.outdent();
        printer.print(
            vars,
            "}\nhv_store(hv$pdepth$, \"$field$\", sizeof(\"$field$\") - 1, sv$pdepth$, 0);\n",
        );
    } else if field.kind == ScalarKind::Message {
        printer.print(
            vars,
            "hv_store(hv$pdepth$, \"$field$\", sizeof(\"$field$\") - 1, sv$depth$, 0);\n",
        );
    } else {
        printer.print(
            vars,
            "hv_store(hv$pdepth$, \"$field$\", sizeof(\"$field$\") - 1, sv$pdepth$, 0);\n",
        );
    }

    printer.outdent();
    printer.write("}\n");
}

/// Emit the body converting `msg<depth>` into the hash `hv<depth>`.  Unset
/// singular fields and empty repeated fields store no key at all.
pub fn message_to_hashref(
    message: &MessageSpec,
    index: &TypeIndex,
    printer: &mut Printer,
    vars: &mut Vars,
    depth: usize,
) {
    for field in &message.fields {
        let cppname = names::cpp_field_name(&field.name);
        set_vars(vars, &[("field", &field.name), ("cppname", &cppname)]);

        start_field_to_hashref(field, printer, vars, depth);

        if field.kind == ScalarKind::Message {
            let type_ref = field.message_type.as_deref().unwrap_or("");
            let fieldtype = index.cpp_class(type_ref);
            set_vars(vars, &[("fieldtype", &fieldtype)]);
            printer.print(
                vars,
                "$fieldtype$ * msg$ndepth$ = msg$pdepth$->mutable_$cppname$($i$);\nHV * hv$ndepth$ = newHV();\nSV * sv$depth$ = newRV_noinc((SV *)hv$ndepth$);\n\n",
            );
            if let Some(nested) = index.message(type_ref) {
                message_to_hashref(nested, index, printer, vars, depth + 2);
            }
            setup_depth_vars(vars, depth);
        } else {
            field_to_hashref_helper(printer, vars, field);
        }

        let cppname = names::cpp_field_name(&field.name);
        set_vars(vars, &[("field", &field.name), ("cppname", &cppname)]);
        end_field_to_hashref(field, printer, vars, depth);
    }
}

// ---------------------------------------------------------------------
// hashref -> message
// ---------------------------------------------------------------------

fn field_from_hashref_helper(
    printer: &mut Printer,
    vars: &mut Vars,
    field: &FieldSpec,
    index: &TypeIndex,
) {
    let msg = format!("msg{}", vars["pdepth"]);
    let var = format!("*sv{}", vars["depth"]);
    let mapping = field_mapping(field.kind, field.repeated);
    set_vars(vars, &[("msg", &msg), ("var", &var), ("do", mapping.mutator)]);

    match field.kind {
        ScalarKind::Int32 | ScalarKind::Bool => {
            printer.print(vars, "$msg$->$do$_$cppname$(SvIV($var$));\n");
        }
        ScalarKind::Enum => {
            let enum_ref = field.enum_type.as_deref().unwrap_or("");
            let enum_class = index.cpp_class(enum_ref);
            set_vars(vars, &[("type", &enum_class)]);
            printer.print(vars, "$msg$->$do$_$cppname$(($type$)SvIV($var$));\n");
        }
        ScalarKind::Uint32 => {
            printer.print(vars, "$msg$->$do$_$cppname$(SvUV($var$));\n");
        }
        ScalarKind::Float | ScalarKind::Double => {
            printer.print(vars, "$msg$->$do$_$cppname$(SvNV($var$));\n");
        }
        ScalarKind::Int64 => {
            printer.print(
                vars,
                "int64_t iv$pdepth$ = strtoll(SvPV_nolen($var$), NULL, 0);\n\n$msg$->$do$_$cppname$(iv$pdepth$);\n",
            );
        }
        ScalarKind::Uint64 => {
            printer.print(
                vars,
                "uint64_t uv$pdepth$ = strtoull(SvPV_nolen($var$), NULL, 0);\n\n$msg$->$do$_$cppname$(uv$pdepth$);\n",
            );
        }
        ScalarKind::String | ScalarKind::Bytes => {
            printer.print(
                vars,
                "STRLEN len$pdepth$;\nconst char * str$pdepth$ = SvPV($var$, len$pdepth$);\n\n$msg$->$do$_$cppname$(str$pdepth$, len$pdepth$);\n",
            );
        }
        ScalarKind::Message => {
            // Handled by recursion in message_from_hashref.
        }
    }
}

/// Emit the body populating `msg<depth>` from the hash referenced by
/// `sv<depth>`.  Missing keys leave fields unset; input of the wrong
/// runtime shape is skipped (or croaks under the strict policy).
pub fn message_from_hashref(
    message: &MessageSpec,
    index: &TypeIndex,
    printer: &mut Printer,
    vars: &mut Vars,
    depth: usize,
    options: &GeneratorOptions,
) {
    // The parent's field name, for the shape-mismatch report at the close.
    let owner_field = vars.get("field").cloned().unwrap_or_default();

    setup_depth_vars(vars, depth);

    printer.print(
        vars,
        "if ( SvROK(sv$pdepth$) && SvTYPE(SvRV(sv$pdepth$)) == SVt_PVHV ) {\n",
    );
    printer.indent();
    printer.print(vars, "HV *  hv$pdepth$ = (HV *)SvRV(sv$pdepth$);\nSV ** sv$depth$;\n\n");

    for field in &message.fields {
        let cppname = names::cpp_field_name(&field.name);
        set_vars(vars, &[("field", &field.name), ("cppname", &cppname)]);

        if field.kind == ScalarKind::Message {
            let type_ref = field.message_type.as_deref().unwrap_or("");
            let fieldtype = index.cpp_class(type_ref);
            set_vars(vars, &[("fieldtype", &fieldtype)]);
        }

        printer.print(
            vars,
            "if ( (sv$depth$ = hv_fetch(hv$pdepth$, \"$field$\", sizeof(\"$field$\") - 1, 0)) != NULL ) {\n",
        );
        printer.indent();

        if field.repeated {
            printer.print(
                vars,
                "if ( SvROK(*sv$depth$) && SvTYPE(SvRV(*sv$depth$)) == SVt_PVAV ) {\n",
            );
            printer.indent();
            printer.print(
                vars,
                "AV * av$depth$ = (AV *)SvRV(*sv$depth$);\n\nfor ( int i$depth$ = 0; i$depth$ <= av_len(av$depth$); i$depth$++ ) {\n",
            );
            printer.indent();

            if field.kind == ScalarKind::Message {
                printer.print(
                    vars,
                    "$fieldtype$ * msg$ndepth$ = msg$pdepth$->add_$cppname$();\nSV ** sv$depth$;\nSV *  sv$ndepth$;\n\nif ( (sv$depth$ = av_fetch(av$depth$, i$depth$, 0)) != NULL ) {\n  sv$ndepth$ = *sv$depth$;\n",
                );
            } else {
                printer.print(
                    vars,
                    "SV ** sv$depth$;\n\nif ( (sv$depth$ = av_fetch(av$depth$, i$depth$, 0)) != NULL ) {\n",
                );
            }
            printer.indent();
        } else if field.kind == ScalarKind::Message {
            printer.print(
                vars,
                "$fieldtype$ * msg$ndepth$ = msg$pdepth$->mutable_$cppname$();\nSV * sv$ndepth$ = *sv$depth$;\n\n",
            );
        }

        if field.kind == ScalarKind::Message {
            let type_ref = field.message_type.as_deref().unwrap_or("");
            if let Some(nested) = index.message(type_ref) {
                message_from_hashref(nested, index, printer, vars, depth + 2, options);
            }
            setup_depth_vars(vars, depth);
            let cppname = names::cpp_field_name(&field.name);
            set_vars(vars, &[("field", &field.name), ("cppname", &cppname)]);
        } else {
            field_from_hashref_helper(printer, vars, field, index);
        }

        if field.repeated {
            printer.outdent();
            printer.write("}\n");
            printer.outdent();
            printer.write("}\n");
            printer.outdent();
            if options.on_shape_mismatch == FailurePolicy::Croak {
                printer.print(
                    vars,
                    "} else {\n  croak(\"$field$ is not an array reference\");\n}\n",
                );
            } else {
                printer.write("}\n");
            }
        }

        printer.outdent();
        printer.write("}\n");
    }

    printer.outdent();
    if options.on_shape_mismatch == FailurePolicy::Croak && depth > 0 {
        set_vars(vars, &[("field", &owner_field)]);
        printer.print(vars, "} else {\n  croak(\"$field$ is not a hash reference\");\n}\n");
    } else {
        printer.write("}\n");
    }
}

/// Emit the static helper constructing a new message instance from a
/// hashref, used by the constructor, `copy_from`, and `merge_from`.
/// Nested message types get their helpers first.
pub fn from_hashref_static(
    message: &MessageSpec,
    index: &TypeIndex,
    printer: &mut Printer,
    options: &GeneratorOptions,
) {
    for nested in &message.messages {
        from_hashref_static(nested, index, printer, options);
    }

    let classname = index.cpp_class(&message.qualified);
    let underscores = index.alias(&message.qualified);

    let mut vars = Vars::new();
    set_vars(
        &mut vars,
        &[
            ("classname", &classname),
            ("fieldtype", &classname),
            ("underscores", &underscores),
        ],
    );

    printer.print(
        &vars,
        "static $classname$ *\n$underscores$_from_hashref ( SV * sv0 )\n{\n  $fieldtype$ * msg0 = new $fieldtype$;\n\n",
    );

    printer.indent();
    message_from_hashref(message, index, printer, &mut vars, 0, options);
    printer.outdent();

    printer.write("\n  return msg0;\n}\n\n");
}
