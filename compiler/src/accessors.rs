//! Per-field accessor emission: presence/size query, clear, get, set/add.
//!
//! Emission order and method shapes follow the type-mapping table; the
//! emitter is total over every kind × arity combination.

use protoxs_descriptor::{FieldSpec, MessageSpec, ScalarKind};

use crate::index::TypeIndex;
use crate::mapping::{field_mapping, perl_sv_get, PerlArgType, QueryKind};
use crate::names;
use crate::options::{FailurePolicy, GeneratorOptions};
use crate::printer::{set_vars, Printer, Vars};
use crate::xs::typemap_input;

pub fn generate_field_accessors(
    field: &FieldSpec,
    message: &MessageSpec,
    index: &TypeIndex,
    printer: &mut Printer,
    options: &GeneratorOptions,
) {
    let classname = index.cpp_class(&message.qualified);
    let cppname = names::cpp_field_name(&field.name);
    let perlclass = names::perl_class_name(&message.qualified);
    let repeated = field.repeated;
    let mapping = field_mapping(field.kind, repeated);

    let mut vars = Vars::new();
    set_vars(
        &mut vars,
        &[
            ("classname", &classname),
            ("cppname", &cppname),
            ("perlname", &field.name),
            ("perlclass", &perlclass),
        ],
    );

    if field.kind == ScalarKind::Message {
        let type_ref = field.message_type.as_deref().unwrap_or("");
        let fieldtype = index.cpp_class(type_ref);
        let fieldclass = names::perl_class_name(type_ref);
        set_vars(&mut vars, &[("fieldtype", &fieldtype), ("fieldclass", &fieldclass)]);
    }

    // Repeated accessors address one element by position.
    if repeated {
        set_vars(&mut vars, &[("i", "index")]);
    } else {
        set_vars(&mut vars, &[("i", "")]);
    }

    // -------------------------------------------------------------------
    // First, the has_X method or X_size method.
    // -------------------------------------------------------------------

    match mapping.query {
        QueryKind::Size => {
            printer.print(&vars, "I32\n$perlname$_size(svTHIS)\n  SV * svTHIS;\n  CODE:\n");
            typemap_input(printer, index, &message.qualified, "THIS");
            printer.print(
                &vars,
                "    RETVAL = THIS->$cppname$_size();\n\n  OUTPUT:\n    RETVAL\n",
            );
        }
        QueryKind::Has => {
            printer.print(&vars, "I32\nhas_$perlname$(svTHIS)\n  SV * svTHIS;\n  CODE:\n");
            typemap_input(printer, index, &message.qualified, "THIS");
            printer.print(
                &vars,
                "    RETVAL = THIS->has_$cppname$();\n\n  OUTPUT:\n    RETVAL\n",
            );
        }
    }

    printer.write("\n\n");

    // -------------------------------------------------------------------
    // Next, the "clear" method.
    // -------------------------------------------------------------------

    printer.print(&vars, "void\nclear_$perlname$(svTHIS)\n  SV * svTHIS;\n  CODE:\n");
    typemap_input(printer, index, &message.qualified, "THIS");
    printer.print(&vars, "    THIS->clear_$cppname$();\n\n\n");

    // -------------------------------------------------------------------
    // Next, the "get" method.
    // -------------------------------------------------------------------

    if repeated {
        printer.print(&vars, "void\n$perlname$(svTHIS, ...)\n");
    } else {
        printer.print(&vars, "void\n$perlname$(svTHIS)\n");
    }

    printer.write("  SV * svTHIS;\nPREINIT:\n    SV * sv;\n");

    if repeated {
        printer.write("    int index = 0;\n");
    }

    if mapping.string_transport {
        printer.write("    ostringstream ost;\n");
    }

    if mapping.deep_copy {
        printer.print(&vars, "    $fieldtype$ * val = NULL;\n");
    }

    printer.write("\n  PPCODE:\n");

    typemap_input(printer, index, &message.qualified, "THIS");

    if repeated {
        printer.print(
            &vars,
            "    if ( items == 2 ) {\n      index = SvIV(ST(1));\n    } else if ( items > 2 ) {\n      croak(\"Usage: $perlclass$::$perlname$(CLASS, [index])\");\n    }\n",
        );
    }

    // Three cases: one element of a repeated field, all elements of a
    // repeated field, or the value of a singular field.

    if repeated {
        printer.print(
            &vars,
            "    if ( THIS != NULL ) {\n      if ( items == 1 ) {\n        int count = THIS->$cppname$_size();\n\n        EXTEND(SP, count);\n        for ( int index = 0; index < count; index++ ) {\n",
        );
        perl_sv_get(printer, &vars, field.kind, 5);
        printer.print(
            &vars,
            "          PUSHs(sv);\n        }\n      } else if ( index >= 0 &&\n                  index < THIS->$cppname$_size() ) {\n        EXTEND(SP,1);\n",
        );
        perl_sv_get(printer, &vars, field.kind, 4);
        printer.write(
            "        PUSHs(sv);\n      } else {\n        EXTEND(SP,1);\n        PUSHs(&PL_sv_undef);\n      }\n    }\n",
        );
    } else if mapping.deep_copy {
        // Unset embedded messages read back as undef, not as a copy of
        // the default instance.
        printer.print(
            &vars,
            "    if ( THIS != NULL ) {\n      EXTEND(SP,1);\n      if ( THIS->has_$cppname$() ) {\n",
        );
        perl_sv_get(printer, &vars, field.kind, 4);
        printer.write("        PUSHs(sv);\n      } else {\n        PUSHs(&PL_sv_undef);\n      }\n    }\n");
    } else {
        printer.write("    if ( THIS != NULL ) {\n      EXTEND(SP,1);\n");
        perl_sv_get(printer, &vars, field.kind, 3);
        printer.write("      PUSHs(sv);\n    }\n");
    }

    printer.write("\n\n");

    // -------------------------------------------------------------------
    // Finally, the "set" method.
    // -------------------------------------------------------------------

    set_vars(&mut vars, &[("do", mapping.mutator)]);
    printer.print(&vars, "void\n$do$_$perlname$(svTHIS, svVAL)\n");

    printer.write("  SV * svTHIS\n");

    match (mapping.arg, field.kind) {
        (PerlArgType::Iv, ScalarKind::Enum) => {
            let enum_ref = field.enum_type.as_deref().unwrap_or("");
            let etype = index.cpp_class(enum_ref);
            set_vars(&mut vars, &[("etype", &etype), ("value", "svVAL")]);
            printer.write("  IV svVAL\n\n  CODE:\n");
        }
        (PerlArgType::Iv, _) => {
            set_vars(&mut vars, &[("value", "svVAL")]);
            printer.write("  IV svVAL\n\n  CODE:\n");
        }
        (PerlArgType::Uv, _) => {
            set_vars(&mut vars, &[("value", "svVAL")]);
            printer.write("  UV svVAL\n\n  CODE:\n");
        }
        (PerlArgType::Nv, _) => {
            set_vars(&mut vars, &[("value", "svVAL")]);
            printer.write("  NV svVAL\n\n  CODE:\n");
        }
        (PerlArgType::Str, ScalarKind::Int64) => {
            set_vars(&mut vars, &[("value", "lval")]);
            printer.write(
                "  char *svVAL\n\n  PREINIT:\n    long long lval;\n\n  CODE:\n    lval = strtoll((svVAL) ? svVAL : \"\", NULL, 0);\n",
            );
        }
        (PerlArgType::Str, _) => {
            set_vars(&mut vars, &[("value", "lval")]);
            printer.write(
                "  char *svVAL\n\n  PREINIT:\n    unsigned long long lval;\n\n  CODE:\n    lval = strtoull((svVAL) ? svVAL : \"\", NULL, 0);\n",
            );
        }
        (PerlArgType::Sv, ScalarKind::Message) => {
            printer.write("  SV * svVAL\n  CODE:\n");
        }
        (PerlArgType::Sv, _) => {
            set_vars(&mut vars, &[("value", "sval")]);
            printer.write("  SV *svVAL\n\n  PREINIT:\n    char * str;\n    STRLEN len;\n");
            if field.kind == ScalarKind::String {
                printer.write("    string sval;\n");
            }
            printer.write("\n  CODE:\n");
        }
    }

    typemap_input(printer, index, &message.qualified, "THIS");

    if field.kind == ScalarKind::Message {
        let type_ref = field.message_type.as_deref().unwrap_or("");
        typemap_input(printer, index, type_ref, "VAL");
    }

    match field.kind {
        ScalarKind::Message => {
            if repeated {
                printer.print(
                    &vars,
                    "    if ( VAL != NULL ) {\n      $fieldtype$ * mval = THIS->add_$cppname$();\n      mval->CopyFrom(*VAL);\n    }\n",
                );
            } else {
                printer.print(
                    &vars,
                    "    if ( VAL != NULL ) {\n      $fieldtype$ * mval = THIS->mutable_$cppname$();\n      mval->CopyFrom(*VAL);\n    }\n",
                );
            }
        }
        ScalarKind::Enum => {
            printer.print(
                &vars,
                "    if ( $etype$_IsValid(svVAL) ) {\n      THIS->$do$_$cppname$(($etype$)svVAL);\n    }",
            );
            if options.on_invalid_enum == FailurePolicy::Croak {
                printer.print(
                    &vars,
                    " else {\n      croak(\"invalid value for $perlname$\");\n    }\n",
                );
            } else {
                printer.write("\n");
            }
        }
        ScalarKind::String => {
            printer.print(
                &vars,
                "    str = SvPV(svVAL, len);\n    sval.assign(str, len);\n    THIS->$do$_$cppname$(sval);\n",
            );
        }
        ScalarKind::Bytes => {
            printer.print(
                &vars,
                "    str = SvPV(svVAL, len);\n    THIS->$do$_$cppname$(str, len);\n",
            );
        }
        _ => {
            printer.print(&vars, "    THIS->$do$_$cppname$($value$);\n");
        }
    }

    printer.write("\n\n");
}
