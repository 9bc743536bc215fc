//! Assembly of one XS translation unit per top-level message: prologue,
//! zero-copy output stream, typedefs for the dependency closure, hashref
//! intake statics, and one XS package per message type.

use std::collections::HashSet;

use protoxs_descriptor::{MessageSpec, SchemaFile, SchemaSet};

use crate::accessors::generate_field_accessors;
use crate::convert::{from_hashref_static, message_to_hashref, setup_depth_vars};
use crate::index::TypeIndex;
use crate::names;
use crate::options::GeneratorOptions;
use crate::printer::{set_vars, Printer, Vars};

/// Emit the block unwrapping a blessed handle into its native pointer,
/// croaking when the handle is not of the expected class.  This is the
/// input direction of the marshalling rule, inlined wherever a method
/// receives a message handle.
pub(crate) fn typemap_input(printer: &mut Printer, index: &TypeIndex, qualified: &str, svname: &str) {
    let classname = index.cpp_class(qualified);
    let perlclass = names::perl_class_name(qualified);
    let underscores = index.alias(qualified);

    printer.print_pairs(
        &[
            ("classname", &classname),
            ("perlclass", &perlclass),
            ("underscores", &underscores),
            ("svname", svname),
        ],
        "    $classname$ * $svname$;\n    if ( sv_derived_from(sv$svname$, \"$perlclass$\") ) {\n      IV tmp = SvIV((SV *)SvRV(sv$svname$));\n      $svname$ = INT2PTR($underscores$ *, tmp);\n    } else {\n      croak(\"$svname$ is not of type $perlclass$\");\n    }\n",
    );
}

fn generate_prologue(file: &SchemaFile, printer: &mut Printer) {
    printer.print_pairs(
        &[("base", file.base_name())],
        "#ifdef __cplusplus\nextern \"C\" {\n#endif\n#include \"EXTERN.h\"\n#include \"perl.h\"\n#include \"XSUB.h\"\n#ifdef __cplusplus\n}\n#endif\n#ifdef do_open\n#undef do_open\n#endif\n#ifdef do_close\n#undef do_close\n#endif\n#ifdef New\n#undef New\n#endif\n#include <stdint.h>\n#include <sstream>\n#include <google/protobuf/stubs/common.h>\n#include <google/protobuf/io/zero_copy_stream.h>\n#include \"$base$.pb.h\"\n\nusing namespace std;\n\n",
    );
}

// Serialization writes straight into the result scalar's buffer; the
// stream grows it geometrically instead of copying through a string.
fn generate_output_stream(file: &SchemaFile, printer: &mut Printer) {
    printer.print_pairs(
        &[("base", &names::file_identifier(file.base_name()))],
        "class $base$_OutputStream :\n  public google::protobuf::io::ZeroCopyOutputStream {\npublic:\n  explicit $base$_OutputStream(SV * sv) :\n  sv_(sv), len_(0) {}\n  ~$base$_OutputStream() {}\n\n  bool Next(void** data, int* size)\n  {\n    STRLEN nlen = len_ << 1;\n\n    if ( nlen < 16 ) nlen = 16;\n    SvGROW(sv_, nlen);\n    *data = SvEND(sv_) + len_;\n    *size = SvLEN(sv_) - len_;\n    len_ = nlen;\n\n    return true;\n  }\n\n  void BackUp(int count)\n  {\n    SvCUR_set(sv_, SvLEN(sv_) - count);\n  }\n\n  void Sync() {\n    if ( SvCUR(sv_) == 0 ) {\n      SvCUR_set(sv_, len_);\n    }\n  }\n\n  int64_t ByteCount() const\n  {\n    return (int64_t)SvCUR(sv_);\n  }\n\nprivate:\n  SV * sv_;\n  STRLEN len_;\n};\n\n\n",
    );
}

/// Typedefs for every message type reachable from `file`, dependencies
/// first, nested types before containers.  `seen` deduplicates types
/// reachable through more than one dependency path.
pub fn generate_file_typedefs(
    file: &SchemaFile,
    set: &SchemaSet,
    index: &TypeIndex,
    printer: &mut Printer,
    seen: &mut HashSet<String>,
) {
    for dependency in &file.dependencies {
        if let Some(dep_file) = set.file(dependency) {
            generate_file_typedefs(dep_file, set, index, printer, seen);
        }
    }

    for message in &file.messages {
        generate_message_typedefs(message, index, printer, seen);
    }
}

fn generate_message_typedefs(
    message: &MessageSpec,
    index: &TypeIndex,
    printer: &mut Printer,
    seen: &mut HashSet<String>,
) {
    for nested in &message.messages {
        generate_message_typedefs(nested, index, printer, seen);
    }

    if !seen.contains(&message.qualified) {
        seen.insert(message.qualified.clone());
        printer.print_pairs(
            &[
                ("classname", &index.cpp_class(&message.qualified)),
                ("underscores", &index.alias(&message.qualified)),
            ],
            "typedef $classname$ $underscores$;\n",
        );
    }
}

fn generate_common_methods(
    message: &MessageSpec,
    file: &SchemaFile,
    index: &TypeIndex,
    printer: &mut Printer,
) {
    let classname = index.cpp_class(&message.qualified);
    let perlclass = names::perl_class_name(&message.qualified);
    let underscores = index.alias(&message.qualified);

    let mut vars = Vars::new();
    set_vars(
        &mut vars,
        &[
            ("classname", &classname),
            ("perlclass", &perlclass),
            ("underscores", &underscores),
        ],
    );

    // copy_from

    printer.print(&vars, "void\ncopy_from(svTHIS, sv)\n  SV * svTHIS\n  SV * sv\n  CODE:\n");
    typemap_input(printer, index, &message.qualified, "THIS");
    printer.print(
        &vars,
        "    if ( THIS != NULL && sv != NULL ) {\n      if ( sv_derived_from(sv, \"$perlclass$\") ) {\n        IV tmp = SvIV((SV *)SvRV(sv));\n        $classname$ * other = INT2PTR($underscores$ *, tmp);\n\n        THIS->CopyFrom(*other);\n      } else if ( SvROK(sv) &&\n                  SvTYPE(SvRV(sv)) == SVt_PVHV ) {\n        $classname$ * other = $underscores$_from_hashref(sv);\n        THIS->CopyFrom(*other);\n        delete other;\n      }\n    }\n\n\n",
    );

    // merge_from

    printer.print(&vars, "void\nmerge_from(svTHIS, sv)\n  SV * svTHIS\n  SV * sv\n  CODE:\n");
    typemap_input(printer, index, &message.qualified, "THIS");
    printer.print(
        &vars,
        "    if ( THIS != NULL && sv != NULL ) {\n      if ( sv_derived_from(sv, \"$perlclass$\") ) {\n        IV tmp = SvIV((SV *)SvRV(sv));\n        $classname$ * other = INT2PTR($underscores$ *, tmp);\n\n        THIS->MergeFrom(*other);\n      } else if ( SvROK(sv) &&\n                  SvTYPE(SvRV(sv)) == SVt_PVHV ) {\n        $classname$ * other = $underscores$_from_hashref(sv);\n        THIS->MergeFrom(*other);\n        delete other;\n      }\n    }\n\n\n",
    );

    // clear

    printer.print(&vars, "void\nclear(svTHIS)\n  SV * svTHIS\n  CODE:\n");
    typemap_input(printer, index, &message.qualified, "THIS");
    printer.print(&vars, "    if ( THIS != NULL ) {\n      THIS->Clear();\n    }\n\n\n");

    // is_initialized

    printer.print(&vars, "int\nis_initialized(svTHIS)\n  SV * svTHIS\n  CODE:\n");
    typemap_input(printer, index, &message.qualified, "THIS");
    printer.print(
        &vars,
        "    if ( THIS != NULL ) {\n      RETVAL = THIS->IsInitialized();\n    } else {\n      RETVAL = 0;\n    }\n\n  OUTPUT:\n    RETVAL\n\n\n",
    );

    // error_string

    printer.print(
        &vars,
        "SV *\nerror_string(svTHIS)\n  SV * svTHIS\n  PREINIT:\n    string estr;\n\n  CODE:\n",
    );
    typemap_input(printer, index, &message.qualified, "THIS");
    printer.print(
        &vars,
        "    if ( THIS != NULL ) {\n      estr = THIS->InitializationErrorString();\n    }\n    RETVAL = newSVpv(estr.c_str(), estr.length());\n\n  OUTPUT:\n    RETVAL\n\n\n",
    );

    // discard_unknown_fields

    printer.print(&vars, "void\ndiscard_unknown_fields(svTHIS)\n  SV * svTHIS\n  CODE:\n");
    typemap_input(printer, index, &message.qualified, "THIS");
    printer.print(
        &vars,
        "    if ( THIS != NULL ) {\n      THIS->DiscardUnknownFields();\n    }\n\n\n",
    );

    // debug_string

    printer.print(
        &vars,
        "SV *\ndebug_string(svTHIS)\n  SV * svTHIS\n  PREINIT:\n    string dstr;\n\n  CODE:\n",
    );
    typemap_input(printer, index, &message.qualified, "THIS");
    printer.print(
        &vars,
        "    if ( THIS != NULL ) {\n      dstr = THIS->DebugString();\n    }\n    RETVAL = newSVpv(dstr.c_str(), dstr.length());\n\n  OUTPUT:\n    RETVAL\n\n\n",
    );

    // short_debug_string

    printer.print(
        &vars,
        "SV *\nshort_debug_string(svTHIS)\n  SV * svTHIS\n  PREINIT:\n    string dstr;\n\n  CODE:\n",
    );
    typemap_input(printer, index, &message.qualified, "THIS");
    printer.print(
        &vars,
        "    if ( THIS != NULL ) {\n      dstr = THIS->ShortDebugString();\n    }\n    RETVAL = newSVpv(dstr.c_str(), dstr.length());\n\n  OUTPUT:\n    RETVAL\n\n\n",
    );

    // unpack

    printer.print(
        &vars,
        "int\nunpack(svTHIS, arg)\n  SV * svTHIS\n  SV * arg\n  PREINIT:\n    STRLEN len;\n    char * str;\n\n  CODE:\n",
    );
    typemap_input(printer, index, &message.qualified, "THIS");
    printer.print(
        &vars,
        "    if ( THIS != NULL ) {\n      str = SvPV(arg, len);\n      if ( str != NULL ) {\n        RETVAL = THIS->ParseFromArray(str, len);\n      } else {\n        RETVAL = 0;\n      }\n    } else {\n      RETVAL = 0;\n    }\n\n  OUTPUT:\n    RETVAL\n\n\n",
    );

    // pack

    let base = names::file_identifier(file.base_name());
    set_vars(&mut vars, &[("base", &base)]);

    printer.print(&vars, "SV *\npack(svTHIS)\n  SV * svTHIS\n  CODE:\n");
    typemap_input(printer, index, &message.qualified, "THIS");
    printer.print(
        &vars,
        "    if ( THIS != NULL ) {\n      RETVAL = newSVpvn(\"\", 0);\n      $base$_OutputStream os(RETVAL);\n      if ( THIS->SerializeToZeroCopyStream(&os) != true ) {\n        SvREFCNT_dec(RETVAL);\n        RETVAL = Nullsv;\n      } else {\n        os.Sync();\n      }\n    } else {\n      RETVAL = Nullsv;\n    }\n\n  OUTPUT:\n    RETVAL\n\n\n",
    );

    // length

    printer.print(&vars, "int\nlength(svTHIS)\n  SV * svTHIS\n  CODE:\n");
    typemap_input(printer, index, &message.qualified, "THIS");
    printer.print(
        &vars,
        "    if ( THIS != NULL ) {\n      RETVAL = THIS->ByteSize();\n    } else {\n      RETVAL = 0;\n    }\n\n  OUTPUT:\n    RETVAL\n\n\n",
    );

    // fields

    let field_count = message.fields.len().to_string();
    set_vars(&mut vars, &[("field_count", &field_count)]);
    printer.print(
        &vars,
        "void\nfields(svTHIS)\n  SV * svTHIS\n  PPCODE:\n    (void)svTHIS;\n    EXTEND(SP, $field_count$);\n",
    );

    for field in &message.fields {
        printer.print_pairs(
            &[("field", &field.name)],
            "    PUSHs(sv_2mortal(newSVpv(\"$field$\",0)));\n",
        );
    }

    printer.write("\n\n");

    // to_hashref

    printer.print(&vars, "SV *\nto_hashref(svTHIS)\n  SV * svTHIS\n  CODE:\n");
    typemap_input(printer, index, &message.qualified, "THIS");
    printer.print(
        &vars,
        "    if ( THIS != NULL ) {\n      HV * hv0 = newHV();\n      $classname$ * msg0 = THIS;\n\n",
    );

    set_vars(&mut vars, &[("fieldtype", &classname)]);
    setup_depth_vars(&mut vars, 0);

    printer.indent();
    printer.indent();
    printer.indent();
    message_to_hashref(message, index, printer, &mut vars, 0);
    printer.outdent();
    printer.outdent();
    printer.outdent();

    printer.write(
        "      RETVAL = newRV_noinc((SV *)hv0);\n    } else {\n      RETVAL = Nullsv;\n    }\n\n  OUTPUT:\n    RETVAL\n\n\n",
    );
}

/// One XS package per message type, nested packages first so forward
/// references never occur in the emitted file.
pub fn generate_message_package(
    message: &MessageSpec,
    file: &SchemaFile,
    index: &TypeIndex,
    printer: &mut Printer,
    options: &GeneratorOptions,
) {
    for nested in &message.messages {
        generate_message_package(nested, file, index, printer, options);
    }

    let classname = index.cpp_class(&message.qualified);
    let module = names::module_name(file.package.as_deref(), &message.qualified);
    let package = names::perl_class_name(&message.qualified);
    let underscores = index.alias(&message.qualified);

    let mut vars = Vars::new();
    set_vars(
        &mut vars,
        &[
            ("module", &module),
            ("classname", &classname),
            ("package", &package),
            ("underscores", &underscores),
        ],
    );

    printer.print(&vars, "MODULE = $module$ PACKAGE = $package$\nPROTOTYPES: ENABLE\n\n\n");

    // BOOT-time constants for enums declared inside this message.

    if !message.enums.is_empty() {
        printer.write("BOOT:\n  {\n    HV * stash;\n\n");

        printer.indent();
        printer.indent();
        for enum_spec in &message.enums {
            printer.print_pairs(
                &[("package", &package), ("name", enum_spec.name())],
                "stash = gv_stashpv(\"$package$::$name$\", TRUE);\n",
            );
            for value in &enum_spec.values {
                printer.print_pairs(
                    &[("classname", &classname), ("name", &value.name)],
                    "newCONSTSUB(stash, \"$name$\", newSViv($classname$::$name$));\n",
                );
            }
        }
        printer.outdent();
        printer.outdent();
        printer.write("  }\n\n\n");
    }

    // Constructor

    printer.print(
        &vars,
        "SV *\n$classname$::new (...)\n  PREINIT:\n    $classname$ * rv = NULL;\n\n  CODE:\n    if ( strcmp(CLASS,\"$package$\") ) {\n      croak(\"invalid class %s\",CLASS);\n    }\n    if ( items == 2 && ST(1) != Nullsv ) {\n      if ( SvROK(ST(1)) && SvTYPE(SvRV(ST(1))) == SVt_PVHV ) {\n        rv = $underscores$_from_hashref(ST(1));\n      } else {\n        STRLEN len;\n        char * str;\n\n        rv = new $classname$;\n        str = SvPV(ST(1), len);\n        if ( str != NULL ) {\n          rv->ParseFromArray(str, len);\n        }\n      }\n    } else {\n      rv = new $classname$;\n    }\n    RETVAL = newSV(0);\n    sv_setref_pv(RETVAL, \"$package$\", (void *)rv);\n\n  OUTPUT:\n    RETVAL\n\n\n",
    );

    // Destructor

    printer.print(&vars, "void\nDESTROY(svTHIS)\n  SV * svTHIS;\n  CODE:\n");
    typemap_input(printer, index, &message.qualified, "THIS");
    printer.write("    if ( THIS != NULL ) {\n      delete THIS;\n    }\n\n\n");

    generate_common_methods(message, file, index, printer);

    for field in &message.fields {
        generate_field_accessors(field, message, index, printer, options);
    }
}

/// Assemble the complete XS source for one top-level message.
pub fn generate_message_xs(
    message: &MessageSpec,
    file: &SchemaFile,
    set: &SchemaSet,
    index: &TypeIndex,
    options: &GeneratorOptions,
) -> String {
    let mut printer = Printer::new('$');

    generate_prologue(file, &mut printer);
    generate_output_stream(file, &mut printer);

    let mut seen = HashSet::new();
    generate_file_typedefs(file, set, index, &mut printer, &mut seen);

    printer.write("\n\n");

    from_hashref_static(message, index, &mut printer, options);

    printer.write("\n\n");

    generate_message_package(message, file, index, &mut printer, options);

    printer.into_string()
}
