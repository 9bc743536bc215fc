//! Reference documentation, derived mechanically from the same traversal
//! that drives code emission: one POD document per top-level message
//! listing every class, constructor, common method, accessor, and enum
//! constant.

use protoxs_descriptor::{EnumSpec, EnumValue, FieldSpec, MessageSpec, ScalarKind, SchemaFile};

use crate::names;
use crate::printer::Printer;

/// Prose description of a field's value type.
fn pod_field_type_string(field: &FieldSpec) -> String {
    match field.kind {
        ScalarKind::Int32 => "a 32-bit signed integer".to_string(),
        ScalarKind::Bool => "a Boolean value".to_string(),
        ScalarKind::Enum => format!(
            "a value of {}",
            names::perl_class_name(field.enum_type.as_deref().unwrap_or(""))
        ),
        ScalarKind::Uint32 => "a 32-bit unsigned integer".to_string(),
        ScalarKind::Float | ScalarKind::Double => "a floating point number".to_string(),
        ScalarKind::Int64 => "a 64-bit signed integer".to_string(),
        ScalarKind::Uint64 => "a 64-bit unsigned integer".to_string(),
        ScalarKind::String | ScalarKind::Bytes => "a string".to_string(),
        ScalarKind::Message => format!(
            "an instance of {}",
            names::perl_class_name(field.message_type.as_deref().unwrap_or(""))
        ),
    }
}

pub(crate) fn pod_print_enum_value(value: &EnumValue, printer: &mut Printer) {
    printer.print_pairs(&[("value", &value.name)], "=item B<*value*>\n\n");
    printer.print_pairs(
        &[("number", &value.number.to_string())],
        "This constant has a value of *number*.\n\n",
    );
}

fn generate_class_name_pod(message: &MessageSpec, printer: &mut Printer) {
    for enum_spec in &message.enums {
        printer.print_pairs(
            &[
                ("name", &names::perl_class_name(&enum_spec.qualified)),
                ("enum", &enum_spec.qualified),
            ],
            "=item C<*name*>\n\nA wrapper around the *enum* enum\n\n",
        );
    }

    for nested in &message.messages {
        generate_class_name_pod(nested, printer);
    }

    printer.print_pairs(
        &[
            ("name", &names::perl_class_name(&message.qualified)),
            ("message", &message.qualified),
        ],
        "=item C<*name*>\n\nA wrapper around the *message* message\n\n",
    );
}

fn generate_enum_values_pod(enum_spec: &EnumSpec, printer: &mut Printer) {
    printer.print_pairs(
        &[("name", &names::perl_class_name(&enum_spec.qualified))],
        "=head1 C<*name*> values\n\n=over 4\n\n",
    );

    for value in &enum_spec.values {
        pod_print_enum_value(value, printer);
    }

    printer.write("\n=back\n\n");
}

fn generate_method_pod(message: &MessageSpec, printer: &mut Printer) {
    for enum_spec in &message.enums {
        generate_enum_values_pod(enum_spec, printer);
    }

    for nested in &message.messages {
        generate_method_pod(nested, printer);
    }

    let name = names::perl_class_name(&message.qualified);
    let value = message.name();

    // Constructor

    printer.print_pairs(
        &[("name", &name), ("value", value)],
        "=head1 *name* Constructor\n\n=over 4\n\n=item B<$*value* = *name*-E<gt>new( [$arg] )>\n\nConstructs an instance of C<*name*>.  If a hashref argument\nis supplied, it is copied into the message instance as if\nthe copy_from() method were called immediately after\nconstruction.  Otherwise, if a scalar argument is supplied,\nit is interpreted as a serialized instance of the message\ntype, and the scalar is parsed to populate the message\nfields.  Otherwise, if no argument is supplied, an empty\nmessage instance is constructed.\n\n=back\n\n=head1 *name* Methods\n\n=over 4\n\n",
    );

    // Common message methods

    printer.print_pairs(
        &[("value", value)],
        "=item B<$*value*2-E<gt>copy_from($*value*1)>\n\nCopies the contents of C<*value*1> into C<*value*2>.\nC<*value*2> is another instance of the same message type.\n\n=item B<$*value*2-E<gt>copy_from($hashref)>\n\nCopies the contents of C<hashref> into C<*value*2>.\nC<hashref> is a Data::Dumper-style representation of an\ninstance of the message type.\n\n=item B<$*value*2-E<gt>merge_from($*value*1)>\n\nMerges the contents of C<*value*1> into C<*value*2>.\nC<*value*2> is another instance of the same message type.\n\n=item B<$*value*2-E<gt>merge_from($hashref)>\n\nMerges the contents of C<hashref> into C<*value*2>.\nC<hashref> is a Data::Dumper-style representation of an\ninstance of the message type.\n\n=item B<$*value*-E<gt>clear()>\n\nClears the contents of C<*value*>.\n\n=item B<$init = $*value*-E<gt>is_initialized()>\n\nReturns 1 if C<*value*> has been initialized with data.\n\n=item B<$errstr = $*value*-E<gt>error_string()>\n\nReturns a comma-delimited string of initialization errors.\n\n=item B<$*value*-E<gt>discard_unknown_fields()>\n\nDiscards unknown fields from C<*value*>.\n\n=item B<$dstr = $*value*-E<gt>debug_string()>\n\nReturns a string representation of C<*value*>.\n\n=item B<$dstr = $*value*-E<gt>short_debug_string()>\n\nReturns a short string representation of C<*value*>.\n\n=item B<$ok = $*value*-E<gt>unpack($string)>\n\nAttempts to parse C<string> into C<*value*>, returning 1 on success and 0 on failure.\n\n=item B<$string = $*value*-E<gt>pack()>\n\nSerializes C<*value*> into C<string>.\n\n=item B<$length = $*value*-E<gt>length()>\n\nReturns the serialized length of C<*value*>.\n\n=item B<@fields = $*value*-E<gt>fields()>\n\nReturns the defined fields of C<*value*>.\n\n=item B<$hashref = $*value*-E<gt>to_hashref()>\n\nExports the message to a hashref suitable for use in the\nC<copy_from> or C<merge_from> methods.\n\n",
    );

    // Field accessors

    for field in &message.fields {
        let field_type = pod_field_type_string(field);
        let pairs: [(&str, &str); 3] = [("value", value), ("field", &field.name), ("type", &field_type)];

        if field.repeated {
            printer.print_pairs(
                &pairs,
                "=item B<$*field*_size = $*value*-E<gt>*field*_size()>\n\nReturns the number of C<*field*> elements present in C<*value*>.\n\n",
            );
        } else {
            printer.print_pairs(
                &pairs,
                "=item B<$has_*field* = $*value*-E<gt>has_*field*()>\n\nReturns 1 if the C<*field*> element of C<*value*> is set, 0 otherwise.\n\n",
            );
        }

        printer.print_pairs(
            &pairs,
            "=item B<$*value*-E<gt>clear_*field*()>\n\nClears the C<*field*> element(s) of C<*value*>.\n\n",
        );

        if field.repeated {
            printer.print_pairs(
                &pairs,
                "=item B<@*field*_list = $*value*-E<gt>*field*()>\n\nReturns all values of C<*field*> in an array.  Each element of C<*field*_list> will be *type*.\n\n=item B<$*field*_elem = $*value*-E<gt>*field*($index)>\n\nReturns C<*field*> element C<index> from C<*value*>.  C<*field*> will be *type*, unless C<index> is out of range, in which case it will be undef.\n\n",
            );
        } else {
            printer.print_pairs(
                &pairs,
                "=item B<$*field* = $*value*-E<gt>*field*()>\n\nReturns C<*field*> from C<*value*>.  C<*field*> will be *type*.\n\n",
            );
        }

        if field.repeated {
            printer.print_pairs(
                &pairs,
                "=item B<$*value*-E<gt>add_*field*($value)>\n\nAdds C<value> to the list of C<*field*> in C<*value*>.  C<value> must be *type*.\n\n",
            );
        } else {
            printer.print_pairs(
                &pairs,
                "=item B<$*value*-E<gt>set_*field*($value)>\n\nSets the value of C<*field*> in C<*value*> to C<value>.  C<value> must be *type*.\n\n",
            );
        }
    }

    printer.write("\n=back\n\n");
}

/// Generate the reference document for one top-level message.
pub fn generate_message_pod(message: &MessageSpec, file: &SchemaFile) -> String {
    let mut printer = Printer::new('*');

    let package = names::module_name(file.package.as_deref(), &message.qualified);

    printer.print_pairs(
        &[
            ("package", &package),
            ("message", &message.qualified),
            ("name", message.name()),
        ],
        "=pod\n\n=head1 NAME\n\n*package* - Perl/XS interface to *message*\n\n=head1 SYNOPSIS\n\n=head2 Serializing messages\n\n #!/usr/bin/perl\n\n use strict;\n use warnings;\n use *package*;\n\n my $*name* = *package*->new;\n # Set fields in $*name*...\n my $pack*name* = $*name*->pack();\n\n=head2 Unserializing messages\n\n #!/usr/bin/perl\n\n use strict;\n use warnings;\n use *package*;\n\n my $pack*name*; # Read this from somewhere...\n my $*name* = *package*->new;\n if ( $*name*->unpack($pack*name*) ) {\n   print \"OK\"\n } else {\n   print \"NOT OK\"\n }\n\n=head1 DESCRIPTION\n\n*package* defines the following classes:\n\n=over 5\n\n",
    );

    generate_class_name_pod(message, &mut printer);

    printer.write("\n=back\n\n");

    generate_method_pod(message, &mut printer);

    printer.print_pairs(
        &[("message", &message.qualified)],
        "=head1 AUTHOR\n\nGenerated from *message* by the protoxs compiler.\n\n=head1 SEE ALSO\n\nhttp://code.google.com/p/protobuf\n\n=cut\n\n",
    );

    printer.into_string()
}
