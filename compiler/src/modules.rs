//! Perl module wrappers: the DynaLoader bootstrap stanza registering each
//! top-level message's native glue with the host runtime, and pure-Perl
//! constants modules for top-level enums.

use protoxs_descriptor::{EnumSpec, MessageSpec, SchemaFile};

use crate::names;
use crate::pod::pod_print_enum_value;
use crate::printer::Printer;

pub fn generate_message_module(message: &MessageSpec, file: &SchemaFile) -> String {
    let mut printer = Printer::new('*');

    let package = names::module_name(file.package.as_deref(), &message.qualified);

    printer.print_pairs(
        &[("package", &package)],
        "package *package*;\n\nuse strict;\nuse warnings;\nuse vars qw(@ISA $AUTOLOAD $VERSION);\n\n$VERSION = '1.0';\n\nuse Exporter;\n\nrequire DynaLoader;\nrequire AutoLoader;\n\n@ISA = qw(DynaLoader Exporter);\n\nbootstrap *package* $VERSION;\n\n1;\n\n__END__\n\n",
    );

    printer.into_string()
}

/// Top-level enums have no native glue at all: one constant per value,
/// plus embedded POD documenting each constant.
pub fn generate_enum_module(enum_spec: &EnumSpec) -> String {
    let mut printer = Printer::new('*');

    let package = names::perl_class_name(&enum_spec.qualified);

    printer.print_pairs(
        &[("package", &package)],
        "package *package*;\n\nuse strict;\nuse warnings;\n\n",
    );

    for value in &enum_spec.values {
        printer.print_pairs(
            &[("value", &value.name), ("number", &value.number.to_string())],
            "use constant *value* => *number*;\n",
        );
    }

    printer.write("\n1;\n\n__END__\n\n");

    printer.print_pairs(
        &[("package", &package), ("enum", &enum_spec.qualified)],
        "=pod\n\n=head1 NAME\n\n*package* - Perl interface to *enum*\n\n=head1 SYNOPSIS\n\n use *package*;\n\n",
    );

    for value in &enum_spec.values {
        printer.print_pairs(
            &[("package", &package), ("value", &value.name)],
            " my $*value* = *package*::*value*;\n",
        );
    }

    printer.print_pairs(
        &[("package", &package)],
        "\n=head1 DESCRIPTION\n\n*package* defines the following constants:\n\n=over 4\n\n",
    );

    for value in &enum_spec.values {
        pod_print_enum_value(value, &mut printer);
    }

    printer.print_pairs(
        &[("enum", &enum_spec.qualified)],
        "\n=back\n\n=head1 AUTHOR\n\nGenerated from *enum* by the protoxs compiler.\n\n=head1 SEE ALSO\n\nhttp://code.google.com/p/protobuf\n\n=cut\n\n",
    );

    printer.into_string()
}
