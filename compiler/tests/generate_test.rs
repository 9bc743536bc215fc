#![cfg(test)]

use protoxs_compiler::{generate_file, load_schema_set, write_units, GeneratorOptions};
use protoxs_descriptor::{
    EnumSpec, EnumValue, FieldSpec, MessageSpec, ScalarKind, SchemaFile, SchemaSet,
};

fn field(name: &str, kind: ScalarKind) -> FieldSpec {
    FieldSpec {
        name:         name.to_string(),
        kind,
        repeated:     false,
        enum_type:    None,
        message_type: None,
    }
}

fn message_field(name: &str, type_ref: &str, repeated: bool) -> FieldSpec {
    FieldSpec {
        name:         name.to_string(),
        kind:         ScalarKind::Message,
        repeated,
        enum_type:    None,
        message_type: Some(type_ref.to_string()),
    }
}

fn enum_field(name: &str, type_ref: &str) -> FieldSpec {
    FieldSpec {
        name:         name.to_string(),
        kind:         ScalarKind::Enum,
        repeated:     false,
        enum_type:    Some(type_ref.to_string()),
        message_type: None,
    }
}

fn message(qualified: &str, fields: Vec<FieldSpec>) -> MessageSpec {
    MessageSpec {
        qualified: qualified.to_string(),
        fields,
        messages: Vec::new(),
        enums: Vec::new(),
    }
}

/// base.proto: a Timestamp message exercising both 64-bit kinds.
fn base_file() -> SchemaFile {
    SchemaFile {
        name:         "base.proto".to_string(),
        package:      Some("demo.base".to_string()),
        dependencies: Vec::new(),
        messages:     vec![message(
            "demo.base.Timestamp",
            vec![field("seconds", ScalarKind::Int64), field("nanos", ScalarKind::Int32)],
        )],
        enums:        Vec::new(),
    }
}

/// geometry.proto: Point, and a Path with repeated embedded messages, a
/// nested enum, a nested message with a uint64 field, and a cross-file
/// message reference.
fn geometry_file() -> SchemaFile {
    let mut path = message(
        "demo.Path",
        vec![
            message_field("points", "demo.Point", true),
            field("label", ScalarKind::String),
            enum_field("kind", "demo.Path.Kind"),
            message_field("stamp", "demo.base.Timestamp", false),
            message_field("meta", "demo.Path.Meta", false),
        ],
    );
    path.messages = vec![message("demo.Path.Meta", vec![field("id", ScalarKind::Uint64)])];
    path.enums = vec![EnumSpec {
        qualified: "demo.Path.Kind".to_string(),
        values:    vec![
            EnumValue { name: "LINE".to_string(), number: 0 },
            EnumValue { name: "CURVE".to_string(), number: 3 },
        ],
    }];

    SchemaFile {
        name:         "geometry.proto".to_string(),
        package:      Some("demo".to_string()),
        dependencies: vec!["base.proto".to_string()],
        messages:     vec![
            message("demo.Point", vec![field("x", ScalarKind::Int32), field("y", ScalarKind::Int32)]),
            path,
        ],
        enums:        vec![EnumSpec {
            qualified: "demo.Style".to_string(),
            values:    vec![
                EnumValue { name: "SOLID".to_string(), number: 0 },
                EnumValue { name: "DASHED".to_string(), number: 1 },
            ],
        }],
    }
}

fn demo_set() -> SchemaSet {
    SchemaSet { files: vec![base_file(), geometry_file()] }
}

fn unit_file(set: &SchemaSet, file: &str, type_name: &str, artifact: &str) -> String {
    let units = generate_file(set, file, &GeneratorOptions::default()).expect("generate_file failed");
    let unit = units
        .iter()
        .find(|u| u.type_name == type_name)
        .unwrap_or_else(|| panic!("no unit for {}", type_name));
    unit.files
        .iter()
        .find(|f| f.name == artifact)
        .unwrap_or_else(|| panic!("no artifact {} for {}", artifact, type_name))
        .content
        .clone()
}

#[test]
fn test_generates_one_unit_per_top_level_type() {
    let set = demo_set();
    let units = generate_file(&set, "geometry.proto", &GeneratorOptions::default()).unwrap();

    let names: Vec<&str> = units.iter().map(|u| u.type_name.as_str()).collect();
    assert_eq!(names, vec!["demo.Point", "demo.Path", "demo.Style"]);

    let path_unit = &units[1];
    let artifacts: Vec<&str> = path_unit.files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(artifacts, vec!["Path.xs", "Path.pm", "Path.typemap", "Path.pod"]);

    // Top-level enums only get a constants module.
    let style_unit = &units[2];
    assert_eq!(style_unit.files.len(), 1);
    assert_eq!(style_unit.files[0].name, "Style.pm");
}

#[test]
fn test_accessor_surface_per_field() {
    let set = demo_set();
    let xs = unit_file(&set, "geometry.proto", "demo.Path", "Path.xs");

    // Repeated: size query, clear, index-aware get, add.
    assert!(xs.contains("points_size(svTHIS)"));
    assert!(xs.contains("clear_points(svTHIS)"));
    assert!(xs.contains("points(svTHIS, ...)"));
    assert!(xs.contains("add_points(svTHIS, svVAL)"));

    // Singular: presence query, clear, get, set.
    assert!(xs.contains("has_label(svTHIS)"));
    assert!(xs.contains("clear_label(svTHIS)"));
    assert!(xs.contains("set_label(svTHIS, svVAL)"));
}

#[test]
fn test_repeated_get_is_bounds_checked() {
    let set = demo_set();
    let xs = unit_file(&set, "geometry.proto", "demo.Path", "Path.xs");

    assert!(xs.contains("if ( items == 2 ) {\n      index = SvIV(ST(1));"));
    assert!(xs.contains("croak(\"Usage: demo::Path::points(CLASS, [index])\");"));
    assert!(xs.contains("} else if ( index >= 0 &&\n                  index < THIS->points_size() ) {"));
    assert!(xs.contains("PUSHs(&PL_sv_undef);"));
}

#[test]
fn test_sixty_four_bit_fields_travel_as_decimal_strings() {
    let set = demo_set();

    let timestamp_xs = unit_file(&set, "base.proto", "demo.base.Timestamp", "Timestamp.xs");
    assert!(timestamp_xs.contains("lval = strtoll((svVAL) ? svVAL : \"\", NULL, 0);"));
    assert!(timestamp_xs.contains("ostringstream ost;"));
    assert!(timestamp_xs.contains("ost << THIS->seconds();"));

    // The nested Meta message carries the unsigned variant.
    let path_xs = unit_file(&set, "geometry.proto", "demo.Path", "Path.xs");
    assert!(path_xs.contains("lval = strtoull((svVAL) ? svVAL : \"\", NULL, 0);"));
}

#[test]
fn test_enum_setter_validates_and_drops_by_default() {
    let set = demo_set();
    let xs = unit_file(&set, "geometry.proto", "demo.Path", "Path.xs");

    assert!(xs.contains("if ( ::demo::Path_Kind_IsValid(svVAL) ) {"));
    assert!(xs.contains("THIS->set_kind((::demo::Path_Kind)svVAL);"));
    assert!(!xs.contains("croak(\"invalid value for kind\")"));
}

#[test]
fn test_enum_setter_croaks_under_strict_policy() {
    let set = demo_set();
    let units = generate_file(&set, "geometry.proto", &GeneratorOptions::strict()).unwrap();
    let xs = &units[1].files[0].content;

    assert!(xs.contains("croak(\"invalid value for kind\")"));
    assert!(xs.contains("croak(\"points is not an array reference\")"));
}

#[test]
fn test_embedded_messages_move_by_deep_copy() {
    let set = demo_set();
    let xs = unit_file(&set, "geometry.proto", "demo.Path", "Path.xs");

    // add path copies the caller's value in...
    assert!(xs.contains("::demo::Point * mval = THIS->add_points();\n      mval->CopyFrom(*VAL);"));
    // ...and the getter hands out a copy, never the stored instance.
    assert!(xs.contains("val = new ::demo::Point;"));
    assert!(xs.contains("val->CopyFrom(THIS->points(index));"));
    assert!(xs.contains("sv_setref_pv(sv, \"demo::Point\", (void *)val);"));

    // A singular message getter answers undef while the field is unset.
    assert!(xs.contains("if ( THIS->has_stamp() ) {"));
}

#[test]
fn test_flatten_emits_no_key_for_unset_fields() {
    let set = demo_set();
    let xs = unit_file(&set, "geometry.proto", "demo.Path", "Path.xs");

    assert!(xs.contains("if ( msg0->points_size() > 0 ) {"));
    assert!(xs.contains("if ( msg0->has_label() ) {"));
    assert!(xs.contains("hv_store(hv0, \"points\", sizeof(\"points\") - 1, sv0, 0);"));
}

#[test]
fn test_unflatten_skips_missing_keys_and_appends_per_entry() {
    let set = demo_set();
    let xs = unit_file(&set, "geometry.proto", "demo.Path", "Path.xs");

    assert!(xs.contains("if ( (sv1 = hv_fetch(hv0, \"points\", sizeof(\"points\") - 1, 0)) != NULL ) {"));
    assert!(xs.contains("for ( int i1 = 0; i1 <= av_len(av1); i1++ ) {"));
    assert!(xs.contains("::demo::Point * msg2 = msg0->add_points();"));
}

#[test]
fn test_intermediate_names_are_depth_scoped() {
    // A three-level chain: Outer -> Mid -> Leaf.
    let mut outer = message("demo.Outer", vec![message_field("child", "demo.Outer.Mid", false)]);
    let mut mid = message("demo.Outer.Mid", vec![message_field("child", "demo.Outer.Mid.Leaf", false)]);
    mid.messages = vec![message("demo.Outer.Mid.Leaf", vec![field("v", ScalarKind::Int32)])];
    outer.messages = vec![mid];

    let set = SchemaSet {
        files: vec![SchemaFile {
            name:         "deep.proto".to_string(),
            package:      Some("demo".to_string()),
            dependencies: Vec::new(),
            messages:     vec![outer],
            enums:        Vec::new(),
        }],
    };

    let xs = unit_file(&set, "deep.proto", "demo.Outer", "Outer.xs");

    // Each nesting level steps the counter by two; no name recurs at a
    // different level.
    assert!(xs.contains("msg2 = msg0->mutable_child()"));
    assert!(xs.contains("msg4 = msg2->mutable_child()"));
    assert!(!xs.contains("msg6"));
    assert!(xs.contains("if ( msg4->has_v() )"));

    // The same holds for the hash and reference intermediates.
    assert!(xs.contains("HV * hv2 = newHV();"));
    assert!(xs.contains("HV * hv4 = newHV();"));
}

#[test]
fn test_typedefs_are_deduplicated_across_dependency_paths() {
    // Two files both import base.proto; a third imports both.  The
    // Timestamp typedef must appear exactly once in the closure walk.
    let left = SchemaFile {
        name:         "left.proto".to_string(),
        package:      Some("left".to_string()),
        dependencies: vec!["base.proto".to_string()],
        messages:     vec![message("left.L", vec![message_field("stamp", "demo.base.Timestamp", false)])],
        enums:        Vec::new(),
    };
    let right = SchemaFile {
        name:         "right.proto".to_string(),
        package:      Some("right".to_string()),
        dependencies: vec!["base.proto".to_string()],
        messages:     vec![message("right.R", vec![message_field("stamp", "demo.base.Timestamp", false)])],
        enums:        Vec::new(),
    };
    let top = SchemaFile {
        name:         "top.proto".to_string(),
        package:      Some("top".to_string()),
        dependencies: vec!["left.proto".to_string(), "right.proto".to_string()],
        messages:     vec![message(
            "top.T",
            vec![
                message_field("l", "left.L", false),
                message_field("r", "right.R", false),
            ],
        )],
        enums:        Vec::new(),
    };
    let set = SchemaSet { files: vec![base_file(), left, right, top] };
    let xs = unit_file(&set, "top.proto", "top.T", "T.xs");

    let typedef = "typedef ::demo::base::Timestamp __demo__base__Timestamp;";
    assert_eq!(xs.matches(typedef).count(), 1);
}

#[test]
fn test_constructor_accepts_hashref_or_bytes() {
    let set = demo_set();
    let xs = unit_file(&set, "geometry.proto", "demo.Path", "Path.xs");

    assert!(xs.contains("::demo::Path::new (...)"));
    assert!(xs.contains("rv = __demo__Path_from_hashref(ST(1));"));
    assert!(xs.contains("rv->ParseFromArray(str, len);"));
    assert!(xs.contains("sv_setref_pv(RETVAL, \"demo::Path\", (void *)rv);"));
}

#[test]
fn test_common_method_set_is_complete() {
    let set = demo_set();
    let xs = unit_file(&set, "geometry.proto", "demo.Path", "Path.xs");

    for method in [
        "copy_from(svTHIS, sv)",
        "merge_from(svTHIS, sv)",
        "clear(svTHIS)",
        "is_initialized(svTHIS)",
        "error_string(svTHIS)",
        "discard_unknown_fields(svTHIS)",
        "debug_string(svTHIS)",
        "short_debug_string(svTHIS)",
        "unpack(svTHIS, arg)",
        "pack(svTHIS)",
        "length(svTHIS)",
        "fields(svTHIS)",
        "to_hashref(svTHIS)",
    ] {
        assert!(xs.contains(method), "missing common method {}", method);
    }

    // Serialization goes through the per-file zero-copy stream.
    assert!(xs.contains("geometry_OutputStream os(RETVAL);"));
}

#[test]
fn test_nested_packages_are_emitted_before_their_container() {
    let set = demo_set();
    let xs = unit_file(&set, "geometry.proto", "demo.Path", "Path.xs");

    let meta = xs.find("MODULE = demo::Path PACKAGE = demo::Path::Meta").expect("no Meta package");
    let path = xs.find("MODULE = demo::Path PACKAGE = demo::Path\n").expect("no Path package");
    assert!(meta < path);
}

#[test]
fn test_boot_section_exports_nested_enum_constants() {
    let set = demo_set();
    let xs = unit_file(&set, "geometry.proto", "demo.Path", "Path.xs");

    assert!(xs.contains("stash = gv_stashpv(\"demo::Path::Kind\", TRUE);"));
    assert!(xs.contains("newCONSTSUB(stash, \"LINE\", newSViv(::demo::Path::LINE));"));
    assert!(xs.contains("newCONSTSUB(stash, \"CURVE\", newSViv(::demo::Path::CURVE));"));
}

#[test]
fn test_typemap_rule_names_are_stable_and_uppercase() {
    let set = demo_set();
    let typemap = unit_file(&set, "geometry.proto", "demo.Path", "Path.typemap");

    assert!(typemap.contains("TYPEMAP\n"));
    assert!(typemap.contains("__demo__Path *\tT_DEMO_PATH"));
    assert!(typemap.contains("__demo__Path_Meta *\tT_DEMO_PATH_META"));

    // Input direction verifies the handle class and unwraps the pointer.
    assert!(typemap.contains("INPUT\nT_DEMO_PATH_META"));
    assert!(typemap.contains("if (sv_derived_from($arg, \"demo::Path\")) {"));
    assert!(typemap.contains("$var = INT2PTR($type, tmp);"));

    // Output direction wraps a native pointer as a blessed handle.
    assert!(typemap.contains("OUTPUT\nT_DEMO_PATH_META"));
    assert!(typemap.contains("sv_setref_pv($arg, \"demo::Path\", (void*)$var);"));
}

#[test]
fn test_module_wrapper_bootstraps_the_native_glue() {
    let set = demo_set();
    let pm = unit_file(&set, "geometry.proto", "demo.Path", "Path.pm");

    assert!(pm.contains("package demo::Path;"));
    assert!(pm.contains("@ISA = qw(DynaLoader Exporter);"));
    assert!(pm.contains("bootstrap demo::Path $VERSION;"));
}

#[test]
fn test_pod_documents_operations_and_enum_constants() {
    let set = demo_set();
    let pod = unit_file(&set, "geometry.proto", "demo.Path", "Path.pod");

    assert!(pod.contains("demo::Path - Perl/XS interface to demo.Path"));
    assert!(pod.contains("=item B<$Path2-E<gt>copy_from($hashref)>"));
    assert!(pod.contains("=item B<$points_size = $Path-E<gt>points_size()>"));
    assert!(pod.contains("=item B<CURVE>"));
    assert!(pod.contains("This constant has a value of 3."));
    assert!(pod.contains("Each element of C<points_list> will be an instance of demo::Point."));
}

#[test]
fn test_top_level_enum_module_exports_constants() {
    let set = demo_set();
    let pm = unit_file(&set, "geometry.proto", "demo.Style", "Style.pm");

    assert!(pm.contains("package demo::Style;"));
    assert!(pm.contains("use constant SOLID => 0;"));
    assert!(pm.contains("use constant DASHED => 1;"));
    assert!(pm.contains("demo::Style - Perl interface to demo.Style"));
}

#[test]
fn test_generation_fails_on_broken_closure() {
    let mut set = demo_set();
    // Second declaration of demo.Point.
    set.files[1]
        .messages
        .push(message("demo.Point", Vec::new()));

    let err = generate_file(&set, "geometry.proto", &GeneratorOptions::default()).unwrap_err();
    assert!(err.to_string().contains("demo.Point"));
}

#[test]
fn test_descriptor_set_round_trips_through_json() {
    let json = r#"
    {
      "files": [
        {
          "name": "demo.proto",
          "package": "demo",
          "messages": [
            { "qualified": "demo.Point",
              "fields": [
                { "name": "x", "kind": "int32" },
                { "name": "y", "kind": "int32" } ] },
            { "qualified": "demo.Path",
              "fields": [
                { "name": "points", "kind": "message", "repeated": true,
                  "message_type": "demo.Point" } ] }
          ]
        }
      ]
    }
    "#;

    let dir = tempfile::tempdir().expect("tempdir failed");
    let input = dir.path().join("set.json");
    std::fs::write(&input, json).expect("write failed");

    let set = load_schema_set(&input).expect("load_schema_set failed");
    assert_eq!(set.files.len(), 1);
    assert_eq!(set.files[0].messages[1].qualified, "demo.Path");

    let units = generate_file(&set, "demo.proto", &GeneratorOptions::default()).unwrap();
    let out = dir.path().join("out");
    write_units(&units, &out).expect("write_units failed");

    for name in ["Point.xs", "Point.pm", "Path.xs", "Path.pm", "Path.typemap", "Path.pod"] {
        assert!(out.join(name).is_file(), "missing output file {}", name);
    }
}
