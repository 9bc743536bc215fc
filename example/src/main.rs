// example/src/main.rs

use protoxs_compiler::error::CodegenError;
use protoxs_compiler::{generate_file, GeneratorOptions};
use protoxs_descriptor::{FieldSpec, MessageSpec, ScalarKind, SchemaFile, SchemaSet};

fn main() -> Result<(), CodegenError> {
    // Build the schema for a tiny geometry file by hand:
    //
    //   message Point { int32 x; int32 y; }
    //   message Path  { repeated Point points; }
    let point = MessageSpec {
        qualified: "demo.Point".to_string(),
        fields:    vec![
            FieldSpec {
                name:         "x".to_string(),
                kind:         ScalarKind::Int32,
                repeated:     false,
                enum_type:    None,
                message_type: None,
            },
            FieldSpec {
                name:         "y".to_string(),
                kind:         ScalarKind::Int32,
                repeated:     false,
                enum_type:    None,
                message_type: None,
            },
        ],
        messages:  Vec::new(),
        enums:     Vec::new(),
    };

    let path = MessageSpec {
        qualified: "demo.Path".to_string(),
        fields:    vec![FieldSpec {
            name:         "points".to_string(),
            kind:         ScalarKind::Message,
            repeated:     true,
            enum_type:    None,
            message_type: Some("demo.Point".to_string()),
        }],
        messages:  Vec::new(),
        enums:     Vec::new(),
    };

    let set = SchemaSet {
        files: vec![SchemaFile {
            name:         "demo.proto".to_string(),
            package:      Some("demo".to_string()),
            dependencies: Vec::new(),
            messages:     vec![point, path],
            enums:        Vec::new(),
        }],
    };

    let units = generate_file(&set, "demo.proto", &GeneratorOptions::default())?;

    for unit in &units {
        println!("==== {} ====", unit.type_name);
        for file in &unit.files {
            println!("---- {} ({} bytes) ----", file.name, file.content.len());
            println!("{}", file.content);
        }
    }

    Ok(())
}
