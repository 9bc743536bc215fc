use clap::{Parser, Subcommand};
use std::path::PathBuf;

use protoxs_compiler::error::CodegenError;
use protoxs_compiler::{
    generate_file, generate_set, load_schema_set, schema_set_to_json, verify_schema_set,
    write_units, GeneratorOptions,
};

#[derive(Parser)]
#[command(name = "protoxs")]
#[command(about = "Generate Perl/XS bindings from a protobuf descriptor set", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate XS glue, module wrappers, typemaps, and POD for every
    /// top-level message in a descriptor set
    Generate {
        /// Input descriptor-set JSON file
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory for the generated artifacts
        #[arg(short, long)]
        out_dir: PathBuf,

        /// Only generate for the named schema file within the set
        #[arg(short, long)]
        file: Option<String>,

        /// Croak on invalid enum values and mismatched hashref shapes
        /// instead of dropping them silently
        #[arg(long)]
        strict: bool,
    },

    /// Verify a descriptor set without generating anything
    Check {
        /// Input descriptor-set JSON file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Pretty-print a descriptor set (useful for inspecting tool output)
    Inspect {
        /// Input descriptor-set JSON file
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn main() -> Result<(), CodegenError> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Generate { input, out_dir, file, strict } => {
            let set = load_schema_set(input)?;
            let options = if *strict {
                GeneratorOptions::strict()
            } else {
                GeneratorOptions::default()
            };

            let units = match file {
                Some(name) => generate_file(&set, name, &options)?,
                None => generate_set(&set, &options)?,
            };

            write_units(&units, out_dir)?;

            for unit in &units {
                for generated in &unit.files {
                    tracing::info!(
                        "wrote {} ({} bytes)",
                        out_dir.join(&generated.name).display(),
                        generated.content.len()
                    );
                }
            }
            println!("Generated {} unit(s) into {}", units.len(), out_dir.display());
            Ok(())
        }

        Commands::Check { input } => {
            let set = load_schema_set(input)?;
            verify_schema_set(&set)?;
            println!("OK: {} file(s) verified", set.files.len());
            Ok(())
        }

        Commands::Inspect { input } => {
            let set = load_schema_set(input)?;
            verify_schema_set(&set)?;
            println!("{}", schema_set_to_json(&set)?);
            Ok(())
        }
    }
}
