//! Command-line interface for qtipack

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
use std::fs;
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
use qtipack::minify::minify_xml;
#[cfg(feature = "cli")]
use qtipack::{Converter, ConverterConfig, Error, ValidationResult};

#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(name = "qtipack")]
#[command(author, version, about = "Convert XML question banks into QTI content packages", long_about = None)]
struct Cli {
    /// XSD schema to validate against (defaults to the bundled schema)
    #[arg(short, long, global = true, value_name = "SCHEMA")]
    schema: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate question banks and package them into a zip archive
    Convert {
        /// Path of the archive to write
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        /// Question bank files
        #[arg(value_name = "INPUT", required = true)]
        inputs: Vec<PathBuf>,
    },

    /// Validate question banks without converting them
    Validate {
        /// Question bank files
        #[arg(value_name = "INPUT", required = true)]
        inputs: Vec<PathBuf>,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Print a minimized copy of a schema
    #[command(name = "minify-schema")]
    MinifySchema {
        /// Schema file (defaults to the bundled schema)
        #[arg(value_name = "SCHEMA")]
        file: Option<PathBuf>,
    },
}

#[cfg(feature = "cli")]
fn main() {
    init_tracing();
    let cli = Cli::parse();

    let config = match cli.schema {
        Some(path) => ConverterConfig::new().with_schema_path(path),
        None => ConverterConfig::new(),
    };

    let result = match cli.command {
        Commands::Convert { output, inputs } => cmd_convert(config, output, inputs),
        Commands::Validate { inputs, json } => cmd_validate(config, inputs, json),
        Commands::MinifySchema { file } => cmd_minify_schema(file),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(feature = "cli")]
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(feature = "cli")]
fn print_failures<'a>(results: impl IntoIterator<Item = &'a ValidationResult>) {
    for result in results {
        println!("✗ {}", result.source);
        for (kind, message) in &result.errors {
            println!("  - [{}] {}", kind, message);
        }
    }
}

#[cfg(feature = "cli")]
fn cmd_convert(
    config: ConverterConfig,
    output: PathBuf,
    inputs: Vec<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let converter = Converter::new(config)?;

    match converter.convert_to_file(&output, &inputs) {
        Ok(report) => {
            println!(
                "✓ Wrote {} item(s) to {}",
                report.item_identifiers.len(),
                output.display()
            );
            Ok(())
        }
        Err(Error::Validation(failed)) => {
            print_failures(&failed);
            println!();
            println!("No archive written: {} of {} input(s) invalid", failed.len(), inputs.len());
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(feature = "cli")]
fn cmd_validate(
    config: ConverterConfig,
    inputs: Vec<PathBuf>,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let converter = Converter::new(config)?;
    let results = converter.validate(&inputs);
    let all_valid = results.values().all(ValidationResult::is_valid);

    if json_output {
        let reports: Vec<&ValidationResult> = results.values().collect();
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for result in results.values().filter(|r| r.is_valid()) {
            println!("✓ {}", result.source);
        }
        print_failures(results.values().filter(|r| !r.is_valid()));
    }

    if !all_valid {
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn cmd_minify_schema(file: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let schema = match file {
        Some(path) => fs::read_to_string(path)?,
        None => qtipack::DEFAULT_SCHEMA.to_string(),
    };
    println!("{}", minify_xml(&schema)?);
    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Rebuild with --features cli");
    std::process::exit(1);
}
