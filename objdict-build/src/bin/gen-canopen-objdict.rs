use std::path::PathBuf;

use clap::Parser;
use objdict_build::{
    errors::{CompileError, GenerateError},
    invocation::record_command,
    CodegenOptions, DataTypeTable, TypeDefinition,
};

/// Generate a CANopen object dictionary in C from an EDS file
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Input EDS file
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,
    /// Output header file
    #[arg(long, value_name = "FILE")]
    header: PathBuf,
    /// Output implementation file
    #[arg(long = "impl", value_name = "FILE")]
    impl_file: PathBuf,
    /// Prefix for generated C symbols
    #[arg(short, long, default_value = "objdict")]
    prefix: String,
    /// Define or override a data type (may be repeated)
    #[arg(short = 'd', long = "deftype", value_name = "CODE:CTYPE:BITS")]
    deftypes: Vec<TypeDefinition>,
    /// Zephyr base directory, replaced with $ZEPHYR_BASE in the recorded command
    #[arg(short = 'z', long, value_name = "PATH")]
    zephyr_base: Option<String>,
    /// Build directory, stripped from the recorded command
    #[arg(long, value_name = "PATH")]
    bindir: Option<String>,
}

const PROGRAM: &str = env!("CARGO_BIN_NAME");

fn main() {
    env_logger::init();
    let args = Args::parse();

    let command = record_command(
        std::env::args_os().map(|a| a.to_string_lossy().into_owned()),
        args.zephyr_base.as_deref(),
        args.bindir.as_deref(),
    );
    let types = DataTypeTable::builder()
        .define_all(args.deftypes.iter().cloned())
        .build();
    let options = CodegenOptions {
        prefix: &args.prefix,
        command: &command,
        types: &types,
    };

    match objdict_build::compile_eds(&args.input, &args.header, &args.impl_file, &options) {
        Ok(()) => log::info!(
            "Wrote {} and {}",
            args.header.display(),
            args.impl_file.display()
        ),
        Err(e) => {
            let input = args.input.display();
            match e {
                CompileError::Generate {
                    source: GenerateError::UnknownDataType { source },
                } => eprintln!(
                    "{PROGRAM}: {input}: object {:04x}h subindex {}: unknown data type 0x{:04x}",
                    source.index, source.subindex, source.data_type
                ),
                e => eprintln!("{PROGRAM}: {input}: {e}"),
            }
            std::process::exit(1);
        }
    }
}
