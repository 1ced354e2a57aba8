#[macro_use]
extern crate clap;

use clap::Arg;
use std::fs::File;
use std::io::prelude::*;
use std::io::BufReader;
use std::path::{Path, PathBuf};

#[derive(Debug)]
enum IOErrorContext {
    ReadInput,
    WriteOutput,
}

#[derive(Debug)]
enum CliError {
    Assembler(asmips::Error),
    Io(std::io::Error, IOErrorContext, PathBuf),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Io(err, context, path) => write!(
                f,
                "{} file \"{}\" failed: {}",
                match context {
                    IOErrorContext::ReadInput => "reading input",
                    IOErrorContext::WriteOutput => "writing output",
                },
                path.display(),
                err
            ),
            CliError::Assembler(err) => write!(f, "{}", err),
        }
    }
}

fn main() {
    let matches = app_from_crate!()
        .arg(Arg::with_name("INPUT").help("Sets the input file to assemble").required(true).index(1))
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .takes_value(true)
                .value_name("FILE")
                .help("Sets the output ELF32 object file to write"),
        )
        .arg(Arg::with_name("verbose").short("v").long("verbose").help("Enables verbose diagnostics"))
        .get_matches();

    let verbose = matches.is_present("verbose");
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if verbose { "debug" } else { "warn" }),
    )
    .init();

    let input = matches.value_of("INPUT").unwrap();
    let output = matches.value_of("output");

    if let Err(err) = run(input, output) {
        eprintln!("as-mips: {}", err);
        std::process::exit(1);
    }
}

fn run(input: &str, output: Option<&str>) -> Result<(), CliError> {
    let input_path = Path::new(input);

    let input_file = File::open(input_path)
        .map_err(|err| CliError::Io(err, IOErrorContext::ReadInput, input_path.to_owned()))?;
    let mut reader = BufReader::new(input_file);
    let mut source = String::new();
    reader
        .read_to_string(&mut source)
        .map_err(|err| CliError::Io(err, IOErrorContext::ReadInput, input_path.to_owned()))?;

    let object = asmips::assemble(&source).map_err(CliError::Assembler)?;

    let output_path: PathBuf = output.map(PathBuf::from).unwrap_or_else(|| PathBuf::from("./out.elf"));
    std::fs::write(&output_path, &object)
        .map_err(|err| CliError::Io(err, IOErrorContext::WriteOutput, output_path))?;

    Ok(())
}
