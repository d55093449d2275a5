//! m2planet CLI entry point.
//!
//! Thin wrapper around [`m2planet_compiler::compile`]: parses arguments,
//! concatenates the input files into one translation unit, and writes the
//! rendered assembly to `-o` (or stdout).

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use m2planet_codegen::Architecture;

/// A self-hosted, bootstrappable single-pass compiler for a restricted
/// subset of C.
#[derive(Parser)]
#[command(name = "m2planet")]
#[command(about = "Compile a restricted subset of C straight to assembly", long_about = None)]
#[command(version)]
struct Cli {
    /// Target architecture.
    #[arg(long, value_parser = parse_arch)]
    arch: Architecture,

    /// Relax checks the bootstrap build of M2-Planet itself didn't rely on.
    #[arg(long)]
    bootstrap_mode: bool,

    /// Write assembly to this path instead of stdout.
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Raise log verbosity to debug (equivalent to `RUST_LOG=debug`).
    #[arg(long)]
    debug: bool,

    /// Source files, compiled in order as a single translation unit.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

fn parse_arch(s: &str) -> Result<Architecture, String> {
    Architecture::parse(s).ok_or_else(|| format!("unknown architecture '{s}'"))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut builder = env_logger::Builder::from_default_env();
    if cli.debug {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("m2planet: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let source = concatenate_inputs(&cli.inputs)?;
    let first_name = cli.inputs[0].to_string_lossy().into_owned();

    let assembly = m2planet_compiler::compile(&source, &first_name, cli.arch, cli.bootstrap_mode)?;

    match &cli.output {
        Some(path) => {
            let mut f = fs::File::create(path).map_err(|e| format!("{}: {e}", path.display()))?;
            f.write_all(assembly.as_bytes()).map_err(|e| format!("{}: {e}", path.display()))?;
        }
        None => print!("{assembly}"),
    }
    Ok(())
}

/// Joins the input files into one source string, with a synthetic
/// `#FILENAME path 1` directive at each boundary (including the first) so
/// the lexer's own directive handling attributes provenance correctly and
/// [`m2planet_compiler::compile`] only has to be called once per build —
/// globals and functions declared across files land in the same
/// `ParserState` and can see each other, matching how M2-Planet's own
/// multi-file builds are driven.
fn concatenate_inputs(inputs: &[PathBuf]) -> Result<String, String> {
    let mut source = String::new();
    for path in inputs {
        let contents = fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()))?;
        source.push_str(&format!("#FILENAME {} 1\n", path.display()));
        source.push_str(&contents);
        if !contents.ends_with('\n') {
            source.push('\n');
        }
    }
    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn concatenates_files_with_a_filename_directive_at_each_boundary() {
        let dir = tempfile::tempdir().expect("temp dir");
        let a = dir.path().join("a.c");
        let b = dir.path().join("b.c");
        fs::File::create(&a).unwrap().write_all(b"int a;\n").unwrap();
        fs::File::create(&b).unwrap().write_all(b"int b;").unwrap();

        let source = concatenate_inputs(&[a.clone(), b.clone()]).expect("concatenates");
        let directive_a = format!("#FILENAME {} 1", a.display());
        let directive_b = format!("#FILENAME {} 1", b.display());
        let pos_a = source.find(&directive_a).expect("first directive present");
        let pos_b = source.find(&directive_b).expect("second directive present");
        assert!(pos_a < pos_b, "directives out of order:\n{source}");
        assert!(source.ends_with('\n'), "missing trailing newline for file without one:\n{source:?}");
    }

    #[test]
    fn rejects_a_missing_input_file() {
        let err = concatenate_inputs(&[PathBuf::from("/nonexistent/does-not-exist.c")]).unwrap_err();
        assert!(err.contains("does-not-exist.c"), "error should name the file: {err}");
    }
}
