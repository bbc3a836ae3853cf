//! `make_compile_test`: writes `compile_data_test.go` for the Go compiler tests.

use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::Parser;
use compile_testgen::catalogue::{self, CATALOGUE};
use compile_testgen::emit::{DEFAULT_FORMATTER, DEFAULT_OUTPUT};
use compile_testgen::{
    generate, init_logging, FixtureLayout, Formatter, GenerateOptions, PythonCompiler,
};

/// Compile test fixture generator.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    /// Override log filter (e.g. info, debug, compile_testgen=trace).
    #[arg(long, env = "COMPILE_TESTGEN_LOG")]
    log_level: Option<String>,
    /// Output Go file, overwritten on every run.
    #[arg(
        short,
        long,
        env = "COMPILE_TESTGEN_OUTPUT",
        value_name = "FILE",
        default_value = DEFAULT_OUTPUT
    )]
    output: PathBuf,
    /// Python interpreter used as the reference compiler.
    #[arg(
        long,
        env = "COMPILE_TESTGEN_PYTHON",
        value_name = "PROGRAM",
        default_value = "python3"
    )]
    python: String,
    /// Formatter run on the written file as `<PROGRAM> -w <FILE>`.
    #[arg(
        long,
        env = "COMPILE_TESTGEN_FORMATTER",
        value_name = "PROGRAM",
        default_value = DEFAULT_FORMATTER
    )]
    formatter: String,
    /// Skip the formatting step.
    #[arg(long)]
    no_format: bool,
    /// Print the snippet catalogue and exit.
    #[arg(long)]
    list: bool,
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(&cli) {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    init_logging(cli.log_level.as_deref(), cli.verbose)?;

    if cli.list {
        print!("{}", catalogue::listing(CATALOGUE));
        return Ok(());
    }

    let python = PythonCompiler::locate(&cli.python)
        .with_context(|| format!("locating reference compiler '{}'", cli.python))?;

    let options = GenerateOptions {
        output: cli.output.clone(),
        layout: FixtureLayout::default(),
        formatter: (!cli.no_format).then(|| Formatter::new(cli.formatter.clone())),
    };

    generate(CATALOGUE, &python, &options)
        .with_context(|| format!("generating {}", options.output.display()))?;

    println!("Wrote {}", options.output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_invocation_uses_defaults() {
        let cli = Cli::try_parse_from(["make_compile_test"]).unwrap();
        assert_eq!(cli.output, PathBuf::from("compile_data_test.go"));
        assert_eq!(cli.python, "python3");
        assert_eq!(cli.formatter, "gofmt");
        assert!(!cli.no_format);
        assert!(!cli.list);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "make_compile_test",
            "-vv",
            "-o",
            "out.go",
            "--python",
            "python3.4",
            "--no-format",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.output, PathBuf::from("out.go"));
        assert_eq!(cli.python, "python3.4");
        assert!(cli.no_format);
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
