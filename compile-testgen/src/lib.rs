//! Generator for the Go compiler's `compile_data_test.go` fixtures.
//!
//! Each catalogue snippet is compiled by the reference compiler, its code
//! object transcribed into a Go `py.Code` literal, and the whole set written
//! as one Go source file.

pub mod catalogue;
pub mod emit;
pub mod error;
pub mod golit;
pub mod reference;

use std::path::PathBuf;

use code_object::TestCase;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

pub use emit::{FixtureLayout, Formatter};
pub use error::{GenError, Result};
pub use reference::{Compiled, PythonCompiler, ReferenceCompiler};

/// Where and how one run writes its output.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub output: PathBuf,
    pub layout: FixtureLayout,
    /// `None` skips the formatting step.
    pub formatter: Option<Formatter>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            output: PathBuf::from(emit::DEFAULT_OUTPUT),
            layout: FixtureLayout::default(),
            formatter: Some(Formatter::default()),
        }
    }
}

/// Run the whole pipeline once: compile, render, write, format.
pub fn generate<C: ReferenceCompiler + ?Sized>(
    cases: &[TestCase<'_>],
    compiler: &C,
    options: &GenerateOptions,
) -> Result<()> {
    info!(cases = cases.len(), "compiling catalogue");
    let body = emit::render(cases, compiler, &options.layout)?;

    emit::write_fixture(&options.output, &body)?;

    if let Some(formatter) = &options.formatter {
        formatter.run(&options.output).inspect_err(|err| {
            error!(
                path = %options.output.display(),
                formatter = formatter.program(),
                error = %err,
                "formatting failed, file left unformatted"
            );
        })?;
    }

    Ok(())
}

/// Install the global fmt subscriber on stderr.
///
/// An explicit `log_level` wins, then `RUST_LOG`, then the verbosity count.
pub fn init_logging(log_level: Option<&str>, verbose: u8) -> anyhow::Result<()> {
    let filter = match log_level {
        Some(level) => EnvFilter::try_new(level)?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(match verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            })
        }),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("failed to install log subscriber: {err}"))
}
