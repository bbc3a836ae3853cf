//! Fixture file assembly, writing and formatting.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use code_object::TestCase;
use tracing::{debug, info};

use crate::error::{GenError, Result};
use crate::golit;
use crate::reference::{Compiled, ReferenceCompiler};

pub const DEFAULT_OUTPUT: &str = "compile_data_test.go";
pub const DEFAULT_FORMATTER: &str = "gofmt";

/// Shape of the generated Go file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureLayout {
    pub package: String,
    /// Import path of the package defining `py.Code`.
    pub py_import: String,
    pub var_name: String,
}

impl Default for FixtureLayout {
    fn default() -> Self {
        Self {
            package: "compile".to_string(),
            py_import: "github.com/ncw/gpython/py".to_string(),
            var_name: "compileTestData".to_string(),
        }
    }
}

impl FixtureLayout {
    fn header(&self, compiler: Option<&str>) -> Vec<String> {
        let mut lines = vec!["// Test data generated by make_compile_test - do not edit".to_string()];
        if let Some(compiler) = compiler {
            lines.push(format!("// Reference compiler: {compiler}"));
        }
        lines.extend([
            String::new(),
            format!("package {}", self.package),
            String::new(),
            "import (".to_string(),
            format!("\"{}\"", self.py_import),
            ")".to_string(),
            String::new(),
            format!("var {} = []struct {{", self.var_name),
            "in   string".to_string(),
            "mode string // exec, eval or single".to_string(),
            format!("out  {}.Code", golit::PY_PACKAGE),
            "dis string".to_string(),
            "}{".to_string(),
        ]);
        lines
    }
}

/// One `{in, mode, out, dis}` element.
pub fn record(case: &TestCase<'_>, compiled: &Compiled) -> Result<String> {
    Ok(format!(
        "{{{}, \"{}\", {}, {}}},",
        golit::string(case.source),
        case.mode,
        golit::code_object(&compiled.code)?,
        golit::string(&compiled.disassembly)
    ))
}

/// Compile every case in order and render the complete file body.
///
/// Nothing touches the filesystem here, so a failing snippet leaves any
/// previous output file as it was.
pub fn render<C: ReferenceCompiler + ?Sized>(
    cases: &[TestCase<'_>],
    compiler: &C,
    layout: &FixtureLayout,
) -> Result<String> {
    let description = compiler.describe();
    let mut out = layout.header(description.as_deref());

    for (index, case) in cases.iter().enumerate() {
        let compiled = compiler
            .compile(case.source, case.mode)
            .map_err(|err| err.at_index(index))?;
        debug!(
            index,
            mode = %case.mode,
            snippet = case.source,
            code_len = compiled.code.code.len(),
            consts = compiled.code.consts.len(),
            "compiled snippet"
        );
        out.push(record(case, &compiled)?);
    }

    out.push("}".to_string());
    let mut body = out.join("\n");
    body.push('\n');
    Ok(body)
}

/// Overwrite `path` with `body`. The handle is flushed and closed on return.
pub fn write_fixture(path: &Path, body: &str) -> Result<()> {
    let io_err = |source| GenError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut file = fs::File::create(path).map_err(io_err)?;
    file.write_all(body.as_bytes()).map_err(io_err)?;
    file.sync_all().map_err(io_err)?;
    info!(path = %path.display(), bytes = body.len(), "fixture written");
    Ok(())
}

/// External canonical formatter, run as `<program> -w <file>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formatter {
    program: String,
}

impl Formatter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn run(&self, path: &Path) -> Result<()> {
        let resolved: PathBuf =
            which::which(&self.program).map_err(|source| GenError::ProgramNotFound {
                program: self.program.clone(),
                source,
            })?;

        let output = Command::new(&resolved)
            .arg("-w")
            .arg(path)
            .output()
            .map_err(|source| GenError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(GenError::Format {
                program: self.program.clone(),
                path: path.to_path_buf(),
                message: format!(
                    "{}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        info!(formatter = %self.program, path = %path.display(), "fixture formatted");
        Ok(())
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new(DEFAULT_FORMATTER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use code_object::{CodeObject, Constant, Mode};

    fn compiled() -> Compiled {
        Compiled {
            code: CodeObject {
                stacksize: 1,
                flags: 64,
                code: vec![0x64, 0x00, 0x53],
                consts: vec![Constant::Str("hello".into())],
                ..CodeObject::module()
            },
            disassembly: "  1           0 LOAD_CONST               0 ('hello')\n\t3 RETURN_VALUE"
                .to_string(),
        }
    }

    #[test]
    fn record_escapes_source_and_disassembly() {
        let case = TestCase::new(r#""hello""#, Mode::Eval);
        let text = record(&case, &compiled()).unwrap();
        assert!(text.starts_with(r#"{"\"hello\"", "eval", py.Code{"#));
        assert!(text.ends_with(r#", "  1           0 LOAD_CONST               0 ('hello')\n\t3 RETURN_VALUE"},"#));
        assert!(text.contains(r#"Consts: []py.Object{py.String("hello")},"#));
    }

    #[test]
    fn header_declares_shape() {
        let header = FixtureLayout::default().header(None).join("\n");
        assert!(header.starts_with("// Test data generated by make_compile_test - do not edit\n\npackage compile\n"));
        assert!(header.contains("\"github.com/ncw/gpython/py\""));
        assert!(header.contains("var compileTestData = []struct {"));
        assert!(header.contains("mode string // exec, eval or single"));
        assert!(header.ends_with("}{"));
    }

    #[test]
    fn header_names_reference_compiler() {
        let header = FixtureLayout::default().header(Some("CPython 3.4.3"));
        assert_eq!(header[1], "// Reference compiler: CPython 3.4.3");
        assert_eq!(header[2], "");
    }

    #[test]
    fn write_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.go");
        fs::write(&path, "old contents that are much longer than the new ones").unwrap();
        write_fixture(&path, "new\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new\n");
    }

    #[test]
    fn write_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.go");
        let err = write_fixture(&path, "x").unwrap_err();
        assert!(matches!(err, GenError::Io { .. }));
    }

    #[test]
    fn missing_formatter_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.go");
        fs::write(&path, "package compile\n").unwrap();
        let err = Formatter::new("definitely-not-a-formatter-3f9a")
            .run(&path)
            .unwrap_err();
        assert!(matches!(err, GenError::ProgramNotFound { .. }));
    }

    #[test]
    fn gofmt_accepts_rendered_file() {
        if which::which(DEFAULT_FORMATTER).is_err() {
            eprintln!("gofmt not found, skipping");
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("compile_data_test.go");
        let mut lines = FixtureLayout::default().header(None);
        lines.push(record(&TestCase::eval(r#""hello""#), &compiled()).unwrap());
        lines.push("}".to_string());
        write_fixture(&path, &(lines.join("\n") + "\n")).unwrap();

        Formatter::default().run(&path).unwrap();
        let formatted = fs::read_to_string(&path).unwrap();
        assert!(formatted.contains("\tin   string\n"));
    }
}
