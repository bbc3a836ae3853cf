//! Reference compiler adapter.
//!
//! The trusted compiler is CPython. Each snippet is handed to a short helper
//! script over stdin and the code object comes back as JSON on stdout.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use code_object::{CodeObject, Constant, Mode, SNIPPET_FILENAME};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{GenError, Result};

/// Output of one reference compilation.
#[derive(Debug, Clone, PartialEq)]
pub struct Compiled {
    pub code: CodeObject,
    /// Listing from the reference disassembler for `code`.
    pub disassembly: String,
}

/// Seam around the trusted compiler.
pub trait ReferenceCompiler {
    /// Compile `source` under `mode` with optimisation off and no inherited
    /// compiler flags.
    fn compile(&self, source: &str, mode: Mode) -> Result<Compiled>;

    /// Identifies the compiler build, if known.
    fn describe(&self) -> Option<String> {
        None
    }
}

const HELPER: &str = r#"
import dis
import json
import platform
import sys
import warnings

warnings.simplefilter("ignore")


def const(value):
    if isinstance(value, bool):
        return {"kind": "int", "value": str(int(value))}
    if isinstance(value, int):
        return {"kind": "int", "value": str(value)}
    if isinstance(value, str):
        return {"kind": "str", "value": value}
    if isinstance(value, float):
        return {"kind": "float", "value": repr(value)}
    if value is None:
        return {"kind": "none"}
    return {"kind": "other", "value": repr(value)}


def main():
    if sys.argv[1:] == ["--version"]:
        print(platform.python_implementation(), platform.python_version())
        return
    request = json.load(sys.stdin)
    try:
        code = compile(
            request["source"],
            request["filename"],
            request["mode"],
            dont_inherit=True,
            optimize=0,
        )
    except Exception as err:
        json.dump({"error": "%s: %s" % (type(err).__name__, err)}, sys.stdout)
        return
    lnotab = getattr(code, "co_lnotab", None)
    if lnotab is None:
        lnotab = code.co_linetable
    json.dump(
        {
            "argcount": code.co_argcount,
            "kwonlyargcount": code.co_kwonlyargcount,
            "nlocals": code.co_nlocals,
            "stacksize": code.co_stacksize,
            "flags": code.co_flags,
            "code": code.co_code.hex(),
            "consts": [const(c) for c in code.co_consts],
            "names": list(code.co_names),
            "varnames": list(code.co_varnames),
            "freevars": list(code.co_freevars),
            "cellvars": list(code.co_cellvars),
            "filename": code.co_filename,
            "name": code.co_name,
            "firstlineno": code.co_firstlineno,
            "lnotab": bytes(lnotab).hex(),
            "dis": dis.Bytecode(code).dis(),
        },
        sys.stdout,
    )


main()
"#;

#[derive(Serialize)]
struct Request<'a> {
    source: &'a str,
    mode: Mode,
    filename: &'a str,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Outcome {
    Failed { error: String },
    Compiled(Box<Reply>),
}

#[derive(Deserialize)]
struct Reply {
    argcount: u32,
    kwonlyargcount: u32,
    nlocals: u32,
    stacksize: u32,
    flags: u32,
    code: String,
    consts: Vec<RawConst>,
    names: Vec<String>,
    varnames: Vec<String>,
    freevars: Vec<String>,
    cellvars: Vec<String>,
    filename: String,
    name: String,
    firstlineno: u32,
    lnotab: String,
    dis: String,
}

#[derive(Deserialize, Debug, PartialEq)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
enum RawConst {
    Str(String),
    Int(String),
    Float(String),
    None,
    Other(String),
}

impl RawConst {
    fn into_constant(self, snippet: &str) -> Result<Constant> {
        let unsupported = |repr: String| GenError::UnsupportedConstant {
            snippet: snippet.to_string(),
            repr,
        };
        match self {
            RawConst::Str(s) => Ok(Constant::Str(s)),
            RawConst::Int(digits) => digits
                .parse()
                .map(Constant::Int)
                .map_err(|_| unsupported(digits)),
            RawConst::Float(repr) => repr
                .parse()
                .map(Constant::Float)
                .map_err(|_| unsupported(repr)),
            RawConst::None => Ok(Constant::None),
            RawConst::Other(repr) => Err(unsupported(repr)),
        }
    }
}

impl Reply {
    fn into_compiled(self, snippet: &str) -> Result<Compiled> {
        let bytes = |field: &str, text: &str| {
            hex::decode(text).map_err(|err| GenError::Protocol {
                snippet: snippet.to_string(),
                message: format!("field {field}: {err}"),
            })
        };

        let code = CodeObject {
            argcount: self.argcount,
            kwonlyargcount: self.kwonlyargcount,
            nlocals: self.nlocals,
            stacksize: self.stacksize,
            flags: self.flags,
            code: bytes("code", &self.code)?,
            consts: self
                .consts
                .into_iter()
                .map(|raw| raw.into_constant(snippet))
                .collect::<Result<_>>()?,
            names: self.names,
            varnames: self.varnames,
            freevars: self.freevars,
            cellvars: self.cellvars,
            filename: self.filename,
            name: self.name,
            firstlineno: self.firstlineno,
            lnotab: bytes("lnotab", &self.lnotab)?,
        };

        Ok(Compiled {
            code,
            disassembly: self.dis,
        })
    }
}

/// Decode the helper's stdout for `snippet`.
fn decode_reply(stdout: &[u8], snippet: &str, mode: Mode) -> Result<Compiled> {
    let outcome: Outcome =
        serde_json::from_slice(stdout).map_err(|err| GenError::Protocol {
            snippet: snippet.to_string(),
            message: err.to_string(),
        })?;

    match outcome {
        Outcome::Failed { error } => Err(GenError::Compile {
            index: 0,
            snippet: snippet.to_string(),
            mode,
            message: error,
        }),
        Outcome::Compiled(reply) => reply.into_compiled(snippet),
    }
}

/// CPython, driven as a subprocess.
#[derive(Debug, Clone)]
pub struct PythonCompiler {
    program: PathBuf,
    version: Option<String>,
}

impl PythonCompiler {
    /// Resolve `program` on `PATH` and query its version.
    pub fn locate(program: &str) -> Result<Self> {
        let path = which::which(program).map_err(|source| GenError::ProgramNotFound {
            program: program.to_string(),
            source,
        })?;
        let mut compiler = Self::with_path(path);
        compiler.version = compiler.query_version()?;
        debug!(program = %compiler.program.display(), version = ?compiler.version, "reference compiler located");
        Ok(compiler)
    }

    pub fn with_path(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            version: None,
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(["-X", "utf8", "-c", HELPER]);
        cmd.env("PYTHONDONTWRITEBYTECODE", "1");
        cmd
    }

    fn spawn_error(&self, source: std::io::Error) -> GenError {
        GenError::Spawn {
            program: self.program.display().to_string(),
            source,
        }
    }

    fn query_version(&self) -> Result<Option<String>> {
        let output = self
            .command()
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .map_err(|err| self.spawn_error(err))?;

        if !output.status.success() {
            return Ok(None);
        }
        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok((!text.is_empty()).then_some(text))
    }
}

impl ReferenceCompiler for PythonCompiler {
    fn compile(&self, source: &str, mode: Mode) -> Result<Compiled> {
        let request = serde_json::to_vec(&Request {
            source,
            mode,
            filename: SNIPPET_FILENAME,
        })
        .map_err(|err| GenError::Protocol {
            snippet: source.to_string(),
            message: err.to_string(),
        })?;

        let mut child = self
            .command()
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| self.spawn_error(err))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(&request)
                .map_err(|err| self.spawn_error(err))?;
        }

        let output = child
            .wait_with_output()
            .map_err(|err| self.spawn_error(err))?;
        trace!(snippet = source, bytes = output.stdout.len(), "helper replied");

        if !output.status.success() {
            return Err(GenError::Protocol {
                snippet: source.to_string(),
                message: format!(
                    "helper exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        decode_reply(&output.stdout, source, mode)
    }

    fn describe(&self) -> Option<String> {
        self.version.clone()
    }
}
