//! Data model for reference-compiled code objects.
//!
//! These types describe what the trusted compiler hands back for a single
//! snippet. The generator transcribes them; nothing here computes bytecode.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Filename every snippet is compiled under.
pub const SNIPPET_FILENAME: &str = "<string>";

/// Compilation context for a snippet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Mode {
    /// A sequence of statements.
    Exec,
    /// A single expression.
    Eval,
    /// One interactive statement.
    Single,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Exec, Mode::Eval, Mode::Single];

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Exec => "exec",
            Mode::Eval => "eval",
            Mode::Single => "single",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMode(pub String);

impl fmt::Display for UnknownMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown compilation mode '{}' (expected exec, eval or single)",
            self.0
        )
    }
}

impl std::error::Error for UnknownMode {}

impl FromStr for Mode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| UnknownMode(s.to_string()))
    }
}

/// One catalogue entry. Its identity is its position in the catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestCase<'a> {
    pub source: &'a str,
    pub mode: Mode,
}

impl<'a> TestCase<'a> {
    pub const fn new(source: &'a str, mode: Mode) -> Self {
        Self { source, mode }
    }

    pub const fn eval(source: &'a str) -> Self {
        Self::new(source, Mode::Eval)
    }
}

/// A constant pool entry.
///
/// The set of kinds is closed: anything else the reference compiler puts in
/// a constant pool is rejected before it reaches a `CodeObject`.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Str(String),
    Int(i64),
    Float(f64),
    None,
}

impl Constant {
    pub fn kind(&self) -> &'static str {
        match self {
            Constant::Str(_) => "str",
            Constant::Int(_) => "int",
            Constant::Float(_) => "float",
            Constant::None => "none",
        }
    }
}

impl From<&str> for Constant {
    fn from(value: &str) -> Self {
        Constant::Str(value.to_string())
    }
}

impl From<i64> for Constant {
    fn from(value: i64) -> Self {
        Constant::Int(value)
    }
}

impl From<f64> for Constant {
    fn from(value: f64) -> Self {
        Constant::Float(value)
    }
}

/// Structural fields of a compiled code object.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CodeObject {
    pub argcount: u32,
    pub kwonlyargcount: u32,
    pub nlocals: u32,
    pub stacksize: u32,
    pub flags: u32,
    /// Raw instruction bytes.
    pub code: Vec<u8>,
    pub consts: Vec<Constant>,
    /// Global and attribute names.
    pub names: Vec<String>,
    pub varnames: Vec<String>,
    pub freevars: Vec<String>,
    pub cellvars: Vec<String>,
    pub filename: String,
    pub name: String,
    pub firstlineno: u32,
    /// Opaque offset-to-line table, carried through unmodified.
    pub lnotab: Vec<u8>,
}

impl CodeObject {
    /// Empty module-level code object compiled from `<string>`.
    pub fn module() -> Self {
        Self {
            filename: SNIPPET_FILENAME.to_string(),
            name: "<module>".to_string(),
            firstlineno: 1,
            ..Self::default()
        }
    }
}
