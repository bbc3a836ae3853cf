//! Go literal rendering for code objects.
//!
//! Every function here is pure: the same value always renders to the same
//! text, which is what keeps regenerated fixture files byte-identical.

use std::fmt::Write as _;

use code_object::{CodeObject, Constant};

use crate::error::{GenError, Result};

/// Go package holding the `Code` and object types the literals construct.
pub const PY_PACKAGE: &str = "py";

/// Escape free-form text for a double-quoted Go string.
///
/// Backslashes go first so the escapes added for quotes, newlines and tabs
/// are not escaped a second time.
pub fn escape(text: &str) -> String {
    text.replace('\\', r"\\")
        .replace('"', r#"\""#)
        .replace('\n', r"\n")
        .replace('\t', r"\t")
}

/// `"text"` with escaping applied.
pub fn string(text: &str) -> String {
    format!("\"{}\"", escape(text))
}

/// A byte string with every byte as a `\xHH` escape, printable or not.
pub fn bytes(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() * 4 + 2);
    out.push('"');
    for byte in data {
        // Writing to a String cannot fail.
        let _ = write!(out, "\\x{byte:02x}");
    }
    out.push('"');
    out
}

/// `[]string{...}` in the given order.
pub fn strings<S: AsRef<str>>(items: &[S]) -> String {
    let body: Vec<String> = items.iter().map(|s| string(s.as_ref())).collect();
    format!("[]string{{{}}}", body.join(","))
}

/// Shortest decimal text that reads back as the same `f64`.
pub fn float(value: f64) -> Result<String> {
    if !value.is_finite() {
        return Err(GenError::NoLiteral {
            what: "float constant",
            value: value.to_string(),
        });
    }
    // Debug keeps a fractional part or exponent, Go accepts both forms.
    Ok(format!("{value:?}"))
}

/// One typed constant construction.
pub fn constant(value: &Constant) -> Result<String> {
    Ok(match value {
        Constant::Str(s) => format!("{PY_PACKAGE}.String({})", string(s)),
        Constant::Int(i) => format!("{PY_PACKAGE}.Int({i})"),
        Constant::Float(f) => format!("{PY_PACKAGE}.Float({})", float(*f)?),
        Constant::None => format!("{PY_PACKAGE}.None"),
    })
}

/// `[]py.Object{...}` for a constant pool.
pub fn constants(pool: &[Constant]) -> Result<String> {
    let body = pool.iter().map(constant).collect::<Result<Vec<_>>>()?;
    Ok(format!("[]{PY_PACKAGE}.Object{{{}}}", body.join(",")))
}

/// `py.Code{...}` with one field per line in the fixed field order.
pub fn code_object(code: &CodeObject) -> Result<String> {
    let fields = [
        ("Argcount", code.argcount.to_string()),
        ("Kwonlyargcount", code.kwonlyargcount.to_string()),
        ("Nlocals", code.nlocals.to_string()),
        ("Stacksize", code.stacksize.to_string()),
        ("Flags", code.flags.to_string()),
        ("Code", bytes(&code.code)),
        ("Consts", constants(&code.consts)?),
        ("Names", strings(&code.names)),
        ("Varnames", strings(&code.varnames)),
        ("Freevars", strings(&code.freevars)),
        ("Cellvars", strings(&code.cellvars)),
        ("Filename", string(&code.filename)),
        ("Name", string(&code.name)),
        ("Firstlineno", code.firstlineno.to_string()),
        ("Lnotab", bytes(&code.lnotab)),
    ];

    let mut lines = Vec::with_capacity(fields.len() + 2);
    lines.push(format!("{PY_PACKAGE}.Code{{"));
    lines.extend(fields.iter().map(|(name, value)| format!("{name}: {value},")));
    lines.push("}".to_string());
    Ok(lines.join("\n"))
}
