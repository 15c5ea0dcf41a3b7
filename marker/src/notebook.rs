//! In-memory view of a Jupyter notebook.
//!
//! Only the parts needed for assessment are modelled: the ordered cells with
//! their type, source, outputs and execution count. The original JSON is
//! kept for the whole-document comparison.

use std::io::{self, Write};

use serde::Serialize;
use serde_json::ser::Formatter;
use serde_json::{Map, Value};

use crate::error::MarkerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Code,
    Markdown,
    Raw,
}

#[derive(Debug, Clone)]
pub struct Cell {
    pub kind: CellKind,
    pub source: String,
    pub outputs: Vec<Value>,
    pub execution_count: Option<i64>,
}

impl Cell {
    pub fn is_code(&self) -> bool {
        self.kind == CellKind::Code
    }

    pub fn has_error_output(&self) -> bool {
        self.outputs
            .iter()
            .any(|o| o.get("output_type").and_then(Value::as_str) == Some("error"))
    }
}

#[derive(Debug, Clone)]
pub struct Notebook {
    raw: Value,
    cells: Vec<Cell>,
}

impl Notebook {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MarkerError> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| MarkerError::MalformedArtifact(format!("not valid JSON: {e}")))?;
        Self::from_value(value)
    }

    /// Accepts any JSON object with a `cells` array of cell objects.
    pub fn from_value(value: Value) -> Result<Self, MarkerError> {
        let cells_json = value
            .as_object()
            .ok_or_else(|| MarkerError::MalformedArtifact("top level is not an object".into()))?
            .get("cells")
            .and_then(Value::as_array)
            .ok_or_else(|| MarkerError::MalformedArtifact("missing 'cells' array".into()))?;

        let cells = cells_json
            .iter()
            .enumerate()
            .map(|(i, c)| parse_cell(c).map_err(|reason| MarkerError::MalformedArtifact(format!("cell {i}: {reason}"))))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { raw: value, cells })
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// JSON text with object keys in lexicographic order, laid out the way
    /// Python's `json.dumps(doc, sort_keys=True)` writes it, so whole-document
    /// ratios agree with scores produced by existing Python tooling.
    pub fn canonical_text(&self) -> String {
        let mut out = Vec::new();
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, PythonJsonFormatter);
        match sorted(&self.raw).serialize(&mut serializer) {
            Ok(()) => String::from_utf8_lossy(&out).into_owned(),
            Err(e) => {
                tracing::warn!(error = %e, "Falling back to compact notebook serialisation");
                sorted(&self.raw).to_string()
            }
        }
    }

    /// Trimmed lines of code cells that are neither blank nor comments.
    pub fn executable_code(&self) -> String {
        self.cells
            .iter()
            .filter(|c| c.is_code())
            .flat_map(|c| c.source.lines())
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Readable rendering of code and markdown cells, in order.
    pub fn sections(&self) -> String {
        self.cells
            .iter()
            .filter(|c| !c.source.trim().is_empty())
            .filter_map(|c| match c.kind {
                CellKind::Code => Some(format!("```python\n{}\n```", c.source.trim_end())),
                CellKind::Markdown => Some(c.source.trim_end().to_string()),
                CellKind::Raw => None,
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

fn parse_cell(cell: &Value) -> Result<Cell, String> {
    let obj = cell.as_object().ok_or("not an object")?;

    let kind = match obj.get("cell_type").and_then(Value::as_str) {
        Some("code") => CellKind::Code,
        Some("markdown") => CellKind::Markdown,
        Some("raw") => CellKind::Raw,
        Some(other) => return Err(format!("unknown cell_type '{other}'")),
        None => return Err("missing cell_type".into()),
    };

    let source = match obj.get("source") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(parts)) => parts.iter().filter_map(Value::as_str).collect(),
        Some(Value::Null) | None => String::new(),
        Some(_) => return Err("source is neither a string nor a list of strings".into()),
    };

    let outputs = obj
        .get("outputs")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    Ok(Cell {
        kind,
        source,
        outputs,
        execution_count: obj.get("execution_count").and_then(Value::as_i64),
    })
}

/// `", "` and `": "` separators, ASCII-only strings with `\uXXXX` escapes,
/// and Python's float repr (`1e-05`, `1e+20`).
struct PythonJsonFormatter;

impl Formatter for PythonJsonFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        let mut units = [0u16; 2];
        for ch in fragment.chars() {
            if ch.is_ascii() {
                writer.write_all(&[ch as u8])?;
            } else {
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{unit:04x}")?;
                }
            }
        }
        Ok(())
    }

    fn write_f64<W>(&mut self, writer: &mut W, value: f64) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        writer.write_all(python_float_repr(value).as_bytes())
    }
}

/// Rust's `{:?}` picks the same shortest digits and the same switch to
/// scientific notation as Python's `repr`; only the exponent is spelled
/// differently.
fn python_float_repr(value: f64) -> String {
    let repr = format!("{value:?}");
    match repr.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => repr,
    }
}

/// Rebuilds `value` with every object's keys inserted in sorted order.
fn sorted(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let mut out = Map::with_capacity(entries.len());
            for (k, v) in entries {
                out.insert(k.clone(), sorted(v));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(sorted).collect()),
        other => other.clone(),
    }
}
