//! Core cell and column type model.
//!
//! Every cell of a [`crate::series::Series`] is a [`Value`]. Columns carry a unified
//! [`DataType`] derived from the [`ValueKind`]s of their non-null cells (see [`unify`]).
//! Raw CSV text is classified by [`detect_text`] and parsed by [`parse_cell`].

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::DataError;

static INTEGER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-+]?[0-9]+$").expect("valid integer pattern"));

static FLOAT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[-+]?([0-9]+\.[0-9]*|[0-9]*\.[0-9]+)$").expect("valid float pattern")
});

/// Unified semantic type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DataType {
    /// Every non-null cell is an integer.
    Int64,
    /// Every non-null cell is numeric and at least one is a float.
    Float64,
    /// Every non-null cell is text.
    Utf8,
    /// Text mixed with numbers; cells keep their own kind.
    Mixed,
}

impl DataType {
    /// `true` for [`DataType::Int64`] and [`DataType::Float64`].
    pub fn is_numeric(self) -> bool {
        matches!(self, DataType::Int64 | DataType::Float64)
    }

    pub fn name(self) -> &'static str {
        match self {
            DataType::Int64 => "int64",
            DataType::Float64 => "float64",
            DataType::Utf8 => "utf8",
            DataType::Mixed => "mixed",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DataType {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "int" | "int64" | "integer" => Ok(DataType::Int64),
            "float" | "float64" | "double" => Ok(DataType::Float64),
            "str" | "utf8" | "text" | "string" => Ok(DataType::Utf8),
            "mixed" | "object" => Ok(DataType::Mixed),
            _ => Err(DataError::InvalidMethod {
                kind: "cast",
                name: s.to_owned(),
                expected: "int64, float64, utf8, mixed",
            }),
        }
    }
}

/// Renders an optional column dtype; all-null columns have no dtype.
pub fn dtype_name(dtype: Option<DataType>) -> &'static str {
    dtype.map(DataType::name).unwrap_or("unknown")
}

/// Kind of a single cell, as reported by type detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Int64,
    Float64,
    Utf8,
}

/// A single cell value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Missing value. Never silently equal to zero or the empty string.
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// UTF-8 text.
    Utf8(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Kind of the value as stored; text is not re-detected here (see [`detect`]).
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Int64(_) => ValueKind::Int64,
            Value::Float64(_) => ValueKind::Float64,
            Value::Utf8(_) => ValueKind::Utf8,
        }
    }

    /// Numeric view of the value, `None` for null and text.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int64(v) => Some(*v as f64),
            Value::Float64(v) => Some(*v),
            Value::Null | Value::Utf8(_) => None,
        }
    }

    /// Converts the value to `dtype`. Anything that cannot be converted becomes [`Value::Null`].
    ///
    /// Float to integer conversion truncates toward zero.
    pub fn cast(&self, dtype: DataType) -> Value {
        match (dtype, self) {
            (_, Value::Null) => Value::Null,
            (DataType::Mixed, v) => v.clone(),

            (DataType::Int64, Value::Int64(v)) => Value::Int64(*v),
            (DataType::Int64, Value::Float64(v)) => float_to_int(*v),
            (DataType::Int64, Value::Utf8(s)) => match s.trim().parse::<i64>() {
                Ok(v) => Value::Int64(v),
                Err(_) => Value::Null,
            },

            (DataType::Float64, Value::Int64(v)) => Value::Float64(*v as f64),
            (DataType::Float64, Value::Float64(v)) => Value::Float64(*v),
            (DataType::Float64, Value::Utf8(s)) => match s.trim().parse::<f64>() {
                Ok(v) => Value::Float64(v),
                Err(_) => Value::Null,
            },

            (DataType::Utf8, Value::Utf8(s)) => Value::Utf8(s.clone()),
            (DataType::Utf8, v) => Value::Utf8(v.to_string()),
        }
    }

    /// Hashable identity used for frequency tables and row de-duplication.
    ///
    /// Integral floats share the key of the equal integer (`1.0` and `1` are one value). Other
    /// floats compare by bit pattern, with all NaNs folded together.
    pub fn key(&self) -> ValueKey {
        match self {
            Value::Null => ValueKey::Null,
            Value::Int64(v) => ValueKey::Int64(*v),
            Value::Float64(v) => {
                if v.fract() == 0.0 && *v >= i64::MIN as f64 && *v < i64::MAX as f64 {
                    return ValueKey::Int64(*v as i64);
                }
                let bits = if v.is_nan() {
                    f64::NAN.to_bits()
                } else {
                    v.to_bits()
                };
                ValueKey::Float64(bits)
            }
            Value::Utf8(s) => ValueKey::Utf8(s.clone()),
        }
    }
}

fn float_to_int(v: f64) -> Value {
    let t = v.trunc();
    if t.is_finite() && t >= i64::MIN as f64 && t < i64::MAX as f64 {
        Value::Int64(t as i64)
    } else {
        Value::Null
    }
}

/// Text form of a value as written to CSV. `Null` renders as the empty string.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Int64(v) => write!(f, "{v}"),
            Value::Float64(v) => f.write_str(&format_float(*v)),
            Value::Utf8(s) => f.write_str(s),
        }
    }
}

/// Formats a float so that it re-reads as a float (`3` becomes `3.0`).
pub fn format_float(v: f64) -> String {
    if v.is_nan() {
        return "nan".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let s = v.to_string();
    if s.contains('.') { s } else { format!("{s}.0") }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Utf8(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Utf8(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// See [`Value::key`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueKey {
    Null,
    Int64(i64),
    Float64(u64),
    Utf8(String),
}

/// Classifies raw text: integers, decimals with exactly one `.`, anything else is text.
///
/// Callers map empty cells to null before detection.
pub fn detect_text(text: &str) -> ValueKind {
    if INTEGER_PATTERN.is_match(text) {
        ValueKind::Int64
    } else if FLOAT_PATTERN.is_match(text) {
        ValueKind::Float64
    } else {
        ValueKind::Utf8
    }
}

/// Detects the semantic kind of a value. Typed numbers map to their own kind; text is classified
/// by [`detect_text`].
pub fn detect(value: &Value) -> ValueKind {
    match value {
        Value::Utf8(s) => detect_text(s),
        other => other.kind(),
    }
}

/// Parses one raw cell. Empty text is null; otherwise the cell becomes the kind detected for it.
///
/// Integer-looking text that does not fit in `i64` is kept as a float.
pub fn parse_cell(raw: &str) -> Value {
    if raw.is_empty() {
        return Value::Null;
    }
    match detect_text(raw) {
        ValueKind::Int64 => match raw.parse::<i64>() {
            Ok(v) => Value::Int64(v),
            Err(_) => raw
                .parse::<f64>()
                .map(Value::Float64)
                .unwrap_or_else(|_| Value::Utf8(raw.to_owned())),
        },
        ValueKind::Float64 => raw
            .parse::<f64>()
            .map(Value::Float64)
            .unwrap_or_else(|_| Value::Utf8(raw.to_owned())),
        ValueKind::Utf8 | ValueKind::Null => Value::Utf8(raw.to_owned()),
    }
}

/// Folds one more cell kind into a column dtype.
///
/// Integers widen to floats, text with anything numeric collapses to [`DataType::Mixed`], and
/// nulls never change the result.
pub fn unify(acc: Option<DataType>, kind: ValueKind) -> Option<DataType> {
    let next = match kind {
        ValueKind::Null => return acc,
        ValueKind::Int64 => DataType::Int64,
        ValueKind::Float64 => DataType::Float64,
        ValueKind::Utf8 => DataType::Utf8,
    };
    Some(match (acc, next) {
        (None, t) => t,
        (Some(DataType::Mixed), _) => DataType::Mixed,
        (Some(a), b) if a == b => a,
        (Some(DataType::Int64), DataType::Float64) | (Some(DataType::Float64), DataType::Int64) => {
            DataType::Float64
        }
        _ => DataType::Mixed,
    })
}

/// Unifies the kinds of every value; `None` if all values are null (or there are none).
pub fn unify_all<'a>(values: impl IntoIterator<Item = &'a Value>) -> Option<DataType> {
    values.into_iter().map(Value::kind).fold(None, unify)
}
