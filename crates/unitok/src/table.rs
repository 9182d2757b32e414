//! # Row Input
//!
//! The dataset engine only needs positional access to named columns;
//! any source which implements [`Table`] can be tokenized.
//! [`DataFrame`] is a simple in-memory column store.

use core::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::{
    errors::{UTResult, UnitokError},
    types::UTHashMap,
};

/// A raw cell value, before tokenization.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Missing value.
    #[default]
    Null,

    /// Boolean.
    Bool(bool),

    /// Integer.
    Int(i64),

    /// Floating point.
    Float(f64),

    /// Text.
    Str(String),

    /// A sequence of values.
    List(Vec<Value>),
}

impl Value {
    /// The text, if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The items, if this is a list value.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Interpret as a non-negative integer.
    ///
    /// Accepts integers, integral floats, and decimal strings.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Value::Int(v) => usize::try_from(*v).ok(),
            Value::Float(v) if v.fract() == 0.0 && *v >= 0.0 => Some(*v as usize),
            Value::Str(s) => s.trim().parse().ok(),
            Value::Bool(b) => Some(*b as usize),
            _ => None,
        }
    }

    /// Short name of the variant, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
        }
    }
}

impl Display for Value {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> core::fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write_float(f, *v),
            Value::Str(v) => write!(f, "{v}"),
            Value::List(items) => {
                write!(f, "[")?;
                for (idx, item) in items.iter().enumerate() {
                    write!(f, "{}{item}", if idx == 0 { "" } else { ", " })?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Shortest round-trip digits: positional for exponents in `-4..16` (integral
/// values keep a trailing `.0`), scientific with a signed two-digit exponent
/// otherwise. Non-finite values are `nan`, `inf` and `-inf`.
fn write_float(
    f: &mut Formatter<'_>,
    v: f64,
) -> core::fmt::Result {
    if v.is_nan() {
        return write!(f, "nan");
    }
    if v.is_infinite() {
        return write!(f, "{}", if v < 0.0 { "-inf" } else { "inf" });
    }

    let scientific = format!("{v:e}");
    let (mantissa, exponent) = scientific
        .split_once('e')
        .unwrap_or((scientific.as_str(), "0"));
    let exponent = exponent.parse::<i32>().unwrap_or_default();

    if (-4..16).contains(&exponent) {
        let plain = v.to_string();
        if plain.contains('.') {
            write!(f, "{plain}")
        } else {
            write!(f, "{plain}.0")
        }
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        write!(f, "{mantissa}e{sign}{:02}", exponent.abs())
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

/// Positional access to named columns.
pub trait Table {
    /// The number of rows.
    fn len(&self) -> usize;

    /// True if there are no rows.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Does the column exist?
    fn has_column(
        &self,
        column: &str,
    ) -> bool;

    /// The value at `(column, row)`, if present.
    fn value(
        &self,
        column: &str,
        row: usize,
    ) -> Option<&Value>;
}

/// In-memory column-major table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataFrame {
    names: Vec<String>,
    columns: UTHashMap<String, Vec<Value>>,
    len: usize,
}

impl DataFrame {
    /// Create an empty frame.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a frame from rows of `(column, value)` pairs.
    ///
    /// Columns are ordered by first appearance; missing cells are [`Value::Null`].
    pub fn from_rows<R, I, K, V>(rows: R) -> Self
    where
        R: IntoIterator<Item = I>,
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut frame = Self::new();
        for (row, cells) in rows.into_iter().enumerate() {
            for (name, value) in cells {
                let name = name.into();
                if !frame.columns.contains_key(&name) {
                    frame.names.push(name.clone());
                    frame.columns.insert(name.clone(), vec![Value::Null; row]);
                }
                if let Some(column) = frame.columns.get_mut(&name) {
                    column.resize(row, Value::Null);
                    column.push(value.into());
                }
            }
            frame.len = row + 1;
        }
        for column in frame.columns.values_mut() {
            column.resize(frame.len, Value::Null);
        }
        frame
    }

    /// Add (or replace) a column.
    ///
    /// The first column fixes the row count; later columns must match it.
    pub fn with_column<V: Into<Value>>(
        mut self,
        name: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> UTResult<Self> {
        let name = name.into();
        let values = values.into_iter().map(Into::into).collect::<Vec<_>>();

        if self.names.is_empty() {
            self.len = values.len();
        } else if values.len() != self.len {
            return Err(UnitokError::SampleSizeMismatch {
                expected: self.len,
                actual: values.len(),
            });
        }

        if self.columns.insert(name.clone(), values).is_none() {
            self.names.push(name);
        }
        Ok(self)
    }

    /// Column names, in insertion order.
    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    /// A whole column.
    pub fn column(
        &self,
        name: &str,
    ) -> Option<&[Value]> {
        self.columns.get(name).map(Vec::as_slice)
    }
}

impl Table for DataFrame {
    fn len(&self) -> usize {
        self.len
    }

    fn has_column(
        &self,
        column: &str,
    ) -> bool {
        self.columns.contains_key(column)
    }

    fn value(
        &self,
        column: &str,
        row: usize,
    ) -> Option<&Value> {
        self.columns.get(column).and_then(|values| values.get(row))
    }
}
