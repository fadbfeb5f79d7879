//! The value model generated binders and readers operate on.

use std::fmt;

use serde::{Deserialize, Serialize};
use sqlbind_core::errors::BindError;
use sqlbind_core::symbols::ScalarKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Bytes(_) => "bytes",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Whether the value already has the representation of `kind`.
    fn fits(&self, kind: ScalarKind) -> bool {
        match self {
            Self::Bool(_) => kind == ScalarKind::Bool,
            Self::Int(_) => kind.is_integer(),
            Self::Float(_) => kind.is_floating(),
            Self::Text(_) => kind.is_textual(),
            Self::Bytes(_) => kind == ScalarKind::Binary,
            Self::Null => false,
        }
    }

    /// Convert to the representation of `kind`.
    ///
    /// Strict conversion accepts only values that already fit; otherwise
    /// the usual coercions apply (numeric widening and narrowing, text
    /// parsing, `null` to the default of a non-nullable kind). `None`
    /// passes the value through untouched.
    pub fn convert(self, kind: Option<ScalarKind>, nullable: bool, strict: bool, column: &str) -> Result<Value, BindError> {
        let Some(kind) = kind else {
            return Ok(self);
        };

        if self.is_null() {
            if nullable {
                return Ok(Value::Null);
            }
            if strict {
                return Err(failed(column, &self, kind));
            }
            return Ok(default_for(kind));
        }

        if self.fits(kind) {
            return check_range(self, kind, column);
        }
        if strict {
            return Err(BindError::StrictTypeMismatch {
                column: column.to_string(),
                expected: kind.name().to_string(),
                actual: self.type_name().to_string(),
            });
        }

        let coerced = match (&self, kind) {
            (Value::Float(f), k) if k.is_integer() && f.is_finite() => Some(Value::Int(f.round() as i64)),
            (Value::Bool(b), k) if k.is_integer() => Some(Value::Int(i64::from(*b))),
            (Value::Text(s), k) if k.is_integer() => s.trim().parse::<i64>().ok().map(Value::Int),
            (Value::Int(i), k) if k.is_floating() => Some(Value::Float(*i as f64)),
            (Value::Bool(b), k) if k.is_floating() => Some(Value::Float(if *b { 1.0 } else { 0.0 })),
            (Value::Text(s), k) if k.is_floating() => s.trim().parse::<f64>().ok().map(Value::Float),
            (Value::Int(i), ScalarKind::Bool) => Some(Value::Bool(*i != 0)),
            (Value::Text(s), ScalarKind::Bool) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Some(Value::Bool(true)),
                "false" | "0" => Some(Value::Bool(false)),
                _ => None,
            },
            (Value::Int(i), k) if k.is_textual() => Some(Value::Text(i.to_string())),
            (Value::Float(f), k) if k.is_textual() => Some(Value::Text(f.to_string())),
            (Value::Bool(b), k) if k.is_textual() => Some(Value::Text(b.to_string())),
            (Value::Text(s), ScalarKind::Binary) => Some(Value::Bytes(s.as_bytes().to_vec())),
            _ => None,
        };

        match coerced {
            Some(value) => check_range(value, kind, column),
            None => Err(failed(column, &self, kind)),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => write!(f, "{s:?}"),
            Self::Bytes(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

fn failed(column: &str, value: &Value, kind: ScalarKind) -> BindError {
    BindError::ConversionFailed {
        column: column.to_string(),
        value: value.to_string(),
        target: kind.name().to_string(),
    }
}

fn default_for(kind: ScalarKind) -> Value {
    match kind {
        ScalarKind::Bool => Value::Bool(false),
        k if k.is_integer() => Value::Int(0),
        k if k.is_floating() => Value::Float(0.0),
        ScalarKind::Binary => Value::Bytes(Vec::new()),
        _ => Value::Text(String::new()),
    }
}

fn check_range(value: Value, kind: ScalarKind, column: &str) -> Result<Value, BindError> {
    let Value::Int(i) = value else {
        return Ok(value);
    };
    let in_range = match kind {
        ScalarKind::Byte => u8::try_from(i).is_ok(),
        ScalarKind::Int16 => i16::try_from(i).is_ok(),
        ScalarKind::Int32 => i32::try_from(i).is_ok(),
        _ => true,
    };
    if in_range {
        Ok(value)
    } else {
        Err(failed(column, &value, kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_rejects_mismatch() {
        let err = Value::Text("42".into())
            .convert(Some(ScalarKind::Int32), false, true, "Id")
            .unwrap_err();
        assert!(matches!(err, BindError::StrictTypeMismatch { .. }));
    }

    #[test]
    fn test_lenient_coerces() {
        let v = Value::Text(" 42 ".into()).convert(Some(ScalarKind::Int32), false, false, "Id");
        assert_eq!(v, Ok(Value::Int(42)));
        let v = Value::Int(3).convert(Some(ScalarKind::Double), false, false, "X");
        assert_eq!(v, Ok(Value::Float(3.0)));
        let v = Value::Int(1).convert(Some(ScalarKind::Bool), false, false, "B");
        assert_eq!(v, Ok(Value::Bool(true)));
    }

    #[test]
    fn test_null_handling() {
        assert_eq!(Value::Null.convert(Some(ScalarKind::Int32), true, true, "A"), Ok(Value::Null));
        assert_eq!(Value::Null.convert(Some(ScalarKind::Int32), false, false, "A"), Ok(Value::Int(0)));
        assert!(Value::Null.convert(Some(ScalarKind::Int32), false, true, "A").is_err());
    }

    #[test]
    fn test_range_checked_in_both_modes() {
        assert!(Value::Int(300).convert(Some(ScalarKind::Byte), false, false, "B").is_err());
        assert!(Value::Int(300).convert(Some(ScalarKind::Byte), false, true, "B").is_err());
        assert_eq!(Value::Int(300).convert(Some(ScalarKind::Int16), false, true, "B"), Ok(Value::Int(300)));
    }

    #[test]
    fn test_untyped_passes_through() {
        let v = Value::Bytes(vec![1, 2]);
        assert_eq!(v.clone().convert(None, false, true, "X"), Ok(v));
    }
}
