//! Scalar and composite values crossing the VM boundary

use crate::table::ScriptTable;

/// Opaque reference to a function living inside the interpreter.
///
/// The host cannot call through it; it only records that a function occupied
/// a table slot or result position. The payload is the VM-side address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionHandle(pub usize);

/// A value read from, or destined for, the interpreter stack.
///
/// Numbers are split into `Integer` and `Float` from the source value's
/// numeric tag on every read; the split is never cached host-side.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptValue {
    Nil,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Table(ScriptTable),
    Function(FunctionHandle),
}

impl ScriptValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Boolean(_) => "bool",
            Self::Integer(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Table(_) => "table",
            Self::Function(_) => "function",
        }
    }

    /// True for the types scalar coercion can push directly.
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Self::Table(_) | Self::Function(_))
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&ScriptTable> {
        match self {
            Self::Table(t) => Some(t),
            _ => None,
        }
    }
}

impl std::fmt::Display for ScriptValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nil => write!(f, "nil"),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Integer(n) => write!(f, "{}", n),
            Self::Float(n) => write!(f, "{}", n),
            Self::String(s) => write!(f, "{}", s),
            Self::Table(t) => write!(f, "table({}, {} entries)", t.kind(), t.len()),
            Self::Function(h) => write!(f, "function: {:#x}", h.0),
        }
    }
}

impl From<bool> for ScriptValue {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<i64> for ScriptValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for ScriptValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for ScriptValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for ScriptValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<ScriptTable> for ScriptValue {
    fn from(v: ScriptTable) -> Self {
        Self::Table(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(ScriptValue::Nil.to_string(), "nil");
        assert_eq!(ScriptValue::Integer(80808).to_string(), "80808");
        assert_eq!(ScriptValue::Float(7.654).to_string(), "7.654");
        assert_eq!(ScriptValue::from("abc").to_string(), "abc");
        assert_eq!(
            ScriptValue::Function(FunctionHandle(0x1f)).to_string(),
            "function: 0x1f"
        );
    }

    #[test]
    fn test_accessors() {
        assert_eq!(ScriptValue::Integer(5).as_integer(), Some(5));
        assert_eq!(ScriptValue::Integer(5).as_float(), None);
        assert_eq!(ScriptValue::from("x").as_str(), Some("x"));
        assert!(ScriptValue::Nil.is_scalar());
        assert!(!ScriptValue::Table(ScriptTable::new()).is_scalar());
    }
}
