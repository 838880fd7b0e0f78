//! Scalar coercion between stack slots and host values

use lualink_domain::{BridgeError, ScriptValue};

use crate::state::{LuaState, LuaType};

impl LuaState {
    /// Convert the scalar at `index` into a host value.
    ///
    /// The integer/float split is probed from the slot's numeric tag on
    /// every call — the interpreter does not expose it at the type-query
    /// level and the answer must never be cached host-side.
    pub fn read_scalar(&self, index: i32) -> Result<ScriptValue, BridgeError> {
        match self.type_of(index) {
            LuaType::Nil => Ok(ScriptValue::Nil),
            LuaType::Boolean => Ok(ScriptValue::Boolean(self.to_boolean(index))),
            LuaType::Number => {
                if self.is_integer(index) {
                    Ok(ScriptValue::Integer(self.to_integer(index)))
                } else {
                    Ok(ScriptValue::Float(self.to_number(index)))
                }
            }
            LuaType::String => Ok(ScriptValue::String(
                self.to_str(index).unwrap_or_default(),
            )),
            other => Err(BridgeError::TypeMismatch {
                expected: "scalar",
                found: other.name(),
            }),
        }
    }

    /// Push a host scalar onto the stack. Fails fast on composite values —
    /// nothing is ever silently stringified.
    pub fn push_scalar(&mut self, value: &ScriptValue) -> Result<(), BridgeError> {
        match value {
            ScriptValue::Nil => self.push_nil(),
            ScriptValue::Boolean(b) => self.push_boolean(*b),
            ScriptValue::Integer(n) => self.push_integer(*n),
            ScriptValue::Float(n) => self.push_number(*n),
            ScriptValue::String(s) => self.push_str(s),
            other => {
                return Err(BridgeError::UnsupportedValueType {
                    reason: format!("{} is not a scalar", other.type_name()),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lualink_domain::ScriptTable;

    #[test]
    fn test_numeric_classification_probed_per_read() {
        let mut l = LuaState::new().unwrap();
        l.push_integer(80808);
        assert_eq!(l.read_scalar(-1).unwrap(), ScriptValue::Integer(80808));
        l.pop(1);

        l.push_number(7.654);
        assert_eq!(l.read_scalar(-1).unwrap(), ScriptValue::Float(7.654));
        l.pop(1);

        // Integer-valued float keeps the float tag through the VM.
        l.load_string("return 2.0", "chunk").unwrap();
        let status = l.pcall(0, 1, 0);
        assert!(!status.is_error());
        assert_eq!(l.read_scalar(-1).unwrap(), ScriptValue::Float(2.0));
        l.pop(1);
        assert_eq!(l.top(), 0);
    }

    #[test]
    fn test_scalar_roundtrip() {
        let mut l = LuaState::new().unwrap();
        let values = [
            ScriptValue::Nil,
            ScriptValue::Boolean(true),
            ScriptValue::Integer(-3),
            ScriptValue::Float(0.5),
            ScriptValue::from("text with spaces"),
        ];
        for v in &values {
            l.push_scalar(v).unwrap();
            assert_eq!(&l.read_scalar(-1).unwrap(), v);
            l.pop(1);
        }
        assert_eq!(l.top(), 0);
    }

    #[test]
    fn test_push_rejects_composites() {
        let mut l = LuaState::new().unwrap();
        let err = l
            .push_scalar(&ScriptValue::Table(ScriptTable::new()))
            .unwrap_err();
        assert!(matches!(err, BridgeError::UnsupportedValueType { .. }));
        assert_eq!(l.top(), 0);
    }

    #[test]
    fn test_read_scalar_rejects_table() {
        let mut l = LuaState::new().unwrap();
        l.new_table();
        let err = l.read_scalar(-1).unwrap_err();
        assert!(matches!(
            err,
            BridgeError::TypeMismatch {
                expected: "scalar",
                ..
            }
        ));
        l.pop(1);
    }
}
