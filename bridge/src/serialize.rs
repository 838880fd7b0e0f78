//! Table serialization: host `ScriptTable` -> interpreter table
//!
//! The inverse of materialization. Strict by policy: a host value the VM
//! cannot represent fails the whole push before any table is created, so a
//! rejected value never leaves a half-built table on the stack.

use lualink_domain::{BridgeError, CallErrorKind, ScriptTable, ScriptValue, TableKind};

use crate::state::LuaState;

// Slots needed per nesting level during a push: table + key + value, plus
// one spare for the VM's own use.
const SLOTS_PER_LEVEL: i32 = 4;

impl LuaState {
    /// Push `table` as a fresh interpreter table. Net stack effect +1.
    pub fn push_table(&mut self, table: &ScriptTable) -> Result<(), BridgeError> {
        validate(table)?;
        self.push_table_unchecked(table)
    }

    /// Push any host value. Composite values become tables; scalars go
    /// through scalar coercion. Net stack effect +1.
    pub fn push_value(&mut self, value: &ScriptValue) -> Result<(), BridgeError> {
        match value {
            ScriptValue::Table(t) => self.push_table(t),
            other => self.push_scalar(other),
        }
    }

    fn push_table_unchecked(&mut self, table: &ScriptTable) -> Result<(), BridgeError> {
        if !self.reserve(SLOTS_PER_LEVEL) {
            return Err(BridgeError::call(
                CallErrorKind::Memory,
                "interpreter stack exhausted while pushing table",
            ));
        }

        self.new_table();

        if table.kind().is_list() {
            for (i, (_, value)) in table.iter().enumerate() {
                self.push_integer(i as i64 + 1);
                self.push_scalar(value)?;
                self.set_table(-3);
            }
        } else {
            for (key, value) in table.iter() {
                self.push_str(key);
                match value {
                    ScriptValue::Table(nested) => self.push_table_unchecked(nested)?,
                    other => self.push_scalar(other)?,
                }
                self.set_table(-3);
            }
        }

        Ok(())
    }
}

/// Reject anything the strict policy forbids before touching the stack.
fn validate(table: &ScriptTable) -> Result<(), BridgeError> {
    for (key, value) in table.iter() {
        match value {
            ScriptValue::Table(nested) => {
                if table.kind().is_list() {
                    return Err(BridgeError::InconsistentTableShape {
                        reason: format!("list entry {} holds a table", key),
                    });
                }
                validate(nested)?;
            }
            ScriptValue::Function(_) => {
                return Err(BridgeError::UnsupportedValueType {
                    reason: format!("cannot push function handle at key {}", key),
                });
            }
            _ => {}
        }
    }
    if table.kind() == TableKind::Unknown && !table.is_empty() {
        return Err(BridgeError::InconsistentTableShape {
            reason: "table has entries but no shape".to_string(),
        });
    }
    Ok(())
}
