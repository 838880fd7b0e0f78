//! Table materialization: interpreter table -> host `ScriptTable`
//!
//! One call drains one table level through the `next` iteration primitive,
//! recursing into nested tables with a shrinking depth budget. The depth
//! cap is what makes a self-referential table (the globals table contains
//! itself) terminate instead of exhausting the interpreter stack.

use lualink_domain::{BridgeError, FunctionHandle, ScriptTable, ScriptValue, TableKey};
use tracing::debug;

use crate::state::{LuaState, LuaType};

impl LuaState {
    /// Materialize the table at `index`.
    ///
    /// `max_depth` counts nested table levels still allowed; at 0 a nested
    /// table entry is omitted rather than descended into. Function values
    /// become opaque handles when `include_functions`, else their entries
    /// are omitted. Userdata and thread values are never representable and
    /// are skipped.
    ///
    /// Net stack effect is zero: the table itself stays at `index` and every
    /// key/value pushed during traversal is popped again, including on the
    /// error paths.
    pub fn read_table(
        &mut self,
        index: i32,
        max_depth: u32,
        include_functions: bool,
    ) -> Result<ScriptTable, BridgeError> {
        let found = self.type_of(index);
        if found != LuaType::Table {
            return Err(BridgeError::TypeMismatch {
                expected: "table",
                found: found.name(),
            });
        }

        let table = self.abs_index(index);
        let entry_top = self.top();
        let mut out = ScriptTable::new();

        // Nil key marks the start of iteration; `next` replaces it with the
        // first real key and pushes that key's value.
        self.push_nil();
        while self.next(table) {
            match self.visit_entry(max_depth, include_functions) {
                Ok(Some((key, value))) => {
                    if let Err(e) = out.add(key, value) {
                        self.set_top(entry_top);
                        return Err(e);
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    self.set_top(entry_top);
                    return Err(e);
                }
            }
            // Drop the value; the key stays on top to seed the next step.
            self.pop(1);
        }

        debug_assert_eq!(self.top(), entry_top);
        Ok(out)
    }

    /// Classify the key at -2 and the value at -1. `None` means the entry
    /// is dropped (function/userdata/thread, or depth exhausted).
    fn visit_entry(
        &mut self,
        max_depth: u32,
        include_functions: bool,
    ) -> Result<Option<(TableKey, ScriptValue)>, BridgeError> {
        // Integer keys are read through the numeric accessor, never through
        // string coercion: `lua_tolstring` would rewrite the key slot and
        // derail the iteration.
        let key = match self.type_of(-2) {
            LuaType::Number if self.is_integer(-2) => TableKey::Int(self.to_integer(-2)),
            LuaType::String => TableKey::Str(self.to_str(-2).unwrap_or_default()),
            other => {
                return Err(BridgeError::InvalidKeyType {
                    found: other.name().to_string(),
                });
            }
        };

        let value = match self.type_of(-1) {
            LuaType::Boolean | LuaType::Number | LuaType::String => Some(self.read_scalar(-1)?),
            LuaType::Table => {
                if max_depth > 0 {
                    Some(ScriptValue::Table(self.read_table(
                        -1,
                        max_depth - 1,
                        include_functions,
                    )?))
                } else {
                    debug!(key = %key, "depth budget exhausted, omitting nested table");
                    None
                }
            }
            LuaType::Function => {
                if include_functions {
                    Some(ScriptValue::Function(FunctionHandle(self.to_pointer(-1))))
                } else {
                    None
                }
            }
            other => {
                debug!(key = %key, value_type = other.name(), "omitting unrepresentable value");
                None
            }
        };

        Ok(value.map(|v| (key, v)))
    }
}
