//! Human-readable stack and table dumps
//!
//! Used for error context and debug logging. `dump_stack` is strictly
//! read-only — rendering must not coerce any slot in place.

use lualink_domain::BridgeError;

use crate::engine::LuaEngine;
use crate::state::LuaType;

impl LuaEngine {
    /// One line per occupied stack slot, bottom first.
    pub fn dump_stack(&self) -> Vec<String> {
        let top = self.state.top();
        if top == 0 {
            return vec!["stack is empty".to_string()];
        }

        (1..=top)
            .map(|i| {
                let t = self.state.type_of(i);
                let rendered = match t {
                    LuaType::String => self.state.to_str(i).unwrap_or_default(),
                    LuaType::Boolean => self.state.to_boolean(i).to_string(),
                    LuaType::Number => {
                        if self.state.is_integer(i) {
                            self.state.to_integer(i).to_string()
                        } else {
                            self.state.to_number(i).to_string()
                        }
                    }
                    LuaType::Nil => "nil".to_string(),
                    _ => format!("{:#x}", self.state.to_pointer(i)),
                };
                format!("[{}]({}):{}", i, t.name(), rendered)
            })
            .collect()
    }

    /// Render the global `name` as indented multi-line text, descending at
    /// most `depth` nested table levels.
    pub fn dump_global(&mut self, name: &str, depth: u32) -> Result<String, BridgeError> {
        let found = self.state.get_global(name)?;
        let text = match found {
            LuaType::Table => self
                .state
                .read_table(-1, depth, false)
                .map(|t| t.render(name, 0)),
            LuaType::Nil => Ok(format!("{}(nil)", name)),
            LuaType::Function | LuaType::UserData | LuaType::LightUserData | LuaType::Thread => {
                Ok(format!(
                    "{}({}):{:#x}",
                    name,
                    found.name(),
                    self.state.to_pointer(-1)
                ))
            }
            _ => self
                .state
                .read_scalar(-1)
                .map(|v| format!("{}({}):{}", name, v.type_name(), v)),
        };
        self.state.pop(1);
        text
    }

    /// Render the globals table itself.
    pub fn dump_globals(&mut self, depth: u32) -> Result<String, BridgeError> {
        self.dump_global("_G", depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dump_stack_renders_each_slot() {
        let mut engine = LuaEngine::new().unwrap();
        engine.state().push_integer(80808);
        engine.state().push_number(7.654);
        engine.state().push_str("abc");
        engine.state().push_boolean(false);
        engine.state().push_nil();

        let lines = engine.dump_stack();
        assert_eq!(
            lines,
            vec![
                "[1](number):80808",
                "[2](number):7.654",
                "[3](string):abc",
                "[4](boolean):false",
                "[5](nil):nil",
            ]
        );

        // Rendering must not have altered any slot.
        assert_eq!(engine.state().type_of(1), LuaType::Number);
        assert!(engine.state().is_integer(1));
        engine.state().set_top(0);
    }

    #[test]
    fn test_dump_stack_empty() {
        let engine = LuaEngine::new().unwrap();
        assert_eq!(engine.dump_stack(), vec!["stack is empty".to_string()]);
    }

    #[test]
    fn test_dump_global_table() {
        let mut engine = LuaEngine::new().unwrap();
        engine
            .exec(
                "cfg = { label = 'probe', levels = { 1.5, 2.25 } }",
                "inline",
            )
            .unwrap();

        let text = engine.dump_global("cfg", 2).unwrap();
        assert!(text.starts_with("cfg(dict):"));
        assert!(text.contains("    label(string):probe"));
        assert!(text.contains("    levels(array):[ 1.5, 2.25 ]"));
        assert!(!engine.check_stack_size(0).unwrap());
    }

    #[test]
    fn test_dump_global_scalar_and_missing() {
        let mut engine = LuaEngine::new().unwrap();
        engine.exec("answer = 42", "inline").unwrap();
        assert_eq!(engine.dump_global("answer", 1).unwrap(), "answer(int):42");
        assert_eq!(engine.dump_global("missing", 1).unwrap(), "missing(nil)");
        assert!(!engine.check_stack_size(0).unwrap());
    }

    #[test]
    fn test_dump_globals_is_depth_bounded() {
        let mut engine = LuaEngine::new().unwrap();
        // _G contains itself; the depth cap keeps this finite.
        let text = engine.dump_globals(1).unwrap();
        assert!(text.contains("_VERSION"));
        assert!(!engine.check_stack_size(0).unwrap());
    }
}
