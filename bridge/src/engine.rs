//! Main binding engine — ties together the stack accessor, marshaling
//! layers, call bridge, and native-callback registry.
//!
//! `LuaEngine` owns one interpreter instance. Every public operation is
//! stack-neutral: whatever the VM pushed on its behalf is consumed or
//! truncated before the call returns, including on error paths.

use std::ffi::c_int;
use std::path::{Path, PathBuf};

use lualink_domain::{BridgeError, FunctionHandle, ScriptValue};
use tracing::{debug, error};

use crate::handler::traceback_handler;
use crate::registry::{self, CallbackSlot, NativeFn};
use crate::state::{LuaState, LuaType, MULTRET, Status};

/// Per-instance behavior knobs. Never process-wide: two engines can run
/// with different settings side by side.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Escalate advisory checks (stack-size verification, lenient status
    /// evaluation) to errors instead of logging and continuing.
    pub strict: bool,
    /// Nested table levels materialization may descend before cutting off.
    pub max_depth: u32,
    /// Keep function-valued table entries as opaque handles.
    pub include_functions: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            strict: true,
            max_depth: 8,
            include_functions: false,
        }
    }
}

/// One Lua 5.4 interpreter plus the host-side plumbing around it.
pub struct LuaEngine {
    pub(crate) state: LuaState,
    pub(crate) options: EngineOptions,
    callbacks: Vec<CallbackSlot>,
}

impl LuaEngine {
    pub fn new() -> Result<Self, BridgeError> {
        Self::with_options(EngineOptions::default())
    }

    pub fn with_options(options: EngineOptions) -> Result<Self, BridgeError> {
        Ok(Self {
            state: LuaState::new()?,
            options,
            callbacks: Vec::new(),
        })
    }

    /// Direct access to the stack accessor, for callers driving the
    /// low-level flow themselves.
    pub fn state(&mut self) -> &mut LuaState {
        &mut self.state
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn set_strict(&mut self, strict: bool) {
        self.options.strict = strict;
    }

    // ---- chunk loading and execution ----

    /// Load a file without running it. On success the compiled chunk sits
    /// on the stack top (net effect +1).
    pub fn load_file(&mut self, path: &Path) -> Result<(), BridgeError> {
        let status = self.state.load_file(path)?;
        match self.status_error(status) {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Load and run a file, leaving its results on the stack. Returns how
    /// many results the chunk produced — the module pattern relies on this
    /// being 1 so the returned table can be captured.
    pub fn run_file(&mut self, path: &Path) -> Result<i32, BridgeError> {
        let base = self.state.top();
        self.load_file(path)?;
        let status = self.do_call(0, MULTRET);
        if let Some(e) = self.status_error(status) {
            self.state.set_top(base);
            return Err(e);
        }
        Ok(self.state.top() - base)
    }

    /// Load and run a file, discarding any results. Net stack effect zero.
    pub fn run_script(&mut self, path: &Path) -> Result<(), BridgeError> {
        let base = self.state.top();
        self.run_file(path)?;
        self.state.set_top(base);
        Ok(())
    }

    /// Run an in-memory chunk, discarding results.
    pub fn exec(&mut self, chunk: &str, name: &str) -> Result<(), BridgeError> {
        let base = self.state.top();
        let status = self.state.load_string(chunk, name)?;
        if let Some(e) = self.status_error(status) {
            self.state.set_top(base);
            return Err(e);
        }
        let status = self.do_call(0, 0);
        if let Some(e) = self.status_error(status) {
            self.state.set_top(base);
            return Err(e);
        }
        Ok(())
    }

    // ---- call bridge ----

    /// Protected call with the traceback message handler installed below
    /// the function and its arguments. Expects the function and `nargs`
    /// arguments on the stack top; consumes them like the raw primitive.
    pub fn do_call(&mut self, nargs: i32, nresults: i32) -> Status {
        let fbase = self.state.top() - nargs;
        self.state.push_c_function(traceback_handler);
        self.state.insert(fbase);
        let status = self.state.pcall(nargs, nresults, fbase);
        self.state.remove(fbase);
        status
    }

    /// Call the global function `name` with `args`, collecting `want`
    /// results (`None` = all). Stack-neutral on success and failure.
    pub fn call(
        &mut self,
        name: &str,
        args: &[ScriptValue],
        want: Option<u32>,
    ) -> Result<Vec<ScriptValue>, BridgeError> {
        let base = self.state.top();
        let result = self.call_inner(name, args, want, base);
        if result.is_err() {
            // After a failure the number of leaked slots is not reliably
            // known; truncating to the entry depth is the recovery idiom.
            self.state.set_top(base);
        }
        result
    }

    fn call_inner(
        &mut self,
        name: &str,
        args: &[ScriptValue],
        want: Option<u32>,
        base: i32,
    ) -> Result<Vec<ScriptValue>, BridgeError> {
        let found = self.state.get_global(name)?;
        if found != LuaType::Function {
            return Err(BridgeError::TypeMismatch {
                expected: "function",
                found: found.name(),
            });
        }

        for arg in args {
            self.state.push_value(arg)?;
        }

        debug!(name, nargs = args.len(), "calling script function");
        let nresults = match want {
            Some(n) => n as i32,
            None => MULTRET,
        };
        let status = self.do_call(args.len() as i32, nresults);
        if let Some(e) = self.status_error(status) {
            return Err(e);
        }

        // Results sit in call order, first result deepest.
        let mut results = Vec::new();
        for index in (base + 1)..=self.state.top() {
            results.push(self.read_result(index)?);
        }
        self.state.set_top(base);
        Ok(results)
    }

    fn read_result(&mut self, index: i32) -> Result<ScriptValue, BridgeError> {
        match self.state.type_of(index) {
            LuaType::Table => Ok(ScriptValue::Table(self.state.read_table(
                index,
                self.options.max_depth,
                self.options.include_functions,
            )?)),
            LuaType::Function => Ok(ScriptValue::Function(FunctionHandle(
                self.state.to_pointer(index),
            ))),
            LuaType::UserData | LuaType::LightUserData | LuaType::Thread => {
                Err(BridgeError::UnsupportedValueType {
                    reason: format!("result {} is a {}", index, self.state.type_of(index).name()),
                })
            }
            _ => self.state.read_scalar(index),
        }
    }

    /// Decode an error status into the host taxonomy, consuming the error
    /// value the VM left on the stack. `None` for non-error statuses.
    fn status_error(&mut self, status: Status) -> Option<BridgeError> {
        let kind = status.error_kind()?;
        let message = self.pop_error_message();
        error!(%kind, %message, "lua operation failed");
        Some(BridgeError::call(kind, message))
    }

    fn pop_error_message(&mut self) -> String {
        if self.state.top() == 0 {
            return "no error message".to_string();
        }
        let message = self
            .state
            .to_str(-1)
            .unwrap_or_else(|| format!("({} error value)", self.state.type_of(-1).name()));
        self.state.pop(1);
        message.trim().to_string()
    }

    // ---- globals ----

    /// Read any scalar-or-table global, restoring the stack.
    pub fn get_global_value(&mut self, name: &str) -> Result<ScriptValue, BridgeError> {
        let found = self.state.get_global(name)?;
        let result = match found {
            LuaType::Table => self
                .state
                .read_table(-1, self.options.max_depth, self.options.include_functions)
                .map(ScriptValue::Table),
            LuaType::Function => Ok(ScriptValue::Function(FunctionHandle(
                self.state.to_pointer(-1),
            ))),
            LuaType::UserData | LuaType::LightUserData | LuaType::Thread => {
                Err(BridgeError::UnsupportedValueType {
                    reason: format!("global {} is a {}", name, found.name()),
                })
            }
            _ => self.state.read_scalar(-1),
        };
        self.state.pop(1);
        result
    }

    /// Push `value` and bind it as the global `name`.
    pub fn set_global_value(&mut self, name: &str, value: &ScriptValue) -> Result<(), BridgeError> {
        if name.contains('\0') {
            return Err(BridgeError::InvalidName(name.to_string()));
        }
        self.state.push_value(value)?;
        self.state.set_global(name)
    }

    /// Capture the stack top as the global `name`. Used after `run_file`
    /// on a module-style script to save the returned module table.
    pub fn set_global_from_stack(&mut self, name: &str) -> Result<(), BridgeError> {
        if self.state.top() == 0 {
            return Err(BridgeError::StackImbalance {
                expected: 1,
                actual: 0,
            });
        }
        self.state.set_global(name)
    }

    // ---- helpers ----

    /// Point `package.path` at the given directories (plus the bare `?`
    /// and `?.lua` patterns) so `require` finds scripts there.
    pub fn set_lua_path(&mut self, dirs: &[PathBuf]) -> Result<(), BridgeError> {
        let mut parts: Vec<String> = vec!["?".to_string(), "?.lua".to_string()];
        for dir in dirs {
            parts.push(format!("{}/?.lua", dir.display()).replace('\\', "/"));
        }
        let chunk = format!("package.path = \"{}\"", parts.join(";"));
        self.exec(&chunk, "set_lua_path")
    }

    /// Verify the stack sits at `expected` slots. Returns true when it does
    /// not; a mismatch is a bug in calling code, so under `strict` it is
    /// escalated to `StackImbalance`.
    pub fn check_stack_size(&mut self, expected: i32) -> Result<bool, BridgeError> {
        let actual = self.state.top();
        if actual == expected {
            return Ok(false);
        }
        error!(expected, actual, "stack size check failed");
        if self.options.strict {
            Err(BridgeError::StackImbalance { expected, actual })
        } else {
            Ok(true)
        }
    }

    // ---- native callbacks ----

    /// Register a host function as the global `name`. The closure captures
    /// whatever context it needs; dispatch never goes through a
    /// process-wide instance.
    pub fn register_function(
        &mut self,
        name: &str,
        func: impl FnMut(&mut LuaState) -> Result<c_int, BridgeError> + 'static,
    ) -> Result<(), BridgeError> {
        if name.contains('\0') {
            return Err(BridgeError::InvalidName(name.to_string()));
        }
        let slot = registry::new_slot(func);
        self.state.push_light_userdata(registry::slot_ptr(&slot));
        self.state.push_c_closure(registry::dispatch_native, 1);
        self.callbacks.push(slot);
        self.state.set_global(name)
    }

    /// Register a named table of host functions, the shape scripts expect
    /// from a library: `name.func(...)`.
    pub fn register_library(
        &mut self,
        name: &str,
        funcs: Vec<(String, NativeFn)>,
    ) -> Result<(), BridgeError> {
        if name.contains('\0') || funcs.iter().any(|(f, _)| f.contains('\0')) {
            return Err(BridgeError::InvalidName(name.to_string()));
        }
        self.state.new_table();
        for (fname, func) in funcs {
            let slot = registry::from_boxed(func);
            self.state.push_light_userdata(registry::slot_ptr(&slot));
            self.state.push_c_closure(registry::dispatch_native, 1);
            self.callbacks.push(slot);
            self.state.set_field(-2, &fname)?;
        }
        self.state.set_global(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lualink_domain::{CallErrorKind, ScriptTable, TableKind};
    use std::cell::Cell;
    use std::path::PathBuf;
    use std::rc::Rc;

    const FIXTURE: &str = r#"
g_int = 80808
g_number = 7.654
g_list_int = {2, 56, 98, 2}
g_table = { dev_type = "bing_bong", abool = true, channel = 10 }

function calc(addends, suffix)
    local sum = 0
    for _, v in ipairs(addends) do
        sum = sum + v
    end
    return { sum = sum, str = ">>>" .. tostring(sum) .. suffix .. "<<<" }
end

function multi()
    return 1, 2.5, "three"
end

function force_error()
    error("user forced error")
end
"#;

    fn write_script(dir: &tempfile::TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    fn engine_with_fixture() -> (LuaEngine, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let path = write_script(&dir, "fixture.lua", FIXTURE);
        let mut engine = LuaEngine::new().unwrap();
        engine.run_script(&path).unwrap();
        assert!(!engine.check_stack_size(0).unwrap());
        (engine, dir)
    }

    #[test]
    fn test_run_script_populates_globals() {
        let (mut engine, _dir) = engine_with_fixture();

        assert_eq!(
            engine.get_global_value("g_int").unwrap(),
            ScriptValue::Integer(80808)
        );
        assert_eq!(
            engine.get_global_value("g_number").unwrap(),
            ScriptValue::Float(7.654)
        );

        let list = engine.get_global_value("g_list_int").unwrap();
        let list = list.as_table().unwrap();
        assert_eq!(list.kind(), TableKind::IntList);
        assert_eq!(list.len(), 4);
        assert_eq!(list.get_index(2), Some(&ScriptValue::Integer(98)));

        let table = engine.get_global_value("g_table").unwrap();
        let table = table.as_table().unwrap();
        assert_eq!(table.kind(), TableKind::Dictionary);
        assert_eq!(table.len(), 3);
        assert_eq!(table.get("dev_type"), Some(&ScriptValue::from("bing_bong")));
        assert_eq!(table.get("abool"), Some(&ScriptValue::Boolean(true)));
        assert_eq!(table.get("channel"), Some(&ScriptValue::Integer(10)));

        assert!(!engine.check_stack_size(0).unwrap());
    }

    #[test]
    fn test_call_with_table_and_string_arguments() {
        let (mut engine, _dir) = engine_with_fixture();

        let addends = ScriptTable::from_int_list(&[3901, 488, 922, 1578, 2406]);
        let results = engine
            .call(
                "calc",
                &[ScriptValue::Table(addends), ScriptValue::from("__the_end__")],
                Some(1),
            )
            .unwrap();

        assert_eq!(results.len(), 1);
        let table = results[0].as_table().unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("sum"), Some(&ScriptValue::Integer(9295)));
        assert_eq!(
            table.get("str"),
            Some(&ScriptValue::from(">>>9295__the_end__<<<"))
        );
        assert!(!engine.check_stack_size(0).unwrap());
    }

    #[test]
    fn test_call_collects_all_results_in_call_order() {
        let (mut engine, _dir) = engine_with_fixture();
        let results = engine.call("multi", &[], None).unwrap();
        assert_eq!(
            results,
            vec![
                ScriptValue::Integer(1),
                ScriptValue::Float(2.5),
                ScriptValue::from("three"),
            ]
        );
        assert!(!engine.check_stack_size(0).unwrap());
    }

    #[test]
    fn test_call_pads_missing_results_with_nil() {
        let (mut engine, _dir) = engine_with_fixture();
        let results = engine.call("multi", &[], Some(5)).unwrap();
        assert_eq!(results.len(), 5);
        assert_eq!(results[2], ScriptValue::from("three"));
        assert_eq!(results[3], ScriptValue::Nil);
        assert_eq!(results[4], ScriptValue::Nil);
        assert!(!engine.check_stack_size(0).unwrap());
    }

    #[test]
    fn test_call_rejects_non_function() {
        let (mut engine, _dir) = engine_with_fixture();

        let err = engine.call("g_int", &[], Some(0)).unwrap_err();
        assert_eq!(
            err,
            BridgeError::TypeMismatch {
                expected: "function",
                found: "number"
            }
        );

        let err = engine.call("no_such_function", &[], Some(0)).unwrap_err();
        assert_eq!(
            err,
            BridgeError::TypeMismatch {
                expected: "function",
                found: "nil"
            }
        );
        assert!(!engine.check_stack_size(0).unwrap());
    }

    #[test]
    fn test_runtime_error_recovers_stack_and_carries_traceback() {
        let (mut engine, _dir) = engine_with_fixture();

        let err = engine.call("force_error", &[], Some(0)).unwrap_err();
        assert_eq!(err.call_kind(), Some(CallErrorKind::Runtime));
        let text = err.to_string();
        assert!(text.contains("user forced error"), "got: {}", text);
        assert!(text.contains("stack traceback"), "got: {}", text);
        assert_eq!(engine.state().top(), 0);
    }

    #[test]
    fn test_missing_file_is_file_not_found() {
        let mut engine = LuaEngine::new().unwrap();
        let err = engine
            .run_script(Path::new("/nonexistent/xxxyyyzzz.lua"))
            .unwrap_err();
        assert_eq!(err.call_kind(), Some(CallErrorKind::FileNotFound));
        let text = err.to_string();
        assert!(text.contains("xxxyyyzzz.lua"), "got: {}", text);
        assert!(text.contains("No such file or directory"), "got: {}", text);
        assert!(!engine.check_stack_size(0).unwrap());
    }

    #[test]
    fn test_syntax_error_in_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_script(&dir, "bad.lua", "this is not valid lua {{{{");
        let mut engine = LuaEngine::new().unwrap();

        let err = engine.run_script(&path).unwrap_err();
        assert_eq!(err.call_kind(), Some(CallErrorKind::Syntax));
        assert!(err.to_string().contains("syntax error"), "got: {}", err);
        assert!(!engine.check_stack_size(0).unwrap());
    }

    #[test]
    fn test_exec_runs_chunks_and_reports_errors() {
        let mut engine = LuaEngine::new().unwrap();
        engine.exec("x = 40 + 2", "inline").unwrap();
        assert_eq!(
            engine.get_global_value("x").unwrap(),
            ScriptValue::Integer(42)
        );

        let err = engine.exec("undefined_fn()", "inline").unwrap_err();
        assert_eq!(err.call_kind(), Some(CallErrorKind::Runtime));
        assert!(err.to_string().contains("stack traceback"));
        assert!(!engine.check_stack_size(0).unwrap());
    }

    #[test]
    fn test_set_lua_path_enables_require() {
        let dir = tempfile::tempdir().unwrap();
        write_script(&dir, "answers.lua", "return { value = 42 }");

        let mut engine = LuaEngine::new().unwrap();
        engine.set_lua_path(&[dir.path().to_path_buf()]).unwrap();
        engine.exec("m = require('answers')", "inline").unwrap();

        let m = engine.get_global_value("m").unwrap();
        assert_eq!(
            m.as_table().unwrap().get("value"),
            Some(&ScriptValue::Integer(42))
        );
        assert!(!engine.check_stack_size(0).unwrap());
    }

    #[test]
    fn test_module_script_flow() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_script(
            &dir,
            "mod.lua",
            r#"
local M = {}
M.m_string = "Here I am"
M.m_bool = false
function M.funcmod(s)
    return #s + 3
end
return M
"#,
        );

        let mut engine = LuaEngine::new().unwrap();
        let nresults = engine.run_file(&path).unwrap();
        assert_eq!(nresults, 1);

        engine.set_global_from_stack("mod").unwrap();
        assert!(!engine.check_stack_size(0).unwrap());

        assert_eq!(engine.state().get_global("mod").unwrap(), LuaType::Table);
        assert_eq!(
            engine.state().get_field(-1, "m_string").unwrap(),
            LuaType::String
        );
        assert_eq!(engine.state().to_str(-1).as_deref(), Some("Here I am"));
        engine.state().pop(1);

        // Call a function living inside the module table.
        engine.state().get_field(-1, "funcmod").unwrap();
        engine.state().push_str("az9011 birdie");
        let status = engine.do_call(1, 1);
        assert!(!status.is_error());
        assert_eq!(engine.state().to_integer(-1), 16);
        engine.state().pop(2);
        assert!(!engine.check_stack_size(0).unwrap());
    }

    #[test]
    fn test_run_file_reports_result_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_script(&dir, "pair.lua", "return 7, 'seven'");
        let mut engine = LuaEngine::new().unwrap();

        let nresults = engine.run_file(&path).unwrap();
        assert_eq!(nresults, 2);
        assert_eq!(engine.state().to_integer(-2), 7);
        assert_eq!(engine.state().to_str(-1).as_deref(), Some("seven"));
        engine.state().pop(2);
        assert!(!engine.check_stack_size(0).unwrap());
    }

    #[test]
    fn test_set_global_from_stack_requires_a_value() {
        let mut engine = LuaEngine::new().unwrap();
        let err = engine.set_global_from_stack("anything").unwrap_err();
        assert!(matches!(err, BridgeError::StackImbalance { .. }));
    }

    #[test]
    fn test_register_function_with_captured_context() {
        let mut engine = LuaEngine::new().unwrap();
        let calls = Rc::new(Cell::new(0u32));

        let seen = Rc::clone(&calls);
        engine
            .register_function("host_add", move |l| {
                seen.set(seen.get() + 1);
                let a = l.read_scalar(1)?.as_integer().unwrap_or(0);
                let b = l.read_scalar(2)?.as_integer().unwrap_or(0);
                l.push_integer(a + b);
                Ok(1)
            })
            .unwrap();

        engine.exec("first = host_add(2, 40)", "inline").unwrap();
        engine.exec("second = host_add(first, 8)", "inline").unwrap();

        assert_eq!(
            engine.get_global_value("first").unwrap(),
            ScriptValue::Integer(42)
        );
        assert_eq!(
            engine.get_global_value("second").unwrap(),
            ScriptValue::Integer(50)
        );
        assert_eq!(calls.get(), 2);
        assert!(!engine.check_stack_size(0).unwrap());
    }

    #[test]
    fn test_two_engines_dispatch_callbacks_independently() {
        let mut a = LuaEngine::new().unwrap();
        let mut b = LuaEngine::new().unwrap();

        a.register_function("whoami", |l| {
            l.push_str("engine a");
            Ok(1)
        })
        .unwrap();
        b.register_function("whoami", |l| {
            l.push_str("engine b");
            Ok(1)
        })
        .unwrap();

        a.exec("name = whoami()", "inline").unwrap();
        b.exec("name = whoami()", "inline").unwrap();
        assert_eq!(
            a.get_global_value("name").unwrap(),
            ScriptValue::from("engine a")
        );
        assert_eq!(
            b.get_global_value("name").unwrap(),
            ScriptValue::from("engine b")
        );
    }

    #[test]
    fn test_register_library() {
        let mut engine = LuaEngine::new().unwrap();
        let funcs: Vec<(String, NativeFn)> = vec![
            (
                "double".to_string(),
                Box::new(|l: &mut LuaState| {
                    let n = l.read_scalar(1)?.as_integer().unwrap_or(0);
                    l.push_integer(n * 2);
                    Ok(1)
                }),
            ),
            (
                "greet".to_string(),
                Box::new(|l: &mut LuaState| {
                    l.push_str("hello from the host");
                    Ok(1)
                }),
            ),
        ];
        engine.register_library("api_lib", funcs).unwrap();

        engine.exec("d = api_lib.double(21)", "inline").unwrap();
        engine.exec("g = api_lib.greet()", "inline").unwrap();
        assert_eq!(
            engine.get_global_value("d").unwrap(),
            ScriptValue::Integer(42)
        );
        assert_eq!(
            engine.get_global_value("g").unwrap(),
            ScriptValue::from("hello from the host")
        );
        assert!(!engine.check_stack_size(0).unwrap());
    }

    #[test]
    fn test_callback_error_surfaces_as_runtime_error() {
        let mut engine = LuaEngine::new().unwrap();
        engine
            .register_function("fail_here", |_| {
                Err(BridgeError::UnsupportedValueType {
                    reason: "host rejected the arguments".into(),
                })
            })
            .unwrap();

        let err = engine.call("fail_here", &[], Some(0)).unwrap_err();
        assert_eq!(err.call_kind(), Some(CallErrorKind::Runtime));
        let text = err.to_string();
        assert!(text.contains("host rejected the arguments"), "got: {}", text);
        assert!(text.contains("stack traceback"), "got: {}", text);
        assert_eq!(engine.state().top(), 0);
    }

    #[test]
    fn test_strict_toggle_governs_stack_checks() {
        let mut engine = LuaEngine::new().unwrap();
        engine.state().push_integer(1);

        let err = engine.check_stack_size(0).unwrap_err();
        assert_eq!(
            err,
            BridgeError::StackImbalance {
                expected: 0,
                actual: 1
            }
        );

        engine.set_strict(false);
        assert!(engine.check_stack_size(0).unwrap());

        engine.state().pop(1);
        assert!(!engine.check_stack_size(0).unwrap());
    }

    #[test]
    fn test_set_global_value_roundtrip() {
        let mut engine = LuaEngine::new().unwrap();
        let table = ScriptTable::from_pairs(vec![
            ("name", ScriptValue::from("probe")),
            ("level", ScriptValue::Integer(3)),
        ]);
        engine
            .set_global_value("probe", &ScriptValue::Table(table))
            .unwrap();

        let back = engine.get_global_value("probe").unwrap();
        let back = back.as_table().unwrap();
        // Traversal order out of the VM's hash part is arbitrary, so
        // compare by key.
        assert_eq!(back.len(), 2);
        assert_eq!(back.get("name"), Some(&ScriptValue::from("probe")));
        assert_eq!(back.get("level"), Some(&ScriptValue::Integer(3)));
        assert!(!engine.check_stack_size(0).unwrap());
    }
}
