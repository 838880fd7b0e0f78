//! Thin safe wrapper over the interpreter's stack ABI
//!
//! Everything above this module speaks in terms of `LuaState` methods; raw
//! index arithmetic and unsafe calls never leak upward. Each method's net
//! stack effect is part of its contract — the marshaling layers rely on
//! those deltas to keep the stack balanced.

use std::ffi::{CString, c_char, c_int, c_void};
use std::path::Path;

use lualink_domain::{BridgeError, CallErrorKind};
use mlua_sys as ffi;

/// Request all results from a call, however many the function returns.
pub const MULTRET: i32 = ffi::LUA_MULTRET;

/// Interpreter type tag of a stack slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LuaType {
    None,
    Nil,
    Boolean,
    LightUserData,
    Number,
    String,
    Table,
    Function,
    UserData,
    Thread,
}

impl LuaType {
    pub(crate) fn from_code(code: c_int) -> Self {
        match code {
            ffi::LUA_TNIL => Self::Nil,
            ffi::LUA_TBOOLEAN => Self::Boolean,
            ffi::LUA_TLIGHTUSERDATA => Self::LightUserData,
            ffi::LUA_TNUMBER => Self::Number,
            ffi::LUA_TSTRING => Self::String,
            ffi::LUA_TTABLE => Self::Table,
            ffi::LUA_TFUNCTION => Self::Function,
            ffi::LUA_TUSERDATA => Self::UserData,
            ffi::LUA_TTHREAD => Self::Thread,
            _ => Self::None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Nil => "nil",
            Self::Boolean => "boolean",
            Self::LightUserData => "lightuserdata",
            Self::Number => "number",
            Self::String => "string",
            Self::Table => "table",
            Self::Function => "function",
            Self::UserData => "userdata",
            Self::Thread => "thread",
        }
    }
}

impl std::fmt::Display for LuaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Outcome of a chunk load or protected call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Yield,
    RuntimeError,
    SyntaxError,
    MemoryError,
    HandlerError,
    FileError,
}

impl Status {
    pub(crate) fn from_code(code: c_int) -> Self {
        match code {
            ffi::LUA_OK => Self::Ok,
            ffi::LUA_YIELD => Self::Yield,
            ffi::LUA_ERRRUN => Self::RuntimeError,
            ffi::LUA_ERRSYNTAX => Self::SyntaxError,
            ffi::LUA_ERRMEM => Self::MemoryError,
            ffi::LUA_ERRFILE => Self::FileError,
            _ => Self::HandlerError,
        }
    }

    pub fn is_error(&self) -> bool {
        !matches!(self, Self::Ok | Self::Yield)
    }

    /// Map an error status onto the host-side taxonomy.
    pub fn error_kind(&self) -> Option<CallErrorKind> {
        match self {
            Self::Ok | Self::Yield => None,
            Self::RuntimeError => Some(CallErrorKind::Runtime),
            Self::SyntaxError => Some(CallErrorKind::Syntax),
            Self::MemoryError => Some(CallErrorKind::Memory),
            Self::HandlerError => Some(CallErrorKind::Internal),
            Self::FileError => Some(CallErrorKind::FileNotFound),
        }
    }
}

/// One interpreter instance, or a borrowed view of one inside a callback.
///
/// Not `Send`/`Sync`: the interpreter stack is single-threaded by contract
/// and the raw pointer keeps the compiler honest about it.
pub struct LuaState {
    raw: *mut ffi::lua_State,
    owned: bool,
}

impl LuaState {
    /// Create a fresh interpreter with the standard libraries opened.
    pub fn new() -> Result<Self, BridgeError> {
        let raw = unsafe { ffi::luaL_newstate() };
        if raw.is_null() {
            return Err(BridgeError::call(
                CallErrorKind::Memory,
                "cannot allocate interpreter state",
            ));
        }
        unsafe { ffi::luaL_openlibs(raw) };
        Ok(Self { raw, owned: true })
    }

    /// Borrow an existing state, e.g. inside a native callback.
    ///
    /// # Safety
    /// `raw` must be a live `lua_State` and the view must not outlive the
    /// callback invocation it was created for.
    pub unsafe fn from_raw(raw: *mut ffi::lua_State) -> Self {
        Self { raw, owned: false }
    }

    pub(crate) fn raw(&self) -> *mut ffi::lua_State {
        self.raw
    }

    // ---- position arithmetic ----

    /// Current stack depth; also the index of the top slot.
    pub fn top(&self) -> i32 {
        unsafe { ffi::lua_gettop(self.raw) }
    }

    /// Truncate (or nil-extend) the stack to exactly `index` slots.
    /// This is the universal error-recovery primitive.
    pub fn set_top(&mut self, index: i32) {
        unsafe { ffi::lua_settop(self.raw, index) }
    }

    pub fn pop(&mut self, n: i32) {
        unsafe { ffi::lua_settop(self.raw, -n - 1) }
    }

    /// Resolve a possibly-negative index into an absolute position.
    pub fn abs_index(&self, index: i32) -> i32 {
        unsafe { ffi::lua_absindex(self.raw, index) }
    }

    /// Move the top value into `index`, shifting everything above it up.
    pub fn insert(&mut self, index: i32) {
        unsafe { ffi::lua_rotate(self.raw, index, 1) }
    }

    /// Remove the value at `index`, shifting everything above it down.
    pub fn remove(&mut self, index: i32) {
        unsafe {
            ffi::lua_rotate(self.raw, index, -1);
            ffi::lua_settop(self.raw, -2);
        }
    }

    /// Ensure room for `extra` more slots. False means the VM refused.
    pub fn reserve(&mut self, extra: i32) -> bool {
        unsafe { ffi::lua_checkstack(self.raw, extra) != 0 }
    }

    // ---- type queries ----

    pub fn type_of(&self, index: i32) -> LuaType {
        LuaType::from_code(unsafe { ffi::lua_type(self.raw, index) })
    }

    /// Whether the number at `index` carries the integer numeric tag.
    /// Meaningless for non-number slots (returns false).
    pub fn is_integer(&self, index: i32) -> bool {
        unsafe { ffi::lua_isinteger(self.raw, index) != 0 }
    }

    // ---- typed reads ----

    pub fn to_boolean(&self, index: i32) -> bool {
        unsafe { ffi::lua_toboolean(self.raw, index) != 0 }
    }

    pub fn to_integer(&self, index: i32) -> i64 {
        unsafe { ffi::lua_tointegerx(self.raw, index, std::ptr::null_mut()) }
    }

    pub fn to_number(&self, index: i32) -> f64 {
        unsafe { ffi::lua_tonumberx(self.raw, index, std::ptr::null_mut()) }
    }

    /// Read the string at `index`.
    ///
    /// Returns `None` for non-string slots rather than letting the VM
    /// coerce in place: `lua_tolstring` on a number rewrites the slot,
    /// which would corrupt an in-flight `next` traversal.
    pub fn to_str(&self, index: i32) -> Option<String> {
        if self.type_of(index) != LuaType::String {
            return None;
        }
        unsafe {
            let mut len: usize = 0;
            let ptr = ffi::lua_tolstring(self.raw, index, &mut len);
            if ptr.is_null() {
                return None;
            }
            let bytes = std::slice::from_raw_parts(ptr as *const u8, len);
            Some(String::from_utf8_lossy(bytes).into_owned())
        }
    }

    /// Opaque address of a function/table/userdata slot, for diagnostics.
    pub fn to_pointer(&self, index: i32) -> usize {
        unsafe { ffi::lua_topointer(self.raw, index) as usize }
    }

    // ---- typed pushes ----

    pub fn push_nil(&mut self) {
        unsafe { ffi::lua_pushnil(self.raw) }
    }

    pub fn push_boolean(&mut self, value: bool) {
        unsafe { ffi::lua_pushboolean(self.raw, value as c_int) }
    }

    pub fn push_integer(&mut self, value: i64) {
        unsafe { ffi::lua_pushinteger(self.raw, value) }
    }

    pub fn push_number(&mut self, value: f64) {
        unsafe { ffi::lua_pushnumber(self.raw, value) }
    }

    pub fn push_str(&mut self, value: &str) {
        unsafe {
            ffi::lua_pushlstring(self.raw, value.as_ptr() as *const c_char, value.len());
        }
    }

    pub(crate) fn push_c_function(&mut self, func: ffi::lua_CFunction) {
        unsafe { ffi::lua_pushcclosure(self.raw, func, 0) }
    }

    pub(crate) fn push_c_closure(&mut self, func: ffi::lua_CFunction, upvalues: i32) {
        unsafe { ffi::lua_pushcclosure(self.raw, func, upvalues) }
    }

    pub(crate) fn push_light_userdata(&mut self, ptr: *mut c_void) {
        unsafe { ffi::lua_pushlightuserdata(self.raw, ptr) }
    }

    // ---- tables ----

    /// Push a new empty table.
    pub fn new_table(&mut self) {
        unsafe { ffi::lua_createtable(self.raw, 0, 0) }
    }

    /// `t[k] = v` where `t` is at `index` and the stack top holds `k, v`.
    /// Pops both.
    pub fn set_table(&mut self, index: i32) {
        unsafe { ffi::lua_settable(self.raw, index) }
    }

    /// Table iteration primitive: pops the previous key from the top and,
    /// if another element exists, pushes its key and value. Returns false
    /// (pushing nothing) once the table is exhausted.
    pub fn next(&mut self, table_index: i32) -> bool {
        unsafe { ffi::lua_next(self.raw, table_index) != 0 }
    }

    // ---- globals and fields ----

    /// Push the global `name`; returns its type tag. Net stack effect +1.
    pub fn get_global(&mut self, name: &str) -> Result<LuaType, BridgeError> {
        let cname = to_cstring(name)?;
        let code = unsafe { ffi::lua_getglobal(self.raw, cname.as_ptr()) };
        Ok(LuaType::from_code(code))
    }

    /// Pop the top value and store it as the global `name`.
    pub fn set_global(&mut self, name: &str) -> Result<(), BridgeError> {
        let cname = to_cstring(name)?;
        unsafe { ffi::lua_setglobal(self.raw, cname.as_ptr()) };
        Ok(())
    }

    /// Push `t[name]` where `t` is at `index`; returns its type tag.
    pub fn get_field(&mut self, index: i32, name: &str) -> Result<LuaType, BridgeError> {
        let cname = to_cstring(name)?;
        let code = unsafe { ffi::lua_getfield(self.raw, index, cname.as_ptr()) };
        Ok(LuaType::from_code(code))
    }

    /// Pop the top value into `t[name]` where `t` is at `index`.
    pub fn set_field(&mut self, index: i32, name: &str) -> Result<(), BridgeError> {
        let cname = to_cstring(name)?;
        unsafe { ffi::lua_setfield(self.raw, index, cname.as_ptr()) };
        Ok(())
    }

    // ---- chunks and calls ----

    /// Load a chunk from a file without running it. On `Status::Ok` the
    /// compiled function sits on the stack top.
    pub fn load_file(&mut self, path: &Path) -> Result<Status, BridgeError> {
        let text = path.to_string_lossy();
        let cpath = to_cstring(text.as_ref())?;
        let code =
            unsafe { ffi::luaL_loadfilex(self.raw, cpath.as_ptr(), std::ptr::null()) };
        Ok(Status::from_code(code))
    }

    /// Load an in-memory chunk without running it.
    pub fn load_string(&mut self, chunk: &str, name: &str) -> Result<Status, BridgeError> {
        let cname = to_cstring(name)?;
        let code = unsafe {
            ffi::luaL_loadbufferx(
                self.raw,
                chunk.as_ptr() as *const c_char,
                chunk.len(),
                cname.as_ptr(),
                std::ptr::null(),
            )
        };
        Ok(Status::from_code(code))
    }

    /// Raw protected call. `msgh` is the stack index of a message handler,
    /// or 0 for none. Pops the function and arguments; on success pushes
    /// `nresults` results, on failure pushes the error value.
    pub fn pcall(&mut self, nargs: i32, nresults: i32, msgh: i32) -> Status {
        Status::from_code(unsafe { ffi::lua_pcall(self.raw, nargs, nresults, msgh) })
    }
}

impl Drop for LuaState {
    fn drop(&mut self) {
        if self.owned {
            unsafe { ffi::lua_close(self.raw) };
        }
    }
}

fn to_cstring(name: &str) -> Result<CString, BridgeError> {
    CString::new(name).map_err(|_| BridgeError::InvalidName(name.to_string()))
}
