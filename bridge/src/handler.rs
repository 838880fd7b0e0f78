//! Traceback message handler installed around every protected call
//!
//! The VM's native error objects lose call-site context once the stack
//! unwinds, so the handler formats them into a string with a traceback
//! appended while the erroring frames still exist.

use std::ffi::{CStr, c_char, c_int};

use mlua_sys as ffi;

/// `lua_CFunction` run by the VM when a protected call errors. The error
/// value sits at stack slot 1; whatever is on top when this returns becomes
/// the error the host sees.
pub(crate) unsafe extern "C-unwind" fn traceback_handler(state: *mut ffi::lua_State) -> c_int {
    unsafe {
        let mut len: usize = 0;
        if ffi::lua_type(state, 1) == ffi::LUA_TSTRING {
            let msg = ffi::lua_tolstring(state, 1, &mut len);
            ffi::luaL_traceback(state, state, msg, 1);
            return 1;
        }

        // Non-string error object: honor its __tostring if it has one.
        let tostring = c"__tostring";
        if ffi::luaL_callmeta(state, 1, tostring.as_ptr()) != 0
            && ffi::lua_type(state, -1) == ffi::LUA_TSTRING
        {
            return 1;
        }

        let type_name = CStr::from_ptr(ffi::lua_typename(state, ffi::lua_type(state, 1)));
        let text = format!("(error object is a {} value)", type_name.to_string_lossy());
        ffi::lua_pushlstring(state, text.as_ptr() as *const c_char, text.len());
        let msg = ffi::lua_tolstring(state, -1, &mut len);
        ffi::luaL_traceback(state, state, msg, 1);
    }
    1
}
