//! Native callback registration and dispatch
//!
//! Host functions are registered as boxed closures reached through a
//! light-userdata upvalue on a C trampoline. Each closure belongs to the
//! engine instance that registered it — there is no process-wide current
//! instance, so independent interpreters dispatch independently.

use std::cell::RefCell;
use std::ffi::{c_char, c_int, c_void};
use std::panic::{AssertUnwindSafe, catch_unwind};

use lualink_domain::BridgeError;
use mlua_sys as ffi;

use crate::state::LuaState;

/// A host function callable from scripts. It reads its arguments from the
/// stack view and pushes its results, returning how many it pushed.
pub type NativeFn = Box<dyn FnMut(&mut LuaState) -> Result<c_int, BridgeError> + 'static>;

/// Heap slot for one registered callback. Boxed so its address survives the
/// store growing; the `RefCell` turns accidental reentry into an error
/// instead of aliased mutable borrows.
pub(crate) type CallbackSlot = Box<RefCell<NativeFn>>;

pub(crate) fn new_slot(
    func: impl FnMut(&mut LuaState) -> Result<c_int, BridgeError> + 'static,
) -> CallbackSlot {
    Box::new(RefCell::new(Box::new(func)))
}

pub(crate) fn from_boxed(func: NativeFn) -> CallbackSlot {
    Box::new(RefCell::new(func))
}

pub(crate) fn slot_ptr(slot: &CallbackSlot) -> *mut c_void {
    &**slot as *const RefCell<NativeFn> as *mut c_void
}

/// Trampoline the VM invokes for every registered host function. The
/// closure lives behind upvalue 1; failures (including panics) become Lua
/// errors so the surrounding protected call can attach a traceback.
pub(crate) unsafe extern "C-unwind" fn dispatch_native(state: *mut ffi::lua_State) -> c_int {
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        unsafe {
            let ptr =
                ffi::lua_touserdata(state, ffi::lua_upvalueindex(1)) as *const RefCell<NativeFn>;
            let slot = &*ptr;
            let mut view = LuaState::from_raw(state);
            match slot.try_borrow_mut() {
                Ok(mut func) => (*func)(&mut view),
                Err(_) => Err(BridgeError::CallbackReentered),
            }
        }
    }));

    let message = match outcome {
        Ok(Ok(nresults)) => return nresults,
        Ok(Err(e)) => e.to_string(),
        Err(_) => "native callback panicked".to_string(),
    };

    unsafe {
        ffi::lua_pushlstring(state, message.as_ptr() as *const c_char, message.len());
        drop(message);
        ffi::lua_error(state)
    }
}
