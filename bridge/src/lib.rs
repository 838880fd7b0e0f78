//! Lua 5.4 binding layer for lualink
//!
//! The interpreter's only channel for passing values to and from the host
//! is its stack, and every operation here is written against that fact:
//! each public call documents its net stack effect and restores the stack
//! by truncation when anything goes wrong mid-flight.
//!
//! Layering, bottom up:
//! - [`state::LuaState`] — thin safe wrapper over the C ABI stack calls
//! - scalar coercion and table materialization/serialization as `LuaState`
//!   methods ([`coerce`], [`materialize`], [`serialize`])
//! - [`engine::LuaEngine`] — the call bridge, chunk execution, globals
//!   access, native-callback registration, and diagnostics
//!
//! One engine instance belongs to one logical thread; nothing here is
//! `Send` or `Sync` by design.

pub mod coerce;
pub mod dump;
pub mod engine;
mod handler;
pub mod materialize;
pub mod registry;
pub mod serialize;
pub mod state;

pub use engine::{EngineOptions, LuaEngine};
pub use registry::NativeFn;
pub use state::{LuaState, LuaType, MULTRET, Status};

// The domain model is half of the public surface; re-export it the way
// callers expect to consume it.
pub use lualink_domain::{
    BridgeError, CallErrorKind, FunctionHandle, ScriptTable, ScriptValue, TableKey, TableKind,
};
