//! Host-side value model for lualink
//!
//! This crate holds everything the host application sees once a value has
//! crossed the interpreter boundary: scalars, materialized tables, and the
//! error taxonomy. It knows nothing about the VM itself — the raw stack
//! work lives in `lualink-bridge`.

pub mod error;
pub mod table;
pub mod value;

pub use error::{BridgeError, CallErrorKind};
pub use table::{ScriptTable, TableKey, TableKind};
pub use value::{FunctionHandle, ScriptValue};
