//! Error taxonomy for the binding layer

use thiserror::Error;

/// Classification of a failed chunk load or protected call,
/// derived from the VM status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallErrorKind {
    /// Compile-time script error.
    Syntax,
    /// Script file missing or unreadable.
    FileNotFound,
    /// Error raised during execution. The message carries a traceback.
    Runtime,
    /// VM allocation failure.
    Memory,
    /// Error while running the message handler itself.
    Internal,
}

impl std::fmt::Display for CallErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Syntax => "syntax error",
            Self::FileNotFound => "file not found",
            Self::Runtime => "runtime error",
            Self::Memory => "out of memory",
            Self::Internal => "internal error",
        };
        write!(f, "{}", s)
    }
}

/// Errors surfaced by the binding layer.
///
/// Everything except `StackImbalance` is recoverable: the caller resets the
/// interpreter stack to a known depth and carries on. `StackImbalance` means
/// a bug in calling code, not bad input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BridgeError {
    #[error("expected {expected} but found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("invalid table key type: {found}")]
    InvalidKeyType { found: String },

    #[error("inconsistent table shape: {reason}")]
    InconsistentTableShape { reason: String },

    #[error("unsupported value type: {reason}")]
    UnsupportedValueType { reason: String },

    #[error("{kind}: {message}")]
    Call {
        kind: CallErrorKind,
        message: String,
    },

    #[error("stack size expected {expected} actual {actual}")]
    StackImbalance { expected: i32, actual: i32 },

    #[error("invalid name: {0}")]
    InvalidName(String),

    #[error("native callback re-entered while already running")]
    CallbackReentered,
}

impl BridgeError {
    /// Shorthand for a call-status error.
    pub fn call(kind: CallErrorKind, message: impl Into<String>) -> Self {
        Self::Call {
            kind,
            message: message.into(),
        }
    }

    /// The call-status classification, if this is a call error.
    pub fn call_kind(&self) -> Option<CallErrorKind> {
        match self {
            Self::Call { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}
