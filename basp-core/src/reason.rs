//! Exit reasons carried by kill-proxy frames.

use serde::{Deserialize, Serialize};

/// Why a remote actor terminated.
///
/// Travels as the typed payload of kill-proxy frames so the receiving
/// runtime can fail local proxies with the original cause. The code is
/// runtime-defined; `0` conventionally means a normal exit.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExitReason {
    /// Runtime-defined error code.
    pub code: u32,
    /// Human-readable description, possibly empty.
    pub message: String,
}

impl ExitReason {
    /// Create a new exit reason.
    pub fn new(code: u32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// A normal (non-error) exit.
    pub fn normal() -> Self {
        Self::default()
    }
}

impl std::fmt::Display for ExitReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.message.is_empty() {
            write!(f, "exit({})", self.code)
        } else {
            write!(f, "exit({}): {}", self.code, self.message)
        }
    }
}
