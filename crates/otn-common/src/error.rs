//! Error types shared by the transport-netmodel crates.
//!
//! All errors implement `std::error::Error` via `thiserror`.

use thiserror::Error;

/// Result type alias for device read operations.
pub type DeviceResult<T> = Result<T, DeviceError>;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while reading from a remote device.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// A read did not complete within the configured timeout.
    /// There is no automatic retry; the caller decides.
    #[error("Device read timed out for node '{node}' at '{path}'")]
    Timeout {
        /// The node being read.
        node: String,
        /// The subtree path of the read.
        path: String,
    },

    /// Transport-level failure (session dropped, malformed reply).
    #[error("Device transport error for node '{node}': {message}")]
    Transport {
        /// The node being read.
        node: String,
        /// Error message.
        message: String,
    },
}

impl DeviceError {
    /// Creates a timeout error.
    pub fn timeout(node: impl Into<String>, path: impl Into<String>) -> Self {
        Self::Timeout {
            node: node.into(),
            path: path.into(),
        }
    }

    /// Creates a transport error.
    pub fn transport(node: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            node: node.into(),
            message: message.into(),
        }
    }
}

/// Errors that can occur in the persistent store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A write could not be committed.
    #[error("Store write failed: {operation}: {message}")]
    Write {
        /// The operation that failed (e.g., "merge-node", "add-link").
        operation: String,
        /// Error message.
        message: String,
    },

    /// The addressed node has no stored mapping set.
    #[error("No mapping set stored for node '{node}'")]
    NodeNotFound {
        /// The node id.
        node: String,
    },
}

impl StoreError {
    /// Creates a write error.
    pub fn write(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Write {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Creates a node-not-found error.
    pub fn node_not_found(node: impl Into<String>) -> Self {
        Self::NodeNotFound { node: node.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_error_display() {
        let err = DeviceError::timeout("ROADM-A", "degree/3");
        assert_eq!(
            err.to_string(),
            "Device read timed out for node 'ROADM-A' at 'degree/3'"
        );
    }

    #[test]
    fn test_store_error_display() {
        let err = StoreError::write("add-link", "backend unavailable");
        assert_eq!(
            err.to_string(),
            "Store write failed: add-link: backend unavailable"
        );
        assert_eq!(
            StoreError::node_not_found("XPDR-1").to_string(),
            "No mapping set stored for node 'XPDR-1'"
        );
    }
}
