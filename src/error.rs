//! Error types for the agent runtime.
//!
//! Errors here follow a strict propagation policy: they are produced by
//! fallible constructors (connecting, loading configuration) and by send
//! paths, and they never cross component boundaries as panics. Per-cycle
//! operations such as `receive()` surface failure as an empty frame instead,
//! because the agent loop is the only place that decides "keep going" vs.
//! "stop".
//!
//! ## Categories
//!
//! - **Connection**: the server socket could not be created or connected.
//!   Fatal for the agent; there is no reconnection path.
//! - **Io**: a transport write failed with something other than a transient
//!   condition (`EINTR` and `EAGAIN` are retried internally).
//! - **Config**: the agent configuration file could not be read or parsed.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for agent runtime operations.
pub type Result<T, E = AgentError> = std::result::Result<T, E>;

/// Main error type for the agent runtime.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AgentError {
    #[error("failed to reach simulation server: {reason}")]
    Connection {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("transport error during {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read configuration file {path}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed configuration file {path}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },
}

impl AgentError {
    /// Returns whether the failure is transient per the transport taxonomy.
    ///
    /// Connection failures are terminal for an agent: a dropped link means
    /// the agent shuts down rather than reconnecting.
    pub fn is_transient(&self) -> bool {
        match self {
            AgentError::Io { source, .. } => matches!(
                source.kind(),
                std::io::ErrorKind::Interrupted
                    | std::io::ErrorKind::WouldBlock
                    | std::io::ErrorKind::TimedOut
            ),
            AgentError::Connection { .. } => false,
            AgentError::ConfigRead { .. } => false,
            AgentError::ConfigParse { .. } => false,
        }
    }

    /// Helper constructor for connection errors.
    pub fn connection_failed(reason: impl Into<String>) -> Self {
        AgentError::Connection { reason: reason.into(), source: None }
    }

    /// Helper constructor for connection errors with a source.
    pub fn connection_failed_with_source(
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        AgentError::Connection { reason: reason.into(), source: Some(source) }
    }

    /// Helper constructor for transport I/O errors with call-site context.
    pub fn io_error(context: impl Into<String>, source: std::io::Error) -> Self {
        AgentError::Io { context: context.into(), source }
    }
}
