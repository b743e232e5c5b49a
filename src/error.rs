//! Error definitions for the admin control-plane.
//!
//! # Responsibilities
//! - One crate-wide error type carrying server name, operation and a
//!   machine-checkable kind
//! - Keep validation/authorization failures distinguishable from
//!   configuration-state failures
//! - Sanitize unexpected failures (class + message, never a raw backtrace)
//!
//! # Design Decisions
//! - Four top-level kinds: InvalidParameter, NotAuthorized, Configuration,
//!   Unexpected
//! - Configuration errors carry a `ConfigErrorKind` so callers can branch
//!   without parsing messages

use thiserror::Error;

/// Machine-checkable sub-kind for configuration-state errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigErrorKind {
    /// The document configures zero subsystems.
    EmptyConfiguration,
    /// At least one subsystem is configured but repository services is not.
    MissingRepositoryServices,
    /// A fragment needs an event channel but no event bus is configured.
    MissingEventBus,
    /// The document's version tag is not in the compatible set.
    IncompatibleVersion,
    /// The store backend does not support the requested capability.
    UnsupportedOperation,
    /// The store backend failed to read, write or delete a document.
    StoreFailed,
    /// A subsystem's initialize call failed during activation.
    SubsystemStartFailed,
    /// The enterprise event topic failed to start.
    TopicStartFailed,
    /// No stored configuration document exists for the server name.
    UnknownServer,
}

impl ConfigErrorKind {
    /// Stable identifier used in REST error bodies and logs.
    pub fn code(&self) -> &'static str {
        match self {
            ConfigErrorKind::EmptyConfiguration => "EMPTY_CONFIGURATION",
            ConfigErrorKind::MissingRepositoryServices => "MISSING_REPOSITORY_SERVICES",
            ConfigErrorKind::MissingEventBus => "MISSING_EVENT_BUS",
            ConfigErrorKind::IncompatibleVersion => "INCOMPATIBLE_VERSION",
            ConfigErrorKind::UnsupportedOperation => "UNSUPPORTED_OPERATION",
            ConfigErrorKind::StoreFailed => "STORE_FAILED",
            ConfigErrorKind::SubsystemStartFailed => "SUBSYSTEM_START_FAILED",
            ConfigErrorKind::TopicStartFailed => "TOPIC_START_FAILED",
            ConfigErrorKind::UnknownServer => "UNKNOWN_SERVER",
        }
    }
}

impl std::fmt::Display for ConfigErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Errors raised by admin operations.
///
/// Every variant carries the server name (or `"<platform>"` for
/// platform-wide operations) and the operation name so failures are
/// attributable without extra context.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Malformed or missing required input. Raised before any mutation.
    #[error("invalid parameter in {operation} for server `{server_name}`: {message}")]
    InvalidParameter {
        server_name: String,
        operation: &'static str,
        message: String,
    },

    /// The caller failed a security-verifier check. Raised before any mutation.
    #[error("user `{user_id}` is not authorized for {operation} on server `{server_name}`")]
    NotAuthorized {
        server_name: String,
        operation: &'static str,
        user_id: String,
    },

    /// A structurally valid request that cannot be satisfied given current state.
    #[error("configuration error ({kind}) in {operation} for server `{server_name}`: {message}")]
    Configuration {
        server_name: String,
        operation: &'static str,
        kind: ConfigErrorKind,
        message: String,
    },

    /// Anything else, sanitized to the source's class name and message.
    #[error("unexpected {source_kind} in {operation} for server `{server_name}`: {message}")]
    Unexpected {
        server_name: String,
        operation: &'static str,
        source_kind: String,
        message: String,
    },
}

impl AdminError {
    pub fn invalid_parameter(
        server_name: impl Into<String>,
        operation: &'static str,
        message: impl Into<String>,
    ) -> Self {
        AdminError::InvalidParameter {
            server_name: server_name.into(),
            operation,
            message: message.into(),
        }
    }

    pub fn not_authorized(
        server_name: impl Into<String>,
        operation: &'static str,
        user_id: impl Into<String>,
    ) -> Self {
        AdminError::NotAuthorized {
            server_name: server_name.into(),
            operation,
            user_id: user_id.into(),
        }
    }

    pub fn configuration(
        server_name: impl Into<String>,
        operation: &'static str,
        kind: ConfigErrorKind,
        message: impl Into<String>,
    ) -> Self {
        AdminError::Configuration {
            server_name: server_name.into(),
            operation,
            kind,
            message: message.into(),
        }
    }

    /// Wrap a store I/O failure.
    pub fn store_failed(
        server_name: impl Into<String>,
        operation: &'static str,
        source: impl std::fmt::Display,
    ) -> Self {
        AdminError::Configuration {
            server_name: server_name.into(),
            operation,
            kind: ConfigErrorKind::StoreFailed,
            message: source.to_string(),
        }
    }

    /// Machine-checkable kind for REST responses and assertions.
    pub fn kind_code(&self) -> &'static str {
        match self {
            AdminError::InvalidParameter { .. } => "INVALID_PARAMETER",
            AdminError::NotAuthorized { .. } => "NOT_AUTHORIZED",
            AdminError::Configuration { kind, .. } => kind.code(),
            AdminError::Unexpected { .. } => "UNEXPECTED",
        }
    }

    /// The configuration sub-kind, if this is a configuration error.
    pub fn config_kind(&self) -> Option<ConfigErrorKind> {
        match self {
            AdminError::Configuration { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    pub fn server_name(&self) -> &str {
        match self {
            AdminError::InvalidParameter { server_name, .. }
            | AdminError::NotAuthorized { server_name, .. }
            | AdminError::Configuration { server_name, .. }
            | AdminError::Unexpected { server_name, .. } => server_name,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type AdminResult<T> = Result<T, AdminError>;
