//! Error types for the roomlink session core

/// Result type alias using roomlink Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in session coordination operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid configuration parameter
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Member not found in the session registry
    #[error("Member not found: {0}")]
    MemberNotFound(String),

    /// Member already registered in the session
    #[error("Member already registered: {0}")]
    MemberAlreadyRegistered(String),

    /// Operation attempted on a session that has already disconnected
    #[error("Session closed: {0}")]
    SessionClosed(String),

    /// A lifecycle channel was closed before the operation completed
    #[error("Event channel closed: {0}")]
    ChannelClosed(String),

    /// Internal error (should not occur in normal operation)
    #[error("Internal error: {0}")]
    InternalError(String),

    /// Any other error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Check if this error is a configuration error
    pub fn is_config_error(&self) -> bool {
        matches!(self, Error::InvalidConfig(_))
    }

    /// Check if this error is a member-registry error
    pub fn is_member_error(&self) -> bool {
        matches!(
            self,
            Error::MemberNotFound(_) | Error::MemberAlreadyRegistered(_)
        )
    }

    /// Check if this error means the session can no longer be used
    pub fn is_terminal(&self) -> bool {
        matches!(self, Error::SessionClosed(_) | Error::ChannelClosed(_))
    }
}
