//! Error taxonomy for preparing, starting and querying canvas components.

/// Convenience result type used across Easel.
pub type EaselResult<T> = Result<T, EaselError>;

/// Every failure the core can surface.
///
/// Composition and structure errors are raised while preparing a component
/// tree and are never recovered internally. State errors signal misuse,
/// such as querying coordinates before a screen has started.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum EaselError {
    /// A composite holds a child that cannot draw onto a shared surface.
    #[error("composition error: {parent} cannot contain a `{child}` component")]
    Composition { parent: String, child: String },

    /// Embedding markup is malformed or lacks a surface placeholder.
    #[error("structure error: {0}")]
    Structure(String),

    /// An operation was invoked in the wrong lifecycle state.
    #[error("state error: {0}")]
    State(String),

    /// Declarative configuration could not be read.
    #[error("config error: {0}")]
    Config(String),

    /// The host environment refused an operation.
    #[error("host error: {0}")]
    Host(String),
}

impl EaselError {
    /// Build an [`EaselError::Composition`] value.
    pub fn composition(parent: impl Into<String>, child: impl Into<String>) -> Self {
        Self::Composition {
            parent: parent.into(),
            child: child.into(),
        }
    }

    /// Build an [`EaselError::Structure`] value.
    pub fn structure(msg: impl Into<String>) -> Self {
        Self::Structure(msg.into())
    }

    /// Build an [`EaselError::State`] value.
    pub fn state(msg: impl Into<String>) -> Self {
        Self::State(msg.into())
    }

    /// Build an [`EaselError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build an [`EaselError::Host`] value.
    pub fn host(msg: impl Into<String>) -> Self {
        Self::Host(msg.into())
    }
}

impl From<serde_json::Error> for EaselError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}
