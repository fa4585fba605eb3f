//! Common error infrastructure for game-core.
//!
//! Domain-specific errors (e.g. `PlaceTokenError`) live next to the actions
//! they validate. This module holds the classification shared by all of them.
//!
//! # Severity
//!
//! The split that matters to callers is between errors raised while a *new*
//! action is submitted (the log is untouched, the caller may retry) and errors
//! raised while *re-deriving* state from an already accepted log (the log or
//! a snapshot is corrupt and the game must stop accepting mutations).

/// Severity level of an error, used for categorization and recovery strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Can succeed later without changing the action (e.g. not your turn yet).
    Recoverable,

    /// Invalid input; the caller must change the action before retrying.
    Validation,

    /// Unexpected state inconsistency; indicates a bug.
    Internal,

    /// An accepted log no longer replays; the game is corrupt.
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable | Self::Validation)
    }

    /// Returns true if this error means the affected game must halt.
    pub const fn is_data_integrity(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all game-core errors.
///
/// # Implementation Guidelines
///
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Used for logging fields, metrics keys and tests.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// Error type for actions that never fail their own validation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("this error should never be constructed")]
pub enum NeverError {}

impl GameError for NeverError {
    fn severity(&self) -> ErrorSeverity {
        match *self {}
    }

    fn error_code(&self) -> &'static str {
        match *self {}
    }
}

// Custom serde implementation to prevent accidental serialization
#[cfg(feature = "serde")]
impl serde::Serialize for NeverError {
    fn serialize<S>(&self, _serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match *self {}
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for NeverError {
    fn deserialize<D>(_deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Err(serde::de::Error::custom(
            "NeverError cannot be deserialized as it represents an impossible error",
        ))
    }
}
