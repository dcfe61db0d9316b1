//! Error types shared by the folding engine and its host adapters.

use crate::host::RegionHandle;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Errors produced while compiling a rule pattern.
pub enum RuleError {
    #[error("empty pattern")]
    /// The pattern string was empty.
    EmptyPattern,

    #[error("regex compile error for pattern '{pattern}': {message}")]
    /// The pattern failed to compile.
    InvalidPattern {
        /// The regex pattern string.
        pattern: String,
        /// The compiler error message.
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Errors reported by a host editor when it refuses a region mutation.
pub enum HostError {
    #[error("host region model is not ready")]
    /// The whole batch was refused because the host is still initializing.
    NotReady,

    #[error("region {start}..{end} is out of bounds for a document of {len} chars")]
    /// The region no longer fits the document (typically after a concurrent edit).
    OutOfBounds {
        /// Region start (char offset).
        start: usize,
        /// Region end (char offset, exclusive).
        end: usize,
        /// Current document length in chars.
        len: usize,
    },

    #[error("unknown region handle {0:?}")]
    /// The handle does not refer to a live region.
    UnknownHandle(RegionHandle),

    #[error("region {start}..{end} overlaps an existing region")]
    /// The host does not accept a region crossing another one.
    Overlap {
        /// Region start (char offset).
        start: usize,
        /// Region end (char offset, exclusive).
        end: usize,
    },

    #[error("editor has been disposed")]
    /// The editor was closed.
    Disposed,
}

#[derive(Debug, Error)]
/// Errors produced while loading a [`FoldConfig`](crate::FoldConfig).
pub enum ConfigError {
    #[error("TOML parse error: {0}")]
    /// TOML parsing failed.
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    /// Filesystem I/O failed.
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    /// A value parsed but is not usable.
    Invalid(String),
}
