//! Error types for schema compilation.

use crate::command::CommandKind;

/// Errors that can occur while compiling a blueprint into DDL.
///
/// Every variant points at a defect in the blueprint handed to the grammar,
/// so none of them is worth retrying.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// The dialect has no way to express the command.
    #[error("The {dialect} grammar does not support the '{command}' command")]
    UnsupportedOperation {
        /// Dialect name.
        dialect: &'static str,
        /// The command that was requested.
        command: CommandKind,
    },

    /// A column type tag is not known to the type table.
    #[error("Unknown column type '{0}'")]
    UnknownType(String),

    /// A column or command lacks an attribute it needs.
    #[error("Invalid definition for '{subject}': {reason}")]
    InvalidDefinition {
        /// Column or command the problem was found on.
        subject: String,
        /// What is missing or malformed.
        reason: String,
    },

    /// A command names a column the blueprint does not declare.
    #[error("Command '{command}' references unknown column '{column}'")]
    UnresolvedReference {
        /// The missing column name.
        column: String,
        /// The command holding the reference.
        command: CommandKind,
    },
}

impl SchemaError {
    /// Creates an `InvalidDefinition` error.
    #[must_use]
    pub fn invalid(subject: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            subject: subject.into(),
            reason: reason.into(),
        }
    }

    /// Creates an `UnsupportedOperation` error.
    #[must_use]
    pub const fn unsupported(dialect: &'static str, command: CommandKind) -> Self {
        Self::UnsupportedOperation { dialect, command }
    }
}

/// Result type for schema compilation.
pub type Result<T> = std::result::Result<T, SchemaError>;
