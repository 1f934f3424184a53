//! Schema commands.
//!
//! Defines every operation a blueprint can carry, like CREATE TABLE, ADD
//! COLUMN, DROP INDEX, etc. Each variant holds exactly the parameters its
//! compilation routine needs.

use std::fmt;

use serde::{Deserialize, Serialize};

/// All possible schema commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Command {
    /// Create the table with every blueprint column.
    Create,
    /// Add every blueprint column to an existing table.
    Add,
    /// Add a primary key.
    Primary(IndexCommand),
    /// Add a unique index.
    Unique(IndexCommand),
    /// Add a plain index.
    Index(IndexCommand),
    /// Add a foreign key constraint.
    Foreign(ForeignKeyCommand),
    /// Drop the table.
    Drop,
    /// Drop the table if it exists.
    DropIfExists,
    /// Drop one or more columns.
    DropColumn {
        /// Columns to drop, in order.
        columns: Vec<String>,
    },
    /// Drop the primary key.
    DropPrimary {
        /// Constraint name, where the dialect needs one.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<String>,
    },
    /// Drop a unique index.
    DropUnique {
        /// Index name.
        index: String,
    },
    /// Drop a plain index.
    DropIndex {
        /// Index name.
        index: String,
    },
    /// Drop a foreign key constraint.
    DropForeign {
        /// Constraint name.
        index: String,
    },
    /// Rename the table.
    Rename {
        /// New table name.
        to: String,
    },
    /// Turn foreign key checks on.
    EnableForeignKeyConstraints,
    /// Turn foreign key checks off.
    DisableForeignKeyConstraints,
}

impl Command {
    /// Returns the tag of this command.
    #[must_use]
    pub const fn kind(&self) -> CommandKind {
        match self {
            Self::Create => CommandKind::Create,
            Self::Add => CommandKind::Add,
            Self::Primary(_) => CommandKind::Primary,
            Self::Unique(_) => CommandKind::Unique,
            Self::Index(_) => CommandKind::Index,
            Self::Foreign(_) => CommandKind::Foreign,
            Self::Drop => CommandKind::Drop,
            Self::DropIfExists => CommandKind::DropIfExists,
            Self::DropColumn { .. } => CommandKind::DropColumn,
            Self::DropPrimary { .. } => CommandKind::DropPrimary,
            Self::DropUnique { .. } => CommandKind::DropUnique,
            Self::DropIndex { .. } => CommandKind::DropIndex,
            Self::DropForeign { .. } => CommandKind::DropForeign,
            Self::Rename { .. } => CommandKind::Rename,
            Self::EnableForeignKeyConstraints => CommandKind::EnableForeignKeyConstraints,
            Self::DisableForeignKeyConstraints => CommandKind::DisableForeignKeyConstraints,
        }
    }

    /// Returns the columns a key command is built on, if it is one.
    #[must_use]
    pub fn key_columns(&self) -> Option<&[String]> {
        match self {
            Self::Primary(cmd) | Self::Unique(cmd) | Self::Index(cmd) => {
                Some(cmd.columns.as_slice())
            }
            Self::Foreign(cmd) => Some(cmd.columns.as_slice()),
            _ => None,
        }
    }
}

/// Tag identifying a command variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// See [`Command::Create`].
    Create,
    /// See [`Command::Add`].
    Add,
    /// See [`Command::Primary`].
    Primary,
    /// See [`Command::Unique`].
    Unique,
    /// See [`Command::Index`].
    Index,
    /// See [`Command::Foreign`].
    Foreign,
    /// See [`Command::Drop`].
    Drop,
    /// See [`Command::DropIfExists`].
    DropIfExists,
    /// See [`Command::DropColumn`].
    DropColumn,
    /// See [`Command::DropPrimary`].
    DropPrimary,
    /// See [`Command::DropUnique`].
    DropUnique,
    /// See [`Command::DropIndex`].
    DropIndex,
    /// See [`Command::DropForeign`].
    DropForeign,
    /// See [`Command::Rename`].
    Rename,
    /// See [`Command::EnableForeignKeyConstraints`].
    EnableForeignKeyConstraints,
    /// See [`Command::DisableForeignKeyConstraints`].
    DisableForeignKeyConstraints,
}

impl CommandKind {
    /// Returns the command name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Add => "add",
            Self::Primary => "primary",
            Self::Unique => "unique",
            Self::Index => "index",
            Self::Foreign => "foreign",
            Self::Drop => "drop",
            Self::DropIfExists => "dropIfExists",
            Self::DropColumn => "dropColumn",
            Self::DropPrimary => "dropPrimary",
            Self::DropUnique => "dropUnique",
            Self::DropIndex => "dropIndex",
            Self::DropForeign => "dropForeign",
            Self::Rename => "rename",
            Self::EnableForeignKeyConstraints => "enableForeignKeyConstraints",
            Self::DisableForeignKeyConstraints => "disableForeignKeyConstraints",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters of a primary, unique or plain index command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexCommand {
    /// Indexed columns, in order.
    pub columns: Vec<String>,
    /// Index name. Primary keys never use it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
}

impl IndexCommand {
    /// Creates an index command.
    #[must_use]
    pub fn new<I, S>(columns: I, index: Option<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            index,
        }
    }
}

/// Foreign key referential action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForeignKeyAction {
    /// No action.
    NoAction,
    /// Restrict deletion/update.
    Restrict,
    /// Cascade the operation.
    Cascade,
    /// Set to NULL.
    SetNull,
    /// Set to default value.
    SetDefault,
}

impl ForeignKeyAction {
    /// Returns the SQL representation of the action.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::NoAction => "no action",
            Self::Restrict => "restrict",
            Self::Cascade => "cascade",
            Self::SetNull => "set null",
            Self::SetDefault => "set default",
        }
    }
}

/// Parameters of a foreign key command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKeyCommand {
    /// Columns in this table.
    pub columns: Vec<String>,
    /// Constraint name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
    /// Referenced columns.
    #[serde(default)]
    pub references: Vec<String>,
    /// Referenced table.
    #[serde(default)]
    pub on: String,
    /// Action on delete.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_delete: Option<ForeignKeyAction>,
    /// Action on update.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_update: Option<ForeignKeyAction>,
}

impl ForeignKeyCommand {
    /// Creates a foreign key command without a target.
    #[must_use]
    pub fn new<I, S>(columns: I, index: Option<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            index,
            references: Vec::new(),
            on: String::new(),
            on_delete: None,
            on_update: None,
        }
    }
}

/// Builder for a foreign key command of a blueprint.
///
/// The command is appended to the blueprint's commands when the handle is
/// dropped, so it keeps its place relative to the commands added before it.
#[derive(Debug)]
pub struct ForeignKeyHandle<'a> {
    commands: &'a mut Vec<Command>,
    command: ForeignKeyCommand,
}

#[allow(clippy::return_self_not_must_use)]
impl<'a> ForeignKeyHandle<'a> {
    pub(crate) const fn new(commands: &'a mut Vec<Command>, command: ForeignKeyCommand) -> Self {
        Self { commands, command }
    }

    /// Sets the referenced columns.
    pub fn references(mut self, columns: &[&str]) -> Self {
        self.command.references = columns.iter().map(|&c| c.to_string()).collect();
        self
    }

    /// Sets the referenced table.
    pub fn on(mut self, table: impl Into<String>) -> Self {
        self.command.on = table.into();
        self
    }

    /// Sets the ON DELETE action.
    pub fn on_delete(mut self, action: ForeignKeyAction) -> Self {
        self.command.on_delete = Some(action);
        self
    }

    /// Sets the ON UPDATE action.
    pub fn on_update(mut self, action: ForeignKeyAction) -> Self {
        self.command.on_update = Some(action);
        self
    }
}

impl Drop for ForeignKeyHandle<'_> {
    fn drop(&mut self) {
        let command = std::mem::take(&mut self.command);
        self.commands.push(Command::Foreign(command));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(Command::Create.kind().to_string(), "create");
        assert_eq!(Command::DropIfExists.kind().to_string(), "dropIfExists");
        assert_eq!(
            Command::Rename { to: "people".into() }.kind(),
            CommandKind::Rename
        );
    }

    #[test]
    fn test_key_columns() {
        let cmd = Command::Unique(IndexCommand::new(["email"], None));
        assert_eq!(cmd.key_columns(), Some(&["email".to_string()][..]));
        assert_eq!(Command::Drop.key_columns(), None);
    }

    #[test]
    fn test_foreign_key_handle() {
        let mut commands = vec![Command::Create];
        let cmd = ForeignKeyCommand::new(["user_id"], Some("posts_user_id_foreign".into()));
        ForeignKeyHandle::new(&mut commands, cmd)
            .references(&["id"])
            .on("users")
            .on_delete(ForeignKeyAction::Cascade);

        assert_eq!(commands.len(), 2);
        let Command::Foreign(cmd) = &commands[1] else {
            panic!("expected a foreign key command, got {:?}", commands[1]);
        };
        assert_eq!(cmd.index.as_deref(), Some("posts_user_id_foreign"));
        assert_eq!(cmd.references, vec!["id"]);
        assert_eq!(cmd.on, "users");
        assert_eq!(cmd.on_delete, Some(ForeignKeyAction::Cascade));
        assert_eq!(cmd.on_update, None);
    }

    #[test]
    fn test_deserialize_tagged_command() {
        let cmd: Command =
            serde_json::from_str(r#"{"kind": "unique", "columns": ["email"], "index": "u"}"#)
                .unwrap();
        assert_eq!(
            cmd,
            Command::Unique(IndexCommand::new(["email"], Some("u".into())))
        );

        let cmd: Command = serde_json::from_str(r#"{"kind": "dropPrimary"}"#).unwrap();
        assert_eq!(cmd, Command::DropPrimary { index: None });
    }
}
