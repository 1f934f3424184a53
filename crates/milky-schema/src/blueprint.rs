//! Blueprint: dialect-neutral description of one table.
//!
//! A [`Blueprint`] collects the columns a table should have and the commands
//! that change it. Both keep strict insertion order: column order becomes
//! DDL column order and command order becomes statement order.
//!
//! # Example
//!
//! ```rust
//! use milky_schema::{Blueprint, MySqlGrammar, NoConfig};
//!
//! let mut table = Blueprint::new("users");
//! table.create();
//! table.increments("id");
//! table.string("email").unique();
//!
//! let sql = table.to_sql(&MySqlGrammar::new(), &NoConfig).unwrap();
//! assert_eq!(
//!     sql,
//!     vec![
//!         "create table `users` (`id` int unsigned auto_increment primary key, \
//!          `email` varchar(255) not null)",
//!         "alter table `users` add unique `users_email_unique`(`email`)",
//!     ]
//! );
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::column::{Column, ColumnHandle, ColumnIndex, TypeTag};
use crate::command::{Command, CommandKind, ForeignKeyCommand, ForeignKeyHandle, IndexCommand};
use crate::config::ConfigAccessor;
use crate::error::Result;
use crate::grammar::SchemaGrammar;

/// Default length of `string` columns.
pub const DEFAULT_STRING_LENGTH: u32 = 255;

/// Schema description of one table plus its pending commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blueprint {
    /// Table name, without prefix.
    pub table: String,
    /// Whether the table is temporary.
    #[serde(default)]
    pub temporary: bool,
    /// Storage engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,
    /// Table character set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charset: Option<String>,
    /// Table collation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collation: Option<String>,
    /// Columns, in declaration order.
    #[serde(default)]
    pub columns: Vec<Column>,
    /// Commands, in emission order.
    #[serde(default)]
    pub commands: Vec<Command>,
}

impl Blueprint {
    /// Creates an empty blueprint for `table`.
    #[must_use]
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            temporary: false,
            engine: None,
            charset: None,
            collation: None,
            columns: Vec::new(),
            commands: Vec::new(),
        }
    }

    /// Appends a column and returns a handle to configure it further.
    pub fn add_column(&mut self, type_tag: TypeTag, name: impl Into<String>) -> ColumnHandle<'_> {
        self.columns.push(Column::new(name, type_tag));
        let index = self.columns.len() - 1;
        ColumnHandle::new(&mut self.columns[index])
    }

    /// Appends a command.
    pub fn add_command(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// Returns whether the blueprint creates its table.
    #[must_use]
    pub fn creates_table(&self) -> bool {
        self.commands.iter().any(|c| matches!(c, Command::Create))
    }

    /// Returns whether a column named `name` is declared.
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// Derives an index name from the table, the columns and the key kind.
    #[must_use]
    pub fn create_index_name(&self, kind: CommandKind, columns: &[&str]) -> String {
        format!("{}_{}_{}", self.table, columns.join("_"), kind)
            .to_lowercase()
            .replace(['-', '.'], "_")
    }

    /// Returns every command to compile: the explicit ones plus those
    /// implied by the columns.
    ///
    /// Columns without a `Create` command imply a leading `Add`; column-level
    /// key flags imply trailing key commands.
    #[must_use]
    pub fn commands_with_implied(&self) -> Vec<Command> {
        let mut commands = Vec::with_capacity(self.commands.len() + 1);
        if !self.columns.is_empty() && !self.creates_table() {
            commands.push(Command::Add);
        }
        commands.extend(self.commands.iter().cloned());

        for column in &self.columns {
            let keys = [
                (CommandKind::Primary, &column.primary),
                (CommandKind::Unique, &column.unique),
                (CommandKind::Index, &column.index),
            ];
            for (kind, requested) in keys {
                let Some(requested) = requested else {
                    continue;
                };
                let name = match requested {
                    ColumnIndex::Default => self.create_index_name(kind, &[column.name.as_str()]),
                    ColumnIndex::Named(name) => name.clone(),
                };
                let command = IndexCommand::new([column.name.as_str()], Some(name));
                commands.push(match kind {
                    CommandKind::Primary => Command::Primary(command),
                    CommandKind::Unique => Command::Unique(command),
                    _ => Command::Index(command),
                });
            }
        }
        commands
    }

    /// Compiles every command, implied ones included, into statements.
    ///
    /// # Errors
    ///
    /// Returns the first compilation error; no statements are returned then.
    pub fn to_sql(
        &self,
        grammar: &dyn SchemaGrammar,
        config: &dyn ConfigAccessor,
    ) -> Result<Vec<String>> {
        let commands = self.commands_with_implied();
        debug!(
            dialect = grammar.name(),
            table = %self.table,
            commands = commands.len(),
            "Compiling blueprint"
        );

        let mut statements = Vec::new();
        for command in &commands {
            statements.extend(grammar.compile(self, command, config)?);
        }
        Ok(statements)
    }

    // ---------------------------------------------------------------------
    // Table attributes
    // ---------------------------------------------------------------------

    /// Marks the table as temporary.
    pub fn temporary(&mut self) {
        self.temporary = true;
    }

    /// Sets the storage engine.
    pub fn engine(&mut self, engine: impl Into<String>) {
        self.engine = Some(engine.into());
    }

    /// Sets the table character set.
    pub fn charset(&mut self, charset: impl Into<String>) {
        self.charset = Some(charset.into());
    }

    /// Sets the table collation.
    pub fn collation(&mut self, collation: impl Into<String>) {
        self.collation = Some(collation.into());
    }

    // ---------------------------------------------------------------------
    // Commands
    // ---------------------------------------------------------------------

    /// Creates the table.
    pub fn create(&mut self) {
        self.add_command(Command::Create);
    }

    /// Drops the table.
    #[allow(clippy::should_implement_trait)]
    pub fn drop(&mut self) {
        self.add_command(Command::Drop);
    }

    /// Drops the table if it exists.
    pub fn drop_if_exists(&mut self) {
        self.add_command(Command::DropIfExists);
    }

    /// Drops the given columns.
    pub fn drop_column(&mut self, columns: &[&str]) {
        self.add_command(Command::DropColumn {
            columns: owned(columns),
        });
    }

    /// Drops the `created_at` and `updated_at` columns.
    pub fn drop_timestamps(&mut self) {
        self.drop_column(&["created_at", "updated_at"]);
    }

    /// Drops the `deleted_at` column.
    pub fn drop_soft_deletes(&mut self) {
        self.drop_column(&["deleted_at"]);
    }

    /// Adds a primary key.
    pub fn primary(&mut self, columns: &[&str]) {
        let name = self.create_index_name(CommandKind::Primary, columns);
        self.add_command(Command::Primary(IndexCommand::new(
            columns.iter().copied(),
            Some(name),
        )));
    }

    /// Adds a unique index with a derived name.
    pub fn unique(&mut self, columns: &[&str]) {
        let name = self.create_index_name(CommandKind::Unique, columns);
        self.unique_named(columns, name);
    }

    /// Adds a unique index.
    pub fn unique_named(&mut self, columns: &[&str], name: impl Into<String>) {
        self.add_command(Command::Unique(IndexCommand::new(
            columns.iter().copied(),
            Some(name.into()),
        )));
    }

    /// Adds a plain index with a derived name.
    pub fn index(&mut self, columns: &[&str]) {
        let name = self.create_index_name(CommandKind::Index, columns);
        self.index_named(columns, name);
    }

    /// Adds a plain index.
    pub fn index_named(&mut self, columns: &[&str], name: impl Into<String>) {
        self.add_command(Command::Index(IndexCommand::new(
            columns.iter().copied(),
            Some(name.into()),
        )));
    }

    /// Adds a foreign key with a derived name and returns a handle to set
    /// its target. The command is recorded once the handle is dropped.
    pub fn foreign(&mut self, columns: &[&str]) -> ForeignKeyHandle<'_> {
        let name = self.create_index_name(CommandKind::Foreign, columns);
        let command = ForeignKeyCommand::new(columns.iter().copied(), Some(name));
        ForeignKeyHandle::new(&mut self.commands, command)
    }

    /// Drops the primary key.
    pub fn drop_primary(&mut self) {
        self.add_command(Command::DropPrimary { index: None });
    }

    /// Drops a unique index by name.
    pub fn drop_unique(&mut self, index: impl Into<String>) {
        self.add_command(Command::DropUnique {
            index: index.into(),
        });
    }

    /// Drops the unique index derived from `columns`.
    pub fn drop_unique_for(&mut self, columns: &[&str]) {
        let index = self.create_index_name(CommandKind::Unique, columns);
        self.drop_unique(index);
    }

    /// Drops a plain index by name.
    pub fn drop_index(&mut self, index: impl Into<String>) {
        self.add_command(Command::DropIndex {
            index: index.into(),
        });
    }

    /// Drops the plain index derived from `columns`.
    pub fn drop_index_for(&mut self, columns: &[&str]) {
        let index = self.create_index_name(CommandKind::Index, columns);
        self.drop_index(index);
    }

    /// Drops a foreign key by name.
    pub fn drop_foreign(&mut self, index: impl Into<String>) {
        self.add_command(Command::DropForeign {
            index: index.into(),
        });
    }

    /// Drops the foreign key derived from `columns`.
    pub fn drop_foreign_for(&mut self, columns: &[&str]) {
        let index = self.create_index_name(CommandKind::Foreign, columns);
        self.drop_foreign(index);
    }

    /// Renames the table.
    pub fn rename(&mut self, to: impl Into<String>) {
        self.add_command(Command::Rename { to: to.into() });
    }

    /// Turns foreign key checks on.
    pub fn enable_foreign_key_constraints(&mut self) {
        self.add_command(Command::EnableForeignKeyConstraints);
    }

    /// Turns foreign key checks off.
    pub fn disable_foreign_key_constraints(&mut self) {
        self.add_command(Command::DisableForeignKeyConstraints);
    }

    // ---------------------------------------------------------------------
    // Columns
    // ---------------------------------------------------------------------

    /// Auto-incrementing unsigned integer primary key.
    pub fn increments(&mut self, name: impl Into<String>) -> ColumnHandle<'_> {
        self.add_column(TypeTag::Integer, name)
            .unsigned()
            .auto_increment()
    }

    /// Auto-incrementing unsigned big integer primary key.
    pub fn big_increments(&mut self, name: impl Into<String>) -> ColumnHandle<'_> {
        self.add_column(TypeTag::BigInteger, name)
            .unsigned()
            .auto_increment()
    }

    /// Fixed-length string column.
    pub fn char(&mut self, name: impl Into<String>, length: u32) -> ColumnHandle<'_> {
        self.add_column(TypeTag::Char, name).length(length)
    }

    /// Variable-length string column of the default length.
    pub fn string(&mut self, name: impl Into<String>) -> ColumnHandle<'_> {
        self.string_with_length(name, DEFAULT_STRING_LENGTH)
    }

    /// Variable-length string column.
    pub fn string_with_length(&mut self, name: impl Into<String>, length: u32) -> ColumnHandle<'_> {
        self.add_column(TypeTag::String, name).length(length)
    }

    /// Text column.
    pub fn text(&mut self, name: impl Into<String>) -> ColumnHandle<'_> {
        self.add_column(TypeTag::Text, name)
    }

    /// Medium text column.
    pub fn medium_text(&mut self, name: impl Into<String>) -> ColumnHandle<'_> {
        self.add_column(TypeTag::MediumText, name)
    }

    /// Long text column.
    pub fn long_text(&mut self, name: impl Into<String>) -> ColumnHandle<'_> {
        self.add_column(TypeTag::LongText, name)
    }

    /// Integer column.
    pub fn integer(&mut self, name: impl Into<String>) -> ColumnHandle<'_> {
        self.add_column(TypeTag::Integer, name)
    }

    /// Big integer column.
    pub fn big_integer(&mut self, name: impl Into<String>) -> ColumnHandle<'_> {
        self.add_column(TypeTag::BigInteger, name)
    }

    /// Medium integer column.
    pub fn medium_integer(&mut self, name: impl Into<String>) -> ColumnHandle<'_> {
        self.add_column(TypeTag::MediumInteger, name)
    }

    /// Small integer column.
    pub fn small_integer(&mut self, name: impl Into<String>) -> ColumnHandle<'_> {
        self.add_column(TypeTag::SmallInteger, name)
    }

    /// Tiny integer column.
    pub fn tiny_integer(&mut self, name: impl Into<String>) -> ColumnHandle<'_> {
        self.add_column(TypeTag::TinyInteger, name)
    }

    /// Unsigned integer column.
    pub fn unsigned_integer(&mut self, name: impl Into<String>) -> ColumnHandle<'_> {
        self.integer(name).unsigned()
    }

    /// Unsigned big integer column.
    pub fn unsigned_big_integer(&mut self, name: impl Into<String>) -> ColumnHandle<'_> {
        self.big_integer(name).unsigned()
    }

    /// Float column with a precision of (8, 2).
    pub fn float(&mut self, name: impl Into<String>) -> ColumnHandle<'_> {
        self.add_column(TypeTag::Float, name).precision(8, 2)
    }

    /// Double column without precision.
    pub fn double(&mut self, name: impl Into<String>) -> ColumnHandle<'_> {
        self.add_column(TypeTag::Double, name)
    }

    /// Decimal column with `total` digits, `places` of them after the point.
    pub fn decimal(
        &mut self,
        name: impl Into<String>,
        total: u32,
        places: u32,
    ) -> ColumnHandle<'_> {
        self.add_column(TypeTag::Decimal, name).precision(total, places)
    }

    /// Boolean column.
    pub fn boolean(&mut self, name: impl Into<String>) -> ColumnHandle<'_> {
        self.add_column(TypeTag::Boolean, name)
    }

    /// Enum column restricted to `allowed`, in the given order.
    pub fn enumeration(&mut self, name: impl Into<String>, allowed: &[&str]) -> ColumnHandle<'_> {
        self.add_column(TypeTag::Enum, name)
            .allowed(allowed.iter().copied())
    }

    /// JSON column.
    pub fn json(&mut self, name: impl Into<String>) -> ColumnHandle<'_> {
        self.add_column(TypeTag::Json, name)
    }

    /// Binary JSON column; other dialects fall back to their JSON type.
    pub fn jsonb(&mut self, name: impl Into<String>) -> ColumnHandle<'_> {
        self.add_column(TypeTag::Jsonb, name)
    }

    /// Date column.
    pub fn date(&mut self, name: impl Into<String>) -> ColumnHandle<'_> {
        self.add_column(TypeTag::Date, name)
    }

    /// Date and time column.
    pub fn date_time(&mut self, name: impl Into<String>) -> ColumnHandle<'_> {
        self.add_column(TypeTag::DateTime, name)
    }

    /// Date and time column with a time zone.
    pub fn date_time_tz(&mut self, name: impl Into<String>) -> ColumnHandle<'_> {
        self.add_column(TypeTag::DateTimeTz, name)
    }

    /// Time column.
    pub fn time(&mut self, name: impl Into<String>) -> ColumnHandle<'_> {
        self.add_column(TypeTag::Time, name)
    }

    /// Time column with a time zone.
    pub fn time_tz(&mut self, name: impl Into<String>) -> ColumnHandle<'_> {
        self.add_column(TypeTag::TimeTz, name)
    }

    /// Timestamp column.
    pub fn timestamp(&mut self, name: impl Into<String>) -> ColumnHandle<'_> {
        self.add_column(TypeTag::Timestamp, name)
    }

    /// Timestamp column with a time zone.
    pub fn timestamp_tz(&mut self, name: impl Into<String>) -> ColumnHandle<'_> {
        self.add_column(TypeTag::TimestampTz, name)
    }

    /// Adds `created_at` and `updated_at` timestamp columns.
    pub fn timestamps(&mut self) {
        self.timestamp("created_at");
        self.timestamp("updated_at");
    }

    /// Adds nullable `created_at` and `updated_at` timestamp columns.
    pub fn nullable_timestamps(&mut self) {
        self.timestamp("created_at").nullable();
        self.timestamp("updated_at").nullable();
    }

    /// Adds a nullable `deleted_at` timestamp column.
    pub fn soft_deletes(&mut self) -> ColumnHandle<'_> {
        self.timestamp("deleted_at").nullable()
    }

    /// Binary data column.
    pub fn binary(&mut self, name: impl Into<String>) -> ColumnHandle<'_> {
        self.add_column(TypeTag::Binary, name)
    }

    /// UUID column.
    pub fn uuid(&mut self, name: impl Into<String>) -> ColumnHandle<'_> {
        self.add_column(TypeTag::Uuid, name)
    }

    /// IP address column.
    pub fn ip_address(&mut self, name: impl Into<String>) -> ColumnHandle<'_> {
        self.add_column(TypeTag::IpAddress, name)
    }

    /// MAC address column.
    pub fn mac_address(&mut self, name: impl Into<String>) -> ColumnHandle<'_> {
        self.add_column(TypeTag::MacAddress, name)
    }

    /// Adds a nullable `remember_token` string column of length 100.
    pub fn remember_token(&mut self) -> ColumnHandle<'_> {
        self.string_with_length("remember_token", 100).nullable()
    }
}

fn owned(columns: &[&str]) -> Vec<String> {
    columns.iter().map(|&c| c.to_string()).collect()
}
