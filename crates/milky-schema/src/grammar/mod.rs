//! Dialect-specific DDL compilation.
//!
//! Every dialect implements [`SchemaGrammar`]. The trait's default methods
//! carry the routines the dialects share (dispatch, column rendering, the
//! modifier pipeline, identifier quoting); a dialect overrides only where its
//! syntax differs.

mod mysql;
mod postgres;
mod sqlite;

pub use mysql::MySqlGrammar;
pub use postgres::PostgresGrammar;
pub use sqlite::SqliteGrammar;

use tracing::{debug, trace};

use crate::blueprint::Blueprint;
use crate::column::{Column, DefaultValue};
use crate::command::{Command, CommandKind, ForeignKeyCommand, IndexCommand};
use crate::config::ConfigAccessor;
use crate::error::{Result, SchemaError};

/// Column modifiers, in the order they are applied after the column type.
///
/// A dialect keeps the subset it supports but never reorders it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    /// `as (<expr>)`
    VirtualAs,
    /// `as (<expr>) stored`
    StoredAs,
    /// `unsigned`
    Unsigned,
    /// `character set <charset>`
    Charset,
    /// `collate <collation>`
    Collate,
    /// `null` / `not null`
    Nullable,
    /// `default <value>`
    Default,
    /// Dialect auto-increment clause.
    Increment,
    /// `comment "<text>"`
    Comment,
    /// `after <column>`
    After,
    /// `first`
    First,
}

impl Modifier {
    /// Every modifier, in pipeline order.
    pub const ALL: [Self; 11] = [
        Self::VirtualAs,
        Self::StoredAs,
        Self::Unsigned,
        Self::Charset,
        Self::Collate,
        Self::Nullable,
        Self::Default,
        Self::Increment,
        Self::Comment,
        Self::After,
        Self::First,
    ];
}

/// Trait for dialect-specific schema compilation.
///
/// Implementations hold only immutable configuration and can be shared
/// across threads.
pub trait SchemaGrammar: Send + Sync {
    /// Returns the dialect name.
    fn name(&self) -> &'static str;

    /// Returns the prefix prepended to every table name.
    fn table_prefix(&self) -> &str;

    /// Returns the identifier delimiter.
    fn quote_char(&self) -> char;

    /// Returns the modifiers this dialect applies, in pipeline order.
    fn modifiers(&self) -> &'static [Modifier];

    /// Returns the clause appended to auto-incrementing integer columns.
    fn increment_clause(&self) -> &'static str;

    /// Maps a column to the dialect-specific SQL type.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDefinition` when the column lacks an attribute its
    /// type requires.
    fn type_sql(&self, column: &Column) -> Result<String>;

    /// Returns the query probing for a table.
    fn compile_table_exists(&self) -> &'static str;

    /// Returns the query listing the columns of a table.
    fn compile_column_exists(&self) -> &'static str;

    /// Compiles one command of `blueprint` into its statements.
    ///
    /// # Errors
    ///
    /// Fails without producing any statement when the dialect cannot express
    /// the command or the blueprint is incomplete.
    fn compile(
        &self,
        blueprint: &Blueprint,
        command: &Command,
        config: &dyn ConfigAccessor,
    ) -> Result<Vec<String>> {
        debug!(
            dialect = self.name(),
            table = %blueprint.table,
            command = %command.kind(),
            "Compiling schema command"
        );

        check_key_references(blueprint, command)?;

        let statements = match command {
            Command::Create => self.compile_create(blueprint, config)?,
            Command::Add => self.compile_add(blueprint)?,
            Command::Primary(cmd) => self.compile_primary(blueprint, cmd)?,
            Command::Unique(cmd) => self.compile_unique(blueprint, cmd)?,
            Command::Index(cmd) => self.compile_index(blueprint, cmd)?,
            Command::Foreign(cmd) => self.compile_foreign(blueprint, cmd)?,
            Command::Drop => vec![self.compile_drop(blueprint)],
            Command::DropIfExists => vec![self.compile_drop_if_exists(blueprint)],
            Command::DropColumn { columns } => self.compile_drop_column(blueprint, columns)?,
            Command::DropPrimary { index } => {
                vec![self.compile_drop_primary(blueprint, index.as_deref())?]
            }
            Command::DropUnique { index } => vec![self.compile_drop_unique(blueprint, index)],
            Command::DropIndex { index } => vec![self.compile_drop_index(blueprint, index)],
            Command::DropForeign { index } => vec![self.compile_drop_foreign(blueprint, index)?],
            Command::Rename { to } => vec![self.compile_rename(blueprint, to)],
            Command::EnableForeignKeyConstraints => {
                vec![self.compile_enable_foreign_key_constraints().to_string()]
            }
            Command::DisableForeignKeyConstraints => {
                vec![self.compile_disable_foreign_key_constraints().to_string()]
            }
        };

        for sql in &statements {
            trace!(sql = %sql, "Compiled statement");
        }
        Ok(statements)
    }

    /// Compiles a create table command.
    ///
    /// # Errors
    ///
    /// Fails when the blueprint has no columns or a column is invalid.
    fn compile_create(
        &self,
        blueprint: &Blueprint,
        _config: &dyn ConfigAccessor,
    ) -> Result<Vec<String>> {
        Ok(vec![self.create_table_sql(blueprint)?])
    }

    /// Compiles an add column command.
    ///
    /// # Errors
    ///
    /// Fails when the blueprint has no columns or a column is invalid.
    fn compile_add(&self, blueprint: &Blueprint) -> Result<Vec<String>> {
        let keyword = self.add_column_keyword();
        let columns: Vec<String> = self
            .column_definitions(blueprint, CommandKind::Add)?
            .into_iter()
            .map(|col| format!("{keyword} {col}"))
            .collect();

        Ok(vec![format!(
            "alter table {} {}",
            self.wrap_table(&blueprint.table),
            columns.join(", ")
        )])
    }

    /// Compiles a primary key command. The index name is never emitted.
    ///
    /// # Errors
    ///
    /// Fails when the command has no columns.
    fn compile_primary(
        &self,
        blueprint: &Blueprint,
        command: &IndexCommand,
    ) -> Result<Vec<String>> {
        require_columns(CommandKind::Primary, &command.columns)?;
        Ok(vec![format!(
            "alter table {} add primary key ({})",
            self.wrap_table(&blueprint.table),
            self.columnize(&command.columns)
        )])
    }

    /// Compiles a unique key command.
    ///
    /// # Errors
    ///
    /// Fails when the command has no columns or no index name.
    fn compile_unique(&self, blueprint: &Blueprint, command: &IndexCommand) -> Result<Vec<String>>;

    /// Compiles a plain index command.
    ///
    /// # Errors
    ///
    /// Fails when the command has no columns or no index name.
    fn compile_index(&self, blueprint: &Blueprint, command: &IndexCommand) -> Result<Vec<String>>;

    /// Compiles a foreign key command.
    ///
    /// # Errors
    ///
    /// Fails when the command has no columns, no name or no target.
    fn compile_foreign(
        &self,
        blueprint: &Blueprint,
        command: &ForeignKeyCommand,
    ) -> Result<Vec<String>> {
        require_foreign_target(command)?;
        let index = command
            .index
            .as_deref()
            .ok_or_else(|| missing_index_name(CommandKind::Foreign))?;

        let mut sql = format!(
            "alter table {} add constraint {} foreign key ({}) references {} ({})",
            self.wrap_table(&blueprint.table),
            self.wrap_value(index),
            self.columnize(&command.columns),
            self.wrap_table(&command.on),
            self.columnize(&command.references)
        );
        push_referential_actions(&mut sql, command);
        Ok(vec![sql])
    }

    /// Compiles a drop table command.
    fn compile_drop(&self, blueprint: &Blueprint) -> String {
        format!("drop table {}", self.wrap_table(&blueprint.table))
    }

    /// Compiles a drop table (if exists) command.
    fn compile_drop_if_exists(&self, blueprint: &Blueprint) -> String {
        format!("drop table if exists {}", self.wrap_table(&blueprint.table))
    }

    /// Compiles a drop column command.
    ///
    /// # Errors
    ///
    /// Fails when no column is named.
    fn compile_drop_column(
        &self,
        blueprint: &Blueprint,
        columns: &[String],
    ) -> Result<Vec<String>> {
        require_columns(CommandKind::DropColumn, columns)?;
        let keyword = self.drop_column_keyword();
        let clauses: Vec<String> = columns
            .iter()
            .map(|c| format!("{keyword} {}", self.wrap_value(c)))
            .collect();

        Ok(vec![format!(
            "alter table {} {}",
            self.wrap_table(&blueprint.table),
            clauses.join(", ")
        )])
    }

    /// Compiles a drop primary key command.
    ///
    /// # Errors
    ///
    /// Fails when the dialect cannot drop a primary key.
    fn compile_drop_primary(&self, blueprint: &Blueprint, index: Option<&str>) -> Result<String>;

    /// Compiles a drop unique key command.
    fn compile_drop_unique(&self, blueprint: &Blueprint, index: &str) -> String;

    /// Compiles a drop index command.
    fn compile_drop_index(&self, blueprint: &Blueprint, index: &str) -> String;

    /// Compiles a drop foreign key command.
    ///
    /// # Errors
    ///
    /// Fails when the dialect cannot drop a foreign key.
    fn compile_drop_foreign(&self, blueprint: &Blueprint, index: &str) -> Result<String>;

    /// Compiles a rename table command.
    fn compile_rename(&self, blueprint: &Blueprint, to: &str) -> String {
        format!(
            "alter table {} rename to {}",
            self.wrap_table(&blueprint.table),
            self.wrap_table(to)
        )
    }

    /// Returns the statement enabling foreign key constraints.
    fn compile_enable_foreign_key_constraints(&self) -> &'static str;

    /// Returns the statement disabling foreign key constraints.
    fn compile_disable_foreign_key_constraints(&self) -> &'static str;

    /// Returns the keyword introducing each column of an add command.
    fn add_column_keyword(&self) -> &'static str {
        "add"
    }

    /// Returns the keyword introducing each column of a drop column command.
    fn drop_column_keyword(&self) -> &'static str {
        "drop"
    }

    /// Renders `create [temporary] table <t> (<columns>)`.
    ///
    /// # Errors
    ///
    /// Fails when the blueprint has no columns or a column is invalid.
    fn create_table_sql(&self, blueprint: &Blueprint) -> Result<String> {
        let columns = self.column_definitions(blueprint, CommandKind::Create)?;
        let create = if blueprint.temporary {
            "create temporary"
        } else {
            "create"
        };

        Ok(format!(
            "{create} table {} ({})",
            self.wrap_table(&blueprint.table),
            columns.join(", ")
        ))
    }

    /// Renders every blueprint column, in declaration order.
    ///
    /// # Errors
    ///
    /// Fails when the blueprint has no columns or a column is invalid.
    fn column_definitions(&self, blueprint: &Blueprint, kind: CommandKind) -> Result<Vec<String>> {
        if blueprint.columns.is_empty() {
            return Err(SchemaError::invalid(
                &blueprint.table,
                format!("the '{kind}' command needs at least one column"),
            ));
        }

        blueprint
            .columns
            .iter()
            .map(|col| self.column_definition(col))
            .collect()
    }

    /// Renders `<name> <type><modifiers>` for one column.
    ///
    /// # Errors
    ///
    /// Fails when the column has no name or its type is incomplete.
    fn column_definition(&self, column: &Column) -> Result<String> {
        if column.name.is_empty() {
            return Err(SchemaError::invalid(
                column.type_tag.as_str(),
                "column name must not be empty",
            ));
        }

        let mut sql = format!("{} {}", self.wrap_value(&column.name), self.type_sql(column)?);
        for modifier in self.modifiers() {
            if let Some(fragment) = self.modify(*modifier, column) {
                sql.push_str(&fragment);
            }
        }
        Ok(sql)
    }

    /// Returns the fragment `modifier` contributes for `column`, if any.
    ///
    /// Each modifier reads only its own attribute; an absent attribute emits
    /// nothing.
    fn modify(&self, modifier: Modifier, column: &Column) -> Option<String> {
        match modifier {
            Modifier::VirtualAs => column.virtual_as.as_ref().map(|e| format!(" as ({e})")),
            Modifier::StoredAs => column
                .stored_as
                .as_ref()
                .map(|e| format!(" as ({e}) stored")),
            Modifier::Unsigned => flag(column.unsigned, " unsigned"),
            Modifier::Charset => column
                .charset
                .as_ref()
                .map(|c| format!(" character set {c}")),
            Modifier::Collate => column.collation.as_ref().map(|c| format!(" collate {c}")),
            Modifier::Nullable => {
                // The increment clause already declares a non-null primary key.
                if column.is_auto_increment() {
                    None
                } else if column.nullable == Some(true) {
                    Some(" null".to_string())
                } else {
                    Some(" not null".to_string())
                }
            }
            Modifier::Default => column
                .default
                .as_ref()
                .map(|d| format!(" default {}", self.default_sql(d))),
            Modifier::Increment => column
                .is_auto_increment()
                .then(|| self.increment_clause().to_string()),
            Modifier::Comment => column
                .comment
                .as_ref()
                .map(|c| format!(" comment {}", self.quote_string(c, '"'))),
            Modifier::After => column
                .after
                .as_ref()
                .map(|c| format!(" after {}", self.wrap_value(c))),
            Modifier::First => flag(column.first, " first"),
        }
    }

    /// Quotes a string literal in `delimiter`, doubling embedded delimiters.
    fn quote_string(&self, value: &str, delimiter: char) -> String {
        let escaped = value.replace(delimiter, &format!("{delimiter}{delimiter}"));
        format!("{delimiter}{escaped}{delimiter}")
    }

    /// Renders a column default. Literals are single-quoted; expressions are
    /// emitted as written.
    fn default_sql(&self, value: &DefaultValue) -> String {
        let literal = match value {
            DefaultValue::Bool(b) => String::from(if *b { "1" } else { "0" }),
            DefaultValue::Integer(i) => i.to_string(),
            DefaultValue::Float(f) => f.to_string(),
            DefaultValue::String(s) => s.clone(),
            DefaultValue::Expression(expr) => return expr.clone(),
        };
        self.quote_string(&literal, '\'')
    }

    /// Wraps a single identifier in the dialect delimiter.
    ///
    /// The wildcard `*` passes through; embedded delimiters are doubled.
    fn wrap_value(&self, value: &str) -> String {
        if value == "*" {
            return value.to_string();
        }
        let q = self.quote_char();
        let escaped = value.replace(q, &format!("{q}{q}"));
        format!("{q}{escaped}{q}")
    }

    /// Wraps a table name, prefix included.
    fn wrap_table(&self, table: &str) -> String {
        self.wrap_value(&format!("{}{table}", self.table_prefix()))
    }

    /// Wraps each column and joins them with `", "`.
    fn columnize(&self, columns: &[String]) -> String {
        columns
            .iter()
            .map(|c| self.wrap_value(c))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn flag(value: Option<bool>, fragment: &str) -> Option<String> {
    (value == Some(true)).then(|| fragment.to_string())
}

/// Key commands of a blueprint that creates its table may only name
/// columns the blueprint declares.
fn check_key_references(blueprint: &Blueprint, command: &Command) -> Result<()> {
    let Some(columns) = command.key_columns() else {
        return Ok(());
    };
    if !blueprint.creates_table() {
        return Ok(());
    }

    match columns.iter().find(|c| !blueprint.has_column(c)) {
        Some(missing) => Err(SchemaError::UnresolvedReference {
            column: missing.clone(),
            command: command.kind(),
        }),
        None => Ok(()),
    }
}

fn require_columns(kind: CommandKind, columns: &[String]) -> Result<()> {
    if columns.is_empty() {
        return Err(SchemaError::invalid(
            kind.as_str(),
            "at least one column is required",
        ));
    }
    Ok(())
}

fn missing_index_name(kind: CommandKind) -> SchemaError {
    SchemaError::invalid(kind.as_str(), "an index name is required")
}

/// Returns the name of a unique or plain index command after checking it
/// names at least one column.
fn named_index(kind: CommandKind, command: &IndexCommand) -> Result<&str> {
    require_columns(kind, &command.columns)?;
    command
        .index
        .as_deref()
        .ok_or_else(|| missing_index_name(kind))
}

fn require_foreign_target(command: &ForeignKeyCommand) -> Result<()> {
    require_columns(CommandKind::Foreign, &command.columns)?;
    if command.on.is_empty() || command.references.is_empty() {
        return Err(SchemaError::invalid(
            CommandKind::Foreign.as_str(),
            "a referenced table and referenced columns are required",
        ));
    }
    Ok(())
}

fn push_referential_actions(sql: &mut String, command: &ForeignKeyCommand) {
    if let Some(action) = command.on_delete {
        sql.push_str(" on delete ");
        sql.push_str(action.as_sql());
    }
    if let Some(action) = command.on_update {
        sql.push_str(" on update ");
        sql.push_str(action.as_sql());
    }
}

fn char_length(column: &Column) -> Result<u32> {
    column.length.ok_or_else(|| {
        SchemaError::invalid(
            &column.name,
            format!("{} columns need a length", column.type_tag),
        )
    })
}

fn decimal_precision(column: &Column) -> Result<(u32, u32)> {
    match (column.total, column.places) {
        (Some(total), Some(places)) => Ok((total, places)),
        _ => Err(SchemaError::invalid(
            &column.name,
            "decimal columns need both total and places",
        )),
    }
}

/// Both halves of a float precision, or `None` when either is absent.
const fn float_precision(column: &Column) -> Option<(u32, u32)> {
    match (column.total, column.places) {
        (Some(total), Some(places)) => Some((total, places)),
        _ => None,
    }
}

/// Quoted, comma-joined enum values in declaration order.
fn enum_values<G: SchemaGrammar + ?Sized>(grammar: &G, column: &Column) -> Result<String> {
    if column.allowed.is_empty() {
        return Err(SchemaError::invalid(
            &column.name,
            "enum columns need at least one allowed value",
        ));
    }
    Ok(column
        .allowed
        .iter()
        .map(|v| grammar.quote_string(v, '\''))
        .collect::<Vec<_>>()
        .join(", "))
}

fn uses_current(column: &Column) -> bool {
    column.use_current == Some(true)
}
