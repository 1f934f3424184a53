//! SQLite dialect.
//!
//! SQLite cannot add or drop keys on an existing table, so primary and
//! foreign keys are only expressible inside the create statement.

use super::{
    char_length, decimal_precision, enum_values, named_index, push_referential_actions,
    require_columns, require_foreign_target, uses_current, Modifier, SchemaGrammar,
};
use crate::blueprint::Blueprint;
use crate::column::{Column, TypeTag};
use crate::command::{Command, CommandKind, ForeignKeyCommand, IndexCommand};
use crate::config::ConfigAccessor;
use crate::error::{Result, SchemaError};

/// SQLite dialect for schema compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SqliteGrammar {
    table_prefix: String,
}

impl SqliteGrammar {
    /// Creates a new SQLite grammar.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a SQLite grammar that prefixes every table name.
    #[must_use]
    pub fn with_table_prefix(prefix: impl Into<String>) -> Self {
        Self {
            table_prefix: prefix.into(),
        }
    }

    fn foreign_clause(&self, command: &ForeignKeyCommand) -> Result<String> {
        require_foreign_target(command)?;
        let mut sql = format!(
            ", foreign key({}) references {}({})",
            self.columnize(&command.columns),
            self.wrap_table(&command.on),
            self.columnize(&command.references)
        );
        push_referential_actions(&mut sql, command);
        Ok(sql)
    }

    /// Keys are inlined by the create statement; anywhere else they cannot
    /// be expressed.
    fn inline_key(blueprint: &Blueprint, command: CommandKind) -> Result<Vec<String>> {
        if blueprint.creates_table() {
            Ok(Vec::new())
        } else {
            Err(SchemaError::unsupported("sqlite", command))
        }
    }
}

impl SchemaGrammar for SqliteGrammar {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn table_prefix(&self) -> &str {
        &self.table_prefix
    }

    fn quote_char(&self) -> char {
        '"'
    }

    fn modifiers(&self) -> &'static [Modifier] {
        &[Modifier::Nullable, Modifier::Default, Modifier::Increment]
    }

    fn increment_clause(&self) -> &'static str {
        " primary key autoincrement"
    }

    fn type_sql(&self, column: &Column) -> Result<String> {
        let sql = match column.type_tag {
            TypeTag::Char | TypeTag::String => {
                char_length(column)?;
                "varchar".to_string()
            }
            TypeTag::Enum => {
                enum_values(self, column)?;
                "varchar".to_string()
            }
            TypeTag::Uuid | TypeTag::IpAddress | TypeTag::MacAddress => "varchar".to_string(),
            TypeTag::Text
            | TypeTag::MediumText
            | TypeTag::LongText
            | TypeTag::Json
            | TypeTag::Jsonb => "text".to_string(),
            TypeTag::BigInteger
            | TypeTag::Integer
            | TypeTag::MediumInteger
            | TypeTag::SmallInteger
            | TypeTag::TinyInteger => "integer".to_string(),
            TypeTag::Float | TypeTag::Double => "float".to_string(),
            TypeTag::Decimal => {
                decimal_precision(column)?;
                "numeric".to_string()
            }
            TypeTag::Boolean => "tinyint(1)".to_string(),
            TypeTag::Date => "date".to_string(),
            TypeTag::DateTime | TypeTag::DateTimeTz => "datetime".to_string(),
            TypeTag::Time | TypeTag::TimeTz => "time".to_string(),
            TypeTag::Timestamp | TypeTag::TimestampTz => {
                if uses_current(column) {
                    "datetime default CURRENT_TIMESTAMP".to_string()
                } else {
                    "datetime".to_string()
                }
            }
            TypeTag::Binary => "blob".to_string(),
        };
        Ok(sql)
    }

    fn compile_table_exists(&self) -> &'static str {
        "select * from sqlite_master where type = 'table' and name = ?"
    }

    fn compile_column_exists(&self) -> &'static str {
        "select name as column_name from pragma_table_info(?)"
    }

    /// Embeds the blueprint's foreign keys and its primary key in the column
    /// list. Column-level keys count as well as explicit key commands.
    fn compile_create(
        &self,
        blueprint: &Blueprint,
        _config: &dyn ConfigAccessor,
    ) -> Result<Vec<String>> {
        let mut sql = self.create_table_sql(blueprint)?;
        // Reopen the column list to append table constraints.
        sql.pop();

        let commands = blueprint.commands_with_implied();
        let mut primaries = Vec::new();
        for command in &commands {
            match command {
                Command::Foreign(fk) => sql.push_str(&self.foreign_clause(fk)?),
                Command::Primary(cmd) => primaries.push(cmd),
                _ => {}
            }
        }

        let increments = blueprint
            .columns
            .iter()
            .filter(|c| c.is_auto_increment())
            .count();
        if increments + primaries.len() > 1 {
            return Err(SchemaError::invalid(
                &blueprint.table,
                "a table can only have one primary key",
            ));
        }
        if let Some(primary) = primaries.first() {
            require_columns(CommandKind::Primary, &primary.columns)?;
            sql.push_str(&format!(", primary key ({})", self.columnize(&primary.columns)));
        }

        sql.push(')');
        Ok(vec![sql])
    }

    /// SQLite adds one column per statement. An auto-incrementing column
    /// declares a primary key, which an existing table cannot gain.
    fn compile_add(&self, blueprint: &Blueprint) -> Result<Vec<String>> {
        if blueprint.columns.iter().any(Column::is_auto_increment) {
            return Err(SchemaError::unsupported("sqlite", CommandKind::Add));
        }

        let table = self.wrap_table(&blueprint.table);
        Ok(self
            .column_definitions(blueprint, CommandKind::Add)?
            .into_iter()
            .map(|col| format!("alter table {table} add column {col}"))
            .collect())
    }

    fn compile_primary(
        &self,
        blueprint: &Blueprint,
        _command: &IndexCommand,
    ) -> Result<Vec<String>> {
        Self::inline_key(blueprint, CommandKind::Primary)
    }

    fn compile_foreign(
        &self,
        blueprint: &Blueprint,
        _command: &ForeignKeyCommand,
    ) -> Result<Vec<String>> {
        Self::inline_key(blueprint, CommandKind::Foreign)
    }

    fn compile_unique(&self, blueprint: &Blueprint, command: &IndexCommand) -> Result<Vec<String>> {
        let index = named_index(CommandKind::Unique, command)?;
        Ok(vec![format!(
            "create unique index {} on {} ({})",
            self.wrap_value(index),
            self.wrap_table(&blueprint.table),
            self.columnize(&command.columns)
        )])
    }

    fn compile_index(&self, blueprint: &Blueprint, command: &IndexCommand) -> Result<Vec<String>> {
        let index = named_index(CommandKind::Index, command)?;
        Ok(vec![format!(
            "create index {} on {} ({})",
            self.wrap_value(index),
            self.wrap_table(&blueprint.table),
            self.columnize(&command.columns)
        )])
    }

    /// SQLite drops one column per statement.
    fn compile_drop_column(
        &self,
        blueprint: &Blueprint,
        columns: &[String],
    ) -> Result<Vec<String>> {
        require_columns(CommandKind::DropColumn, columns)?;
        let table = self.wrap_table(&blueprint.table);
        Ok(columns
            .iter()
            .map(|c| format!("alter table {table} drop column {}", self.wrap_value(c)))
            .collect())
    }

    fn compile_drop_primary(&self, _blueprint: &Blueprint, _index: Option<&str>) -> Result<String> {
        Err(SchemaError::unsupported("sqlite", CommandKind::DropPrimary))
    }

    fn compile_drop_unique(&self, blueprint: &Blueprint, index: &str) -> String {
        self.compile_drop_index(blueprint, index)
    }

    fn compile_drop_index(&self, _blueprint: &Blueprint, index: &str) -> String {
        format!("drop index {}", self.wrap_value(index))
    }

    fn compile_drop_foreign(&self, _blueprint: &Blueprint, _index: &str) -> Result<String> {
        Err(SchemaError::unsupported("sqlite", CommandKind::DropForeign))
    }

    fn compile_enable_foreign_key_constraints(&self) -> &'static str {
        "PRAGMA foreign_keys = ON;"
    }

    fn compile_disable_foreign_key_constraints(&self) -> &'static str {
        "PRAGMA foreign_keys = OFF;"
    }
}
