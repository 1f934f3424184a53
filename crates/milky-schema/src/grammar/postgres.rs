//! PostgreSQL dialect.

use super::{
    char_length, decimal_precision, enum_values, named_index, uses_current, Modifier,
    SchemaGrammar,
};
use crate::blueprint::Blueprint;
use crate::column::{Column, TypeTag};
use crate::command::{CommandKind, IndexCommand};
use crate::error::Result;

/// PostgreSQL dialect for schema compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostgresGrammar {
    table_prefix: String,
}

impl PostgresGrammar {
    /// Creates a new PostgreSQL grammar.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a PostgreSQL grammar that prefixes every table name.
    #[must_use]
    pub fn with_table_prefix(prefix: impl Into<String>) -> Self {
        Self {
            table_prefix: prefix.into(),
        }
    }

    /// Picks the serial flavor of an integer type when it auto-increments.
    fn integer_sql(column: &Column, plain: &str, serial: &str) -> String {
        if column.is_auto_increment() {
            serial.to_string()
        } else {
            plain.to_string()
        }
    }
}

impl SchemaGrammar for PostgresGrammar {
    fn name(&self) -> &'static str {
        "postgres"
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

    // Serial types carry the sequence; the clause only adds the key.
    fn increment_clause(&self) -> &'static str {
        " primary key"
    }

    fn type_sql(&self, column: &Column) -> Result<String> {
        let sql = match column.type_tag {
            TypeTag::Char => format!("char({})", char_length(column)?),
            TypeTag::String => format!("varchar({})", char_length(column)?),
            TypeTag::Text | TypeTag::MediumText | TypeTag::LongText => "text".to_string(),
            TypeTag::BigInteger => Self::integer_sql(column, "bigint", "bigserial"),
            TypeTag::Integer | TypeTag::MediumInteger => {
                Self::integer_sql(column, "integer", "serial")
            }
            TypeTag::SmallInteger | TypeTag::TinyInteger => {
                Self::integer_sql(column, "smallint", "smallserial")
            }
            TypeTag::Float | TypeTag::Double => "double precision".to_string(),
            TypeTag::Decimal => {
                let (total, places) = decimal_precision(column)?;
                format!("decimal({total}, {places})")
            }
            TypeTag::Boolean => "boolean".to_string(),
            TypeTag::Enum => format!(
                "varchar(255) check ({} in ({}))",
                self.wrap_value(&column.name),
                enum_values(self, column)?
            ),
            TypeTag::Json => "json".to_string(),
            TypeTag::Jsonb => "jsonb".to_string(),
            TypeTag::Date => "date".to_string(),
            TypeTag::DateTime => "timestamp(0) without time zone".to_string(),
            TypeTag::DateTimeTz => "timestamp(0) with time zone".to_string(),
            TypeTag::Time => "time(0) without time zone".to_string(),
            TypeTag::TimeTz => "time(0) with time zone".to_string(),
            TypeTag::Timestamp | TypeTag::TimestampTz => {
                let zone = if column.type_tag == TypeTag::Timestamp {
                    "without"
                } else {
                    "with"
                };
                if uses_current(column) {
                    format!("timestamp(0) {zone} time zone default CURRENT_TIMESTAMP(0)")
                } else {
                    format!("timestamp(0) {zone} time zone")
                }
            }
            TypeTag::Binary => "bytea".to_string(),
            TypeTag::Uuid => "uuid".to_string(),
            TypeTag::IpAddress => "inet".to_string(),
            TypeTag::MacAddress => "macaddr".to_string(),
        };
        Ok(sql)
    }

    fn compile_table_exists(&self) -> &'static str {
        "select * from information_schema.tables where table_schema = ? and table_name = ?"
    }

    fn compile_column_exists(&self) -> &'static str {
        "select column_name from information_schema.columns where table_name = ?"
    }

    fn add_column_keyword(&self) -> &'static str {
        "add column"
    }

    fn drop_column_keyword(&self) -> &'static str {
        "drop column"
    }

    fn compile_unique(&self, blueprint: &Blueprint, command: &IndexCommand) -> Result<Vec<String>> {
        let index = named_index(CommandKind::Unique, command)?;
        Ok(vec![format!(
            "alter table {} add constraint {} unique ({})",
            self.wrap_table(&blueprint.table),
            self.wrap_value(index),
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

    /// Drops the named constraint, or `<table>_pkey` when no name is given.
    fn compile_drop_primary(&self, blueprint: &Blueprint, index: Option<&str>) -> Result<String> {
        let constraint = index.map_or_else(
            || format!("{}{}_pkey", self.table_prefix, blueprint.table),
            str::to_string,
        );
        Ok(format!(
            "alter table {} drop constraint {}",
            self.wrap_table(&blueprint.table),
            self.wrap_value(&constraint)
        ))
    }

    fn compile_drop_unique(&self, blueprint: &Blueprint, index: &str) -> String {
        format!(
            "alter table {} drop constraint {}",
            self.wrap_table(&blueprint.table),
            self.wrap_value(index)
        )
    }

    fn compile_drop_index(&self, _blueprint: &Blueprint, index: &str) -> String {
        format!("drop index {}", self.wrap_value(index))
    }

    fn compile_drop_foreign(&self, blueprint: &Blueprint, index: &str) -> Result<String> {
        Ok(self.compile_drop_unique(blueprint, index))
    }

    fn compile_enable_foreign_key_constraints(&self) -> &'static str {
        "SET CONSTRAINTS ALL IMMEDIATE;"
    }

    fn compile_disable_foreign_key_constraints(&self) -> &'static str {
        "SET CONSTRAINTS ALL DEFERRED;"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{Command, ForeignKeyAction, ForeignKeyCommand};
    use crate::config::NoConfig;

    #[test]
    fn test_postgres_serial_types() {
        let grammar = PostgresGrammar::new();
        let mut col = Column::new("id", TypeTag::BigInteger);
        assert_eq!(grammar.type_sql(&col).unwrap(), "bigint");
        col.auto_increment = Some(true);
        assert_eq!(grammar.type_sql(&col).unwrap(), "bigserial");
        assert_eq!(
            grammar.column_definition(&col).unwrap(),
            "\"id\" bigserial primary key"
        );

        let mut col = Column::new("n", TypeTag::TinyInteger);
        col.auto_increment = Some(true);
        assert_eq!(grammar.type_sql(&col).unwrap(), "smallserial");
    }

    #[test]
    fn test_postgres_type_table() {
        let grammar = PostgresGrammar::new();
        for (tag, expected) in [
            (TypeTag::MediumText, "text"),
            (TypeTag::Integer, "integer"),
            (TypeTag::MediumInteger, "integer"),
            (TypeTag::Float, "double precision"),
            (TypeTag::Boolean, "boolean"),
            (TypeTag::Jsonb, "jsonb"),
            (TypeTag::DateTimeTz, "timestamp(0) with time zone"),
            (TypeTag::Time, "time(0) without time zone"),
            (TypeTag::Timestamp, "timestamp(0) without time zone"),
            (TypeTag::Binary, "bytea"),
            (TypeTag::Uuid, "uuid"),
            (TypeTag::IpAddress, "inet"),
            (TypeTag::MacAddress, "macaddr"),
        ] {
            assert_eq!(
                grammar.type_sql(&Column::new("c", tag)).unwrap(),
                expected,
                "{tag}"
            );
        }

        let mut col = Column::new("created_at", TypeTag::TimestampTz);
        col.use_current = Some(true);
        assert_eq!(
            grammar.type_sql(&col).unwrap(),
            "timestamp(0) with time zone default CURRENT_TIMESTAMP(0)"
        );
    }

    #[test]
    fn test_postgres_enum_check_constraint() {
        let mut col = Column::new("status", TypeTag::Enum);
        col.allowed = vec!["draft".into(), "live".into()];
        assert_eq!(
            PostgresGrammar::new().column_definition(&col).unwrap(),
            "\"status\" varchar(255) check (\"status\" in ('draft', 'live')) not null"
        );
    }

    #[test]
    fn test_postgres_ignores_mysql_only_modifiers() {
        let mut col = Column::new("votes", TypeTag::Integer);
        col.unsigned = Some(true);
        col.comment = Some("count".into());
        col.after = Some("id".into());
        col.nullable = Some(true);
        col.default = Some(crate::column::DefaultValue::Integer(0));
        assert_eq!(
            PostgresGrammar::new().column_definition(&col).unwrap(),
            "\"votes\" integer null default '0'"
        );
    }

    #[test]
    fn test_postgres_statements() {
        let grammar = PostgresGrammar::with_table_prefix("app_");
        let mut blueprint = Blueprint::new("users");
        blueprint.string("email");
        let compile = |command: Command| grammar.compile(&blueprint, &command, &NoConfig).unwrap();

        assert_eq!(
            compile(Command::Add),
            vec!["alter table \"app_users\" add column \"email\" varchar(255) not null"]
        );
        assert_eq!(
            compile(Command::Unique(IndexCommand::new(
                ["email"],
                Some("users_email_unique".into()),
            ))),
            vec![
                "alter table \"app_users\" add constraint \"users_email_unique\" \
                 unique (\"email\")"
            ]
        );
        assert_eq!(
            compile(Command::Index(IndexCommand::new(
                ["email"],
                Some("users_email_index".into()),
            ))),
            vec!["create index \"users_email_index\" on \"app_users\" (\"email\")"]
        );
        assert_eq!(
            compile(Command::DropPrimary { index: None }),
            vec!["alter table \"app_users\" drop constraint \"app_users_pkey\""]
        );
        assert_eq!(
            compile(Command::DropIndex { index: "users_email_index".into() }),
            vec!["drop index \"users_email_index\""]
        );
        assert_eq!(
            compile(Command::DropColumn { columns: vec!["email".into()] }),
            vec!["alter table \"app_users\" drop column \"email\""]
        );
        assert_eq!(
            compile(Command::Rename { to: "people".into() }),
            vec!["alter table \"app_users\" rename to \"app_people\""]
        );
        assert_eq!(
            compile(Command::DisableForeignKeyConstraints),
            vec!["SET CONSTRAINTS ALL DEFERRED;"]
        );
    }

    #[test]
    fn test_postgres_foreign_key() {
        let grammar = PostgresGrammar::new();
        let blueprint = Blueprint::new("posts");
        let mut fk = ForeignKeyCommand::new(["user_id"], Some("posts_user_id_foreign".into()));
        fk.references = vec!["id".into()];
        fk.on = "users".into();
        fk.on_delete = Some(ForeignKeyAction::Cascade);

        assert_eq!(
            grammar
                .compile(&blueprint, &Command::Foreign(fk), &NoConfig)
                .unwrap(),
            vec![
                "alter table \"posts\" add constraint \"posts_user_id_foreign\" foreign key \
                 (\"user_id\") references \"users\" (\"id\") on delete cascade"
            ]
        );
    }

    #[test]
    fn test_postgres_literals_keep_backslashes() {
        let grammar = PostgresGrammar::new();
        let mut table = Blueprint::new("files");
        table.string("path").default_str("C:\\");

        assert_eq!(
            grammar.compile(&table, &Command::Add, &NoConfig).unwrap(),
            vec!["alter table \"files\" add column \"path\" varchar(255) not null default 'C:\\'"]
        );
    }
}
