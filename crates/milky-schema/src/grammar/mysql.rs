//! MySQL dialect.

use super::{
    char_length, decimal_precision, enum_values, float_precision, named_index, uses_current,
    Modifier, SchemaGrammar,
};
use crate::blueprint::Blueprint;
use crate::column::{Column, TypeTag};
use crate::command::{CommandKind, IndexCommand};
use crate::config::{ConfigAccessor, CHARSET, COLLATION, ENGINE};
use crate::error::Result;

/// MySQL dialect for schema compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MySqlGrammar {
    table_prefix: String,
}

impl MySqlGrammar {
    /// Creates a new MySQL grammar.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a MySQL grammar that prefixes every table name.
    #[must_use]
    pub fn with_table_prefix(prefix: impl Into<String>) -> Self {
        Self {
            table_prefix: prefix.into(),
        }
    }

    /// Renders `alter table <t> add <type> <name>(<columns>)`.
    fn compile_key(
        &self,
        blueprint: &Blueprint,
        command: &IndexCommand,
        kind: CommandKind,
    ) -> Result<Vec<String>> {
        let index = named_index(kind, command)?;
        Ok(vec![format!(
            "alter table {} add {} {}({})",
            self.wrap_table(&blueprint.table),
            kind.as_str(),
            self.wrap_value(index),
            self.columnize(&command.columns)
        )])
    }
}

impl SchemaGrammar for MySqlGrammar {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn table_prefix(&self) -> &str {
        &self.table_prefix
    }

    fn quote_char(&self) -> char {
        '`'
    }

    /// A backslash escapes the next character inside a MySQL literal, so it
    /// is doubled along with the delimiter.
    fn quote_string(&self, value: &str, delimiter: char) -> String {
        let escaped = value
            .replace('\\', "\\\\")
            .replace(delimiter, &format!("{delimiter}{delimiter}"));
        format!("{delimiter}{escaped}{delimiter}")
    }

    fn modifiers(&self) -> &'static [Modifier] {
        &Modifier::ALL
    }

    fn increment_clause(&self) -> &'static str {
        " auto_increment primary key"
    }

    fn type_sql(&self, column: &Column) -> Result<String> {
        let sql = match column.type_tag {
            TypeTag::Char => format!("char({})", char_length(column)?),
            TypeTag::String => format!("varchar({})", char_length(column)?),
            TypeTag::Text => "text".to_string(),
            TypeTag::MediumText => "mediumtext".to_string(),
            TypeTag::LongText => "longtext".to_string(),
            TypeTag::BigInteger => "bigint".to_string(),
            TypeTag::Integer => "int".to_string(),
            TypeTag::MediumInteger => "mediumint".to_string(),
            TypeTag::SmallInteger => "smallint".to_string(),
            TypeTag::TinyInteger => "tinyint".to_string(),
            TypeTag::Float | TypeTag::Double => match float_precision(column) {
                Some((total, places)) => format!("double({total}, {places})"),
                None => "double".to_string(),
            },
            TypeTag::Decimal => {
                let (total, places) = decimal_precision(column)?;
                format!("decimal({total}, {places})")
            }
            TypeTag::Boolean => "tinyint(1)".to_string(),
            TypeTag::Enum => format!("enum({})", enum_values(self, column)?),
            TypeTag::Json | TypeTag::Jsonb => "json".to_string(),
            TypeTag::Date => "date".to_string(),
            TypeTag::DateTime | TypeTag::DateTimeTz => "datetime".to_string(),
            TypeTag::Time | TypeTag::TimeTz => "time".to_string(),
            TypeTag::Timestamp | TypeTag::TimestampTz => {
                if uses_current(column) {
                    "timestamp default CURRENT_TIMESTAMP".to_string()
                } else {
                    "timestamp".to_string()
                }
            }
            TypeTag::Binary => "blob".to_string(),
            TypeTag::Uuid => "char(36)".to_string(),
            TypeTag::IpAddress => "varchar(45)".to_string(),
            TypeTag::MacAddress => "varchar(17)".to_string(),
        };
        Ok(sql)
    }

    fn compile_table_exists(&self) -> &'static str {
        "select * from information_schema.tables where table_schema = ? and table_name = ?"
    }

    fn compile_column_exists(&self) -> &'static str {
        "select column_name from information_schema.columns \
         where table_schema = ? and table_name = ?"
    }

    /// Appends the table encoding and storage engine, preferring the
    /// blueprint's own settings over the connection defaults.
    fn compile_create(
        &self,
        blueprint: &Blueprint,
        config: &dyn ConfigAccessor,
    ) -> Result<Vec<String>> {
        let mut sql = self.create_table_sql(blueprint)?;

        if let Some(charset) = blueprint
            .charset
            .as_deref()
            .or_else(|| config.get(CHARSET))
        {
            sql.push_str(" default character set ");
            sql.push_str(charset);
        }
        if let Some(collation) = blueprint
            .collation
            .as_deref()
            .or_else(|| config.get(COLLATION))
        {
            sql.push_str(" collate ");
            sql.push_str(collation);
        }
        if let Some(engine) = blueprint.engine.as_deref().or_else(|| config.get(ENGINE)) {
            sql.push_str(" engine = ");
            sql.push_str(engine);
        }

        Ok(vec![sql])
    }

    fn compile_unique(&self, blueprint: &Blueprint, command: &IndexCommand) -> Result<Vec<String>> {
        self.compile_key(blueprint, command, CommandKind::Unique)
    }

    fn compile_index(&self, blueprint: &Blueprint, command: &IndexCommand) -> Result<Vec<String>> {
        self.compile_key(blueprint, command, CommandKind::Index)
    }

    fn compile_drop_primary(&self, blueprint: &Blueprint, _index: Option<&str>) -> Result<String> {
        Ok(format!(
            "alter table {} drop primary key",
            self.wrap_table(&blueprint.table)
        ))
    }

    fn compile_drop_unique(&self, blueprint: &Blueprint, index: &str) -> String {
        self.compile_drop_index(blueprint, index)
    }

    fn compile_drop_index(&self, blueprint: &Blueprint, index: &str) -> String {
        format!(
            "alter table {} drop index {}",
            self.wrap_table(&blueprint.table),
            self.wrap_value(index)
        )
    }

    fn compile_drop_foreign(&self, blueprint: &Blueprint, index: &str) -> Result<String> {
        Ok(format!(
            "alter table {} drop foreign key {}",
            self.wrap_table(&blueprint.table),
            self.wrap_value(index)
        ))
    }

    fn compile_rename(&self, blueprint: &Blueprint, to: &str) -> String {
        format!(
            "rename table {} to {}",
            self.wrap_table(&blueprint.table),
            self.wrap_table(to)
        )
    }

    fn compile_enable_foreign_key_constraints(&self) -> &'static str {
        "SET FOREIGN_KEY_CHECKS=1;"
    }

    fn compile_disable_foreign_key_constraints(&self) -> &'static str {
        "SET FOREIGN_KEY_CHECKS=0;"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;
    use crate::config::{ConnectionConfig, NoConfig};
    use crate::error::SchemaError;

    fn type_of(column: &Column) -> String {
        MySqlGrammar::new().type_sql(column).unwrap()
    }

    #[test]
    fn test_mysql_type_table() {
        let mut col = Column::new("c", TypeTag::String);
        col.length = Some(100);
        assert_eq!(type_of(&col), "varchar(100)");

        col.type_tag = TypeTag::Char;
        assert_eq!(type_of(&col), "char(100)");

        for (tag, expected) in [
            (TypeTag::Text, "text"),
            (TypeTag::MediumText, "mediumtext"),
            (TypeTag::LongText, "longtext"),
            (TypeTag::BigInteger, "bigint"),
            (TypeTag::Integer, "int"),
            (TypeTag::MediumInteger, "mediumint"),
            (TypeTag::SmallInteger, "smallint"),
            (TypeTag::TinyInteger, "tinyint"),
            (TypeTag::Double, "double"),
            (TypeTag::Float, "double"),
            (TypeTag::Boolean, "tinyint(1)"),
            (TypeTag::Json, "json"),
            (TypeTag::Jsonb, "json"),
            (TypeTag::Date, "date"),
            (TypeTag::DateTime, "datetime"),
            (TypeTag::DateTimeTz, "datetime"),
            (TypeTag::Time, "time"),
            (TypeTag::TimeTz, "time"),
            (TypeTag::Timestamp, "timestamp"),
            (TypeTag::TimestampTz, "timestamp"),
            (TypeTag::Binary, "blob"),
            (TypeTag::Uuid, "char(36)"),
            (TypeTag::IpAddress, "varchar(45)"),
            (TypeTag::MacAddress, "varchar(17)"),
        ] {
            assert_eq!(type_of(&Column::new("c", tag)), expected, "{tag}");
        }
    }

    #[test]
    fn test_mysql_precision_types() {
        let mut col = Column::new("amount", TypeTag::Decimal);
        col.total = Some(10);
        col.places = Some(2);
        assert_eq!(type_of(&col), "decimal(10, 2)");

        col.type_tag = TypeTag::Float;
        assert_eq!(type_of(&col), "double(10, 2)");

        col.places = None;
        assert_eq!(type_of(&col), "double");
    }

    #[test]
    fn test_mysql_decimal_without_precision_fails() {
        let col = Column::new("amount", TypeTag::Decimal);
        assert!(matches!(
            MySqlGrammar::new().type_sql(&col),
            Err(SchemaError::InvalidDefinition { .. })
        ));
    }

    #[test]
    fn test_mysql_string_without_length_fails() {
        let col = Column::new("name", TypeTag::String);
        assert!(matches!(
            MySqlGrammar::new().type_sql(&col),
            Err(SchemaError::InvalidDefinition { .. })
        ));
    }

    #[test]
    fn test_mysql_timestamp_use_current() {
        let mut col = Column::new("created_at", TypeTag::Timestamp);
        col.use_current = Some(false);
        assert_eq!(type_of(&col), "timestamp");
        col.use_current = Some(true);
        assert_eq!(type_of(&col), "timestamp default CURRENT_TIMESTAMP");
    }

    #[test]
    fn test_mysql_full_modifier_pipeline() {
        let grammar = MySqlGrammar::new();
        let mut col = Column::new("total", TypeTag::Integer);
        col.first = Some(true);
        col.after = Some("id".into());
        col.comment = Some("say \"hi\"".into());
        col.default = Some(crate::column::DefaultValue::Integer(0));
        col.nullable = Some(true);
        col.collation = Some("utf8mb4_bin".into());
        col.charset = Some("utf8mb4".into());
        col.unsigned = Some(true);
        col.stored_as = Some("price * qty".into());
        col.virtual_as = Some("price * 2".into());

        assert_eq!(
            grammar.column_definition(&col).unwrap(),
            "`total` int as (price * 2) as (price * qty) stored unsigned character set utf8mb4 \
             collate utf8mb4_bin null default '0' comment \"say \"\"hi\"\"\" after `id` first"
        );
    }

    #[test]
    fn test_mysql_literals_escape_backslashes() {
        let grammar = MySqlGrammar::new();
        let mut table = Blueprint::new("files");
        table.string("path").default_str("C:\\").comment("dir\\");
        table.enumeration("sep", &["\\", "/"]);

        assert_eq!(
            grammar.compile(&table, &Command::Add, &NoConfig).unwrap(),
            vec![
                "alter table `files` add `path` varchar(255) not null default 'C:\\\\' \
                 comment \"dir\\\\\", add `sep` enum('\\\\', '/') not null"
            ]
        );
    }

    #[test]
    fn test_mysql_false_flags_emit_nothing() {
        let grammar = MySqlGrammar::new();
        let mut col = Column::new("votes", TypeTag::Integer);
        col.unsigned = Some(false);
        col.first = Some(false);
        col.auto_increment = Some(false);
        assert_eq!(grammar.column_definition(&col).unwrap(), "`votes` int not null");
    }

    #[test]
    fn test_mysql_auto_increment_only_on_integers() {
        let grammar = MySqlGrammar::new();
        let mut col = Column::new("code", TypeTag::String);
        col.length = Some(10);
        col.auto_increment = Some(true);
        assert_eq!(
            grammar.column_definition(&col).unwrap(),
            "`code` varchar(10) not null"
        );

        let mut col = Column::new("id", TypeTag::BigInteger);
        col.unsigned = Some(true);
        col.auto_increment = Some(true);
        assert_eq!(
            grammar.column_definition(&col).unwrap(),
            "`id` bigint unsigned auto_increment primary key"
        );
    }

    #[test]
    fn test_mysql_create_encoding_precedence() {
        let grammar = MySqlGrammar::new();
        let mut blueprint = Blueprint::new("users");
        blueprint.string("email");

        let config = ConnectionConfig::new()
            .charset("utf8")
            .collation("utf8_unicode_ci")
            .engine("MyISAM");
        let sql = grammar.compile(&blueprint, &Command::Create, &config).unwrap();
        assert_eq!(
            sql,
            vec![
                "create table `users` (`email` varchar(255) not null) default character set utf8 \
                 collate utf8_unicode_ci engine = MyISAM"
            ]
        );

        blueprint.charset = Some("utf8mb4".into());
        blueprint.engine = Some("InnoDB".into());
        let sql = grammar.compile(&blueprint, &Command::Create, &config).unwrap();
        assert_eq!(
            sql,
            vec![
                "create table `users` (`email` varchar(255) not null) default character set \
                 utf8mb4 collate utf8_unicode_ci engine = InnoDB"
            ]
        );
    }

    #[test]
    fn test_mysql_temporary_table() {
        let mut blueprint = Blueprint::new("sessions");
        blueprint.temporary();
        blueprint.string_with_length("id", 40);

        let sql = MySqlGrammar::new()
            .compile(&blueprint, &Command::Create, &NoConfig)
            .unwrap();
        assert_eq!(
            sql,
            vec!["create temporary table `sessions` (`id` varchar(40) not null)"]
        );
    }

    #[test]
    fn test_mysql_keys() {
        let grammar = MySqlGrammar::new();
        let blueprint = Blueprint::new("users");

        let unique = Command::Unique(IndexCommand::new(
            ["email"],
            Some("users_email_unique".into()),
        ));
        assert_eq!(
            grammar.compile(&blueprint, &unique, &NoConfig).unwrap(),
            vec!["alter table `users` add unique `users_email_unique`(`email`)"]
        );

        let index = Command::Index(IndexCommand::new(
            ["first", "last"],
            Some("users_first_last_index".into()),
        ));
        assert_eq!(
            grammar.compile(&blueprint, &index, &NoConfig).unwrap(),
            vec!["alter table `users` add index `users_first_last_index`(`first`, `last`)"]
        );

        let primary = Command::Primary(IndexCommand::new(["id"], Some("ignored".into())));
        assert_eq!(
            grammar.compile(&blueprint, &primary, &NoConfig).unwrap(),
            vec!["alter table `users` add primary key (`id`)"]
        );
    }

    #[test]
    fn test_mysql_drops() {
        let grammar = MySqlGrammar::new();
        let blueprint = Blueprint::new("users");
        let compile = |command: Command| grammar.compile(&blueprint, &command, &NoConfig).unwrap();

        assert_eq!(
            compile(Command::DropPrimary { index: None }),
            vec!["alter table `users` drop primary key"]
        );
        assert_eq!(
            compile(Command::DropUnique { index: "users_email_unique".into() }),
            vec!["alter table `users` drop index `users_email_unique`"]
        );
        assert_eq!(
            compile(Command::DropIndex { index: "users_name_index".into() }),
            vec!["alter table `users` drop index `users_name_index`"]
        );
        assert_eq!(
            compile(Command::DropForeign { index: "users_team_id_foreign".into() }),
            vec!["alter table `users` drop foreign key `users_team_id_foreign`"]
        );
        assert_eq!(
            compile(Command::DropColumn { columns: vec!["a".into(), "b".into()] }),
            vec!["alter table `users` drop `a`, drop `b`"]
        );
        assert_eq!(compile(Command::Drop), vec!["drop table `users`"]);
        assert_eq!(compile(Command::DropIfExists), vec!["drop table if exists `users`"]);
    }

    #[test]
    fn test_mysql_table_prefix() {
        let grammar = MySqlGrammar::with_table_prefix("app_");
        let blueprint = Blueprint::new("users");
        let sql = grammar
            .compile(&blueprint, &Command::Rename { to: "people".into() }, &NoConfig)
            .unwrap();
        assert_eq!(sql, vec!["rename table `app_users` to `app_people`"]);
    }
}
