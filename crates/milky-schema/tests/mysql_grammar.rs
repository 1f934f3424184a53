//! End-to-end tests for the MySQL grammar.

mod common;
use common::*;

use milky_schema::{
    Blueprint, Column, Command, CommandKind, ConnectionConfig, IndexCommand, MySqlGrammar,
    SchemaError, SchemaGrammar, TypeTag,
};

#[test]
fn create_users_table() {
    assert_eq!(
        mysql(&users(), &Command::Create),
        vec![
            "create table `users` (`id` int auto_increment primary key, \
             `name` varchar(255) not null)"
        ]
    );
}

#[test]
fn create_is_deterministic() {
    let users = users();
    assert_eq!(mysql(&users, &Command::Create), mysql(&users, &Command::Create));
}

#[test]
fn create_appends_configured_table_options() {
    let config = ConnectionConfig::new().engine("InnoDB").charset("utf8mb4");
    let sql = compile_with(&MySqlGrammar::new(), &users(), &Command::Create, &config);
    assert_eq!(
        sql,
        vec![
            "create table `users` (`id` int auto_increment primary key, `name` varchar(255) \
             not null) default character set utf8mb4 engine = InnoDB"
        ]
    );
}

#[test]
fn rename_table() {
    assert_eq!(
        mysql(&users(), &Command::Rename { to: "people".into() }),
        vec!["rename table `users` to `people`"]
    );
}

#[test]
fn add_columns() {
    let mut table = Blueprint::new("users");
    table.string("nickname").nullable().after("name");
    table.boolean("active").default_bool(false);

    assert_eq!(
        mysql(&table, &Command::Add),
        vec![
            "alter table `users` add `nickname` varchar(255) null after `name`, \
             add `active` tinyint(1) not null default '0'"
        ]
    );
}

#[test]
fn drop_and_drop_if_exists_differ_only_by_if_exists() {
    let users = users();
    let drop = mysql(&users, &Command::Drop).remove(0);
    let drop_if_exists = mysql(&users, &Command::DropIfExists).remove(0);

    assert_eq!(drop, "drop table `users`");
    assert_eq!(drop_if_exists.replace(" if exists", ""), drop);
}

#[test]
fn modifier_order_is_independent_of_attribute_order() {
    let mut first = Blueprint::new("t");
    first.integer("votes").unsigned().nullable();
    let mut second = Blueprint::new("t");
    second.integer("votes").nullable().unsigned();

    let grammar = MySqlGrammar::new();
    let a = grammar.column_definition(&first.columns[0]).unwrap();
    let b = grammar.column_definition(&second.columns[0]).unwrap();
    assert_eq!(a, "`votes` int unsigned null");
    assert_eq!(a, b);
}

#[test]
fn type_mapping_examples() {
    let grammar = MySqlGrammar::new();

    let mut decimal = Column::new("amount", TypeTag::Decimal);
    decimal.total = Some(10);
    decimal.places = Some(2);
    assert_eq!(grammar.type_sql(&decimal).unwrap(), "decimal(10, 2)");

    let mut choice = Column::new("choice", TypeTag::Enum);
    choice.allowed = vec!["a".into(), "b".into()];
    assert_eq!(grammar.type_sql(&choice).unwrap(), "enum('a', 'b')");

    let double = Column::new("ratio", TypeTag::Double);
    assert_eq!(grammar.type_sql(&double).unwrap(), "double");
}

#[test]
fn decimal_without_precision_is_invalid() {
    let mut table = Blueprint::new("orders");
    table.add_column(TypeTag::Decimal, "amount");

    assert!(matches!(
        compile_err(&MySqlGrammar::new(), &table, &Command::Create),
        SchemaError::InvalidDefinition { .. }
    ));
}

#[test]
fn enum_without_values_is_invalid() {
    let mut table = Blueprint::new("posts");
    table.enumeration("status", &[]);

    assert!(matches!(
        compile_err(&MySqlGrammar::new(), &table, &Command::Create),
        SchemaError::InvalidDefinition { .. }
    ));
}

#[test]
fn empty_column_name_is_invalid() {
    let mut table = Blueprint::new("posts");
    table.integer("");

    assert!(matches!(
        compile_err(&MySqlGrammar::new(), &table, &Command::Create),
        SchemaError::InvalidDefinition { .. }
    ));
}

#[test]
fn create_without_columns_is_invalid() {
    let table = Blueprint::new("empty");
    assert!(matches!(
        compile_err(&MySqlGrammar::new(), &table, &Command::Create),
        SchemaError::InvalidDefinition { .. }
    ));
}

#[test]
fn index_without_columns_is_invalid() {
    let command = Command::Index(IndexCommand::new(Vec::<String>::new(), Some("idx".into())));
    assert!(matches!(
        compile_err(&MySqlGrammar::new(), &users(), &command),
        SchemaError::InvalidDefinition { .. }
    ));
}

#[test]
fn primary_suppresses_index_name() {
    let command = Command::Primary(IndexCommand::new(["id"], Some("users_id_primary".into())));
    assert_eq!(
        mysql(&users(), &command),
        vec!["alter table `users` add primary key (`id`)"]
    );
}

#[test]
fn key_command_with_unknown_column_fails_on_create() {
    let mut table = users();
    table.create();
    let command = Command::Unique(IndexCommand::new(["email"], Some("users_email_unique".into())));

    assert_eq!(
        compile_err(&MySqlGrammar::new(), &table, &command),
        SchemaError::UnresolvedReference {
            column: "email".into(),
            command: CommandKind::Unique,
        }
    );
}

#[test]
fn identifiers_are_escaped() {
    let mut table = Blueprint::new("we`ird");
    table.integer("co`l");
    assert_eq!(
        mysql(&table, &Command::Create),
        vec!["create table `we``ird` (`co``l` int not null)"]
    );
}

#[test]
fn bit_exact_probes_and_toggles() {
    let grammar = MySqlGrammar::new();
    assert_eq!(
        grammar.compile_table_exists(),
        "select * from information_schema.tables where table_schema = ? and table_name = ?"
    );
    assert_eq!(
        grammar.compile_column_exists(),
        "select column_name from information_schema.columns \
         where table_schema = ? and table_name = ?"
    );
    assert_eq!(
        mysql(&users(), &Command::EnableForeignKeyConstraints),
        vec!["SET FOREIGN_KEY_CHECKS=1;"]
    );
    assert_eq!(
        mysql(&users(), &Command::DisableForeignKeyConstraints),
        vec!["SET FOREIGN_KEY_CHECKS=0;"]
    );
}

#[test]
fn grammar_is_shareable_across_threads() {
    let grammar = std::sync::Arc::new(MySqlGrammar::new());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let grammar = std::sync::Arc::clone(&grammar);
            std::thread::spawn(move || mysql_with(&*grammar))
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), mysql(&users(), &Command::Create));
    }
}

fn mysql_with(grammar: &dyn SchemaGrammar) -> Vec<String> {
    compile(grammar, &users(), &Command::Create)
}
