//! # milky-schema
//!
//! Compiles dialect-neutral table blueprints into schema DDL statements.
//!
//! This crate provides:
//! - A [`Blueprint`] describing one table: ordered columns plus ordered
//!   schema commands
//! - The [`SchemaGrammar`] trait with MySQL, PostgreSQL and SQLite dialects
//! - A read-only [`ConfigAccessor`] for connection defaults such as the
//!   storage engine or character set
//!
//! Compilation is a pure function of the blueprint, one command and a
//! configuration snapshot. Grammars hold only immutable settings, so a single
//! instance can be shared across threads.
//!
//! ## Compiling a Blueprint
//!
//! ```rust
//! use milky_schema::{Blueprint, Command, MySqlGrammar, NoConfig, SchemaGrammar};
//!
//! let mut users = Blueprint::new("users");
//! users.integer("id").auto_increment();
//! users.string("name").not_null();
//!
//! let grammar = MySqlGrammar::new();
//! let sql = grammar.compile(&users, &Command::Create, &NoConfig).unwrap();
//! assert_eq!(
//!     sql,
//!     vec!["create table `users` (`id` int auto_increment primary key, \
//!           `name` varchar(255) not null)"]
//! );
//!
//! let sql = grammar
//!     .compile(&users, &Command::Rename { to: "people".into() }, &NoConfig)
//!     .unwrap();
//! assert_eq!(sql, vec!["rename table `users` to `people`"]);
//! ```
//!
//! ## Failing Fast
//!
//! Incomplete definitions are rejected instead of silently defaulted:
//!
//! ```rust
//! use milky_schema::{
//!     Blueprint, Command, MySqlGrammar, NoConfig, SchemaError, SchemaGrammar, TypeTag,
//! };
//!
//! let mut table = Blueprint::new("orders");
//! table.add_column(TypeTag::Decimal, "amount");
//!
//! let result = MySqlGrammar::new().compile(&table, &Command::Create, &NoConfig);
//! assert!(matches!(result, Err(SchemaError::InvalidDefinition { .. })));
//! ```

pub mod blueprint;
pub mod column;
pub mod command;
pub mod config;
pub mod error;
pub mod grammar;

pub use blueprint::Blueprint;
pub use column::{Column, ColumnHandle, ColumnIndex, DefaultValue, TypeTag};
pub use command::{
    Command, CommandKind, ForeignKeyAction, ForeignKeyCommand, ForeignKeyHandle, IndexCommand,
};
pub use config::{ConfigAccessor, ConnectionConfig, NoConfig};
pub use error::{Result, SchemaError};
pub use grammar::{Modifier, MySqlGrammar, PostgresGrammar, SchemaGrammar, SqliteGrammar};
