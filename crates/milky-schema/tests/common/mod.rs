#![allow(dead_code)]

use milky_schema::{
    Blueprint, Command, ConfigAccessor, MySqlGrammar, NoConfig, SchemaError, SchemaGrammar,
};

pub fn compile(
    grammar: &dyn SchemaGrammar,
    blueprint: &Blueprint,
    command: &Command,
) -> Vec<String> {
    grammar
        .compile(blueprint, command, &NoConfig)
        .unwrap_or_else(|e| panic!("Failed to compile {:?}: {e}", command.kind()))
}

pub fn compile_with(
    grammar: &dyn SchemaGrammar,
    blueprint: &Blueprint,
    command: &Command,
    config: &dyn ConfigAccessor,
) -> Vec<String> {
    grammar
        .compile(blueprint, command, config)
        .unwrap_or_else(|e| panic!("Failed to compile {:?}: {e}", command.kind()))
}

pub fn compile_err(
    grammar: &dyn SchemaGrammar,
    blueprint: &Blueprint,
    command: &Command,
) -> SchemaError {
    grammar
        .compile(blueprint, command, &NoConfig)
        .expect_err(&format!("Expected error for {:?}", command.kind()))
}

pub fn mysql(blueprint: &Blueprint, command: &Command) -> Vec<String> {
    compile(&MySqlGrammar::new(), blueprint, command)
}

/// The `users` table used by the end-to-end scenarios.
pub fn users() -> Blueprint {
    let mut users = Blueprint::new("users");
    users.integer("id").auto_increment();
    users.string("name").not_null();
    users
}
