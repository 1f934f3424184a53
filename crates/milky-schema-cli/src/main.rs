//! milky-schema CLI
//!
//! Compiles JSON table blueprints into DDL statements.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use milky_schema::{
    Blueprint, ConnectionConfig, MySqlGrammar, PostgresGrammar, SchemaGrammar, SqliteGrammar,
};

/// Compile table blueprints into schema DDL.
#[derive(Parser)]
#[command(name = "milky-schema")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the statements of one or more blueprints.
    Compile {
        /// JSON file holding a blueprint or an array of blueprints.
        blueprint: PathBuf,

        /// Target dialect.
        #[arg(
            short,
            long,
            env = "MILKY_SCHEMA_DIALECT",
            value_enum,
            default_value_t = Dialect::Mysql
        )]
        dialect: Dialect,

        /// JSON file holding the connection configuration.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Table prefix, overriding the configured one.
        #[arg(short, long)]
        prefix: Option<String>,
    },

    /// Print the table and column probe queries.
    Probe {
        /// Target dialect.
        #[arg(
            short,
            long,
            env = "MILKY_SCHEMA_DIALECT",
            value_enum,
            default_value_t = Dialect::Mysql
        )]
        dialect: Dialect,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Dialect {
    Mysql,
    Postgres,
    Sqlite,
}

impl Dialect {
    fn grammar(self, prefix: String) -> Box<dyn SchemaGrammar> {
        match self {
            Self::Mysql => Box::new(MySqlGrammar::with_table_prefix(prefix)),
            Self::Postgres => Box::new(PostgresGrammar::with_table_prefix(prefix)),
            Self::Sqlite => Box::new(SqliteGrammar::with_table_prefix(prefix)),
        }
    }
}

/// Reads a file holding one blueprint or an array of blueprints.
fn load_blueprints(path: &Path) -> anyhow::Result<Vec<Blueprint>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read blueprint file {}", path.display()))?;
    let parse_error = || format!("Failed to parse blueprint file {}", path.display());

    let value: serde_json::Value = serde_json::from_str(&raw).with_context(parse_error)?;
    if value.is_array() {
        serde_json::from_value(value).with_context(parse_error)
    } else {
        let blueprint: Blueprint = serde_json::from_value(value).with_context(parse_error)?;
        Ok(vec![blueprint])
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ConnectionConfig> {
    let Some(path) = path else {
        return Ok(ConnectionConfig::default());
    };
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}

/// Compiles every blueprint in `blueprint_path` into terminated statements.
fn compile_file(
    blueprint_path: &Path,
    dialect: Dialect,
    config_path: Option<&Path>,
    prefix: Option<String>,
) -> anyhow::Result<Vec<String>> {
    let blueprints = load_blueprints(blueprint_path)?;
    let config = load_config(config_path)?;
    let prefix = prefix.or_else(|| config.prefix.clone()).unwrap_or_default();
    let grammar = dialect.grammar(prefix);

    let mut statements = Vec::new();
    for blueprint in &blueprints {
        let sql = blueprint
            .to_sql(grammar.as_ref(), &config)
            .with_context(|| {
                format!("Failed to compile blueprint for table '{}'", blueprint.table)
            })?;
        debug!(table = %blueprint.table, statements = sql.len(), "Compiled blueprint");
        statements.extend(sql.into_iter().map(terminate));
    }

    info!(
        dialect = grammar.name(),
        blueprints = blueprints.len(),
        statements = statements.len(),
        "Compilation finished"
    );
    Ok(statements)
}

fn probe_queries(dialect: Dialect) -> [String; 2] {
    let grammar = dialect.grammar(String::new());
    [
        terminate(grammar.compile_table_exists().to_string()),
        terminate(grammar.compile_column_exists().to_string()),
    ]
}

fn terminate(mut sql: String) -> String {
    if !sql.ends_with(';') {
        sql.push(';');
    }
    sql
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays executable SQL.
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let statements = match cli.command {
        Commands::Compile {
            blueprint,
            dialect,
            config,
            prefix,
        } => compile_file(&blueprint, dialect, config.as_deref(), prefix)?,
        Commands::Probe { dialect } => probe_queries(dialect).to_vec(),
    };

    for sql in statements {
        println!("{sql}");
    }
    Ok(())
}
