//! oxide-dialect CLI
//!
//! Command-line tool for inspecting how a dialect maps models to SQL.

use std::fmt;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use oxide_dialect::prelude::*;

/// Column types and identifier names for ORM schema generation.
#[derive(Parser)]
#[command(name = "oxide-dialect")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Dialect to use.
    #[arg(short, long, env = "OXIDE_DIALECT", default_value = "oracle")]
    dialect: String,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve column types and index names of a JSON model file.
    Types {
        /// Path to the model file.
        model: PathBuf,
    },

    /// Generate the name of an index or constraint.
    KeyName {
        /// Key kind prefix (idx, uix, fk, ...).
        kind: String,

        /// Table name.
        table: String,

        /// Indexed fields.
        fields: Vec<String>,
    },

    /// Show the pagination fragment for a limit and an offset.
    Limit {
        /// Maximum number of rows.
        #[arg(long)]
        limit: Option<String>,

        /// Number of rows to skip.
        #[arg(long)]
        offset: Option<String>,
    },

    /// List available dialects.
    Dialects,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
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

    let registry = DialectRegistry::with_builtin();

    let dialect = || registry.require(&cli.dialect);

    match cli.command {
        Commands::Types { model } => {
            let dialect = dialect()?;
            let file = ModelFile::from_path(&model)
                .with_context(|| format!("failed to load model {}", model.display()))?;
            info!(
                dialect = dialect.name(),
                tables = file.tables.len(),
                "Resolving model"
            );

            for table in &file.tables {
                for field in table.descriptions() {
                    let sql_type = dialect
                        .try_data_type_of(&field)
                        .with_context(|| format!("failed to resolve {}.{}", table.name, field.name))?;
                    println!("{}.{}\t{}", table.name, field.name, sql_type);
                }
                for index in &table.indexes {
                    println!(
                        "{}.{}({})\t{}",
                        table.name,
                        index.kind,
                        index.fields.join(","),
                        index.key_name(dialect.as_ref(), &table.name)
                    );
                }
            }
        }

        Commands::KeyName {
            kind,
            table,
            fields,
        } => {
            let dialect = dialect()?;
            let fields: Vec<&str> = fields.iter().map(String::as_str).collect();
            println!("{}", dialect.build_key_name(&kind, &table, &fields));
        }

        Commands::Limit { limit, offset } => {
            let dialect = dialect()?;
            let limit = limit.as_ref().map(|v| v as &dyn fmt::Display);
            let offset = offset.as_ref().map(|v| v as &dyn fmt::Display);
            println!("{}", dialect.limit_and_offset_sql(limit, offset).trim_start());
        }

        Commands::Dialects => {
            for name in registry.names() {
                println!("{name}");
            }
        }
    }

    Ok(())
}
