//! rowset — run raw SQL, export the rows.
//!
//! # Usage
//!
//! ```bash
//! # Run a query and print an aligned table
//! rowset "SELECT * FROM users" --url sqlite://app.db
//!
//! # Export as CSV, with a named parameter
//! rowset "SELECT * FROM repos WHERE language = :lang" \
//!     --param lang=rust --format csv
//!
//! # Run a .sql file against $DATABASE_URL
//! rowset report.sql --format json > report.json
//! ```

use std::path::Path;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use colored::*;
use rowset::prelude::*;

#[derive(Parser)]
#[command(name = "rowset")]
#[command(version)]
#[command(about = "Run raw SQL and export the rows", long_about = None)]
#[command(after_help = "EXAMPLES:
    rowset 'SELECT * FROM users' --url sqlite://app.db
    rowset 'SELECT * FROM repos WHERE language = :lang' --param lang=rust --format csv
    rowset report.sql --format json > report.json")]
struct Cli {
    /// The SQL to run: a literal statement, or the path of a .sql file
    query: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    format: OutputFormat,

    /// Query parameters in key=value form, referenced as :key in the SQL
    #[arg(short, long)]
    param: Vec<String>,

    /// Database connection URL
    #[arg(long, env = "DATABASE_URL")]
    url: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Csv,
    Tsv,
    Json,
    Yaml,
    Html,
    Latex,
}

impl OutputFormat {
    fn export_format(self) -> Option<Format> {
        match self {
            OutputFormat::Table => None,
            OutputFormat::Csv => Some(Format::Csv),
            OutputFormat::Tsv => Some(Format::Tsv),
            OutputFormat::Json => Some(Format::Json),
            OutputFormat::Yaml => Some(Format::Yaml),
            OutputFormat::Html => Some(Format::Html),
            OutputFormat::Latex => Some(Format::Latex),
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(&cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    let url = cli
        .url
        .as_deref()
        .context("no database URL; use --url or set DATABASE_URL")?;

    if cli.verbose {
        eprintln!("{} {}", "Connecting to:".dimmed(), url);
    }
    let db = Database::connect(url).await?;

    // A query argument that names an existing file is read as one.
    let mut query = if Path::new(&cli.query).is_file() {
        db.query_file(&cli.query)?
    } else {
        db.query(&cli.query)
    };

    for pair in &cli.param {
        let (key, value) = pair
            .split_once('=')
            .with_context(|| format!("parameter '{pair}' must be given in key=value form"))?;
        query = query.param(key, coerce(value));
    }

    if cli.verbose {
        eprintln!("{} {}", "SQL:".dimmed(), query.sql().trim());
    }

    let rows = query.fetch().await?;

    match cli.format.export_format() {
        Some(format) => {
            let out = rows.export(format)?;
            print!("{out}");
            if !out.ends_with('\n') {
                println!();
            }
        }
        None => print_table(&rows.dataset()?),
    }

    Ok(())
}

/// Coerce a command-line value: number, then bool, then string.
fn coerce(value: &str) -> SqlValue {
    if let Ok(n) = value.parse::<i64>() {
        SqlValue::Int(n)
    } else if let Ok(f) = value.parse::<f64>() {
        SqlValue::Float(f)
    } else if value == "true" {
        SqlValue::Bool(true)
    } else if value == "false" {
        SqlValue::Bool(false)
    } else {
        SqlValue::String(value.to_string())
    }
}

fn print_table(data: &Dataset) {
    if data.is_empty() {
        println!("{}", "(no results)".dimmed());
        return;
    }

    // Calculate column widths
    let mut widths: Vec<usize> = data.headers().iter().map(String::len).collect();
    for row in data.rows() {
        for (i, value) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell(value).len());
        }
    }

    // Print header
    let header: Vec<String> = data
        .headers()
        .iter()
        .zip(&widths)
        .map(|(h, w)| format!("{h:width$}", width = *w))
        .collect();
    println!("{}", header.join(" │ ").white().bold());

    // Print separator
    let sep: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
    println!("{}", sep.join("─┼─").dimmed());

    // Print rows
    for row in data.rows() {
        let cells: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!("{:width$}", cell(v), width = *w))
            .collect();
        println!("{}", cells.join(" │ "));
    }

    println!();
    println!("{} row(s) returned", data.len().to_string().cyan());
}

fn cell(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => "NULL".to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) => s.clone(),
        _ => value.to_string(),
    }
}
