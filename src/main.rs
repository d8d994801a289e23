//! memquery - run SQL queries against JSON tables held in memory

use anyhow::{bail, Context, Result};
use clap::{Parser as ClapParser, ValueEnum};
use log::info;
use memquery::{QueryResult, Session, TableView, Value};
use std::io::{self, BufRead};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Table,
}

/// memquery - an in-memory SQL engine over JSON tables
#[derive(ClapParser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Table to load, as NAME=PATH to a JSON array of objects (repeatable)
    #[arg(short, long = "table", value_parser = parse_table_arg)]
    tables: Vec<(String, PathBuf)>,

    /// Statement to run. Without it statements are read from stdin, one per line
    #[arg(short, long)]
    query: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    format: OutputFormat,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// List the registered functions and exit
    #[arg(long)]
    list_functions: bool,
}

fn parse_table_arg(arg: &str) -> Result<(String, PathBuf)> {
    match arg.split_once('=') {
        Some((name, path)) if !name.is_empty() && !path.is_empty() => {
            Ok((name.to_string(), PathBuf::from(path)))
        }
        _ => bail!("Expected NAME=PATH, got '{}'", arg),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let session = Session::new();
    if args.list_functions {
        for name in session.function_names() {
            println!("{}", name);
        }
        return Ok(());
    }

    for (name, path) in &args.tables {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let view = TableView::from_json(&text)
            .with_context(|| format!("Failed to load table {} from {}", name, path.display()))?;
        info!("Loaded table {} with {} rows", name, view.len());
        session.register_view(name, view);
    }

    match &args.query {
        Some(query) => {
            let result = session.execute_sql(query)?;
            print_result(&result, args.format)?;
        }
        None => {
            // Keep going after a failed line, like an interactive shell
            for line in io::stdin().lock().lines() {
                let line = line.context("Failed to read stdin")?;
                let statement = line.trim();
                if statement.is_empty() || statement.starts_with("--") {
                    continue;
                }
                match session.execute_sql(statement) {
                    Ok(result) => print_result(&result, args.format)?,
                    Err(e) => eprintln!("Error: {:#}", e),
                }
            }
        }
    }

    Ok(())
}

fn print_result(result: &QueryResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let rows: Vec<serde_json::Value> = result
                .rows
                .iter()
                .map(|row| {
                    let object = result
                        .fields
                        .iter()
                        .map(|field| {
                            let value = row.get(field).cloned().unwrap_or(Value::Null);
                            serde_json::to_value(value).map(|v| (field.clone(), v))
                        })
                        .collect::<serde_json::Result<serde_json::Map<_, _>>>()?;
                    Ok(serde_json::Value::Object(object))
                })
                .collect::<serde_json::Result<_>>()?;
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        OutputFormat::Table => print!("{}", render_table(result)),
    }
    Ok(())
}

fn render_table(result: &QueryResult) -> String {
    let cells: Vec<Vec<String>> = result
        .rows
        .iter()
        .map(|row| {
            result
                .fields
                .iter()
                .map(|field| row.get(field).map_or("null".to_string(), |v| v.to_string()))
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = result.fields.iter().map(|f| f.chars().count()).collect();
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |values: &[String]| -> String {
        let padded: Vec<String> = values
            .iter()
            .zip(&widths)
            .map(|(value, &width)| format!("{:<width$}", value, width = width))
            .collect();
        format!("| {} |\n", padded.join(" | "))
    };
    let separator: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();

    let mut out = line(&result.fields);
    out.push_str(&format!("|-{}-|\n", separator.join("-|-")));
    for row in &cells {
        out.push_str(&line(row));
    }
    out.push_str(&format!("({} rows)\n", result.len()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_table_arg() -> Result<()> {
        assert_eq!(
            parse_table_arg("用户=data/users.json")?,
            ("用户".to_string(), PathBuf::from("data/users.json"))
        );
        assert!(parse_table_arg("users").is_err());
        assert!(parse_table_arg("=x.json").is_err());
        Ok(())
    }

    #[test]
    fn test_render_table() {
        let result = QueryResult {
            rows: vec![[("name".to_string(), Value::from("tom")), ("age".to_string(), Value::Null)]
                .into_iter()
                .collect()],
            fields: vec!["name".to_string(), "age".to_string()],
        };
        assert_eq!(
            render_table(&result),
            "| name | age  |\n|------|------|\n| tom  | null |\n(1 rows)\n"
        );
    }
}
