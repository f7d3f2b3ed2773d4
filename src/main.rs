use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use techjobs::{JobStore, Row, StoreConfig};
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

/// Query the job listings CSV.
#[derive(Parser, Debug)]
#[command(name = "techjobs")]
struct Args {
    /// CSV file to load (overrides the config file)
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// YAML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Distinct values of a column
    List { column: String },
    /// Every row
    ListAll,
    /// Rows whose column contains the term
    Search { column: String, term: String },
    /// Rows where any column contains the term
    SearchAll { term: String },
}

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => StoreConfig::from_yaml_file(path)?,
        None => StoreConfig::default(),
    };
    if let Some(data) = args.data {
        config = config.with_data_file(data);
    }
    debug!(data_file = %config.data_file.display(), "configuration");

    let store = JobStore::from_config(&config);

    match args.command {
        Command::List { column } => {
            let values = store
                .find_all_column_values(&column)
                .with_context(|| format!("listing {}", column))?;
            println!("\n*** All {} Values ***", column);
            for value in values {
                println!("{}", value);
            }
        }
        Command::ListAll => {
            print_rows(store.find_all().context("listing jobs")?.iter());
        }
        Command::Search { column, term } => {
            let rows = store
                .find_by_column_and_value(&column, &term)
                .with_context(|| format!("searching {}", column))?;
            print_rows(rows);
        }
        Command::SearchAll { term } => {
            print_rows(store.find_all_columns(&term).context("searching jobs")?);
        }
    }

    Ok(())
}

fn print_rows<'a>(rows: impl IntoIterator<Item = &'a Row>) {
    for row in rows {
        println!("{}\n", row);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_named_all_is_an_ordinary_column() {
        let args = Args::parse_from(["techjobs", "search", "all", "remote"]);
        match args.command {
            Command::Search { column, term } => {
                assert_eq!(column, "all");
                assert_eq!(term, "remote");
            }
            other => panic!("unexpected command: {:?}", other),
        }

        let args = Args::parse_from(["techjobs", "list", "all"]);
        assert!(matches!(args.command, Command::List { column } if column == "all"));
    }

    #[test]
    fn test_whole_dataset_commands() {
        let args = Args::parse_from(["techjobs", "--data", "jobs.csv", "list-all"]);
        assert!(matches!(args.command, Command::ListAll));
        assert_eq!(args.data, Some(PathBuf::from("jobs.csv")));

        let args = Args::parse_from(["techjobs", "search-all", "java"]);
        assert!(matches!(args.command, Command::SearchAll { term } if term == "java"));
    }
}
