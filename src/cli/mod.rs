pub mod render;
pub mod shell;

use std::fs::File;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use tokio::sync::Notify;

use crate::application::{
    EditAction, EditOutcome, ExpensePatch, LedgerService, LoadReport, Synced, expense_lines,
};
use crate::domain::{Budget, DATE_FORMAT};
use crate::io::export::Exporter;
use crate::storage::{AnyTableStore, CsvTableStore, SqliteTableStore};

use render::{render_categories, render_expense_table, render_summary};
use shell::Shell;

/// Ledgerly - personal expense ledger
#[derive(Parser)]
#[command(name = "ledgerly")]
#[command(about = "Track expenses by category and compare them against a monthly budget")]
#[command(version)]
pub struct Cli {
    /// Ledger store: a SQLite file, or a directory of CSV sheets with --backend csv
    #[arg(short, long, default_value = "ledger.db", global = true)]
    pub store: String,

    /// Storage backend for the ledger store
    #[arg(long, value_enum, default_value_t = Backend::Sqlite, global = true)]
    pub backend: Backend,

    /// Monthly budget used for summaries (e.g., "1500" or "1500.00").
    /// The shell asks for it when omitted; other commands assume 0.
    #[arg(short, long, global = true)]
    pub budget: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Write log output to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Defaults to the interactive shell
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// Single SQLite file
    Sqlite,
    /// Directory with one CSV file per sheet
    Csv,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the ledger store with empty expense and category sheets
    Init,

    /// Interactive menu
    Shell,

    /// Record an expense
    Add {
        /// Expense name
        name: String,

        /// Amount spent (e.g., "3.50" or "12")
        amount: String,

        /// Date of the expense (DD-MM-YYYY, defaults to today)
        #[arg(short, long)]
        date: Option<String>,

        /// Category number, as shown by `category list`
        #[arg(short, long)]
        category: usize,
    },

    /// List all expenses
    List,

    /// Change fields of an expense; omitted fields keep their value
    Edit {
        /// Expense number, as shown by `list`
        index: usize,

        #[arg(short, long)]
        name: Option<String>,

        #[arg(short, long)]
        amount: Option<String>,

        /// New date (DD-MM-YYYY)
        #[arg(short, long)]
        date: Option<String>,

        /// New category number
        #[arg(short, long)]
        category: Option<usize>,
    },

    /// Remove an expense
    Remove {
        /// Expense number, as shown by `list`
        index: usize,
    },

    /// Show totals per category against the budget
    Summary {
        /// Output format: table, json
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Category management commands
    #[command(subcommand)]
    Category(CategoryCommands),

    /// Export the ledger to CSV or JSON
    Export {
        /// Format: csv, json
        format: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum CategoryCommands {
    /// List categories with their numbers
    List,

    /// Add a category
    Add {
        /// Category name (must be unique)
        name: String,
    },

    /// Rename a category
    Edit {
        /// Category number
        index: usize,

        /// New name
        name: String,
    },

    /// Delete a category; existing expenses keep their category text
    Delete {
        /// Category number
        index: usize,
    },
}

impl Cli {
    /// Route `log` output to stderr or `--log-file`. `RUST_LOG` wins over `-v`.
    pub fn init_logging(&self) -> Result<()> {
        let default_level = if self.verbose { "debug" } else { "warn" };
        let mut builder = env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or(default_level),
        );
        if let Some(path) = &self.log_file {
            let file = File::options()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        builder.try_init().context("Failed to initialize logging")?;
        Ok(())
    }

    /// Execute the command. An interactive shell ends early, saving pending
    /// changes, once `interrupt` is notified.
    pub async fn run(self, interrupt: Arc<Notify>) -> Result<()> {
        let budget = match &self.budget {
            Some(text) => {
                Budget::parse(text).context("Invalid budget. Use '1500.00' or '1500'")?
            }
            None => Budget::default(),
        };
        let command = self.command.unwrap_or(Commands::Shell);
        let create = matches!(command, Commands::Init);

        let store = open_store(self.backend, &self.store, create)
            .await
            .context("Could not open the ledger store (run `ledgerly init` first)")?;
        let (mut service, report) = LedgerService::open(store, budget).await;
        print_load_report(&report, self.verbose);

        match command {
            Commands::Init => {
                println!("Ledger initialized: {}", self.store);
            }

            Commands::Shell => {
                let color = io::stdout().is_terminal();
                let input = tokio::io::BufReader::new(tokio::io::stdin());
                let mut shell = Shell::new(&mut service, input, io::stdout())
                    .with_color(color)
                    .with_budget_prompt(self.budget.is_none())
                    .with_interrupt(interrupt);
                shell.run().await?;
            }

            Commands::Add {
                name,
                amount,
                date,
                category,
            } => {
                let date = date.unwrap_or_else(|| Local::now().format(DATE_FORMAT).to_string());
                let added = service
                    .add_expense(&name, &amount, &date, category)
                    .await?;
                println!("Added expense: {}", added.value);
                warn_if_unsynced(&added);
            }

            Commands::List => {
                print!("{}", render_expense_table(&expense_lines(service.expenses())));
            }

            Commands::Edit {
                index,
                name,
                amount,
                date,
                category,
            } => {
                let patch = ExpensePatch {
                    name,
                    amount,
                    date,
                    category,
                };
                let result = service
                    .edit_or_remove(index, EditAction::Edit(patch))
                    .await?;
                if let EditOutcome::Edited(expense) = &result.value {
                    println!("Updated expense: {}", expense);
                }
                warn_if_unsynced(&result);
            }

            Commands::Remove { index } => {
                let result = service.edit_or_remove(index, EditAction::Remove).await?;
                if let EditOutcome::Removed(expense) = &result.value {
                    println!("Removed expense: {}", expense);
                }
                warn_if_unsynced(&result);
            }

            Commands::Summary { format } => {
                let summary = service.summarize();
                match format.as_str() {
                    "json" => println!("{}", serde_json::to_string_pretty(&summary)?),
                    "table" => print!("{}", render_summary(&summary, io::stdout().is_terminal())),
                    other => anyhow::bail!("Unknown format '{}'. Use: table, json", other),
                }
            }

            Commands::Category(category_cmd) => {
                run_category_command(&mut service, category_cmd).await?;
            }

            Commands::Export { format, output } => {
                let exporter = Exporter::new(&service);
                let writer: Box<dyn io::Write + Send> = match &output {
                    Some(path) => Box::new(
                        File::create(path)
                            .with_context(|| format!("Failed to create {}", path))?,
                    ),
                    None => Box::new(io::stdout()),
                };
                match format.as_str() {
                    "csv" => {
                        let count = exporter.export_expenses_csv(writer)?;
                        eprintln!("Exported {} expenses", count);
                    }
                    "json" => {
                        let snapshot = exporter.export_json(writer)?;
                        eprintln!(
                            "Exported {} expenses and {} categories",
                            snapshot.expenses.len(),
                            snapshot.categories.len()
                        );
                    }
                    other => anyhow::bail!("Unknown export format '{}'. Use: csv, json", other),
                }
            }
        }

        Ok(())
    }
}

async fn open_store(backend: Backend, location: &str, create: bool) -> Result<AnyTableStore> {
    Ok(match (backend, create) {
        (Backend::Sqlite, true) => AnyTableStore::Sqlite(SqliteTableStore::init(location).await?),
        (Backend::Sqlite, false) => {
            AnyTableStore::Sqlite(SqliteTableStore::connect(location).await?)
        }
        (Backend::Csv, true) => AnyTableStore::Csv(CsvTableStore::init(location)?),
        (Backend::Csv, false) => AnyTableStore::Csv(CsvTableStore::connect(location)?),
    })
}

async fn run_category_command(
    service: &mut LedgerService<AnyTableStore>,
    cmd: CategoryCommands,
) -> Result<()> {
    match cmd {
        CategoryCommands::List => {
            print!("{}", render_categories(service.categories()));
        }

        CategoryCommands::Add { name } => {
            let added = service.add_category(&name).await?;
            println!("Added category: {}", added.value);
            warn_if_unsynced(&added);
        }

        CategoryCommands::Edit { index, name } => {
            let renamed = service.edit_category(index, &name).await?;
            println!(
                "Renamed category: {} -> {}",
                renamed.value.old, renamed.value.new
            );
            warn_if_unsynced(&renamed);
        }

        CategoryCommands::Delete { index } => {
            let deleted = service.delete_category(index).await?;
            println!("Deleted category: {}", deleted.value);
            warn_if_unsynced(&deleted);
        }
    }
    Ok(())
}

fn print_load_report(report: &LoadReport, verbose: bool) {
    if report.backend_errors > 0 {
        eprintln!("Warning: part of the ledger could not be read; starting with what was available.");
    }
    if !report.skipped.is_empty() {
        eprintln!(
            "Warning: skipped {} malformed expense row(s)",
            report.skipped.len()
        );
        if verbose {
            for skipped in &report.skipped {
                eprintln!("  row {}: {}", skipped.row, skipped.reason);
            }
        }
    }
    if verbose {
        eprintln!(
            "[Load] {} expenses, {} categories, {} undated",
            report.expenses, report.categories, report.undated
        );
    }
}

fn warn_if_unsynced<T>(result: &Synced<T>) {
    if !result.is_synced() {
        eprintln!("Warning: the change could not be saved to the ledger store.");
    }
}
