use std::fs;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::Local;
use clap::{Parser, Subcommand};
use spendbook::config::Config;
use spendbook::core::{
    Debouncer, Highlighter, Preset, SearchHit, Settings, Tracker, TransactionEdit,
    TransactionInput, search_with, sort_by,
};
use spendbook::import;
use spendbook::render::{Renderer, TextRenderer};
use spendbook::storage::FileStore;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = "config.toml";

#[derive(Parser)]
#[command(name = "spendbook", about = "Track personal spending locally")]
struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a new transaction
    Add {
        #[arg(long)]
        description: String,
        #[arg(long)]
        amount: String,
        #[arg(long)]
        category: String,
        /// Defaults to today
        #[arg(long)]
        date: Option<String>,
    },
    /// Change fields of an existing transaction
    Edit {
        #[arg(long)]
        id: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        amount: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        date: Option<String>,
    },
    /// Delete a transaction
    Delete {
        #[arg(long)]
        id: String,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
    /// List transactions
    List {
        /// description, category, amount or date
        #[arg(long)]
        sort: Option<String>,
        /// Regular expression matched against descriptions
        #[arg(long, conflicts_with = "preset")]
        search: Option<String>,
        /// food, decimals or large
        #[arg(long)]
        preset: Option<Preset>,
        /// Hide transactions the search does not match
        #[arg(long)]
        matches_only: bool,
    },
    /// Show dashboard figures and budget status
    Stats,
    /// Show spending over the last seven days
    Week,
    /// Show or change settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// Write all transactions to a file
    Export {
        #[arg(long)]
        output: PathBuf,
        /// Write CSV instead of JSON
        #[arg(long)]
        csv: bool,
    },
    /// Load transactions from a file
    Import {
        #[arg(long)]
        input: PathBuf,
        /// Read CSV rows and add them instead of replacing from JSON
        #[arg(long)]
        csv: bool,
    },
    /// Search interactively; each line typed on stdin refines the query
    Search,
}

#[derive(Subcommand)]
enum SettingsAction {
    Show,
    Set {
        #[arg(long)]
        currency: Option<String>,
        /// Monthly budget in UGX
        #[arg(long)]
        budget: Option<f64>,
        /// Exchange rate as CODE=RATE, repeatable
        #[arg(long = "rate", value_parser = parse_rate)]
        rates: Vec<(String, f64)>,
    },
}

#[derive(Debug)]
enum CliError {
    Unconfirmed,
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Unconfirmed => write!(f, "refusing to delete without --yes"),
        }
    }
}

impl std::error::Error for CliError {}

fn parse_rate(s: &str) -> Result<(String, f64), String> {
    let (code, rate) = s
        .split_once('=')
        .ok_or_else(|| format!("expected CODE=RATE, got {s}"))?;
    let rate = rate
        .parse::<f64>()
        .map_err(|e| format!("invalid rate {rate}: {e}"))?;
    Ok((code.trim().to_uppercase(), rate))
}

fn init_logging(cfg: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cfg.logging.filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn highlighter() -> Highlighter {
    if io::stdout().is_terminal() {
        Highlighter::new("\x1b[1;33m", "\x1b[0m")
    } else {
        Highlighter::new("[", "]")
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let cfg = match &cli.config {
        Some(path) => Config::load(path, true)?,
        None => Config::load(&PathBuf::from(DEFAULT_CONFIG), false)?,
    };
    init_logging(&cfg);

    let mut tracker = Tracker::load(FileStore::new(&cfg.storage.data_dir));
    let mut out = TextRenderer::new(io::stdout().lock());

    match cli.command {
        Commands::Add {
            description,
            amount,
            category,
            date,
        } => {
            let date = date.unwrap_or_else(|| Local::now().date_naive().to_string());
            let input = TransactionInput::new(description, amount, category, date);
            let added = tracker.submit(&input)?;
            warn_unsaved(added.persisted);
            println!("Added {}", added.value.id);
            out.render_stats(&tracker.stats()?)?;
        }
        Commands::Edit {
            id,
            description,
            amount,
            category,
            date,
        } => {
            let changes = TransactionEdit {
                description,
                amount,
                category,
                date,
            };
            let edited = tracker.edit(&id, &changes)?;
            warn_unsaved(edited.persisted);
            println!("Updated {}", edited.value.id);
        }
        Commands::Delete { id, yes } => {
            if !yes {
                return Err(CliError::Unconfirmed.into());
            }
            let removed = tracker.delete(&id);
            warn_unsaved(removed.persisted);
            if removed.value {
                println!("Deleted {id}");
            } else {
                println!("No transaction with id {id}");
            }
        }
        Commands::List {
            sort,
            search,
            preset,
            matches_only,
        } => {
            let list = match &sort {
                Some(key) => sort_by(tracker.transactions(), key),
                None => tracker.transactions().to_vec(),
            };
            let pattern = search
                .or_else(|| preset.map(|p| p.pattern().to_string()))
                .unwrap_or_default();
            let is_search = !pattern.trim().is_empty();
            let mut hits = search_with(&list, &pattern, &highlighter());
            if matches_only {
                hits.retain(|h| h.is_match);
            }
            out.render(&hits, is_search)?;
        }
        Commands::Stats => {
            out.render_stats(&tracker.stats()?)?;
            out.render_budget(&tracker.budget_status()?)?;
        }
        Commands::Week => {
            out.render_week(&tracker.weekly(Local::now().date_naive()))?;
        }
        Commands::Settings { action } => match action {
            SettingsAction::Show => {
                let s = tracker.settings();
                println!("Default currency: {}", s.default_currency);
                println!("Monthly budget (UGX): {:.2}", s.monthly_budget);
                for (code, rate) in &s.exchange_rates {
                    println!("1 UGX = {rate} {code}");
                }
            }
            SettingsAction::Set {
                currency,
                budget,
                rates,
            } => {
                let mut next: Settings = tracker.settings().clone();
                if let Some(currency) = currency {
                    next.default_currency = currency.to_uppercase();
                }
                if let Some(budget) = budget {
                    next.monthly_budget = budget;
                }
                next.exchange_rates.extend(rates);
                let saved = tracker.update_settings(next)?;
                warn_unsaved(saved.persisted);
                println!("Settings saved");
            }
        },
        Commands::Export { output, csv } => {
            if tracker.transactions().is_empty() {
                println!("No transactions to export");
                return Ok(());
            }
            if csv {
                import::csv::export(fs::File::create(&output)?, tracker.transactions())?;
            } else {
                import::json::write(&output, tracker.transactions())?;
            }
            info!(path = %output.display(), "Exported transactions");
            println!(
                "Exported {} transactions to {}",
                tracker.transactions().len(),
                output.display()
            );
        }
        Commands::Import { input, csv } => {
            if csv {
                let rows = import::csv::parse(fs::File::open(&input)?)?;
                let mut added = 0;
                for (line, row) in rows.iter().enumerate() {
                    match tracker.submit(row) {
                        Ok(c) => {
                            warn_unsaved(c.persisted);
                            added += 1;
                        }
                        Err(report) => eprintln!("row {}: {report}", line + 1),
                    }
                }
                println!("Imported {added} of {} rows", rows.len());
            } else {
                let transactions = import::json::parse(&input)?;
                let imported = tracker.replace_all(transactions)?;
                warn_unsaved(imported.persisted);
                println!("Imported {} transactions", imported.value);
            }
        }
        Commands::Search => {
            drop(out);
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(interactive_search(
                tracker.transactions().to_vec(),
                Debouncer::new(cfg.search.debounce()),
            ))?;
        }
    }

    Ok(())
}

fn warn_unsaved(persisted: bool) {
    if !persisted {
        warn!("Change kept for this session only; saving to disk failed");
        eprintln!("warning: could not save changes to disk");
    }
}

async fn interactive_search(
    transactions: Vec<spendbook::core::Transaction>,
    mut debouncer: Debouncer,
) -> io::Result<()> {
    let transactions = Arc::new(transactions);
    let renderer = Arc::new(Mutex::new(TextRenderer::new(io::stdout())));
    let highlighter = Arc::new(highlighter());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let transactions = Arc::clone(&transactions);
        let renderer = Arc::clone(&renderer);
        let highlighter = Arc::clone(&highlighter);
        debouncer.schedule(async move {
            let is_search = !line.trim().is_empty();
            let hits: Vec<SearchHit> = search_with(&transactions, &line, &highlighter)
                .into_iter()
                .filter(|h| h.is_match)
                .collect();
            if let Ok(mut r) = renderer.lock() {
                if let Err(e) = r.render(&hits, is_search) {
                    warn!(error = %e, "Failed to render search results");
                }
            }
        });
    }
    debouncer.flush().await;
    Ok(())
}
