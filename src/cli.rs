// src/cli.rs
use clap::{Parser, Subcommand};
use log;
use std::path::PathBuf;

use crate::backend::{Backend, FileBackend};
use crate::config::{self, Config};
use crate::datekey::{self, local_date_key, parse_day, parse_month_key};
use crate::error::{AppError, AppResult};
use crate::image;
use crate::models::{Entry, NewEntry};
use crate::stats::{self, amount_or_zero};
use crate::store::EntryStore;
use crate::suggestions::FoodSuggestions;
use crate::validation::{validate_amount, validate_food_name, validate_new_entry};

/// Keep track of what you spend on junk food.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory holding the journal records (overrides the config file)
    #[clap(long, global = true, value_parser)]
    pub data_dir: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log a food purchase
    Add {
        #[clap(short, long)]
        food: String,
        #[clap(short, long)]
        amount: f64,
        /// Day of the purchase as YYYY-MM-DD (defaults to today)
        #[clap(short, long)]
        date: Option<String>,
        /// Photo to embed in the entry
        #[clap(short, long, value_parser)]
        image: Option<PathBuf>,
    },
    /// Change an existing entry
    Edit {
        id: String,
        #[clap(short, long)]
        food: Option<String>,
        #[clap(short, long)]
        amount: Option<f64>,
        #[clap(short, long)]
        date: Option<String>,
        #[clap(short, long, value_parser, conflicts_with = "clear_image")]
        image: Option<PathBuf>,
        /// Drop the entry's photo
        #[clap(long)]
        clear_image: bool,
    },
    /// Delete an entry
    Delete { id: String },
    /// Show one day's entries (defaults to today)
    Day { date: Option<String> },
    /// List entries, optionally within a date range
    List {
        #[clap(long)]
        from: Option<String>,
        #[clap(long)]
        to: Option<String>,
    },
    /// Spending statistics for a month (defaults to the latest month with entries)
    Stats {
        #[clap(short, long)]
        month: Option<String>,
    },
    /// Current and best streaks
    Streaks,
    /// Entries that have photos
    Gallery {
        #[clap(short, long)]
        month: Option<String>,
    },
    /// Write an entry's photo to a file
    ExportImage {
        id: String,
        #[clap(value_parser)]
        out: PathBuf,
    },
    /// Previously used food names
    Foods,
}

/// Normalizes a user-supplied day, falling back to today.
fn resolve_date(date: Option<String>) -> AppResult<String> {
    match date {
        Some(date) => Ok(local_date_key(parse_day(&date)?)),
        None => Ok(datekey::today_key()),
    }
}

fn format_amount(symbol: &str, amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("{}{:.0}", symbol, amount)
    } else {
        format!("{}{:.2}", symbol, amount)
    }
}

fn print_entry(config: &Config, entry: &Entry) {
    let photo = if entry.has_image() { "  [photo]" } else { "" };
    println!(
        "  {}  {}  {}  {}{}",
        entry.id,
        entry.date,
        entry.food_name,
        format_amount(&config.currency_symbol, amount_or_zero(entry)),
        photo
    );
}

fn open_backend(config: &Config) -> FileBackend {
    let dir = config.resolve_data_dir();
    log::debug!("Using data directory {:?}", dir);
    FileBackend::new(dir).with_quota(config.quota_bytes)
}

/// Adds a food name to the suggestions. Runs after the entry is stored, so a
/// failure is logged rather than returned.
fn remember_food<B: Backend>(backend: B, food_name: &str) {
    if let Err(e) = FoodSuggestions::new(backend).add(food_name) {
        log::warn!(
            "Entry saved, but '{}' could not be added to food suggestions: {}",
            food_name,
            e
        );
    }
}

/// Handles the parsed CLI command.
pub fn handle_cli_command(cli: Cli) -> AppResult<()> {
    log::debug!("Handling CLI command: {:?}", cli.command);
    let mut config = config::load_config();
    if let Some(dir) = cli.data_dir {
        config.data_dir = Some(dir);
    }
    run_command(cli.command, &config)
}

pub fn run_command(command: Commands, config: &Config) -> AppResult<()> {
    let mut backend = open_backend(config);
    match command {
        Commands::Add { food, amount, date, image: image_path } => {
            let mut new_entry = NewEntry::new(resolve_date(date)?, food, amount);
            if let Some(path) = image_path {
                new_entry = new_entry.with_image(image::embed_image(&path)?);
            }
            let new_entry = validate_new_entry(new_entry)?;

            let entry = EntryStore::new(&mut backend).create(new_entry)?;
            remember_food(&mut backend, &entry.food_name);
            println!(
                "Added {} ({}) on {} as {}",
                entry.food_name,
                format_amount(&config.currency_symbol, amount_or_zero(&entry)),
                entry.date,
                entry.id
            );
        }
        Commands::Edit { id, food, amount, date, image: image_path, clear_image } => {
            let mut store = EntryStore::new(&mut backend);
            let mut entry = store
                .get(&id)
                .ok_or_else(|| AppError::Cli(format!("No entry with id {}", id)))?;
            if let Some(food) = food {
                entry.food_name = validate_food_name(&food)?;
            }
            if let Some(amount) = amount {
                entry.amount = validate_amount(amount)?.into();
            }
            if let Some(date) = date {
                entry.date = resolve_date(Some(date))?;
            }
            if let Some(path) = image_path {
                entry.image = Some(image::embed_image(&path)?);
            } else if clear_image {
                entry.image = None;
            }
            let entry = store.update(entry)?;
            remember_food(&mut backend, &entry.food_name);
            println!("Updated entry {}", entry.id);
        }
        Commands::Delete { id } => {
            match EntryStore::new(&mut backend).delete(&id)? {
                0 => println!("No entry with id {}; nothing deleted.", id),
                _ => println!("Deleted entry {}", id),
            }
        }
        Commands::Day { date } => {
            let day = resolve_date(date)?;
            let entries = EntryStore::new(&mut backend).query_by_date(day.as_str());
            if entries.is_empty() {
                println!("No entries on {}.", day);
                return Ok(());
            }
            let summary = stats::day_summary(&entries);
            println!(
                "{}: {} spent on {} item{}",
                day,
                format_amount(&config.currency_symbol, summary.total),
                summary.count,
                if summary.count > 1 { "s" } else { "" }
            );
            for entry in &entries {
                print_entry(config, entry);
            }
        }
        Commands::List { from, to } => {
            let store = EntryStore::new(&mut backend);
            let mut entries = match (from, to) {
                (None, None) => store.all(),
                (from, to) => {
                    let from = match from {
                        Some(from) => resolve_date(Some(from))?,
                        None => "0000-01-01".to_string(),
                    };
                    let to = match to {
                        Some(to) => resolve_date(Some(to))?,
                        None => "9999-12-31".to_string(),
                    };
                    store.query_range(from, to)
                }
            };
            entries.sort_by(|a, b| a.date.cmp(&b.date));
            if entries.is_empty() {
                println!("No entries found.");
            } else {
                for entry in &entries {
                    print_entry(config, entry);
                }
            }
            log::info!("Listed {} entries", entries.len());
        }
        Commands::Stats { month } => {
            let entries = EntryStore::new(&mut backend).all();
            let month = match month {
                Some(month) => {
                    parse_month_key(&month)?;
                    month.trim().to_string()
                }
                None => stats::latest_month(&entries),
            };
            let report = stats::month_report(&entries, &month)?;
            let symbol = &config.currency_symbol;

            println!("Stats for {}", report.month);
            println!("Total spent: {}", format_amount(symbol, report.total));
            if report.foods.is_empty() {
                println!("No data");
            } else {
                for food in &report.foods {
                    println!("  {:<24} {}", food.name, format_amount(symbol, food.total));
                }
            }
            if let Some(top) = &report.top_item {
                println!("Top item: {} ({})", top.name, format_amount(symbol, top.total));
            }
            let comparison = &report.comparison;
            let sign = if comparison.delta < 0.0 { "-" } else { "+" };
            match comparison.percent_change {
                Some(percent) => println!(
                    "vs {}: {}{} ({:+.1}%)",
                    comparison.previous_month,
                    sign,
                    format_amount(symbol, comparison.delta.abs()),
                    percent
                ),
                None => println!(
                    "vs {}: {}{} (no spending that month)",
                    comparison.previous_month,
                    sign,
                    format_amount(symbol, comparison.delta.abs())
                ),
            }
        }
        Commands::Streaks => {
            let entries = EntryStore::new(&mut backend).all();
            let streaks = stats::streaks(&entries, datekey::today());
            println!("No-junk streak:      {} day(s)", streaks.no_junk);
            println!("Junk streak:         {} day(s)", streaks.junk);
            println!("Best no-junk streak: {} day(s)", streaks.best_no_junk);
        }
        Commands::Gallery { month } => {
            if let Some(month) = &month {
                parse_month_key(month)?;
            }
            let entries = EntryStore::new(&mut backend).all();
            let photos = stats::gallery(&entries, month.as_deref().map(str::trim));
            if photos.is_empty() {
                println!("No junk memories yet.");
                return Ok(());
            }
            println!(
                "Showing {} memor{}",
                photos.len(),
                if photos.len() == 1 { "y" } else { "ies" }
            );
            for entry in photos {
                println!("  {}  {}  {}", entry.id, entry.date, entry.food_name);
            }
        }
        Commands::ExportImage { id, out } => {
            let entry = EntryStore::new(&mut backend)
                .get(&id)
                .ok_or_else(|| AppError::Cli(format!("No entry with id {}", id)))?;
            let data_url = entry
                .image
                .as_deref()
                .filter(|image| !image.is_empty())
                .ok_or_else(|| AppError::Cli(format!("Entry {} has no photo", id)))?;
            let written = image::export_image(data_url, &out)?;
            println!("Wrote {} bytes to {:?}", written, out);
        }
        Commands::Foods => {
            let foods = FoodSuggestions::new(&mut backend).list();
            if foods.is_empty() {
                println!("No foods recorded yet.");
            }
            for food in foods {
                println!("  {}", food);
            }
        }
    }
    Ok(())
}
