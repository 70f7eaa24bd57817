use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Gregorian calendar annotated with Hijri and Chinese lunar dates.
#[derive(Parser)]
#[command(
    name = "malaysia-calendar",
    version,
    about = "Gregorian, Hijri and Chinese lunar dates side by side"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to TOML configuration file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Convert a single date.
    Convert(ConvertArgs),
    /// Print an annotated month.
    Month(MonthArgs),
    /// Print every day of a year.
    Year(YearArgs),
}

#[derive(clap::Args)]
pub struct ConvertArgs {
    /// Date as YYYY-MM-DD.
    #[arg(value_parser = parse_date)]
    pub date: NaiveDate,

    /// Never call the remote conversion services.
    #[arg(long)]
    pub offline: bool,

    /// Print JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

#[derive(clap::Args)]
pub struct MonthArgs {
    pub year: i32,

    #[arg(value_parser = clap::value_parser!(u32).range(1..=12))]
    pub month: u32,

    #[arg(long)]
    pub offline: bool,
}

#[derive(clap::Args)]
pub struct YearArgs {
    pub year: i32,

    #[arg(long)]
    pub offline: bool,
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    malaysia_calendar::date_key::from_key(value)
        .ok_or_else(|| format!("`{value}` is not a valid YYYY-MM-DD date"))
}
