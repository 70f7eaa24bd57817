mod cli;
mod logging;

use std::path::Path;
use std::process;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use tracing::info;

use malaysia_calendar::calendar::{annotate_month, annotate_year, MonthView};
use malaysia_calendar::config::CalendarConfig;
use malaysia_calendar::converter::CalendarConverter;
use malaysia_calendar::holidays::{HolidaySource, HolidayTable};

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => CalendarConfig::load(path)?,
        None => CalendarConfig::default(),
    };
    let offline = match &cli.command {
        Command::Convert(args) => args.offline,
        Command::Month(args) => args.offline,
        Command::Year(args) => args.offline,
    };
    if offline {
        config.remote.enabled = false;
    }

    let converter = CalendarConverter::from_config(&config);
    let holidays = match &config.holidays.path {
        Some(path) => Some(load_holidays(path)?),
        None => None,
    };
    let holidays = holidays.as_ref().map(|table| table as &dyn HolidaySource);

    match cli.command {
        Command::Convert(args) => convert(&converter, holidays, args.date, args.json).await?,
        Command::Month(args) => {
            print_month(&annotate_month(&converter, holidays, args.year, args.month).await)
        }
        Command::Year(args) => {
            for view in annotate_year(&converter, holidays, args.year).await {
                print_month(&view);
                println!();
            }
        }
    }

    info!("{}", converter.metrics().report());
    Ok(())
}

fn load_holidays(path: &Path) -> Result<HolidayTable> {
    let table = HolidayTable::load(path)
        .with_context(|| format!("loading holidays from {}", path.display()))?;
    info!("Loaded {} holidays from {}", table.len(), path.display());
    Ok(table)
}

async fn convert(
    converter: &CalendarConverter,
    holidays: Option<&dyn HolidaySource>,
    date: NaiveDate,
    json: bool,
) -> Result<()> {
    let (hijri, chinese) =
        tokio::join!(converter.hijri_for(date), converter.chinese_lunar_for(date));
    let holiday = holidays.and_then(|source| source.holiday_on(date));

    if json {
        let value = serde_json::json!({
            "date": date,
            "hijri": hijri,
            "chinese": chinese,
            "holiday": holiday,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("Gregorian: {}", date.format("%A, %-d %B %Y"));
        println!("Hijri:     {}", hijri);
        match &chinese.zodiac {
            Some(zodiac) => println!("Chinese:   {} (Year of the {})", chinese, zodiac),
            None => println!("Chinese:   {}", chinese),
        }
        if let Some(holiday) = holiday {
            println!("Holiday:   {} ({})", holiday.name, holiday.description);
        }
    }
    Ok(())
}

fn print_month(view: &MonthView) {
    println!("{} {}", view.month_name, view.year);
    println!(" Su  Mo  Tu  We  Th  Fr  Sa");
    for week in view.weeks() {
        let row: Vec<String> = week
            .iter()
            .map(|day| match (day.in_month, day.holiday.is_some()) {
                (false, _) => "    ".to_string(),
                (true, true) => format!("{:>3}*", day.date.format("%-d")),
                (true, false) => format!("{:>3} ", day.date.format("%-d")),
            })
            .collect();
        println!("{}", row.concat().trim_end());
    }
    println!();

    for day in view.in_month_days() {
        let hijri = day.hijri.as_ref().map(ToString::to_string).unwrap_or_default();
        let chinese = day.chinese.as_ref().map(ToString::to_string).unwrap_or_default();
        let holiday = day.holiday.as_ref().map(|h| format!("  {}", h.name)).unwrap_or_default();
        println!("{}  {:<24}{:<16}{}", day.key, hijri, chinese, holiday);
    }
}
