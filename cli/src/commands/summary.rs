use anyhow::Result;
use chrono::Local;
use serde::Serialize;
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use macrolog_core::format::{format_decimal, format_money2};
use macrolog_core::models::{DailyTotals, Totals};
use macrolog_core::service::TrackerService;

use super::helpers::{macro_line, no_neg_zero, parse_date, short_id, truncate};

#[derive(Serialize)]
struct DaySummary<'a> {
    date: String,
    entries: &'a [Totals],
    totals: DailyTotals,
}

pub(crate) fn cmd_summary(svc: &TrackerService, date: Option<String>, json: bool) -> Result<()> {
    let date = parse_date(date)?;
    let entries = svc.list_for_date(date)?;
    let totals = svc.aggregate_for_date(date)?;

    if json {
        let summary = DaySummary {
            date: date.format("%Y-%m-%d").to_string(),
            entries: &entries,
            totals,
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    if entries.is_empty() {
        eprintln!("No entries for {date}");
        process::exit(2);
    }

    #[derive(Tabled)]
    struct EntryRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Food")]
        name: String,
        #[tabled(rename = "Weight")]
        weight: String,
        #[tabled(rename = "kcal")]
        calories: String,
        #[tabled(rename = "P")]
        protein: String,
        #[tabled(rename = "C")]
        carbs: String,
        #[tabled(rename = "F")]
        fat: String,
        #[tabled(rename = "Cost")]
        cost: String,
        #[tabled(rename = "Counted")]
        included: String,
    }

    let rows: Vec<EntryRow> = entries
        .iter()
        .map(|e| EntryRow {
            id: short_id(&e.id).to_string(),
            name: truncate(&e.name, 30),
            weight: format!("{}g", format_decimal(e.weight)),
            calories: format_decimal(e.total_calories),
            protein: format!("{}g", format_decimal(e.total_proteins)),
            carbs: format!("{}g", format_decimal(e.total_carbs)),
            fat: format!("{}g", format_decimal(e.total_fat)),
            cost: format_money2(e.cost),
            included: if e.included { "yes" } else { "no" }.to_string(),
        })
        .collect();

    println!("=== {date} ===\n");
    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..8)).with(Alignment::right()))
        .to_string();
    println!("{table}");

    println!(
        "\n  TOTAL: {} | {}",
        macro_line(totals.calories, totals.proteins, totals.carbs, totals.fat),
        format_money2(totals.cost)
    );
    let excluded = entries.iter().filter(|e| !e.included).count();
    if excluded > 0 {
        println!("  ({excluded} excluded from totals)");
    }

    Ok(())
}

pub(crate) fn cmd_history(svc: &TrackerService, days: u32, json: bool) -> Result<()> {
    #[derive(Tabled)]
    struct HistoryRow {
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Entries")]
        entries: usize,
        #[tabled(rename = "Calories")]
        calories: String,
        #[tabled(rename = "Protein")]
        protein: String,
        #[tabled(rename = "Carbs")]
        carbs: String,
        #[tabled(rename = "Fat")]
        fat: String,
        #[tabled(rename = "Cost")]
        cost: String,
    }

    let today = Local::now().date_naive();
    let history = svc.daily_history(today, days)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&history)?);
        return Ok(());
    }

    if history.iter().all(|d| d.entries == 0) {
        eprintln!("No entries in the last {days} days");
        process::exit(2);
    }

    let rows: Vec<HistoryRow> = history
        .iter()
        .map(|d| {
            let t = &d.totals;
            HistoryRow {
                date: d.date.format("%Y-%m-%d").to_string(),
                entries: d.entries,
                calories: format_decimal(no_neg_zero(t.calories)),
                protein: format!("{}g", format_decimal(no_neg_zero(t.proteins))),
                carbs: format!("{}g", format_decimal(no_neg_zero(t.carbs))),
                fat: format!("{}g", format_decimal(no_neg_zero(t.fat))),
                cost: format_money2(t.cost),
            }
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{table}");

    Ok(())
}
