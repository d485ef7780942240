use anyhow::{Result, bail};
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use macrolog_core::format::{format_decimal, format_weight_display};
use macrolog_core::service::TrackerService;
use macrolog_core::trend::TrendRow;

use super::helpers::parse_date;

#[derive(Tabled)]
struct TrendRowDisplay {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Actual")]
    actual: String,
    #[tabled(rename = "Expected")]
    expected: String,
    #[tabled(rename = "Adjusted")]
    adjusted: String,
}

impl From<&TrendRow> for TrendRowDisplay {
    fn from(row: &TrendRow) -> Self {
        let dash = || "-".to_string();
        Self {
            date: row.date.format("%Y-%m-%d").to_string(),
            actual: row.actual_kg.map_or_else(dash, format_weight_display),
            expected: row.expected_kg.map_or_else(dash, format_decimal),
            adjusted: row.adjusted_kg.map_or_else(dash, format_decimal),
        }
    }
}

pub(crate) fn cmd_trend(
    svc: &TrackerService,
    from: Option<String>,
    to: Option<String>,
    step: u32,
    json: bool,
) -> Result<()> {
    if step == 0 {
        bail!("--step must be at least 1");
    }
    let from = from.map(|d| parse_date(Some(d))).transpose()?;
    let to = to.map(|d| parse_date(Some(d))).transpose()?;
    let rows = svc.trend(from, to)?;

    // Keep every weigh-in even when stepping over days
    let rows: Vec<_> = rows
        .into_iter()
        .enumerate()
        .filter(|(i, r)| i % step as usize == 0 || r.actual_kg.is_some())
        .map(|(_, r)| r)
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    let display: Vec<TrendRowDisplay> = rows.iter().map(TrendRowDisplay::from).collect();

    let table = Table::new(&display)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{table}");

    Ok(())
}
