use anyhow::{Result, bail};
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use macrolog_core::calendar::millis_to_date;
use macrolog_core::format::format_weight_display;
use macrolog_core::service::TrackerService;

use super::helpers::{json_error, no_neg_zero, parse_date};

const LBS_PER_KG: f64 = 2.20462;
const KG_PER_LB: f64 = 0.453_592;

pub(crate) fn to_kg(value: f64, unit: &str) -> Result<f64> {
    if value <= 0.0 {
        bail!("Weight must be greater than 0");
    }
    match unit.to_lowercase().as_str() {
        "kg" => Ok(value),
        "lbs" | "lb" => {
            let kg = no_neg_zero(value * KG_PER_LB);
            eprintln!("Converting {value:.1} lbs → {kg:.2} kg");
            Ok(kg)
        }
        _ => bail!("Invalid unit '{unit}'. Use 'kg' or 'lbs'"),
    }
}

pub(crate) fn cmd_weight_log(
    svc: &TrackerService,
    value: f64,
    unit: &str,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let weight_kg = to_kg(value, unit)?;
    let date = parse_date(date)?;
    let entry = svc.log_weight(date, weight_kg)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
    } else {
        println!(
            "Logged {} kg ({:.1} lbs) for {date}",
            format_weight_display(entry.weight_kg),
            entry.weight_kg * LBS_PER_KG,
        );
    }

    Ok(())
}

pub(crate) fn cmd_weight_show(svc: &TrackerService, date: Option<String>, json: bool) -> Result<()> {
    let date = parse_date(date)?;

    if let Some(e) = svc.get_weight(date)? {
        if json {
            println!("{}", serde_json::to_string_pretty(&e)?);
        } else {
            println!(
                "{date}: {} kg ({:.1} lbs)",
                format_weight_display(e.weight_kg),
                e.weight_kg * LBS_PER_KG
            );
        }
        Ok(())
    } else {
        if json {
            println!("{}", json_error(&format!("No weight entry for {date}")));
        } else {
            eprintln!("No weight entry for {date}");
        }
        process::exit(2);
    }
}

pub(crate) fn cmd_weight_history(svc: &TrackerService, days: Option<u32>, json: bool) -> Result<()> {
    let mut entries = svc.weight_history()?;
    entries.reverse();
    if let Some(days) = days {
        entries.truncate(days as usize);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else if entries.is_empty() {
        eprintln!("No weight entries found. Use `macrolog weight log` to record your weight.");
    } else {
        #[derive(Tabled)]
        struct WeightRow {
            #[tabled(rename = "Date")]
            date: String,
            #[tabled(rename = "Weight (kg)")]
            kg: String,
            #[tabled(rename = "Weight (lbs)")]
            lbs: String,
        }

        let rows: Vec<WeightRow> = entries
            .iter()
            .map(|e| WeightRow {
                date: millis_to_date(e.timestamp).format("%Y-%m-%d").to_string(),
                kg: format_weight_display(e.weight_kg),
                lbs: format!("{:.1}", e.weight_kg * LBS_PER_KG),
            })
            .collect();

        let table = Table::new(&rows)
            .with(Style::rounded())
            .with(Modify::new(Columns::new(1..3)).with(Alignment::right()))
            .to_string();
        println!("{table}");
    }

    Ok(())
}

pub(crate) fn cmd_weight_delete(svc: &TrackerService, date: &str, json: bool) -> Result<()> {
    let date = parse_date(Some(date.to_string()))?;
    let had_plan = svc.expected_plan()?.is_some();

    if !svc.delete_weight(date)? {
        if json {
            println!("{}", json_error(&format!("No weight entry for {date}")));
        } else {
            eprintln!("No weight entry for {date}");
        }
        process::exit(2);
    }
    let plan_cleared = had_plan && svc.expected_plan()?.is_none();

    if json {
        println!(
            "{}",
            serde_json::json!({
                "deleted": date.format("%Y-%m-%d").to_string(),
                "planCleared": plan_cleared,
            })
        );
    } else {
        println!("Deleted weight entry for {date}");
        if plan_cleared {
            println!("The expected plan started on this day and was cleared");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_kg() {
        assert!((to_kg(80.0, "kg").unwrap() - 80.0).abs() < f64::EPSILON);
        assert!((to_kg(100.0, "LBS").unwrap() - 45.3592).abs() < 1e-9);
        assert!(to_kg(80.0, "stone").is_err());
        assert!(to_kg(0.0, "kg").is_err());
    }
}
