use anyhow::{Context, Result};
use std::io::{self, Read};
use std::process;

use macrolog_core::format::format_decimal;
use macrolog_core::models::NutritionPrefill;
use macrolog_core::prefill::parse_food_paste;
use macrolog_core::service::{NutritionLookup, TrackerService};

use super::helpers::{json_error, macro_line, parse_date};
use super::log::print_logged;

/// What to do with prefill values once they are found.
pub(crate) struct PrefillAction {
    pub log: bool,
    pub serving: Option<f64>,
    pub date: Option<String>,
}

fn apply(
    svc: &TrackerService,
    prefill: NutritionPrefill,
    action: PrefillAction,
    json: bool,
) -> Result<()> {
    if !action.log {
        if json {
            println!("{}", serde_json::to_string_pretty(&prefill)?);
        } else {
            let weight = prefill.weight.unwrap_or(NutritionPrefill::DEFAULT_WEIGHT_G);
            println!("{}", prefill.name);
            println!(
                "  Per 100g: {}",
                macro_line(prefill.calories, prefill.proteins, prefill.carbs, prefill.fat)
            );
            println!("  Serving:  {}g", format_decimal(weight));
            println!("\nRe-run with --log to record it.");
        }
        return Ok(());
    }

    let date = parse_date(action.date)?;
    let mut food = prefill.into_new_food();
    if let Some(serving) = action.serving {
        food.weight = serving;
    }
    let totals = svc.log_food(date, &food)?;
    print_logged(&totals, json)
}

fn nothing_found(message: &str, json: bool) -> ! {
    if json {
        println!("{}", json_error(message));
    } else {
        eprintln!("{message}");
    }
    process::exit(2);
}

pub(crate) fn cmd_barcode(
    svc: &TrackerService,
    lookup: &dyn NutritionLookup,
    code: &str,
    action: PrefillAction,
    json: bool,
) -> Result<()> {
    match svc.barcode_prefill(lookup, code) {
        Some(prefill) => apply(svc, prefill, action, json),
        None => nothing_found(&format!("No product found for barcode {code}"), json),
    }
}

/// Prefill from a pasted JSON object, given inline or on stdin.
pub(crate) fn cmd_paste(
    svc: &TrackerService,
    text: Option<String>,
    action: PrefillAction,
    json: bool,
) -> Result<()> {
    let text = match text {
        Some(t) => t,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read pasted text from stdin")?;
            buf
        }
    };

    match parse_food_paste(&text) {
        Some(prefill) => apply(svc, prefill, action, json),
        None => nothing_found("Pasted text is not a JSON object", json),
    }
}
