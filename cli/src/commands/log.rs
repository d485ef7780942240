use anyhow::{Result, bail};

use macrolog_core::format::{format_decimal, format_money2};
use macrolog_core::models::{NewFood, Totals};
use macrolog_core::service::TrackerService;

use super::helpers::{macro_line, parse_date, short_id};

/// Macro values typed on the command line, each overriding the saved food.
#[derive(Default)]
pub(crate) struct MacroArgs {
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
}

pub(crate) fn cmd_log(
    svc: &TrackerService,
    food: &str,
    serving: Option<f64>,
    macros: &MacroArgs,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let date = parse_date(date)?;

    let base = match svc.get_food(food)? {
        Some(saved) => NewFood {
            name: saved.name,
            weight: saved.weight,
            calories: saved.calories,
            proteins: saved.proteins,
            fat: saved.fat,
            carbs: saved.carbs,
            price: saved.price,
            price_grams: saved.price_grams,
        },
        None if macros.calories.is_some() => NewFood {
            name: food.to_string(),
            weight: 100.0,
            ..NewFood::default()
        },
        None => bail!("Unknown food '{food}'. Pass --calories to define it while logging"),
    };

    let new_food = NewFood {
        weight: serving.unwrap_or(base.weight),
        calories: macros.calories.unwrap_or(base.calories),
        proteins: macros.protein.unwrap_or(base.proteins),
        fat: macros.fat.unwrap_or(base.fat),
        carbs: macros.carbs.unwrap_or(base.carbs),
        ..base
    };

    let totals = svc.log_food(date, &new_food)?;
    print_logged(&totals, json)
}

pub(crate) fn print_logged(totals: &Totals, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(totals)?);
        return Ok(());
    }

    let cost = if totals.cost > 0.0 {
        format!(" | {}", format_money2(totals.cost))
    } else {
        String::new()
    };
    println!(
        "Logged {}g {} [{}]: {}{cost}",
        format_decimal(totals.weight),
        totals.name,
        short_id(&totals.id),
        macro_line(
            totals.total_calories,
            totals.total_proteins,
            totals.total_carbs,
            totals.total_fat
        ),
    );
    Ok(())
}
