use anyhow::Result;
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use macrolog_core::format::{format_decimal, format_money};
use macrolog_core::models::{Food, NewFood};
use macrolog_core::service::TrackerService;

use super::helpers::{json_error, suggest_query_ready, truncate};

#[allow(clippy::too_many_arguments)]
pub(crate) fn cmd_food_add(
    svc: &TrackerService,
    name: &str,
    calories: f64,
    protein: Option<f64>,
    carbs: Option<f64>,
    fat: Option<f64>,
    serving: Option<f64>,
    price: Option<f64>,
    price_grams: Option<f64>,
    json: bool,
) -> Result<()> {
    let food = svc.save_food(&NewFood {
        name: name.to_string(),
        weight: serving.unwrap_or(100.0),
        calories,
        proteins: protein.unwrap_or(0.0),
        fat: fat.unwrap_or(0.0),
        carbs: carbs.unwrap_or(0.0),
        price,
        price_grams,
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&food)?);
    } else {
        println!(
            "Saved food: {} ({} kcal/100g, serving {}g)",
            food.name,
            format_decimal(food.calories),
            format_decimal(food.weight)
        );
    }

    Ok(())
}

pub(crate) fn cmd_food_list(svc: &TrackerService, search: Option<&str>, json: bool) -> Result<()> {
    let foods = svc.list_foods(search)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&foods)?);
    } else if foods.is_empty() {
        eprintln!("No foods found");
    } else {
        print_food_table(&foods);
    }

    Ok(())
}

pub(crate) fn cmd_food_delete(svc: &TrackerService, name: &str, json: bool) -> Result<()> {
    if svc.delete_food(name)? {
        if json {
            println!("{}", serde_json::json!({ "deleted": name }));
        } else {
            println!("Deleted food '{name}'");
        }
        Ok(())
    } else {
        if json {
            println!("{}", json_error(&format!("Food '{name}' not found")));
        } else {
            eprintln!("Food '{name}' not found");
        }
        process::exit(2);
    }
}

pub(crate) fn cmd_food_suggest(svc: &TrackerService, query: &str, json: bool) -> Result<()> {
    let names = if suggest_query_ready(query) {
        svc.suggest_foods(query)?
    } else {
        Vec::new()
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&names)?);
    } else if names.is_empty() {
        eprintln!("No foods match '{query}'");
        process::exit(2);
    } else {
        for name in &names {
            println!("{name}");
        }
    }

    Ok(())
}

fn price_display(food: &Food) -> String {
    match (food.price, food.price_grams) {
        (Some(p), Some(g)) => format!("{} / {}g", format_money(p), format_decimal(g)),
        _ => "-".to_string(),
    }
}

pub(crate) fn print_food_table(foods: &[Food]) {
    #[derive(Tabled)]
    struct FoodRow {
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Serving")]
        serving: String,
        #[tabled(rename = "Cal/100g")]
        calories: String,
        #[tabled(rename = "P/100g")]
        protein: String,
        #[tabled(rename = "C/100g")]
        carbs: String,
        #[tabled(rename = "F/100g")]
        fat: String,
        #[tabled(rename = "Price")]
        price: String,
    }

    let rows: Vec<FoodRow> = foods
        .iter()
        .map(|f| FoodRow {
            name: truncate(&f.name, 35),
            serving: format!("{}g", format_decimal(f.weight)),
            calories: format_decimal(f.calories),
            protein: format_decimal(f.proteins),
            carbs: format_decimal(f.carbs),
            fat: format_decimal(f.fat),
            price: price_display(f),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..6)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn food(price: Option<f64>, price_grams: Option<f64>) -> Food {
        Food {
            id: "Oats".to_string(),
            name: "Oats".to_string(),
            weight: 40.0,
            calories: 389.0,
            proteins: 16.9,
            fat: 6.9,
            carbs: 66.3,
            price,
            price_grams,
            last_used: 0,
        }
    }

    #[test]
    fn test_price_display() {
        assert_eq!(price_display(&food(Some(3.0), Some(500.0))), "3 / 500g");
        assert_eq!(price_display(&food(Some(2.5), Some(1000.0))), "2.50 / 1000g");
        assert_eq!(price_display(&food(Some(2.5), None)), "-");
        assert_eq!(price_display(&food(None, None)), "-");
    }
}
