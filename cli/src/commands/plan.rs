use anyhow::Result;
use std::process;

use macrolog_core::calendar::{millis_to_date, today};
use macrolog_core::format::format_weight_display;
use macrolog_core::service::TrackerService;

use super::helpers::{json_error, parse_date};

pub(crate) fn cmd_plan_set(
    svc: &TrackerService,
    daily_delta_kg: f64,
    start: Option<String>,
    json: bool,
) -> Result<()> {
    let start = parse_date(start)?;
    let plan = svc.set_expected_plan(start, daily_delta_kg)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        println!(
            "Plan set from {start}: {} kg, {:+} kg/day ({:+.2} kg/week)",
            format_weight_display(plan.baseline_weight_kg),
            plan.daily_delta_kg,
            plan.daily_delta_kg * 7.0
        );
    }

    Ok(())
}

pub(crate) fn cmd_plan_show(svc: &TrackerService, json: bool) -> Result<()> {
    let Some(plan) = svc.expected_plan()? else {
        if json {
            println!("{}", json_error("No expected plan set"));
        } else {
            eprintln!("No expected plan set. Use `macrolog plan set` to create one.");
        }
        process::exit(2);
    };

    let today = today();
    let expected = svc.planned_expected(today)?;
    let adjusted = svc.adjusted_expected(today)?;

    if json {
        println!(
            "{}",
            serde_json::json!({
                "plan": plan,
                "today": today.format("%Y-%m-%d").to_string(),
                "expectedKg": expected,
                "adjustedKg": adjusted,
            })
        );
        return Ok(());
    }

    let start = millis_to_date(plan.start_date_millis);
    println!("Start:     {start}");
    println!("Baseline:  {} kg", format_weight_display(plan.baseline_weight_kg));
    println!("Change:    {:+} kg/day", plan.daily_delta_kg);
    if let Some(v) = expected {
        println!("Expected today:  {} kg", format_weight_display(v));
    }
    if let Some(v) = adjusted {
        println!("Adjusted today:  {} kg", format_weight_display(v));
    }

    Ok(())
}

pub(crate) fn cmd_plan_clear(svc: &TrackerService, json: bool) -> Result<()> {
    let cleared = svc.clear_expected_plan()?;

    if json {
        println!("{}", serde_json::json!({ "cleared": cleared }));
    } else if cleared {
        println!("Expected plan cleared");
    } else {
        println!("No expected plan to clear");
    }

    Ok(())
}
