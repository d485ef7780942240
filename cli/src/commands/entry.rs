use anyhow::Result;
use std::process;

use macrolog_core::service::TrackerService;

use super::helpers::{json_error, parse_date, resolve_entry_id, short_id};
use super::log::print_logged;

fn not_found(id: &str, json: bool) -> ! {
    if json {
        println!("{}", json_error(&format!("Entry {id} not found")));
    } else {
        eprintln!("Entry {id} not found");
    }
    process::exit(2);
}

/// Change an entry's weight; values are recomputed from the saved food.
pub(crate) fn cmd_entry_edit(svc: &TrackerService, id: &str, weight: f64, json: bool) -> Result<()> {
    let id = resolve_entry_id(svc, id, json)?;
    match svc.recompute_on_weight_edit(&id, weight)? {
        Some(updated) => print_logged(&updated, json),
        None => not_found(&id, json),
    }
}

pub(crate) fn cmd_entry_include(
    svc: &TrackerService,
    id: &str,
    included: bool,
    json: bool,
) -> Result<()> {
    let id = resolve_entry_id(svc, id, json)?;
    if !svc.set_included(&id, included)? {
        not_found(&id, json);
    }

    if json {
        println!("{}", serde_json::json!({ "id": id, "included": included }));
    } else if included {
        println!("Entry {} now counts toward daily totals", short_id(&id));
    } else {
        println!("Entry {} excluded from daily totals", short_id(&id));
    }
    Ok(())
}

pub(crate) fn cmd_entry_delete(svc: &TrackerService, id: &str, json: bool) -> Result<()> {
    let id = resolve_entry_id(svc, id, json)?;
    if !svc.delete_totals(&id)? {
        not_found(&id, json);
    }

    if json {
        println!("{}", serde_json::json!({ "deleted": id }));
    } else {
        println!("Deleted entry {}", short_id(&id));
    }
    Ok(())
}

/// Copy entries to today. Ids that no longer resolve are skipped.
pub(crate) fn cmd_entry_copy(svc: &TrackerService, ids: &[String], json: bool) -> Result<()> {
    let mut resolved = Vec::new();
    for prefix in ids {
        match svc.resolve_totals_id(prefix)? {
            Some(id) => resolved.push(id),
            None => eprintln!("Skipping unknown entry {prefix}"),
        }
    }
    let copies = svc.copy_to_today(&resolved)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&copies)?);
    } else if copies.is_empty() {
        eprintln!("Nothing copied");
        process::exit(2);
    } else {
        for copy in &copies {
            println!("Copied {} as {}", copy.name, short_id(&copy.id));
        }
    }
    Ok(())
}

pub(crate) fn cmd_entry_clear(svc: &TrackerService, date: Option<String>, json: bool) -> Result<()> {
    let date = parse_date(date)?;
    let removed = svc.clear_day(date)?;

    if json {
        println!(
            "{}",
            serde_json::json!({ "date": date.format("%Y-%m-%d").to_string(), "deleted": removed })
        );
    } else {
        println!("Deleted {removed} entries for {date}");
    }
    Ok(())
}
