use anyhow::{Result, bail};
use std::process;
use tabled::{Table, Tabled, settings::Style};

use macrolog_core::calendar::millis_to_date;
use macrolog_core::format::format_workout_set;
use macrolog_core::models::{WorkoutDraft, WorkoutEntry, WorkoutSet};
use macrolog_core::service::TrackerService;

use super::helpers::{
    json_error, parse_date, parse_set, resolve_workout_id, short_id, suggest_query_ready,
};

fn parse_sets(sets: &[String]) -> Result<Vec<WorkoutSet>> {
    sets.iter().map(|s| parse_set(s)).collect()
}

fn sets_display(entry: &WorkoutEntry) -> String {
    entry
        .sets
        .iter()
        .map(format_workout_set)
        .collect::<Vec<_>>()
        .join("; ")
}

fn print_workout(entry: &WorkoutEntry, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(entry)?);
        return Ok(());
    }
    println!(
        "{} [{}] {}",
        millis_to_date(entry.date_millis),
        short_id(&entry.id),
        entry.name
    );
    for (i, set) in entry.sets.iter().enumerate() {
        println!("  {}. {}", i + 1, format_workout_set(set));
    }
    if !entry.notes.is_empty() {
        println!("  Notes: {}", entry.notes);
    }
    Ok(())
}

pub(crate) fn cmd_workout_add(
    svc: &TrackerService,
    name: &str,
    sets: &[String],
    notes: Option<String>,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let draft = WorkoutDraft {
        name: name.to_string(),
        date: parse_date(date)?,
        notes: notes.unwrap_or_default(),
        sets: parse_sets(sets)?,
    };
    let entry = svc.save_workout(&draft)?;
    print_workout(&entry, json)
}

/// Replace fields of an existing workout. Passing any `--set` replaces the
/// whole set list; `--clear-sets` empties it.
#[allow(clippy::too_many_arguments)]
pub(crate) fn cmd_workout_edit(
    svc: &TrackerService,
    id: &str,
    name: Option<String>,
    sets: &[String],
    clear_sets: bool,
    notes: Option<String>,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    if name.is_none() && sets.is_empty() && !clear_sets && notes.is_none() && date.is_none() {
        bail!("Nothing to update. Provide at least one of --name, --set, --clear-sets, --notes or --date");
    }
    let id = resolve_workout_id(svc, id, json)?;
    let Some(current) = svc.get_workout(&id)? else {
        bail!("Workout {id} disappeared while editing");
    };

    let draft = WorkoutDraft {
        name: name.unwrap_or(current.name),
        date: match date {
            Some(d) => parse_date(Some(d))?,
            None => millis_to_date(current.date_millis),
        },
        notes: notes.unwrap_or(current.notes),
        sets: if clear_sets {
            Vec::new()
        } else if sets.is_empty() {
            current.sets
        } else {
            parse_sets(sets)?
        },
    };

    match svc.update_workout(&id, &draft)? {
        Some(entry) => print_workout(&entry, json),
        None => bail!("Workout {id} disappeared while editing"),
    }
}

pub(crate) fn cmd_workout_list(svc: &TrackerService, filter: Option<&str>, json: bool) -> Result<()> {
    let entries = svc.list_workouts(filter)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }
    if entries.is_empty() {
        eprintln!("No workouts found");
        process::exit(2);
    }

    #[derive(Tabled)]
    struct WorkoutRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Exercise")]
        name: String,
        #[tabled(rename = "Sets")]
        sets: String,
        #[tabled(rename = "Notes")]
        notes: String,
    }

    let rows: Vec<WorkoutRow> = entries
        .iter()
        .map(|e| WorkoutRow {
            id: short_id(&e.id).to_string(),
            date: millis_to_date(e.date_millis).format("%Y-%m-%d").to_string(),
            name: e.name.clone(),
            sets: sets_display(e),
            notes: e.notes.lines().next().unwrap_or_default().to_string(),
        })
        .collect();

    let table = Table::new(&rows).with(Style::rounded()).to_string();
    println!("{table}");

    Ok(())
}

pub(crate) fn cmd_workout_delete(svc: &TrackerService, id: &str, json: bool) -> Result<()> {
    let id = resolve_workout_id(svc, id, json)?;
    if svc.delete_workout(&id)? {
        if json {
            println!("{}", serde_json::json!({ "deleted": id }));
        } else {
            println!("Deleted workout {}", short_id(&id));
        }
        Ok(())
    } else {
        if json {
            println!("{}", json_error(&format!("Workout {id} not found")));
        } else {
            eprintln!("Workout {id} not found");
        }
        process::exit(2);
    }
}

pub(crate) fn cmd_workout_names(svc: &TrackerService, query: &str, json: bool) -> Result<()> {
    let names = if suggest_query_ready(query) {
        svc.suggest_workout_names(query)?
    } else {
        Vec::new()
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&names)?);
    } else if names.is_empty() {
        eprintln!("No exercises match '{query}'");
        process::exit(2);
    } else {
        for name in &names {
            println!("{name}");
        }
    }

    Ok(())
}

pub(crate) fn cmd_workout_forget(svc: &TrackerService, name: &str, json: bool) -> Result<()> {
    let forgotten = svc.forget_workout_name(name)?;

    if json {
        println!("{}", serde_json::json!({ "name": name, "forgotten": forgotten }));
    } else if forgotten {
        println!("'{name}' removed from exercise suggestions");
    } else {
        eprintln!("'{name}' is not a known exercise name");
        process::exit(2);
    }

    Ok(())
}
