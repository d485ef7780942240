mod commands;
mod config;
mod logging;
mod openfoodfacts;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;

use crate::commands::{
    MacroArgs, PrefillAction, cmd_backup, cmd_barcode, cmd_entry_clear, cmd_entry_copy,
    cmd_entry_delete, cmd_entry_edit, cmd_entry_include, cmd_food_add, cmd_food_delete,
    cmd_food_list, cmd_food_suggest, cmd_history, cmd_log, cmd_paste, cmd_plan_clear,
    cmd_plan_set, cmd_plan_show, cmd_restore, cmd_summary, cmd_trend, cmd_weight_delete,
    cmd_weight_history, cmd_weight_log, cmd_weight_show, cmd_workout_add, cmd_workout_delete,
    cmd_workout_edit, cmd_workout_forget, cmd_workout_list, cmd_workout_names, parse_number,
};
use crate::config::Config;
use crate::openfoodfacts::OpenFoodFactsClient;
use macrolog_core::service::TrackerService;

#[derive(Parser)]
#[command(
    name = "macrolog",
    version,
    about = "Track what you eat, what you weigh and what you lift",
    long_about = "Local-first nutrition, body weight and workout log.\n\n\
        Data lives in a single SQLite file; set MACROLOG_DB to use another one.\n\
        Set RUST_LOG=debug for diagnostics on stderr."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log a serving of a saved food (or define it inline with --calories)
    Log {
        /// Food name
        food: String,
        /// Serving size in grams (default: the food's last serving)
        #[arg(value_parser = parse_number)]
        serving: Option<f64>,
        /// Calories per 100g
        #[arg(long, value_parser = parse_number)]
        calories: Option<f64>,
        /// Protein per 100g
        #[arg(long, value_parser = parse_number)]
        protein: Option<f64>,
        /// Carbs per 100g
        #[arg(long, value_parser = parse_number)]
        carbs: Option<f64>,
        /// Fat per 100g
        #[arg(long, value_parser = parse_number)]
        fat: Option<f64>,
        /// Date to log for (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Look up nutrition for a barcode on `OpenFoodFacts`
    Barcode {
        /// Barcode number
        code: String,
        /// Log the product instead of only showing it
        #[arg(long)]
        log: bool,
        /// Serving size in grams when logging (default: 100)
        #[arg(short, long, value_parser = parse_number)]
        serving: Option<f64>,
        /// Date to log for (default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Prefill a food from a pasted JSON object (reads stdin when no text is given)
    Paste {
        /// JSON text with foodName, weightInGrams, calories, fat, carbs, protein
        text: Option<String>,
        /// Log the food instead of only showing it
        #[arg(long)]
        log: bool,
        /// Serving size in grams, overriding weightInGrams
        #[arg(short, long, value_parser = parse_number)]
        serving: Option<f64>,
        /// Date to log for (default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the entries and totals of a day (defaults to today)
    Summary {
        /// Date to show (YYYY-MM-DD, default: today)
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show daily totals for the last N days
    History {
        /// Number of days to show
        #[arg(short, long, default_value = "7")]
        days: u32,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Edit, include, exclude, copy or delete logged entries
    Entry {
        #[command(subcommand)]
        command: EntryCommands,
    },
    /// Manage saved foods
    Food {
        #[command(subcommand)]
        command: FoodCommands,
    },
    /// Track body weight
    Weight {
        #[command(subcommand)]
        command: WeightCommands,
    },
    /// Manage the expected weight plan
    Plan {
        #[command(subcommand)]
        command: PlanCommands,
    },
    /// Show actual, expected and adjusted weight day by day
    Trend {
        /// First day (default: first weigh-in)
        #[arg(long)]
        from: Option<String>,
        /// Last day (default: twelve months from today)
        #[arg(long)]
        to: Option<String>,
        /// Show every Nth day (weigh-in days are always shown)
        #[arg(long, default_value = "1")]
        step: u32,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Log and browse workouts
    Workout {
        #[command(subcommand)]
        command: WorkoutCommands,
    },
    /// Export everything to a timestamped JSON file
    Backup {
        /// Directory to write into (default: the data directory's backups folder)
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Import a backup file, upserting every record by id
    Restore {
        /// Backup file to read
        file: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum EntryCommands {
    /// Change an entry's weight and recompute it from the saved food
    Edit {
        /// Entry ID (or unique prefix)
        id: String,
        /// New weight in grams
        #[arg(value_parser = parse_number)]
        weight: f64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Count an entry toward daily totals again
    Include {
        /// Entry ID (or unique prefix)
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Keep an entry but leave it out of daily totals
    Exclude {
        /// Entry ID (or unique prefix)
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Copy entries to today
    Copy {
        /// Entry IDs (or unique prefixes)
        #[arg(required = true)]
        ids: Vec<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete an entry
    Delete {
        /// Entry ID (or unique prefix)
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete every entry of a day
    Clear {
        /// Date to clear (default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum FoodCommands {
    /// Save a food, replacing any food with the same name
    Add {
        /// Food name
        name: String,
        /// Calories per 100g
        #[arg(long, value_parser = parse_number)]
        calories: f64,
        /// Protein per 100g
        #[arg(long, value_parser = parse_number)]
        protein: Option<f64>,
        /// Carbs per 100g
        #[arg(long, value_parser = parse_number)]
        carbs: Option<f64>,
        /// Fat per 100g
        #[arg(long, value_parser = parse_number)]
        fat: Option<f64>,
        /// Default serving size in grams
        #[arg(long, value_parser = parse_number)]
        serving: Option<f64>,
        /// Price paid for a package
        #[arg(long, value_parser = parse_number, requires = "price_grams")]
        price: Option<f64>,
        /// Grams in the package the price is for
        #[arg(long, value_parser = parse_number, requires = "price")]
        price_grams: Option<f64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List saved foods, most recently used first
    List {
        /// Substring to filter names by
        #[arg(short, long)]
        search: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Suggest food names matching every word of a query
    Suggest {
        /// Query words
        query: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a saved food (logged entries are kept)
    Delete {
        /// Food name
        name: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum WeightCommands {
    /// Log a weight entry (one per day; logging again replaces it)
    Log {
        /// Weight value (number)
        #[arg(value_parser = parse_number)]
        value: f64,
        /// Unit: kg or lbs (default: kg)
        #[arg(short, long, default_value = "kg")]
        unit: String,
        /// Date (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show weight for a specific date (default: today)
    Show {
        /// Date (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show weight history, newest first
    History {
        /// Number of entries to show (default: all)
        #[arg(short, long)]
        days: Option<u32>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete the weight entry of a date
    Delete {
        /// Date (YYYY-MM-DD or today/yesterday/tomorrow)
        date: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum PlanCommands {
    /// Start a plan from the weight logged on the start date
    Set {
        /// Expected change per day in kg (negative to lose weight)
        #[arg(allow_negative_numbers = true, value_parser = parse_number)]
        daily_change: f64,
        /// Start date (default: today)
        #[arg(long)]
        start: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the plan and today's expected weights
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove the plan
    Clear {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum WorkoutCommands {
    /// Log a workout
    Add {
        /// Exercise name
        name: String,
        /// Set as [weight][x reps][@rest], e.g. 80x5@90s (repeatable)
        #[arg(short, long = "set")]
        sets: Vec<String>,
        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,
        /// Date (default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change a logged workout
    Edit {
        /// Workout ID (or unique prefix)
        id: String,
        /// New exercise name
        #[arg(long)]
        name: Option<String>,
        /// Replacement sets (repeatable)
        #[arg(short, long = "set")]
        sets: Vec<String>,
        /// Remove all sets
        #[arg(long, conflicts_with = "sets")]
        clear_sets: bool,
        /// New notes
        #[arg(long)]
        notes: Option<String>,
        /// New date
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List workouts, newest first
    List {
        /// Only exercises whose name contains this text
        #[arg(short, long)]
        filter: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a workout
    Delete {
        /// Workout ID (or unique prefix)
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Suggest exercise names matching every word of a query
    Names {
        /// Query words
        query: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove an exercise name from suggestions
    Forget {
        /// Exercise name
        name: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    logging::init_with_level("warn");
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

#[allow(clippy::too_many_lines)]
fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let svc = TrackerService::new(&config.db_path)?;

    match cli.command {
        Commands::Log {
            food,
            serving,
            calories,
            protein,
            carbs,
            fat,
            date,
            json,
        } => {
            let macros = MacroArgs {
                calories,
                protein,
                carbs,
                fat,
            };
            cmd_log(&svc, &food, serving, &macros, date, json)
        }
        Commands::Barcode {
            code,
            log,
            serving,
            date,
            json,
        } => {
            let off = OpenFoodFactsClient::new()?;
            let action = PrefillAction { log, serving, date };
            cmd_barcode(&svc, &off, &code, action, json)
        }
        Commands::Paste {
            text,
            log,
            serving,
            date,
            json,
        } => cmd_paste(&svc, text, PrefillAction { log, serving, date }, json),
        Commands::Summary { date, json } => cmd_summary(&svc, date, json),
        Commands::History { days, json } => cmd_history(&svc, days, json),
        Commands::Entry { command } => match command {
            EntryCommands::Edit { id, weight, json } => cmd_entry_edit(&svc, &id, weight, json),
            EntryCommands::Include { id, json } => cmd_entry_include(&svc, &id, true, json),
            EntryCommands::Exclude { id, json } => cmd_entry_include(&svc, &id, false, json),
            EntryCommands::Copy { ids, json } => cmd_entry_copy(&svc, &ids, json),
            EntryCommands::Delete { id, json } => cmd_entry_delete(&svc, &id, json),
            EntryCommands::Clear { date, json } => cmd_entry_clear(&svc, date, json),
        },
        Commands::Food { command } => match command {
            FoodCommands::Add {
                name,
                calories,
                protein,
                carbs,
                fat,
                serving,
                price,
                price_grams,
                json,
            } => cmd_food_add(
                &svc,
                &name,
                calories,
                protein,
                carbs,
                fat,
                serving,
                price,
                price_grams,
                json,
            ),
            FoodCommands::List { search, json } => cmd_food_list(&svc, search.as_deref(), json),
            FoodCommands::Suggest { query, json } => cmd_food_suggest(&svc, &query, json),
            FoodCommands::Delete { name, json } => cmd_food_delete(&svc, &name, json),
        },
        Commands::Weight { command } => match command {
            WeightCommands::Log {
                value,
                unit,
                date,
                json,
            } => cmd_weight_log(&svc, value, &unit, date, json),
            WeightCommands::Show { date, json } => cmd_weight_show(&svc, date, json),
            WeightCommands::History { days, json } => cmd_weight_history(&svc, days, json),
            WeightCommands::Delete { date, json } => cmd_weight_delete(&svc, &date, json),
        },
        Commands::Plan { command } => match command {
            PlanCommands::Set {
                daily_change,
                start,
                json,
            } => cmd_plan_set(&svc, daily_change, start, json),
            PlanCommands::Show { json } => cmd_plan_show(&svc, json),
            PlanCommands::Clear { json } => cmd_plan_clear(&svc, json),
        },
        Commands::Trend {
            from,
            to,
            step,
            json,
        } => cmd_trend(&svc, from, to, step, json),
        Commands::Workout { command } => match command {
            WorkoutCommands::Add {
                name,
                sets,
                notes,
                date,
                json,
            } => cmd_workout_add(&svc, &name, &sets, notes, date, json),
            WorkoutCommands::Edit {
                id,
                name,
                sets,
                clear_sets,
                notes,
                date,
                json,
            } => cmd_workout_edit(&svc, &id, name, &sets, clear_sets, notes, date, json),
            WorkoutCommands::List { filter, json } => {
                cmd_workout_list(&svc, filter.as_deref(), json)
            }
            WorkoutCommands::Delete { id, json } => cmd_workout_delete(&svc, &id, json),
            WorkoutCommands::Names { query, json } => cmd_workout_names(&svc, &query, json),
            WorkoutCommands::Forget { name, json } => cmd_workout_forget(&svc, &name, json),
        },
        Commands::Backup { dir, json } => {
            let dir = dir.unwrap_or(config.backup_dir);
            cmd_backup(&svc, &dir, json)
        }
        Commands::Restore { file, json } => cmd_restore(&svc, &file, json),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_workout_add_with_sets() {
        let cli = Cli::try_parse_from([
            "macrolog", "workout", "add", "Squat", "-s", "100x5@3min", "--set", "90x8",
        ])
        .unwrap();
        match cli.command {
            Commands::Workout {
                command: WorkoutCommands::Add { name, sets, .. },
            } => {
                assert_eq!(name, "Squat");
                assert_eq!(sets, vec!["100x5@3min", "90x8"]);
            }
            _ => panic!("expected workout add"),
        }
    }

    #[test]
    fn test_parse_negative_plan_delta() {
        let cli = Cli::try_parse_from(["macrolog", "plan", "set", "-0.05"]).unwrap();
        match cli.command {
            Commands::Plan {
                command: PlanCommands::Set { daily_change, .. },
            } => assert!((daily_change + 0.05).abs() < f64::EPSILON),
            _ => panic!("expected plan set"),
        }
    }

    #[test]
    fn test_price_requires_package_grams() {
        let result = Cli::try_parse_from([
            "macrolog", "food", "add", "Rice", "--calories", "130", "--price", "2.5",
        ]);
        assert!(result.is_err());
    }
}
