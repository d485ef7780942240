use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use chrono::{Days, Local, NaiveDate};
use uuid::Uuid;

use crate::backup::{self, BackupArchive, RestoreSummary};
use crate::calendar::{day_bounds, now_millis, start_of_day_millis, today};
use crate::db::Database;
use crate::format::round2;
use crate::models::{
    DailyTotals, DayTotals, EXPECTED_PLAN_ID, ExpectedPlan, Food, NewFood, NutritionPrefill,
    Totals, WeightEntry, WorkoutDraft, WorkoutEntry, validate_new_food, validate_weight_kg,
    validate_workout_sets,
};
use crate::suggest::{FOOD_SUGGESTION_LIMIT, WORKOUT_NAME_LIMIT, suggest};
use crate::totals::{ScaledMacros, aggregate, entry_cost, recompute_for_weight};
use crate::trend::{
    PlanAnchor, TrendRow, WeightHistory, adjusted_expected, default_trend_range,
    planned_expected, trend_rows,
};

/// Barcode nutrition lookup.
///
/// The CLI implements this with reqwest against `OpenFoodFacts`. Called
/// synchronously; errors are logged and treated as "no result".
pub trait NutritionLookup: Send + Sync {
    fn lookup_barcode(&self, barcode: &str) -> Result<Option<NutritionPrefill>>;
}

pub struct TrackerService {
    db: Database,
}

impl TrackerService {
    pub fn new(db_path: &Path) -> Result<Self> {
        let db = Database::open(db_path)?;
        Ok(Self { db })
    }

    pub fn new_in_memory() -> Result<Self> {
        let db = Database::open_in_memory()?;
        Ok(Self { db })
    }

    // --- Foods ---

    /// Save a food by name, overwriting any existing definition and marking
    /// it as just used. The price is stored rounded to cents.
    pub fn save_food(&self, food: &NewFood) -> Result<Food> {
        validate_new_food(food)?;
        let name = food.name.trim().to_string();
        let saved = self.db.upsert_food(&Food {
            id: name.clone(),
            name,
            weight: food.weight,
            calories: food.calories,
            proteins: food.proteins,
            fat: food.fat,
            carbs: food.carbs,
            last_used: now_millis(),
            price: food.price.map(round2),
            price_grams: food.price_grams,
        })?;
        tracing::debug!("Saved food '{}'", saved.name);
        Ok(saved)
    }

    pub fn get_food(&self, name: &str) -> Result<Option<Food>> {
        self.db.get_food_by_name(name.trim())
    }

    pub fn touch_food(&self, name: &str) -> Result<bool> {
        self.db.touch_food(name.trim(), now_millis())
    }

    pub fn delete_food(&self, name: &str) -> Result<bool> {
        self.db.delete_food(name.trim())
    }

    pub fn list_foods(&self, search: Option<&str>) -> Result<Vec<Food>> {
        self.db.list_foods(search)
    }

    pub fn suggest_foods(&self, query: &str) -> Result<Vec<String>> {
        let foods = self.db.list_all_foods()?;
        Ok(suggest(&foods, query, FOOD_SUGGESTION_LIMIT))
    }

    // --- Totals ---

    /// Save the food and log `food.weight` grams of it at the start of `date`.
    pub fn log_food(&self, date: NaiveDate, food: &NewFood) -> Result<Totals> {
        if food.weight <= 0.0 {
            bail!("Serving size must be greater than 0");
        }
        let saved = self.save_food(food)?;
        let macros = ScaledMacros::of(&saved, saved.weight);
        let totals = Totals {
            id: Uuid::new_v4().to_string(),
            name: saved.name.clone(),
            weight: saved.weight,
            total_calories: macros.calories,
            total_proteins: macros.proteins,
            total_fat: macros.fat,
            total_carbs: macros.carbs,
            timestamp: start_of_day_millis(date),
            included: true,
            cost: entry_cost(&saved, saved.weight),
        };
        self.db.upsert_totals(&totals)?;
        tracing::debug!("Logged {}g of '{}' for {date}", totals.weight, totals.name);
        Ok(totals)
    }

    pub fn aggregate_for_date(&self, date: NaiveDate) -> Result<DailyTotals> {
        let (start, end) = day_bounds(date);
        let entries = self.db.list_included_totals_between(start, end)?;
        Ok(aggregate(&entries))
    }

    pub fn list_for_date(&self, date: NaiveDate) -> Result<Vec<Totals>> {
        let (start, end) = day_bounds(date);
        self.db.list_totals_between(start, end)
    }

    /// Per-day aggregates for `days` days ending at `end`, newest first.
    pub fn daily_history(&self, end: NaiveDate, days: u32) -> Result<Vec<DayTotals>> {
        let mut history = Vec::new();
        for offset in 0..days {
            let Some(date) = end.checked_sub_days(Days::new(u64::from(offset))) else {
                break;
            };
            let entries = self.list_for_date(date)?;
            history.push(DayTotals {
                date,
                entries: entries.len(),
                totals: aggregate(&entries),
            });
        }
        Ok(history)
    }

    pub fn get_totals(&self, id: &str) -> Result<Option<Totals>> {
        self.db.get_totals(id)
    }

    /// Full id for an id or unique id prefix.
    pub fn resolve_totals_id(&self, prefix: &str) -> Result<Option<String>> {
        self.db.resolve_totals_id(prefix)
    }

    pub fn set_included(&self, id: &str, included: bool) -> Result<bool> {
        self.db.set_totals_included(id, included)
    }

    /// Copy entries to now with fresh ids. Unknown ids are skipped and each
    /// copy is written on its own.
    pub fn copy_to_today(&self, ids: &[String]) -> Result<Vec<Totals>> {
        let now = now_millis();
        let mut copies = Vec::new();
        for id in ids {
            let Some(source) = self.db.get_totals(id)? else {
                tracing::debug!("Skipping copy of unknown entry {id}");
                continue;
            };
            let copy = Totals {
                id: Uuid::new_v4().to_string(),
                timestamp: now,
                ..source
            };
            self.db.upsert_totals(&copy)?;
            copies.push(copy);
        }
        tracing::debug!("Copied {} entries to today", copies.len());
        Ok(copies)
    }

    /// Change an entry's weight and recompute its macros and cost from the
    /// current food definition. `None` if the entry does not exist.
    pub fn recompute_on_weight_edit(&self, id: &str, new_weight_g: f64) -> Result<Option<Totals>> {
        if !new_weight_g.is_finite() || new_weight_g < 0.0 {
            bail!("Serving size must not be negative");
        }
        let Some(entry) = self.db.get_totals(id)? else {
            return Ok(None);
        };
        let matching = self.db.find_foods_by_name(&entry.name)?;
        if matching.is_empty() {
            tracing::warn!(
                "No food named '{}' anymore; entry values fall back to zero",
                entry.name
            );
        }
        let updated = recompute_for_weight(&entry, &matching, new_weight_g);
        self.db.upsert_totals(&updated)?;
        Ok(Some(updated))
    }

    pub fn delete_totals(&self, id: &str) -> Result<bool> {
        self.db.delete_totals(id)
    }

    /// Delete every entry of `date`.
    pub fn clear_day(&self, date: NaiveDate) -> Result<usize> {
        let (start, end) = day_bounds(date);
        self.db.delete_totals_between(start, end)
    }

    // --- Weight ---

    pub fn log_weight(&self, date: NaiveDate, weight_kg: f64) -> Result<WeightEntry> {
        validate_weight_kg(weight_kg)?;
        let id = Uuid::new_v4().to_string();
        self.db
            .upsert_weight(&id, start_of_day_millis(date), weight_kg)
    }

    pub fn get_weight(&self, date: NaiveDate) -> Result<Option<WeightEntry>> {
        self.db.get_weight(start_of_day_millis(date))
    }

    /// All weigh-ins, oldest first.
    pub fn weight_history(&self) -> Result<Vec<WeightEntry>> {
        self.db.list_weights()
    }

    /// Delete the weigh-in of `date`. A plan starting on that date goes too.
    pub fn delete_weight(&self, date: NaiveDate) -> Result<bool> {
        let timestamp = start_of_day_millis(date);
        let deleted = self.db.delete_weight(timestamp)?;
        if !deleted {
            return Ok(false);
        }
        if let Some(plan) = self.db.get_expected_plan()? {
            if plan.start_date_millis == timestamp {
                self.db.clear_expected_plan()?;
                tracing::info!("Cleared expected plan anchored on {date}");
            }
        }
        Ok(true)
    }

    // --- Expected plan ---

    /// Start a plan on `start`, copying that day's weigh-in as the baseline.
    pub fn set_expected_plan(&self, start: NaiveDate, daily_delta_kg: f64) -> Result<ExpectedPlan> {
        if !daily_delta_kg.is_finite() {
            bail!("Daily change must be a number");
        }
        let start_millis = start_of_day_millis(start);
        let Some(baseline) = self.db.get_weight(start_millis)? else {
            bail!("No weight recorded on {start}; log a weight for that day first");
        };
        let plan = ExpectedPlan {
            id: EXPECTED_PLAN_ID.to_string(),
            start_date_millis: start_millis,
            baseline_weight_kg: baseline.weight_kg,
            daily_delta_kg,
        };
        self.db.set_expected_plan(&plan)?;
        tracing::info!(
            "Expected plan set from {start}: {} kg, {daily_delta_kg:+} kg/day",
            plan.baseline_weight_kg
        );
        Ok(plan)
    }

    pub fn expected_plan(&self) -> Result<Option<ExpectedPlan>> {
        self.db.get_expected_plan()
    }

    pub fn clear_expected_plan(&self) -> Result<bool> {
        self.db.clear_expected_plan()
    }

    fn trend_inputs(&self) -> Result<(Option<PlanAnchor>, WeightHistory)> {
        let plan = self.db.get_expected_plan()?;
        let history = WeightHistory::from_entries(&self.db.list_weights()?);
        Ok((plan.as_ref().map(PlanAnchor::from), history))
    }

    pub fn planned_expected(&self, date: NaiveDate) -> Result<Option<f64>> {
        let (plan, history) = self.trend_inputs()?;
        Ok(planned_expected(plan.as_ref(), &history, date))
    }

    pub fn adjusted_expected(&self, date: NaiveDate) -> Result<Option<f64>> {
        let (plan, history) = self.trend_inputs()?;
        Ok(adjusted_expected(plan.as_ref(), &history, date))
    }

    /// Daily trend rows. Missing bounds default to the first weigh-in and
    /// twelve months from today.
    pub fn trend(&self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<Vec<TrendRow>> {
        let (plan, history) = self.trend_inputs()?;
        let (default_from, default_to) = default_trend_range(&history, today());
        let from = from.unwrap_or(default_from);
        let to = to.unwrap_or(default_to);
        if to < from {
            bail!("Trend end {to} is before start {from}");
        }
        Ok(trend_rows(plan.as_ref(), &history, from, to))
    }

    // --- Workouts ---

    fn build_workout(id: String, draft: &WorkoutDraft) -> Result<WorkoutEntry> {
        let name = draft.name.trim_end();
        if name.trim().is_empty() {
            bail!("Workout name cannot be empty");
        }
        validate_workout_sets(&draft.sets)?;
        Ok(WorkoutEntry {
            id,
            name: name.to_string(),
            date_millis: start_of_day_millis(draft.date),
            notes: draft.notes.trim_end().to_string(),
            sets: draft.sets.clone(),
            updated_at: now_millis(),
        })
    }

    pub fn save_workout(&self, draft: &WorkoutDraft) -> Result<WorkoutEntry> {
        let entry = Self::build_workout(Uuid::new_v4().to_string(), draft)?;
        self.db.upsert_workout(&entry)?;
        self.db.upsert_workout_name(&entry.name, entry.updated_at)?;
        tracing::debug!("Saved workout '{}' with {} sets", entry.name, entry.sets.len());
        Ok(entry)
    }

    /// Replace an existing workout, sets included. `None` if it does not exist.
    pub fn update_workout(&self, id: &str, draft: &WorkoutDraft) -> Result<Option<WorkoutEntry>> {
        if self.db.get_workout(id)?.is_none() {
            return Ok(None);
        }
        let entry = Self::build_workout(id.to_string(), draft)?;
        self.db.upsert_workout(&entry)?;
        self.db.upsert_workout_name(&entry.name, entry.updated_at)?;
        tracing::debug!("Updated workout {id}");
        Ok(Some(entry))
    }

    pub fn get_workout(&self, id: &str) -> Result<Option<WorkoutEntry>> {
        self.db.get_workout(id)
    }

    pub fn resolve_workout_id(&self, prefix: &str) -> Result<Option<String>> {
        self.db.resolve_workout_id(prefix)
    }

    pub fn delete_workout(&self, id: &str) -> Result<bool> {
        self.db.delete_workout(id)
    }

    /// Workouts newest first, optionally filtered by a case-insensitive name
    /// substring.
    pub fn list_workouts(&self, filter: Option<&str>) -> Result<Vec<WorkoutEntry>> {
        let entries = self.db.list_workouts()?;
        let needle = filter.map(|f| f.trim().to_lowercase()).unwrap_or_default();
        if needle.is_empty() {
            return Ok(entries);
        }
        Ok(entries
            .into_iter()
            .filter(|e| e.name.to_lowercase().contains(&needle))
            .collect())
    }

    pub fn suggest_workout_names(&self, query: &str) -> Result<Vec<String>> {
        let names = self.db.list_workout_names()?;
        Ok(suggest(&names, query, WORKOUT_NAME_LIMIT))
    }

    pub fn forget_workout_name(&self, name: &str) -> Result<bool> {
        self.db.delete_workout_name(name)
    }

    // --- Prefill sources ---

    /// Nutrition for a barcode, or `None` when the lookup finds nothing or fails.
    pub fn barcode_prefill(
        &self,
        provider: &dyn NutritionLookup,
        barcode: &str,
    ) -> Option<NutritionPrefill> {
        let barcode = barcode.trim();
        if barcode.is_empty() {
            return None;
        }
        match provider.lookup_barcode(barcode) {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!("Barcode lookup for {barcode} failed: {e:#}");
                None
            }
        }
    }

    // --- Backup ---

    pub fn export_backup(&self) -> Result<BackupArchive> {
        backup::export(&self.db)
    }

    /// Export everything into a timestamped file under `dir`.
    pub fn write_backup(&self, dir: &Path) -> Result<PathBuf> {
        let archive = self.export_backup()?;
        let path = backup::write_archive(&archive, dir, &Local::now())?;
        tracing::info!("Backup written to {}", path.display());
        Ok(path)
    }

    pub fn restore_backup(&self, archive: &BackupArchive) -> Result<RestoreSummary> {
        let summary = backup::restore(&self.db, archive)?;
        tracing::info!(
            "Restored {} foods, {} entries, {} weights, {} workouts",
            summary.foods,
            summary.totals,
            summary.weights,
            summary.workout_entries
        );
        Ok(summary)
    }
}
