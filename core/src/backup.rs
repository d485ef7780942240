//! Whole-database backup as a single pretty-printed JSON archive.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::db::Database;
use crate::models::{ExpectedPlan, Food, Totals, WeightEntry, WorkoutEntry, WorkoutName};

pub const BACKUP_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupArchive {
    pub version: u32,
    pub exported_at: String,
    #[serde(default)]
    pub foods: Vec<Food>,
    #[serde(default)]
    pub totals: Vec<Totals>,
    #[serde(default)]
    pub expected_plan: Option<ExpectedPlan>,
    #[serde(default)]
    pub weights: Vec<WeightEntry>,
    #[serde(default)]
    pub workout_entries: Vec<WorkoutEntry>,
    #[serde(default)]
    pub workout_names: Vec<WorkoutName>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RestoreSummary {
    pub foods: usize,
    pub totals: usize,
    pub weights: usize,
    pub workout_entries: usize,
    pub workout_names: usize,
    pub plan_restored: bool,
}

/// Snapshot every record in the database.
pub fn export(db: &Database) -> Result<BackupArchive> {
    Ok(BackupArchive {
        version: BACKUP_VERSION,
        exported_at: Local::now().to_rfc3339(),
        foods: db.list_all_foods()?,
        totals: db.list_all_totals()?,
        expected_plan: db.get_expected_plan()?,
        weights: db.list_weights()?,
        workout_entries: db.list_workouts()?,
        workout_names: db.list_workout_names()?,
    })
}

/// Upsert every record of the archive by id. Existing records that the
/// archive does not mention are left alone; the plan is replaced only when
/// the archive carries one.
pub fn restore(db: &Database, archive: &BackupArchive) -> Result<RestoreSummary> {
    if archive.version > BACKUP_VERSION {
        bail!(
            "Backup version {} is newer than supported version {BACKUP_VERSION}",
            archive.version
        );
    }

    let mut summary = RestoreSummary::default();
    for food in &archive.foods {
        db.upsert_food(food)
            .with_context(|| format!("Failed to restore food '{}'", food.name))?;
        summary.foods += 1;
    }
    for totals in &archive.totals {
        db.upsert_totals(totals)?;
        summary.totals += 1;
    }
    for weight in &archive.weights {
        db.replace_weight_entry(weight)?;
        summary.weights += 1;
    }
    for entry in &archive.workout_entries {
        db.upsert_workout(entry)?;
        summary.workout_entries += 1;
    }
    for name in &archive.workout_names {
        db.upsert_workout_name(&name.name, name.last_used)?;
        summary.workout_names += 1;
    }
    if let Some(plan) = &archive.expected_plan {
        db.set_expected_plan(plan)?;
        summary.plan_restored = true;
    }
    Ok(summary)
}

#[must_use]
pub fn backup_file_name(at: &DateTime<Local>) -> String {
    format!("macrolog_backup_{}.json", at.format("%Y-%m-%d_%H-%M-%S-%3f"))
}

/// Write the archive into `dir` (created if missing) and return the file path.
pub fn write_archive(archive: &BackupArchive, dir: &Path, at: &DateTime<Local>) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create backup directory: {}", dir.display()))?;
    let path = dir.join(backup_file_name(at));
    let json = serde_json::to_string_pretty(archive)?;
    fs::write(&path, json)
        .with_context(|| format!("Failed to write backup: {}", path.display()))?;
    Ok(path)
}

pub fn read_archive(path: &Path) -> Result<BackupArchive> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read backup: {}", path.display()))?;
    serde_json::from_str(&data)
        .with_context(|| format!("Invalid backup file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EXPECTED_PLAN_ID, WorkoutSet};
    use chrono::TimeZone;

    fn seeded_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.upsert_food(&Food {
            id: "Rice".to_string(),
            name: "Rice".to_string(),
            weight: 200.0,
            calories: 130.0,
            proteins: 2.7,
            fat: 0.3,
            carbs: 28.0,
            last_used: 10,
            price: Some(2.5),
            price_grams: Some(1000.0),
        })
        .unwrap();
        db.upsert_totals(&Totals {
            id: "t1".to_string(),
            name: "Rice".to_string(),
            weight: 200.0,
            total_calories: 260.0,
            total_proteins: 5.4,
            total_fat: 0.6,
            total_carbs: 56.0,
            timestamp: 1_000,
            included: false,
            cost: 0.5,
        })
        .unwrap();
        db.upsert_weight("w1", 1_000, 80.0).unwrap();
        db.set_expected_plan(&ExpectedPlan {
            id: EXPECTED_PLAN_ID.to_string(),
            start_date_millis: 1_000,
            baseline_weight_kg: 80.0,
            daily_delta_kg: -0.05,
        })
        .unwrap();
        db.upsert_workout(&WorkoutEntry {
            id: "e1".to_string(),
            name: "Squat".to_string(),
            date_millis: 1_000,
            notes: String::new(),
            sets: vec![WorkoutSet {
                weight_kg: 100.0,
                reps: 5,
                rest: "3min".to_string(),
            }],
            updated_at: 2_000,
        })
        .unwrap();
        db.upsert_workout_name("Squat", 2_000).unwrap();
        db
    }

    #[test]
    fn test_export_collects_everything() {
        let archive = export(&seeded_db()).unwrap();
        assert_eq!(archive.version, BACKUP_VERSION);
        assert_eq!(archive.foods.len(), 1);
        assert_eq!(archive.totals.len(), 1);
        assert_eq!(archive.weights.len(), 1);
        assert_eq!(archive.workout_entries.len(), 1);
        assert_eq!(archive.workout_names.len(), 1);
        assert!(archive.expected_plan.is_some());
    }

    #[test]
    fn test_archive_uses_camel_case_keys() {
        let archive = export(&seeded_db()).unwrap();
        let json = serde_json::to_value(&archive).unwrap();
        assert!(json.get("workoutEntries").is_some());
        assert!(json.get("expectedPlan").is_some());
        assert_eq!(json["totals"][0]["totalCalories"], 260.0);
        assert_eq!(json["weights"][0]["weightKg"], 80.0);
        assert_eq!(json["workoutEntries"][0]["sets"][0]["reps"], 5);
    }

    #[test]
    fn test_backups_in_same_minute_do_not_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let archive = export(&seeded_db()).unwrap();
        let first = Local.with_ymd_and_hms(2024, 6, 15, 9, 30, 12).unwrap();
        let second = first + chrono::Duration::milliseconds(250);

        let a = write_archive(&archive, dir.path(), &first).unwrap();
        let b = write_archive(&archive, dir.path(), &second).unwrap();
        assert_ne!(a, b);
        assert!(a.ends_with("macrolog_backup_2024-06-15_09-30-12-000.json"));
        assert!(b.ends_with("macrolog_backup_2024-06-15_09-30-12-250.json"));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn test_write_read_restore_into_fresh_db() {
        let dir = tempfile::tempdir().unwrap();
        let at = Local.with_ymd_and_hms(2024, 6, 15, 9, 30, 0).unwrap();
        let archive = export(&seeded_db()).unwrap();

        let path = write_archive(&archive, &dir.path().join("backups"), &at).unwrap();
        assert!(path.ends_with("macrolog_backup_2024-06-15_09-30-00-000.json"));

        let read = read_archive(&path).unwrap();
        let fresh = Database::open_in_memory().unwrap();
        let summary = restore(&fresh, &read).unwrap();

        assert_eq!(
            summary,
            RestoreSummary {
                foods: 1,
                totals: 1,
                weights: 1,
                workout_entries: 1,
                workout_names: 1,
                plan_restored: true,
            }
        );
        let totals = fresh.get_totals("t1").unwrap().unwrap();
        assert!(!totals.included);
        assert_eq!(fresh.get_workout("e1").unwrap().unwrap().sets.len(), 1);
        assert_eq!(
            fresh.get_expected_plan().unwrap().unwrap().daily_delta_kg,
            -0.05
        );
    }

    #[test]
    fn test_restore_is_idempotent() {
        let db = seeded_db();
        let archive = export(&db).unwrap();
        restore(&db, &archive).unwrap();
        restore(&db, &archive).unwrap();
        assert_eq!(db.list_all_totals().unwrap().len(), 1);
        assert_eq!(db.list_weights().unwrap().len(), 1);
    }

    #[test]
    fn test_restore_rejects_newer_version() {
        let mut archive = export(&seeded_db()).unwrap();
        archive.version = BACKUP_VERSION + 1;
        let db = Database::open_in_memory().unwrap();
        assert!(restore(&db, &archive).is_err());
    }

    #[test]
    fn test_read_archive_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "not json").unwrap();
        assert!(read_archive(&path).is_err());
        assert!(read_archive(&dir.path().join("missing.json")).is_err());
    }
}
