use std::path::Path;

use anyhow::{Context, Result, bail};
use rusqlite::{Connection, OptionalExtension, params};

use crate::models::{
    EXPECTED_PLAN_ID, ExpectedPlan, Food, Totals, WeightEntry, WorkoutEntry, WorkoutName,
    WorkoutSet,
};

const FOOD_COLUMNS: &str =
    "id, name, weight, calories, proteins, fat, carbs, last_used, price, price_grams";
const TOTALS_COLUMNS: &str = "id, name, weight, total_calories, total_proteins, total_fat, total_carbs, timestamp, included, cost";
const WORKOUT_COLUMNS: &str = "id, name, date_millis, notes, sets, updated_at";

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        let version: i64 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        if version < 1 {
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS foods (
                    id TEXT PRIMARY KEY NOT NULL,
                    name TEXT NOT NULL UNIQUE,
                    weight REAL NOT NULL DEFAULT 0,
                    calories REAL NOT NULL,
                    proteins REAL NOT NULL,
                    fat REAL NOT NULL,
                    carbs REAL NOT NULL,
                    last_used INTEGER NOT NULL,
                    price REAL,
                    price_grams REAL
                );

                CREATE TABLE IF NOT EXISTS totals (
                    id TEXT PRIMARY KEY NOT NULL,
                    name TEXT NOT NULL,
                    weight REAL NOT NULL,
                    total_calories REAL NOT NULL,
                    total_proteins REAL NOT NULL,
                    total_fat REAL NOT NULL,
                    total_carbs REAL NOT NULL,
                    timestamp INTEGER NOT NULL,
                    included INTEGER NOT NULL DEFAULT 1,
                    cost REAL NOT NULL DEFAULT 0
                );

                CREATE INDEX IF NOT EXISTS idx_totals_timestamp ON totals(timestamp);
                CREATE INDEX IF NOT EXISTS idx_totals_name ON totals(name);

                CREATE TABLE IF NOT EXISTS weight_entries (
                    id TEXT PRIMARY KEY NOT NULL,
                    timestamp INTEGER NOT NULL UNIQUE,
                    weight_kg REAL NOT NULL
                );

                CREATE TABLE IF NOT EXISTS expected_plan (
                    id TEXT PRIMARY KEY NOT NULL CHECK (id = 'expected_plan_singleton'),
                    start_date_millis INTEGER NOT NULL,
                    baseline_weight_kg REAL NOT NULL,
                    daily_delta_kg REAL NOT NULL
                );

                PRAGMA user_version = 1;",
            )?;
        }

        if version < 2 {
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS workout_entries (
                    id TEXT PRIMARY KEY NOT NULL,
                    name TEXT NOT NULL,
                    date_millis INTEGER NOT NULL,
                    notes TEXT NOT NULL DEFAULT '',
                    sets TEXT NOT NULL DEFAULT '[]',
                    updated_at INTEGER NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_workout_entries_date ON workout_entries(date_millis);

                CREATE TABLE IF NOT EXISTS workout_names (
                    name TEXT PRIMARY KEY NOT NULL,
                    last_used INTEGER NOT NULL
                );

                PRAGMA user_version = 2;",
            )?;
        }

        Ok(())
    }

    // --- Row mapping helpers ---

    fn food_from_row(row: &rusqlite::Row) -> rusqlite::Result<Food> {
        Ok(Food {
            id: row.get(0)?,
            name: row.get(1)?,
            weight: row.get(2)?,
            calories: row.get(3)?,
            proteins: row.get(4)?,
            fat: row.get(5)?,
            carbs: row.get(6)?,
            last_used: row.get(7)?,
            price: row.get(8)?,
            price_grams: row.get(9)?,
        })
    }

    fn totals_from_row(row: &rusqlite::Row) -> rusqlite::Result<Totals> {
        Ok(Totals {
            id: row.get(0)?,
            name: row.get(1)?,
            weight: row.get(2)?,
            total_calories: row.get(3)?,
            total_proteins: row.get(4)?,
            total_fat: row.get(5)?,
            total_carbs: row.get(6)?,
            timestamp: row.get(7)?,
            included: row.get(8)?,
            cost: row.get(9)?,
        })
    }

    fn weight_entry_from_row(row: &rusqlite::Row) -> rusqlite::Result<WeightEntry> {
        Ok(WeightEntry {
            id: row.get(0)?,
            timestamp: row.get(1)?,
            weight_kg: row.get(2)?,
        })
    }

    fn plan_from_row(row: &rusqlite::Row) -> rusqlite::Result<ExpectedPlan> {
        Ok(ExpectedPlan {
            id: row.get(0)?,
            start_date_millis: row.get(1)?,
            baseline_weight_kg: row.get(2)?,
            daily_delta_kg: row.get(3)?,
        })
    }

    // Sets are stored as a JSON array in column 4.
    fn workout_from_row(row: &rusqlite::Row) -> rusqlite::Result<WorkoutEntry> {
        let sets_json: String = row.get(4)?;
        let sets: Vec<WorkoutSet> = serde_json::from_str(&sets_json).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?;
        Ok(WorkoutEntry {
            id: row.get(0)?,
            name: row.get(1)?,
            date_millis: row.get(2)?,
            notes: row.get(3)?,
            sets,
            updated_at: row.get(5)?,
        })
    }

    fn workout_name_from_row(row: &rusqlite::Row) -> rusqlite::Result<WorkoutName> {
        Ok(WorkoutName {
            name: row.get(0)?,
            last_used: row.get(1)?,
        })
    }

    fn escape_like(query: &str) -> String {
        let escaped = query
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        format!("%{escaped}%")
    }

    /// Resolve a full id or a unique id prefix in `table`.
    fn resolve_id(&self, table: &str, prefix: &str) -> Result<Option<String>> {
        let prefix = prefix.trim();
        if prefix.is_empty() {
            return Ok(None);
        }
        let mut stmt = self.conn.prepare(&format!(
            "SELECT id FROM {table} WHERE id = ?1 OR id LIKE ?2 ESCAPE '\\' ORDER BY id LIMIT 3"
        ))?;
        let pattern = format!(
            "{}%",
            prefix
                .replace('\\', "\\\\")
                .replace('%', "\\%")
                .replace('_', "\\_")
        );
        let ids = stmt
            .query_map(params![prefix, pattern], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        if ids.iter().any(|id| id == prefix) {
            return Ok(Some(prefix.to_string()));
        }
        match ids.as_slice() {
            [] => Ok(None),
            [id] => Ok(Some(id.clone())),
            _ => bail!("Id prefix '{prefix}' is ambiguous; use more characters"),
        }
    }

    // --- Foods ---

    /// Insert or overwrite a food keyed by its id (the name).
    pub fn upsert_food(&self, food: &Food) -> Result<Food> {
        self.conn.execute(
            "INSERT INTO foods (id, name, weight, calories, proteins, fat, carbs, last_used, price, price_grams)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                weight = excluded.weight,
                calories = excluded.calories,
                proteins = excluded.proteins,
                fat = excluded.fat,
                carbs = excluded.carbs,
                last_used = excluded.last_used,
                price = excluded.price,
                price_grams = excluded.price_grams",
            params![
                food.id,
                food.name,
                food.weight,
                food.calories,
                food.proteins,
                food.fat,
                food.carbs,
                food.last_used,
                food.price,
                food.price_grams,
            ],
        )?;
        self.get_food_by_name(&food.name)?
            .context("Food not found after upsert")
    }

    pub fn get_food_by_name(&self, name: &str) -> Result<Option<Food>> {
        let food = self
            .conn
            .query_row(
                &format!("SELECT {FOOD_COLUMNS} FROM foods WHERE name = ?1"),
                params![name],
                Self::food_from_row,
            )
            .optional()?;
        Ok(food)
    }

    /// All foods whose name equals `name` exactly.
    pub fn find_foods_by_name(&self, name: &str) -> Result<Vec<Food>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {FOOD_COLUMNS} FROM foods WHERE name = ?1 ORDER BY id"))?;
        let foods = stmt
            .query_map(params![name], Self::food_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(foods)
    }

    pub fn touch_food(&self, name: &str, now: i64) -> Result<bool> {
        let rows = self.conn.execute(
            "UPDATE foods SET last_used = ?1 WHERE name = ?2",
            params![now, name],
        )?;
        Ok(rows > 0)
    }

    pub fn delete_food(&self, name: &str) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM foods WHERE name = ?1", params![name])?;
        Ok(rows > 0)
    }

    /// Foods ordered by most recent use, optionally filtered by a name substring.
    pub fn list_foods(&self, search: Option<&str>) -> Result<Vec<Food>> {
        let foods = if let Some(query) = search {
            let mut stmt = self.conn.prepare(&format!(
                "SELECT {FOOD_COLUMNS} FROM foods WHERE name LIKE ?1 ESCAPE '\\'
                 ORDER BY last_used DESC, name"
            ))?;
            stmt.query_map(params![Self::escape_like(query)], Self::food_from_row)?
                .collect::<Result<Vec<_>, _>>()?
        } else {
            let mut stmt = self.conn.prepare(&format!(
                "SELECT {FOOD_COLUMNS} FROM foods ORDER BY last_used DESC, name"
            ))?;
            stmt.query_map([], Self::food_from_row)?
                .collect::<Result<Vec<_>, _>>()?
        };
        Ok(foods)
    }

    pub fn list_all_foods(&self) -> Result<Vec<Food>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {FOOD_COLUMNS} FROM foods ORDER BY name"))?;
        let foods = stmt
            .query_map([], Self::food_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(foods)
    }

    // --- Totals ---

    pub fn upsert_totals(&self, totals: &Totals) -> Result<()> {
        self.conn.execute(
            "INSERT INTO totals (id, name, weight, total_calories, total_proteins, total_fat, total_carbs, timestamp, included, cost)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                weight = excluded.weight,
                total_calories = excluded.total_calories,
                total_proteins = excluded.total_proteins,
                total_fat = excluded.total_fat,
                total_carbs = excluded.total_carbs,
                timestamp = excluded.timestamp,
                included = excluded.included,
                cost = excluded.cost",
            params![
                totals.id,
                totals.name,
                totals.weight,
                totals.total_calories,
                totals.total_proteins,
                totals.total_fat,
                totals.total_carbs,
                totals.timestamp,
                totals.included,
                totals.cost,
            ],
        )?;
        Ok(())
    }

    pub fn get_totals(&self, id: &str) -> Result<Option<Totals>> {
        let totals = self
            .conn
            .query_row(
                &format!("SELECT {TOTALS_COLUMNS} FROM totals WHERE id = ?1"),
                params![id],
                Self::totals_from_row,
            )
            .optional()?;
        Ok(totals)
    }

    pub fn resolve_totals_id(&self, prefix: &str) -> Result<Option<String>> {
        self.resolve_id("totals", prefix)
    }

    /// Entries with `start <= timestamp < end`, in log order.
    pub fn list_totals_between(&self, start: i64, end: i64) -> Result<Vec<Totals>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TOTALS_COLUMNS} FROM totals
             WHERE timestamp >= ?1 AND timestamp < ?2
             ORDER BY timestamp, rowid"
        ))?;
        let entries = stmt
            .query_map(params![start, end], Self::totals_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Included entries with `start <= timestamp < end`.
    pub fn list_included_totals_between(&self, start: i64, end: i64) -> Result<Vec<Totals>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TOTALS_COLUMNS} FROM totals
             WHERE timestamp >= ?1 AND timestamp < ?2 AND included = 1
             ORDER BY timestamp, rowid"
        ))?;
        let entries = stmt
            .query_map(params![start, end], Self::totals_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    pub fn set_totals_included(&self, id: &str, included: bool) -> Result<bool> {
        let rows = self.conn.execute(
            "UPDATE totals SET included = ?1 WHERE id = ?2",
            params![included, id],
        )?;
        Ok(rows > 0)
    }

    pub fn delete_totals(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM totals WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    pub fn delete_totals_between(&self, start: i64, end: i64) -> Result<usize> {
        let rows = self.conn.execute(
            "DELETE FROM totals WHERE timestamp >= ?1 AND timestamp < ?2",
            params![start, end],
        )?;
        Ok(rows)
    }

    pub fn list_all_totals(&self) -> Result<Vec<Totals>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TOTALS_COLUMNS} FROM totals ORDER BY timestamp, rowid"
        ))?;
        let entries = stmt
            .query_map([], Self::totals_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    // --- Weight ---

    /// Record the weight for the day starting at `timestamp`, replacing any
    /// earlier value for that day but keeping its id.
    pub fn upsert_weight(&self, id: &str, timestamp: i64, weight_kg: f64) -> Result<WeightEntry> {
        self.conn.execute(
            "INSERT INTO weight_entries (id, timestamp, weight_kg)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(timestamp) DO UPDATE SET weight_kg = excluded.weight_kg",
            params![id, timestamp, weight_kg],
        )?;
        self.get_weight(timestamp)?
            .context("Weight entry not found after upsert")
    }

    /// Write a weight entry as-is, replacing whatever shares its id or day.
    pub fn replace_weight_entry(&self, entry: &WeightEntry) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO weight_entries (id, timestamp, weight_kg) VALUES (?1, ?2, ?3)",
            params![entry.id, entry.timestamp, entry.weight_kg],
        )?;
        Ok(())
    }

    pub fn get_weight(&self, timestamp: i64) -> Result<Option<WeightEntry>> {
        let entry = self
            .conn
            .query_row(
                "SELECT id, timestamp, weight_kg FROM weight_entries WHERE timestamp = ?1",
                params![timestamp],
                Self::weight_entry_from_row,
            )
            .optional()?;
        Ok(entry)
    }

    /// All weight entries, oldest first.
    pub fn list_weights(&self) -> Result<Vec<WeightEntry>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, timestamp, weight_kg FROM weight_entries ORDER BY timestamp")?;
        let entries = stmt
            .query_map([], Self::weight_entry_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    pub fn delete_weight(&self, timestamp: i64) -> Result<bool> {
        let rows = self.conn.execute(
            "DELETE FROM weight_entries WHERE timestamp = ?1",
            params![timestamp],
        )?;
        Ok(rows > 0)
    }

    // --- Expected plan ---

    /// Replace the plan. Delete and insert run in one transaction.
    pub fn set_expected_plan(&self, plan: &ExpectedPlan) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM expected_plan", [])?;
        tx.execute(
            "INSERT INTO expected_plan (id, start_date_millis, baseline_weight_kg, daily_delta_kg)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                EXPECTED_PLAN_ID,
                plan.start_date_millis,
                plan.baseline_weight_kg,
                plan.daily_delta_kg,
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    pub fn get_expected_plan(&self) -> Result<Option<ExpectedPlan>> {
        let plan = self
            .conn
            .query_row(
                "SELECT id, start_date_millis, baseline_weight_kg, daily_delta_kg
                 FROM expected_plan WHERE id = ?1",
                params![EXPECTED_PLAN_ID],
                Self::plan_from_row,
            )
            .optional()?;
        Ok(plan)
    }

    pub fn clear_expected_plan(&self) -> Result<bool> {
        let rows = self.conn.execute("DELETE FROM expected_plan", [])?;
        Ok(rows > 0)
    }

    // --- Workouts ---

    pub fn upsert_workout(&self, entry: &WorkoutEntry) -> Result<()> {
        let sets = serde_json::to_string(&entry.sets).context("Failed to encode workout sets")?;
        self.conn.execute(
            "INSERT INTO workout_entries (id, name, date_millis, notes, sets, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                date_millis = excluded.date_millis,
                notes = excluded.notes,
                sets = excluded.sets,
                updated_at = excluded.updated_at",
            params![
                entry.id,
                entry.name,
                entry.date_millis,
                entry.notes,
                sets,
                entry.updated_at,
            ],
        )?;
        Ok(())
    }

    pub fn get_workout(&self, id: &str) -> Result<Option<WorkoutEntry>> {
        let entry = self
            .conn
            .query_row(
                &format!("SELECT {WORKOUT_COLUMNS} FROM workout_entries WHERE id = ?1"),
                params![id],
                Self::workout_from_row,
            )
            .optional()?;
        Ok(entry)
    }

    pub fn resolve_workout_id(&self, prefix: &str) -> Result<Option<String>> {
        self.resolve_id("workout_entries", prefix)
    }

    pub fn delete_workout(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM workout_entries WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    /// Workouts newest first by day, then by last edit.
    pub fn list_workouts(&self) -> Result<Vec<WorkoutEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {WORKOUT_COLUMNS} FROM workout_entries
             ORDER BY date_millis DESC, updated_at DESC"
        ))?;
        let entries = stmt
            .query_map([], Self::workout_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    pub fn upsert_workout_name(&self, name: &str, last_used: i64) -> Result<()> {
        self.conn.execute(
            "INSERT INTO workout_names (name, last_used) VALUES (?1, ?2)
             ON CONFLICT(name) DO UPDATE SET last_used = excluded.last_used",
            params![name, last_used],
        )?;
        Ok(())
    }

    pub fn delete_workout_name(&self, name: &str) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM workout_names WHERE name = ?1", params![name])?;
        Ok(rows > 0)
    }

    pub fn list_workout_names(&self) -> Result<Vec<WorkoutName>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, last_used FROM workout_names ORDER BY last_used DESC, name")?;
        let names = stmt
            .query_map([], Self::workout_name_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_food(name: &str, last_used: i64) -> Food {
        Food {
            id: name.to_string(),
            name: name.to_string(),
            weight: 150.0,
            calories: 165.0,
            proteins: 31.0,
            fat: 3.6,
            carbs: 0.0,
            last_used,
            price: Some(9.99),
            price_grams: Some(1000.0),
        }
    }

    fn sample_totals(id: &str, timestamp: i64, included: bool) -> Totals {
        Totals {
            id: id.to_string(),
            name: "Chicken Breast".to_string(),
            weight: 200.0,
            total_calories: 330.0,
            total_proteins: 62.0,
            total_fat: 7.2,
            total_carbs: 0.0,
            timestamp,
            included,
            cost: 2.0,
        }
    }

    #[test]
    fn test_upsert_and_get_food() {
        let db = Database::open_in_memory().unwrap();
        let food = db.upsert_food(&sample_food("Chicken Breast", 1)).unwrap();

        assert_eq!(food.id, "Chicken Breast");
        assert_eq!(food.calories, 165.0);
        assert_eq!(food.price, Some(9.99));

        let fetched = db.get_food_by_name("Chicken Breast").unwrap().unwrap();
        assert_eq!(fetched, food);
        assert!(db.get_food_by_name("Tofu").unwrap().is_none());
    }

    #[test]
    fn test_upsert_food_overwrites_by_name() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_food(&sample_food("Oats", 1)).unwrap();
        let mut updated = sample_food("Oats", 2);
        updated.calories = 389.0;
        updated.price = None;
        db.upsert_food(&updated).unwrap();

        let all = db.list_all_foods().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].calories, 389.0);
        assert!(all[0].price.is_none());
        assert_eq!(all[0].last_used, 2);
    }

    #[test]
    fn test_touch_and_delete_food() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_food(&sample_food("Apple", 1)).unwrap();

        assert!(db.touch_food("Apple", 500).unwrap());
        assert_eq!(db.get_food_by_name("Apple").unwrap().unwrap().last_used, 500);
        assert!(!db.touch_food("Pear", 500).unwrap());

        assert!(db.delete_food("Apple").unwrap());
        assert!(!db.delete_food("Apple").unwrap());
        assert!(db.find_foods_by_name("Apple").unwrap().is_empty());
    }

    #[test]
    fn test_list_foods_recent_first_with_search() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_food(&sample_food("Brown Rice", 10)).unwrap();
        db.upsert_food(&sample_food("White Rice", 30)).unwrap();
        db.upsert_food(&sample_food("100% Juice", 20)).unwrap();

        let all = db.list_foods(None).unwrap();
        let names: Vec<&str> = all.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["White Rice", "100% Juice", "Brown Rice"]);

        let rice = db.list_foods(Some("rice")).unwrap();
        assert_eq!(rice.len(), 2);

        // % is matched literally
        let pct = db.list_foods(Some("%")).unwrap();
        assert_eq!(pct.len(), 1);
        assert_eq!(pct[0].name, "100% Juice");
    }

    #[test]
    fn test_totals_range_is_half_open_and_ordered() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_totals(&sample_totals("b", 1_000, true)).unwrap();
        db.upsert_totals(&sample_totals("a", 1_000, false)).unwrap();
        db.upsert_totals(&sample_totals("c", 500, true)).unwrap();
        db.upsert_totals(&sample_totals("d", 2_000, true)).unwrap();

        let entries = db.list_totals_between(500, 2_000).unwrap();
        let ids: Vec<&str> = entries.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);

        let included = db.list_included_totals_between(500, 2_000).unwrap();
        assert_eq!(included.len(), 2);
        assert!(included.iter().all(|t| t.included));
    }

    #[test]
    fn test_set_included_and_delete_totals() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_totals(&sample_totals("abc", 0, true)).unwrap();

        assert!(db.set_totals_included("abc", false).unwrap());
        let t = db.get_totals("abc").unwrap().unwrap();
        assert!(!t.included);
        assert_eq!(t.total_calories, 330.0);

        assert!(!db.set_totals_included("missing", true).unwrap());
        assert!(db.delete_totals("abc").unwrap());
        assert!(db.get_totals("abc").unwrap().is_none());
    }

    #[test]
    fn test_delete_totals_between() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_totals(&sample_totals("a", 10, true)).unwrap();
        db.upsert_totals(&sample_totals("b", 20, true)).unwrap();
        db.upsert_totals(&sample_totals("c", 30, true)).unwrap();

        assert_eq!(db.delete_totals_between(10, 30).unwrap(), 2);
        assert_eq!(db.list_all_totals().unwrap().len(), 1);
    }

    #[test]
    fn test_resolve_totals_id_prefix() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_totals(&sample_totals("abc123", 0, true)).unwrap();
        db.upsert_totals(&sample_totals("abd456", 0, true)).unwrap();

        assert_eq!(db.resolve_totals_id("abc").unwrap().as_deref(), Some("abc123"));
        assert_eq!(db.resolve_totals_id("abd456").unwrap().as_deref(), Some("abd456"));
        assert!(db.resolve_totals_id("zzz").unwrap().is_none());
        assert!(db.resolve_totals_id("").unwrap().is_none());
        assert!(db.resolve_totals_id("ab").is_err());
    }

    #[test]
    fn test_upsert_weight_by_day() {
        let db = Database::open_in_memory().unwrap();
        let first = db.upsert_weight("w1", 86_400_000, 80.0).unwrap();
        let second = db.upsert_weight("w2", 86_400_000, 79.5).unwrap();

        assert_eq!(first.id, "w1");
        assert_eq!(second.id, "w1");
        assert_eq!(second.weight_kg, 79.5);
        assert_eq!(db.list_weights().unwrap().len(), 1);
    }

    #[test]
    fn test_list_and_delete_weights() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_weight("b", 200, 81.0).unwrap();
        db.upsert_weight("a", 100, 82.0).unwrap();

        let all = db.list_weights().unwrap();
        assert_eq!(all[0].timestamp, 100);
        assert_eq!(all[1].timestamp, 200);

        assert!(db.delete_weight(100).unwrap());
        assert!(!db.delete_weight(100).unwrap());
        assert!(db.get_weight(100).unwrap().is_none());
    }

    #[test]
    fn test_replace_weight_entry() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_weight("old", 100, 82.0).unwrap();
        db.replace_weight_entry(&WeightEntry {
            id: "new".to_string(),
            timestamp: 100,
            weight_kg: 81.0,
        })
        .unwrap();

        let all = db.list_weights().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, "new");
    }

    #[test]
    fn test_expected_plan_singleton() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.get_expected_plan().unwrap().is_none());

        let plan = ExpectedPlan {
            id: "ignored".to_string(),
            start_date_millis: 100,
            baseline_weight_kg: 90.0,
            daily_delta_kg: -0.1,
        };
        db.set_expected_plan(&plan).unwrap();
        db.set_expected_plan(&ExpectedPlan {
            start_date_millis: 200,
            ..plan
        })
        .unwrap();

        let stored = db.get_expected_plan().unwrap().unwrap();
        assert_eq!(stored.id, EXPECTED_PLAN_ID);
        assert_eq!(stored.start_date_millis, 200);

        assert!(db.clear_expected_plan().unwrap());
        assert!(db.get_expected_plan().unwrap().is_none());
        assert!(!db.clear_expected_plan().unwrap());
    }

    #[test]
    fn test_workout_round_trip_and_order() {
        let db = Database::open_in_memory().unwrap();
        let squat = WorkoutEntry {
            id: "w1".to_string(),
            name: "Squat".to_string(),
            date_millis: 1_000,
            notes: "felt heavy".to_string(),
            sets: vec![
                WorkoutSet {
                    weight_kg: 100.0,
                    reps: 5,
                    rest: "3min".to_string(),
                },
                WorkoutSet {
                    weight_kg: 0.0,
                    reps: 10,
                    rest: String::new(),
                },
            ],
            updated_at: 5,
        };
        db.upsert_workout(&squat).unwrap();
        db.upsert_workout(&WorkoutEntry {
            id: "w2".to_string(),
            date_millis: 2_000,
            sets: Vec::new(),
            ..squat.clone()
        })
        .unwrap();
        db.upsert_workout(&WorkoutEntry {
            id: "w3".to_string(),
            updated_at: 9,
            ..squat.clone()
        })
        .unwrap();

        let fetched = db.get_workout("w1").unwrap().unwrap();
        assert_eq!(fetched, squat);

        let ids: Vec<String> = db.list_workouts().unwrap().into_iter().map(|w| w.id).collect();
        assert_eq!(ids, vec!["w2", "w3", "w1"]);

        assert!(db.delete_workout("w1").unwrap());
        assert!(db.get_workout("w1").unwrap().is_none());
    }

    #[test]
    fn test_workout_names() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_workout_name("Bench Press", 1).unwrap();
        db.upsert_workout_name("Deadlift", 2).unwrap();
        db.upsert_workout_name("Bench Press", 3).unwrap();

        let names = db.list_workout_names().unwrap();
        assert_eq!(names.len(), 2);
        assert_eq!(names[0].name, "Bench Press");
        assert_eq!(names[0].last_used, 3);

        assert!(db.delete_workout_name("Deadlift").unwrap());
        assert_eq!(db.list_workout_names().unwrap().len(), 1);
    }

    #[test]
    fn test_migrations_are_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("macrolog.db");
        {
            let db = Database::open(&path).unwrap();
            db.upsert_food(&sample_food("Apple", 1)).unwrap();
        }
        let db = Database::open(&path).unwrap();
        assert_eq!(db.list_all_foods().unwrap().len(), 1);
    }
}
