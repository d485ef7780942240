use anyhow::{Result, bail};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Fixed key of the single expected-weight plan row.
pub const EXPECTED_PLAN_ID: &str = "expected_plan_singleton";

/// A reusable food definition. Macro values are per 100 g.
///
/// The id is the name itself, so saving a food with an existing name
/// overwrites that definition in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Food {
    pub id: String,
    pub name: String,
    /// Last entered serving in grams, only used to prefill the next log.
    pub weight: f64,
    pub calories: f64,
    pub proteins: f64,
    pub fat: f64,
    pub carbs: f64,
    pub last_used: i64,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub price_grams: Option<f64>,
}

impl Food {
    /// Cost of one gram, or `None` when the food has no usable price.
    #[must_use]
    pub fn price_per_gram(&self) -> Option<f64> {
        match (self.price, self.price_grams) {
            (Some(price), Some(grams)) if grams > 0.0 => Some(price / grams),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewFood {
    pub name: String,
    pub weight: f64,
    pub calories: f64,
    pub proteins: f64,
    pub fat: f64,
    pub carbs: f64,
    pub price: Option<f64>,
    pub price_grams: Option<f64>,
}

/// One logged meal entry with absolute (already scaled) values.
///
/// `name` is a snapshot of the food name at log time, not a reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub id: String,
    pub name: String,
    pub weight: f64,
    pub total_calories: f64,
    pub total_proteins: f64,
    pub total_fat: f64,
    pub total_carbs: f64,
    pub timestamp: i64,
    #[serde(default = "default_included")]
    pub included: bool,
    #[serde(default)]
    pub cost: f64,
}

fn default_included() -> bool {
    true
}

/// Sum of the included entries of one day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DailyTotals {
    pub calories: f64,
    pub proteins: f64,
    pub fat: f64,
    pub carbs: f64,
    pub cost: f64,
}

/// Aggregate for one calendar day, as shown in the history view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayTotals {
    pub date: NaiveDate,
    pub entries: usize,
    #[serde(flatten)]
    pub totals: DailyTotals,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightEntry {
    pub id: String,
    /// Start of the local calendar day, epoch millis.
    pub timestamp: i64,
    pub weight_kg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpectedPlan {
    pub id: String,
    pub start_date_millis: i64,
    pub baseline_weight_kg: f64,
    /// Signed kg per day; negative for a cut.
    pub daily_delta_kg: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSet {
    pub weight_kg: f64,
    pub reps: u32,
    #[serde(default)]
    pub rest: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutEntry {
    pub id: String,
    pub name: String,
    pub date_millis: i64,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub sets: Vec<WorkoutSet>,
    pub updated_at: i64,
}

/// User input for creating or replacing a workout entry.
#[derive(Debug, Clone, Default)]
pub struct WorkoutDraft {
    pub name: String,
    pub date: NaiveDate,
    pub notes: String,
    pub sets: Vec<WorkoutSet>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutName {
    pub name: String,
    pub last_used: i64,
}

/// Nutrition values gathered from an external source (barcode lookup or a
/// pasted JSON object) before they become a food.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionPrefill {
    pub name: String,
    pub weight: Option<f64>,
    pub calories: f64,
    pub proteins: f64,
    pub fat: f64,
    pub carbs: f64,
}

impl NutritionPrefill {
    /// Serving used when the source does not say how much was eaten.
    pub const DEFAULT_WEIGHT_G: f64 = 100.0;

    #[must_use]
    pub fn into_new_food(self) -> NewFood {
        NewFood {
            weight: self.weight.unwrap_or(Self::DEFAULT_WEIGHT_G),
            name: self.name,
            calories: self.calories,
            proteins: self.proteins,
            fat: self.fat,
            carbs: self.carbs,
            price: None,
            price_grams: None,
        }
    }
}

// --- Validation ---

fn check_non_negative(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        bail!("{field} must be a non-negative number, got {value}");
    }
    Ok(())
}

pub fn validate_new_food(food: &NewFood) -> Result<()> {
    if food.name.trim().is_empty() {
        bail!("Food name cannot be empty");
    }
    check_non_negative("weight", food.weight)?;
    check_non_negative("calories", food.calories)?;
    check_non_negative("proteins", food.proteins)?;
    check_non_negative("fat", food.fat)?;
    check_non_negative("carbs", food.carbs)?;
    if let Some(price) = food.price {
        check_non_negative("price", price)?;
    }
    if let Some(grams) = food.price_grams {
        check_non_negative("price grams", grams)?;
    }
    Ok(())
}

pub fn validate_weight_kg(weight_kg: f64) -> Result<()> {
    check_non_negative("weight", weight_kg)
}

pub fn validate_workout_sets(sets: &[WorkoutSet]) -> Result<()> {
    for set in sets {
        check_non_negative("set weight", set.weight_kg)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rice() -> Food {
        Food {
            id: "Rice".to_string(),
            name: "Rice".to_string(),
            weight: 200.0,
            calories: 130.0,
            proteins: 2.7,
            fat: 0.3,
            carbs: 28.0,
            last_used: 0,
            price: Some(2.5),
            price_grams: Some(1000.0),
        }
    }

    #[test]
    fn test_price_per_gram() {
        let food = rice();
        assert!((food.price_per_gram().unwrap() - 0.0025).abs() < f64::EPSILON);
    }

    #[test]
    fn test_price_per_gram_free_food() {
        let mut food = rice();
        food.price_grams = Some(0.0);
        assert!(food.price_per_gram().is_none());

        food.price_grams = None;
        assert!(food.price_per_gram().is_none());

        let mut food = rice();
        food.price = None;
        assert!(food.price_per_gram().is_none());
    }

    #[test]
    fn test_validate_new_food() {
        let food = NewFood {
            name: "Oats".to_string(),
            weight: 50.0,
            calories: 389.0,
            ..NewFood::default()
        };
        assert!(validate_new_food(&food).is_ok());

        let blank = NewFood {
            name: "   ".to_string(),
            ..food.clone()
        };
        assert!(validate_new_food(&blank).is_err());

        let negative = NewFood {
            fat: -1.0,
            ..food.clone()
        };
        assert!(validate_new_food(&negative).is_err());

        let nan_price = NewFood {
            price: Some(f64::NAN),
            ..food
        };
        assert!(validate_new_food(&nan_price).is_err());
    }

    #[test]
    fn test_validate_weight_and_sets() {
        assert!(validate_weight_kg(80.5).is_ok());
        assert!(validate_weight_kg(-0.1).is_err());
        assert!(validate_weight_kg(f64::INFINITY).is_err());

        let sets = vec![WorkoutSet {
            weight_kg: -5.0,
            reps: 5,
            rest: String::new(),
        }];
        assert!(validate_workout_sets(&sets).is_err());
    }

    #[test]
    fn test_totals_json_field_names() {
        let totals = Totals {
            id: "abc".to_string(),
            name: "Rice".to_string(),
            weight: 200.0,
            total_calories: 260.0,
            total_proteins: 5.4,
            total_fat: 0.6,
            total_carbs: 56.0,
            timestamp: 1_700_000_000_000,
            included: true,
            cost: 0.5,
        };
        let json = serde_json::to_value(&totals).unwrap();
        assert_eq!(json["totalCalories"], 260.0);
        assert_eq!(json["timestamp"], 1_700_000_000_000_i64);
        assert!(json.get("total_calories").is_none());
    }

    #[test]
    fn test_totals_defaults_when_fields_missing() {
        let json = r#"{
            "id": "x", "name": "Apple", "weight": 150.0,
            "totalCalories": 78.0, "totalProteins": 0.4,
            "totalFat": 0.3, "totalCarbs": 21.0, "timestamp": 0
        }"#;
        let totals: Totals = serde_json::from_str(json).unwrap();
        assert!(totals.included);
        assert!(totals.cost.abs() < f64::EPSILON);
    }

    #[test]
    fn test_prefill_defaults_weight() {
        let prefill = NutritionPrefill {
            name: "Yogurt".to_string(),
            weight: None,
            calories: 59.0,
            ..NutritionPrefill::default()
        };
        let food = prefill.into_new_food();
        assert!((food.weight - 100.0).abs() < f64::EPSILON);
        assert_eq!(food.name, "Yogurt");
        assert!(food.price.is_none());
    }
}
