//! Per-entry scaling and per-day roll-up of logged meals.

use crate::format::round2;
use crate::models::{DailyTotals, Food, Totals};

/// Absolute macros for `weight_g` grams of a per-100 g profile.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScaledMacros {
    pub calories: f64,
    pub proteins: f64,
    pub fat: f64,
    pub carbs: f64,
}

impl ScaledMacros {
    #[must_use]
    pub fn of(food: &Food, weight_g: f64) -> Self {
        let factor = weight_g / 100.0;
        Self {
            calories: food.calories * factor,
            proteins: food.proteins * factor,
            fat: food.fat * factor,
            carbs: food.carbs * factor,
        }
    }

    fn add(self, other: Self) -> Self {
        Self {
            calories: self.calories + other.calories,
            proteins: self.proteins + other.proteins,
            fat: self.fat + other.fat,
            carbs: self.carbs + other.carbs,
        }
    }
}

/// Cost of `weight_g` grams, rounded to cents. Free foods cost 0.
#[must_use]
pub fn entry_cost(food: &Food, weight_g: f64) -> f64 {
    food.price_per_gram()
        .map_or(0.0, |per_gram| round2(per_gram * weight_g))
}

/// Sum macros and cost over the included entries only.
#[must_use]
pub fn aggregate<'a, I>(entries: I) -> DailyTotals
where
    I: IntoIterator<Item = &'a Totals>,
{
    entries
        .into_iter()
        .filter(|t| t.included)
        .fold(DailyTotals::default(), |acc, t| DailyTotals {
            calories: acc.calories + t.total_calories,
            proteins: acc.proteins + t.total_proteins,
            fat: acc.fat + t.total_fat,
            carbs: acc.carbs + t.total_carbs,
            cost: acc.cost + t.cost,
        })
}

/// Rebuild an entry for a new weight from the live food definitions.
///
/// Every food in `matching` contributes to the macros (they all share the
/// entry's name). Cost comes from the first one with a usable price.
#[must_use]
pub fn recompute_for_weight(entry: &Totals, matching: &[Food], new_weight_g: f64) -> Totals {
    let macros = matching
        .iter()
        .map(|f| ScaledMacros::of(f, new_weight_g))
        .fold(ScaledMacros::default(), ScaledMacros::add);
    let cost = matching
        .iter()
        .find(|f| f.price_per_gram().is_some())
        .map_or(0.0, |f| entry_cost(f, new_weight_g));

    Totals {
        weight: new_weight_g,
        total_calories: macros.calories,
        total_proteins: macros.proteins,
        total_fat: macros.fat,
        total_carbs: macros.carbs,
        cost,
        ..entry.clone()
    }
}
