//! Linear weight projection.
//!
//! Two lines are projected from the same slope: the planned line starts at
//! the plan's start date, the adjusted line restarts at the latest
//! weigh-in. Both are pure functions of the history and the plan.

use std::collections::BTreeMap;

use chrono::{Months, NaiveDate};
use serde::Serialize;

use crate::calendar::millis_to_date;
use crate::models::{ExpectedPlan, WeightEntry};

/// Recorded weights keyed by calendar date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeightHistory {
    by_date: BTreeMap<NaiveDate, f64>,
}

impl WeightHistory {
    /// Build from stored entries. A later entry for the same date wins.
    #[must_use]
    pub fn from_entries(entries: &[WeightEntry]) -> Self {
        let mut history = Self::default();
        for e in entries {
            history.insert(millis_to_date(e.timestamp), e.weight_kg);
        }
        history
    }

    pub fn insert(&mut self, date: NaiveDate, weight_kg: f64) {
        self.by_date.insert(date, weight_kg);
    }

    #[must_use]
    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.by_date.get(&date).copied()
    }

    #[must_use]
    pub fn latest(&self) -> Option<(NaiveDate, f64)> {
        self.by_date.last_key_value().map(|(d, w)| (*d, *w))
    }

    #[must_use]
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.by_date.keys().next().copied()
    }
}

/// A plan resolved to calendar dates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanAnchor {
    pub start: NaiveDate,
    pub baseline_kg: f64,
    pub daily_delta_kg: f64,
}

impl From<&ExpectedPlan> for PlanAnchor {
    fn from(plan: &ExpectedPlan) -> Self {
        Self {
            start: millis_to_date(plan.start_date_millis),
            baseline_kg: plan.baseline_weight_kg,
            daily_delta_kg: plan.daily_delta_kg,
        }
    }
}

/// Signed whole days from `from` to `to`.
#[must_use]
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

#[allow(clippy::cast_precision_loss)]
fn project(anchor_kg: f64, daily_delta_kg: f64, days: i64) -> f64 {
    anchor_kg + daily_delta_kg * days as f64
}

/// Weight the plan expects on `date`, or `None` before the plan starts.
///
/// The line starts from whatever is currently recorded on the start date,
/// falling back to the baseline captured when the plan was created.
#[must_use]
pub fn planned_expected(
    plan: Option<&PlanAnchor>,
    history: &WeightHistory,
    date: NaiveDate,
) -> Option<f64> {
    let plan = plan?;
    if date < plan.start {
        return None;
    }
    let baseline = history.get(plan.start).unwrap_or(plan.baseline_kg);
    Some(project(
        baseline,
        plan.daily_delta_kg,
        days_between(plan.start, date),
    ))
}

/// The plan's slope re-anchored at the most recent weigh-in.
///
/// `None` without a plan, without any weigh-in, or for dates before the
/// latest weigh-in.
#[must_use]
pub fn adjusted_expected(
    plan: Option<&PlanAnchor>,
    history: &WeightHistory,
    date: NaiveDate,
) -> Option<f64> {
    let plan = plan?;
    let (latest, weight) = history.latest()?;
    if date < latest {
        return None;
    }
    Some(project(
        weight,
        plan.daily_delta_kg,
        days_between(latest, date),
    ))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendRow {
    pub date: NaiveDate,
    pub actual_kg: Option<f64>,
    pub expected_kg: Option<f64>,
    pub adjusted_kg: Option<f64>,
}

/// One row per day in `[from, to]`.
#[must_use]
pub fn trend_rows(
    plan: Option<&PlanAnchor>,
    history: &WeightHistory,
    from: NaiveDate,
    to: NaiveDate,
) -> Vec<TrendRow> {
    from.iter_days()
        .take_while(|d| *d <= to)
        .map(|date| TrendRow {
            date,
            actual_kg: history.get(date),
            expected_kg: planned_expected(plan, history, date),
            adjusted_kg: adjusted_expected(plan, history, date),
        })
        .collect()
}

/// First weigh-in (or today) through twelve months after today.
#[must_use]
pub fn default_trend_range(history: &WeightHistory, today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let from = history.first_date().unwrap_or(today);
    let to = today.checked_add_months(Months::new(12)).unwrap_or(today);
    (from, to)
}
