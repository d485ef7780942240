//! Numeric policy shared by storage, aggregation and display: cent
//! rounding, compact number formatting and lenient decimal input.

use crate::models::WorkoutSet;

/// Round half up to two decimals.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0 + 0.5).floor() / 100.0
}

/// Whole numbers without a fraction, everything else with one decimal
/// rounded half up.
#[must_use]
pub fn format_decimal(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        let rounded = value.signum() * ((value.abs() * 10.0) + 0.5).floor() / 10.0;
        format!("{rounded:.1}")
    }
}

/// Money with exactly two decimals.
#[must_use]
pub fn format_money2(value: f64) -> String {
    format!("{value:.2}")
}

/// Money without a fraction when whole, two decimals otherwise.
#[must_use]
pub fn format_money(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format_money2(value)
    }
}

/// Two decimals with trailing zeros and a dangling point removed.
#[must_use]
pub fn format_weight_display(value: f64) -> String {
    let text = format!("{value:.2}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// `"80kg x 5, 2min"`; zero weight, zero reps and blank rest are left out.
#[must_use]
pub fn format_workout_set(set: &WorkoutSet) -> String {
    let mut parts = Vec::new();
    if set.weight_kg > 0.0 {
        parts.push(format!("{}kg", format_weight_display(set.weight_kg)));
    }
    if set.reps > 0 {
        parts.push(format!("x {}", set.reps));
    }
    let base = parts.join(" ");
    let rest = set.rest.trim();
    match (base.is_empty(), rest.is_empty()) {
        (false, false) => format!("{base}, {rest}"),
        (false, true) => base,
        (true, _) => rest.to_string(),
    }
}

/// Parse user input that may use a decimal comma. Anything unparseable is 0.
#[must_use]
pub fn parse_decimal_or_zero(text: &str) -> f64 {
    parse_decimal(text).unwrap_or(0.0)
}

/// Parse user input that may use a decimal comma.
#[must_use]
pub fn parse_decimal(text: &str) -> Option<f64> {
    text.trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2_half_up() {
        assert!((round2(7.005) - 7.01).abs() < f64::EPSILON);
        assert!((round2(2.675) - 2.68).abs() < f64::EPSILON);
        assert!((round2(0.125) - 0.13).abs() < f64::EPSILON);
        assert!((round2(3.333) - 3.33).abs() < f64::EPSILON);
        assert!(round2(0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_format_decimal() {
        assert_eq!(format_decimal(260.0), "260");
        assert_eq!(format_decimal(5.4), "5.4");
        assert_eq!(format_decimal(0.25), "0.3");
        assert_eq!(format_decimal(0.05), "0.1");
        assert_eq!(format_decimal(12.75), "12.8");
        assert_eq!(format_decimal(-0.25), "-0.3");
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money2(7.0), "7.00");
        assert_eq!(format_money2(7.99), "7.99");
        assert_eq!(format_money(8.0), "8");
        assert_eq!(format_money(0.5), "0.50");
    }

    #[test]
    fn test_format_weight_display() {
        assert_eq!(format_weight_display(80.0), "80");
        assert_eq!(format_weight_display(72.5), "72.5");
        assert_eq!(format_weight_display(72.25), "72.25");
    }

    #[test]
    fn test_format_workout_set() {
        let full = WorkoutSet {
            weight_kg: 80.0,
            reps: 5,
            rest: "2min".to_string(),
        };
        assert_eq!(format_workout_set(&full), "80kg x 5, 2min");

        let bodyweight = WorkoutSet {
            weight_kg: 0.0,
            reps: 12,
            rest: String::new(),
        };
        assert_eq!(format_workout_set(&bodyweight), "x 12");

        let rest_only = WorkoutSet {
            weight_kg: 0.0,
            reps: 0,
            rest: " 90s ".to_string(),
        };
        assert_eq!(format_workout_set(&rest_only), "90s");

        assert_eq!(format_workout_set(&WorkoutSet::default()), "");
    }

    #[test]
    fn test_parse_decimal_or_zero() {
        assert!((parse_decimal_or_zero("72,5") - 72.5).abs() < f64::EPSILON);
        assert!((parse_decimal_or_zero(" 80 ") - 80.0).abs() < f64::EPSILON);
        assert!(parse_decimal_or_zero("abc").abs() < f64::EPSILON);
        assert!(parse_decimal_or_zero("").abs() < f64::EPSILON);
        assert!(parse_decimal_or_zero("NaN").abs() < f64::EPSILON);
    }
}
