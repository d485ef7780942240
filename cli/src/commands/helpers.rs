use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::process;

use macrolog_core::format::{format_decimal, parse_decimal};
use macrolog_core::models::WorkoutSet;
use macrolog_core::service::TrackerService;

pub(crate) fn parse_date(date_str: Option<String>) -> Result<NaiveDate> {
    match date_str {
        None => Ok(Local::now().date_naive()),
        Some(s) => match s.as_str() {
            "today" => Ok(Local::now().date_naive()),
            "yesterday" => Ok(Local::now().date_naive() - chrono::Duration::days(1)),
            "tomorrow" => Ok(Local::now().date_naive() + chrono::Duration::days(1)),
            _ => NaiveDate::parse_from_str(&s, "%Y-%m-%d").with_context(|| {
                format!("Invalid date '{s}'. Use YYYY-MM-DD or today/yesterday/tomorrow")
            }),
        },
    }
}

/// clap value parser for numbers typed with either decimal separator.
pub(crate) fn parse_number(s: &str) -> Result<f64, String> {
    parse_decimal(s).ok_or_else(|| format!("'{s}' is not a number"))
}

/// Parse one set written as `[weight[kg]][x reps][@rest]`, e.g. `80x5@90s`,
/// `82,5kg x 3`, `x12` or `60@2min`.
pub(crate) fn parse_set(s: &str) -> Result<WorkoutSet> {
    let (load, rest) = match s.split_once('@') {
        Some((load, rest)) => (load, rest.trim().to_string()),
        None => (s, String::new()),
    };
    let load = load.trim().to_lowercase();
    let (weight_part, reps_part) = match load.split_once('x') {
        Some((w, r)) => (w.trim(), Some(r.trim())),
        None => (load.as_str(), None),
    };

    let weight_text = weight_part.trim_end_matches("kg").trim();
    let weight_kg = if weight_text.is_empty() {
        0.0
    } else {
        parse_decimal(weight_text)
            .with_context(|| format!("Invalid set weight '{weight_part}' in '{s}'"))?
    };
    if weight_kg < 0.0 {
        bail!("Set weight cannot be negative in '{s}'");
    }

    let reps = match reps_part {
        Some(r) if !r.is_empty() => r
            .parse::<u32>()
            .with_context(|| format!("Invalid rep count '{r}' in '{s}'"))?,
        _ => 0,
    };

    if weight_kg == 0.0 && reps == 0 && rest.is_empty() {
        bail!("Empty set '{s}'. Use a form like '80x5@90s'");
    }
    Ok(WorkoutSet {
        weight_kg,
        reps,
        rest,
    })
}

/// Resolve a full or abbreviated id, exiting with status 2 when nothing
/// matches.
pub(crate) fn resolve_or_exit(
    resolved: Option<String>,
    kind: &str,
    prefix: &str,
    json: bool,
) -> String {
    if let Some(id) = resolved {
        return id;
    }
    let message = format!("{kind} {prefix} not found");
    if json {
        println!("{}", json_error(&message));
    } else {
        eprintln!("{message}");
    }
    process::exit(2);
}

pub(crate) fn resolve_entry_id(svc: &TrackerService, prefix: &str, json: bool) -> Result<String> {
    Ok(resolve_or_exit(
        svc.resolve_totals_id(prefix)?,
        "Entry",
        prefix,
        json,
    ))
}

pub(crate) fn resolve_workout_id(svc: &TrackerService, prefix: &str, json: bool) -> Result<String> {
    Ok(resolve_or_exit(
        svc.resolve_workout_id(prefix)?,
        "Workout",
        prefix,
        json,
    ))
}

/// First eight characters of a uuid, enough to type back in.
pub(crate) fn short_id(id: &str) -> &str {
    id.char_indices().nth(8).map_or(id, |(i, _)| &id[..i])
}

pub(crate) fn json_error(message: &str) -> String {
    #[derive(Serialize)]
    struct CliError<'a> {
        error: &'a str,
    }
    serde_json::to_string(&CliError { error: message })
        .unwrap_or_else(|_| format!("{{\"error\":\"{message}\"}}"))
}

pub(crate) fn no_neg_zero(v: f64) -> f64 {
    if v == 0.0 { 0.0 } else { v }
}

/// `"260 kcal | P:5.4g C:30g F:1.2g"`
pub(crate) fn macro_line(calories: f64, proteins: f64, carbs: f64, fat: f64) -> String {
    format!(
        "{} kcal | P:{}g C:{}g F:{}g",
        format_decimal(no_neg_zero(calories)),
        format_decimal(no_neg_zero(proteins)),
        format_decimal(no_neg_zero(carbs)),
        format_decimal(no_neg_zero(fat))
    )
}

/// Shortest query, in characters, worth running a name suggestion for.
pub(crate) const MIN_SUGGEST_QUERY_CHARS: usize = 2;

pub(crate) fn suggest_query_ready(query: &str) -> bool {
    query.trim().chars().count() >= MIN_SUGGEST_QUERY_CHARS
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let end = s.char_indices().nth(max - 3).map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_none() {
        let today = Local::now().date_naive();
        assert_eq!(parse_date(None).unwrap(), today);
    }

    #[test]
    fn test_parse_date_keywords() {
        let today = Local::now().date_naive();
        assert_eq!(parse_date(Some("today".to_string())).unwrap(), today);
        assert_eq!(
            parse_date(Some("yesterday".to_string())).unwrap(),
            today - chrono::Duration::days(1)
        );
        assert_eq!(
            parse_date(Some("tomorrow".to_string())).unwrap(),
            today + chrono::Duration::days(1)
        );
    }

    #[test]
    fn test_parse_date_iso() {
        let date = parse_date(Some("2024-01-15".to_string())).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    }

    #[test]
    fn test_parse_date_invalid() {
        assert!(parse_date(Some("nope".to_string())).is_err());
    }

    #[test]
    fn test_parse_number_accepts_comma() {
        assert!((parse_number("82,5").unwrap() - 82.5).abs() < f64::EPSILON);
        assert!((parse_number("-0.1").unwrap() + 0.1).abs() < f64::EPSILON);
        assert!(parse_number("abc").is_err());
    }

    #[test]
    fn test_parse_set_full() {
        let set = parse_set("80x5@90s").unwrap();
        assert!((set.weight_kg - 80.0).abs() < f64::EPSILON);
        assert_eq!(set.reps, 5);
        assert_eq!(set.rest, "90s");
    }

    #[test]
    fn test_parse_set_partial_forms() {
        let set = parse_set("82,5kg x 3").unwrap();
        assert!((set.weight_kg - 82.5).abs() < f64::EPSILON);
        assert_eq!(set.reps, 3);
        assert!(set.rest.is_empty());

        let bodyweight = parse_set("x12").unwrap();
        assert!(bodyweight.weight_kg.abs() < f64::EPSILON);
        assert_eq!(bodyweight.reps, 12);

        let hold = parse_set("60@2min").unwrap();
        assert_eq!(hold.reps, 0);
        assert_eq!(hold.rest, "2min");
    }

    #[test]
    fn test_parse_set_invalid() {
        assert!(parse_set("").is_err());
        assert!(parse_set("heavy x 5").is_err());
        assert!(parse_set("80 x many").is_err());
        assert!(parse_set("-20x5").is_err());
    }

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("0f8c2a1e-1111-2222"), "0f8c2a1e");
        assert_eq!(short_id("abc"), "abc");
    }

    #[test]
    fn test_suggest_query_ready() {
        assert!(!suggest_query_ready(""));
        assert!(!suggest_query_ready("a"));
        assert!(!suggest_query_ready("  o  "));
        assert!(!suggest_query_ready("é"));
        assert!(suggest_query_ready("oa"));
        assert!(suggest_query_ready("ça"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world this is long", 10), "hello w...");
    }

    #[test]
    fn test_truncate_utf8() {
        assert_eq!(truncate("Crème fraîche", 10), "Crème f...");
        assert_eq!(truncate("日清カップヌードル", 8), "日清カップ...");
    }

    #[test]
    fn test_macro_line() {
        assert_eq!(macro_line(260.0, 5.4, 30.0, 1.25), "260 kcal | P:5.4g C:30g F:1.3g");
        assert_eq!(macro_line(-0.0, 0.05, 0.0, 0.0), "0 kcal | P:0.1g C:0g F:0g");
    }

    #[test]
    fn test_no_neg_zero() {
        assert_eq!(no_neg_zero(-0.0).to_bits(), 0.0_f64.to_bits());
        assert_eq!(no_neg_zero(5.0), 5.0);
    }
}
