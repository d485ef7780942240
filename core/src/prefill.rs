//! Food prefill from a pasted JSON object such as
//! `{"foodName": "Oats", "weightInGrams": "40", "calories": "389"}`.
//!
//! Every key is optional and values may be numbers or strings.

use serde_json::Value;

use crate::format::{parse_decimal, parse_decimal_or_zero};
use crate::models::NutritionPrefill;

fn field_text(obj: &serde_json::Map<String, Value>, key: &str) -> String {
    match obj.get(key) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Parse pasted text into prefill values. Text that is not a JSON object
/// yields `None`. A blank or unparseable weight is left unset.
#[must_use]
pub fn parse_food_paste(text: &str) -> Option<NutritionPrefill> {
    let text = text.trim();
    if !(text.starts_with('{') && text.ends_with('}')) {
        return None;
    }
    let Ok(Value::Object(obj)) = serde_json::from_str::<Value>(text) else {
        return None;
    };

    Some(NutritionPrefill {
        name: field_text(&obj, "foodName"),
        weight: parse_decimal(&field_text(&obj, "weightInGrams")).filter(|w| *w > 0.0),
        calories: parse_decimal_or_zero(&field_text(&obj, "calories")),
        proteins: parse_decimal_or_zero(&field_text(&obj, "protein")),
        fat: parse_decimal_or_zero(&field_text(&obj, "fat")),
        carbs: parse_decimal_or_zero(&field_text(&obj, "carbs")),
    })
}
