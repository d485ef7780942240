use serde::Deserialize;

use crate::format::parse_decimal_or_zero;
use crate::models::NutritionPrefill;

const KJ_PER_KCAL: f64 = 4.184;

/// `GET /api/v2/product/{barcode}.json` response body.
#[derive(Debug, Deserialize)]
pub struct ProductResponse {
    #[serde(default)]
    pub status_verbose: Option<String>,
    #[serde(default)]
    pub product: Option<ProductData>,
}

#[derive(Debug, Deserialize)]
pub struct ProductData {
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub generic_name: Option<String>,
    #[serde(default)]
    pub nutriments: Option<Nutriments>,
}

#[derive(Debug, Default, Deserialize)]
#[allow(clippy::struct_field_names)]
pub struct Nutriments {
    #[serde(rename = "energy-kcal_100g", default)]
    pub energy_kcal_100g: Option<NutrimentValue>,
    #[serde(default)]
    pub energy_100g: Option<NutrimentValue>,
    #[serde(default)]
    pub proteins_100g: Option<NutrimentValue>,
    #[serde(default)]
    pub carbohydrates_100g: Option<NutrimentValue>,
    #[serde(default)]
    pub fat_100g: Option<NutrimentValue>,
}

/// Nutriments arrive as numbers or as strings, sometimes with a decimal comma.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NutrimentValue {
    Number(f64),
    Text(String),
}

impl NutrimentValue {
    #[must_use]
    pub fn value(&self) -> f64 {
        match self {
            NutrimentValue::Number(n) if n.is_finite() => *n,
            NutrimentValue::Number(_) => 0.0,
            NutrimentValue::Text(s) => parse_decimal_or_zero(s),
        }
    }
}

fn value_of(v: Option<&NutrimentValue>) -> f64 {
    v.map_or(0.0, NutrimentValue::value)
}

/// Map a product response to prefill values, or `None` unless the product
/// was found. Energy falls back from kcal to kJ.
#[must_use]
pub fn product_to_prefill(resp: ProductResponse) -> Option<NutritionPrefill> {
    if resp.status_verbose.as_deref() != Some("product found") {
        return None;
    }
    let product = resp.product?;
    let nutriments = product.nutriments.unwrap_or_default();

    let name = product
        .product_name
        .filter(|n| !n.trim().is_empty())
        .or(product.generic_name)
        .unwrap_or_default();

    let kcal = value_of(nutriments.energy_kcal_100g.as_ref());
    let calories = if kcal > 0.0 {
        kcal
    } else {
        value_of(nutriments.energy_100g.as_ref()) / KJ_PER_KCAL
    };

    Some(NutritionPrefill {
        name: name.trim().to_string(),
        weight: None,
        calories,
        proteins: value_of(nutriments.proteins_100g.as_ref()),
        fat: value_of(nutriments.fat_100g.as_ref()),
        carbs: value_of(nutriments.carbohydrates_100g.as_ref()),
    })
}
