use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A persisted country row.
#[derive(Serialize, Deserialize, Clone, Debug, FromRow)]
pub struct Country {
    pub id: i64,
    pub name: String,
    pub capital: Option<String>,
    pub region: Option<String>,
    pub population: i64,
    pub currency_code: Option<String>,
    pub exchange_rate: Option<f64>,
    pub estimated_gdp: Option<f64>,
    pub flag_url: Option<String>,
    pub last_refreshed_at: DateTime<Utc>,
}

/// One country as the bulk upstream endpoint reports it.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct RawCountry {
    pub name: String,
    pub capital: Option<String>,
    pub region: Option<String>,
    #[serde(default)]
    pub population: i64,
    pub flag: Option<String>,
    #[serde(default)]
    pub currencies: Vec<RawCurrency>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct RawCurrency {
    pub code: Option<String>,
}

/// Rate endpoint response; only the code -> rate table matters.
#[derive(Deserialize, Debug)]
pub struct RatesResponse {
    pub rates: HashMap<String, f64>,
}

/// A fully valued record ready for the batched upsert.
#[derive(Debug, Clone, PartialEq)]
pub struct ValuedCountry {
    pub name: String,
    pub capital: Option<String>,
    pub region: Option<String>,
    pub population: i64,
    pub currency_code: Option<String>,
    pub exchange_rate: Option<f64>,
    pub estimated_gdp: Option<f64>,
    pub flag_url: Option<String>,
}

/// POST /countries payload.
#[derive(Deserialize, Debug, Validate)]
pub struct NewCountry {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    pub capital: Option<String>,
    pub region: Option<String>,
    #[validate(range(min = 1, message = "population must be a positive integer"))]
    pub population: i64,
    #[validate(length(min = 1, message = "currency_code is required"))]
    pub currency_code: String,
    pub exchange_rate: Option<f64>,
    pub estimated_gdp: Option<f64>,
    pub flag_url: Option<String>,
}

/// PATCH /countries/:name payload. Nullable columns take a double Option so
/// an explicit JSON null clears the column while an absent field leaves it
/// untouched.
#[derive(Deserialize, Debug, Default, Validate)]
pub struct UpdateCountry {
    #[validate(length(min = 1, message = "name cannot be empty"))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub capital: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub region: Option<Option<String>>,
    #[validate(range(min = 1, message = "population must be a positive integer"))]
    pub population: Option<i64>,
    #[validate(length(min = 1, message = "currency_code cannot be empty"))]
    pub currency_code: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub exchange_rate: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub estimated_gdp: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub flag_url: Option<Option<String>>,
}

/// Serde folds JSON null into the outer None on a plain nested Option; going
/// through the inner Option first keeps null as `Some(None)` so it can clear
/// a column, while an absent key stays `None` via the field default.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// GET /countries query string.
#[derive(Deserialize, Debug, Default)]
pub struct CountryQuery {
    pub region: Option<String>,
    pub currency: Option<String>,
    pub sort: Option<String>,
}

/// name + estimated_gdp slice used by the summary artifact.
#[derive(Serialize, Clone, Debug, FromRow)]
pub struct TopCountry {
    pub name: String,
    pub estimated_gdp: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_payload_distinguishes_null_from_absent() {
        let update: UpdateCountry =
            serde_json::from_str(r#"{"capital": null, "population": 42}"#).unwrap();
        assert_eq!(update.capital, Some(None));
        assert_eq!(update.region, None);
        assert_eq!(update.population, Some(42));
    }

    #[test]
    fn null_only_update_payload_still_carries_a_change() {
        let update: UpdateCountry =
            serde_json::from_str(r#"{"exchange_rate": null, "flag_url": null}"#).unwrap();
        assert_eq!(update.exchange_rate, Some(None));
        assert_eq!(update.flag_url, Some(None));
        assert_eq!(update.capital, None);
    }

    #[test]
    fn raw_country_tolerates_missing_fields() {
        let raw: RawCountry = serde_json::from_str(r#"{"name": "Atlantis"}"#).unwrap();
        assert_eq!(raw.population, 0);
        assert!(raw.currencies.is_empty());
        assert!(raw.capital.is_none());
    }
}
