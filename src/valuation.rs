use std::collections::HashMap;

use rand::Rng;

use crate::models::{RawCountry, ValuedCountry};

/// Source of the noise factor in the estimated GDP formula. Injected so
/// tests can pin the factor; production draws from the thread RNG.
pub trait RandomFactor: Send + Sync {
    /// An integer in [1, 1000].
    fn factor(&self) -> i64;
}

#[derive(Clone, Default)]
pub struct ThreadRngFactor;

impl RandomFactor for ThreadRngFactor {
    fn factor(&self) -> i64 {
        rand::thread_rng().gen_range(1..=1000)
    }
}

/// Merges one upstream record with the rate table and derives an estimated
/// GDP. The noise factor makes the result non-deterministic on purpose: it
/// simulates per-country economic variance the upstream data does not carry.
///
/// Missing upstream fields degrade to defaults; this never fails.
pub fn appraise(
    raw: RawCountry,
    rates: &HashMap<String, f64>,
    noise: &dyn RandomFactor,
) -> ValuedCountry {
    let currency_code = raw.currencies.first().and_then(|c| c.code.clone());
    let exchange_rate = currency_code
        .as_deref()
        .and_then(|code| rates.get(code).copied());

    let estimated_gdp = match (raw.population, exchange_rate, &currency_code) {
        (population, Some(rate), _) if population > 0 => {
            Some((population as f64 * noise.factor() as f64 + 1000.0) / rate)
        }
        (_, _, None) => Some(0.0),
        // Currency is known but the rate table has no entry for it.
        _ => None,
    };

    ValuedCountry {
        name: raw.name,
        capital: raw.capital,
        region: raw.region,
        population: raw.population,
        currency_code,
        exchange_rate,
        estimated_gdp,
        flag_url: raw.flag,
    }
}
