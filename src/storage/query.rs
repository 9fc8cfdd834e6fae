use sqlx::{Postgres, QueryBuilder};

use crate::models::{CountryQuery, UpdateCountry};
use crate::{AppError, Result};

/// Sort keys accepted on GET /countries and the columns they map to. Column
/// names in generated SQL come from this table only, never from the request.
const SORTABLE: &[(&str, &str)] = &[
    ("name", "name"),
    ("population", "population"),
    ("gdp", "estimated_gdp"),
    ("region", "region"),
];

/// Parses a `<field>_<asc|desc>` specifier against the whitelist. Unknown
/// fields are ignored rather than rejected; anything but `desc` sorts
/// ascending.
fn sort_clause(sort: &str) -> Option<(&'static str, &'static str)> {
    let sort = sort.to_lowercase();
    let (key, order) = match sort.split_once('_') {
        Some((key, order)) => (key, order),
        None => (sort.as_str(), "asc"),
    };
    let column = SORTABLE
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, column)| *column)?;
    let direction = if order == "desc" { "DESC" } else { "ASC" };
    Some((column, direction))
}

/// Builds the filtered/sorted list query. Filter values are always bound
/// parameters.
pub fn select_countries(query: &CountryQuery) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT * FROM countries");
    let mut prefix = " WHERE ";
    if let Some(region) = &query.region {
        qb.push(prefix).push("region = ").push_bind(region.clone());
        prefix = " AND ";
    }
    if let Some(currency) = &query.currency {
        qb.push(prefix)
            .push("currency_code = ")
            .push_bind(currency.clone());
    }
    if let Some((column, direction)) = query.sort.as_deref().and_then(sort_clause) {
        qb.push(" ORDER BY ").push(column).push(" ").push(direction);
    }
    qb
}

/// Builds the partial UPDATE for PATCH /countries/:name. Only fields present
/// in the payload land in the SET clause; `last_refreshed_at` is always
/// touched. An empty effective update is a client error, caught before any
/// SQL runs.
pub fn update_country(
    name: &str,
    changes: &UpdateCountry,
) -> Result<QueryBuilder<'static, Postgres>> {
    let has_changes = changes.name.is_some()
        || changes.capital.is_some()
        || changes.region.is_some()
        || changes.population.is_some()
        || changes.currency_code.is_some()
        || changes.exchange_rate.is_some()
        || changes.estimated_gdp.is_some()
        || changes.flag_url.is_some();
    if !has_changes {
        return Err(AppError::EmptyUpdate);
    }

    let mut qb = QueryBuilder::new("UPDATE countries SET ");
    {
        let mut set = qb.separated(", ");
        if let Some(value) = &changes.name {
            set.push("name = ").push_bind_unseparated(value.clone());
        }
        if let Some(value) = &changes.capital {
            set.push("capital = ").push_bind_unseparated(value.clone());
        }
        if let Some(value) = &changes.region {
            set.push("region = ").push_bind_unseparated(value.clone());
        }
        if let Some(value) = changes.population {
            set.push("population = ").push_bind_unseparated(value);
        }
        if let Some(value) = &changes.currency_code {
            set.push("currency_code = ")
                .push_bind_unseparated(value.clone());
        }
        if let Some(value) = changes.exchange_rate {
            set.push("exchange_rate = ").push_bind_unseparated(value);
        }
        if let Some(value) = changes.estimated_gdp {
            set.push("estimated_gdp = ").push_bind_unseparated(value);
        }
        if let Some(value) = &changes.flag_url {
            set.push("flag_url = ").push_bind_unseparated(value.clone());
        }
        set.push("last_refreshed_at = NOW()");
    }
    qb.push(" WHERE name = ").push_bind(name.to_string());
    Ok(qb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_without_filters_is_bare_select() {
        let qb = select_countries(&CountryQuery::default());
        assert_eq!(qb.sql(), "SELECT * FROM countries");
    }

    #[test]
    fn filters_become_bound_parameters() {
        let query = CountryQuery {
            region: Some("Europe".to_string()),
            currency: Some("EUR".to_string()),
            sort: None,
        };
        let qb = select_countries(&query);
        assert_eq!(
            qb.sql(),
            "SELECT * FROM countries WHERE region = $1 AND currency_code = $2"
        );
    }

    #[test]
    fn metacharacters_in_filters_never_reach_the_sql_text() {
        let query = CountryQuery {
            region: Some("'; DROP TABLE countries; --".to_string()),
            currency: None,
            sort: None,
        };
        let qb = select_countries(&query);
        assert_eq!(qb.sql(), "SELECT * FROM countries WHERE region = $1");
    }

    #[test]
    fn gdp_sort_maps_to_estimated_gdp_column() {
        let query = CountryQuery {
            region: None,
            currency: None,
            sort: Some("gdp_desc".to_string()),
        };
        let qb = select_countries(&query);
        assert_eq!(
            qb.sql(),
            "SELECT * FROM countries ORDER BY estimated_gdp DESC"
        );
    }

    #[test]
    fn sort_without_direction_defaults_ascending() {
        let query = CountryQuery {
            sort: Some("name".to_string()),
            ..Default::default()
        };
        let qb = select_countries(&query);
        assert_eq!(qb.sql(), "SELECT * FROM countries ORDER BY name ASC");
    }

    #[test]
    fn unknown_sort_key_is_ignored() {
        let query = CountryQuery {
            sort: Some("flag_url_desc".to_string()),
            ..Default::default()
        };
        let qb = select_countries(&query);
        assert_eq!(qb.sql(), "SELECT * FROM countries");
    }

    #[test]
    fn update_includes_only_present_fields() {
        let changes = UpdateCountry {
            name: Some("Renamed".to_string()),
            population: Some(7),
            ..Default::default()
        };
        let qb = update_country("Old", &changes).unwrap();
        assert_eq!(
            qb.sql(),
            "UPDATE countries SET name = $1, population = $2, \
             last_refreshed_at = NOW() WHERE name = $3"
        );
    }

    #[test]
    fn explicit_null_clears_a_nullable_column() {
        let changes = UpdateCountry {
            capital: Some(None),
            ..Default::default()
        };
        let qb = update_country("Testland", &changes).unwrap();
        assert_eq!(
            qb.sql(),
            "UPDATE countries SET capital = $1, last_refreshed_at = NOW() WHERE name = $2"
        );
    }

    #[test]
    fn empty_update_is_rejected() {
        let Err(err) = update_country("Testland", &UpdateCountry::default()) else {
            panic!("empty update must not produce a query");
        };
        assert!(matches!(err, AppError::EmptyUpdate));
    }
}
