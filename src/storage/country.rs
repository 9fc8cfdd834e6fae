use crate::models::{Country, CountryQuery, NewCountry, TopCountry, UpdateCountry, ValuedCountry};
use crate::storage::query;
use crate::{AppError, Result};

#[derive(Clone)]
pub struct CountryStorage {
    pool: sqlx::PgPool,
}

impl CountryStorage {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }

    /// Writes the whole refresh batch in one statement. Existing names update
    /// their mutable columns and timestamp, new names insert fresh. Atomicity
    /// is the store's single-statement guarantee.
    pub async fn upsert_batch(&self, records: &[ValuedCountry]) -> Result<u64> {
        if records.is_empty() {
            return Ok(0);
        }
        let mut qb = sqlx::QueryBuilder::new(
            "INSERT INTO countries (name, capital, region, population, \
             currency_code, exchange_rate, estimated_gdp, flag_url) ",
        );
        qb.push_values(records.iter().cloned(), |mut b, country| {
            b.push_bind(country.name)
                .push_bind(country.capital)
                .push_bind(country.region)
                .push_bind(country.population)
                .push_bind(country.currency_code)
                .push_bind(country.exchange_rate)
                .push_bind(country.estimated_gdp)
                .push_bind(country.flag_url);
        });
        qb.push(
            " ON CONFLICT (name) DO UPDATE SET \
             capital = EXCLUDED.capital, \
             region = EXCLUDED.region, \
             population = EXCLUDED.population, \
             currency_code = EXCLUDED.currency_code, \
             exchange_rate = EXCLUDED.exchange_rate, \
             estimated_gdp = EXCLUDED.estimated_gdp, \
             flag_url = EXCLUDED.flag_url, \
             last_refreshed_at = NOW()",
        );
        let result = qb.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    pub async fn list(&self, filter: &CountryQuery) -> Result<Vec<Country>> {
        let mut qb = query::select_countries(filter);
        let countries = qb
            .build_query_as::<Country>()
            .fetch_all(&self.pool)
            .await?;
        Ok(countries)
    }

    pub async fn get(&self, name: &str) -> Result<Country> {
        let query = "SELECT * FROM countries WHERE name = $1";
        sqlx::query_as::<_, Country>(query)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn insert(&self, new: &NewCountry) -> Result<Country> {
        let query = "INSERT INTO countries \
             (name, capital, region, population, currency_code, \
              exchange_rate, estimated_gdp, flag_url) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING *";
        let country = sqlx::query_as::<_, Country>(query)
            .bind(&new.name)
            .bind(&new.capital)
            .bind(&new.region)
            .bind(new.population)
            .bind(&new.currency_code)
            .bind(new.exchange_rate)
            .bind(new.estimated_gdp)
            .bind(&new.flag_url)
            .fetch_one(&self.pool)
            .await?;
        Ok(country)
    }

    pub async fn update(&self, name: &str, changes: &UpdateCountry) -> Result<Country> {
        let mut qb = query::update_country(name, changes)?;
        qb.push(" RETURNING *");
        qb.build_query_as::<Country>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn delete(&self, name: &str) -> Result<()> {
        let query = "DELETE FROM countries WHERE name = $1";
        let result = sqlx::query(query).bind(name).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    pub async fn count(&self) -> Result<i64> {
        let query = "SELECT COUNT(*) FROM countries";
        let total = sqlx::query_scalar::<_, i64>(query)
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    /// Top records by estimated GDP. NULLS LAST keeps unvalued countries out
    /// of the ranking; order among equal values is whatever the store picks.
    pub async fn top_by_gdp(&self, limit: i64) -> Result<Vec<TopCountry>> {
        let query = "SELECT name, estimated_gdp FROM countries \
             ORDER BY estimated_gdp DESC NULLS LAST LIMIT $1";
        let top = sqlx::query_as::<_, TopCountry>(query)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(top)
    }
}
