use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::models::{RatesResponse, RawCountry, ValuedCountry};
use crate::storage::{CountryStorage, StatusStorage};
use crate::summary;
use crate::valuation::{appraise, RandomFactor};
use crate::{AppError, Result};

const COUNTRIES_URL: &str =
    "https://restcountries.com/v2/all?fields=name,capital,region,population,flag,currencies";
const RATES_URL: &str = "https://open.er-api.com/v6/latest/USD";
const COUNTRIES_SOURCE: &str = "restcountries.com";
const RATES_SOURCE: &str = "open.er-api.com";
const FETCH_TIMEOUT: Duration = Duration::from_secs(5);
const TOP_LIMIT: i64 = 5;

/// Runs the fetch -> value -> upsert -> summarize pipeline. One instance is
/// shared by all handlers; each call is independent and there is no mutual
/// exclusion between concurrent refreshes (last writer wins).
#[derive(Clone)]
pub struct RefreshService {
    client: reqwest::Client,
    countries: CountryStorage,
    status: StatusStorage,
    noise: Arc<dyn RandomFactor>,
    cache_dir: PathBuf,
}

impl RefreshService {
    pub fn new(
        countries: CountryStorage,
        status: StatusStorage,
        noise: Arc<dyn RandomFactor>,
        cache_dir: PathBuf,
    ) -> Self {
        let client = reqwest::Client::builder()
            .gzip(true)
            .timeout(FETCH_TIMEOUT)
            .build()
            .expect("failed to build http client");
        Self {
            client,
            countries,
            status,
            noise,
            cache_dir,
        }
    }

    /// Either both upstream fetches succeed or nothing is persisted. The
    /// batched upsert is the only write that must be atomic and the store
    /// guarantees that for the single statement.
    pub async fn refresh(&self) -> Result<usize> {
        let raw = fetch_countries(&self.client, COUNTRIES_URL).await?;
        let rates = fetch_rates(&self.client, RATES_URL).await?;
        let valued: Vec<ValuedCountry> = raw
            .into_iter()
            .map(|country| appraise(country, &rates.rates, self.noise.as_ref()))
            .collect();
        let processed = valued.len();
        let rows = self.countries.upsert_batch(&valued).await?;
        tracing::info!("refresh upserted {rows} rows from {processed} fetched countries");
        self.status.touch().await?;
        // Data is persisted at this point; a broken summary should not turn
        // the refresh into a failure.
        if let Err(e) = self.derive_summary().await {
            tracing::error!("summary derivation failed after refresh: {e:?}");
        }
        Ok(processed)
    }

    async fn derive_summary(&self) -> anyhow::Result<()> {
        let total = self.countries.count().await?;
        let top = self.countries.top_by_gdp(TOP_LIMIT).await?;
        summary::write_artifact(&self.cache_dir, total, &top, Utc::now()).await
    }
}

pub(crate) async fn fetch_countries(
    client: &reqwest::Client,
    url: &str,
) -> Result<Vec<RawCountry>> {
    let response = client
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| {
            tracing::error!("error fetching countries: {e:?}");
            AppError::Upstream(COUNTRIES_SOURCE)
        })?;
    response.json::<Vec<RawCountry>>().await.map_err(|e| {
        tracing::error!("error reading countries response: {e:?}");
        AppError::Upstream(COUNTRIES_SOURCE)
    })
}

pub(crate) async fn fetch_rates(client: &reqwest::Client, url: &str) -> Result<RatesResponse> {
    let response = client
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| {
            tracing::error!("error fetching exchange rates: {e:?}");
            AppError::Upstream(RATES_SOURCE)
        })?;
    response.json::<RatesResponse>().await.map_err(|e| {
        tracing::error!("error reading exchange rate response: {e:?}");
        AppError::Upstream(RATES_SOURCE)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mock_server(route: &str, status: u16, body: &str) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn fetch_countries_parses_bulk_list() {
        let body = r#"[
            {"name": "Testland", "capital": "Testville", "region": "Nowhere",
             "population": 42, "flag": "https://example.com/t.svg",
             "currencies": [{"code": "TST"}]},
            {"name": "Atlantis"}
        ]"#;
        let server = mock_server("/all", 200, body).await;
        let client = reqwest::Client::new();
        let url = format!("{}/all", server.uri());

        let countries = fetch_countries(&client, &url).await.unwrap();
        assert_eq!(countries.len(), 2);
        assert_eq!(countries[0].name, "Testland");
        assert_eq!(countries[0].currencies[0].code.as_deref(), Some("TST"));
        assert_eq!(countries[1].population, 0);
    }

    #[tokio::test]
    async fn fetch_countries_maps_server_error_to_upstream() {
        let server = mock_server("/all", 500, "boom").await;
        let client = reqwest::Client::new();
        let url = format!("{}/all", server.uri());

        let err = fetch_countries(&client, &url).await.unwrap_err();
        assert!(matches!(err, AppError::Upstream("restcountries.com")));
    }

    #[tokio::test]
    async fn fetch_countries_maps_garbage_body_to_upstream() {
        let server = mock_server("/all", 200, "<html>not json</html>").await;
        let client = reqwest::Client::new();
        let url = format!("{}/all", server.uri());

        let err = fetch_countries(&client, &url).await.unwrap_err();
        assert!(matches!(err, AppError::Upstream("restcountries.com")));
    }

    #[tokio::test]
    async fn fetch_rates_extracts_rate_table() {
        let body = r#"{"result": "success", "base_code": "USD",
                       "rates": {"USD": 1.0, "EUR": 0.9}}"#;
        let server = mock_server("/v6/latest/USD", 200, body).await;
        let client = reqwest::Client::new();
        let url = format!("{}/v6/latest/USD", server.uri());

        let rates = fetch_rates(&client, &url).await.unwrap();
        assert_eq!(rates.rates.get("EUR"), Some(&0.9));
    }

    #[tokio::test]
    async fn fetch_rates_maps_server_error_to_upstream() {
        let server = mock_server("/v6/latest/USD", 503, "down").await;
        let client = reqwest::Client::new();
        let url = format!("{}/v6/latest/USD", server.uri());

        let err = fetch_rates(&client, &url).await.unwrap_err();
        assert!(matches!(err, AppError::Upstream("open.er-api.com")));
    }
}
