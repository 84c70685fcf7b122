//! HTTP client for the external rate provider.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::header::ACCEPT;
use tracing::{debug, warn};

use valuta_shared::config::ProviderConfig;

use super::error::ProviderError;
use super::normalize::{self, RatesDocument};

/// A normalized batch of rates fetched from the provider.
#[derive(Debug, Clone)]
pub struct FetchedRates {
    /// Base currency code the rates are relative to.
    pub base: String,
    /// Quote code -> quote units per one base unit.
    pub rates: std::collections::BTreeMap<String, f64>,
    /// Provider label to store with the observations.
    pub provider: String,
    /// Single timestamp shared by the whole batch.
    pub fetched_at: DateTime<Utc>,
}

/// Client for the provider's daily-rates endpoint.
#[derive(Debug, Clone)]
pub struct RateProvider {
    client: reqwest::Client,
    config: ProviderConfig,
}

impl RateProvider {
    /// Builds the client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn from_config(config: ProviderConfig) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client, config })
    }

    /// Fetches the provider document and normalizes it into base -> quote
    /// rates for the requested quote codes.
    ///
    /// Transport failures are retried a bounded number of times with a fixed
    /// delay; payload-shape failures are returned immediately.
    ///
    /// # Errors
    ///
    /// Returns a `ProviderError` when the call, the payload, or the
    /// normalization fails.
    pub async fn fetch(
        &self,
        base_code: &str,
        quote_codes: &[String],
    ) -> Result<FetchedRates, ProviderError> {
        let document = self.fetch_document().await?;
        let anchors = normalize::anchor_map(&document, &self.config.home_code);
        let normalized = normalize::pair_rates(&anchors, base_code, quote_codes)?;

        for code in &normalized.missing {
            warn!(code = %code, "provider payload has no entry for requested currency");
        }
        debug!(
            base = %base_code,
            count = normalized.rates.len(),
            "provider rates normalized"
        );

        Ok(FetchedRates {
            base: base_code.to_string(),
            rates: normalized.rates,
            provider: self.config.label.clone(),
            fetched_at: Utc::now(),
        })
    }

    async fn fetch_document(&self) -> Result<RatesDocument, ProviderError> {
        let mut attempt = 0;
        loop {
            match self.try_fetch().await {
                Ok(document) => return Ok(document),
                Err(err) if err.is_transient() && attempt < self.config.retries => {
                    attempt += 1;
                    warn!(
                        error = %err,
                        attempt,
                        retries = self.config.retries,
                        "provider fetch failed, retrying"
                    );
                    tokio::time::sleep(Duration::from_millis(self.config.retry_delay_ms)).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn try_fetch(&self) -> Result<RatesDocument, ProviderError> {
        let response = self
            .client
            .get(&self.config.url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }

        response
            .json::<RatesDocument>()
            .await
            .map_err(|err| ProviderError::Payload(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ProviderConfig {
        ProviderConfig {
            url: "http://localhost:1/daily.json".to_string(),
            home_code: "RUB".to_string(),
            label: "cbr".to_string(),
            user_agent: "valuta/test".to_string(),
            timeout_secs: 1,
            retries: 0,
            retry_delay_ms: 1,
        }
    }

    #[test]
    fn test_client_builds_from_config() {
        assert!(RateProvider::from_config(config()).is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_reports_http_error() {
        let provider = RateProvider::from_config(config()).unwrap();
        let err = provider
            .fetch("USD", &["EUR".to_string()])
            .await
            .unwrap_err();
        assert_eq!(err.reason(), "http_error");
    }
}
