use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::error::QuoteError;

/// Latest-price lookup used by the scheduler.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn latest_price(&self, symbol: &str) -> Result<f64, QuoteError>;
}

const QUOTE_URL: &str = "https://finnhub.io/api/v1/quote";

#[derive(Clone)]
pub struct FinnhubClient {
    http: Client,
    api_key: String,
}

impl FinnhubClient {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self, QuoteError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, api_key })
    }

    fn has_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    pub async fn quote(&self, symbol: &str) -> Result<QuoteResponse, QuoteError> {
        if !self.has_key() {
            return Err(QuoteError::MissingKey);
        }

        let res = self
            .http
            .get(QUOTE_URL)
            .query(&[("symbol", symbol), ("token", &self.api_key)])
            .send()
            .await
            .map_err(|e| QuoteError::Http(e.without_url()))?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(QuoteError::Status {
                symbol: symbol.to_string(),
                status,
                body,
            });
        }

        res.json::<QuoteResponse>()
            .await
            .map_err(|e| QuoteError::Http(e.without_url()))
    }
}

#[async_trait]
impl QuoteSource for FinnhubClient {
    async fn latest_price(&self, symbol: &str) -> Result<f64, QuoteError> {
        let quote = self.quote(symbol).await?;

        // unknown symbols come back as all zeros
        if !quote.c.is_finite() || quote.c <= 0.0 {
            return Err(QuoteError::NoPrice(symbol.to_string()));
        }
        Ok(quote.c)
    }
}

#[derive(Debug, Deserialize)]
pub struct QuoteResponse {
    // current
    pub c: f64,
}
