//! FX rate lookups against exchangerate.host (apilayer).
//!
//! [`RateSource`] is the capability the API layer depends on. The only
//! implementation, [`ExchangeRateHostClient`], picks its endpoint once at
//! construction: `/live` when an access key is configured, `/latest` otherwise.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error, info, warn};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use crate::config::Settings;

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum RateError {
    /// The API answered, but not with a usable rate.
    #[error("FX rate unavailable: {0}")]
    Unavailable(String),

    /// The API could not be reached or did not answer in time.
    #[error("FX request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[async_trait]
pub trait RateSource: Send + Sync {
    /// Units of `target` per one unit of `source`.
    async fn get_rate(&self, source: &str, target: &str) -> Result<f64, RateError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateMode {
    /// `GET /live?access_key=..&source=..&currencies=..`
    Live { access_key: String },
    /// `GET /latest?base=..&symbols=..`
    Latest,
}

#[derive(Debug, Deserialize)]
struct LiveResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    quotes: HashMap<String, f64>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct LatestResponse {
    #[serde(default)]
    rates: HashMap<String, f64>,
}

#[derive(Debug, Clone)]
pub struct ExchangeRateHostClient {
    http: reqwest::Client,
    base_url: String,
    mode: RateMode,
}

impl ExchangeRateHostClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Result<Self, RateError> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        let mode = match api_key.filter(|k| !k.trim().is_empty()) {
            Some(access_key) => RateMode::Live { access_key },
            None => RateMode::Latest,
        };

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            mode,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, RateError> {
        Self::new(
            settings.exchange_api_base.clone(),
            settings.exchange_api_key.clone(),
        )
    }

    pub fn mode(&self) -> &RateMode {
        &self.mode
    }

    fn mode_name(&self) -> &'static str {
        match self.mode {
            RateMode::Live { .. } => "live",
            RateMode::Latest => "latest",
        }
    }

    async fn fetch_live(
        &self,
        access_key: &str,
        source: &str,
        target: &str,
    ) -> Result<f64, RateError> {
        let resp = self
            .http
            .get(format!("{}/live", self.base_url))
            .query(&[("access_key", access_key), ("source", source), ("currencies", target)])
            .send()
            .await?;
        let data: LiveResponse = read_json(resp).await?;

        if !data.success {
            let detail = data
                .error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "success=false".to_string());
            return Err(RateError::Unavailable(format!("FX API error: {detail}")));
        }

        let pair = format!("{source}{target}");
        match data.quotes.get(&pair) {
            Some(rate) => checked_rate(*rate, &pair),
            None => Err(RateError::Unavailable(format!("missing FX pair {pair} in quotes"))),
        }
    }

    async fn fetch_latest(&self, source: &str, target: &str) -> Result<f64, RateError> {
        let resp = self
            .http
            .get(format!("{}/latest", self.base_url))
            .query(&[("base", source), ("symbols", target)])
            .send()
            .await?;
        let data: LatestResponse = read_json(resp).await?;

        match data.rates.get(target) {
            Some(rate) => checked_rate(*rate, &format!("{source}{target}")),
            None => Err(RateError::Unavailable(format!("missing rate for {target} in rates"))),
        }
    }
}

#[async_trait]
impl RateSource for ExchangeRateHostClient {
    async fn get_rate(&self, source: &str, target: &str) -> Result<f64, RateError> {
        let source = source.trim().to_ascii_uppercase();
        let target = target.trim().to_ascii_uppercase();

        if source == target {
            return Ok(1.0);
        }

        debug!("fetching FX rate {source}->{target} via /{}", self.mode_name());
        let result = match &self.mode {
            RateMode::Live { access_key } => self.fetch_live(access_key, &source, &target).await,
            RateMode::Latest => self.fetch_latest(&source, &target).await,
        };

        if let Err(e) = &result {
            warn!("FX lookup {source}->{target} failed: {e}");
        }
        result
    }
}

/// One-off lookup that reports the outcome, for checking the endpoint and credential.
pub async fn check_rate(
    rates: &dyn RateSource,
    source: &str,
    target: &str,
) -> Result<f64, RateError> {
    match rates.get_rate(source, target).await {
        Ok(rate) => {
            info!("FX rate {source}->{target}: {rate}");
            Ok(rate)
        }
        Err(e) => {
            error!("FX check {source}->{target} failed: {e}");
            Err(e)
        }
    }
}

async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, RateError> {
    let status = resp.status();
    let body = resp.text().await?;
    if !status.is_success() {
        return Err(RateError::Unavailable(format!("FX API returned {status}")));
    }
    serde_json::from_str(&body)
        .map_err(|e| RateError::Unavailable(format!("unreadable FX response: {e}")))
}

fn checked_rate(rate: f64, pair: &str) -> Result<f64, RateError> {
    if rate.is_finite() && rate > 0.0 {
        Ok(rate)
    } else {
        Err(RateError::Unavailable(format!("invalid rate {rate} for {pair}")))
    }
}
