//! Regional fuel price client.

use tracing::warn;

use crate::config::Province;
use crate::error::FetchError;
use crate::model::FetchResult;

use super::{API_BASE, display_field, fetch_result_object};

const FUEL_PATH: &str = "/oilprice/index";

/// Placeholder detail when the fuel price cannot be fetched.
pub const FUEL_UNAVAILABLE: &str = "暂无油价信息";

/// Client for the per-province fuel price endpoint.
#[derive(Clone)]
pub struct FuelPriceClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    province: Province,
}

impl FuelPriceClient {
    pub fn new(api_key: &str, province: Province) -> Self {
        Self::with_base_url(API_BASE, api_key, province)
    }

    /// Create a client with a custom base URL (for testing).
    pub fn with_base_url(base_url: &str, api_key: &str, province: Province) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
            province,
        }
    }

    /// Fetch today's prices for the configured province.
    ///
    /// Never fails past this boundary: any transport, protocol, or decode
    /// error becomes a [`FetchResult::Failure`].
    pub async fn fetch(&self) -> FetchResult {
        match self.fetch_latest().await {
            Ok(result) => result,
            Err(err) => {
                warn!(province = %self.province, error = %err, "fuel price fetch failed");
                FetchResult::failure(FUEL_UNAVAILABLE, err.to_string())
            }
        }
    }

    async fn fetch_latest(&self) -> Result<FetchResult, FetchError> {
        let url = format!(
            "{}{}?key={}&prov={}",
            self.base_url,
            FUEL_PATH,
            self.api_key,
            urlencoding::encode(self.province.as_str())
        );
        let result = fetch_result_object(&self.client, &url).await?;

        let detail = format!(
            "⛽油价：0#{}元 92#{}元 95#{}元",
            display_field(&result, "p0"),
            display_field(&result, "p92"),
            display_field(&result, "p95")
        );
        Ok(FetchResult::success(detail, result))
    }
}
