//! City air quality client.

use tracing::warn;

use crate::error::FetchError;
use crate::model::FetchResult;

use super::{API_BASE, display_field, fetch_result_object};

const AIR_QUALITY_PATH: &str = "/aqi/index";

/// Placeholder detail when the air quality cannot be fetched.
pub const AIR_QUALITY_UNAVAILABLE: &str = "暂无空气质量信息";

/// Client for the city air quality endpoint.
#[derive(Clone)]
pub struct AirQualityClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    city: String,
}

impl AirQualityClient {
    pub fn new(api_key: &str, city: &str) -> Self {
        Self::with_base_url(API_BASE, api_key, city)
    }

    /// Create a client with a custom base URL (for testing).
    pub fn with_base_url(base_url: &str, api_key: &str, city: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
            city: city.to_string(),
        }
    }

    /// Fetch the current index for the configured city.
    ///
    /// Never fails past this boundary: any transport, protocol, or decode
    /// error becomes a [`FetchResult::Failure`].
    pub async fn fetch(&self) -> FetchResult {
        match self.fetch_latest().await {
            Ok(result) => result,
            Err(err) => {
                warn!(city = %self.city, error = %err, "air quality fetch failed");
                FetchResult::failure(AIR_QUALITY_UNAVAILABLE, err.to_string())
            }
        }
    }

    async fn fetch_latest(&self) -> Result<FetchResult, FetchError> {
        let url = format!(
            "{}{}?key={}&area={}",
            self.base_url,
            AIR_QUALITY_PATH,
            self.api_key,
            urlencoding::encode(&self.city)
        );
        let result = fetch_result_object(&self.client, &url).await?;

        let detail = format!(
            "⛅空气：{} AQI:{} PM2.5:{} SO2:{}",
            display_field(&result, "quality"),
            display_field(&result, "aqi"),
            display_field(&result, "pm2_5"),
            display_field(&result, "so2")
        );
        Ok(FetchResult::success(detail, result))
    }
}
