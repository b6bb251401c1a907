//! Clients for the four upstream feeds of the board.
//!
//! All four endpoints live under one API host and share the same response
//! envelope: `{ "code": <int>, "result": { ... } }` with `code == 200`
//! signalling success. Each client issues one GET per refresh cycle, projects
//! the `result` object into a [`crate::model::FetchResult`], and converts its
//! own failure at the boundary; nothing propagates past an individual fetch.
//!
//! # Feeds
//!
//! - [`headlines`]: trending news headlines, also feeding the ticker rotation
//! - [`fuel`]: regional fuel price by province
//! - [`exchange`]: USD→CNY exchange rate for a fixed amount
//! - [`air_quality`]: city air quality index

pub mod air_quality;
pub mod exchange;
pub mod fuel;
pub mod headlines;

pub use air_quality::AirQualityClient;
pub use exchange::ExchangeRateClient;
pub use fuel::FuelPriceClient;
pub use headlines::HeadlineClient;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::FetchError;

/// Base URL of the upstream API host.
pub const API_BASE: &str = "https://apis.tianapi.com";

/// Response envelope shared by all four endpoints.
#[derive(Debug, Deserialize)]
struct Envelope {
    code: i64,
    #[serde(default)]
    result: Map<String, Value>,
}

/// Issue one GET and unwrap the envelope down to its `result` object.
///
/// No retries; the only timeout is the HTTP client's own default.
pub(crate) async fn fetch_result_object(
    client: &reqwest::Client,
    url: &str,
) -> Result<Map<String, Value>, FetchError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::HttpStatus(status.as_u16()));
    }

    let body = response.text().await?;
    let envelope: Envelope = serde_json::from_str(&body)?;
    if envelope.code != 200 {
        return Err(FetchError::UpstreamCode(envelope.code));
    }

    Ok(envelope.result)
}

/// Render one projected field for a detail line, `N/A` when absent.
pub(crate) fn display_field(result: &Map<String, Value>, key: &str) -> String {
    match result.get(key) {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Null) | None => "N/A".to_string(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn display_field_falls_back_to_na() {
        let result = json!({"p0": "7.01", "aqi": 64, "so2": null})
            .as_object()
            .cloned()
            .unwrap();

        assert_eq!(display_field(&result, "p0"), "7.01");
        assert_eq!(display_field(&result, "aqi"), "64");
        assert_eq!(display_field(&result, "so2"), "N/A");
        assert_eq!(display_field(&result, "missing"), "N/A");
    }
}
