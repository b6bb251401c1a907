//! USD→CNY exchange rate client.
//!
//! The upstream converts a fixed amount (100 USD) rather than quoting a unit
//! rate, so the query parameters never change between fetches.

use serde_json::{Map, Value};
use tracing::warn;

use crate::error::FetchError;
use crate::model::FetchResult;

use super::{API_BASE, fetch_result_object};

const EXCHANGE_PATH: &str = "/fxrate/index";

const FROM_COIN: &str = "USD";
const TO_COIN: &str = "CNY";
const MONEY: &str = "100";

/// Placeholder detail when the rate cannot be fetched.
pub const EXCHANGE_UNAVAILABLE: &str = "暂无汇率信息";

/// Client for the fixed-pair currency exchange endpoint.
#[derive(Clone)]
pub struct ExchangeRateClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ExchangeRateClient {
    pub fn new(api_key: &str) -> Self {
        Self::with_base_url(API_BASE, api_key)
    }

    /// Create a client with a custom base URL (for testing).
    pub fn with_base_url(base_url: &str, api_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Fetch what 100 USD converts to today.
    ///
    /// Never fails past this boundary: any transport, protocol, or decode
    /// error becomes a [`FetchResult::Failure`].
    pub async fn fetch(&self) -> FetchResult {
        match self.fetch_latest().await {
            Ok(result) => result,
            Err(err) => {
                warn!(error = %err, "exchange rate fetch failed");
                FetchResult::failure(EXCHANGE_UNAVAILABLE, err.to_string())
            }
        }
    }

    async fn fetch_latest(&self) -> Result<FetchResult, FetchError> {
        let url = format!(
            "{}{}?key={}&fromcoin={}&tocoin={}&money={}",
            self.base_url, EXCHANGE_PATH, self.api_key, FROM_COIN, TO_COIN, MONEY
        );
        let result = fetch_result_object(&self.client, &url).await?;

        let detail = format!(
            "💵汇率：$100美元兑人民币¥{}元",
            format_rate(result.get("money"))
        );
        Ok(FetchResult::success(detail, result))
    }
}

/// Format the converted amount to exactly two decimals.
///
/// Absent, non-numeric, and zero values all render as "0.00". Rounding is
/// half-up in integer cents; `{:.2}` on the raw f64 would turn a value like
/// 12.345 into "12.34".
fn format_rate(value: Option<&Value>) -> String {
    let amount = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    };

    if amount <= 0.0 {
        return "0.00".to_string();
    }

    let thousandths = (amount * 1000.0).round() as i64;
    let cents = (thousandths + 5) / 10;
    format!("{}.{:02}", cents / 100, cents % 100)
}
