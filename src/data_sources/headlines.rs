//! Trending headlines client.
//!
//! Projects the upstream item list into a [`HeadlineSet`] keyed 1..N in list
//! order. The set is rebuilt wholesale on every successful fetch; one key is
//! picked uniformly at random as the initial ticker position so the board
//! does not always restart on the first headline.

use rand::Rng;
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::FetchError;
use crate::model::{FetchResult, HeadlineSet, NO_HEADLINES};

use super::{API_BASE, fetch_result_object};

const HEADLINES_PATH: &str = "/toutiaohot/index";

/// Client for the trending headlines endpoint.
#[derive(Clone)]
pub struct HeadlineClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HeadlineClient {
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

    /// Fetch the current headline list.
    ///
    /// Never fails past this boundary: any transport, protocol, or decode
    /// error becomes a [`FetchResult::Failure`].
    pub async fn fetch(&self) -> FetchResult {
        match self.fetch_latest().await {
            Ok(result) => result,
            Err(err) => {
                warn!(error = %err, "headline fetch failed");
                FetchResult::failure(NO_HEADLINES, err.to_string())
            }
        }
    }

    async fn fetch_latest(&self) -> Result<FetchResult, FetchError> {
        let url = format!("{}{}?key={}", self.base_url, HEADLINES_PATH, self.api_key);
        let result = fetch_result_object(&self.client, &url).await?;

        let set = build_headline_set(&result);
        if set.is_empty() {
            return Ok(FetchResult::headline_success(NO_HEADLINES, result, set, 0));
        }

        let pointer = rand::rng().random_range(0..set.len());
        let picked = set.get(pointer + 1).unwrap_or(NO_HEADLINES);
        let detail = format!("📰头条：{picked}");
        Ok(FetchResult::headline_success(detail, result, set, pointer + 1))
    }
}

/// Project `result.list[*].word` into a set keyed 1..N, synthesizing a
/// placeholder for items with no headline text.
fn build_headline_set(result: &Map<String, Value>) -> HeadlineSet {
    let items = match result.get("list").and_then(Value::as_array) {
        Some(items) => items,
        None => return HeadlineSet::default(),
    };

    let words = items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            item.get("word")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("新闻{}", idx + 1))
        })
        .collect();

    HeadlineSet::new(words)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn result_with_list(list: Value) -> Map<String, Value> {
        json!({ "list": list }).as_object().cloned().unwrap()
    }

    #[test]
    fn builds_set_in_list_order() {
        let result = result_with_list(json!([
            {"word": "第一条"},
            {"word": "第二条"},
            {"word": "第三条"},
        ]));

        let set = build_headline_set(&result);
        assert_eq!(set.len(), 3);
        assert_eq!(set.get(1), Some("第一条"));
        assert_eq!(set.get(3), Some("第三条"));
    }

    #[test]
    fn synthesizes_placeholder_for_missing_word() {
        let result = result_with_list(json!([
            {"word": "第一条"},
            {"title": "no word field"},
        ]));

        let set = build_headline_set(&result);
        assert_eq!(set.get(2), Some("新闻2"));
    }

    #[test]
    fn missing_list_yields_empty_set() {
        let result = json!({}).as_object().cloned().unwrap();
        assert!(build_headline_set(&result).is_empty());
    }
}
