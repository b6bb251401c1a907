//! Data model for the board cache and its display projection.
//!
//! One refresh cycle produces one [`Snapshot`] holding the four per-feed
//! [`FetchResult`]s and a shared minute-precision timestamp. The snapshot is
//! always replaced wholesale; a reader never observes a record mixing
//! sub-results from two different cycles.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// Minute-precision wall-clock format shared by all entities.
pub const UPDATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Title line of the ticker view.
pub const BOARD_TITLE: &str = "📚实时动态";

/// Placeholder shown when no headline set is cached.
pub const NO_HEADLINES: &str = "暂无新闻";

/// Detail shown on all four feeds when an entire cycle fails.
pub const CYCLE_FAILED: &str = "更新失败";

/// Outcome of one upstream endpoint call.
///
/// Success carries the display-ready `detail` line plus the raw projected
/// fields; the headline feed's success additionally carries the rebuilt
/// [`HeadlineSet`] and the 1-based initial pointer into it. Failure carries a
/// fixed localized placeholder and the underlying error message.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FetchResult {
    Success {
        detail: String,
        raw: Map<String, Value>,
        #[serde(skip_serializing_if = "Option::is_none")]
        headlines: Option<HeadlineSet>,
        #[serde(skip_serializing_if = "Option::is_none")]
        headline_index: Option<usize>,
    },
    Failure {
        detail: String,
        error: String,
    },
}

impl FetchResult {
    /// Plain success for the fuel, exchange, and air-quality feeds.
    pub fn success(detail: impl Into<String>, raw: Map<String, Value>) -> Self {
        FetchResult::Success {
            detail: detail.into(),
            raw,
            headlines: None,
            headline_index: None,
        }
    }

    /// Headline success; `headline_index` is 1-based, 0 for an empty set.
    pub fn headline_success(
        detail: impl Into<String>,
        raw: Map<String, Value>,
        headlines: HeadlineSet,
        headline_index: usize,
    ) -> Self {
        FetchResult::Success {
            detail: detail.into(),
            raw,
            headlines: Some(headlines),
            headline_index: Some(headline_index),
        }
    }

    pub fn failure(detail: impl Into<String>, error: impl Into<String>) -> Self {
        FetchResult::Failure {
            detail: detail.into(),
            error: error.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FetchResult::Success { .. })
    }

    /// The display-ready line, present on both outcomes.
    pub fn detail(&self) -> &str {
        match self {
            FetchResult::Success { detail, .. } | FetchResult::Failure { detail, .. } => detail,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            FetchResult::Success { .. } => None,
            FetchResult::Failure { error, .. } => Some(error),
        }
    }

    /// Headline set and 1-based pointer carried by a successful headline
    /// fetch. `None` for failures and for the other three feeds.
    pub fn headline_payload(&self) -> Option<(&HeadlineSet, usize)> {
        match self {
            FetchResult::Success {
                headlines: Some(set),
                headline_index,
                ..
            } => Some((set, headline_index.unwrap_or(0))),
            _ => None,
        }
    }
}

/// Ordered headline texts addressed by 1-based position.
///
/// Rebuilt wholesale on every successful headline fetch and never merged
/// with the previous set. Serializes as a map with string keys "1".."N" in
/// position order, the shape the upstream list is projected into.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadlineSet(Vec<String>);

impl HeadlineSet {
    pub fn new(items: Vec<String>) -> Self {
        HeadlineSet(items)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Look up by 1-based key.
    pub fn get(&self, key: usize) -> Option<&str> {
        key.checked_sub(1)
            .and_then(|idx| self.0.get(idx))
            .map(String::as_str)
    }
}

impl Serialize for HeadlineSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Keys stay in position order, not lexicographic order.
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (idx, text) in self.0.iter().enumerate() {
            map.serialize_entry(&(idx + 1).to_string(), text)?;
        }
        map.end()
    }
}

/// The unit of cached state: all four feed results from one refresh cycle.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub headlines: FetchResult,
    pub fuel: FetchResult,
    pub exchange: FetchResult,
    pub air_quality: FetchResult,

    /// Wall-clock time of the cycle that produced this record, minute
    /// precision ([`UPDATE_TIME_FORMAT`]).
    pub last_update: String,
}

impl Snapshot {
    /// Record published when an entire cycle fails: four uniform failures
    /// sharing one error message, never a partially stale mix.
    pub fn failed(error: &str, last_update: String) -> Self {
        Snapshot {
            headlines: FetchResult::failure(CYCLE_FAILED, error),
            fuel: FetchResult::failure(CYCLE_FAILED, error),
            exchange: FetchResult::failure(CYCLE_FAILED, error),
            air_quality: FetchResult::failure(CYCLE_FAILED, error),
            last_update,
        }
    }
}

/// Display-ready flattening of the cache plus the rotation pointer.
///
/// Pure projection, recomputed on every read; performs no I/O.
#[derive(Debug, Clone, Serialize)]
pub struct TickerView {
    pub title: String,

    /// Current headline line, or the fixed placeholder when no set is cached.
    pub headline: String,

    pub fuel: String,
    pub exchange: String,
    pub air_quality: String,

    /// 1-based rotation pointer; 0 when the headline set is empty.
    pub headline_index: usize,

    pub last_update: String,
}

impl TickerView {
    /// Project the cached snapshot and rotation state into display lines.
    pub fn project(snapshot: &Snapshot, headlines: &HeadlineSet, rotation_index: usize) -> Self {
        let (headline, headline_index) = if headlines.is_empty() {
            (format!("📰头条：{NO_HEADLINES}"), 0)
        } else {
            let key = rotation_index % headlines.len() + 1;
            let text = headlines.get(key).unwrap_or(NO_HEADLINES);
            (format!("📰头条：{text}"), key)
        };

        TickerView {
            title: BOARD_TITLE.to_string(),
            headline,
            fuel: snapshot.fuel.detail().to_string(),
            exchange: snapshot.exchange.detail().to_string(),
            air_quality: snapshot.air_quality.detail().to_string(),
            headline_index,
            last_update: snapshot.last_update.clone(),
        }
    }
}
