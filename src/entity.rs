//! The five host-facing entities of the board.
//!
//! Every entity reports the shared cycle timestamp as its primary value and
//! carries a kind-specific attribute bag: the projected feed result for the
//! four data entities, the [`TickerView`] for the ticker.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{FetchResult, HeadlineSet, Snapshot, TickerView};

/// The named readable entities the board exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Headline,
    FuelPrice,
    ExchangeRate,
    AirQuality,
    Ticker,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Headline,
        EntityKind::FuelPrice,
        EntityKind::ExchangeRate,
        EntityKind::AirQuality,
        EntityKind::Ticker,
    ];

    /// Stable identifier used in API paths.
    pub fn id(&self) -> &'static str {
        match self {
            EntityKind::Headline => "headline",
            EntityKind::FuelPrice => "fuel_price",
            EntityKind::ExchangeRate => "exchange_rate",
            EntityKind::AirQuality => "air_quality",
            EntityKind::Ticker => "ticker",
        }
    }

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Headline => "头条新闻",
            EntityKind::FuelPrice => "今日油价",
            EntityKind::ExchangeRate => "美元汇率",
            EntityKind::AirQuality => "空气质量",
            EntityKind::Ticker => "滚动内容",
        }
    }

    pub fn from_id(id: &str) -> Option<EntityKind> {
        Self::ALL.iter().copied().find(|kind| kind.id() == id)
    }
}

/// One entity's readable state.
#[derive(Debug, Clone, Serialize)]
pub struct EntityState {
    pub id: &'static str,
    pub name: &'static str,

    /// Primary value: the shared cycle timestamp.
    pub value: String,

    pub attributes: Value,
}

impl EntityState {
    /// Project one entity from the cached snapshot and rotation state.
    pub fn project(
        kind: EntityKind,
        snapshot: &Snapshot,
        headlines: &HeadlineSet,
        rotation_index: usize,
    ) -> EntityState {
        let attributes = match kind {
            EntityKind::Headline => feed_attributes(&snapshot.headlines, &snapshot.last_update),
            EntityKind::FuelPrice => feed_attributes(&snapshot.fuel, &snapshot.last_update),
            EntityKind::ExchangeRate => feed_attributes(&snapshot.exchange, &snapshot.last_update),
            EntityKind::AirQuality => {
                feed_attributes(&snapshot.air_quality, &snapshot.last_update)
            }
            EntityKind::Ticker => {
                let view = TickerView::project(snapshot, headlines, rotation_index);
                serde_json::to_value(view).unwrap_or(Value::Null)
            }
        };

        EntityState {
            id: kind.id(),
            name: kind.label(),
            value: snapshot.last_update.clone(),
            attributes,
        }
    }
}

/// Attribute bag for one feed entity, always carrying an `update_time`.
fn feed_attributes(result: &FetchResult, last_update: &str) -> Value {
    let mut value = serde_json::to_value(result).unwrap_or(Value::Null);
    if let Value::Object(map) = &mut value {
        map.entry("update_time")
            .or_insert_with(|| Value::String(last_update.to_string()));
    }
    value
}
