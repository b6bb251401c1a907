//! Pulseboard - a realtime information board over four upstream feeds.
//!
//! # Overview
//!
//! Pulseboard periodically polls four endpoints of one upstream API host
//! (trending headlines, regional fuel price, USD→CNY exchange rate, city air
//! quality), normalizes each response into a display-friendly record, and
//! keeps the aggregate in an in-memory cache. A fast "ticker" rotation cycles
//! through the cached headlines between network refreshes without touching
//! the network.
//!
//! # Update model
//!
//! Two independent timers drive the board:
//!
//! - A wall-clock schedule (07:00 and 16:00 local by default, or a fixed
//!   interval in the legacy mode) triggers a full refresh cycle: all four
//!   feeds are fetched concurrently and the cache is replaced in one step.
//! - A fast interval advances the headline rotation pointer over the cached
//!   headline set and performs no I/O.
//!
//! # Modules
//!
//! - [`model`]: Cached data model and the ticker projection
//! - [`data_sources`]: Clients for the four upstream endpoints
//! - [`config`]: Coordinator configuration and bounds
//! - [`coordinator`]: Refresh cycles, rotation state, and reads
//! - [`scheduler`]: Interval and daily wall-clock trigger primitives
//! - [`entity`]: The five host-facing entities
//! - [`api`]: HTTP API handlers

pub mod api;
pub mod config;
pub mod coordinator;
pub mod data_sources;
pub mod entity;
pub mod error;
pub mod model;
pub mod scheduler;
