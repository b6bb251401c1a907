//! Mock of the upstream API host for integration tests.
//!
//! Serves all four feed paths on a local ephemeral socket so the real
//! clients can be pointed at it via `with_base_url`. The answer mode can be
//! flipped mid-test and every request is counted.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tokio::net::TcpListener;

/// How the mock upstream answers.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum UpstreamMode {
    /// Four well-formed successful feeds.
    Ok,
    /// Like `Ok` but the headline list is empty.
    OkEmptyHeadlines,
    /// HTTP 500 on every path.
    HttpError,
    /// HTTP 200 with a non-JSON body.
    BadJson,
    /// HTTP 200 with an envelope whose `code` is not 200.
    RejectedCode,
}

#[derive(Clone)]
struct MockState {
    mode: Arc<Mutex<UpstreamMode>>,
    hits: Arc<AtomicUsize>,
    delay: Option<Duration>,
}

pub struct MockUpstream {
    pub base_url: String,
    mode: Arc<Mutex<UpstreamMode>>,
    hits: Arc<AtomicUsize>,
}

impl MockUpstream {
    /// Total requests served so far.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn set_mode(&self, mode: UpstreamMode) {
        *self.mode.lock().unwrap() = mode;
    }
}

pub async fn spawn_upstream(mode: UpstreamMode) -> MockUpstream {
    spawn_upstream_with_delay(mode, None).await
}

/// Spawn the mock with an artificial per-request delay, to keep a refresh
/// cycle in flight while a test issues more triggers.
pub async fn spawn_upstream_with_delay(
    mode: UpstreamMode,
    delay: Option<Duration>,
) -> MockUpstream {
    let mode = Arc::new(Mutex::new(mode));
    let hits = Arc::new(AtomicUsize::new(0));

    let state = MockState {
        mode: Arc::clone(&mode),
        hits: Arc::clone(&hits),
        delay,
    };
    let app = Router::new().fallback(respond).with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockUpstream {
        base_url: format!("http://{addr}"),
        mode,
        hits,
    }
}

async fn respond(State(state): State<MockState>, uri: Uri) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    if let Some(delay) = state.delay {
        tokio::time::sleep(delay).await;
    }

    let mode = *state.mode.lock().unwrap();
    match mode {
        UpstreamMode::HttpError => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        UpstreamMode::BadJson => "definitely not json".into_response(),
        UpstreamMode::RejectedCode => {
            Json(json!({"code": 250, "msg": "APIKEY错误"})).into_response()
        }
        UpstreamMode::Ok | UpstreamMode::OkEmptyHeadlines => {
            success_payload(uri.path(), mode == UpstreamMode::OkEmptyHeadlines)
        }
    }
}

fn success_payload(path: &str, empty_headlines: bool) -> Response {
    let body = match path {
        "/toutiaohot/index" => {
            let list = if empty_headlines {
                json!([])
            } else {
                json!([{"word": "第一条"}, {"word": "第二条"}, {"word": "第三条"}])
            };
            json!({"code": 200, "result": {"list": list}})
        }
        "/oilprice/index" => {
            json!({"code": 200, "result": {"p0": "7.01", "p92": "7.85", "p95": "8.37"}})
        }
        "/fxrate/index" => json!({"code": 200, "result": {"money": 712.34}}),
        "/aqi/index" => {
            json!({"code": 200, "result": {"quality": "良", "aqi": 64, "pm2_5": 32, "so2": 5}})
        }
        _ => return StatusCode::NOT_FOUND.into_response(),
    };

    Json(body).into_response()
}
