//! HTTP facade for the chaos metrics service.
//!
//! Thin, stateless request/response layer over the engine: bridges POST
//! events in, dashboards read the score back out. All interesting logic
//! lives in `chaos-engine`; handlers here only translate payloads and
//! pick status codes.

pub mod api;
pub mod tasks;

use std::convert::Infallible;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use chaos_engine::{
    round1, ChaosEngine, Clock, EngineConfig, EventLog, LockStore, MetricsSource, MetricsState,
    RollupStore,
};
use chaos_events::{Event, EventKind};
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

use crate::api::{EventRequest, EventResponse, HistoryQuery, MetricsResponse};

/// Shared application state injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub metrics: Arc<Mutex<MetricsState>>,
    pub log: Arc<Mutex<EventLog>>,
    pub rollups: Arc<Mutex<RollupStore>>,
    pub engine: Arc<ChaosEngine>,
    pub clock: Clock,
}

impl AppState {
    /// Wires up the state graph: the engine reads the same metrics state
    /// the ingestion path writes.
    pub fn new(
        config: &EngineConfig,
        source: Arc<dyn MetricsSource>,
        lock: Arc<dyn LockStore>,
        log: EventLog,
        rollups: RollupStore,
        clock: Clock,
    ) -> Self {
        let metrics = Arc::new(Mutex::new(MetricsState::new(&config.windows)));
        let engine = Arc::new(ChaosEngine::new(
            config.weights.clone(),
            metrics.clone(),
            source,
            lock,
        ));
        Self {
            metrics,
            log: Arc::new(Mutex::new(log)),
            rollups: Arc::new(Mutex::new(rollups)),
            engine,
            clock,
        }
    }
}

fn with_state(
    state: AppState,
) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

/// Builds the full route tree, including rejection recovery.
pub fn routes(
    state: AppState,
) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    let dashboard = warp::get()
        .and(warp::path::end())
        .map(|| warp::reply::html(DASHBOARD_HTML));

    let post_event = warp::post()
        .and(warp::path!("api" / "event"))
        .and(warp::body::json())
        .and(with_state(state.clone()))
        .map(handle_event);

    let get_metrics = warp::get()
        .and(warp::path!("api" / "metrics"))
        .and(with_state(state.clone()))
        .map(handle_metrics);

    let get_history = warp::get()
        .and(warp::path!("api" / "history"))
        .and(warp::query::<HistoryQuery>())
        .and(with_state(state.clone()))
        .map(handle_history);

    let get_leaderboard = warp::get()
        .and(warp::path!("api" / "leaderboard"))
        .and(with_state(state))
        .map(handle_leaderboard);

    dashboard
        .or(post_event)
        .or(get_metrics)
        .or(get_history)
        .or(get_leaderboard)
        .recover(handle_rejection)
}

fn handle_event(req: EventRequest, state: AppState) -> warp::reply::WithStatus<warp::reply::Json> {
    if req.kind.trim().is_empty() {
        return warp::reply::with_status(
            warp::reply::json(&EventResponse::err("missing event type")),
            StatusCode::BAD_REQUEST,
        );
    }

    let now = state.clock.now();
    // Infallible: unknown kinds land in `EventKind::Other`.
    let kind = EventKind::from_str(&req.kind).unwrap_or(EventKind::Other(req.kind.clone()));
    let event = Event::new(
        now,
        kind,
        req.value.unwrap_or(1),
        req.details.unwrap_or_default(),
    );

    // Storage failures abort before the live counters move.
    if let Err(e) = state.log.lock().unwrap().append(&event) {
        tracing::error!("Event append failed: {}", e);
        return warp::reply::with_status(
            warp::reply::json(&EventResponse::err(format!("storage failure: {}", e))),
            StatusCode::INTERNAL_SERVER_ERROR,
        );
    }

    state.metrics.lock().unwrap().apply(&event);

    let score = state.engine.raw_score(now);
    warp::reply::with_status(
        warp::reply::json(&EventResponse::ok(round1(score))),
        StatusCode::OK,
    )
}

fn handle_metrics(state: AppState) -> warp::reply::Json {
    let now = state.clock.now();
    let reading = state.engine.evaluate(now);
    let last_updated = state
        .metrics
        .lock()
        .unwrap()
        .last_updated
        .unwrap_or(now)
        .to_rfc3339();
    warp::reply::json(&MetricsResponse::from_reading(reading, last_updated))
}

fn handle_history(query: HistoryQuery, state: AppState) -> warp::reply::Json {
    let now = state.clock.now();
    let hours = query.hours.unwrap_or(24).max(0);
    let rows = state.rollups.lock().unwrap().recent(now, hours);
    warp::reply::json(&rows)
}

fn handle_leaderboard(state: AppState) -> warp::reply::Json {
    let rows = state.rollups.lock().unwrap().leaderboard(10);
    warp::reply::json(&rows)
}

/// Maps rejections to JSON error responses. Malformed bodies are client
/// errors and never reach the engine.
async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (status, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "not found".to_string())
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, format!("malformed request body: {}", e))
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "method not allowed".to_string())
    } else {
        tracing::error!("Unhandled rejection: {:?}", err);
        (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
    };

    Ok(warp::reply::with_status(
        warp::reply::json(&EventResponse::err(message)),
        status,
    ))
}

/// Minimal status page. Real dashboards talk to the JSON API.
const DASHBOARD_HTML: &str = r#"<html><head><title>Chaosmeter</title>
<style>body{background:#121212;color:#eee;font-family:sans-serif;text-align:center;padding-top:4em;}
#score{font-size:5em;} #status{font-size:1.5em;color:#8ab4f8;}</style></head>
<body><h1>Chaosmeter</h1><div id="score">...</div><div id="status"></div>
<script>
async function refresh(){
  const r = await fetch('/api/metrics');
  const m = await r.json();
  document.getElementById('score').textContent = m.chaos_score;
  document.getElementById('status').textContent = m.status;
}
refresh(); setInterval(refresh, 5000);
</script></body></html>
"#;
