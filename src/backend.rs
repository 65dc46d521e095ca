use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::{
    cmp::Ordering,
    path::{Path, PathBuf},
    sync::atomic::{AtomicU64, Ordering as AtomicOrdering},
    sync::Arc,
    time::{Instant, SystemTime, UNIX_EPOCH},
};
use tower_http::services::{ServeDir, ServeFile};

use crate::content;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_STATIC_DIR: &str = "dist";
const DEFAULT_ASSET_MAX_AGE_SECONDS: u64 = 3_600;
const DEFAULT_LOG_LEVEL: LogLevel = LogLevel::Info;

const ASSET_MAX_AGE_SECONDS_BOUNDS: (u64, u64) = (0, 7 * 24 * 60 * 60);
const IMMUTABLE_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";
const BUNDLE_HASH_LEN: usize = 16;
const REQUEST_ID_HEADER: &str = "x-request-id";

static REQUEST_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LogLevel {
    Debug,
    Info,
    Warn,
}

impl PartialOrd for LogLevel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LogLevel {
    fn cmp(&self, other: &Self) -> Ordering {
        fn rank(level: LogLevel) -> u8 {
            match level {
                LogLevel::Debug => 0,
                LogLevel::Info => 1,
                LogLevel::Warn => 2,
            }
        }

        rank(*self).cmp(&rank(*other))
    }
}

impl LogLevel {
    fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
        }
    }
}

#[derive(Clone, Debug)]
struct ServerConfig {
    port: u16,
    static_dir: PathBuf,
    asset_max_age_seconds: u64,
    log_level: LogLevel,
}

impl ServerConfig {
    fn from_env() -> Self {
        let port = parse_env_non_empty_string("PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);
        let static_dir = parse_env_non_empty_string("STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR));
        let asset_max_age_seconds = parse_u64_with_bounds(
            parse_env_non_empty_string("ASSET_MAX_AGE_SECONDS").as_deref(),
            DEFAULT_ASSET_MAX_AGE_SECONDS,
            ASSET_MAX_AGE_SECONDS_BOUNDS,
        );
        let log_level = parse_log_level(
            parse_env_non_empty_string("LOG_LEVEL").as_deref(),
            DEFAULT_LOG_LEVEL,
        );

        Self {
            port,
            static_dir,
            asset_max_age_seconds,
            log_level,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    config: Arc<ServerConfig>,
}

#[derive(Serialize)]
struct HealthPayload {
    ok: bool,
}

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env();
    audit_static_assets(&config);

    let bind_address = format!("0.0.0.0:{}", config.port);
    let state = AppState {
        config: Arc::new(config),
    };
    let app = router(state.clone());

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    log_event(
        &state.config,
        LogLevel::Info,
        "server_listening",
        serde_json::json!({
            "address": bind_address,
            "static_dir": state.config.static_dir.display().to_string(),
        }),
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state))
        .await?;
    Ok(())
}

fn router(state: AppState) -> Router {
    let static_dir = state.config.static_dir.clone();
    let static_service =
        ServeDir::new(&static_dir).fallback(ServeFile::new(static_dir.join("index.html")));

    Router::new()
        .route("/healthz", get(health))
        .fallback_service(static_service)
        .layer(middleware::from_fn_with_state(state.clone(), track_request))
        .with_state(state)
}

async fn shutdown_signal(state: AppState) {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
    log_event(&state.config, LogLevel::Info, "server_shutdown", serde_json::json!({}));
}

async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CACHE_CONTROL, HeaderValue::from_static("no-store"))],
        Json(HealthPayload { ok: true }),
    )
}

async fn track_request(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let started_at = Instant::now();
    let request_id = resolve_request_id(request.headers());
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let mut response = next.run(request).await;
    let status = response.status();
    let headers = response.headers_mut();

    if let Ok(request_id_header) = HeaderValue::from_str(&request_id) {
        headers.insert(REQUEST_ID_HEADER, request_id_header);
    }

    if !headers.contains_key(header::CACHE_CONTROL) {
        let policy = if status.is_success() {
            cache_policy_for_path(&path, state.config.asset_max_age_seconds)
        } else {
            "no-store".to_string()
        };
        headers.insert(header::CACHE_CONTROL, cache_control(&policy));
    }

    log_event(
        &state.config,
        LogLevel::Info,
        "request_complete",
        serde_json::json!({
            "request_id": request_id.as_str(),
            "method": method.as_str(),
            "path": path,
            "status": status.as_u16(),
            "duration_ms": started_at.elapsed().as_millis(),
        }),
    );

    response
}

fn cache_control(value: &str) -> HeaderValue {
    HeaderValue::from_str(value).unwrap_or_else(|_| HeaderValue::from_static("no-store"))
}

fn cache_policy_for_path(path: &str, max_age_seconds: u64) -> String {
    let file_name = path.rsplit('/').next().unwrap_or_default();

    // Extension-less paths fall through to index.html.
    if file_name.is_empty() || file_name.ends_with(".html") || !file_name.contains('.') {
        return "no-cache".to_string();
    }

    if is_hashed_bundle_name(file_name) {
        return IMMUTABLE_CACHE_CONTROL.to_string();
    }

    if max_age_seconds == 0 {
        "no-cache".to_string()
    } else {
        format!("public, max-age={max_age_seconds}")
    }
}

fn is_hashed_bundle_name(file_name: &str) -> bool {
    let stem = file_name.split('.').next().unwrap_or_default();
    let stem = stem.strip_suffix("_bg").unwrap_or(stem);

    stem.rsplit_once('-')
        .map(|(_, hash)| {
            hash.len() == BUNDLE_HASH_LEN && hash.chars().all(|ch| ch.is_ascii_hexdigit())
        })
        .unwrap_or(false)
}

fn audit_static_assets(config: &ServerConfig) {
    let expected = content::local_asset_paths();
    let missing = missing_assets(&config.static_dir, &expected);

    for path in &missing {
        log_event(
            config,
            LogLevel::Warn,
            "asset_missing",
            serde_json::json!({ "path": path }),
        );
    }

    log_event(
        config,
        LogLevel::Info,
        "asset_audit_complete",
        serde_json::json!({
            "checked": expected.len(),
            "missing": missing.len(),
        }),
    );
}

fn missing_assets(root: &Path, site_paths: &[&str]) -> Vec<String> {
    site_paths
        .iter()
        .filter(|site_path| !root.join(site_path.trim_start_matches('/')).is_file())
        .map(|site_path| site_path.to_string())
        .collect()
}

fn parse_u64_with_bounds(value: Option<&str>, default: u64, bounds: (u64, u64)) -> u64 {
    value
        .and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| (bounds.0..=bounds.1).contains(value))
        .unwrap_or(default)
}

fn parse_env_non_empty_string(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_log_level(value: Option<&str>, default: LogLevel) -> LogLevel {
    match value.map(str::to_ascii_lowercase).as_deref() {
        Some("debug") => LogLevel::Debug,
        Some("info") => LogLevel::Info,
        Some("warn") => LogLevel::Warn,
        _ => default,
    }
}

fn now_unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|value| value.as_millis())
        .unwrap_or(0)
}

fn now_unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|value| value.as_secs())
        .unwrap_or(0)
}

fn generate_request_id() -> String {
    let counter = REQUEST_ID_COUNTER.fetch_add(1, AtomicOrdering::Relaxed);
    format!("req-{}-{counter}", now_unix_millis())
}

fn resolve_request_id(headers: &HeaderMap) -> String {
    let value = headers
        .get(REQUEST_ID_HEADER)
        .and_then(|raw| raw.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string);

    value.unwrap_or_else(generate_request_id)
}

fn log_event(config: &ServerConfig, level: LogLevel, event: &str, fields: serde_json::Value) {
    if level < config.log_level {
        return;
    }

    let mut payload = serde_json::Map::new();
    payload.insert(
        "ts".to_string(),
        serde_json::Value::Number(serde_json::Number::from(now_unix_seconds())),
    );
    payload.insert("level".to_string(), serde_json::Value::String(level.as_str().to_string()));
    payload.insert("event".to_string(), serde_json::Value::String(event.to_string()));

    if let serde_json::Value::Object(extra) = fields {
        for (key, value) in extra {
            payload.insert(key, value);
        }
    }

    println!("{}", serde_json::Value::Object(payload));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn test_config(static_dir: PathBuf) -> ServerConfig {
        ServerConfig {
            port: 0,
            static_dir,
            asset_max_age_seconds: DEFAULT_ASSET_MAX_AGE_SECONDS,
            log_level: LogLevel::Warn,
        }
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("folio-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).expect("scratch dir is writable");
        dir
    }

    async fn raw_get(app: Router, path: &str, extra_headers: &str) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("ephemeral port binds");
        let address = listener.local_addr().expect("bound address");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let mut stream = tokio::net::TcpStream::connect(address)
            .await
            .expect("server accepts");
        let request =
            format!("GET {path} HTTP/1.1\r\nHost: localhost\r\n{extra_headers}Connection: close\r\n\r\n");
        stream
            .write_all(request.as_bytes())
            .await
            .expect("request is written");

        let mut response = Vec::new();
        stream
            .read_to_end(&mut response)
            .await
            .expect("response is read");
        String::from_utf8_lossy(&response).to_string()
    }

    #[test]
    fn log_levels_are_ordered() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warn);
    }

    #[test]
    fn log_level_parsing_falls_back_to_default() {
        assert_eq!(parse_log_level(Some("WARN"), LogLevel::Info), LogLevel::Warn);
        assert_eq!(parse_log_level(Some("debug"), LogLevel::Info), LogLevel::Debug);
        assert_eq!(parse_log_level(Some("loud"), LogLevel::Info), LogLevel::Info);
        assert_eq!(parse_log_level(None, LogLevel::Warn), LogLevel::Warn);
    }

    #[test]
    fn bounded_parse_rejects_out_of_range_values() {
        let bounds = ASSET_MAX_AGE_SECONDS_BOUNDS;
        assert_eq!(parse_u64_with_bounds(Some(" 120 "), 10, bounds), 120);
        assert_eq!(parse_u64_with_bounds(Some("99999999"), 10, bounds), 10);
        assert_eq!(parse_u64_with_bounds(Some("-1"), 10, bounds), 10);
        assert_eq!(parse_u64_with_bounds(None, 10, bounds), 10);
    }

    #[test]
    fn request_id_is_propagated_or_generated() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("  upstream-7 "));
        assert_eq!(resolve_request_id(&headers), "upstream-7");

        let generated = resolve_request_id(&HeaderMap::new());
        assert!(generated.starts_with("req-"));
        assert_ne!(generated, resolve_request_id(&HeaderMap::new()));
    }

    #[test]
    fn hashed_bundles_are_immutable() {
        assert!(is_hashed_bundle_name("folio-0123456789abcdef_bg.wasm"));
        assert!(is_hashed_bundle_name("styles-fedcba9876543210.css"));
        assert!(!is_hashed_bundle_name("tidewatch.svg"));
        assert!(!is_hashed_bundle_name("hero-model.obj"));

        assert_eq!(
            cache_policy_for_path("/folio-0123456789abcdef.js", 60),
            IMMUTABLE_CACHE_CONTROL
        );
    }

    #[test]
    fn documents_are_revalidated_and_assets_use_max_age() {
        assert_eq!(cache_policy_for_path("/", 60), "no-cache");
        assert_eq!(cache_policy_for_path("/index.html", 60), "no-cache");
        assert_eq!(cache_policy_for_path("/projects", 60), "no-cache");
        assert_eq!(cache_policy_for_path("/previews/gridline.svg", 60), "public, max-age=60");
        assert_eq!(cache_policy_for_path("/resume.pdf", 0), "no-cache");
    }

    #[test]
    fn audit_reports_only_missing_assets() {
        let root = scratch_dir("audit");
        fs::create_dir_all(root.join("previews")).expect("previews dir");
        fs::write(root.join("previews/tidewatch.svg"), "<svg/>").expect("asset written");

        let missing = missing_assets(&root, &["/previews/tidewatch.svg", "/resume.pdf"]);
        assert_eq!(missing, vec!["/resume.pdf".to_string()]);

        let _ = fs::remove_dir_all(root);
    }

    #[tokio::test]
    async fn health_endpoint_echoes_request_id() {
        let state = AppState {
            config: Arc::new(test_config(scratch_dir("health"))),
        };

        let response = raw_get(router(state), "/healthz", "x-request-id: probe-1\r\n").await;

        assert!(response.starts_with("HTTP/1.1 200 OK"), "{response}");
        assert!(response.contains("x-request-id: probe-1"));
        assert!(response.contains("cache-control: no-store"));
        assert!(response.contains("{\"ok\":true}"));
    }

    #[tokio::test]
    async fn static_assets_get_cache_headers() {
        let root = scratch_dir("static");
        fs::create_dir_all(root.join("previews")).expect("previews dir");
        fs::write(root.join("index.html"), "<!doctype html>").expect("index written");
        fs::write(root.join("previews/cadence.svg"), "<svg/>").expect("asset written");
        let state = AppState {
            config: Arc::new(test_config(root.clone())),
        };

        let response = raw_get(router(state), "/previews/cadence.svg", "").await;

        assert!(response.starts_with("HTTP/1.1 200 OK"), "{response}");
        assert!(response.contains("cache-control: public, max-age=3600"));
        assert!(response.contains("x-request-id: req-"));

        let _ = fs::remove_dir_all(root);
    }

    #[tokio::test]
    async fn unknown_paths_serve_index_document() {
        let root = scratch_dir("fallback");
        fs::write(root.join("index.html"), "<!doctype html><div id=\"app\"></div>")
            .expect("index written");
        let state = AppState {
            config: Arc::new(test_config(root.clone())),
        };

        let response = raw_get(router(state), "/work/tidewatch", "").await;

        assert!(response.starts_with("HTTP/1.1 200 OK"), "{response}");
        assert!(response.contains("cache-control: no-cache"));
        assert!(response.contains("<div id=\"app\"></div>"));

        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn shipped_static_tree_passes_audit() {
        let static_root = Path::new(env!("CARGO_MANIFEST_DIR")).join("static");
        let expected = content::local_asset_paths();
        assert!(missing_assets(&static_root, &expected).is_empty());
    }
}
