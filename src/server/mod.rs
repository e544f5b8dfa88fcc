//! HTTP surface for the chart frontend.
//!
//! Handlers are thin: they validate query parameters, hand the blocking
//! pipeline to the blocking thread pool and map [`AppError`] onto status codes.

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::http::{HeaderName, HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::data::{MatchSource, PlayerDirectory};
use crate::domain::TrendConfig;
use crate::error::AppError;
use crate::io::ObservationSink;

pub mod handlers;

/// Immutable state shared by all requests.
pub struct AppState {
    pub config: TrendConfig,
    pub matches: Arc<dyn MatchSource>,
    pub players: Arc<dyn PlayerDirectory>,
    pub sink: Arc<dyn ObservationSink>,
}

pub fn router(state: Arc<AppState>) -> Result<Router, AppError> {
    let cors = cors_layer(&state.config.cors_origins)?;
    Ok(Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/get_player_data", get(handlers::player_data))
        .route("/find_player", get(handlers::find_player))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

pub async fn serve(state: Arc<AppState>) -> Result<(), AppError> {
    let addr = state.config.bind_addr.clone();
    let app = router(state)?;

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::config(format!("Failed to bind {addr}: {e}")))?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::config(format!("Server error: {e}")))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

fn cors_layer(origins: &[String]) -> Result<CorsLayer, AppError> {
    if origins.iter().any(|o| o == "*") {
        return Err(AppError::config(
            "wildcard origin '*' is not allowed with credentials; list origins explicitly",
        ));
    }
    let origins = origins
        .iter()
        .map(|o| {
            HeaderValue::from_str(o).map_err(|e| AppError::config(format!("Invalid CORS origin '{o}': {e}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::HEAD, Method::POST])
        .allow_headers([
            header::ORIGIN,
            header::ACCEPT,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-requested-with"),
        ]))
}

pub fn status_for(err: &AppError) -> StatusCode {
    match err {
        AppError::Validation(_) => StatusCode::BAD_REQUEST,
        AppError::NotFound(_) => StatusCode::NOT_FOUND,
        AppError::Upstream(_)
        | AppError::Persistence(_)
        | AppError::Config(_)
        | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::info!(error = %self, %status, "request rejected");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;
    use crate::data::{GamesPage, GamesQuery};
    use crate::domain::{PlayerSummary, TrendResponse};
    use crate::fetch::tests::{ScriptedSource, game, page, participant};
    use crate::io::NullSink;

    struct StaticDirectory(Vec<PlayerSummary>);

    impl PlayerDirectory for StaticDirectory {
        fn search_players(&self, _query: &str, _page: u32) -> Result<Vec<PlayerSummary>, AppError> {
            Ok(self.0.clone())
        }
    }

    struct DownDirectory;

    impl PlayerDirectory for DownDirectory {
        fn search_players(&self, _query: &str, _page: u32) -> Result<Vec<PlayerSummary>, AppError> {
            Err(AppError::upstream("search unavailable"))
        }
    }

    struct DownSource;

    impl MatchSource for DownSource {
        fn games_page(&self, _query: &GamesQuery<'_>) -> Result<GamesPage, AppError> {
            Err(AppError::upstream("history unavailable"))
        }
    }

    fn config() -> TrendConfig {
        TrendConfig {
            season_start: 0.0,
            data_dir: PathBuf::from("."),
            base_url: "http://unused".to_string(),
            max_pages: Some(5),
            upstream_timeout: Duration::from_secs(1),
            strict_dump: false,
            bind_addr: "127.0.0.1:0".to_string(),
            cors_origins: vec!["http://localhost:3000".to_string()],
        }
    }

    fn app(matches: ScriptedSource, players: Arc<dyn PlayerDirectory>) -> Router {
        router(Arc::new(AppState {
            config: config(),
            matches: Arc::new(matches),
            players,
            sink: Arc::new(NullSink),
        }))
        .unwrap()
    }

    fn one_game_source() -> ScriptedSource {
        ScriptedSource::new(vec![page(
            50,
            vec![game(1_700_000_000, "rm_1v1", vec![vec![participant(1, "me", Some(1450.0))]])],
        )])
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn player_data_returns_series_and_zeroed_trend_fields() {
        let app = app(one_game_source(), Arc::new(StaticDirectory(Vec::new())));
        let (status, body) = get(app, "/get_player_data?playerID=1&gameType=rm_solo&predictionLimit=7").await;

        assert_eq!(status, StatusCode::OK);
        let body: TrendResponse = serde_json::from_value(body).unwrap();
        assert_eq!(body.player_id, 1);
        assert_eq!(body.player_name, "me");
        assert_eq!(body.dates.len(), 2);
        assert_eq!(body.dates[0], 1_700_000_000.0);
        assert_eq!(body.ratings, vec![1450.0, 1450.0]);
        assert_eq!(body.slope, 0.0);
    }

    #[tokio::test]
    async fn non_numeric_player_id_is_bad_request() {
        let app = app(one_game_source(), Arc::new(StaticDirectory(Vec::new())));
        let (status, body) = get(app, "/get_player_data?playerID=abc&gameType=rm_solo&predictionLimit=7").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("playerID"));
    }

    #[tokio::test]
    async fn missing_parameter_is_bad_request() {
        for uri in [
            "/get_player_data?gameType=rm_solo&predictionLimit=7",
            "/get_player_data?playerID=1&predictionLimit=7",
            "/get_player_data?playerID=1&gameType=rm_solo",
            "/get_player_data?playerID=&gameType=rm_solo&predictionLimit=7",
        ] {
            let app = app(one_game_source(), Arc::new(StaticDirectory(Vec::new())));
            let (status, _) = get(app, uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        }
    }

    #[tokio::test]
    async fn empty_history_is_not_found() {
        let app = app(ScriptedSource::new(Vec::new()), Arc::new(StaticDirectory(Vec::new())));
        let (status, body) = get(app, "/get_player_data?playerID=1&gameType=rm_solo&predictionLimit=7").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "No data available");
    }

    #[tokio::test]
    async fn find_player_filters_and_requires_query() {
        let players = vec![
            PlayerSummary {
                name: "fresh".to_string(),
                profile_id: 1,
                last_game_at: chrono::Utc::now().to_rfc3339(),
                leaderboards: Default::default(),
            },
            PlayerSummary {
                name: "retired".to_string(),
                profile_id: 2,
                last_game_at: "2020-01-01T00:00:00Z".to_string(),
                leaderboards: Default::default(),
            },
        ];

        let (status, body) = get(
            app(one_game_source(), Arc::new(StaticDirectory(players.clone()))),
            "/find_player?query=fre",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let hits: Vec<PlayerSummary> = serde_json::from_value(body).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "fresh");

        let (status, _) = get(app(one_game_source(), Arc::new(StaticDirectory(players))), "/find_player").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn search_upstream_failure_is_server_error() {
        let (status, _) = get(app(one_game_source(), Arc::new(DownDirectory)), "/find_player?query=x").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn history_upstream_failure_is_server_error() {
        let app = router(Arc::new(AppState {
            config: config(),
            matches: Arc::new(DownSource),
            players: Arc::new(StaticDirectory(Vec::new())),
            sink: Arc::new(NullSink),
        }))
        .unwrap();
        let (status, body) = get(app, "/get_player_data?playerID=1&gameType=rm_solo&predictionLimit=7").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("history unavailable"));
    }

    #[tokio::test]
    async fn cors_allows_configured_origin() {
        let app = app(one_game_source(), Arc::new(StaticDirectory(Vec::new())));
        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header(header::ORIGIN, "http://localhost:3000")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "http://localhost:3000"
        );
        assert_eq!(
            resp.headers().get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
            "true"
        );
    }

    #[test]
    fn invalid_origin_is_config_error() {
        let err = cors_layer(&["bad\norigin".to_string()]).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn wildcard_origin_is_config_error() {
        let err = cors_layer(&["http://localhost:3000".to_string(), "*".to_string()]).unwrap_err();
        assert!(matches!(err, AppError::Config(ref m) if m.contains("wildcard")));

        let mut config = config();
        config.cors_origins = vec!["*".to_string()];
        let built = router(Arc::new(AppState {
            config,
            matches: Arc::new(DownSource),
            players: Arc::new(StaticDirectory(Vec::new())),
            sink: Arc::new(NullSink),
        }));
        assert!(matches!(built, Err(AppError::Config(_))));
    }

    #[test]
    fn status_mapping_covers_every_class() {
        assert_eq!(status_for(&AppError::validation("x")), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(&AppError::not_found("x")), StatusCode::NOT_FOUND);
        assert_eq!(status_for(&AppError::upstream("x")), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status_for(&AppError::Persistence("x".into())), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status_for(&AppError::config("x")), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status_for(&AppError::internal("x")), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
