// Metrics endpoint

use crate::core::error::MonitoringError;
use crate::core::state::AppState;
use crate::utils::auth::verify_secret;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Deserialize)]
pub struct MetricsQuery {
    pub api_key: String,
}

/// Returns JSON with all server statistics including:
/// - Total requests, successful/failed counts, success rate
/// - Boards, participants, waiting students, active assignments
/// - Uptime and requests per second
///
/// Requires valid API key for authentication.
pub async fn metrics_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MetricsQuery>,
) -> Result<Response, MonitoringError> {
    if !verify_secret(&params.api_key, &state.config.admin.api_key) {
        warn!("Unauthorized metrics access attempt");
        return Err(MonitoringError::InvalidApiKey);
    }

    let snapshot = state.metrics.get_snapshot(&state.boards);

    Ok((StatusCode::OK, Json(snapshot)).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{AdminConfig, Config, LoggingConfig, QueueConfig, ServerConfig};
    use crate::metrics::collector::MetricsSnapshot;
    use crate::models::board::Board;
    use crate::wal::wal::Wal;
    use tempfile::TempDir;

    fn create_test_config() -> Config {
        Config {
            server: ServerConfig {
                port: Some(8080),
                unix_socket: None,
                num_threads: 4,
                max_connections: 1000,
            },
            queue: QueueConfig::default(),
            admin: AdminConfig {
                master_password: "test-master".to_string(),
                api_key: "test-api-key".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "json".to_string(),
                path: None,
                console: true,
            },
        }
    }

    fn create_test_state() -> Arc<AppState> {
        let temp_dir = TempDir::new().unwrap();
        let wal_path = temp_dir.path().join("test.wal");
        let wal = Wal::new(wal_path).unwrap();
        let config = create_test_config();

        Arc::new(AppState::new(config, wal))
    }

    #[tokio::test]
    async fn test_metrics_handler_success() {
        use axum::body::Body;
        use http_body_util::BodyExt;

        let state = create_test_state();
        state.metrics.increment_requests();
        state.metrics.increment_successful();

        let mut board = Board::new("Test".to_string(), "TEST1", "pw".to_string(), false);
        board.add_student("alice".to_string(), 0);
        state.boards.insert(board);

        let params = MetricsQuery {
            api_key: "test-api-key".to_string(),
        };

        let response = metrics_handler(State(state), Query(params)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let (_, body) = response.into_parts();
        let body = Body::new(body);
        let bytes = body.collect().await.unwrap().to_bytes();
        let snapshot: MetricsSnapshot = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(snapshot.total_requests, 1);
        assert_eq!(snapshot.boards, 1);
        assert_eq!(snapshot.participants, 1);
    }

    #[tokio::test]
    async fn test_metrics_handler_invalid_api_key() {
        let state = create_test_state();

        let params = MetricsQuery {
            api_key: "wrong-key".to_string(),
        };

        let result = metrics_handler(State(state), Query(params)).await;
        assert!(result.is_err());
        let response = result.unwrap_err().into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
