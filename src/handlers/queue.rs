// Queue endpoints: snapshot polling, enter/exit, instructor flags

use crate::core::error::QueueError;
use crate::core::state::AppState;
use crate::models::api::{SnapshotQuery, StudentIdRequest};
use crate::models::snapshot::QueueSnapshot;
use crate::utils::time::{current_timestamp, current_timestamp_millis};
use crate::validation::params::QueuePatch;
use crate::wal::wal::WalOperation;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Queue snapshot
///
/// GET /boards/{class_id}/queue?token=<token>
///
/// The polling endpoint. Anonymous polls take the read lock; a poll that
/// carries a token also refreshes that participant's heartbeat, which
/// needs the write lock. The heartbeat is coalesced so only one poll per
/// freshness window turns into a write.
pub async fn snapshot_handler(
    State(state): State<Arc<AppState>>,
    Path(class_id): Path<String>,
    Query(params): Query<SnapshotQuery>,
) -> Result<Response, QueueError> {
    state.metrics.increment_requests();

    let board = state.boards.get(&class_id).ok_or_else(|| {
        state.metrics.increment_failed();
        QueueError::NotFound("Board".to_string())
    })?;

    let snapshot = match params.token {
        Some(token) => {
            let now = current_timestamp();
            let mut board = board.write().unwrap();

            let window = state.config.queue.heartbeat_refresh;
            let refreshed = match board.find_by_token_mut(&token) {
                Some(p) => {
                    let id = p.id;
                    p.touch_heartbeat(now, window).then_some(id)
                }
                None => {
                    debug!(class_id = %class_id, "Snapshot poll with unknown token");
                    None
                }
            };

            if let Some(id) = refreshed {
                if let Err(e) = state.wal.log_operation(WalOperation::Heartbeat {
                    class_id: board.class_id.clone(),
                    id,
                    at: now,
                }) {
                    warn!(error = %e, "Failed to log heartbeat to WAL");
                }
            }

            QueueSnapshot::build(&board)
        }
        None => QueueSnapshot::build(&board.read().unwrap()),
    };

    state.metrics.increment_successful();
    Ok((StatusCode::OK, Json(snapshot)).into_response())
}

/// Enter the wait line
///
/// POST /boards/{class_id}/queue/enter with body `{ "student_id": n }`
///
/// Responds 200 with the resulting snapshot. Re-entering refreshes the
/// student's timestamp.
pub async fn enter_handler(
    State(state): State<Arc<AppState>>,
    Path(class_id): Path<String>,
    Json(request): Json<StudentIdRequest>,
) -> Result<Response, QueueError> {
    state.metrics.increment_requests();

    let board = state.boards.get(&class_id).ok_or_else(|| {
        state.metrics.increment_failed();
        QueueError::NotFound("Board".to_string())
    })?;

    // Millisecond timestamps keep two students who enter within the same
    // second in arrival order.
    let at = current_timestamp_millis();
    let now = current_timestamp();
    let snapshot = {
        let mut board = board.write().unwrap();

        board.try_enter(request.student_id, at).map_err(|e| {
            state.metrics.increment_failed();
            e
        })?;

        if board.touch_heartbeat(request.student_id, now, state.config.queue.heartbeat_refresh) {
            log_heartbeat(&state, &board.class_id, request.student_id, now);
        }

        // Logged under the board lock so replay order matches apply order
        if let Err(e) = state.wal.log_operation(WalOperation::Enter {
            class_id: board.class_id.clone(),
            student_id: request.student_id,
            at,
        }) {
            warn!(error = %e, "Failed to log enter to WAL");
        }

        QueueSnapshot::build(&board)
    };

    info!(
        class_id = %class_id.to_uppercase(),
        student_id = request.student_id,
        "Student entered queue"
    );
    state.metrics.increment_successful();

    Ok((StatusCode::OK, Json(snapshot)).into_response())
}

/// Leave the wait line
///
/// POST /boards/{class_id}/queue/exit with body `{ "student_id": n }`
///
/// Responds 200 with the resulting snapshot. Exiting while being helped
/// unwinds the pairing and backfills the TA.
pub async fn exit_handler(
    State(state): State<Arc<AppState>>,
    Path(class_id): Path<String>,
    Json(request): Json<StudentIdRequest>,
) -> Result<Response, QueueError> {
    state.metrics.increment_requests();

    let board = state.boards.get(&class_id).ok_or_else(|| {
        state.metrics.increment_failed();
        QueueError::NotFound("Board".to_string())
    })?;

    let now = current_timestamp();
    let snapshot = {
        let mut board = board.write().unwrap();

        board.try_exit(request.student_id).map_err(|e| {
            state.metrics.increment_failed();
            e
        })?;

        if board.touch_heartbeat(request.student_id, now, state.config.queue.heartbeat_refresh) {
            log_heartbeat(&state, &board.class_id, request.student_id, now);
        }

        if let Err(e) = state.wal.log_operation(WalOperation::Exit {
            class_id: board.class_id.clone(),
            student_id: request.student_id,
        }) {
            warn!(error = %e, "Failed to log exit to WAL");
        }

        QueueSnapshot::build(&board)
    };

    info!(
        class_id = %class_id.to_uppercase(),
        student_id = request.student_id,
        "Student exited queue"
    );
    state.metrics.increment_successful();

    Ok((StatusCode::OK, Json(snapshot)).into_response())
}

/// Instructor flags patch
///
/// PATCH /boards/{class_id}/queue with body `{ "active": bool, "frozen":
/// bool, "status": "text" }`, all fields optional.
///
/// Fields are validated before anything is applied; a non-boolean flag
/// yields a 422 with a per-field error map. Succeeds with 204.
pub async fn update_flags_handler(
    State(state): State<Arc<AppState>>,
    Path(class_id): Path<String>,
    Json(request): Json<QueuePatch>,
) -> Result<Response, QueueError> {
    state.metrics.increment_requests();

    let patch = request.validate().map_err(|errors| {
        state.metrics.increment_failed();
        QueueError::Validation(errors)
    })?;

    let board = state.boards.get(&class_id).ok_or_else(|| {
        state.metrics.increment_failed();
        QueueError::NotFound("Board".to_string())
    })?;

    {
        let mut board = board.write().unwrap();

        board.set_flags(patch).map_err(|e| {
            state.metrics.increment_failed();
            e
        })?;

        // The WAL stores the post-patch flags, so replay sets absolute
        // state instead of re-applying a partial patch.
        if let Err(e) = state.wal.log_operation(WalOperation::SetFlags {
            class_id: board.class_id.clone(),
            active: board.active,
            frozen: board.frozen,
            status: board.status.clone(),
        }) {
            warn!(error = %e, "Failed to log flags change to WAL");
        }

        info!(
            class_id = %board.class_id,
            active = board.active,
            frozen = board.frozen,
            "Queue flags updated"
        );
    }

    state.metrics.increment_successful();
    Ok(StatusCode::NO_CONTENT.into_response())
}

fn log_heartbeat(state: &AppState, class_id: &str, id: u64, at: i64) {
    if let Err(e) = state.wal.log_operation(WalOperation::Heartbeat {
        class_id: class_id.to_string(),
        id,
        at,
    }) {
        warn!(error = %e, "Failed to log heartbeat to WAL");
    }
}
