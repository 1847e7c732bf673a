// TA join/leave and accept/release endpoints

use crate::core::error::QueueError;
use crate::core::state::AppState;
use crate::models::api::{JoinRequest, JoinResponse, StudentIdRequest, SuccessResponse};
use crate::models::snapshot::{QueueSnapshot, TaView};
use crate::utils::auth::verify_secret;
use crate::utils::time::current_timestamp;
use crate::validation::params::{validate_username, ValidationErrors};
use crate::wal::wal::{ParticipantRole, WalOperation};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::{info, warn};

/// TA sign-in
///
/// POST /boards/{class_id}/tas
pub async fn join_handler(
    State(state): State<Arc<AppState>>,
    Path(class_id): Path<String>,
    Json(request): Json<JoinRequest>,
) -> Result<Response, QueueError> {
    state.metrics.increment_requests();

    validate_username(
        &request.username,
        state.config.queue.max_username_len,
        &state.config.queue.reserved_usernames,
    )
    .map_err(|errors| {
        state.metrics.increment_failed();
        QueueError::Validation(errors)
    })?;

    let board = state.boards.get(&class_id).ok_or_else(|| {
        state.metrics.increment_failed();
        QueueError::NotFound("Board".to_string())
    })?;

    let now = current_timestamp();
    let (id, username, token) = {
        let mut board = board.write().unwrap();

        if !board.active {
            state.metrics.increment_failed();
            return Err(QueueError::QueueInactive);
        }

        if !verify_secret(&request.password, &board.password) {
            warn!(class_id = %board.class_id, "Invalid board password on TA join");
            state.metrics.increment_failed();
            return Err(QueueError::InvalidPassword);
        }

        if board.participant_count() >= state.config.queue.max_participants_per_board {
            state.metrics.increment_failed();
            return Err(QueueError::Validation(ValidationErrors::single(
                "base",
                "board is at capacity",
            )));
        }

        let ta = board.add_ta(request.username, now);
        let id = ta.id;
        let username = ta.username.clone();
        let token = ta.token.clone();
        let last_heartbeat = ta.last_heartbeat;

        // Logged under the board lock so replay order matches apply order
        if let Err(e) = state.wal.log_operation(WalOperation::AddParticipant {
            class_id: board.class_id.clone(),
            id,
            role: ParticipantRole::Ta,
            username: username.clone(),
            token: token.clone(),
            last_heartbeat,
        }) {
            warn!(error = %e, "Failed to log TA join to WAL");
        }

        (id, username, token)
    };

    info!(class_id = %class_id.to_uppercase(), ta_id = id, "TA joined board");
    state.metrics.increment_successful();

    Ok((
        StatusCode::CREATED,
        Json(JoinResponse {
            id,
            username,
            token,
        }),
    )
        .into_response())
}

/// TA sign-out
///
/// DELETE /boards/{class_id}/tas/{id}
///
/// Any student the TA was helping rejoins the line at their original
/// position before the TA row is removed.
pub async fn leave_handler(
    State(state): State<Arc<AppState>>,
    Path((class_id, id)): Path<(String, u64)>,
) -> Result<Response, QueueError> {
    state.metrics.increment_requests();

    let board = state.boards.get(&class_id).ok_or_else(|| {
        state.metrics.increment_failed();
        QueueError::NotFound("Board".to_string())
    })?;

    {
        let mut board = board.write().unwrap();

        match board.get(id) {
            Some(p) if p.is_ta() => {}
            _ => {
                state.metrics.increment_failed();
                return Err(QueueError::NotFound("TA".to_string()));
            }
        }

        board.remove_participant(id).map_err(|e| {
            state.metrics.increment_failed();
            e
        })?;

        if let Err(e) = state.wal.log_operation(WalOperation::RemoveParticipant {
            class_id: board.class_id.clone(),
            id,
        }) {
            warn!(error = %e, "Failed to log TA leave to WAL");
        }
    }

    info!(class_id = %class_id.to_uppercase(), ta_id = id, "TA left board");
    state.metrics.increment_successful();

    Ok((
        StatusCode::OK,
        Json(SuccessResponse {
            success: true,
            message: "TA removed".to_string(),
        }),
    )
        .into_response())
}

/// Accept a waiting student
///
/// POST /boards/{class_id}/tas/{id}/accept with body `{ "student_id": n }`
///
/// Responds 200 with the updated TA view. Rejected with 422 when the
/// student is not waiting or is held by another TA.
pub async fn accept_handler(
    State(state): State<Arc<AppState>>,
    Path((class_id, ta_id)): Path<(String, u64)>,
    Json(request): Json<StudentIdRequest>,
) -> Result<Response, QueueError> {
    state.metrics.increment_requests();

    let board = state.boards.get(&class_id).ok_or_else(|| {
        state.metrics.increment_failed();
        QueueError::NotFound("Board".to_string())
    })?;

    let now = current_timestamp();
    let view = {
        let mut board = board.write().unwrap();

        if !board.active {
            state.metrics.increment_failed();
            return Err(QueueError::QueueInactive);
        }

        board.accept(ta_id, request.student_id).map_err(|e| {
            state.metrics.increment_failed();
            e
        })?;

        if board.touch_heartbeat(ta_id, now, state.config.queue.heartbeat_refresh) {
            log_heartbeat(&state, &board.class_id, ta_id, now);
        }

        // Logged under the board lock so replay order matches apply order
        if let Err(e) = state.wal.log_operation(WalOperation::Accept {
            class_id: board.class_id.clone(),
            ta_id,
            student_id: request.student_id,
        }) {
            warn!(error = %e, "Failed to log accept to WAL");
        }

        ta_view(&board, ta_id)?
    };

    info!(
        class_id = %class_id.to_uppercase(),
        ta_id = ta_id,
        student_id = request.student_id,
        "Student accepted"
    );
    state.metrics.increment_successful();

    Ok((StatusCode::OK, Json(view)).into_response())
}

/// Put the current student back in line
///
/// POST /boards/{class_id}/tas/{id}/release
///
/// The student keeps their original join timestamp, so they return to the
/// place in line they had when the TA accepted them. A TA with no student
/// releases nothing and still gets a 200.
pub async fn release_handler(
    State(state): State<Arc<AppState>>,
    Path((class_id, ta_id)): Path<(String, u64)>,
) -> Result<Response, QueueError> {
    state.metrics.increment_requests();

    let board = state.boards.get(&class_id).ok_or_else(|| {
        state.metrics.increment_failed();
        QueueError::NotFound("Board".to_string())
    })?;

    let now = current_timestamp();
    let view = {
        let mut board = board.write().unwrap();

        if !board.active {
            state.metrics.increment_failed();
            return Err(QueueError::QueueInactive);
        }

        board.release(ta_id).map_err(|e| {
            state.metrics.increment_failed();
            e
        })?;

        if board.touch_heartbeat(ta_id, now, state.config.queue.heartbeat_refresh) {
            log_heartbeat(&state, &board.class_id, ta_id, now);
        }

        if let Err(e) = state.wal.log_operation(WalOperation::Release {
            class_id: board.class_id.clone(),
            ta_id,
        }) {
            warn!(error = %e, "Failed to log release to WAL");
        }

        ta_view(&board, ta_id)?
    };

    info!(class_id = %class_id.to_uppercase(), ta_id = ta_id, "Student released");
    state.metrics.increment_successful();

    Ok((StatusCode::OK, Json(view)).into_response())
}

fn ta_view(board: &crate::models::board::Board, ta_id: u64) -> Result<TaView, QueueError> {
    QueueSnapshot::build(board)
        .ta(ta_id)
        .cloned()
        .ok_or_else(|| QueueError::NotFound("TA".to_string()))
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
