// Student join/leave endpoints

use crate::core::error::QueueError;
use crate::core::state::AppState;
use crate::models::api::{JoinRequest, JoinResponse, SuccessResponse};
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

/// Student sign-in
///
/// POST /boards/{class_id}/students
///
/// Requires the board password. The student is registered but not yet in
/// line; entering the queue is a separate call.
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
            warn!(class_id = %board.class_id, "Invalid board password on student join");
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

        let student = board.add_student(request.username, now);
        let id = student.id;
        let username = student.username.clone();
        let token = student.token.clone();
        let last_heartbeat = student.last_heartbeat;

        // Logged under the board lock so replay order matches apply order
        if let Err(e) = state.wal.log_operation(WalOperation::AddParticipant {
            class_id: board.class_id.clone(),
            id,
            role: ParticipantRole::Student,
            username: username.clone(),
            token: token.clone(),
            last_heartbeat,
        }) {
            warn!(error = %e, "Failed to log student join to WAL");
        }

        (id, username, token)
    };

    info!(class_id = %class_id.to_uppercase(), student_id = id, "Student joined board");
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

/// Student sign-out
///
/// DELETE /boards/{class_id}/students/{id}
///
/// Works even on an inactive or frozen board: if the student was waiting or
/// being helped, the pairing is unwound (with backfill) before removal.
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
            Some(p) if p.is_student() => {}
            _ => {
                state.metrics.increment_failed();
                return Err(QueueError::NotFound("Student".to_string()));
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
            warn!(error = %e, "Failed to log student leave to WAL");
        }
    }

    info!(class_id = %class_id.to_uppercase(), student_id = id, "Student left board");
    state.metrics.increment_successful();

    Ok((
        StatusCode::OK,
        Json(SuccessResponse {
            success: true,
            message: "Student removed".to_string(),
        }),
    )
        .into_response())
}
