// Board management endpoints (create, list, destroy)

use crate::core::error::AdminError;
use crate::core::state::AppState;
use crate::models::api::{BoardResponse, BoardSummary, CreateBoardRequest, MasterPasswordQuery, SuccessResponse};
use crate::models::board::Board;
use crate::utils::auth::verify_secret;
use crate::validation::params::{BoardParams, ValidationErrors};
use crate::wal::wal::WalOperation;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::{info, warn};

/// Create a new board
///
/// POST /boards
///
/// Requires the master password; board fields are validated and the
/// class id is normalized to uppercase before insertion.
pub async fn create_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateBoardRequest>,
) -> Result<Response, AdminError> {
    state.metrics.increment_requests();

    if !verify_secret(&request.master_password, &state.config.admin.master_password) {
        warn!("Unauthorized board creation attempt");
        state.metrics.increment_failed();
        return Err(AdminError::InvalidMasterPassword);
    }

    let params = BoardParams {
        title: request.title,
        class_id: request.class_id,
        password: request.password,
        question_based: request.question_based,
    };

    let validated = params.validate().map_err(|errors| {
        state.metrics.increment_failed();
        AdminError::Validation(errors)
    })?;

    let board = Board::new(
        validated.title.clone(),
        &validated.class_id,
        validated.password.clone(),
        validated.question_based,
    );

    let response = BoardResponse {
        class_id: board.class_id.clone(),
        title: board.title.clone(),
        active: board.active,
        frozen: board.frozen,
        question_based: board.question_based,
        status: board.status.clone(),
    };

    if !state.boards.insert(board) {
        state.metrics.increment_failed();
        return Err(AdminError::Validation(ValidationErrors::single(
            "class_id",
            "has already been taken",
        )));
    }

    if let Err(e) = state.wal.log_operation(WalOperation::CreateBoard {
        class_id: validated.class_id.clone(),
        title: validated.title,
        password: validated.password,
        question_based: validated.question_based,
    }) {
        warn!(error = %e, "Failed to log board creation to WAL");
        // Continue anyway - store is updated
    }

    info!(class_id = %validated.class_id, "Board created");
    state.metrics.increment_successful();

    Ok((StatusCode::CREATED, Json(response)).into_response())
}

/// List all boards
///
/// GET /boards
pub async fn list_handler(State(state): State<Arc<AppState>>) -> Response {
    state.metrics.increment_requests();

    let summaries: Vec<BoardSummary> = state
        .boards
        .summaries()
        .into_iter()
        .map(|(class_id, title, active)| BoardSummary {
            class_id,
            title,
            active,
        })
        .collect();

    state.metrics.increment_successful();
    (StatusCode::OK, Json(summaries)).into_response()
}

/// Destroy a board and every participant it owns
///
/// DELETE /boards/{class_id}?master_password=<password>
pub async fn destroy_handler(
    State(state): State<Arc<AppState>>,
    Path(class_id): Path<String>,
    Query(params): Query<MasterPasswordQuery>,
) -> Result<Response, AdminError> {
    state.metrics.increment_requests();

    if !verify_secret(&params.master_password, &state.config.admin.master_password) {
        warn!("Unauthorized board destroy attempt");
        state.metrics.increment_failed();
        return Err(AdminError::InvalidMasterPassword);
    }

    if state.boards.remove(&class_id).is_none() {
        state.metrics.increment_failed();
        return Err(AdminError::NotFound("Board".to_string()));
    }

    if let Err(e) = state.wal.log_operation(WalOperation::RemoveBoard {
        class_id: class_id.to_uppercase(),
    }) {
        warn!(error = %e, "Failed to log board removal to WAL");
    }

    info!(class_id = %class_id.to_uppercase(), "Board destroyed");
    state.metrics.increment_successful();

    Ok((
        StatusCode::OK,
        Json(SuccessResponse {
            success: true,
            message: "Board destroyed".to_string(),
        }),
    )
        .into_response())
}
