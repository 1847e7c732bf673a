use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct CreateBoardRequest {
    pub master_password: String,
    pub title: String,
    pub class_id: String,
    pub password: String,
    #[serde(default)]
    pub question_based: bool,
}

#[derive(Serialize, Deserialize)]
pub struct BoardResponse {
    pub class_id: String,
    pub title: String,
    pub active: bool,
    pub frozen: bool,
    pub question_based: bool,
    pub status: String,
}

#[derive(Serialize, Deserialize)]
pub struct BoardSummary {
    pub class_id: String,
    pub title: String,
    pub active: bool,
}

#[derive(Deserialize)]
pub struct JoinRequest {
    pub username: String,
    pub password: String,
}

/// Returned from a join so the client can store its identity credential.
#[derive(Serialize, Deserialize)]
pub struct JoinResponse {
    pub id: u64,
    pub username: String,
    pub token: String,
}

#[derive(Deserialize)]
pub struct StudentIdRequest {
    pub student_id: u64,
}

#[derive(Deserialize)]
pub struct MasterPasswordQuery {
    pub master_password: String,
}

#[derive(Deserialize)]
pub struct SnapshotQuery {
    /// Optional caller identity; when present the participant's heartbeat
    /// is touched.
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}
