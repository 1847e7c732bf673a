use crate::models::board::Board;
use serde::{Deserialize, Serialize};

/// A waiting student as rendered to polling clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentView {
    pub id: u64,
    pub username: String,
    pub queue_joined_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignedStudentView {
    pub id: u64,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaView {
    pub id: u64,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student: Option<AssignedStudentView>,
}

/// Point-in-time read-only view of one board.
///
/// Built under the board lock, so no student can appear both in the
/// waiting list and behind a TA.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueSnapshot {
    pub active: bool,
    pub frozen: bool,
    pub status: String,
    pub students: Vec<StudentView>,
    pub tas: Vec<TaView>,
}

impl QueueSnapshot {
    pub fn build(board: &Board) -> Self {
        // Waiting subset only: assigned students show up behind their TA,
        // never duplicated in the line.
        let mut students: Vec<StudentView> = board
            .participants()
            .filter(|p| p.is_waiting())
            .map(|p| StudentView {
                id: p.id,
                username: p.username.clone(),
                queue_joined_at: p.queue_joined_at().unwrap_or(0),
            })
            .collect();
        students.sort_by_key(|s| (s.queue_joined_at, s.id));

        let mut tas: Vec<TaView> = board
            .participants()
            .filter(|p| p.is_ta())
            .map(|p| TaView {
                id: p.id,
                username: p.username.clone(),
                student: p.assignment().and_then(|a| {
                    board.get(a.student_id).map(|s| AssignedStudentView {
                        id: s.id,
                        username: s.username.clone(),
                    })
                }),
            })
            .collect();
        // Creation order: participant ids are allocated monotonically
        tas.sort_by_key(|t| t.id);

        Self {
            active: board.active,
            frozen: board.frozen,
            status: board.status.clone(),
            students,
            tas,
        }
    }

    pub fn ta(&self, id: u64) -> Option<&TaView> {
        self.tas.iter().find(|t| t.id == id)
    }
}
