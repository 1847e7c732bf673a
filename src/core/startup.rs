use anyhow::Result;
use tracing::warn;

use crate::core::state::AppState;
use crate::models::board::{Board, FlagsPatch};
use crate::models::participant::{Participant, Role};
use crate::wal::wal::{ParticipantRole, WalOperation};

/// Rebuild the in-memory boards from replayed WAL operations at boot time.
///
/// Operations are applied through the same board methods the handlers use,
/// so replay reproduces the live semantics (backfill, deactivation reset).
/// An operation that no longer applies (its board or participant is gone,
/// or a later gate rejects it) is logged and skipped rather than aborting
/// startup.
pub fn apply_wal_operations(state: &AppState, operations: &[WalOperation]) -> Result<()> {
    for op in operations {
        match op {
            WalOperation::CreateBoard {
                class_id,
                title,
                password,
                question_based,
            } => {
                let board = Board::new(
                    title.clone(),
                    class_id,
                    password.clone(),
                    *question_based,
                );
                if !state.boards.insert(board) {
                    warn!(class_id = %class_id, "Replayed board already exists, skipping");
                }
            }
            WalOperation::RemoveBoard { class_id } => {
                state.boards.remove(class_id);
            }
            WalOperation::AddParticipant {
                class_id,
                id,
                role,
                username,
                token,
                last_heartbeat,
            } => {
                with_board(state, class_id, op, |board| {
                    let role = match role {
                        ParticipantRole::Student => Role::Student {
                            queue_joined_at: None,
                            assigned_ta: None,
                        },
                        ParticipantRole::Ta => Role::Ta { assignment: None },
                    };
                    board.insert_participant(Participant::restore(
                        *id,
                        username.clone(),
                        token.clone(),
                        *last_heartbeat,
                        role,
                    ));
                    Ok(())
                });
            }
            WalOperation::RemoveParticipant { class_id, id } => {
                with_board(state, class_id, op, |board| {
                    board.remove_participant(*id).map_err(anyhow::Error::from)
                });
            }
            WalOperation::Enter {
                class_id,
                student_id,
                at,
            } => {
                with_board(state, class_id, op, |board| {
                    board
                        .try_enter(*student_id, *at)
                        .map_err(anyhow::Error::from)
                });
            }
            WalOperation::Exit {
                class_id,
                student_id,
            } => {
                with_board(state, class_id, op, |board| {
                    board.try_exit(*student_id).map_err(anyhow::Error::from)
                });
            }
            WalOperation::Accept {
                class_id,
                ta_id,
                student_id,
            } => {
                with_board(state, class_id, op, |board| {
                    board
                        .accept(*ta_id, *student_id)
                        .map_err(anyhow::Error::from)
                });
            }
            WalOperation::Release { class_id, ta_id } => {
                with_board(state, class_id, op, |board| {
                    board.release(*ta_id).map_err(anyhow::Error::from)
                });
            }
            WalOperation::SetFlags {
                class_id,
                active,
                frozen,
                status,
            } => {
                with_board(state, class_id, op, |board| {
                    board
                        .set_flags(FlagsPatch {
                            active: Some(*active),
                            frozen: Some(*frozen),
                            status: Some(status.clone()),
                        })
                        .map_err(anyhow::Error::from)
                });
            }
            WalOperation::Heartbeat { class_id, id, at } => {
                with_board(state, class_id, op, |board| {
                    if let Some(p) = board.get_mut(*id) {
                        p.last_heartbeat = *at;
                    }
                    Ok(())
                });
            }
        }
    }
    Ok(())
}

/// Rewrite the WAL as the minimal operation set describing current state.
///
/// Run after replay so the log stops growing across restarts. Enter and
/// Accept lines are emitted before SetFlags because a frozen board rejects
/// entries; the flags line last reproduces the gate without tripping it.
pub fn compact_wal(state: &AppState) -> Result<()> {
    state.wal.truncate()?;

    for class_id in state.boards.class_ids() {
        let handle = match state.boards.get(&class_id) {
            Some(handle) => handle,
            None => continue,
        };
        let board = handle.read().unwrap();

        state.wal.log_operation(WalOperation::CreateBoard {
            class_id: board.class_id.clone(),
            title: board.title.clone(),
            password: board.password.clone(),
            question_based: board.question_based,
        })?;

        let mut participants: Vec<&Participant> = board.participants().collect();
        participants.sort_by_key(|p| p.id);

        for p in &participants {
            state.wal.log_operation(WalOperation::AddParticipant {
                class_id: board.class_id.clone(),
                id: p.id,
                role: if p.is_ta() {
                    ParticipantRole::Ta
                } else {
                    ParticipantRole::Student
                },
                username: p.username.clone(),
                token: p.token.clone(),
                last_heartbeat: p.last_heartbeat,
            })?;
        }

        for p in &participants {
            if p.is_waiting() {
                state.wal.log_operation(WalOperation::Enter {
                    class_id: board.class_id.clone(),
                    student_id: p.id,
                    at: p.queue_joined_at().unwrap_or_default(),
                })?;
            }
        }

        for p in &participants {
            if let Some(assignment) = p.assignment() {
                state.wal.log_operation(WalOperation::Enter {
                    class_id: board.class_id.clone(),
                    student_id: assignment.student_id,
                    at: assignment.joined_at,
                })?;
                state.wal.log_operation(WalOperation::Accept {
                    class_id: board.class_id.clone(),
                    ta_id: p.id,
                    student_id: assignment.student_id,
                })?;
            }
        }

        state.wal.log_operation(WalOperation::SetFlags {
            class_id: board.class_id.clone(),
            active: board.active,
            frozen: board.frozen,
            status: board.status.clone(),
        })?;
    }

    Ok(())
}

fn with_board<F>(state: &AppState, class_id: &str, op: &WalOperation, apply: F)
where
    F: FnOnce(&mut Board) -> Result<()>,
{
    match state.boards.get(class_id) {
        Some(handle) => {
            let mut board = handle.write().unwrap();
            if let Err(e) = apply(&mut board) {
                warn!(class_id = %class_id, operation = ?op, error = %e, "Skipping stale WAL operation");
            }
        }
        None => {
            warn!(class_id = %class_id, operation = ?op, "WAL operation references missing board, skipping");
        }
    }
}
