use crate::core::error::QueueError;
use crate::models::participant::{Assignment, Participant, Role};
use crate::validation::params::ValidationErrors;
use std::collections::HashMap;

/// Flag changes requested by the instructor endpoint. Absent fields are
/// left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlagsPatch {
    pub active: Option<bool>,
    pub frozen: Option<bool>,
    pub status: Option<String>,
}

/// One class's office-hours board: the ordered waiting line, its
/// active/frozen flags, and every participant it owns.
///
/// All mutations go through the methods here so the pairing invariant
/// (TA assignment and student back-reference always mirror each other,
/// and an assigned student is never simultaneously waiting) holds after
/// every call, including rejected ones.
pub struct Board {
    pub title: String,
    /// Uppercased, `\w` only, unique across the store.
    pub class_id: String,
    /// Checked when a participant joins. Gating is the handlers' job.
    pub password: String,
    pub active: bool,
    pub frozen: bool,
    pub question_based: bool,
    /// Free-form instructor-set text, cleared on deactivation.
    pub status: String,
    participants: HashMap<u64, Participant>,
    next_id: u64,
}

impl Board {
    pub fn new(title: String, class_id: &str, password: String, question_based: bool) -> Self {
        Self {
            title,
            class_id: class_id.to_uppercase(),
            password,
            active: true,
            frozen: false,
            question_based,
            status: String::new(),
            participants: HashMap::new(),
            next_id: 1,
        }
    }

    // ---- participant lifecycle ----

    pub fn add_student(&mut self, username: String, now: i64) -> &Participant {
        let id = self.allocate_id();
        self.participants
            .entry(id)
            .or_insert_with(|| Participant::student(id, username, now))
    }

    pub fn add_ta(&mut self, username: String, now: i64) -> &Participant {
        let id = self.allocate_id();
        self.participants
            .entry(id)
            .or_insert_with(|| Participant::ta(id, username, now))
    }

    /// Re-insert a persisted participant (WAL replay). Keeps the id counter
    /// ahead of every restored id.
    pub fn insert_participant(&mut self, participant: Participant) {
        self.next_id = self.next_id.max(participant.id + 1);
        self.participants.insert(participant.id, participant);
    }

    /// Explicit leave: tear down any live assignment first, then drop the
    /// row. Unlike `try_exit` this is not gated by active/frozen; a sign-out
    /// must always work.
    pub fn remove_participant(&mut self, id: u64) -> Result<(), QueueError> {
        let participant = self
            .participants
            .get(&id)
            .ok_or_else(|| QueueError::NotFound("Participant".to_string()))?;

        match participant.role {
            Role::Student { assigned_ta, .. } => {
                if let Some(ta_id) = assigned_ta {
                    self.unpair(ta_id);
                    self.backfill(ta_id, id);
                }
            }
            Role::Ta { assignment } => {
                // A departing TA's student goes back to the line at their
                // original position.
                if assignment.is_some() {
                    self.release(id)?;
                }
            }
        }

        self.participants.remove(&id);
        Ok(())
    }

    pub fn get(&self, id: u64) -> Option<&Participant> {
        self.participants.get(&id)
    }

    pub fn get_mut(&mut self, id: u64) -> Option<&mut Participant> {
        self.participants.get_mut(&id)
    }

    pub fn find_by_token_mut(&mut self, token: &str) -> Option<&mut Participant> {
        self.participants.values_mut().find(|p| p.token == token)
    }

    pub fn participants(&self) -> impl Iterator<Item = &Participant> {
        self.participants.values()
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    pub fn waiting_count(&self) -> usize {
        self.participants.values().filter(|p| p.is_waiting()).count()
    }

    pub fn assignment_count(&self) -> usize {
        self.participants
            .values()
            .filter(|p| p.assignment().is_some())
            .count()
    }

    // ---- flag state machine ----

    /// Apply an instructor flag patch.
    ///
    /// Freezing is only meaningful on an active board; a patch that tries to
    /// freeze a board it leaves inactive is rejected before anything is
    /// mutated. Deactivation runs the hard reset last, so it wins over any
    /// other field in the same patch.
    pub fn set_flags(&mut self, patch: FlagsPatch) -> Result<(), QueueError> {
        let next_active = patch.active.unwrap_or(self.active);
        if patch.frozen == Some(true) && !next_active {
            return Err(QueueError::Validation(ValidationErrors::single(
                "frozen",
                "cannot be enabled while the queue is inactive",
            )));
        }

        let was_active = self.active;

        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(active) = patch.active {
            self.active = active;
        }
        if let Some(frozen) = patch.frozen {
            self.frozen = frozen;
        }

        if was_active && !self.active {
            self.deactivate_reset();
        }

        Ok(())
    }

    /// Hard reset on deactivation: every waiting marker cleared, every
    /// assignment torn down, frozen and status back to defaults.
    /// Deactivation is not a pause.
    fn deactivate_reset(&mut self) {
        for participant in self.participants.values_mut() {
            match &mut participant.role {
                Role::Student {
                    queue_joined_at,
                    assigned_ta,
                } => {
                    *queue_joined_at = None;
                    *assigned_ta = None;
                }
                Role::Ta { assignment } => {
                    *assignment = None;
                }
            }
        }
        self.frozen = false;
        self.status.clear();
    }

    // ---- queue operations ----

    /// Put a student in line at `at` (unix millis).
    ///
    /// Idempotent: re-entering refreshes the timestamp, last call wins.
    pub fn try_enter(&mut self, student_id: u64, at: i64) -> Result<(), QueueError> {
        if !self.active {
            return Err(QueueError::QueueInactive);
        }
        if self.frozen {
            return Err(QueueError::QueueFrozen);
        }

        let participant = self
            .participants
            .get_mut(&student_id)
            .ok_or_else(|| QueueError::NotFound("Student".to_string()))?;

        match &mut participant.role {
            Role::Student { queue_joined_at, .. } => {
                *queue_joined_at = Some(at);
                Ok(())
            }
            Role::Ta { .. } => Err(QueueError::NotFound("Student".to_string())),
        }
    }

    /// Take a student out of the line. If a TA was helping them, the TA is
    /// backfilled with the next-longest-waiting student; running out of
    /// candidates just leaves the TA unassigned.
    pub fn try_exit(&mut self, student_id: u64) -> Result<(), QueueError> {
        if !self.active {
            return Err(QueueError::QueueInactive);
        }
        if self.frozen {
            return Err(QueueError::QueueFrozen);
        }

        let participant = self
            .participants
            .get_mut(&student_id)
            .ok_or_else(|| QueueError::NotFound("Student".to_string()))?;

        let assigned = match &mut participant.role {
            Role::Student {
                queue_joined_at,
                assigned_ta,
            } => {
                *queue_joined_at = None;
                assigned_ta.take()
            }
            Role::Ta { .. } => return Err(QueueError::NotFound("Student".to_string())),
        };

        if let Some(ta_id) = assigned {
            self.unpair(ta_id);
            self.backfill(ta_id, student_id);
        }

        Ok(())
    }

    // ---- assignment ----

    /// Pair a TA with a waiting student.
    ///
    /// Rejected with `StudentNotWaiting` when the student is not in line or
    /// belongs to another TA; nothing is mutated on rejection. A TA who
    /// already holds a student drops that student entirely first (accepted
    /// students left the line, they do not go back to it).
    pub fn accept(&mut self, ta_id: u64, student_id: u64) -> Result<(), QueueError> {
        let student = self
            .participants
            .get(&student_id)
            .filter(|p| p.is_student())
            .ok_or_else(|| QueueError::NotFound("Student".to_string()))?;

        if student.queue_joined_at().is_none() {
            return Err(QueueError::StudentNotWaiting);
        }
        if let Some(holder) = student.assigned_ta() {
            if holder != ta_id {
                return Err(QueueError::StudentNotWaiting);
            }
        }

        let ta = self
            .participants
            .get(&ta_id)
            .filter(|p| p.is_ta())
            .ok_or_else(|| QueueError::NotFound("TA".to_string()))?;

        if let Some(previous) = ta.assignment() {
            if previous.student_id != student_id {
                self.drop_student_side(previous.student_id);
            }
        }

        self.pair(ta_id, student_id);
        Ok(())
    }

    /// Detach a TA from their student without the student leaving. The
    /// student rejoins the line at their original timestamp.
    pub fn release(&mut self, ta_id: u64) -> Result<(), QueueError> {
        let ta = self
            .participants
            .get_mut(&ta_id)
            .filter(|p| p.is_ta())
            .ok_or_else(|| QueueError::NotFound("TA".to_string()))?;

        let assignment = match &mut ta.role {
            Role::Ta { assignment } => assignment.take(),
            Role::Student { .. } => unreachable!("filtered to TAs above"),
        };

        if let Some(Assignment { student_id, joined_at }) = assignment {
            if let Some(student) = self.participants.get_mut(&student_id) {
                if let Role::Student {
                    queue_joined_at,
                    assigned_ta,
                } = &mut student.role
                {
                    *assigned_ta = None;
                    *queue_joined_at = Some(joined_at);
                }
            }
        }

        Ok(())
    }

    /// The single place both sides of a pairing are written, so no caller
    /// can leave them asymmetric. The student's waiting marker moves into
    /// the assignment.
    fn pair(&mut self, ta_id: u64, student_id: u64) {
        let joined_at = match self.participants.get_mut(&student_id) {
            Some(Participant {
                role:
                    Role::Student {
                        queue_joined_at,
                        assigned_ta,
                    },
                ..
            }) => {
                *assigned_ta = Some(ta_id);
                queue_joined_at.take().unwrap_or(0)
            }
            _ => return,
        };

        if let Some(Participant {
            role: Role::Ta { assignment },
            ..
        }) = self.participants.get_mut(&ta_id)
        {
            *assignment = Some(Assignment {
                student_id,
                joined_at,
            });
        }
    }

    /// Clear the TA side of a pairing (the student side is the caller's
    /// responsibility; `try_exit` has already cleared it).
    fn unpair(&mut self, ta_id: u64) {
        if let Some(Participant {
            role: Role::Ta { assignment },
            ..
        }) = self.participants.get_mut(&ta_id)
        {
            *assignment = None;
        }
    }

    /// Fully drop a student's side of a pairing: no back-reference, not
    /// waiting. Used when a TA switches to a new student.
    fn drop_student_side(&mut self, student_id: u64) {
        if let Some(Participant {
            role:
                Role::Student {
                    queue_joined_at,
                    assigned_ta,
                },
            ..
        }) = self.participants.get_mut(&student_id)
        {
            *queue_joined_at = None;
            *assigned_ta = None;
        }
    }

    /// Hand the freed TA the next-longest-waiting student, if any. Absence
    /// of a candidate is the normal terminal case.
    fn backfill(&mut self, ta_id: u64, exiting_student: u64) {
        if let Some(next) = self.next_waiting_except(exiting_student) {
            self.pair(ta_id, next);
        }
    }

    /// Earliest joined waiting student other than `exclude`; ties broken by
    /// participant id so the choice is deterministic.
    fn next_waiting_except(&self, exclude: u64) -> Option<u64> {
        self.participants
            .values()
            .filter(|p| p.id != exclude && p.is_waiting())
            .min_by_key(|p| (p.queue_joined_at(), p.id))
            .map(|p| p.id)
    }

    // ---- liveness ----

    /// Touch a participant's heartbeat; returns `true` when the timestamp
    /// moved and should be persisted.
    pub fn touch_heartbeat(&mut self, id: u64, now: i64, refresh_window: i64) -> bool {
        match self.participants.get_mut(&id) {
            Some(p) => p.touch_heartbeat(now, refresh_window),
            None => false,
        }
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_board() -> Board {
        Board::new(
            "Operating Systems".to_string(),
            "cs140",
            "secret".to_string(),
            false,
        )
    }

    fn board_with(students: &[&str], tas: &[&str]) -> (Board, Vec<u64>, Vec<u64>) {
        let mut board = test_board();
        let student_ids: Vec<u64> = students
            .iter()
            .map(|name| board.add_student(name.to_string(), 1000).id)
            .collect();
        let ta_ids: Vec<u64> = tas
            .iter()
            .map(|name| board.add_ta(name.to_string(), 1000).id)
            .collect();
        (board, student_ids, ta_ids)
    }

    /// Every TA's assignment must be mirrored by the student, and an
    /// assigned student must never still be waiting.
    fn assert_pairing_invariant(board: &Board) {
        for p in board.participants() {
            if let Some(a) = p.assignment() {
                let student = board.get(a.student_id).expect("assigned student exists");
                assert_eq!(student.assigned_ta(), Some(p.id), "back-reference mismatch");
                assert_eq!(
                    student.queue_joined_at(),
                    None,
                    "assigned student still waiting"
                );
            }
            if let Some(ta_id) = p.assigned_ta() {
                let ta = board.get(ta_id).expect("referenced TA exists");
                assert_eq!(
                    ta.assignment().map(|a| a.student_id),
                    Some(p.id),
                    "forward reference mismatch"
                );
            }
        }
    }

    #[test]
    fn test_class_id_uppercased() {
        let board = test_board();
        assert_eq!(board.class_id, "CS140");
    }

    #[test]
    fn test_defaults() {
        let board = test_board();
        assert!(board.active);
        assert!(!board.frozen);
        assert!(!board.question_based);
        assert_eq!(board.status, "");
    }

    #[test]
    fn test_enter_sets_marker() {
        let (mut board, s, _) = board_with(&["alice"], &[]);
        board.try_enter(s[0], 500).unwrap();
        assert_eq!(board.get(s[0]).unwrap().queue_joined_at(), Some(500));
    }

    #[test]
    fn test_enter_is_idempotent_last_call_wins() {
        let (mut board, s, _) = board_with(&["alice"], &[]);
        board.try_enter(s[0], 500).unwrap();
        board.try_enter(s[0], 900).unwrap();
        assert_eq!(board.get(s[0]).unwrap().queue_joined_at(), Some(900));
        assert_eq!(board.waiting_count(), 1);
    }

    #[test]
    fn test_enter_rejected_when_frozen() {
        let (mut board, s, _) = board_with(&["alice"], &[]);
        board.frozen = true;
        assert!(matches!(
            board.try_enter(s[0], 500),
            Err(QueueError::QueueFrozen)
        ));
        assert_eq!(board.get(s[0]).unwrap().queue_joined_at(), None);
    }

    #[test]
    fn test_enter_rejected_when_inactive() {
        let (mut board, s, _) = board_with(&["alice"], &[]);
        board.active = false;
        assert!(matches!(
            board.try_enter(s[0], 500),
            Err(QueueError::QueueInactive)
        ));
    }

    #[test]
    fn test_inactive_dominates_frozen() {
        let (mut board, s, _) = board_with(&["alice"], &[]);
        board.active = false;
        board.frozen = true;
        assert!(matches!(
            board.try_enter(s[0], 500),
            Err(QueueError::QueueInactive)
        ));
        assert!(matches!(
            board.try_exit(s[0]),
            Err(QueueError::QueueInactive)
        ));
    }

    #[test]
    fn test_exit_rejected_when_frozen() {
        let (mut board, s, _) = board_with(&["alice"], &[]);
        board.try_enter(s[0], 500).unwrap();
        board.frozen = true;
        assert!(matches!(board.try_exit(s[0]), Err(QueueError::QueueFrozen)));
        // Rejected operation left state untouched
        assert_eq!(board.get(s[0]).unwrap().queue_joined_at(), Some(500));
    }

    #[test]
    fn test_enter_unknown_student() {
        let mut board = test_board();
        assert!(matches!(
            board.try_enter(42, 500),
            Err(QueueError::NotFound(_))
        ));
    }

    #[test]
    fn test_enter_rejects_ta_id() {
        let (mut board, _, t) = board_with(&[], &["bob"]);
        assert!(matches!(
            board.try_enter(t[0], 500),
            Err(QueueError::NotFound(_))
        ));
    }

    #[test]
    fn test_accept_pairs_both_sides() {
        let (mut board, s, t) = board_with(&["alice"], &["bob"]);
        board.try_enter(s[0], 500).unwrap();
        board.accept(t[0], s[0]).unwrap();

        let ta = board.get(t[0]).unwrap();
        assert_eq!(ta.assignment().map(|a| a.student_id), Some(s[0]));
        let student = board.get(s[0]).unwrap();
        assert_eq!(student.assigned_ta(), Some(t[0]));
        assert_eq!(student.queue_joined_at(), None);
        assert_pairing_invariant(&board);
    }

    #[test]
    fn test_accept_not_waiting() {
        let (mut board, s, t) = board_with(&["alice"], &["bob"]);
        assert!(matches!(
            board.accept(t[0], s[0]),
            Err(QueueError::StudentNotWaiting)
        ));
        assert_pairing_invariant(&board);
    }

    #[test]
    fn test_accept_student_held_by_other_ta() {
        let (mut board, s, t) = board_with(&["alice"], &["bob", "carol"]);
        board.try_enter(s[0], 500).unwrap();
        board.accept(t[0], s[0]).unwrap();

        // Even if the student re-enters the line, a different TA cannot
        // steal them.
        board.try_enter(s[0], 600).unwrap();
        assert!(matches!(
            board.accept(t[1], s[0]),
            Err(QueueError::StudentNotWaiting)
        ));
        assert_eq!(
            board.get(t[0]).unwrap().assignment().map(|a| a.student_id),
            Some(s[0])
        );
    }

    #[test]
    fn test_accept_racing_tas_exactly_one_wins() {
        let (mut board, s, t) = board_with(&["alice"], &["bob", "carol"]);
        board.try_enter(s[0], 500).unwrap();

        let first = board.accept(t[0], s[0]);
        let second = board.accept(t[1], s[0]);

        assert!(first.is_ok());
        assert!(matches!(second, Err(QueueError::StudentNotWaiting)));
        assert_pairing_invariant(&board);
    }

    #[test]
    fn test_accept_switch_releases_previous_fully() {
        let (mut board, s, t) = board_with(&["alice", "dave"], &["bob"]);
        board.try_enter(s[0], 500).unwrap();
        board.try_enter(s[1], 600).unwrap();

        board.accept(t[0], s[0]).unwrap();
        board.accept(t[0], s[1]).unwrap();

        // Previous student is gone from the line, not returned to it
        let previous = board.get(s[0]).unwrap();
        assert_eq!(previous.assigned_ta(), None);
        assert_eq!(previous.queue_joined_at(), None);

        assert_eq!(
            board.get(t[0]).unwrap().assignment().map(|a| a.student_id),
            Some(s[1])
        );
        assert_pairing_invariant(&board);
    }

    #[test]
    fn test_accept_unaffected_by_frozen() {
        let (mut board, s, t) = board_with(&["alice"], &["bob"]);
        board.try_enter(s[0], 500).unwrap();
        board.frozen = true;
        board.accept(t[0], s[0]).unwrap();
        assert_pairing_invariant(&board);
    }

    #[test]
    fn test_exit_backfills_next_longest_waiting() {
        let (mut board, s, t) = board_with(&["a", "b", "c"], &["ta"]);
        board.try_enter(s[0], 100).unwrap();
        board.try_enter(s[1], 200).unwrap();
        board.try_enter(s[2], 300).unwrap();

        board.accept(t[0], s[0]).unwrap();
        board.try_exit(s[0]).unwrap();

        // b waited longer than c, so b is promoted
        assert_eq!(
            board.get(t[0]).unwrap().assignment().map(|a| a.student_id),
            Some(s[1])
        );
        let promoted = board.get(s[1]).unwrap();
        assert_eq!(promoted.queue_joined_at(), None);
        assert_eq!(promoted.assigned_ta(), Some(t[0]));
        assert_pairing_invariant(&board);
    }

    #[test]
    fn test_exit_without_replacement_leaves_ta_unassigned() {
        let (mut board, s, t) = board_with(&["alice"], &["bob"]);
        board.try_enter(s[0], 100).unwrap();
        board.accept(t[0], s[0]).unwrap();

        board.try_exit(s[0]).unwrap();

        assert_eq!(board.get(t[0]).unwrap().assignment(), None);
        assert_eq!(board.get(s[0]).unwrap().assigned_ta(), None);
        assert_pairing_invariant(&board);
    }

    #[test]
    fn test_exit_while_not_waiting_is_fine() {
        let (mut board, s, _) = board_with(&["alice"], &[]);
        board.try_exit(s[0]).unwrap();
        assert_eq!(board.get(s[0]).unwrap().queue_joined_at(), None);
    }

    #[test]
    fn test_release_restores_original_timestamp() {
        let (mut board, s, t) = board_with(&["alice"], &["bob"]);
        board.try_enter(s[0], 500).unwrap();
        board.accept(t[0], s[0]).unwrap();

        board.release(t[0]).unwrap();

        let student = board.get(s[0]).unwrap();
        assert_eq!(student.assigned_ta(), None);
        assert_eq!(student.queue_joined_at(), Some(500));
        assert_eq!(board.get(t[0]).unwrap().assignment(), None);
        assert_pairing_invariant(&board);
    }

    #[test]
    fn test_release_without_assignment_is_noop() {
        let (mut board, _, t) = board_with(&[], &["bob"]);
        board.release(t[0]).unwrap();
        assert_eq!(board.get(t[0]).unwrap().assignment(), None);
    }

    #[test]
    fn test_released_student_keeps_place_in_line() {
        let (mut board, s, t) = board_with(&["a", "b"], &["ta"]);
        board.try_enter(s[0], 100).unwrap();
        board.accept(t[0], s[0]).unwrap();
        board.try_enter(s[1], 200).unwrap();

        board.release(t[0]).unwrap();

        // a's original timestamp (100) beats b's (200)
        board.accept(t[0], s[1]).unwrap();
        board.try_exit(s[1]).unwrap();
        assert_eq!(
            board.get(t[0]).unwrap().assignment().map(|a| a.student_id),
            Some(s[0])
        );
    }

    #[test]
    fn test_deactivation_hard_reset() {
        let (mut board, s, t) = board_with(&["a", "b"], &["ta"]);
        board.try_enter(s[0], 100).unwrap();
        board.try_enter(s[1], 200).unwrap();
        board.accept(t[0], s[0]).unwrap();
        board
            .set_flags(FlagsPatch {
                frozen: Some(true),
                status: Some("busy".to_string()),
                ..Default::default()
            })
            .unwrap();

        board
            .set_flags(FlagsPatch {
                active: Some(false),
                ..Default::default()
            })
            .unwrap();

        assert!(!board.active);
        assert!(!board.frozen);
        assert_eq!(board.status, "");
        assert_eq!(board.waiting_count(), 0);
        assert_eq!(board.assignment_count(), 0);
        for p in board.participants() {
            assert_eq!(p.queue_joined_at(), None);
            assert_eq!(p.assigned_ta(), None);
            assert_eq!(p.assignment(), None);
        }
    }

    #[test]
    fn test_deactivation_wins_within_one_patch() {
        let mut board = test_board();
        board
            .set_flags(FlagsPatch {
                active: Some(false),
                frozen: Some(true),
                status: Some("closing".to_string()),
            })
            .unwrap();
        assert!(!board.active);
        assert!(!board.frozen);
        assert_eq!(board.status, "");
    }

    #[test]
    fn test_freeze_rejected_while_inactive() {
        let mut board = test_board();
        board
            .set_flags(FlagsPatch {
                active: Some(false),
                ..Default::default()
            })
            .unwrap();

        let err = board
            .set_flags(FlagsPatch {
                frozen: Some(true),
                ..Default::default()
            })
            .unwrap_err();
        match err {
            QueueError::Validation(errors) => assert!(errors.field("frozen").is_some()),
            other => panic!("expected validation error, got {:?}", other),
        }
        assert!(!board.frozen);
    }

    #[test]
    fn test_reactivate_and_freeze_in_one_patch() {
        let mut board = test_board();
        board
            .set_flags(FlagsPatch {
                active: Some(false),
                ..Default::default()
            })
            .unwrap();

        board
            .set_flags(FlagsPatch {
                active: Some(true),
                frozen: Some(true),
                ..Default::default()
            })
            .unwrap();
        assert!(board.active);
        assert!(board.frozen);
    }

    #[test]
    fn test_remove_assigned_student_backfills() {
        let (mut board, s, t) = board_with(&["a", "b"], &["ta"]);
        board.try_enter(s[0], 100).unwrap();
        board.try_enter(s[1], 200).unwrap();
        board.accept(t[0], s[0]).unwrap();

        board.remove_participant(s[0]).unwrap();

        assert!(board.get(s[0]).is_none());
        assert_eq!(
            board.get(t[0]).unwrap().assignment().map(|a| a.student_id),
            Some(s[1])
        );
        assert_pairing_invariant(&board);
    }

    #[test]
    fn test_remove_ta_returns_student_to_line() {
        let (mut board, s, t) = board_with(&["a"], &["ta"]);
        board.try_enter(s[0], 100).unwrap();
        board.accept(t[0], s[0]).unwrap();

        board.remove_participant(t[0]).unwrap();

        assert!(board.get(t[0]).is_none());
        let student = board.get(s[0]).unwrap();
        assert_eq!(student.assigned_ta(), None);
        assert_eq!(student.queue_joined_at(), Some(100));
    }

    #[test]
    fn test_invariant_over_operation_sequence() {
        let (mut board, s, t) = board_with(&["a", "b", "c", "d"], &["t1", "t2"]);
        board.try_enter(s[0], 100).unwrap();
        board.try_enter(s[1], 200).unwrap();
        board.try_enter(s[2], 300).unwrap();
        board.accept(t[0], s[0]).unwrap();
        assert_pairing_invariant(&board);

        board.try_enter(s[3], 400).unwrap();
        board.accept(t[1], s[1]).unwrap();
        assert_pairing_invariant(&board);

        board.try_exit(s[0]).unwrap(); // t1 backfilled with c
        assert_pairing_invariant(&board);
        assert_eq!(
            board.get(t[0]).unwrap().assignment().map(|a| a.student_id),
            Some(s[2])
        );

        board.release(t[1]).unwrap();
        assert_pairing_invariant(&board);

        board.try_exit(s[2]).unwrap(); // t1 backfilled with b (restored at 200)
        assert_pairing_invariant(&board);
        assert_eq!(
            board.get(t[0]).unwrap().assignment().map(|a| a.student_id),
            Some(s[1])
        );
    }

    #[test]
    fn test_heartbeat_touch_unknown_participant() {
        let mut board = test_board();
        assert!(!board.touch_heartbeat(99, 5000, 900));
    }
}
