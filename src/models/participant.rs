use crate::utils::time::is_expired;
use crate::utils::token::generate_token;

/// A TA's hold on one student.
///
/// `joined_at` is the student's queue join timestamp captured at accept
/// time, so releasing the student puts them back in line at their original
/// position instead of the back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Assignment {
    pub student_id: u64,
    pub joined_at: i64,
}

/// Role-specific participant state. Dispatch happens on the variant, not on
/// a subtype; the shared fields live on `Participant`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Role {
    Student {
        /// Unix millis when the student entered the queue. `None` means
        /// "not currently waiting"; the value doubles as the FIFO sort key.
        queue_joined_at: Option<i64>,
        /// Back-reference mirroring the TA's `assignment`.
        assigned_ta: Option<u64>,
    },
    Ta {
        assignment: Option<Assignment>,
    },
}

/// A participant (student or TA) belonging to exactly one board.
#[derive(Clone, Debug)]
pub struct Participant {
    pub id: u64,
    pub username: String,
    /// Opaque identity credential, generated once at creation, immutable.
    pub token: String,
    /// Unix seconds of the last persisted heartbeat.
    pub last_heartbeat: i64,
    pub role: Role,
}

impl Participant {
    pub fn student(id: u64, username: String, now: i64) -> Self {
        Self {
            id,
            username,
            token: generate_token(),
            last_heartbeat: now,
            role: Role::Student {
                queue_joined_at: None,
                assigned_ta: None,
            },
        }
    }

    pub fn ta(id: u64, username: String, now: i64) -> Self {
        Self {
            id,
            username,
            token: generate_token(),
            last_heartbeat: now,
            role: Role::Ta { assignment: None },
        }
    }

    /// Rebuild a participant from persisted fields (WAL replay).
    pub fn restore(id: u64, username: String, token: String, last_heartbeat: i64, role: Role) -> Self {
        Self {
            id,
            username,
            token,
            last_heartbeat,
            role,
        }
    }

    pub fn is_ta(&self) -> bool {
        matches!(self.role, Role::Ta { .. })
    }

    pub fn is_student(&self) -> bool {
        matches!(self.role, Role::Student { .. })
    }

    pub fn queue_joined_at(&self) -> Option<i64> {
        match self.role {
            Role::Student { queue_joined_at, .. } => queue_joined_at,
            Role::Ta { .. } => None,
        }
    }

    pub fn assigned_ta(&self) -> Option<u64> {
        match self.role {
            Role::Student { assigned_ta, .. } => assigned_ta,
            Role::Ta { .. } => None,
        }
    }

    pub fn assignment(&self) -> Option<Assignment> {
        match self.role {
            Role::Ta { assignment } => assignment,
            Role::Student { .. } => None,
        }
    }

    /// A waiting student has a join timestamp and no TA holding them.
    pub fn is_waiting(&self) -> bool {
        matches!(
            self.role,
            Role::Student {
                queue_joined_at: Some(_),
                assigned_ta: None,
            }
        )
    }

    /// Refresh the heartbeat if it has aged past the freshness window.
    ///
    /// Returns `true` when the timestamp actually moved, which is the
    /// caller's cue to persist it. Polling clients hit the server every few
    /// seconds; coalescing keeps those polls from becoming writes.
    pub fn touch_heartbeat(&mut self, now: i64, refresh_window: i64) -> bool {
        if is_expired(self.last_heartbeat, refresh_window, now) {
            self.last_heartbeat = now;
            true
        } else {
            false
        }
    }
}
