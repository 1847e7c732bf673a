use crate::models::board::Board;
use dashmap::DashMap;
use std::sync::{Arc, RwLock};

/// In-memory board store.
///
/// Each board sits behind its own `RwLock`: the board is the unit of
/// locking, so operations on different boards never block each other.
/// Mutations take the write lock; snapshots take the read lock and see a
/// consistent point-in-time view.
pub struct BoardStore {
    boards: DashMap<String, Arc<RwLock<Board>>>,
}

impl BoardStore {
    pub fn new() -> Self {
        Self {
            boards: DashMap::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            boards: DashMap::with_capacity(capacity),
        }
    }

    /// Insert a new board, keyed by its uppercase class id. Returns `false`
    /// if a board with that class id already exists (the entry API makes
    /// racing creates resolve to exactly one winner).
    pub fn insert(&self, board: Board) -> bool {
        match self.boards.entry(board.class_id.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => false,
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                entry.insert(Arc::new(RwLock::new(board)));
                true
            }
        }
    }

    pub fn get(&self, class_id: &str) -> Option<Arc<RwLock<Board>>> {
        self.boards
            .get(&class_id.to_uppercase())
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Remove a board and, with it, every participant it owns.
    pub fn remove(&self, class_id: &str) -> Option<Arc<RwLock<Board>>> {
        self.boards
            .remove(&class_id.to_uppercase())
            .map(|(_, board)| board)
    }

    pub fn len(&self) -> usize {
        self.boards.len()
    }

    pub fn class_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.boards.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    pub fn is_empty(&self) -> bool {
        self.boards.is_empty()
    }

    /// Board summaries for the index endpoint, sorted by class id.
    pub fn summaries(&self) -> Vec<(String, String, bool)> {
        let mut out: Vec<(String, String, bool)> = self
            .boards
            .iter()
            .map(|entry| {
                let board = entry.value().read().unwrap();
                (board.class_id.clone(), board.title.clone(), board.active)
            })
            .collect();
        out.sort();
        out
    }

    pub fn total_participants(&self) -> usize {
        self.boards
            .iter()
            .map(|entry| entry.value().read().unwrap().participant_count())
            .sum()
    }

    pub fn waiting_students(&self) -> usize {
        self.boards
            .iter()
            .map(|entry| entry.value().read().unwrap().waiting_count())
            .sum()
    }

    pub fn active_assignments(&self) -> usize {
        self.boards
            .iter()
            .map(|entry| entry.value().read().unwrap().assignment_count())
            .sum()
    }
}

impl Default for BoardStore {
    fn default() -> Self {
        Self::new()
    }
}
