//! Session Store - the only per-request mutable state of the engine.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use story_graph::NodeKey;

use super::{PlaythroughId, UserId};

/// A player's position in an active playthrough.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub node: NodeKey,
    pub playthrough: PlaythroughId,
    /// Choices taken since the playthrough started.
    pub steps: u32,
}

impl Session {
    fn begin(node: NodeKey) -> Self {
        Self {
            node,
            playthrough: PlaythroughId::new(),
            steps: 0,
        }
    }

    fn advance(&mut self, node: NodeKey) {
        self.node = node;
        self.steps += 1;
    }
}

/// What a [`SessionStore::step`] decision does to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionChange {
    /// Leave the session untouched.
    Stay,
    /// Move the player to another node.
    MoveTo(NodeKey),
    /// The playthrough is over; drop the session.
    End,
}

/// Thread-safe mapping from user to current node.
///
/// Backed by a sharded map, so players never contend on a global lock. A
/// missing entry means the user is not playing; there is no sentinel node.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<UserId, Session>,
}

impl SessionStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current node of a user, if they are playing.
    pub fn get(&self, user: &UserId) -> Option<NodeKey> {
        self.sessions.get(user).map(|s| s.node.clone())
    }

    /// Snapshot of a user's full session.
    pub fn session(&self, user: &UserId) -> Option<Session> {
        self.sessions.get(user).map(|s| s.clone())
    }

    /// Start a fresh playthrough at `node`, replacing any previous one.
    pub fn begin(&self, user: &UserId, node: NodeKey) -> PlaythroughId {
        let session = Session::begin(node);
        let playthrough = session.playthrough;
        self.sessions.insert(user.clone(), session);
        playthrough
    }

    /// Put a user at `node`.
    ///
    /// An active playthrough keeps its ID and counts a step; otherwise a new
    /// playthrough begins.
    pub fn set(&self, user: &UserId, node: NodeKey) {
        match self.sessions.entry(user.clone()) {
            Entry::Occupied(mut entry) => entry.get_mut().advance(node),
            Entry::Vacant(entry) => {
                entry.insert(Session::begin(node));
            }
        }
    }

    /// Remove a user's session, returning it if there was one.
    pub fn clear(&self, user: &UserId) -> Option<Session> {
        self.sessions.remove(user).map(|(_, session)| session)
    }

    /// Run a read-decide-write sequence on one user's session.
    ///
    /// `decide` sees the current session while the lock for that user's entry
    /// is held, so concurrent requests for the same user cannot interleave
    /// between the read and the write. Other users are unaffected. Returns
    /// `None` without calling `decide` if the user is not playing.
    pub fn step<R>(
        &self,
        user: &UserId,
        decide: impl FnOnce(&Session) -> (SessionChange, R),
    ) -> Option<R> {
        let Entry::Occupied(mut entry) = self.sessions.entry(user.clone()) else {
            return None;
        };

        let (change, outcome) = decide(entry.get());
        match change {
            SessionChange::Stay => {}
            SessionChange::MoveTo(node) => entry.get_mut().advance(node),
            SessionChange::End => {
                entry.remove();
            }
        }
        Some(outcome)
    }

    /// Check if a user is playing.
    pub fn contains(&self, user: &UserId) -> bool {
        self.sessions.contains_key(user)
    }

    /// Number of active sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
