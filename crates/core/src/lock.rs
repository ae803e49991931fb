// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lock state machine for exclusive access to a store path
//!
//! Locks are owned by store sessions. They are not reentrant: a second
//! acquire on a held path is denied even when it comes from the holder.

use serde::{Deserialize, Serialize};

/// Identifier of a coordination-store session
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(pub u64);

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:016x}", self.0)
    }
}

/// Proof of a held lock, returned by a successful acquire
///
/// The fence increases with every grant on the store, so a stale token can
/// never release a lock that has since been granted to someone else.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LockToken {
    path: String,
    holder: SessionId,
    fence: u64,
}

impl LockToken {
    pub fn new(path: impl Into<String>, holder: SessionId, fence: u64) -> Self {
        Self {
            path: path.into(),
            holder,
            fence,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn holder(&self) -> SessionId {
        self.holder
    }

    pub fn fence(&self) -> u64 {
        self.fence
    }
}

/// Lock state
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LockState {
    Free,
    Held { holder: SessionId, fence: u64 },
}

/// A lock bound to a single store path
#[derive(Clone, Debug)]
pub struct PathLock {
    pub path: String,
    pub state: LockState,
}

/// Inputs that drive lock transitions
#[derive(Clone, Debug)]
pub enum LockInput {
    /// Attempt to take the lock; `fence` is the store's next fencing value
    Acquire { holder: SessionId, fence: u64 },
    /// Release with a previously granted token
    Release { token: LockToken },
    /// The holder's session ended
    SessionClosed { holder: SessionId },
}

/// What a transition did
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LockTransition {
    Acquired(LockToken),
    Denied { current: SessionId },
    Released { holder: SessionId },
    /// Input did not apply (wrong holder, stale fence, or already free)
    Ignored,
}

impl PathLock {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            state: LockState::Free,
        }
    }

    pub fn is_free(&self) -> bool {
        matches!(self.state, LockState::Free)
    }

    pub fn holder(&self) -> Option<SessionId> {
        match self.state {
            LockState::Free => None,
            LockState::Held { holder, .. } => Some(holder),
        }
    }

    pub fn is_held_by(&self, session: SessionId) -> bool {
        self.holder() == Some(session)
    }

    /// Pure state transition function
    pub fn transition(&self, input: LockInput) -> (PathLock, LockTransition) {
        let mut next = self.clone();

        let outcome = match (input, &self.state) {
            (LockInput::Acquire { holder, fence }, LockState::Free) => {
                next.state = LockState::Held { holder, fence };
                LockTransition::Acquired(LockToken::new(&self.path, holder, fence))
            }
            (LockInput::Acquire { .. }, LockState::Held { holder, .. }) => {
                LockTransition::Denied { current: *holder }
            }
            (LockInput::Release { token }, LockState::Held { holder, fence })
                if token.holder == *holder && token.fence == *fence && token.path == self.path =>
            {
                next.state = LockState::Free;
                LockTransition::Released { holder: *holder }
            }
            (LockInput::SessionClosed { holder }, LockState::Held { holder: current, .. })
                if holder == *current =>
            {
                next.state = LockState::Free;
                LockTransition::Released { holder }
            }
            _ => LockTransition::Ignored,
        };

        (next, outcome)
    }
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
