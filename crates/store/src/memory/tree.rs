// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared state behind the in-memory store

use crate::{StoreError, WatchEvent};
use nodepool_core::lock::{LockInput, LockTransition, PathLock};
use nodepool_core::{path, LockToken, SessionId};
use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};
use tokio::sync::oneshot;

#[derive(Debug)]
struct Entry {
    data: Vec<u8>,
    /// Owning session for ephemeral entries
    owner: Option<SessionId>,
}

#[derive(Debug)]
pub(crate) struct SessionState {
    pub(crate) last_heartbeat: Instant,
    pub(crate) timeout: Duration,
}

/// The path tree plus everything keyed on it
#[derive(Debug, Default)]
pub(crate) struct Tree {
    entries: BTreeMap<String, Entry>,
    /// Next sequence number per parent path
    sequences: HashMap<String, u64>,
    locks: HashMap<String, PathLock>,
    watches: HashMap<String, Vec<oneshot::Sender<WatchEvent>>>,
    pub(crate) sessions: HashMap<SessionId, SessionState>,
    next_session: u64,
    next_fence: u64,
}

fn check_path(path: &str) -> Result<(), StoreError> {
    if path::is_valid(path) && path != "/" {
        Ok(())
    } else {
        Err(StoreError::BadPath(path.to_string()))
    }
}

impl Tree {
    pub(crate) fn open_session(&mut self, now: Instant, timeout: Duration) -> SessionId {
        self.next_session += 1;
        let id = SessionId(self.next_session);
        self.sessions.insert(
            id,
            SessionState {
                last_heartbeat: now,
                timeout,
            },
        );
        id
    }

    pub(crate) fn check_session(&self, id: SessionId) -> Result<(), StoreError> {
        if self.sessions.contains_key(&id) {
            Ok(())
        } else {
            Err(StoreError::SessionExpired(id))
        }
    }

    pub(crate) fn heartbeat(&mut self, id: SessionId, now: Instant) -> Result<(), StoreError> {
        let session = self
            .sessions
            .get_mut(&id)
            .ok_or(StoreError::SessionExpired(id))?;
        session.last_heartbeat = now;
        Ok(())
    }

    /// End a session: drop its ephemeral entries and free its locks
    pub(crate) fn close_session(&mut self, id: SessionId) -> bool {
        if self.sessions.remove(&id).is_none() {
            return false;
        }

        let owned: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, e)| e.owner == Some(id))
            .map(|(p, _)| p.clone())
            .collect();
        for p in owned {
            self.entries.remove(&p);
            self.fire(&p, WatchEvent::Deleted(p.clone()));
        }

        for lock in self.locks.values_mut() {
            let (next, _) = lock.transition(LockInput::SessionClosed { holder: id });
            *lock = next;
        }
        self.locks.retain(|_, l| !l.is_free());
        true
    }

    fn fire(&mut self, path: &str, event: WatchEvent) {
        if let Some(watchers) = self.watches.remove(path) {
            for tx in watchers {
                // receiver may have been dropped; nothing to do then
                let _ = tx.send(event.clone());
            }
        }
    }

    fn has_children(&self, path: &str) -> bool {
        let prefix = format!("{}/", path);
        self.entries
            .range(prefix.clone()..)
            .next()
            .is_some_and(|(p, _)| p.starts_with(&prefix))
    }

    pub(crate) fn children(&self, path: &str) -> Vec<String> {
        let prefix = if path == "/" {
            "/".to_string()
        } else {
            format!("{}/", path)
        };
        self.entries
            .range(prefix.clone()..)
            .take_while(|(p, _)| p.starts_with(&prefix))
            .filter(|(p, _)| !p[prefix.len()..].contains('/'))
            .map(|(p, _)| p.clone())
            .collect()
    }

    fn ensure_parents(&mut self, target: &str) -> Result<(), StoreError> {
        for ancestor in path::ancestors(target) {
            match self.entries.get(ancestor) {
                Some(entry) if entry.owner.is_some() => {
                    return Err(StoreError::BadPath(format!(
                        "{} is ephemeral and cannot have children",
                        ancestor
                    )));
                }
                Some(_) => {}
                None => {
                    self.entries.insert(
                        ancestor.to_string(),
                        Entry {
                            data: Vec::new(),
                            owner: None,
                        },
                    );
                    self.fire(ancestor, WatchEvent::Created(ancestor.to_string()));
                }
            }
        }
        Ok(())
    }

    pub(crate) fn create_sequential(
        &mut self,
        prefix: &str,
        data: &[u8],
        owner: Option<SessionId>,
    ) -> Result<String, StoreError> {
        let parent = path::parent(prefix)
            .filter(|p| *p != "/")
            .ok_or_else(|| StoreError::BadPath(prefix.to_string()))?;
        check_path(parent)?;
        self.ensure_parents(prefix)?;

        let counter = self.sequences.entry(parent.to_string()).or_insert(0);
        let assigned = format!("{}{:010}", prefix, *counter);
        *counter += 1;
        check_path(&assigned)?;

        if self.entries.contains_key(&assigned) {
            return Err(StoreError::NodeExists(assigned));
        }
        self.entries.insert(
            assigned.clone(),
            Entry {
                data: data.to_vec(),
                owner,
            },
        );
        self.fire(&assigned, WatchEvent::Created(assigned.clone()));
        Ok(assigned)
    }

    /// Create or overwrite a persistent entry, creating parents as needed
    pub(crate) fn put(&mut self, target: &str, data: &[u8]) -> Result<(), StoreError> {
        check_path(target)?;
        self.ensure_parents(target)?;
        let event = match self.entries.get_mut(target) {
            Some(entry) => {
                entry.data = data.to_vec();
                WatchEvent::DataChanged(target.to_string())
            }
            None => {
                self.entries.insert(
                    target.to_string(),
                    Entry {
                        data: data.to_vec(),
                        owner: None,
                    },
                );
                WatchEvent::Created(target.to_string())
            }
        };
        self.fire(target, event);
        Ok(())
    }

    pub(crate) fn set_data(&mut self, target: &str, data: &[u8]) -> Result<(), StoreError> {
        check_path(target)?;
        let entry = self
            .entries
            .get_mut(target)
            .ok_or_else(|| StoreError::NoNode(target.to_string()))?;
        entry.data = data.to_vec();
        self.fire(target, WatchEvent::DataChanged(target.to_string()));
        Ok(())
    }

    pub(crate) fn read(&self, target: &str) -> Result<Vec<u8>, StoreError> {
        check_path(target)?;
        self.entries
            .get(target)
            .map(|e| e.data.clone())
            .ok_or_else(|| StoreError::NoNode(target.to_string()))
    }

    pub(crate) fn exists(&self, target: &str) -> Result<bool, StoreError> {
        check_path(target)?;
        Ok(self.entries.contains_key(target))
    }

    pub(crate) fn delete(&mut self, target: &str) -> Result<(), StoreError> {
        check_path(target)?;
        if !self.entries.contains_key(target) {
            return Err(StoreError::NoNode(target.to_string()));
        }
        if self.has_children(target) {
            return Err(StoreError::NotEmpty(target.to_string()));
        }
        self.entries.remove(target);
        self.fire(target, WatchEvent::Deleted(target.to_string()));
        Ok(())
    }

    pub(crate) fn acquire_lock(
        &mut self,
        target: &str,
        holder: SessionId,
    ) -> Result<LockToken, StoreError> {
        check_path(target)?;
        if !self.entries.contains_key(target) {
            return Err(StoreError::NoNode(target.to_string()));
        }

        let fence = self.next_fence + 1;
        let lock = self
            .locks
            .entry(target.to_string())
            .or_insert_with(|| PathLock::new(target));
        let (next, outcome) = lock.transition(LockInput::Acquire { holder, fence });
        *lock = next;

        match outcome {
            LockTransition::Acquired(token) => {
                self.next_fence = fence;
                Ok(token)
            }
            LockTransition::Denied { current } => Err(StoreError::LockHeld {
                path: target.to_string(),
                holder: current,
            }),
            LockTransition::Released { .. } | LockTransition::Ignored => {
                Err(StoreError::Unavailable(format!(
                    "unexpected lock transition on {}",
                    target
                )))
            }
        }
    }

    pub(crate) fn release_lock(&mut self, token: &LockToken) -> Result<(), StoreError> {
        let not_held = || StoreError::LockNotHeld(token.path().to_string());
        let lock = self.locks.get_mut(token.path()).ok_or_else(not_held)?;
        let (next, outcome) = lock.transition(LockInput::Release {
            token: token.clone(),
        });
        *lock = next;

        match outcome {
            LockTransition::Released { .. } => {
                self.locks.remove(token.path());
                Ok(())
            }
            _ => Err(not_held()),
        }
    }

    pub(crate) fn lock_holder(&self, target: &str) -> Option<SessionId> {
        self.locks.get(target).and_then(PathLock::holder)
    }

    pub(crate) fn watch(&mut self, target: &str) -> Result<oneshot::Receiver<WatchEvent>, StoreError> {
        check_path(target)?;
        let (tx, rx) = oneshot::channel();
        let watchers = self.watches.entry(target.to_string()).or_default();
        // drop registrations whose receiver is gone
        watchers.retain(|w| !w.is_closed());
        watchers.push(tx);
        Ok(rx)
    }

    #[cfg(test)]
    pub(crate) fn watch_count(&self, target: &str) -> usize {
        self.watches.get(target).map_or(0, Vec::len)
    }
}
