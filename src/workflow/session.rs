// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Per-session execution exclusivity, cancellation and observers.
//!
//! A session's sandbox belongs to at most one in-flight execution. A second
//! request for a busy session is rejected with [`WorkflowError::SessionBusy`]
//! rather than queued. The lease releases the session when dropped, so a
//! panicking or early-returning execution never strands the lock.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::errors::WorkflowError;
use crate::workflow::context::SessionId;
use crate::workflow::events::StreamEvent;

const OBSERVER_CAPACITY: usize = 1024;

#[derive(Default)]
pub struct SessionRegistry {
    active: Mutex<HashMap<SessionId, CancellationToken>>,
    observers: Mutex<HashMap<SessionId, broadcast::Sender<StreamEvent>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // The maps stay consistent even if a holder panicked mid-update.
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl SessionRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Claim the session for one execution.
    pub fn acquire(self: &Arc<Self>, session: &SessionId) -> Result<SessionLease, WorkflowError> {
        let mut active = lock(&self.active);
        if active.contains_key(session) {
            return Err(WorkflowError::SessionBusy(session.to_string()));
        }
        let token = CancellationToken::new();
        active.insert(session.clone(), token.clone());
        tracing::debug!(session_id = %session, "Session lease acquired");

        Ok(SessionLease {
            registry: Arc::clone(self),
            session: session.clone(),
            token,
        })
    }

    pub fn is_active(&self, session: &SessionId) -> bool {
        lock(&self.active).contains_key(session)
    }

    /// Signal the in-flight execution for `session` to stop. Returns whether one was running.
    pub fn stop(&self, session: &SessionId) -> bool {
        match lock(&self.active).get(session) {
            Some(token) => {
                token.cancel();
                tracing::info!(session_id = %session, "Stop requested for session");
                true
            }
            None => false,
        }
    }

    /// Receive a mirror of every event emitted by this session's executions.
    pub fn subscribe(&self, session: &SessionId) -> broadcast::Receiver<StreamEvent> {
        lock(&self.observers)
            .entry(session.clone())
            .or_insert_with(|| broadcast::channel(OBSERVER_CAPACITY).0)
            .subscribe()
    }

    /// Broadcast sender for the session, if anyone has subscribed.
    pub fn mirror_for(&self, session: &SessionId) -> Option<broadcast::Sender<StreamEvent>> {
        let mut observers = lock(&self.observers);
        match observers.get(session) {
            Some(sender) if sender.receiver_count() > 0 => Some(sender.clone()),
            Some(_) => {
                observers.remove(session);
                None
            }
            None => None,
        }
    }

    fn release(&self, session: &SessionId) {
        lock(&self.active).remove(session);
        tracing::debug!(session_id = %session, "Session lease released");
    }
}

/// Exclusive claim on a session; releases on drop.
pub struct SessionLease {
    registry: Arc<SessionRegistry>,
    session: SessionId,
    token: CancellationToken,
}

impl SessionLease {
    pub fn session(&self) -> &SessionId {
        &self.session
    }

    pub fn cancellation(&self) -> CancellationToken {
        self.token.clone()
    }
}

impl Drop for SessionLease {
    fn drop(&mut self) {
        self.registry.release(&self.session);
    }
}
