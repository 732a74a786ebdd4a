use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use shared::models::VoteUpdate;
use tokio::sync::mpsc::{self, Receiver, Sender};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::ledger::UpdateSink;

pub const MIN_HISTORY_CAPACITY: usize = 10;
pub const MAX_HISTORY_CAPACITY: usize = 50;
pub const DEFAULT_HISTORY_CAPACITY: usize = MAX_HISTORY_CAPACITY;
pub const DEFAULT_REPLAY_LEN: usize = 10;

/// Per-listener queue depth. A listener that falls this far behind is
/// treated as disconnected.
pub const LISTENER_QUEUE_DEPTH: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HubMessage {
    Update(VoteUpdate),
    KeepAlive,
}

#[derive(Default)]
struct HubState {
    listeners: HashMap<Uuid, Sender<HubMessage>>,
    history: VecDeque<VoteUpdate>,
}

pub struct BroadcastHub {
    state: Mutex<HubState>,
    capacity: usize,
    replay_len: usize,
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY, DEFAULT_REPLAY_LEN)
    }
}

impl BroadcastHub {
    /// `capacity` is clamped to [10, 50]; `replay_len` to [1, capacity].
    pub fn new(capacity: usize, replay_len: usize) -> Self {
        let capacity = capacity.clamp(MIN_HISTORY_CAPACITY, MAX_HISTORY_CAPACITY);
        Self {
            state: Mutex::new(HubState::default()),
            capacity,
            replay_len: replay_len.clamp(1, capacity),
        }
    }

    pub fn capacity(&self) -> usize { self.capacity }
    pub fn replay_len(&self) -> usize { self.replay_len }

    // Listener bookkeeping stays consistent even if a holder panicked.
    fn lock(&self) -> MutexGuard<'_, HubState> {
        self.state.lock().unwrap_or_else(|poisoned| {
            error!("Broadcast hub lock poisoned; recovering");
            poisoned.into_inner()
        })
    }

    /// Records `update` and offers it to every listener without waiting.
    /// Listeners whose queue is closed or full are dropped. Returns how many
    /// listeners received the update.
    pub fn publish(&self, update: VoteUpdate) -> usize {
        let mut state = self.lock();
        state.history.push_back(update.clone());
        while state.history.len() > self.capacity {
            state.history.pop_front();
        }
        deliver(&mut state.listeners, HubMessage::Update(update))
    }

    /// Registers a listener and queues the most recent updates for it,
    /// oldest first, ahead of anything published afterwards.
    pub fn subscribe_listener(self: &Arc<Self>) -> Listener {
        let (tx, rx) = mpsc::channel(LISTENER_QUEUE_DEPTH);
        let id = Uuid::new_v4();

        let mut state = self.lock();
        let skip = state.history.len().saturating_sub(self.replay_len);
        for update in state.history.iter().skip(skip) {
            // Fresh queue is deeper than the replay window.
            let _ = tx.try_send(HubMessage::Update(update.clone()));
        }
        state.listeners.insert(id, tx);
        debug!("Listener {} registered ({} active)", id, state.listeners.len());

        Listener { id, rx, hub: Arc::downgrade(self) }
    }

    /// Idempotent; returns whether the listener was still registered.
    pub fn unsubscribe_listener(&self, id: Uuid) -> bool {
        let removed = self.lock().listeners.remove(&id).is_some();
        if removed {
            debug!("Listener {} unregistered", id);
        }
        removed
    }

    /// Sends a keep-alive to every listener; returns how many were pruned.
    pub fn send_keepalive(&self) -> usize {
        let mut state = self.lock();
        let before = state.listeners.len();
        deliver(&mut state.listeners, HubMessage::KeepAlive);
        before - state.listeners.len()
    }

    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }

    /// The updates a listener registering now would be replayed.
    pub fn recent_updates(&self) -> Vec<VoteUpdate> {
        let state = self.lock();
        let skip = state.history.len().saturating_sub(self.replay_len);
        state.history.iter().skip(skip).cloned().collect()
    }
}

fn deliver(listeners: &mut HashMap<Uuid, Sender<HubMessage>>, message: HubMessage) -> usize {
    let before = listeners.len();
    listeners.retain(|id, tx| match tx.try_send(message.clone()) {
        Ok(()) => true,
        Err(e) => {
            debug!("Dropping listener {}: {}", id, e);
            false
        }
    });
    let pruned = before - listeners.len();
    if pruned > 0 {
        info!("📡 Pruned {} disconnected listener(s)", pruned);
    }
    listeners.len()
}

impl UpdateSink for BroadcastHub {
    fn publish(&self, update: VoteUpdate) {
        BroadcastHub::publish(self, update);
    }
}

/// Receiving end of a hub registration. Dropping it unregisters.
pub struct Listener {
    id: Uuid,
    rx: Receiver<HubMessage>,
    hub: Weak<BroadcastHub>,
}

impl Listener {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// `None` once the hub has dropped this listener.
    pub async fn recv(&mut self) -> Option<HubMessage> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<HubMessage> {
        self.rx.try_recv().ok()
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            hub.unsubscribe_listener(self.id);
        }
    }
}
