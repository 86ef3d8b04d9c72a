//! The conversation store: transcript plus latest run

use genesis_api::RunState;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::message::{Message, MessagePatch};

/// Capacity of the snapshot channel; slower subscribers skip ahead.
const SNAPSHOT_CHANNEL_CAPACITY: usize = 64;

/// Everything the views render from
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationSnapshot {
    /// Transcript in display order
    pub messages: Vec<Message>,
    /// Latest completed run, absent before the first answered turn
    pub last_run: Option<Arc<RunState>>,
}

impl ConversationSnapshot {
    /// Look up a message by id
    pub fn message(&self, id: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn last_run(&self) -> Option<&RunState> {
        self.last_run.as_deref()
    }
}

/// Single owner of the [`ConversationSnapshot`].
///
/// Cloning yields another handle to the same store; [`ConversationStore::new`]
/// always creates an isolated one. Each action swaps in a complete new
/// snapshot under the lock and publishes it, so readers and subscribers only
/// ever see whole states.
#[derive(Clone)]
pub struct ConversationStore {
    current: Arc<Mutex<Arc<ConversationSnapshot>>>,
    snapshot_tx: broadcast::Sender<Arc<ConversationSnapshot>>,
}

impl ConversationStore {
    /// Create an empty store
    pub fn new() -> Self {
        let (snapshot_tx, _) = broadcast::channel(SNAPSHOT_CHANNEL_CAPACITY);
        Self {
            current: Arc::new(Mutex::new(Arc::new(ConversationSnapshot::default()))),
            snapshot_tx,
        }
    }

    /// Subscribe to snapshots published after this call
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<ConversationSnapshot>> {
        self.snapshot_tx.subscribe()
    }

    /// The latest snapshot
    pub fn snapshot(&self) -> Arc<ConversationSnapshot> {
        Arc::clone(&self.current.lock())
    }

    /// Append a message to the transcript
    pub fn add_message(&self, msg: Message) {
        tracing::debug!("add_message: {} {}", msg.role.as_str(), msg.id);
        self.mutate(|snapshot| snapshot.messages.push(msg));
    }

    /// Patch the message with `id`. Returns `false`, without publishing,
    /// when no such message exists.
    pub fn update_message(&self, id: &str, patch: MessagePatch) -> bool {
        let mut current = self.current.lock();
        let Some(index) = current.messages.iter().position(|m| m.id == id) else {
            tracing::debug!("update_message: unknown id {}", id);
            return false;
        };
        patch.apply(&mut Arc::make_mut(&mut current).messages[index]);
        self.publish(&current);
        true
    }

    /// Replace the latest run as a whole
    pub fn set_last_run(&self, run: impl Into<Arc<RunState>>) {
        let run = run.into();
        self.mutate(|snapshot| snapshot.last_run = Some(run));
    }

    /// Start a fresh conversation
    pub fn clear(&self) {
        self.mutate(|snapshot| *snapshot = ConversationSnapshot::default());
    }

    fn mutate(&self, f: impl FnOnce(&mut ConversationSnapshot)) {
        let mut current = self.current.lock();
        f(Arc::make_mut(&mut current));
        self.publish(&current);
    }

    // Called with the lock held so publish order matches mutation order.
    fn publish(&self, snapshot: &Arc<ConversationSnapshot>) {
        // No subscribers is fine
        let _ = self.snapshot_tx.send(Arc::clone(snapshot));
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}
