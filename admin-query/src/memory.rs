//! In-memory query service.
//!
//! Serves notifications from a snapshot held in memory. Used to run the
//! notification center against a fixture file and to drive tests, which can
//! inject failures and mutate the data behind the panel's back.

use crate::error::{QueryError, Result};
use crate::model::{ClearAck, Machine, Notification, NotificationId, Snapshot, ToggleAck};
use crate::service::QueryService;
use async_trait::async_trait;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct MemoryState {
    notifications: Vec<Notification>,
    machines: Vec<Machine>,
    failing_fetches: usize,
    failing_mutations: usize,
    fetch_count: usize,
}

impl MemoryState {
    fn snapshot(&self) -> Snapshot {
        Snapshot {
            notifications: self.notifications.clone(),
            has_unread_notifications: has_unread(&self.notifications),
            machines: self.machines.clone(),
        }
    }

    fn take_mutation_failure(&mut self) -> Result<()> {
        if self.failing_mutations > 0 {
            self.failing_mutations -= 1;
            return Err(QueryError::Unavailable("injected mutation failure".to_string()));
        }
        Ok(())
    }
}

/// Unread aggregate as the backend computes it: any valid, unread notification.
pub fn has_unread(notifications: &[Notification]) -> bool {
    notifications.iter().any(|n| n.valid && !n.read)
}

/// A [`QueryService`] backed by an in-memory notification list.
#[derive(Debug, Default)]
pub struct MemoryQueryService {
    state: Mutex<MemoryState>,
}

impl MemoryQueryService {
    pub fn new(notifications: Vec<Notification>, machines: Vec<Machine>) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                notifications,
                machines,
                ..MemoryState::default()
            }),
        }
    }

    /// Seed from a snapshot. The unread aggregate is recomputed on every fetch.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self::new(snapshot.notifications, snapshot.machines)
    }

    /// Seed from a snapshot encoded as JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: Snapshot = serde_json::from_str(json)?;
        Ok(Self::from_snapshot(snapshot))
    }

    /// Make the next `count` fetches fail.
    pub async fn fail_next_fetches(&self, count: usize) {
        self.state.lock().await.failing_fetches = count;
    }

    /// Make the next `count` mutations fail.
    pub async fn fail_next_mutations(&self, count: usize) {
        self.state.lock().await.failing_mutations = count;
    }

    /// Number of fetches answered or failed so far.
    pub async fn fetch_count(&self) -> usize {
        self.state.lock().await.fetch_count
    }

    /// Replace the served notifications, as if changed by another operator.
    pub async fn replace_notifications(&self, notifications: Vec<Notification>) {
        self.state.lock().await.notifications = notifications;
    }

    /// Current notifications, bypassing failure injection.
    pub async fn notifications(&self) -> Vec<Notification> {
        self.state.lock().await.notifications.clone()
    }
}

#[async_trait]
impl QueryService for MemoryQueryService {
    async fn get_notifications(&self) -> Result<Snapshot> {
        let mut state = self.state.lock().await;
        state.fetch_count += 1;

        if state.failing_fetches > 0 {
            state.failing_fetches -= 1;
            return Err(QueryError::Unavailable("injected fetch failure".to_string()));
        }

        Ok(state.snapshot())
    }

    async fn toggle_clear_notification(
        &self,
        id: &NotificationId,
        read: bool,
    ) -> Result<ToggleAck> {
        let mut state = self.state.lock().await;
        state.take_mutation_failure()?;

        let notification = state
            .notifications
            .iter_mut()
            .find(|n| n.stable_id() == Some(id))
            .ok_or_else(|| QueryError::Graphql(vec![format!("Notification {} not found", id)]))?;

        notification.read = read;
        tracing::debug!("Notification {} marked read={}", id, read);

        Ok(ToggleAck {
            id: id.clone(),
            read,
        })
    }

    async fn clear_all_notifications(&self) -> Result<Vec<ClearAck>> {
        let mut state = self.state.lock().await;
        state.take_mutation_failure()?;

        let mut cleared = Vec::new();
        for notification in state.notifications.iter_mut().filter(|n| !n.read) {
            notification.read = true;
            if let Some(id) = notification.stable_id() {
                cleared.push(ClearAck { id: id.clone() });
            }
        }

        tracing::debug!("Cleared {} notification(s)", cleared.len());
        Ok(cleared)
    }
}
