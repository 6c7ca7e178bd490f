//! The query service seam used by the notification center.

use crate::error::Result;
use crate::model::{ClearAck, NotificationId, Snapshot, ToggleAck};
use async_trait::async_trait;

/// Abstract query/mutation service for notifications.
///
/// Implementations must be cheap to share: the notification center holds one
/// behind an `Arc` and issues requests from spawned tasks.
#[async_trait]
pub trait QueryService: Send + Sync {
    /// Fetch the current notifications, unread aggregate and machine list.
    async fn get_notifications(&self) -> Result<Snapshot>;

    /// Set the read state of a single notification.
    async fn toggle_clear_notification(&self, id: &NotificationId, read: bool)
        -> Result<ToggleAck>;

    /// Mark every notification read.
    async fn clear_all_notifications(&self) -> Result<Vec<ClearAck>>;
}
