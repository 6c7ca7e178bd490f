//! Query service client for admin console notifications.
//!
//! This crate describes the notification data served by the admin backend
//! and the three operations the notification center needs from it:
//! fetching the current snapshot, toggling the read state of a single
//! notification and marking every notification read.

pub mod error;
pub mod graphql;
pub mod memory;
pub mod model;
pub mod service;

pub use error::{QueryError, Result};
pub use graphql::GraphqlClient;
pub use memory::MemoryQueryService;
pub use model::{
    ClearAck, Machine, Notification, NotificationDetail, NotificationId, NotificationType,
    Snapshot, ToggleAck,
};
pub use service::QueryService;
