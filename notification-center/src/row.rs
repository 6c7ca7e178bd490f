//! Presentable notification rows.

use crate::app::Message;
use crate::devices::DeviceIndex;
use crate::fl;
use admin_query::{Notification, NotificationDetail, NotificationId, NotificationType};
use chrono::{DateTime, Utc};
use std::hash::{DefaultHasher, Hash, Hasher};

/// Identity of a row within one rendered sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RowKey {
    /// Server identifier; safe to reuse across renders and resequencing.
    Stable(NotificationId),
    /// Index in the current filtered sequence; valid for one render pass only.
    Positional(usize),
}

impl RowKey {
    /// Key for the notification at `index` of the filtered sequence.
    pub fn for_notification(index: usize, notification: &Notification) -> Self {
        match notification.stable_id() {
            Some(id) => Self::Stable(id.clone()),
            None => Self::Positional(index),
        }
    }

    pub fn id(&self) -> Option<&NotificationId> {
        match self {
            Self::Stable(id) => Some(id),
            Self::Positional(_) => None,
        }
    }
}

/// A row's identity plus a fingerprint of everything that shapes its height.
///
/// Two signatures with the same stable key but different content describe
/// the same notification after an edit; its old measurement is stale.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RowSignature {
    pub key: RowKey,
    pub content: u64,
}

impl RowSignature {
    /// Signature of the notification at `index` of the filtered sequence.
    pub fn of(index: usize, notification: &Notification, devices: &DeviceIndex) -> Self {
        let mut hasher = DefaultHasher::new();
        notification.notification_type.hash(&mut hasher);
        notification.message.hash(&mut hasher);
        devices.resolve(notification.device_id()).hash(&mut hasher);
        notification.created.hash(&mut hasher);
        notification.read.hash(&mut hasher);
        notification.valid.hash(&mut hasher);
        serde_json::to_string(&notification.detail.extra)
            .ok()
            .hash(&mut hasher);

        Self {
            key: RowKey::for_notification(index, notification),
            content: hasher.finish(),
        }
    }
}

/// One notification prepared for display.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationRow {
    pub key: RowKey,
    pub notification_type: NotificationType,
    pub detail: NotificationDetail,
    pub message: String,
    /// Resolved device name; `None` when the device is not in the machine list.
    pub device_name: Option<String>,
    pub created: DateTime<Utc>,
    pub read: bool,
    pub valid: bool,
}

impl NotificationRow {
    /// Format the notification at `index` of the filtered sequence.
    pub fn format(index: usize, notification: &Notification, devices: &DeviceIndex) -> Self {
        Self {
            key: RowKey::for_notification(index, notification),
            notification_type: notification.notification_type,
            detail: notification.detail.clone(),
            message: notification.message.clone(),
            device_name: devices
                .resolve(notification.device_id())
                .map(str::to_string),
            created: notification.created,
            read: notification.read,
            valid: notification.valid,
        }
    }

    /// Message that flips this row's read state.
    ///
    /// Rows without a server identifier cannot be addressed and have none.
    pub fn on_toggle(&self) -> Option<Message> {
        self.key.id().map(|id| Message::ToggleRead {
            id: id.clone(),
            currently_read: self.read,
        })
    }

    pub fn device_label(&self) -> String {
        self.device_name
            .clone()
            .unwrap_or_else(|| fl!("unknown-device"))
    }

    pub fn type_label(&self) -> String {
        match self.notification_type {
            NotificationType::HighValueTransaction => fl!("type-high-value-transaction"),
            NotificationType::NormalValueTransaction => fl!("type-normal-value-transaction"),
            NotificationType::FiatBalance => fl!("type-fiat-balance"),
            NotificationType::CryptoBalance => fl!("type-crypto-balance"),
            NotificationType::Compliance => fl!("type-compliance"),
            NotificationType::Error => fl!("type-error"),
            NotificationType::Security => fl!("type-security"),
            NotificationType::Unknown => fl!("type-unknown"),
        }
    }

    /// Relative age within the last day, absolute timestamp beyond that.
    pub fn created_label(&self, now: DateTime<Utc>) -> String {
        let age = now.signed_duration_since(self.created);
        if age.num_minutes() < 1 {
            fl!("just-now")
        } else if age.num_hours() < 1 {
            fl!("minutes-ago", minutes = age.num_minutes())
        } else if age.num_days() < 1 {
            fl!("hours-ago", hours = age.num_hours())
        } else {
            self.created.format("%Y-%m-%d %H:%M").to_string()
        }
    }
}
