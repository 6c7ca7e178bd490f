//! Notification data as served by the admin backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Server-side notification identifier.
///
/// The backend hands out UUID strings, but older records and fixtures may
/// carry plain numbers. Both are normalized to a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NotificationId(String);

impl NotificationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NotificationId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for NotificationId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl<'de> Deserialize<'de> for NotificationId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(i64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(text) => Self(text),
            Raw::Number(number) => Self(number.to_string()),
        })
    }
}

/// Category of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NotificationType {
    HighValueTransaction,
    NormalValueTransaction,
    FiatBalance,
    CryptoBalance,
    Compliance,
    Error,
    Security,
    /// A category this client does not know about yet.
    #[serde(other)]
    Unknown,
}

/// Structured payload attached to a notification.
///
/// Only the device reference is interpreted; every other key is kept as-is
/// so hosts can render category-specific details.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationDetail {
    /// Device the notification refers to, if any.
    #[serde(
        rename = "deviceId",
        default,
        deserialize_with = "device_reference",
        skip_serializing_if = "Option::is_none"
    )]
    pub device_id: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A single operator-facing notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Absent for transient entries that have not been persisted.
    #[serde(default)]
    pub id: Option<NotificationId>,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    #[serde(default, deserialize_with = "lenient_detail")]
    pub detail: NotificationDetail,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    pub created: DateTime<Utc>,
    pub read: bool,
    /// Whether the condition that raised the notification still holds.
    pub valid: bool,
}

impl Notification {
    /// The identifier, treating an empty string as absent.
    pub fn stable_id(&self) -> Option<&NotificationId> {
        self.id.as_ref().filter(|id| !id.is_empty())
    }

    /// The referenced device, if the payload carries one.
    pub fn device_id(&self) -> Option<&str> {
        self.detail.device_id.as_deref()
    }
}

/// A machine registered with the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Machine {
    pub device_id: String,
    pub name: String,
}

/// One complete fetch result.
///
/// A snapshot always replaces the previous one wholesale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default, deserialize_with = "null_as_default")]
    pub notifications: Vec<Notification>,
    /// Server-computed: whether any notification is currently unread.
    #[serde(default, deserialize_with = "null_as_default")]
    pub has_unread_notifications: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub machines: Vec<Machine>,
}

/// Acknowledgement of a single read-state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleAck {
    pub id: NotificationId,
    pub read: bool,
}

/// Acknowledgement of one notification cleared by a clear-all request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearAck {
    pub id: NotificationId,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A device reference that is not a string resolves to no device.
fn device_reference<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(id)) => Some(id),
        Some(other) => {
            tracing::debug!("Ignoring malformed device reference: {}", other);
            None
        }
        None => None,
    })
}

/// A payload that is not an object decodes as an empty detail.
fn lenient_detail<'de, D>(deserializer: D) -> Result<NotificationDetail, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(value @ Value::Object(_)) => {
            serde_json::from_value(value).map_err(serde::de::Error::custom)
        }
        Some(other) => {
            tracing::debug!("Ignoring malformed notification detail: {}", other);
            Ok(NotificationDetail::default())
        }
        None => Ok(NotificationDetail::default()),
    }
}
