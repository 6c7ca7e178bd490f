//! GraphQL-over-HTTP client for the admin backend.

use crate::error::{QueryError, Result};
use crate::model::{ClearAck, NotificationId, Snapshot, ToggleAck};
use crate::service::QueryService;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

const GET_NOTIFICATIONS: &str = "query getNotifications {
  notifications {
    id
    type
    detail
    message
    created
    read
    valid
  }
  hasUnreadNotifications
  machines {
    deviceId
    name
  }
}";

const TOGGLE_CLEAR_NOTIFICATION: &str =
    "mutation toggleClearNotification($id: ID!, $read: Boolean!) {
  toggleClearNotification(id: $id, read: $read) {
    id
    read
  }
}";

const CLEAR_ALL_NOTIFICATIONS: &str = "mutation clearAllNotifications {
  clearAllNotifications {
    id
  }
}";

/// Connect timeout for the underlying HTTP client (seconds).
const CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ToggleData {
    toggle_clear_notification: ToggleAck,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClearAllData {
    clear_all_notifications: Vec<ClearAck>,
}

/// Client for the admin GraphQL endpoint.
#[derive(Debug, Clone)]
pub struct GraphqlClient {
    http: reqwest::Client,
    endpoint: String,
}

impl GraphqlClient {
    /// Create a client posting to `endpoint`.
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .cookie_store(true)
            .build()?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        operation: &str,
        query: &str,
        variables: Value,
    ) -> Result<T> {
        let body = json!({
            "operationName": operation,
            "query": query,
            "variables": variables,
        });

        tracing::debug!("Sending {} to {}", operation, self.endpoint);

        let response = self.http.post(&self.endpoint).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(QueryError::Status(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        decode_response(&bytes)
    }
}

/// Decode a GraphQL response body, preferring reported errors over data.
fn decode_response<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    let response: GraphqlResponse<T> = serde_json::from_slice(body)?;

    if !response.errors.is_empty() {
        return Err(QueryError::Graphql(
            response.errors.into_iter().map(|e| e.message).collect(),
        ));
    }

    response.data.ok_or(QueryError::MissingData)
}

#[async_trait]
impl QueryService for GraphqlClient {
    async fn get_notifications(&self) -> Result<Snapshot> {
        self.execute("getNotifications", GET_NOTIFICATIONS, json!({}))
            .await
    }

    async fn toggle_clear_notification(
        &self,
        id: &NotificationId,
        read: bool,
    ) -> Result<ToggleAck> {
        let data: ToggleData = self
            .execute(
                "toggleClearNotification",
                TOGGLE_CLEAR_NOTIFICATION,
                json!({ "id": id, "read": read }),
            )
            .await?;
        Ok(data.toggle_clear_notification)
    }

    async fn clear_all_notifications(&self) -> Result<Vec<ClearAck>> {
        let data: ClearAllData = self
            .execute("clearAllNotifications", CLEAR_ALL_NOTIFICATIONS, json!({}))
            .await?;
        Ok(data.clear_all_notifications)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_snapshot_response() {
        let body = br#"{
            "data": {
                "notifications": [],
                "hasUnreadNotifications": false,
                "machines": [{ "deviceId": "d1", "name": "Kiosk A" }]
            }
        }"#;

        let snapshot: Snapshot = decode_response(body).unwrap();
        assert!(!snapshot.has_unread_notifications);
        assert_eq!(snapshot.machines.len(), 1);
    }

    #[test]
    fn test_errors_take_precedence_over_data() {
        let body = br#"{
            "data": null,
            "errors": [{ "message": "Unauthorized" }, { "message": "Try again" }]
        }"#;

        match decode_response::<Snapshot>(body) {
            Err(QueryError::Graphql(messages)) => {
                assert_eq!(messages, vec!["Unauthorized", "Try again"]);
            }
            other => panic!("expected graphql error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_data() {
        let result = decode_response::<Snapshot>(br#"{ "data": null }"#);
        assert!(matches!(result, Err(QueryError::MissingData)));
    }

    #[test]
    fn test_decode_mutation_payloads() {
        let toggle: ToggleData = decode_response(
            br#"{ "data": { "toggleClearNotification": { "id": "a1", "read": true } } }"#,
        )
        .unwrap();
        assert_eq!(toggle.toggle_clear_notification.id.as_str(), "a1");
        assert!(toggle.toggle_clear_notification.read);

        let cleared: ClearAllData = decode_response(
            br#"{ "data": { "clearAllNotifications": [{ "id": "a1" }, { "id": 2 }] } }"#,
        )
        .unwrap();
        assert_eq!(cleared.clear_all_notifications.len(), 2);
        assert_eq!(cleared.clear_all_notifications[1].id.as_str(), "2");
    }
}
