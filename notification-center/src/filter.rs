//! Derives the displayed sequence from a snapshot and the unread toggle.

use admin_query::Notification;

/// Notifications to display, in server order.
///
/// The unread toggle only has an effect while the aggregate unread flag is
/// set; otherwise the full list is shown and the toggle is left untouched.
pub fn visible_notifications(
    notifications: &[Notification],
    showing_unread: bool,
    has_unread: bool,
) -> Vec<&Notification> {
    if !showing_unread || !has_unread {
        return notifications.iter().collect();
    }

    notifications.iter().filter(|n| !n.read).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use admin_query::{NotificationDetail, NotificationId, NotificationType};
    use chrono::{TimeZone, Utc};

    fn notification(id: &str, read: bool) -> Notification {
        Notification {
            id: Some(NotificationId::from(id)),
            notification_type: NotificationType::Compliance,
            detail: NotificationDetail::default(),
            message: id.to_string(),
            created: Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap(),
            read,
            valid: true,
        }
    }

    fn ids(notifications: &[&Notification]) -> Vec<String> {
        notifications
            .iter()
            .filter_map(|n| n.stable_id().map(|id| id.to_string()))
            .collect()
    }

    fn sample() -> Vec<Notification> {
        vec![
            notification("a", true),
            notification("b", false),
            notification("c", true),
            notification("d", false),
        ]
    }

    #[test]
    fn test_show_all_returns_everything_in_order() {
        let notifications = sample();
        for has_unread in [false, true] {
            let visible = visible_notifications(&notifications, false, has_unread);
            assert_eq!(ids(&visible), vec!["a", "b", "c", "d"]);
        }
    }

    #[test]
    fn test_show_unread_keeps_unread_subsequence() {
        let notifications = sample();
        let visible = visible_notifications(&notifications, true, true);
        assert_eq!(ids(&visible), vec!["b", "d"]);
    }

    #[test]
    fn test_toggle_is_noop_without_aggregate_unread() {
        let notifications = sample();
        let off = visible_notifications(&notifications, false, false);
        let on = visible_notifications(&notifications, true, false);
        assert_eq!(ids(&off), ids(&on));
    }

    #[test]
    fn test_empty_input() {
        assert!(visible_notifications(&[], true, true).is_empty());
    }
}
