//! Plain-text rendering and command parsing for the terminal host.

use crate::app::{Message, PanelView};
use crate::constants::list::SCROLL_STEP;
use crate::fl;
use crate::list::PlacedRow;
use admin_query::NotificationId;
use chrono::{DateTime, Utc};
use std::fmt::Write;

/// A line typed by the operator.
#[derive(Debug, Clone, PartialEq)]
pub enum HostCommand {
    /// Flip the read state of the notification with this id
    Toggle(NotificationId),
    ClearAll,
    ShowUnread,
    ScrollDown,
    ScrollUp,
    Refetch,
    Quit,
}

impl HostCommand {
    /// Parse one input line. Returns `None` for blank or unknown input.
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let command = match parts.next()? {
            "t" => Self::Toggle(NotificationId::new(parts.next()?)),
            "c" => Self::ClearAll,
            "u" => Self::ShowUnread,
            "j" => Self::ScrollDown,
            "k" => Self::ScrollUp,
            "r" => Self::Refetch,
            "q" => Self::Quit,
            _ => return None,
        };
        Some(command)
    }

    /// Translate into a panel message, using `view` to find current read state.
    ///
    /// A toggle for a row outside the rendered window yields `None`.
    pub fn into_message(self, view: &PanelView) -> Option<Message> {
        let message = match self {
            Self::Toggle(id) => {
                let row = view
                    .list
                    .as_ref()?
                    .rows
                    .iter()
                    .find(|r| r.row.key.id() == Some(&id))?;
                return row.row.on_toggle();
            }
            Self::ClearAll => Message::ClearAll,
            Self::ShowUnread => Message::ToggleShowUnread,
            Self::ScrollDown => Message::ScrollBy(SCROLL_STEP),
            Self::ScrollUp => Message::ScrollBy(-SCROLL_STEP),
            Self::Refetch => Message::RefetchNow,
            Self::Quit => Message::Close,
        };
        Some(message)
    }
}

/// Render a view as text.
pub fn render(view: &PanelView, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    let badge = if view.has_unread { " *" } else { "" };
    let _ = writeln!(out, "== {}{} ==", view.title, badge);
    if view.refreshing {
        let _ = writeln!(out, "{}", fl!("refreshing"));
    }

    if !view.actions.is_empty() {
        let actions: Vec<&str> = view.actions.iter().map(|a| a.label.as_str()).collect();
        let _ = writeln!(out, "[{}]", actions.join("] ["));
    }

    let Some(list) = &view.list else {
        let _ = writeln!(out, "{}", fl!("loading"));
        return out;
    };
    if list.row_count == 0 {
        let _ = writeln!(out, "{}", fl!("no-notifications"));
        return out;
    }

    if list.range.start > 0 {
        let _ = writeln!(out, "  ... {} above", list.range.start);
    }
    for placed in &list.rows {
        let _ = writeln!(out, "{}", render_row(placed, now));
    }
    let below = list.row_count - list.range.end;
    if below > 0 {
        let _ = writeln!(out, "  ... {} below", below);
    }
    out
}

fn render_row(placed: &PlacedRow, now: DateTime<Utc>) -> String {
    let row = &placed.row;
    let marker = if row.read { ' ' } else { '●' };
    let id = row
        .key
        .id()
        .map_or_else(|| "-".to_string(), |id| id.to_string());
    let state = if !row.valid {
        fl!("invalid")
    } else if row.read {
        fl!("read")
    } else {
        fl!("unread")
    };

    format!(
        "{} {} | {} | {} | {} | {} ({})",
        marker,
        row.type_label(),
        row.device_label(),
        row.message,
        row.created_label(now),
        state,
        id
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::PanelAction;
    use crate::list::RenderedList;
    use crate::row::{NotificationRow, RowKey};
    use admin_query::{NotificationDetail, NotificationType};
    use chrono::TimeZone;

    fn placed(index: usize, id: &str, read: bool) -> PlacedRow {
        PlacedRow {
            index,
            top: index as f32 * 58.0,
            height: 58.0,
            row: NotificationRow {
                key: RowKey::Stable(NotificationId::from(id)),
                notification_type: NotificationType::Compliance,
                detail: NotificationDetail::default(),
                message: format!("Customer {} blocked", id),
                device_name: Some("Kiosk A".to_string()),
                created: Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap(),
                read,
                valid: true,
            },
        }
    }

    fn view(rows: Vec<PlacedRow>, row_count: usize) -> PanelView {
        let range = rows.first().map_or(0, |r| r.index)..rows.last().map_or(0, |r| r.index + 1);
        PanelView {
            title: "Notifications".to_string(),
            has_unread: true,
            x_offset: 300.0,
            refreshing: false,
            close: Message::Close,
            actions: vec![PanelAction {
                label: "Mark all as read".to_string(),
                on_press: Message::ClearAll,
            }],
            list: Some(RenderedList {
                rows,
                range,
                row_count,
                total_height: row_count as f32 * 58.0,
                scroll_offset: 0.0,
            }),
        }
    }

    #[test]
    fn test_parses_commands() {
        assert_eq!(
            HostCommand::parse("t 42"),
            Some(HostCommand::Toggle(NotificationId::from("42")))
        );
        assert_eq!(HostCommand::parse("  q "), Some(HostCommand::Quit));
        assert_eq!(HostCommand::parse("t"), None);
        assert_eq!(HostCommand::parse(""), None);
        assert_eq!(HostCommand::parse("x"), None);
    }

    #[test]
    fn test_toggle_uses_rendered_read_state() {
        let view = view(vec![placed(0, "a", true)], 1);
        match HostCommand::Toggle(NotificationId::from("a")).into_message(&view) {
            Some(Message::ToggleRead { id, currently_read }) => {
                assert_eq!(id.as_str(), "a");
                assert!(currently_read);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(HostCommand::Toggle(NotificationId::from("zz"))
            .into_message(&view)
            .is_none());
    }

    #[test]
    fn test_renders_window_with_counts() {
        let now = Utc.with_ymd_and_hms(2024, 3, 3, 10, 0, 0).unwrap();
        let text = render(&view(vec![placed(3, "a", false), placed(4, "b", true)], 10), now);

        assert!(text.starts_with("== Notifications * =="));
        assert!(text.contains("[Mark all as read]"));
        assert!(text.contains("... 3 above"));
        assert!(text.contains("... 5 below"));
        assert!(text.contains("Kiosk A | Customer a blocked | 2024-03-01 10:00"));
        assert_eq!(text.matches('●').count(), 1);
    }

    #[test]
    fn test_renders_refreshing_marker() {
        let now = Utc.with_ymd_and_hms(2024, 3, 3, 10, 0, 0).unwrap();
        let mut view = view(vec![placed(0, "a", false)], 1);
        assert!(!render(&view, now).contains("Refreshing"));

        view.refreshing = true;
        let text = render(&view, now);
        assert!(text.contains("Refreshing"));
        assert!(text.contains("Customer a blocked"));
    }

    #[test]
    fn test_renders_loading() {
        let mut view = view(Vec::new(), 0);
        view.list = None;
        let text = render(&view, Utc::now());
        assert!(text.contains("Loading"));
    }
}
