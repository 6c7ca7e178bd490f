//! Mounted panel: polling, request execution and view publishing.
//!
//! [`mount`] spawns a task that owns the [`NotificationCenter`]. The task
//! merges three sources of messages (poll ticks, completed service
//! requests, and messages from the host) and publishes a fresh
//! [`PanelView`] after each one.

use crate::app::{Command, Message, NotificationCenter, PanelProps, PanelView};
use crate::config::Config;
use crate::list::RowMeasurer;
use admin_query::QueryService;
use futures_util::{Stream, StreamExt};
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{Instant, Interval, MissedTickBehavior};

enum PollState {
    Init(Duration),
    Ticking(Interval),
}

/// Create a stream that yields [`Message::Poll`] every `period`.
///
/// The first tick comes one full period after the stream is first polled.
/// A tick that is late because the consumer was busy delays the following
/// ones instead of firing in a burst.
pub fn poll_subscription(period: Duration) -> impl Stream<Item = Message> {
    futures_util::stream::unfold(PollState::Init(period), |state| async move {
        let mut interval = match state {
            PollState::Init(period) => {
                let mut interval = tokio::time::interval_at(Instant::now() + period, period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                tracing::debug!("Polling every {:?}", period);
                interval
            }
            PollState::Ticking(interval) => interval,
        };

        interval.tick().await;
        Some((Message::Poll, PollState::Ticking(interval)))
    })
}

/// A running panel.
///
/// Dropping the handle stops the panel; outstanding requests are abandoned
/// and their results never reach the panel state.
pub struct PanelHandle {
    inbox: mpsc::UnboundedSender<Message>,
    views: watch::Receiver<PanelView>,
    task: Option<JoinHandle<()>>,
}

impl PanelHandle {
    /// Deliver a message to the panel. Returns false once the panel has stopped.
    pub fn send(&self, message: Message) -> bool {
        self.inbox.send(message).is_ok()
    }

    /// Receiver that observes every published view.
    pub fn views(&self) -> watch::Receiver<PanelView> {
        self.views.clone()
    }

    /// The most recently published view.
    pub fn current(&self) -> PanelView {
        self.views.borrow().clone()
    }

    /// Stop the panel and wait until its task is gone.
    pub async fn unmount(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
        }
        tracing::debug!("Notification center unmounted");
    }

    /// Wait until the panel stops on its own (after [`Message::Close`]).
    pub async fn wait(mut self) {
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                if e.is_panic() {
                    tracing::error!("Notification center task panicked: {}", e);
                }
            }
        }
    }
}

impl Drop for PanelHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Start the panel against `service` and return a handle to it.
///
/// The first fetch starts immediately; scheduled polls follow every
/// `config.poll_interval()`. Must be called from within a tokio runtime.
pub fn mount<M>(
    service: Arc<dyn QueryService>,
    props: PanelProps,
    config: &Config,
    mut measurer: M,
) -> PanelHandle
where
    M: RowMeasurer + Send + 'static,
{
    let mut panel = NotificationCenter::new(props, config);
    let (views_tx, views_rx) = watch::channel(panel.view(&mut measurer));
    let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();

    let period = config.poll_interval();
    let task = tokio::spawn(run_panel(panel, service, measurer, inbox_rx, views_tx, period));

    PanelHandle {
        inbox: inbox_tx,
        views: views_rx,
        task: Some(task),
    }
}

async fn run_panel<M>(
    mut panel: NotificationCenter,
    service: Arc<dyn QueryService>,
    mut measurer: M,
    mut inbox: mpsc::UnboundedReceiver<Message>,
    views: watch::Sender<PanelView>,
    period: Duration,
) where
    M: RowMeasurer + Send + 'static,
{
    let mut requests: JoinSet<Message> = JoinSet::new();
    let polls = poll_subscription(period);
    futures_util::pin_mut!(polls);

    tracing::info!("Notification center mounted");
    let initial = panel.update(Message::RefetchNow);
    if execute(initial, &service, &mut requests).is_break() {
        return;
    }

    loop {
        let message = tokio::select! {
            Some(message) = polls.next() => message,
            Some(joined) = requests.join_next(), if !requests.is_empty() => match joined {
                Ok(message) => message,
                Err(e) => {
                    tracing::warn!("Request task failed: {}", e);
                    continue;
                }
            },
            received = inbox.recv() => match received {
                Some(message) => message,
                None => {
                    tracing::debug!("Host dropped the panel inbox");
                    break;
                }
            },
        };

        let command = panel.update(message);
        if execute(command, &service, &mut requests).is_break() {
            break;
        }
        views.send_replace(panel.view(&mut measurer));
    }

    // Results of abandoned requests must never reach the panel.
    requests.abort_all();
}

/// Carry out a command, spawning service requests onto `requests`.
fn execute(
    command: Command,
    service: &Arc<dyn QueryService>,
    requests: &mut JoinSet<Message>,
) -> ControlFlow<()> {
    match command {
        Command::None => {}
        Command::Fetch(ticket) => {
            let service = Arc::clone(service);
            requests.spawn(async move {
                let result = service
                    .get_notifications()
                    .await
                    .map_err(|e| e.to_string());
                Message::SnapshotLoaded(ticket, result)
            });
        }
        Command::ToggleRead { id, read } => {
            let service = Arc::clone(service);
            requests.spawn(async move {
                let result = service
                    .toggle_clear_notification(&id, read)
                    .await
                    .map_err(|e| e.to_string());
                Message::ToggleReadComplete(result)
            });
        }
        Command::ClearAll => {
            let service = Arc::clone(service);
            requests.spawn(async move {
                let result = service
                    .clear_all_notifications()
                    .await
                    .map(|cleared| cleared.len())
                    .map_err(|e| e.to_string());
                Message::ClearAllComplete(result)
            });
        }
        Command::Unmount => return ControlFlow::Break(()),
    }
    ControlFlow::Continue(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::FixedAnchor;
    use crate::list::{FixedHeight, Viewport};
    use admin_query::{
        ClearAck, Machine, MemoryQueryService, Notification, NotificationDetail, NotificationId,
        NotificationType, Snapshot, ToggleAck,
    };
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    fn notification(id: &str, read: bool) -> Notification {
        Notification {
            id: Some(NotificationId::from(id)),
            notification_type: NotificationType::FiatBalance,
            detail: NotificationDetail {
                device_id: Some("d1".to_string()),
                extra: Default::default(),
            },
            message: format!("Cassette low on {}", id),
            created: Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap(),
            read,
            valid: true,
        }
    }

    fn service(notifications: Vec<Notification>) -> Arc<MemoryQueryService> {
        Arc::new(MemoryQueryService::new(
            notifications,
            vec![Machine {
                device_id: "d1".to_string(),
                name: "Kiosk A".to_string(),
            }],
        ))
    }

    struct Counters {
        header: Arc<AtomicUsize>,
        close: Arc<AtomicUsize>,
    }

    fn props(has_unread_prop: bool) -> (PanelProps, Counters) {
        let header = Arc::new(AtomicUsize::new(0));
        let close = Arc::new(AtomicUsize::new(0));
        let props = PanelProps {
            close: {
                let close = close.clone();
                Arc::new(move || {
                    close.fetch_add(1, Ordering::SeqCst);
                })
            },
            refetch_has_unread_header: {
                let header = header.clone();
                Arc::new(move || {
                    header.fetch_add(1, Ordering::SeqCst);
                })
            },
            has_unread_prop,
            anchor: Arc::new(FixedAnchor(200.0)),
        };
        (props, Counters { header, close })
    }

    fn mount_with(service: Arc<dyn QueryService>, has_unread_prop: bool) -> (PanelHandle, Counters) {
        let (props, counters) = props(has_unread_prop);
        let handle = mount(service, props, &Config::default(), FixedHeight(58.0));
        handle.send(Message::Resized(Viewport::new(320.0, 580.0)));
        (handle, counters)
    }

    /// Let the panel task drain its queue without reaching the next poll.
    async fn settle() {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    fn row_ids(view: &PanelView) -> Vec<(String, bool)> {
        view.list
            .as_ref()
            .map(|list| {
                list.rows
                    .iter()
                    .map(|r| (r.row.key.id().unwrap().to_string(), r.row.read))
                    .collect()
            })
            .unwrap_or_default()
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_subscription_ticks_after_each_period() {
        let start = Instant::now();
        let polls = poll_subscription(Duration::from_secs(60));
        futures_util::pin_mut!(polls);

        assert!(matches!(polls.next().await, Some(Message::Poll)));
        let first = start.elapsed();
        assert!(first >= Duration::from_secs(60) && first < Duration::from_secs(61));
        assert!(matches!(polls.next().await, Some(Message::Poll)));
        let second = start.elapsed();
        assert!(second >= Duration::from_secs(120) && second < Duration::from_secs(121));
    }

    #[tokio::test(start_paused = true)]
    async fn test_loads_immediately_then_polls() {
        let service = service(vec![notification("a", false), notification("b", true)]);
        let (handle, _counters) = mount_with(service.clone(), false);

        assert!(handle.current().list.is_none());
        settle().await;
        assert_eq!(service.fetch_count().await, 1);
        assert_eq!(
            row_ids(&handle.current()),
            vec![("a".to_string(), false), ("b".to_string(), true)]
        );

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(service.fetch_count().await, 2);
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(service.fetch_count().await, 3);

        handle.unmount().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_header_refresh_fires_once_while_unread_persists() {
        let service = service(vec![notification("a", false)]);
        let (handle, counters) = mount_with(service, false);

        settle().await;
        assert_eq!(counters.header.load(Ordering::SeqCst), 1);
        tokio::time::sleep(Duration::from_secs(180)).await;
        assert_eq!(counters.header.load(Ordering::SeqCst), 1);
        assert!(handle.current().has_unread);

        handle.unmount().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_poll_keeps_previous_rows() {
        let service = service(vec![notification("a", false), notification("b", false)]);
        let (handle, _counters) = mount_with(service.clone(), true);
        settle().await;

        service.fail_next_fetches(1).await;
        service.replace_notifications(vec![notification("c", false)]).await;
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(service.fetch_count().await, 2);
        assert_eq!(row_ids(&handle.current()).len(), 2);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(row_ids(&handle.current()), vec![("c".to_string(), false)]);

        handle.unmount().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggling_a_row_refetches() {
        let service = service(vec![notification("a", false), notification("b", true)]);
        let (handle, _counters) = mount_with(service.clone(), true);
        settle().await;

        let toggle = handle.current().list.unwrap().rows[0]
            .row
            .on_toggle()
            .unwrap();
        handle.send(toggle);
        settle().await;

        assert_eq!(service.fetch_count().await, 2);
        assert!(service.notifications().await[0].read);
        assert_eq!(
            row_ids(&handle.current()),
            vec![("a".to_string(), true), ("b".to_string(), true)]
        );

        handle.unmount().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_toggle_does_not_refetch() {
        let service = service(vec![notification("a", false)]);
        let (handle, _counters) = mount_with(service.clone(), true);
        settle().await;

        service.fail_next_mutations(1).await;
        handle.send(Message::ToggleRead {
            id: NotificationId::from("a"),
            currently_read: false,
        });
        settle().await;

        assert_eq!(service.fetch_count().await, 1);
        assert_eq!(row_ids(&handle.current()), vec![("a".to_string(), false)]);

        handle.unmount().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_all_while_showing_unread() {
        let service = service(vec![
            notification("a", false),
            notification("b", false),
            notification("c", false),
        ]);
        let (handle, counters) = mount_with(service.clone(), false);
        settle().await;
        assert_eq!(counters.header.load(Ordering::SeqCst), 1);

        handle.send(Message::ToggleShowUnread);
        settle().await;
        assert_eq!(handle.current().actions[0].label, "Show all");

        handle.send(Message::ClearAll);
        settle().await;

        let view = handle.current();
        assert!(!view.has_unread);
        assert!(view.actions.is_empty());
        assert_eq!(
            row_ids(&view),
            vec![
                ("a".to_string(), true),
                ("b".to_string(), true),
                ("c".to_string(), true),
            ]
        );
        assert_eq!(counters.header.load(Ordering::SeqCst), 2);

        handle.unmount().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_stops_the_panel() {
        let service = service(vec![notification("a", false)]);
        let (handle, counters) = mount_with(service, false);
        settle().await;

        assert!(handle.send(Message::Close));
        let mut views = handle.views();
        handle.wait().await;

        assert_eq!(counters.close.load(Ordering::SeqCst), 1);
        let _ = views.borrow_and_update();
        assert!(views.changed().await.is_err());
    }

    /// Service whose fetches block until released.
    #[derive(Default)]
    struct GatedService {
        gate: Notify,
        started: AtomicUsize,
    }

    #[async_trait]
    impl QueryService for GatedService {
        async fn get_notifications(&self) -> admin_query::Result<Snapshot> {
            self.started.fetch_add(1, Ordering::SeqCst);
            self.gate.notified().await;
            Ok(Snapshot {
                notifications: vec![notification("late", false)],
                has_unread_notifications: true,
                machines: Vec::new(),
            })
        }

        async fn toggle_clear_notification(
            &self,
            id: &NotificationId,
            read: bool,
        ) -> admin_query::Result<ToggleAck> {
            Ok(ToggleAck {
                id: id.clone(),
                read,
            })
        }

        async fn clear_all_notifications(&self) -> admin_query::Result<Vec<ClearAck>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_unmount_abandons_in_flight_fetch() {
        let service = Arc::new(GatedService::default());
        let (handle, counters) = mount_with(service.clone(), false);
        settle().await;
        assert_eq!(service.started.load(Ordering::SeqCst), 1);

        let mut views = handle.views();
        let _ = views.borrow_and_update();
        handle.unmount().await;

        service.gate.notify_waiters();
        settle().await;

        assert_eq!(counters.header.load(Ordering::SeqCst), 0);
        assert!(views.borrow().list.is_none());
        assert!(views.changed().await.is_err());
    }
}
