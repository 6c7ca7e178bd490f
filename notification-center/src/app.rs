//! Notification center state and logic.
//!
//! The panel is driven by [`Message`]s. [`NotificationCenter::update`]
//! applies one message and returns the [`Command`] the runtime should carry
//! out; [`NotificationCenter::view`] renders the current state.

use crate::config::Config;
use crate::constants::panel::DEFAULT_X_OFFSET;
use crate::devices::DeviceIndex;
use crate::filter::visible_notifications;
use crate::fl;
use crate::list::{RenderedList, RowMeasurer, Viewport, WindowedList};
use crate::row::{NotificationRow, RowSignature};
use crate::store::{FetchOutcome, FetchTicket, NotificationStore};
use crate::unread::UnreadDetector;
use admin_query::{NotificationId, Snapshot, ToggleAck};
use std::fmt;
use std::sync::Arc;

/// Host callback taking no arguments.
pub type Callback = Arc<dyn Fn() + Send + Sync>;

/// The host element the panel is positioned against.
pub trait Anchor: fmt::Debug + Send + Sync {
    /// Current horizontal screen position of the element.
    fn screen_x(&self) -> f32;
}

/// An anchor that never moves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedAnchor(pub f32);

impl Anchor for FixedAnchor {
    fn screen_x(&self) -> f32 {
        self.0
    }
}

/// What the host hands to the panel when opening it.
#[derive(Clone)]
pub struct PanelProps {
    /// Dismisses the panel. Called when the operator presses the header bell.
    pub close: Callback,
    /// Refreshes the unread indicator in the host's header. Called once per
    /// change of the aggregate unread flag.
    pub refetch_has_unread_header: Callback,
    /// Unread state the host already knows. Seeds transition detection so a
    /// first snapshot that agrees with the host triggers no refresh.
    pub has_unread_prop: bool,
    /// Element the panel is anchored to; only its horizontal position is read.
    pub anchor: Arc<dyn Anchor>,
}

impl PanelProps {
    /// Props with no-op callbacks, anchored at `x`.
    pub fn detached(has_unread_prop: bool, x: f32) -> Self {
        Self {
            close: Arc::new(|| {}),
            refetch_has_unread_header: Arc::new(|| {}),
            has_unread_prop,
            anchor: Arc::new(FixedAnchor(x)),
        }
    }
}

impl fmt::Debug for PanelProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanelProps")
            .field("has_unread_prop", &self.has_unread_prop)
            .field("anchor", &self.anchor)
            .finish_non_exhaustive()
    }
}

/// Messages that drive the panel's state changes.
#[derive(Debug, Clone)]
pub enum Message {
    /// Scheduled poll tick
    Poll,
    /// Fetch immediately, outside the poll schedule
    RefetchNow,
    /// A fetch completed
    SnapshotLoaded(FetchTicket, Result<Snapshot, String>),

    // Read state
    /// Flip the read state of one notification
    ToggleRead {
        id: NotificationId,
        currently_read: bool,
    },
    /// Toggle mutation completed
    ToggleReadComplete(Result<ToggleAck, String>),
    /// Mark every notification read
    ClearAll,
    /// Clear-all mutation completed (number of notifications cleared)
    ClearAllComplete(Result<usize, String>),

    // View
    /// Switch between all and unread-only
    ToggleShowUnread,
    /// The list container changed size
    Resized(Viewport),
    /// Scroll towards the end of the list (negative scrolls back)
    ScrollBy(f32),
    /// Scroll to an absolute content offset
    ScrollTo(f32),
    /// The host replaced the anchor element
    AnchorChanged(Arc<dyn Anchor>),
    /// Header bell pressed
    Close,
}

/// Work for the runtime after an update.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    None,
    /// Fetch a snapshot and answer with [`Message::SnapshotLoaded`]
    Fetch(FetchTicket),
    /// Set the read state and answer with [`Message::ToggleReadComplete`]
    ToggleRead { id: NotificationId, read: bool },
    /// Mark all read and answer with [`Message::ClearAllComplete`]
    ClearAll,
    /// Stop the panel
    Unmount,
}

/// A button in the panel's action bar.
#[derive(Debug, Clone)]
pub struct PanelAction {
    pub label: String,
    pub on_press: Message,
}

/// Everything the host needs to draw the panel.
#[derive(Debug, Clone)]
pub struct PanelView {
    pub title: String,
    /// Show the unread badge on the header bell.
    pub has_unread: bool,
    /// Horizontal screen offset of the panel.
    pub x_offset: f32,
    /// A fetch is outstanding while rows from an earlier snapshot are shown.
    pub refreshing: bool,
    pub close: Message,
    /// Only present while there are unread notifications.
    pub actions: Vec<PanelAction>,
    /// `None` while the first fetch is in flight or the container has no size.
    pub list: Option<RenderedList>,
}

/// The notification center state.
pub struct NotificationCenter {
    props: PanelProps,
    store: NotificationStore,
    devices: DeviceIndex,
    unread: UnreadDetector,
    /// Show only unread notifications (while any are unread)
    showing_unread: bool,
    list: WindowedList,
    /// Set when the filtered sequence must be re-derived for the list
    list_dirty: bool,
    viewport: Viewport,
    x_offset: f32,
}

impl NotificationCenter {
    pub fn new(props: PanelProps, config: &Config) -> Self {
        let unread = UnreadDetector::new(props.has_unread_prop);
        Self {
            props,
            store: NotificationStore::new(),
            devices: DeviceIndex::default(),
            unread,
            showing_unread: false,
            list: WindowedList::new(config.default_row_height, config.overscan_rows),
            list_dirty: true,
            viewport: Viewport::default(),
            x_offset: DEFAULT_X_OFFSET,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.store.is_loading()
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.store.snapshot()
    }

    /// Last observed aggregate unread flag.
    pub fn has_unread(&self) -> bool {
        self.unread.last_known()
    }

    pub fn showing_unread(&self) -> bool {
        self.showing_unread
    }

    pub fn x_offset(&self) -> f32 {
        self.x_offset
    }

    pub fn devices(&self) -> &DeviceIndex {
        &self.devices
    }

    pub fn update(&mut self, message: Message) -> Command {
        match message {
            Message::Poll => {
                tracing::debug!("Poll tick");
                return self.refetch_now();
            }
            Message::RefetchNow => return self.refetch_now(),
            Message::SnapshotLoaded(ticket, result) => {
                if self.store.complete(ticket, result) == FetchOutcome::Applied {
                    self.snapshot_applied();
                }
            }

            // Read state
            Message::ToggleRead { id, currently_read } => {
                tracing::info!("Setting notification {} read={}", id, !currently_read);
                return Command::ToggleRead {
                    id,
                    read: !currently_read,
                };
            }
            Message::ToggleReadComplete(result) => match result {
                Ok(ack) => {
                    tracing::debug!("Notification {} is now read={}", ack.id, ack.read);
                    return self.refetch_now();
                }
                Err(err) => {
                    tracing::error!("Error while clearing notification: {}", err);
                }
            },
            Message::ClearAll => {
                tracing::info!("Marking all notifications read");
                return Command::ClearAll;
            }
            Message::ClearAllComplete(result) => match result {
                Ok(count) => {
                    tracing::debug!("Cleared {} notification(s)", count);
                    return self.refetch_now();
                }
                Err(err) => {
                    tracing::error!("Error while clearing all notifications: {}", err);
                }
            },

            // View
            Message::ToggleShowUnread => {
                self.showing_unread = !self.showing_unread;
                self.list_dirty = true;
            }
            Message::Resized(viewport) => {
                self.viewport = viewport;
            }
            Message::ScrollBy(delta) => {
                self.list.scroll_by(delta, self.viewport.height);
            }
            Message::ScrollTo(offset) => {
                self.list.scroll_to(offset, self.viewport.height);
            }
            Message::AnchorChanged(anchor) => {
                self.props.anchor = anchor;
                self.x_offset = self.props.anchor.screen_x();
            }
            Message::Close => {
                tracing::debug!("Closing notification center");
                (self.props.close)();
                self.store.clear();
                return Command::Unmount;
            }
        }

        Command::None
    }

    fn refetch_now(&mut self) -> Command {
        Command::Fetch(self.store.begin_fetch())
    }

    fn snapshot_applied(&mut self) {
        let Some(snapshot) = self.store.snapshot() else {
            return;
        };

        self.devices = DeviceIndex::from_machines(&snapshot.machines);
        if let Some(sync) = self.unread.observe(snapshot.has_unread_notifications) {
            tracing::debug!(
                "Unread changed {} -> {}, refreshing header",
                sync.previous,
                sync.current
            );
            (self.props.refetch_has_unread_header)();
        }
        self.x_offset = self.props.anchor.screen_x();
        self.list_dirty = true;
    }

    /// Render the panel, measuring newly visible rows with `measurer`.
    pub fn view<M>(&mut self, measurer: &mut M) -> PanelView
    where
        M: RowMeasurer + ?Sized,
    {
        let has_unread = self.unread.last_known();
        let actions = if has_unread {
            vec![
                PanelAction {
                    label: if self.showing_unread {
                        fl!("show-all")
                    } else {
                        fl!("show-unread")
                    },
                    on_press: Message::ToggleShowUnread,
                },
                PanelAction {
                    label: fl!("mark-all-read"),
                    on_press: Message::ClearAll,
                },
            ]
        } else {
            Vec::new()
        };

        PanelView {
            title: fl!("notifications"),
            has_unread,
            x_offset: self.x_offset,
            refreshing: self.store.is_fetching() && !self.store.is_loading(),
            close: Message::Close,
            actions,
            list: self.render_list(measurer),
        }
    }

    fn render_list<M>(&mut self, measurer: &mut M) -> Option<RenderedList>
    where
        M: RowMeasurer + ?Sized,
    {
        let snapshot = self.store.snapshot()?;
        if self.viewport.is_empty() {
            return None;
        }

        let visible = visible_notifications(
            &snapshot.notifications,
            self.showing_unread,
            snapshot.has_unread_notifications,
        );

        let devices = &self.devices;
        if self.list_dirty {
            let rows = visible
                .iter()
                .enumerate()
                .map(|(i, n)| RowSignature::of(i, n, devices))
                .collect();
            self.list.reset(rows, self.viewport.width);
            self.list_dirty = false;
        }

        let rendered = self.list.render(
            self.viewport,
            |i| NotificationRow::format(i, visible[i], devices),
            measurer,
        );
        Some(rendered)
    }
}
