//! Notification center panel for the admin console.
//!
//! The panel polls the query service for notifications, lets the operator
//! filter to unread ones, toggle a notification's read state and mark all
//! read, and renders the list through a windowed, lazily measured list.
//!
//! The crate is headless: [`NotificationCenter`] turns messages into state
//! changes and produces a [`PanelView`] that a host draws. [`mount`] runs the
//! panel on tokio against any [`admin_query::QueryService`].

pub mod app;
pub mod config;
pub mod constants;
pub mod devices;
pub mod filter;
pub mod i18n;
pub mod list;
pub mod row;
pub mod runtime;
pub mod store;
pub mod terminal;
pub mod unread;

pub use app::{
    Anchor, Callback, Command, FixedAnchor, Message, NotificationCenter, PanelAction, PanelProps,
    PanelView,
};
pub use config::Config;
pub use list::{FixedHeight, LineWrapMeasurer, RenderedList, RowMeasurer, Viewport};
pub use row::{NotificationRow, RowKey, RowSignature};
pub use runtime::{mount, poll_subscription, PanelHandle};
