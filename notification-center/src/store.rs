//! Latest fetched snapshot with request sequencing.

use admin_query::Snapshot;

/// Identifies one fetch request. Later requests carry larger tickets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetchTicket(u64);

impl FetchTicket {
    pub fn sequence(&self) -> u64 {
        self.0
    }
}

/// What happened to a completed fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response replaced the snapshot.
    Applied,
    /// A newer response was already applied; this one was dropped.
    Superseded,
    /// The request failed; the previous snapshot is kept.
    Failed(String),
}

/// Holds the authoritative snapshot for one panel instance.
///
/// A response is applied only when its ticket is newer than the last
/// applied one, so a slow scheduled poll cannot overwrite the refetch that
/// followed a mutation.
#[derive(Debug, Default)]
pub struct NotificationStore {
    snapshot: Option<Snapshot>,
    next_ticket: u64,
    applied: Option<FetchTicket>,
    in_flight: usize,
}

impl NotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new fetch and return its ticket.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.next_ticket += 1;
        self.in_flight += 1;
        FetchTicket(self.next_ticket)
    }

    /// Record the result of the fetch identified by `ticket`.
    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        result: Result<Snapshot, String>,
    ) -> FetchOutcome {
        self.in_flight = self.in_flight.saturating_sub(1);

        let snapshot = match result {
            Ok(snapshot) => snapshot,
            Err(err) => {
                tracing::warn!(
                    "Fetch #{} failed, keeping previous notifications: {}",
                    ticket.sequence(),
                    err
                );
                return FetchOutcome::Failed(err);
            }
        };

        if self.applied.is_some_and(|applied| applied > ticket) {
            tracing::debug!(
                "Dropping fetch #{}, #{} already applied",
                ticket.sequence(),
                self.applied.map_or(0, |t| t.sequence())
            );
            return FetchOutcome::Superseded;
        }

        tracing::debug!(
            "Applying fetch #{}: {} notification(s), unread={}",
            ticket.sequence(),
            snapshot.notifications.len(),
            snapshot.has_unread_notifications
        );
        self.snapshot = Some(snapshot);
        self.applied = Some(ticket);
        FetchOutcome::Applied
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    /// True until the first snapshot has been applied.
    pub fn is_loading(&self) -> bool {
        self.snapshot.is_none()
    }

    /// Whether any fetch is outstanding.
    pub fn is_fetching(&self) -> bool {
        self.in_flight > 0
    }

    /// Forget the snapshot. Outstanding tickets are left to be superseded.
    pub fn clear(&mut self) {
        self.snapshot = None;
    }
}
