//! Unread aggregate transition detection.

/// The previous and current aggregate unread flags seen by one sync step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnreadSync {
    pub previous: bool,
    pub current: bool,
}

impl UnreadSync {
    pub fn changed(&self) -> bool {
        self.previous != self.current
    }
}

/// Tracks the last observed aggregate unread flag.
///
/// Seeded with the host's value so that a first snapshot agreeing with the
/// host does not count as a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnreadDetector {
    last_known: bool,
}

impl UnreadDetector {
    pub fn new(seed: bool) -> Self {
        Self { last_known: seed }
    }

    pub fn last_known(&self) -> bool {
        self.last_known
    }

    /// Record `current` and return the transition, if there was one.
    ///
    /// Repeated observations of the same value return `None`.
    pub fn observe(&mut self, current: bool) -> Option<UnreadSync> {
        let sync = UnreadSync {
            previous: self.last_known,
            current,
        };
        self.last_known = current;
        sync.changed().then_some(sync)
    }
}
