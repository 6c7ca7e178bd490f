//! Centralized constants for intervals, layout defaults, and limits.
//!
//! This module provides a single location for all tunable values used
//! throughout the notification center, making them easy to discover and adjust.

/// Polling constants.
pub mod polling {
    /// Interval between scheduled notification fetches (milliseconds).
    pub const INTERVAL_MS: u64 = 60_000;
}

/// Windowed list constants.
pub mod list {
    /// Rows rendered beyond each edge of the viewport.
    pub const OVERSCAN_ROWS: usize = 5;

    /// Placeholder height for rows that have not been measured yet.
    pub const DEFAULT_ROW_HEIGHT: f32 = 58.0;

    /// Distance scrolled per line step (`j`/`k` in the terminal host).
    pub const SCROLL_STEP: f32 = 58.0;
}

/// Panel placement constants.
pub mod panel {
    /// Horizontal offset used until the anchor element has been read.
    pub const DEFAULT_X_OFFSET: f32 = 300.0;
}

/// Row height estimation for text hosts.
pub mod measure {
    /// Average glyph advance used to estimate wrapping.
    pub const CHAR_WIDTH: f32 = 7.0;

    /// Height of one wrapped message line.
    pub const LINE_HEIGHT: f32 = 18.0;

    /// Vertical space taken by the type/device/timestamp header and padding.
    pub const ROW_CHROME: f32 = 40.0;
}
