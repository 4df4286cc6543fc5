//! Tracks metadata for a loading/rendering session.

use crate::log;

/// Metadata for a loading/rendering session.
///
/// Every [`crate::Rsvg`] creates one of these when it is constructed, and hands a
/// clone to its handle and to the rendering engine.  There is no context before
/// that point where the library could keep track of things like whether logging
/// is enabled.
#[derive(Clone, Debug)]
pub struct Session {
    log_enabled: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            log_enabled: log::log_enabled(),
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session that never logs, regardless of `RSVG_LOG`.
    pub fn new_for_test_suite() -> Self {
        Self { log_enabled: false }
    }

    pub fn log_enabled(&self) -> bool {
        self.log_enabled
    }
}
