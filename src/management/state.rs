use std::{
    fmt,
    sync::{
        Mutex,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
};

use crate::types::Receipt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    LoggedOut,
    Authenticating,
    LoggedIn,
    TokenExpiring,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SessionState::LoggedOut => "logged out",
            SessionState::Authenticating => "authenticating",
            SessionState::LoggedIn => "logged in",
            SessionState::TokenExpiring => "logged in (token expiring)",
        };
        f.write_str(label)
    }
}

/// Identifies one load request; higher generations are newer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LoadTicket(u64);

impl LoadTicket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// Hands out monotonically increasing load tickets.
#[derive(Debug, Default)]
pub struct LoadTracker {
    latest: AtomicU64,
}

impl LoadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> LoadTicket {
        LoadTicket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }
}

/// The receipt currently on display.
///
/// Loads are never cancelled, so a slow response can arrive after a newer
/// load began. Only the response for the most recently issued ticket is kept.
///
/// Periodic reloads go through [`ReceiptView::try_begin_load`], which refuses
/// to start a load while the previous one is still running. Otherwise loads
/// slower than the reload period would always be superseded and nothing would
/// ever be shown.
#[derive(Debug, Default)]
pub struct ReceiptView {
    tracker: LoadTracker,
    in_flight: AtomicBool,
    current: Mutex<Option<(LoadTicket, Receipt)>>,
}

impl ReceiptView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_load(&self) -> LoadTicket {
        self.tracker.begin()
    }

    /// Starts a load unless one started here has not finished yet.
    pub fn try_begin_load(&self) -> Option<LoadTicket> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return None;
        }
        Some(self.tracker.begin())
    }

    /// Marks the load for `ticket` as finished without a receipt.
    pub fn settle(&self, ticket: LoadTicket) {
        if self.tracker.is_current(ticket) {
            self.in_flight.store(false, Ordering::SeqCst);
        }
    }

    /// Stores `receipt` if `ticket` is still the latest. Returns whether it was applied.
    pub fn apply(&self, ticket: LoadTicket, receipt: Receipt) -> bool {
        let mut current = self
            .current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if !self.tracker.is_current(ticket) {
            log::debug!(
                "dropping stale receipt from load {} (latest is newer)",
                ticket.generation()
            );
            return false;
        }

        *current = Some((ticket, receipt));
        self.in_flight.store(false, Ordering::SeqCst);
        true
    }

    pub fn current(&self) -> Option<Receipt> {
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .as_ref()
            .map(|(_, receipt)| receipt.clone())
    }

    pub fn current_generation(&self) -> Option<u64> {
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .as_ref()
            .map(|(ticket, _)| ticket.generation())
    }
}
