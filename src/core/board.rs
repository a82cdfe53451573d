//! Latest snapshot shared with readers (HTTP surface, dashboards)

use tokio::sync::watch;

use crate::core::snapshot::MarketSnapshot;

/// Single-writer publication point for [`MarketSnapshot`]s.
///
/// Readers get clones; nothing they do flows back into the monitor.
#[derive(Clone)]
pub struct SnapshotBoard {
    sender: watch::Sender<MarketSnapshot>,
}

impl SnapshotBoard {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(MarketSnapshot::empty());
        Self { sender }
    }

    pub fn publish(&self, snapshot: MarketSnapshot) {
        self.sender.send_replace(snapshot);
    }

    pub fn latest(&self) -> MarketSnapshot {
        self.sender.borrow().clone()
    }
}

impl Default for SnapshotBoard {
    fn default() -> Self {
        Self::new()
    }
}
