//! progress reporting for a send.
//!
//! A [StatusSink] receives one [Status] marker per pipeline transition. Sinks
//! are fire-and-forget: they cannot fail or influence the pipeline. The last
//! marker of every send is either [Status::Accepted] or [Status::Failed].
use std::sync::Mutex;

use serde::Deserialize;
use serde::Serialize;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumIter,
)]
pub enum Status {
    FetchingLatestBalance,
    CalculatingFee,
    OutputsSelected,
    FetchingDecoyOutputs,
    ConstructingTransaction,
    SubmittingTransaction,
    Accepted,
    Failed,
}

impl Status {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Accepted | Self::Failed)
    }
}

pub trait StatusSink: Send + Sync {
    fn report(&self, status: Status);
}

impl<F> StatusSink for F
where
    F: Fn(Status) + Send + Sync,
{
    fn report(&self, status: Status) {
        self(status)
    }
}

/// discards all markers.
impl StatusSink for () {
    fn report(&self, _status: Status) {}
}

/// records every marker in order.
#[derive(Debug, Default)]
pub struct StatusLog {
    markers: Mutex<Vec<Status>>,
}

impl StatusLog {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn markers(&self) -> Vec<Status> {
        match self.markers.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn last(&self) -> Option<Status> {
        self.markers().last().copied()
    }

    pub fn contains(&self, status: Status) -> bool {
        self.markers().contains(&status)
    }
}

impl StatusSink for StatusLog {
    fn report(&self, status: Status) {
        tracing::trace!(%status, "send status");
        match self.markers.lock() {
            Ok(mut guard) => guard.push(status),
            Err(poisoned) => poisoned.into_inner().push(status),
        }
    }
}
