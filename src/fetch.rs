//! Cached fetch slots with request sequencing.
//!
//! Every request issued through a [`Resource`] gets a sequence number. A
//! completion is applied only when it belongs to the latest issued request, so
//! a slow response can never overwrite the result of a newer one.

use crate::metrics::ui::record_stale_response;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Handle for one issued request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Point-in-time view of a resource
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<T> {
    pub data: Option<T>,
    pub error: Option<String>,
    pub is_loading: bool,
}

impl<T> Snapshot<T> {
    fn empty() -> Self {
        Self {
            data: None,
            error: None,
            is_loading: false,
        }
    }
}

struct Slot<T> {
    issued: u64,
    snapshot: Snapshot<T>,
    stale: bool,
}

#[derive(Clone)]
pub struct Resource<T> {
    name: &'static str,
    slot: Arc<Mutex<Slot<T>>>,
}

impl<T: Clone> Resource<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            slot: Arc::new(Mutex::new(Slot {
                issued: 0,
                snapshot: Snapshot::empty(),
                stale: true,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Slot<T>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Issue a new request, superseding any request still in flight
    pub fn begin(&self) -> Ticket {
        let mut slot = self.lock();
        slot.issued += 1;
        slot.snapshot.is_loading = true;
        Ticket(slot.issued)
    }

    /// Apply the outcome of a request. Returns false when the ticket was superseded.
    pub fn complete(&self, ticket: Ticket, result: anyhow::Result<T>) -> bool {
        let mut slot = self.lock();

        if ticket.0 != slot.issued {
            tracing::debug!(
                resource = self.name,
                "Discarding stale response {} (latest is {})",
                ticket.0,
                slot.issued
            );
            record_stale_response(self.name);
            return false;
        }

        slot.snapshot.is_loading = false;
        slot.stale = false;

        match result {
            Ok(data) => {
                slot.snapshot.data = Some(data);
                slot.snapshot.error = None;
            }
            Err(e) => {
                tracing::warn!(resource = self.name, "Fetch failed: {}", e);
                slot.snapshot.error = Some(e.to_string());
            }
        }

        true
    }

    /// Issue a request and apply its outcome
    pub async fn load<F>(&self, request: F) -> bool
    where
        F: Future<Output = anyhow::Result<T>>,
    {
        let ticket = self.begin();
        let result = request.await;
        self.complete(ticket, result)
    }

    /// Mark the cached value as outdated. In-flight requests are dropped when they complete.
    pub fn invalidate(&self) {
        let mut slot = self.lock();
        slot.issued += 1;
        slot.stale = true;
        slot.snapshot.is_loading = false;
    }

    /// Whether the resource has never loaded or was invalidated since
    pub fn is_stale(&self) -> bool {
        self.lock().stale
    }

    pub fn snapshot(&self) -> Snapshot<T> {
        self.lock().snapshot.clone()
    }

    pub fn data(&self) -> Option<T> {
        self.lock().snapshot.data.clone()
    }
}
