//! Cola de work items que coalesce por `namespace/name`.
use std::sync::{Mutex, MutexGuard};

use artiflow_core::{Request, RequestSink};
use indexmap::IndexSet;
use log::{debug, error};

/// `RequestSink` FIFO: un item ya pendiente no se duplica.
#[derive(Debug, Default)]
pub struct WorkQueue {
    pending: Mutex<IndexSet<Request>>,
}

impl WorkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, IndexSet<Request>> {
        self.pending.lock().unwrap_or_else(|poisoned| {
                               error!("work queue lock poisoned; recovering");
                               poisoned.into_inner()
                           })
    }

    /// Saca todos los items pendientes en orden de llegada.
    pub fn drain(&self) -> Vec<Request> {
        self.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn contains(&self, request: &Request) -> bool {
        self.lock().contains(request)
    }
}

impl RequestSink for WorkQueue {
    fn enqueue(&self, requests: Vec<Request>) {
        let mut pending = self.lock();
        for r in requests {
            if !pending.insert(r.clone()) {
                debug!("queue:coalesced request={r}");
            }
        }
    }
}
