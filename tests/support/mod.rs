#![allow(dead_code)]

use rustshardproxy::core::ProxyError;
use rustshardproxy::{Datasource, Result, Weight};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// In-memory stand-in for a backend connection pool.
pub struct MockDatasource {
    id: String,
    weight: Mutex<Weight>,
    closed: AtomicBool,
    close_calls: AtomicUsize,
    fail_set_weight: bool,
    fail_close: bool,
}

impl MockDatasource {
    pub fn new(id: &str) -> Arc<Self> {
        Self::build(id, Weight::default(), false, false)
    }

    pub fn with_weight(id: &str, weight: Weight) -> Arc<Self> {
        Self::build(id, weight, false, false)
    }

    /// Rejects every `set_weight` call with a backend error.
    pub fn failing_weight(id: &str) -> Arc<Self> {
        Self::build(id, Weight::default(), true, false)
    }

    /// Fails every `close` call with a teardown error.
    pub fn failing_close(id: &str) -> Arc<Self> {
        Self::build(id, Weight::default(), false, true)
    }

    fn build(id: &str, weight: Weight, fail_set_weight: bool, fail_close: bool) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_string(),
            weight: Mutex::new(weight),
            closed: AtomicBool::new(false),
            close_calls: AtomicUsize::new(0),
            fail_set_weight,
            fail_close,
        })
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }

    pub fn current_weight(&self) -> Weight {
        *self.weight.lock().unwrap()
    }
}

impl Datasource for MockDatasource {
    fn id(&self) -> &str {
        &self.id
    }

    fn weight(&self) -> Weight {
        *self.weight.lock().unwrap()
    }

    fn set_weight(&self, weight: Weight) -> Result<()> {
        if self.fail_set_weight {
            return Err(ProxyError::BackendError(format!(
                "backend '{}' rejected weight {}",
                self.id, weight
            )));
        }
        *self.weight.lock().unwrap() = weight;
        Ok(())
    }

    fn close(&self) -> Result<()> {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_close {
            return Err(ProxyError::TeardownError(format!(
                "backend '{}' failed to release resources",
                self.id
            )));
        }
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// IDs of a group's datasources, in topology order.
pub fn group_ids(topology: &rustshardproxy::Topology, group: &str) -> Vec<String> {
    topology
        .group(group)
        .map(|g| g.iter().map(|ds| ds.id().to_string()).collect())
        .unwrap_or_default()
}
