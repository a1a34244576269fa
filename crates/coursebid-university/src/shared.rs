//! Shared handle serializing access to one [`University`].
//!
//! Writers hold the lock for a whole operation, so no two mutations ever
//! interleave. Readers share the lock and see a state between operations.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::university::University;

/// Cloneable single-writer handle.
#[derive(Debug, Clone)]
pub struct SharedUniversity {
    inner: Arc<RwLock<University>>,
}

impl SharedUniversity {
    #[must_use]
    pub fn new(university: University) -> Self {
        Self {
            inner: Arc::new(RwLock::new(university)),
        }
    }

    /// Run a mutation under the write lock.
    pub fn write<R>(&self, f: impl FnOnce(&mut University) -> R) -> R {
        let mut guard = self.inner.write();
        f(&mut guard)
    }

    /// Run a read under a shared lock.
    pub fn read<R>(&self, f: impl FnOnce(&University) -> R) -> R {
        let guard = self.inner.read();
        f(&guard)
    }
}
