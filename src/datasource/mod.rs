use crate::core::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Load-balancing weight of a datasource, split into read and write shares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weight {
    pub read: u32,
    pub write: u32,
}

impl Weight {
    pub fn new(read: u32, write: u32) -> Self {
        Self { read, write }
    }

    /// Same share for reads and writes.
    pub fn even(weight: u32) -> Self {
        Self {
            read: weight,
            write: weight,
        }
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}w{}", self.read, self.write)
    }
}

impl Default for Weight {
    fn default() -> Self {
        Self::even(1)
    }
}

/// A single backend connection or pool, identified by an ID within its group.
///
/// Implementations own pool management, network I/O and protocol handling;
/// the registry only tracks membership, weight and teardown.
pub trait Datasource: Send + Sync {
    /// Stable identifier, unique within the owning group.
    fn id(&self) -> &str;

    /// Current load-balancing weight.
    fn weight(&self) -> Weight;

    /// Replace the load-balancing weight.
    ///
    /// Must be safe to call while other threads route traffic through this
    /// datasource.
    fn set_weight(&self, weight: Weight) -> Result<()>;

    /// Release the underlying resources. Called at most once per handle.
    fn close(&self) -> Result<()>;
}

/// Datasources are shared by reference between topology snapshots.
pub type SharedDatasource = Arc<dyn Datasource>;

impl fmt::Debug for dyn Datasource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Datasource")
            .field("id", &self.id())
            .field("weight", &self.weight())
            .finish()
    }
}
