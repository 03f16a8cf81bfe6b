// ============================================================================
// RustShardProxy Library
// ============================================================================

pub mod core;
pub mod datasource;
pub mod namespace;
pub mod rule;
pub mod slowlog;

// Re-export main types for convenience
pub use core::{ParametersMap, ProxyError, Result};
pub use datasource::{Datasource, SharedDatasource, Weight};
pub use namespace::{
    Command, DatasourceGroup, Namespace, NamespaceBuilder, NamespaceManager, Topology,
};
pub use rule::{ShardRule, TableRule};
pub use slowlog::{SlowLogConfig, SlowLogger};
