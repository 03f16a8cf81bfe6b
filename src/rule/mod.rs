//! Sharding rule snapshots.
//!
//! A rule set is produced and validated by the configuration layer, then
//! handed to the registry as an immutable whole. The registry never inspects
//! it; the routing engine reads it through `Namespace::current_rule`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Sharding spec for a single logical table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRule {
    /// Column whose value selects the shard.
    pub sharding_column: String,
    /// Number of database shards the table spreads over.
    pub db_shards: u32,
    /// Number of physical tables per database shard.
    pub table_shards: u32,
}

impl TableRule {
    pub fn new(sharding_column: impl Into<String>, db_shards: u32, table_shards: u32) -> Self {
        Self {
            sharding_column: sharding_column.into(),
            db_shards,
            table_shards,
        }
    }
}

/// An immutable routing rule set, swapped wholesale on reload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardRule {
    tables: HashMap<String, TableRule>,
}

impl ShardRule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table rule, replacing any previous rule for the same table.
    pub fn with_table(mut self, table: impl Into<String>, rule: TableRule) -> Self {
        self.tables.insert(table.into(), rule);
        self
    }

    pub fn table(&self, name: &str) -> Option<&TableRule> {
        self.tables.get(name)
    }

    pub fn tables(&self) -> impl Iterator<Item = (&String, &TableRule)> {
        self.tables.iter()
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
