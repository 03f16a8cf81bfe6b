use crate::datasource::SharedDatasource;
use im::HashMap;
use std::sync::Arc;

/// One shard group's ordered datasources, shared by reference between
/// topology snapshots until a mutation targets the group.
pub type DatasourceGroup = Arc<Vec<SharedDatasource>>;

/// Immutable mapping from shard-group name to its ordered datasources.
///
/// Cloning is cheap: the map shares structure between versions, and group
/// sequences stay reference-identical unless a mutation rebuilds them.
/// Within a group, datasource IDs are unique and order is significant.
#[derive(Debug, Clone)]
pub struct Topology {
    groups: HashMap<String, DatasourceGroup>,
}

impl Topology {
    pub fn new() -> Self {
        Self {
            groups: HashMap::new(),
        }
    }

    /// The group's ordered datasources, if the group exists.
    pub fn group(&self, name: &str) -> Option<&DatasourceGroup> {
        self.groups.get(name)
    }

    pub fn contains_group(&self, name: &str) -> bool {
        self.groups.contains_key(name)
    }

    /// Group names, sorted for stable diagnostics.
    pub fn group_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.groups.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &DatasourceGroup)> {
        self.groups.iter()
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// New topology with `group` bound to `datasources`; all other groups
    /// are carried over by reference.
    pub(crate) fn with_group(&self, group: String, datasources: DatasourceGroup) -> Self {
        Self {
            groups: self.groups.update(group, datasources),
        }
    }

    /// New topology without `group`; all other groups are carried over by
    /// reference.
    pub(crate) fn without_group(&self, group: &str) -> Self {
        Self {
            groups: self.groups.without(group),
        }
    }
}

impl Default for Topology {
    fn default() -> Self {
        Self::new()
    }
}
