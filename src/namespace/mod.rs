pub mod command;
pub mod manager;
pub mod topology;

pub use command::Command;
pub use manager::NamespaceManager;
pub use topology::{DatasourceGroup, Topology};

use arc_swap::{ArcSwap, ArcSwapOption};
use log::{error, info};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::core::{
    DEFAULT_SLOW_THRESHOLD, PARAM_SLOW_THRESHOLD, ParametersMap, Result, parse_duration,
};
use crate::datasource::SharedDatasource;
use crate::rule::ShardRule;
use crate::slowlog::{SlowLogConfig, SlowLogger};

/// One logical routing domain: the live backend topology, the active
/// sharding rule set and runtime tunables, republished as immutable
/// snapshots on every reconfiguration step.
///
/// Readers on the query path load snapshots wait-free and never contend
/// with writers; reconfiguration runs one [`Command`] at a time under an
/// exclusive per-namespace write lock. Namespaces are fully independent of
/// each other.
pub struct Namespace {
    name: String,
    topology: ArcSwap<Topology>,
    rule: ArcSwap<ShardRule>,
    parameters: ArcSwap<ParametersMap>,
    slow_threshold_nanos: AtomicU64,
    slow_logger: ArcSwapOption<SlowLogger>,
    write_lock: Mutex<()>,
}

impl Namespace {
    /// Create an empty namespace: no groups, default rule, no parameters.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            topology: ArcSwap::from_pointee(Topology::new()),
            rule: ArcSwap::from_pointee(ShardRule::default()),
            parameters: ArcSwap::from_pointee(ParametersMap::new()),
            slow_threshold_nanos: AtomicU64::new(DEFAULT_SLOW_THRESHOLD.as_nanos() as u64),
            slow_logger: ArcSwapOption::empty(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn builder(name: impl Into<String>) -> NamespaceBuilder {
        NamespaceBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The topology visible at call time.
    ///
    /// Wait-free: never blocks on in-flight mutations. The returned snapshot
    /// stays valid and stable after newer snapshots are published.
    pub fn current_topology(&self) -> Arc<Topology> {
        self.topology.load_full()
    }

    /// The rule set visible at call time. Same guarantees as
    /// [`current_topology`](Self::current_topology).
    pub fn current_rule(&self) -> Arc<ShardRule> {
        self.rule.load_full()
    }

    /// The runtime tunables visible at call time. Parameters are a weaker
    /// consistency tier than topology/rule: updates are atomic but not
    /// serialized against other commands.
    pub fn parameters(&self) -> Arc<ParametersMap> {
        self.parameters.load_full()
    }

    /// Queries at or above this duration count as slow.
    pub fn slow_threshold(&self) -> Duration {
        Duration::from_nanos(self.slow_threshold_nanos.load(Ordering::SeqCst))
    }

    /// The dedicated slow-query sink, if one is configured.
    pub fn slow_logger(&self) -> Option<Arc<SlowLogger>> {
        self.slow_logger.load_full()
    }

    /// Apply one reconfiguration step, serialized against other writers on
    /// this namespace.
    pub fn apply(&self, command: Command) -> Result<()> {
        command.apply(self)
    }

    /// Record `sql` in the slow log if it crossed the configured threshold.
    ///
    /// Intended for the query path; sink failures are logged and absorbed.
    pub fn log_slow_query(&self, sql: &str, elapsed: Duration) {
        if elapsed < self.slow_threshold() {
            return;
        }
        if let Some(logger) = self.slow_logger.load_full()
            && let Err(err) = logger.record(sql, elapsed)
        {
            error!("[{}] failed to write slow log record: {}", self.name, err);
        }
    }
}

/// Builder assembling a namespace from loaded configuration.
///
/// Group seeds follow upsert semantics: a repeated datasource ID within one
/// group keeps only the last occurrence. The slow threshold is parsed from
/// the seeded parameters, falling back to the default.
pub struct NamespaceBuilder {
    name: String,
    groups: Vec<(String, Vec<SharedDatasource>)>,
    rule: ShardRule,
    parameters: ParametersMap,
    slow_log: Option<(PathBuf, SlowLogConfig)>,
}

impl NamespaceBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            groups: Vec::new(),
            rule: ShardRule::default(),
            parameters: ParametersMap::new(),
            slow_log: None,
        }
    }

    /// Seed a shard group with its initial datasources.
    pub fn group(mut self, name: impl Into<String>, datasources: Vec<SharedDatasource>) -> Self {
        self.groups.push((name.into(), datasources));
        self
    }

    pub fn rule(mut self, rule: ShardRule) -> Self {
        self.rule = rule;
        self
    }

    pub fn parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    pub fn parameters(mut self, parameters: ParametersMap) -> Self {
        self.parameters = parameters;
        self
    }

    /// Enable the dedicated slow-query log.
    pub fn slow_log(mut self, path: impl Into<PathBuf>, config: SlowLogConfig) -> Self {
        self.slow_log = Some((path.into(), config));
        self
    }

    /// Assemble the namespace. Unlike commands, construction surfaces real
    /// errors: an unopenable slow-log path fails the build.
    pub fn build(self) -> Result<Namespace> {
        let mut topology = Topology::new();
        for (name, datasources) in self.groups {
            let mut values: Vec<SharedDatasource> = topology
                .group(&name)
                .map(|group| group.as_ref().clone())
                .unwrap_or_default();
            for datasource in datasources {
                values.retain(|it| it.id() != datasource.id());
                values.push(datasource);
            }
            topology = topology.with_group(name, Arc::new(values));
        }

        let slow_threshold = self
            .parameters
            .get(PARAM_SLOW_THRESHOLD)
            .and_then(|raw| parse_duration(raw))
            .unwrap_or(DEFAULT_SLOW_THRESHOLD);

        let slow_logger = match self.slow_log {
            Some((path, config)) => Some(Arc::new(SlowLogger::new(path, config)?)),
            None => None,
        };

        let group_count = topology.len();
        let namespace = Namespace {
            name: self.name,
            topology: ArcSwap::from_pointee(topology),
            rule: ArcSwap::from_pointee(self.rule),
            parameters: ArcSwap::from_pointee(self.parameters),
            slow_threshold_nanos: AtomicU64::new(slow_threshold.as_nanos() as u64),
            slow_logger: ArcSwapOption::new(slow_logger),
            write_lock: Mutex::new(()),
        };

        info!(
            "[{}] namespace initialized with {} group(s)",
            namespace.name, group_count
        );

        Ok(namespace)
    }
}
